//! GraphQL documents sent to the document graph.

/// Fields selected for a registration & access record
pub const REG_AND_ACCESS_FIELDS: &str = r"
fragment RegAndAccessFields on ZucityEventRegistrationAndAccess {
  id
  eventId
  ticketType
  applyRule
  applyOption
  applicationForm
  registrationAccess
  registrationWhitelist {
    id
  }
  registrationOpen
  checkinOpen
  scrollPassTickets {
    contractAddress
    name
    price
    tokenType
    image_url
    description
    chain
  }
  zuPassInfo {
    eventId
    eventName
    access
    registration
  }
  profileId
}
";

/// Loads a record by id
pub const RECORD_BY_ID: &str = r"
query RegAndAccessById($id: ID!) {
  node(id: $id) {
    ... on ZucityEventRegistrationAndAccess {
      ...RegAndAccessFields
    }
  }
}
";

/// Loads the record attached to an event
pub const RECORD_BY_EVENT: &str = r"
query RegAndAccessByEvent($eventId: ID!) {
  node(id: $eventId) {
    ... on ZucityEvent {
      regAndAccess(first: 1) {
        edges {
          node {
            ...RegAndAccessFields
          }
        }
      }
    }
  }
}
";

/// Partial update of a record
pub const UPDATE_RECORD: &str = r"
mutation UpdateZucityEventRegistrationAndAccess(
  $input: UpdateZucityEventRegistrationAndAccessInput!
) {
  updateZucityEventRegistrationAndAccess(input: $input) {
    document {
      id
    }
  }
}
";

/// Loads the membership lists of an event
pub const EVENT_MEMBERSHIP: &str = r"
query EventMembership($eventId: ID!) {
  node(id: $eventId) {
    ... on ZucityEvent {
      id
      members {
        id
      }
      scrollPassHashes
    }
  }
}
";

/// Writes both membership lists in one mutation
pub const UPDATE_EVENT_MEMBERSHIP: &str = r"
mutation UpdateZucityEvent($input: UpdateZucityEventInput!) {
  updateZucityEvent(input: $input) {
    document {
      id
    }
  }
}
";

/// Appends the record fragment to a query document
#[must_use]
pub fn with_record_fields(document: &str) -> String {
    format!("{document}{REG_AND_ACCESS_FIELDS}")
}
