//! [`RegAccessStore`] backed by the document graph.

use crate::client::GraphTransport;
use crate::documents::{
    EVENT_MEMBERSHIP, RECORD_BY_EVENT, RECORD_BY_ID, UPDATE_EVENT_MEMBERSHIP, UPDATE_RECORD,
    with_record_fields,
};
use crate::error::GraphError;
use crate::wire::{MembershipDocument, RecordDocument, membership_variables, patch_variables};
use async_trait::async_trait;
use regaccess_core::RegAccessError;
use regaccess_core::environment::{IdentitySession, RegAccessStore};
use regaccess_core::intent::{MembershipWrite, RecordPatch};
use regaccess_core::types::{EventId, EventMembership, RecordId, RegAndAccessRecord};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

/// Persists records and memberships through a [`GraphTransport`].
#[derive(Clone, Debug)]
pub struct GraphRegAccessStore<T> {
    transport: T,
}

impl<T: GraphTransport> GraphRegAccessStore<T> {
    /// Creates a store over `transport`
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }
}

/// Decodes a node, treating `null` and fragment-mismatch `{}` as absent
fn decode_node<D: DeserializeOwned>(node: Option<&Value>) -> Result<Option<D>, GraphError> {
    match node {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(fields)) if !fields.contains_key("id") => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| GraphError::Decode(e.to_string())),
    }
}

#[async_trait]
impl<T: GraphTransport> RegAccessStore for GraphRegAccessStore<T> {
    async fn load_record(
        &self,
        record_id: &RecordId,
    ) -> Result<Option<RegAndAccessRecord>, RegAccessError> {
        let data = self
            .transport
            .execute_query(
                &with_record_fields(RECORD_BY_ID),
                json!({ "id": record_id.as_str() }),
            )
            .await?;

        let document: Option<RecordDocument> = decode_node(data.get("node"))?;
        Ok(document.map(RegAndAccessRecord::from))
    }

    async fn load_record_for_event(
        &self,
        event_id: &EventId,
    ) -> Result<Option<RegAndAccessRecord>, RegAccessError> {
        let data = self
            .transport
            .execute_query(
                &with_record_fields(RECORD_BY_EVENT),
                json!({ "eventId": event_id.as_str() }),
            )
            .await?;

        let document: Option<RecordDocument> =
            decode_node(data.pointer("/node/regAndAccess/edges/0/node"))?;
        Ok(document.map(RegAndAccessRecord::from))
    }

    async fn apply_patch(
        &self,
        session: &IdentitySession,
        patch: &RecordPatch,
    ) -> Result<(), RegAccessError> {
        self.transport
            .execute_mutation(session, UPDATE_RECORD, patch_variables(patch))
            .await?;
        Ok(())
    }

    async fn load_membership(
        &self,
        event_id: &EventId,
    ) -> Result<Option<EventMembership>, RegAccessError> {
        let data = self
            .transport
            .execute_query(EVENT_MEMBERSHIP, json!({ "eventId": event_id.as_str() }))
            .await?;

        let document: Option<MembershipDocument> = decode_node(data.get("node"))?;
        Ok(document.map(EventMembership::from))
    }

    async fn write_membership(
        &self,
        session: &IdentitySession,
        write: &MembershipWrite,
    ) -> Result<(), RegAccessError> {
        self.transport
            .execute_mutation(session, UPDATE_EVENT_MEMBERSHIP, membership_variables(write))
            .await?;
        Ok(())
    }
}
