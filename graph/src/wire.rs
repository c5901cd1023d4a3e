//! Wire encoding of graph documents.
//!
//! The document graph stores booleans as `"1"`/`"0"`, application flags as a
//! comma-separated string, and relations as `{ id }` objects. This module is
//! the only place those encodings are known.

use regaccess_core::intent::{FieldUpdate, MembershipWrite, RecordPatch};
use regaccess_core::types::{
    ApplicationForm, ApplyOption, ApplyRule, EventId, EventMembership, ProfileId, RecordId,
    RegAndAccessRecord, RegistrationAccess, ScrollPassTicket, TicketType, ZuPassInfo,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// `"1"`/`"0"` booleans.
///
/// Reads also accept `"true"`/`"false"` and JSON booleans; missing or null
/// reads as `false`. Writes always produce `"1"` or `"0"`.
pub mod wire_bool {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    /// Encodes a flag
    #[must_use]
    pub const fn encode(value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }

    /// Decodes a flag, `None` when absent
    ///
    /// # Errors
    ///
    /// Returns a description of the value when it is not a recognizable flag.
    pub fn decode(value: &Value) -> Result<Option<bool>, String> {
        match value {
            Value::Null => Ok(None),
            Value::Bool(flag) => Ok(Some(*flag)),
            Value::Number(n) if n.as_u64() == Some(1) => Ok(Some(true)),
            Value::Number(n) if n.as_u64() == Some(0) => Ok(Some(false)),
            Value::String(s) => match s.trim() {
                "1" | "true" => Ok(Some(true)),
                "0" | "false" => Ok(Some(false)),
                "" => Ok(None),
                other => Err(format!("invalid flag: {other:?}")),
            },
            other => Err(format!("invalid flag: {other}")),
        }
    }

    /// Serializer for `#[serde(with = "wire_bool")]`
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    #[allow(clippy::trivially_copy_pass_by_ref)] // serde's `with` signature
    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(encode(*value))
    }

    /// Deserializer for `#[serde(with = "wire_bool")]`
    ///
    /// # Errors
    ///
    /// Fails on values that are not flags.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null);
        decode(&value)
            .map(Option::unwrap_or_default)
            .map_err(D::Error::custom)
    }

    /// Deserializer for optional flags (`#[serde(default, deserialize_with = ...)]`)
    ///
    /// # Errors
    ///
    /// Fails on values that are not flags.
    pub fn deserialize_option<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<bool>, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null);
        decode(&value).map_err(D::Error::custom)
    }
}

/// Relation to another document
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Related document id
    pub id: String,
}

/// A record as the graph returns it
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDocument {
    id: String,
    event_id: String,
    #[serde(default)]
    ticket_type: Option<TicketType>,
    #[serde(default)]
    apply_rule: Option<ApplyRule>,
    #[serde(default)]
    apply_option: Option<String>,
    #[serde(default)]
    application_form: Option<String>,
    #[serde(default)]
    registration_access: Option<RegistrationAccess>,
    #[serde(default)]
    registration_whitelist: Option<Vec<Relation>>,
    #[serde(default, with = "wire_bool")]
    registration_open: bool,
    #[serde(default, with = "wire_bool")]
    checkin_open: bool,
    #[serde(default)]
    scroll_pass_tickets: Option<Vec<ScrollPassTicket>>,
    #[serde(default)]
    zu_pass_info: Option<ZuPassInfo>,
    #[serde(default)]
    profile_id: Option<String>,
}

impl From<RecordDocument> for RegAndAccessRecord {
    fn from(doc: RecordDocument) -> Self {
        Self {
            id: RecordId::new(doc.id),
            event_id: EventId::new(doc.event_id),
            ticket_type: doc.ticket_type.unwrap_or_default(),
            apply_rule: doc.apply_rule.unwrap_or_default(),
            apply_options: doc
                .apply_option
                .as_deref()
                .map(decode_apply_options)
                .unwrap_or_default(),
            application_form: doc
                .application_form
                .map(ApplicationForm::new)
                .unwrap_or_default(),
            registration_access: doc.registration_access.unwrap_or_default(),
            registration_whitelist: doc
                .registration_whitelist
                .unwrap_or_default()
                .into_iter()
                .map(|relation| ProfileId::new(relation.id))
                .collect(),
            registration_open: doc.registration_open,
            checkin_open: doc.checkin_open,
            scroll_pass_tickets: doc.scroll_pass_tickets.unwrap_or_default(),
            zu_pass_info: doc.zu_pass_info,
            profile_id: doc.profile_id.map(ProfileId::new),
        }
    }
}

/// Event membership as the graph returns it
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipDocument {
    id: String,
    #[serde(default)]
    members: Option<Vec<Relation>>,
    #[serde(default)]
    scroll_pass_hashes: Option<Vec<String>>,
}

impl From<MembershipDocument> for EventMembership {
    fn from(doc: MembershipDocument) -> Self {
        Self {
            event_id: EventId::new(doc.id),
            members: doc
                .members
                .unwrap_or_default()
                .into_iter()
                .map(|relation| ProfileId::new(relation.id))
                .collect(),
            redeemed_hashes: doc.scroll_pass_hashes.unwrap_or_default(),
        }
    }
}

/// Splits a comma-separated `applyOption` string. Unknown flags decode as
/// `Unrecognized`.
#[must_use]
pub fn decode_apply_options(raw: &str) -> Vec<ApplyOption> {
    raw.split(',')
        .map(str::trim)
        .filter(|flag| !flag.is_empty())
        .map(|flag| {
            serde_json::from_value(Value::String(flag.to_string()))
                .unwrap_or(ApplyOption::Unrecognized)
        })
        .collect()
}

fn encode_apply_options(options: &[ApplyOption]) -> Value {
    if options.is_empty() {
        return Value::Null;
    }
    let names: Vec<String> = options
        .iter()
        .filter_map(|option| match serde_json::to_value(option) {
            Ok(Value::String(name)) => Some(name),
            _ => None,
        })
        .collect();
    Value::String(names.join(","))
}

fn encode_ids(ids: &[ProfileId]) -> Value {
    if ids.is_empty() {
        return Value::Null;
    }
    Value::Array(ids.iter().map(|id| json!(id.as_str())).collect())
}

/// `content` object of a record update mutation
#[must_use]
pub fn patch_content(patch: &RecordPatch) -> Map<String, Value> {
    let mut content = Map::new();
    for update in &patch.updates {
        let (field, value) = match update {
            FieldUpdate::ApplicationForm(form) => ("applicationForm", json!(form.as_str())),
            FieldUpdate::ApplyRule(rule) => ("applyRule", json!(rule)),
            FieldUpdate::ApplyOptions(options) => ("applyOption", encode_apply_options(options)),
            FieldUpdate::RegistrationAccess(access) => ("registrationAccess", json!(access)),
            FieldUpdate::TicketType(ticket_type) => ("ticketType", json!(ticket_type)),
            FieldUpdate::RegistrationOpen(open) => {
                ("registrationOpen", json!(wire_bool::encode(*open)))
            }
            FieldUpdate::CheckinOpen(open) => ("checkinOpen", json!(wire_bool::encode(*open))),
            FieldUpdate::RegistrationWhitelist(ids) => ("registrationWhitelist", encode_ids(ids)),
            FieldUpdate::ScrollPassTickets(tickets) => ("scrollPassTickets", json!(tickets)),
        };
        content.insert(field.to_string(), value);
    }
    content.insert("profileId".to_string(), json!(patch.profile_id.as_str()));
    content
}

/// Variables of a record update mutation
#[must_use]
pub fn patch_variables(patch: &RecordPatch) -> Value {
    json!({
        "input": {
            "id": patch.record_id.as_str(),
            "content": patch_content(patch),
        }
    })
}

/// Variables of a membership update mutation
#[must_use]
pub fn membership_variables(write: &MembershipWrite) -> Value {
    let members: Vec<&str> = write.members.iter().map(ProfileId::as_str).collect();
    json!({
        "input": {
            "id": write.event_id.as_str(),
            "content": {
                "members": members,
                "scrollPassHashes": write.redeemed_hashes,
            }
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use regaccess_core::intent::{SwitchTarget, UpdateIntent};

    #[test]
    fn test_record_document_decodes_wire_quirks() {
        let doc: RecordDocument = serde_json::from_value(json!({
            "id": "record-1",
            "eventId": "event-1",
            "ticketType": "ScrollPass",
            "applyRule": "NoApplication",
            "applyOption": "RequireBasicInfo, SomethingNew",
            "applicationForm": "[]",
            "registrationAccess": "Whitelist",
            "registrationWhitelist": [{ "id": "did:a" }, { "id": "did:b" }],
            "registrationOpen": "1",
            "checkinOpen": "0",
            "scrollPassTickets": [{
                "contractAddress": "0xabc",
                "name": "GA",
                "price": "1",
                "tokenType": "ETH",
                "image_url": "https://img"
            }],
            "zuPassInfo": null,
            "profileId": "did:owner"
        }))
        .unwrap();

        let record = RegAndAccessRecord::from(doc);
        assert_eq!(record.ticket_type, TicketType::ScrollPass);
        assert_eq!(
            record.apply_options,
            vec![ApplyOption::RequireBasicInfo, ApplyOption::Unrecognized]
        );
        assert_eq!(record.registration_whitelist.len(), 2);
        assert!(record.registration_open);
        assert!(!record.checkin_open);
        assert_eq!(
            record.scroll_pass_tickets[0].image_url.as_deref(),
            Some("https://img")
        );
        assert_eq!(record.profile_id, Some(ProfileId::new("did:owner")));
    }

    #[test]
    fn test_sparse_record_document_uses_defaults() {
        let doc: RecordDocument =
            serde_json::from_value(json!({ "id": "r", "eventId": "e" })).unwrap();
        let record = RegAndAccessRecord::from(doc);
        assert_eq!(
            record,
            RegAndAccessRecord::new(RecordId::new("r"), EventId::new("e"))
        );
    }

    #[test]
    fn test_wire_bool_decode() {
        assert_eq!(wire_bool::decode(&json!("1")), Ok(Some(true)));
        assert_eq!(wire_bool::decode(&json!("0")), Ok(Some(false)));
        assert_eq!(wire_bool::decode(&json!(true)), Ok(Some(true)));
        assert_eq!(wire_bool::decode(&Value::Null), Ok(None));
        assert!(wire_bool::decode(&json!("maybe")).is_err());
    }

    #[test]
    fn test_switch_patch_encodes_string_flag() {
        let patch = RecordPatch::from_intent(
            RecordId::new("r"),
            ProfileId::new("did:owner"),
            UpdateIntent::Switch(SwitchTarget::Checkin(true)),
        );
        let content = patch_content(&patch);
        assert_eq!(content.get("checkinOpen"), Some(&json!("1")));
        assert!(!content.contains_key("registrationOpen"));
        assert_eq!(content.get("profileId"), Some(&json!("did:owner")));
    }

    #[test]
    fn test_empty_whitelist_and_options_are_null() {
        let patch = RecordPatch::from_intent(
            RecordId::new("r"),
            ProfileId::new("did:owner"),
            UpdateIntent::Method {
                apply_rule: ApplyRule::NoApplication,
                apply_options: vec![],
                registration_access: RegistrationAccess::Open,
                ticket_type: TicketType::ZuPass,
            },
        );
        let content = patch_content(&patch);
        assert_eq!(content.get("applyOption"), Some(&Value::Null));
        assert_eq!(content.get("ticketType"), Some(&json!("ZuPass")));

        let patch = RecordPatch::from_intent(
            RecordId::new("r"),
            ProfileId::new("did:owner"),
            UpdateIntent::Whitelist {
                registration_whitelist: vec![],
            },
        );
        assert_eq!(
            patch_content(&patch).get("registrationWhitelist"),
            Some(&Value::Null)
        );
    }

    #[test]
    fn test_membership_variables() {
        let vars = membership_variables(&MembershipWrite {
            event_id: EventId::new("event-1"),
            members: vec![ProfileId::new("did:a")],
            redeemed_hashes: vec!["h1".to_string()],
        });
        assert_eq!(vars["input"]["id"], "event-1");
        assert_eq!(vars["input"]["content"]["members"], json!(["did:a"]));
        assert_eq!(vars["input"]["content"]["scrollPassHashes"], json!(["h1"]));
    }
}
