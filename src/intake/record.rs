//! Stored submission record

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::payload::IntakePayload;

const ID_FIELD: &str = "id";
const RECEIVED_AT_FIELD: &str = "receivedAt";

/// One entry of the store file
///
/// Serialized flat: `id`, `receivedAt`, then every submitted field in the
/// order the client sent them. A submitted `id` or `receivedAt` replaces
/// the stamped value in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionRecord {
    fields: Map<String, Value>,
}

impl SubmissionRecord {
    /// Stamp a payload received at `now`
    pub fn new(payload: IntakePayload, now: DateTime<Utc>) -> Self {
        let mut fields = Map::new();
        fields.insert(ID_FIELD.to_string(), Value::from(now.timestamp_millis()));
        fields.insert(
            RECEIVED_AT_FIELD.to_string(),
            Value::from(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        fields.extend(payload.into_fields());

        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn id(&self) -> Option<&Value> {
        self.get(ID_FIELD)
    }

    pub fn form_type(&self) -> Option<&str> {
        self.get(super::FORM_TYPE_FIELD).and_then(Value::as_str)
    }
}
