//! Intake payload parsing and acknowledgment lookup

use serde_json::{Map, Value};

use super::error::IntakeError;

/// Name of the required discriminator field
pub const FORM_TYPE_FIELD: &str = "formType";

const SDVOSB_MESSAGE: &str =
    "Thanks for submitting the SDVOSB intake. We will review fit and follow up with next steps.";
const PRIME_MESSAGE: &str = "Thanks for submitting the prime intake. We will review your requirements and follow up with next steps.";
const GENERAL_MESSAGE: &str = "Thanks for your message. We will respond with next steps soon.";

/// Known form templates
///
/// Tags outside this set are accepted and acknowledged as `General`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Sdvosb,
    Prime,
    General,
}

impl FormKind {
    /// Map a `formType` tag to its template, exact match only
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "sdvosb" => Self::Sdvosb,
            "prime" => Self::Prime,
            _ => Self::General,
        }
    }

    pub const fn acknowledgment(self) -> &'static str {
        match self {
            Self::Sdvosb => SDVOSB_MESSAGE,
            Self::Prime => PRIME_MESSAGE,
            Self::General => GENERAL_MESSAGE,
        }
    }
}

/// A validated intake submission as posted by the client
#[derive(Debug, Clone)]
pub struct IntakePayload {
    fields: Map<String, Value>,
}

impl IntakePayload {
    /// Parse and validate a raw request body
    ///
    /// A zero-length body is treated as `{}`. Malformed JSON (whitespace
    /// alone included) is a parse error and a bare `null` is `NullPayload`.
    /// Any other value without a non-empty string `formType` is
    /// `MissingFormType`.
    pub fn parse(body: &[u8]) -> Result<Self, IntakeError> {
        if body.is_empty() {
            return Err(IntakeError::MissingFormType);
        }

        let value: Value = serde_json::from_slice(body).map_err(IntakeError::Parse)?;
        match value {
            Value::Object(fields) => Self::from_fields(fields),
            Value::Null => Err(IntakeError::NullPayload),
            _ => Err(IntakeError::MissingFormType),
        }
    }

    pub fn from_fields(fields: Map<String, Value>) -> Result<Self, IntakeError> {
        match fields.get(FORM_TYPE_FIELD) {
            Some(Value::String(tag)) if !tag.is_empty() => Ok(Self { fields }),
            _ => Err(IntakeError::MissingFormType),
        }
    }

    pub fn form_type(&self) -> &str {
        self.fields
            .get(FORM_TYPE_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_acknowledgments() {
        assert_eq!(
            FormKind::from_tag("sdvosb").acknowledgment(),
            "Thanks for submitting the SDVOSB intake. We will review fit and follow up with next steps."
        );
        assert_eq!(
            FormKind::from_tag("prime").acknowledgment(),
            "Thanks for submitting the prime intake. We will review your requirements and follow up with next steps."
        );
        assert_eq!(
            FormKind::from_tag("general").acknowledgment(),
            "Thanks for your message. We will respond with next steps soon."
        );
    }

    #[test]
    fn test_unknown_tags_fall_back_to_general() {
        for tag in ["", "SDVOSB", "Prime", "partner", "prime "] {
            assert_eq!(FormKind::from_tag(tag), FormKind::General, "tag {tag:?}");
        }
    }

    #[test]
    fn test_parse_valid_payload() {
        let body = br#"{"formType":"prime","name":"Ada","submittedAt":"2026-01-01T00:00:00.000Z"}"#;
        let payload = IntakePayload::parse(body).unwrap();
        assert_eq!(payload.form_type(), "prime");
        let fields = payload.into_fields();
        let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(keys, ["formType", "name", "submittedAt"]);
    }

    #[test]
    fn test_missing_form_type() {
        let bodies: [&[u8]; 8] = [
            b"",
            b"true",
            b"{}",
            br#"{"name":"Ada"}"#,
            br#"{"formType":""}"#,
            br#"{"formType":7}"#,
            b"[1,2]",
            b"\"prime\"",
        ];
        for body in bodies {
            assert!(
                matches!(IntakePayload::parse(body), Err(IntakeError::MissingFormType)),
                "body {:?}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let bodies: [&[u8]; 3] = [b"{formType: prime", b"   ", b"\n\t"];
        for body in bodies {
            assert!(
                matches!(IntakePayload::parse(body), Err(IntakeError::Parse(_))),
                "body {:?}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn test_null_payload_is_a_server_error() {
        let err = IntakePayload::parse(b"null").unwrap_err();
        assert!(matches!(err, IntakeError::NullPayload));
        assert!(err.status().is_server_error());
    }
}
