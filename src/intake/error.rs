// Intake error module
// Classifies everything that can go wrong while recording a submission

use hyper::StatusCode;
use std::fmt;
use std::io;

/// Public message for any storage or parse failure
pub const STORE_FAILED: &str = "Unable to store submission.";
/// Public message for a payload without a usable `formType`
pub const MISSING_FORM_TYPE: &str = "Missing formType.";
/// Public message for a body over the configured limit
pub const PAYLOAD_TOO_LARGE: &str = "Payload too large.";

#[derive(Debug)]
pub enum IntakeError {
    /// Payload has no non-empty string `formType`
    MissingFormType,
    /// Request body exceeded `http.max_body_size`
    PayloadTooLarge,
    /// Request body could not be read off the connection
    Body(String),
    /// Request body is not valid JSON
    Parse(serde_json::Error),
    /// Request body is the JSON literal `null`
    NullPayload,
    /// Store file content is not a JSON array
    Corrupt(serde_json::Error),
    /// Records could not be serialized back to JSON
    Encode(serde_json::Error),
    /// Filesystem failure on the store file or its directory
    Io(io::Error),
}

impl IntakeError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingFormType => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Body(_)
            | Self::Parse(_)
            | Self::NullPayload
            | Self::Corrupt(_)
            | Self::Encode(_)
            | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the client; never includes internal detail
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::MissingFormType => MISSING_FORM_TYPE,
            Self::PayloadTooLarge => PAYLOAD_TOO_LARGE,
            Self::Body(_)
            | Self::Parse(_)
            | Self::NullPayload
            | Self::Corrupt(_)
            | Self::Encode(_)
            | Self::Io(_) => STORE_FAILED,
        }
    }
}

impl fmt::Display for IntakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFormType => write!(f, "payload is missing formType"),
            Self::PayloadTooLarge => write!(f, "request body exceeds size limit"),
            Self::Body(msg) => write!(f, "failed to read request body: {msg}"),
            Self::Parse(err) => write!(f, "invalid JSON payload: {err}"),
            Self::NullPayload => write!(f, "payload is null"),
            Self::Corrupt(err) => write!(f, "store file is not a JSON array: {err}"),
            Self::Encode(err) => write!(f, "failed to encode records: {err}"),
            Self::Io(err) => write!(f, "store I/O error: {err}"),
        }
    }
}

impl std::error::Error for IntakeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) | Self::Corrupt(err) | Self::Encode(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for IntakeError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}
