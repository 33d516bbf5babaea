//! Intake recorder module
//!
//! Validates lead-intake submissions, stamps them with an id and receipt
//! time, and appends them to the JSON array store.

mod error;
mod payload;
mod record;
mod store;

pub use error::IntakeError;
pub use payload::{FormKind, IntakePayload, FORM_TYPE_FIELD};
pub use record::SubmissionRecord;
pub use store::IntakeStore;
