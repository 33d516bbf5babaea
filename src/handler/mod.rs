//! Request handler module
//!
//! Responsible for request routing dispatch: static file serving for GET
//! requests and the intake recorder for form submissions.

pub mod intake;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
