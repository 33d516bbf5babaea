//! Marketing site server with a lead-intake endpoint
//!
//! Serves static files from a site root and records form submissions
//! posted to the intake path into a JSON array file.

pub mod config;
pub mod handler;
pub mod http;
pub mod intake;
pub mod logger;
pub mod server;
