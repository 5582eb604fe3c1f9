//! Core types for Vitrine: errors, sanitization policies, storage token resolution, and the
//! resource descriptors behind the generic CRUD endpoints.

pub mod error;
pub mod models;
pub mod resource;
pub mod sanitize;
pub mod storage;

pub use error::AppError;
pub use resource::{Assignment, FieldValue, ResourceSpec};
pub use sanitize::{SanitizePolicy, plain_text, strip_tags};
