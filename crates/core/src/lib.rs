//! `console-core` — shared primitives for the sharing console.
//!
//! This crate contains **pure** building blocks (no storage, no transport).

pub mod error;
pub mod id;
pub mod revision;
pub mod time;

pub use error::DomainError;
pub use id::{ResourceKind, ResourceName, ResourceRef};
pub use revision::ExpectedRevision;
pub use time::Timestamp;
