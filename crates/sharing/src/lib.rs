//! `console-sharing` — sharing state, Grant Store and resource controller.
//!
//! The authorization decisions themselves live in `console-auth`; this crate
//! wires them to stored resources (organizations, projects, secrets).

pub mod annotations;
pub mod config;
pub mod controller;
pub mod state;
pub mod store;

pub use annotations::{
    CodecError, SHARE_GROUPS_ANNOTATION, SHARE_USERS_ANNOTATION, decode_annotations, encode_annotations,
};
pub use config::{ConfigError, SharingPolicy};
pub use controller::{ControllerError, ResourceController, ResourceView};
pub use state::{ResourceMetadata, ResourceRecord, ResourceSharingState};
pub use store::{GrantStore, InMemoryGrantStore, StoreError};
