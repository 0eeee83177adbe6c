//! Grant Store: persistence of resources and their sharing lists.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryGrantStore;
pub use r#trait::{GrantStore, StoreError};
