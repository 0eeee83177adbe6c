//! `console-auth` — pure sharing/authorization boundary.
//!
//! Grants, role ordering, temporal windows, effective-role resolution and the
//! capability table. This crate is decoupled from HTTP, storage and clocks.

pub mod authorize;
pub mod capabilities;
pub mod claims;
pub mod grant;
pub mod principal;
pub mod resolve;
pub mod roles;

pub use authorize::{AuthorizationExplanation, AuthzError, GrantMatch, authorize, explain_authorization};
pub use capabilities::{Capability, CapabilitySet, capabilities};
pub use claims::{IdTokenClaims, TokenValidationError, validate_claims};
pub use grant::{
    Grant, GrantValidationError, ValidationRules, WindowState, collapse_duplicates, is_active,
    normalize, validate_grants,
};
pub use principal::PrincipalIdentity;
pub use resolve::{GrantSource, Resolution, applicable_grants, effective_role, resolve};
pub use roles::{ParseRoleError, Role};
