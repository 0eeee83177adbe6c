use serde::{Deserialize, Serialize};
use thiserror::Error;

use console_core::Timestamp;

use crate::PrincipalIdentity;

/// OIDC ID token claims model (transport-agnostic).
///
/// This is the minimal set of claims the console reads once a token has been
/// decoded and its signature verified by whatever transport layer is in use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Subject identifier.
    pub sub: String,

    /// Email of the signed-in user, the key user grants are written against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Group memberships asserted by the identity provider.
    #[serde(default)]
    pub groups: Vec<String>,

    /// Issued-at timestamp.
    #[serde(rename = "iat")]
    pub issued_at: Timestamp,

    /// Expiration timestamp.
    #[serde(rename = "exp")]
    pub expires_at: Timestamp,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate ID token claims.
///
/// Note: this validates the *claims* only. Signature verification / decoding is
/// intentionally outside this crate.
pub fn validate_claims(claims: &IdTokenClaims, now: Timestamp) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

impl IdTokenClaims {
    /// Map claims to the identity used for grant matching.
    ///
    /// The principal id is the email when present, otherwise the subject.
    /// Blank group names are dropped.
    pub fn principal(&self) -> PrincipalIdentity {
        let principal_id = self
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(self.sub.as_str());

        PrincipalIdentity::new(principal_id).with_groups(
            self.groups
                .iter()
                .map(|g| g.trim())
                .filter(|g| !g.is_empty()),
        )
    }
}
