//! Bearer token ports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use classbook_core::{AppResult, Identity};

/// Claims placed into a freshly issued token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSet {
    /// Subject identifier (user id).
    pub subject: String,
    /// Comma-joined authority labels.
    pub roles: String,
    /// Caller group, if any.
    pub group: Option<String>,
    /// Discipline the caller is restricted to, if any.
    pub scope: Option<String>,
}

impl ClaimSet {
    /// Creates a claim set carrying only subject and roles.
    #[must_use]
    pub fn new(subject: impl Into<String>, roles: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            roles: roles.into(),
            group: None,
            scope: None,
        }
    }

    /// Captures everything the filter needs to rebuild `identity` without a lookup.
    #[must_use]
    pub fn for_identity(identity: &Identity) -> Self {
        Self {
            subject: identity.subject_id().to_owned(),
            roles: identity.roles_claim(),
            group: identity.group_id().map(ToOwned::to_owned),
            scope: identity.scope_subject().map(ToOwned::to_owned),
        }
    }
}

/// Claims recovered from a token whose signature checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject identifier or email.
    pub subject: String,
    /// Comma-joined authority labels, possibly empty.
    pub roles: String,
    /// Caller group claim.
    pub group: Option<String>,
    /// Scope subject claim.
    pub scope: Option<String>,
    /// Issue instant.
    pub issued_at: DateTime<Utc>,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

impl TokenClaims {
    /// Returns the non-empty authority labels of the `roles` claim.
    pub fn role_labels(&self) -> impl Iterator<Item = &str> {
        self.roles
            .split(',')
            .map(str::trim)
            .filter(|label| !label.is_empty())
    }
}

/// Signed token handed to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Compact token string.
    pub token: String,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

/// Signs, verifies and parses bearer tokens.
///
/// Verification never fails past this boundary: every failure mode
/// collapses to `false` / `None`.
pub trait TokenCodec: Send + Sync {
    /// Issues a token at the given instant.
    fn issue_at(&self, claims: &ClaimSet, now: DateTime<Utc>) -> AppResult<IssuedToken>;

    /// Returns whether the signature is valid and `now` is before expiry.
    fn validate_at(&self, token: &str, now: DateTime<Utc>) -> bool;

    /// Returns the claims of a token with a valid signature, ignoring expiry.
    fn parse_claims(&self, token: &str) -> Option<TokenClaims>;

    /// Issues a token now.
    fn issue(&self, claims: &ClaimSet) -> AppResult<IssuedToken> {
        self.issue_at(claims, Utc::now())
    }

    /// Validates a token now.
    fn validate(&self, token: &str) -> bool {
        self.validate_at(token, Utc::now())
    }
}

/// Store of revoked token hashes.
#[async_trait]
pub trait TokenRevocationList: Send + Sync {
    /// Revokes a token hash until `expires_at`.
    async fn revoke(&self, token_hash: &str, expires_at: DateTime<Utc>) -> AppResult<()>;

    /// Returns whether a token hash is revoked at `now`.
    async fn is_revoked(&self, token_hash: &str, now: DateTime<Utc>) -> AppResult<bool>;
}

/// Computes the SHA-256 hex digest stored for a revoked token.
#[must_use]
pub fn hash_token(raw_token: &str) -> String {
    use sha2::{Digest, Sha256};
    use std::fmt::Write;

    let mut hasher = Sha256::new();
    hasher.update(raw_token.as_bytes());
    let result = hasher.finalize();

    result
        .iter()
        .fold(String::with_capacity(64), |mut acc, byte| {
            let _ = write!(acc, "{byte:02x}");
            acc
        })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{TokenClaims, hash_token};

    #[test]
    fn token_hash_is_hex_sha256() {
        let hash = hash_token("abc");
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn role_labels_skip_blank_segments() {
        let claims = TokenClaims {
            subject: "u-1".to_owned(),
            roles: " ROLE_ADMIN, ,ROLE_USER,".to_owned(),
            group: None,
            scope: None,
            issued_at: Utc::now(),
            expires_at: Utc::now(),
        };
        let labels: Vec<&str> = claims.role_labels().collect();
        assert_eq!(labels, vec!["ROLE_ADMIN", "ROLE_USER"]);
    }
}
