//! Bearer authentication, sign-in and sign-out.
//!
//! Produces the one canonical [`Identity`] for a request. A token whose
//! `roles` claim is populated is trusted as-is; an empty claim falls back
//! to a bounded user directory lookup.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use classbook_core::{AppError, AppResult, Identity};
use classbook_domain::{resolve_authorities, resolve_role};
use tracing::{info, warn};

use crate::{
    ClaimSet, IssuedToken, PasswordHasher, TokenClaims, TokenCodec, TokenRevocationList,
    UserRecord, UserRepository, hash_token,
};

/// Default bound on the fallback user lookup.
pub const DEFAULT_USER_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Successful sign-in.
#[derive(Debug, Clone)]
pub struct SignedIn {
    /// Token handed back to the client.
    pub token: IssuedToken,
    /// Authenticated account.
    pub user: UserRecord,
    /// Identity encoded in the token.
    pub identity: Identity,
}

/// Application service for the authentication filter and credential exchange.
#[derive(Clone)]
pub struct AuthenticationService {
    token_codec: Arc<dyn TokenCodec>,
    revocation_list: Arc<dyn TokenRevocationList>,
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    lookup_timeout: Duration,
}

impl AuthenticationService {
    /// Creates a new authentication service.
    #[must_use]
    pub fn new(
        token_codec: Arc<dyn TokenCodec>,
        revocation_list: Arc<dyn TokenRevocationList>,
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            token_codec,
            revocation_list,
            user_repository,
            password_hasher,
            lookup_timeout: DEFAULT_USER_LOOKUP_TIMEOUT,
        }
    }

    /// Overrides the fallback user lookup timeout.
    #[must_use]
    pub fn with_lookup_timeout(mut self, lookup_timeout: Duration) -> Self {
        self.lookup_timeout = lookup_timeout;
        self
    }

    /// Authenticates a raw bearer token now.
    pub async fn authenticate_bearer(&self, token: &str) -> AppResult<Identity> {
        self.authenticate_bearer_at(token, Utc::now()).await
    }

    /// Authenticates a raw bearer token at `now`.
    pub async fn authenticate_bearer_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Identity> {
        if !self.token_codec.validate_at(token, now) {
            return Err(AppError::unauthenticated());
        }

        if self
            .revocation_list
            .is_revoked(&hash_token(token), now)
            .await?
        {
            warn!(reason = "revoked", "bearer token rejected");
            return Err(AppError::unauthenticated());
        }

        let Some(claims) = self.token_codec.parse_claims(token) else {
            return Err(AppError::unauthenticated());
        };

        if claims.role_labels().next().is_some() {
            return Ok(identity_from_claims(claims));
        }

        self.identity_from_directory(&claims.subject).await
    }

    async fn identity_from_directory(&self, subject: &str) -> AppResult<Identity> {
        let lookup = self.user_repository.find_by_identifier_or_email(subject);
        match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Ok(Ok(Some(user))) => Ok(identity_for_user(&user)),
            Ok(Ok(None)) => {
                warn!(reason = "unknown_subject", "bearer token rejected");
                Err(AppError::unauthenticated())
            }
            Ok(Err(error)) => Err(error),
            Err(_) => {
                warn!(
                    reason = "lookup_timeout",
                    timeout = ?self.lookup_timeout,
                    "bearer token rejected"
                );
                Err(AppError::unauthenticated())
            }
        }
    }

    /// Exchanges credentials for a signed token.
    ///
    /// Unknown users and wrong passwords fail with the same generic error.
    pub async fn sign_in(&self, username: &str, password: &str) -> AppResult<SignedIn> {
        let user = self
            .user_repository
            .find_by_identifier_or_email(username.trim())
            .await?;

        let stored_hash = user
            .as_ref()
            .map_or(self.password_hasher.decoy_hash(), |user| {
                user.password_hash.as_str()
            });
        let verified = self.password_hasher.verify_password(password, stored_hash)?;

        let Some(user) = user else {
            warn!(reason = "unknown_user", "sign-in rejected");
            return Err(invalid_credentials());
        };
        if !verified {
            warn!(user_id = %user.id, reason = "wrong_password", "sign-in rejected");
            return Err(invalid_credentials());
        }

        let identity = identity_for_user(&user);
        let token = self.token_codec.issue(&ClaimSet::for_identity(&identity))?;
        info!(user_id = %user.id, tier = %identity.tier(), "user signed in");

        Ok(SignedIn {
            token,
            user,
            identity,
        })
    }

    /// Revokes a token until its own expiry.
    pub async fn sign_out(&self, token: &str) -> AppResult<()> {
        let Some(claims) = self.token_codec.parse_claims(token) else {
            return Err(AppError::unauthenticated());
        };

        self.revocation_list
            .revoke(&hash_token(token), claims.expires_at)
            .await?;
        info!(subject = %claims.subject, "token revoked");

        Ok(())
    }

    /// Looks up the account behind an identity.
    pub async fn find_user(&self, identity: &Identity) -> AppResult<Option<UserRecord>> {
        self.user_repository
            .find_by_identifier_or_email(identity.subject_id())
            .await
    }
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("invalid username or password".to_owned())
}

/// Builds the identity of a stored account from its raw role string.
#[must_use]
pub fn identity_for_user(user: &UserRecord) -> Identity {
    let resolution = resolve_role(Some(user.role.as_str()));
    let granted_tiers = resolution.granted_tiers();
    let authorities = resolution.authorities();
    let role = resolution.into_role(user.subject.as_deref());

    Identity::new(
        user.id.clone(),
        role,
        granted_tiers,
        authorities,
        user.group_id.clone(),
    )
}

fn identity_from_claims(claims: TokenClaims) -> Identity {
    let authorities: Vec<String> = claims.role_labels().map(ToOwned::to_owned).collect();
    let granted = resolve_authorities(authorities.iter().map(String::as_str));
    let granted_tiers = granted.tiers.clone();
    let role = granted.into_role(claims.scope.as_deref());

    Identity::new(
        claims.subject,
        role,
        granted_tiers,
        authorities,
        claims.group,
    )
}
