use classbook_application::{GroupRecord, SignedIn, UserRecord};
use classbook_core::Identity;
use serde::{Deserialize, Serialize};

/// Credentials posted to `/api/auth/signin`. `username` is an email or user id.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}

/// Token plus the profile a client needs right after sign-in.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: &'static str,
    pub id: String,
    pub full_name: String,
    pub email: String,
    /// Comma-joined authority labels, the same value as the token's `roles` claim.
    pub roles: String,
    pub group_id: Option<String>,
    pub subject: Option<String>,
}

impl From<SignedIn> for SignInResponse {
    fn from(value: SignedIn) -> Self {
        Self {
            token: value.token.token,
            token_type: "Bearer",
            id: value.user.id,
            full_name: value.user.full_name,
            email: value.user.email,
            roles: value.identity.roles_claim(),
            group_id: value.user.group_id,
            subject: value.identity.scope_subject().map(str::to_owned),
        }
    }
}

/// Self-registration payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub group_id: Option<String>,
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub group_id: Option<String>,
    pub subject: Option<String>,
}

impl From<UserRecord> for UserResponse {
    fn from(value: UserRecord) -> Self {
        Self {
            id: value.id,
            full_name: value.full_name,
            email: value.email,
            role: value.role,
            group_id: value.group_id,
            subject: value.subject,
        }
    }
}

/// The caller as the access rules see it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityResponse {
    pub id: String,
    pub tier: String,
    pub roles: Vec<String>,
    pub group_id: Option<String>,
    pub subject: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
}

impl IdentityResponse {
    pub fn new(identity: &Identity, user: Option<UserRecord>) -> Self {
        let (full_name, email) = user
            .map(|user| (Some(user.full_name), Some(user.email)))
            .unwrap_or_default();

        Self {
            id: identity.subject_id().to_owned(),
            tier: identity.tier().as_str().to_owned(),
            roles: identity.authorities().to_vec(),
            group_id: identity.group_id().map(str::to_owned),
            subject: identity.scope_subject().map(str::to_owned),
            full_name,
            email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GroupResponse {
    pub id: String,
    pub name: String,
}

impl From<GroupRecord> for GroupResponse {
    fn from(value: GroupRecord) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}
