//! User directory, group and password hashing ports.

use async_trait::async_trait;
use classbook_core::AppResult;

/// Stored user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// User identifier.
    pub id: String,
    /// Display name.
    pub full_name: String,
    /// Canonical email address.
    pub email: String,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Group the user belongs to.
    pub group_id: Option<String>,
    /// Raw role string as stored.
    pub role: String,
    /// Explicit discipline, overrides the role keyword hint.
    pub subject: Option<String>,
}

/// Data for a new user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Display name.
    pub full_name: String,
    /// Canonical email address.
    pub email: String,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Group the user belongs to.
    pub group_id: Option<String>,
    /// Raw role string.
    pub role: String,
    /// Explicit discipline.
    pub subject: Option<String>,
}

/// Repository port for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user whose id or email (case-insensitive) equals `identifier`.
    async fn find_by_identifier_or_email(&self, identifier: &str)
    -> AppResult<Option<UserRecord>>;

    /// Returns whether an account with this email exists.
    async fn email_exists(&self, email: &str) -> AppResult<bool>;

    /// Persists a new account and returns it with its assigned id.
    async fn create(&self, user: NewUser) -> AppResult<UserRecord>;

    /// Lists every account ordered by email.
    async fn list_users(&self) -> AppResult<Vec<UserRecord>>;
}

/// Class group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecord {
    /// Group identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Repository port for class groups.
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Returns whether the group exists.
    async fn group_exists(&self, group_id: &str) -> AppResult<bool>;

    /// Lists groups ordered by id.
    async fn list_groups(&self) -> AppResult<Vec<GroupRecord>>;

    /// Inserts or replaces a group.
    async fn save_group(&self, group: GroupRecord) -> AppResult<()>;
}

/// Port for password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;

    /// Hash of no account's password, verified against for unknown usernames.
    fn decoy_hash(&self) -> &str;
}
