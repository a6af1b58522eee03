//! Registration, the user directory and the group directory.
//!
//! Self-registration only ever creates `USER` accounts; staff accounts come
//! from [`UserService::provision`], which the composition root uses for
//! bootstrap data. Directory reads are for staff: the full listing and the
//! per-role listing are admin-only, group rosters and single lookups are
//! open to teachers too.

use std::sync::Arc;

use classbook_core::{AppError, AppResult, Identity, NonEmptyString, Tier};
use classbook_domain::{EmailAddress, normalize_group_id, resolve_role, validate_password};
use tracing::info;

use crate::access_scoper::{Audience, ResourceDescriptor, require};
use crate::{GroupRecord, GroupRepository, NewUser, PasswordHasher, UserRecord, UserRepository};

/// Parameters for self-registration.
#[derive(Debug, Clone)]
pub struct RegisterParams {
    /// Display name.
    pub full_name: String,
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Requested group; blank selects the default group.
    pub group_id: Option<String>,
}

/// Parameters for an operator-provisioned account.
#[derive(Debug, Clone)]
pub struct ProvisionParams {
    /// Display name.
    pub full_name: String,
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Group, if any.
    pub group_id: Option<String>,
    /// Raw role string such as `ADMIN` or `TEACHER_PHYSICS`.
    pub role: String,
    /// Explicit discipline.
    pub subject: Option<String>,
}

/// Application service for account creation.
#[derive(Clone)]
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
    group_repository: Arc<dyn GroupRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        group_repository: Arc<dyn GroupRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            user_repository,
            group_repository,
            password_hasher,
        }
    }

    /// Registers a `USER` account.
    pub async fn register(&self, params: RegisterParams) -> AppResult<UserRecord> {
        let group_id = normalize_group_id(params.group_id.as_deref());
        if !self.group_repository.group_exists(&group_id).await? {
            return Err(AppError::Validation(format!(
                "group '{group_id}' does not exist"
            )));
        }

        let user = self
            .create_account(ProvisionParams {
                full_name: params.full_name,
                email: params.email,
                password: params.password,
                group_id: Some(group_id),
                role: Tier::User.as_str().to_owned(),
                subject: None,
            })
            .await?;
        info!(user_id = %user.id, group_id = ?user.group_id, "user registered");

        Ok(user)
    }

    /// Creates an account with an arbitrary role. Never exposed to callers.
    pub async fn provision(&self, params: ProvisionParams) -> AppResult<UserRecord> {
        let user = self.create_account(params).await?;
        info!(user_id = %user.id, role = %user.role, "account provisioned");
        Ok(user)
    }

    async fn create_account(&self, params: ProvisionParams) -> AppResult<UserRecord> {
        let full_name = NonEmptyString::new(params.full_name)?;
        let email = EmailAddress::new(params.email)?;
        validate_password(&params.password)?;

        if self.user_repository.email_exists(email.as_str()).await? {
            return Err(AppError::Conflict(format!(
                "email '{}' is already registered",
                email.as_str()
            )));
        }

        let password_hash = self.password_hasher.hash_password(&params.password)?;
        self.user_repository
            .create(NewUser {
                full_name: full_name.into(),
                email: email.into(),
                password_hash,
                group_id: params.group_id,
                role: params.role,
                subject: params
                    .subject
                    .map(|subject| subject.trim().to_owned())
                    .filter(|subject| !subject.is_empty()),
            })
            .await
    }

    /// Lists every account. Administrators only.
    pub async fn list_users(&self, identity: &Identity) -> AppResult<Vec<UserRecord>> {
        require(identity, &ResourceDescriptor::read(Audience::AdminOnly))?;
        self.user_repository.list_users().await
    }

    /// Lists accounts holding `role`. `teacher_math`, `TEACHER_MATH` and
    /// `ROLE_TEACHER_MATH` name the same role. Administrators only.
    pub async fn users_with_role(
        &self,
        identity: &Identity,
        role: &str,
    ) -> AppResult<Vec<UserRecord>> {
        require(identity, &ResourceDescriptor::read(Audience::AdminOnly))?;

        let wanted = resolve_role(Some(role));
        let users = self.user_repository.list_users().await?;
        Ok(users
            .into_iter()
            .filter(|user| resolve_role(Some(user.role.as_str())).label() == wanted.label())
            .collect())
    }

    /// Lists the members of one group. Staff only.
    pub async fn group_members(
        &self,
        identity: &Identity,
        group_id: &str,
    ) -> AppResult<Vec<UserRecord>> {
        require(
            identity,
            &ResourceDescriptor::read(Audience::Staff).group(Some(group_id)),
        )?;

        let group_id = group_id.trim();
        let users = self.user_repository.list_users().await?;
        Ok(users
            .into_iter()
            .filter(|user| user.group_id.as_deref() == Some(group_id))
            .collect())
    }

    /// Finds one account by id or email. Staff only.
    pub async fn find_account(
        &self,
        identity: &Identity,
        identifier: &str,
    ) -> AppResult<UserRecord> {
        require(identity, &ResourceDescriptor::read(Audience::Staff))?;
        self.user_repository
            .find_by_identifier_or_email(identifier.trim())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{}' not found", identifier.trim())))
    }

    /// Lists the groups a new user can join.
    pub async fn list_groups(&self) -> AppResult<Vec<GroupRecord>> {
        self.group_repository.list_groups().await
    }

    /// Creates the group unless it already exists.
    pub async fn ensure_group(&self, group_id: &str, name: &str) -> AppResult<()> {
        if self.group_repository.group_exists(group_id).await? {
            return Ok(());
        }

        self.group_repository
            .save_group(GroupRecord {
                id: group_id.to_owned(),
                name: name.to_owned(),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use classbook_core::{AppError, AppResult, Identity, Role, Tier};
    use tokio::sync::Mutex;

    use crate::{
        GroupRecord, GroupRepository, NewUser, PasswordHasher, UserRecord, UserRepository,
    };

    use super::{ProvisionParams, RegisterParams, UserService};

    #[derive(Default)]
    struct FakeUserRepository {
        users: Mutex<Vec<UserRecord>>,
    }

    #[async_trait]
    impl UserRepository for FakeUserRepository {
        async fn find_by_identifier_or_email(
            &self,
            identifier: &str,
        ) -> AppResult<Option<UserRecord>> {
            Ok(self
                .users
                .lock()
                .await
                .iter()
                .find(|user| user.id == identifier || user.email == identifier)
                .cloned())
        }

        async fn email_exists(&self, email: &str) -> AppResult<bool> {
            Ok(self.users.lock().await.iter().any(|user| user.email == email))
        }

        async fn create(&self, user: NewUser) -> AppResult<UserRecord> {
            let mut users = self.users.lock().await;
            let record = UserRecord {
                id: format!("u-{}", users.len() + 1),
                full_name: user.full_name,
                email: user.email,
                password_hash: user.password_hash,
                group_id: user.group_id,
                role: user.role,
                subject: user.subject,
            };
            users.push(record.clone());
            Ok(record)
        }

        async fn list_users(&self) -> AppResult<Vec<UserRecord>> {
            let mut users = self.users.lock().await.clone();
            users.sort_by(|left, right| left.email.cmp(&right.email));
            Ok(users)
        }
    }

    #[derive(Default)]
    struct FakeGroupRepository {
        groups: Mutex<BTreeMap<String, String>>,
    }

    #[async_trait]
    impl GroupRepository for FakeGroupRepository {
        async fn group_exists(&self, group_id: &str) -> AppResult<bool> {
            Ok(self.groups.lock().await.contains_key(group_id))
        }

        async fn list_groups(&self) -> AppResult<Vec<GroupRecord>> {
            Ok(self
                .groups
                .lock()
                .await
                .iter()
                .map(|(id, name)| GroupRecord {
                    id: id.clone(),
                    name: name.clone(),
                })
                .collect())
        }

        async fn save_group(&self, group: GroupRecord) -> AppResult<()> {
            self.groups.lock().await.insert(group.id, group.name);
            Ok(())
        }
    }

    struct FakePasswordHasher;

    impl PasswordHasher for FakePasswordHasher {
        fn hash_password(&self, password: &str) -> AppResult<String> {
            Ok(format!("hashed:{password}"))
        }

        fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
            Ok(hash == format!("hashed:{password}"))
        }

        fn decoy_hash(&self) -> &str {
            "decoy"
        }
    }

    async fn service() -> UserService {
        let service = UserService::new(
            Arc::new(FakeUserRepository::default()),
            Arc::new(FakeGroupRepository::default()),
            Arc::new(FakePasswordHasher),
        );
        for (id, name) in [("user-group", "Default"), ("10a", "Class 10A")] {
            if let Err(error) = service.ensure_group(id, name).await {
                panic!("group seeding failed: {error}");
            }
        }
        service
    }

    fn params(email: &str, group_id: Option<&str>) -> RegisterParams {
        RegisterParams {
            full_name: "Ada Pupil".to_owned(),
            email: email.to_owned(),
            password: "long-enough-password".to_owned(),
            group_id: group_id.map(ToOwned::to_owned),
        }
    }

    #[tokio::test]
    async fn registration_creates_a_user_tier_account() {
        let service = service().await;
        let user = service.register(params("Ada@School.org", Some("10a"))).await;
        let Ok(user) = user else {
            panic!("registration should succeed");
        };

        assert_eq!(user.role, "USER");
        assert_eq!(user.email, "ada@school.org");
        assert_eq!(user.group_id.as_deref(), Some("10a"));
        assert_eq!(user.password_hash, "hashed:long-enough-password");
    }

    #[tokio::test]
    async fn blank_group_defaults_to_user_group() {
        let service = service().await;
        let user = service.register(params("ada@school.org", Some("  "))).await;
        assert_eq!(
            user.ok().and_then(|user| user.group_id),
            Some("user-group".to_owned())
        );
    }

    #[tokio::test]
    async fn unknown_group_is_rejected() {
        let service = service().await;
        let result = service.register(params("ada@school.org", Some("11c"))).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let service = service().await;
        assert!(service.register(params("ada@school.org", None)).await.is_ok());
        let result = service.register(params("ADA@school.org", None)).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let service = service().await;
        let mut request = params("ada@school.org", None);
        request.password = "short".to_owned();
        let result = service.register(request).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn provisioning_keeps_the_requested_role() {
        let service = service().await;
        let user = service
            .provision(ProvisionParams {
                full_name: "Grace Teacher".to_owned(),
                email: "grace@school.org".to_owned(),
                password: "long-enough-password".to_owned(),
                group_id: None,
                role: "TEACHER_PHYSICS".to_owned(),
                subject: Some(" ".to_owned()),
            })
            .await;
        let Ok(user) = user else {
            panic!("provisioning should succeed");
        };
        assert_eq!(user.role, "TEACHER_PHYSICS");
        assert_eq!(user.subject, None);
    }

    #[tokio::test]
    async fn ensure_group_is_idempotent() {
        let service = service().await;
        assert!(service.ensure_group("10a", "Renamed").await.is_ok());
        let groups = service.list_groups().await.unwrap_or_default();
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().any(|group| group.name == "Class 10A"));
    }

    fn identity(role: Role) -> Identity {
        let tiers = match role {
            Role::Admin => vec![Tier::Teacher, Tier::User],
            Role::Teacher { .. } | Role::User => Vec::new(),
        };
        Identity::new("caller", role, tiers, Vec::new(), None)
    }

    async fn directory() -> UserService {
        let service = service().await;
        for (email, role, group_id) in [
            ("ada@school.org", "USER", Some("10a")),
            ("bob@school.org", "USER", Some("user-group")),
            ("grace@school.org", "TEACHER_MATH", None),
            ("root@school.org", "ADMIN", None),
        ] {
            let provisioned = service
                .provision(ProvisionParams {
                    full_name: email.to_owned(),
                    email: email.to_owned(),
                    password: "long-enough-password".to_owned(),
                    group_id: group_id.map(ToOwned::to_owned),
                    role: role.to_owned(),
                    subject: None,
                })
                .await;
            if let Err(error) = provisioned {
                panic!("provisioning {email} failed: {error}");
            }
        }
        service
    }

    fn emails(users: &[UserRecord]) -> Vec<&str> {
        users.iter().map(|user| user.email.as_str()).collect()
    }

    #[tokio::test]
    async fn only_admins_list_the_whole_directory() {
        let service = directory().await;

        let all = service.list_users(&identity(Role::Admin)).await;
        let Ok(all) = all else {
            panic!("admin should list users");
        };
        assert_eq!(all.len(), 4);

        let teacher = Role::Teacher { subject: None };
        for caller in [identity(teacher), identity(Role::User)] {
            assert!(matches!(
                service.list_users(&caller).await,
                Err(AppError::Forbidden(_))
            ));
            assert!(matches!(
                service.users_with_role(&caller, "ADMIN").await,
                Err(AppError::Forbidden(_))
            ));
        }
    }

    #[tokio::test]
    async fn role_listing_accepts_any_spelling_of_the_role() {
        let service = directory().await;
        let admin = identity(Role::Admin);

        for role in ["TEACHER_MATH", "teacher_math", "ROLE_TEACHER_MATH"] {
            let users = service.users_with_role(&admin, role).await.unwrap_or_default();
            assert_eq!(emails(&users), vec!["grace@school.org"], "{role}");
        }

        let students = service.users_with_role(&admin, "user").await.unwrap_or_default();
        assert_eq!(emails(&students), vec!["ada@school.org", "bob@school.org"]);
    }

    #[tokio::test]
    async fn staff_read_group_rosters() {
        let service = directory().await;
        let teacher = identity(Role::Teacher {
            subject: Some("Mathematics".to_owned()),
        });

        let roster = service.group_members(&teacher, "10a").await.unwrap_or_default();
        assert_eq!(emails(&roster), vec!["ada@school.org"]);

        assert!(matches!(
            service.group_members(&identity(Role::User), "10a").await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn staff_look_up_single_accounts() {
        let service = directory().await;
        let teacher = identity(Role::Teacher { subject: None });

        let found = service.find_account(&teacher, " ada@school.org ").await;
        assert_eq!(
            found.ok().map(|user| user.email),
            Some("ada@school.org".to_owned())
        );

        assert!(matches!(
            service.find_account(&teacher, "ghost@school.org").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.find_account(&identity(Role::User), "ada@school.org").await,
            Err(AppError::Forbidden(_))
        ));
    }
}
