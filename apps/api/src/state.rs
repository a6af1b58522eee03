use std::sync::Arc;

use classbook_application::{
    AuthenticationService, GroupRepository, JournalService, PasswordHasher, ScheduleService,
    UserRepository, UserService,
};
use classbook_core::AppResult;
use classbook_domain::{AttendanceRecord, Grade, Homework};
use classbook_infrastructure::{
    Argon2PasswordHasher, InMemoryGroupRepository, InMemoryRecordRepository,
    InMemoryScheduleRepository, InMemoryTokenRevocationList, InMemoryUserRepository,
    JwtTokenCodec,
};

use crate::api_config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authentication_service: AuthenticationService,
    pub user_service: UserService,
    pub schedule_service: ScheduleService,
    pub grade_service: JournalService<Grade>,
    pub attendance_service: JournalService<AttendanceRecord>,
    pub homework_service: JournalService<Homework>,
}

impl AppState {
    /// Wires every service to the in-memory adapters.
    pub fn in_memory(config: &ApiConfig) -> AppResult<Self> {
        let token_codec = Arc::new(JwtTokenCodec::new(&config.jwt_secret, config.token_ttl)?);
        let revocation_list = Arc::new(InMemoryTokenRevocationList::new());
        let user_repository: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
        let group_repository: Arc<dyn GroupRepository> = Arc::new(InMemoryGroupRepository::new());
        let password_hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new()?);

        let authentication_service = AuthenticationService::new(
            token_codec,
            revocation_list,
            user_repository.clone(),
            password_hasher.clone(),
        )
        .with_lookup_timeout(config.user_lookup_timeout);

        Ok(Self {
            authentication_service,
            user_service: UserService::new(
                user_repository,
                group_repository.clone(),
                password_hasher,
            ),
            schedule_service: ScheduleService::new(
                Arc::new(InMemoryScheduleRepository::new()),
                group_repository,
            ),
            grade_service: JournalService::new(Arc::new(InMemoryRecordRepository::<Grade>::new())),
            attendance_service: JournalService::new(Arc::new(
                InMemoryRecordRepository::<AttendanceRecord>::new(),
            )),
            homework_service: JournalService::new(Arc::new(
                InMemoryRecordRepository::<Homework>::new(),
            )),
        })
    }
}
