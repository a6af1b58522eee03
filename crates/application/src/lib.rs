//! Application services and ports.

#![forbid(unsafe_code)]

pub mod access_scoper;
mod authentication_service;
mod journal_service;
mod schedule_service;
mod token_ports;
mod user_ports;
mod user_service;

pub use access_scoper::{
    AccessDecision, Audience, Operation, RecordFilter, ResourceDescriptor, authorize, require,
};
pub use authentication_service::{
    AuthenticationService, DEFAULT_USER_LOOKUP_TIMEOUT, SignedIn, identity_for_user,
};
pub use journal_service::{JournalService, RecordQuery, RecordRepository};
pub use schedule_service::{ScheduleDraft, ScheduleRepository, ScheduleService};
pub use token_ports::{
    ClaimSet, IssuedToken, TokenClaims, TokenCodec, TokenRevocationList, hash_token,
};
pub use user_ports::{
    GroupRecord, GroupRepository, NewUser, PasswordHasher, UserRecord, UserRepository,
};
pub use user_service::{ProvisionParams, RegisterParams, UserService};
