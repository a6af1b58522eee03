//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod in_memory_group_repository;
mod in_memory_record_repository;
mod in_memory_schedule_repository;
mod in_memory_token_revocation_list;
mod in_memory_user_repository;
mod jwt_token_codec;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use in_memory_group_repository::InMemoryGroupRepository;
pub use in_memory_record_repository::InMemoryRecordRepository;
pub use in_memory_schedule_repository::InMemoryScheduleRepository;
pub use in_memory_token_revocation_list::InMemoryTokenRevocationList;
pub use in_memory_user_repository::InMemoryUserRepository;
pub use jwt_token_codec::{
    DEFAULT_TOKEN_TTL_HOURS, JwtTokenCodec, MAX_TOKEN_TTL_HOURS, MIN_SECRET_LENGTH,
};
