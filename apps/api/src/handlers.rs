pub mod attendance;
pub mod auth;
pub mod grades;
pub mod health;
pub mod homework;
pub mod schedules;
pub mod users;

use classbook_application::{Audience, ResourceDescriptor, require};
use classbook_core::Identity;

use crate::error::ApiResult;

/// Rejects callers who may not write `subject` before their payload is parsed.
fn require_write_access(identity: &Identity, subject: &str) -> ApiResult<()> {
    require(identity, &ResourceDescriptor::write(Audience::Staff, subject))?;
    Ok(())
}
