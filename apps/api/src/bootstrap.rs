//! Startup seeding through the regular application services.

use chrono::{NaiveTime, Weekday};
use classbook_application::{ProvisionParams, ScheduleDraft};
use classbook_core::{AppError, AppResult, Identity, Tier};
use classbook_domain::{DEFAULT_GROUP_ID, TimeSlot, resolve_role};
use tracing::info;

use crate::api_config::ApiConfig;
use crate::state::AppState;

const ADMIN_GROUP_ID: &str = "admin-group";
const DEMO_GROUP_ID: &str = "10a";

pub async fn seed(state: &AppState, config: &ApiConfig) -> AppResult<()> {
    state
        .user_service
        .ensure_group(ADMIN_GROUP_ID, "Admin Group")
        .await?;
    state
        .user_service
        .ensure_group(DEFAULT_GROUP_ID, "User Group")
        .await?;

    if let Some(admin) = &config.bootstrap_admin {
        let provisioned = state
            .user_service
            .provision(ProvisionParams {
                full_name: "Administrator".to_owned(),
                email: admin.email.clone(),
                password: admin.password.clone(),
                group_id: Some(ADMIN_GROUP_ID.to_owned()),
                role: Tier::Admin.as_str().to_owned(),
                subject: None,
            })
            .await;

        match provisioned {
            Ok(_) | Err(AppError::Conflict(_)) => {}
            Err(error) => return Err(error),
        }
    }

    if config.seed_demo_data {
        seed_demo_data(state).await?;
    }

    Ok(())
}

async fn seed_demo_data(state: &AppState) -> AppResult<()> {
    state.user_service.ensure_group(DEMO_GROUP_ID, "Class 10A").await?;

    let operator = system_identity();
    let lessons = [
        (Weekday::Mon, (9, 0), (10, 0), "Mathematics", "101"),
        (Weekday::Mon, (10, 0), (11, 0), "Physics", "204"),
        (Weekday::Tue, (9, 0), (10, 0), "History", "110"),
    ];

    for (day, start, end, subject, room) in lessons {
        let slot = TimeSlot::new(time(start)?, time(end)?)?;
        state
            .schedule_service
            .create(
                &operator,
                ScheduleDraft {
                    group_id: DEMO_GROUP_ID.to_owned(),
                    day,
                    slot,
                    subject: subject.to_owned(),
                    teacher: None,
                    room: Some(room.to_owned()),
                },
            )
            .await?;
    }

    info!(lessons = lessons.len(), "demo data seeded");
    Ok(())
}

fn system_identity() -> Identity {
    let resolution = resolve_role(Some(Tier::Admin.as_str()));
    let granted_tiers = resolution.granted_tiers();
    let authorities = resolution.authorities();
    Identity::new(
        "bootstrap",
        resolution.into_role(None),
        granted_tiers,
        authorities,
        None,
    )
}

fn time((hour, minute): (u32, u32)) -> AppResult<NaiveTime> {
    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| AppError::Internal(format!("invalid demo lesson time {hour}:{minute}")))
}
