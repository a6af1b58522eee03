//! Lesson schedule management.
//!
//! Every create and update runs the conflict detector against the
//! candidate's `(group, day)` partition inside the repository's save, so
//! an overlapping lesson is never persisted.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Weekday;
use classbook_core::{AppError, AppResult, Identity};
use classbook_domain::{ScheduleEntry, ScheduledInterval, TimeSlot, day_name};
use tracing::info;

use crate::GroupRepository;
use crate::access_scoper::{Audience, ResourceDescriptor, require, require_visible};

/// Repository port for schedule entries.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// Lists every entry.
    async fn list_entries(&self) -> AppResult<Vec<ScheduleEntry>>;

    /// Finds one entry.
    async fn find_entry(&self, entry_id: &str) -> AppResult<Option<ScheduleEntry>>;

    /// Lists the entries of one group on one day.
    async fn existing_entries(&self, group_id: &str, day: Weekday)
    -> AppResult<Vec<ScheduleEntry>>;

    /// Inserts or replaces `entry` unless it overlaps another lesson of the
    /// same group and day, ignoring `exclude_id`.
    ///
    /// The check and the write happen atomically. Returns the conflicting
    /// interval when nothing was saved.
    async fn save_if_free(
        &self,
        entry: ScheduleEntry,
        exclude_id: Option<&str>,
    ) -> AppResult<Option<ScheduledInterval>>;

    /// Deletes an entry. Returns whether it existed.
    async fn delete_entry(&self, entry_id: &str) -> AppResult<bool>;
}

/// Lesson fields supplied on create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleDraft {
    /// Owning group.
    pub group_id: String,
    /// Day of week.
    pub day: Weekday,
    /// Time window.
    pub slot: TimeSlot,
    /// Discipline taught.
    pub subject: String,
    /// Teacher display name.
    pub teacher: Option<String>,
    /// Room label.
    pub room: Option<String>,
}

impl ScheduleDraft {
    fn into_entry(self, id: String) -> ScheduleEntry {
        ScheduleEntry {
            id,
            group_id: self.group_id.trim().to_owned(),
            day: self.day,
            slot: self.slot,
            subject: self.subject.trim().to_owned(),
            teacher: self.teacher,
            room: self.room,
        }
    }
}

/// Application service for schedule reads and conflict-checked writes.
#[derive(Clone)]
pub struct ScheduleService {
    schedule_repository: Arc<dyn ScheduleRepository>,
    group_repository: Arc<dyn GroupRepository>,
}

impl ScheduleService {
    /// Creates a new schedule service.
    #[must_use]
    pub fn new(
        schedule_repository: Arc<dyn ScheduleRepository>,
        group_repository: Arc<dyn GroupRepository>,
    ) -> Self {
        Self {
            schedule_repository,
            group_repository,
        }
    }

    /// Lists the entries visible to the caller.
    pub async fn list(&self, identity: &Identity) -> AppResult<Vec<ScheduleEntry>> {
        let filter = require(identity, &ResourceDescriptor::read(Audience::GroupScoped))?;
        let entries = self.schedule_repository.list_entries().await?;
        Ok(sorted(filter.apply(entries)))
    }

    /// Lists one day's entries.
    ///
    /// Students always get their own group. Staff get the `group_id` they
    /// asked for, or every group when they name none.
    pub async fn list_for_day(
        &self,
        identity: &Identity,
        day: Weekday,
        group_id: Option<&str>,
    ) -> AppResult<Vec<ScheduleEntry>> {
        let resource = ResourceDescriptor::read(Audience::GroupScoped).group(group_id);
        let filter = require(identity, &resource)?;

        let entries = match filter.group_id.as_deref() {
            Some(group_id) => {
                self.schedule_repository
                    .existing_entries(group_id, day)
                    .await?
            }
            None => self
                .schedule_repository
                .list_entries()
                .await?
                .into_iter()
                .filter(|entry| entry.day == day)
                .collect(),
        };

        Ok(sorted(filter.apply(entries)))
    }

    /// Finds one entry the caller may see.
    pub async fn get(&self, identity: &Identity, entry_id: &str) -> AppResult<ScheduleEntry> {
        let entry = self.load(entry_id).await?;
        let filter = require(
            identity,
            &ResourceDescriptor::read_record(Audience::GroupScoped, &entry),
        )?;
        require_visible(&filter, &entry)?;
        Ok(entry)
    }

    /// Creates an entry after the group and conflict checks.
    pub async fn create(
        &self,
        identity: &Identity,
        draft: ScheduleDraft,
    ) -> AppResult<ScheduleEntry> {
        require(
            identity,
            &ResourceDescriptor::write(Audience::Staff, &draft.subject),
        )?;

        let entry = draft.into_entry(uuid::Uuid::new_v4().to_string());
        self.check_and_save(entry, None).await
    }

    /// Replaces an entry after the group and conflict checks, ignoring itself.
    pub async fn update(
        &self,
        identity: &Identity,
        entry_id: &str,
        draft: ScheduleDraft,
    ) -> AppResult<ScheduleEntry> {
        let stored = self.load(entry_id).await?;
        require(
            identity,
            &ResourceDescriptor::write(Audience::Staff, &stored.subject),
        )?;
        require(
            identity,
            &ResourceDescriptor::write(Audience::Staff, &draft.subject),
        )?;

        let entry = draft.into_entry(stored.id);
        let exclude_id = entry.id.clone();
        self.check_and_save(entry, Some(&exclude_id)).await
    }

    /// Deletes an entry.
    pub async fn delete(&self, identity: &Identity, entry_id: &str) -> AppResult<()> {
        let stored = self.load(entry_id).await?;
        require(
            identity,
            &ResourceDescriptor::write(Audience::Staff, &stored.subject),
        )?;

        if !self.schedule_repository.delete_entry(&stored.id).await? {
            return Err(not_found(entry_id));
        }
        info!(entry_id = %stored.id, subject = %identity.subject_id(), "schedule entry deleted");

        Ok(())
    }

    async fn load(&self, entry_id: &str) -> AppResult<ScheduleEntry> {
        self.schedule_repository
            .find_entry(entry_id)
            .await?
            .ok_or_else(|| not_found(entry_id))
    }

    async fn check_and_save(
        &self,
        entry: ScheduleEntry,
        exclude_id: Option<&str>,
    ) -> AppResult<ScheduleEntry> {
        if entry.subject.is_empty() {
            return Err(AppError::Validation("subject must not be empty".to_owned()));
        }

        if !self.group_repository.group_exists(&entry.group_id).await? {
            return Err(AppError::Validation(format!(
                "group '{}' does not exist",
                entry.group_id
            )));
        }

        if let Some(conflict) = self
            .schedule_repository
            .save_if_free(entry.clone(), exclude_id)
            .await?
        {
            return Err(AppError::Validation(format!(
                "group '{}' already has a lesson on {} at {} overlapping {}",
                entry.group_id,
                day_name(entry.day),
                conflict.slot,
                entry.slot
            )));
        }

        info!(
            entry_id = %entry.id,
            group_id = %entry.group_id,
            day = day_name(entry.day),
            slot = %entry.slot,
            "schedule entry saved"
        );

        Ok(entry)
    }
}

fn not_found(entry_id: &str) -> AppError {
    AppError::NotFound(format!("schedule entry '{entry_id}' not found"))
}

fn sorted(mut entries: Vec<ScheduleEntry>) -> Vec<ScheduleEntry> {
    entries.sort_by(|left, right| {
        left.group_id
            .cmp(&right.group_id)
            .then(left.day.num_days_from_monday().cmp(&right.day.num_days_from_monday()))
            .then(left.slot.start().cmp(&right.slot.start()))
    });
    entries
}
