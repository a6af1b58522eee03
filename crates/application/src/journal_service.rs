//! Diary service shared by grades, attendance and homework.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use classbook_core::{AppError, AppResult, Identity};
use classbook_domain::{Grade, JournalRecord};
use tracing::info;

use crate::access_scoper::{Audience, ResourceDescriptor, require, require_visible};

/// Repository port for one kind of journal record.
#[async_trait]
pub trait RecordRepository<T: JournalRecord>: Send + Sync {
    /// Lists every record.
    async fn list_records(&self) -> AppResult<Vec<T>>;

    /// Finds one record.
    async fn find_record(&self, record_id: &str) -> AppResult<Option<T>>;

    /// Inserts or replaces a record.
    async fn save_record(&self, record: T) -> AppResult<()>;

    /// Deletes a record. Returns whether it existed.
    async fn delete_record(&self, record_id: &str) -> AppResult<bool>;
}

/// Optional narrowing requested by a list call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordQuery<'a> {
    /// Student id from the path or query.
    pub student_id: Option<&'a str>,
    /// Group id from the path or query.
    pub group_id: Option<&'a str>,
    /// Subject from the query.
    pub subject: Option<&'a str>,
}

impl<'a> RecordQuery<'a> {
    /// Queries one student's records.
    #[must_use]
    pub fn student(student_id: &'a str) -> Self {
        Self {
            student_id: Some(student_id),
            ..Self::default()
        }
    }

    /// Queries one group's records.
    #[must_use]
    pub fn group(group_id: &'a str) -> Self {
        Self {
            group_id: Some(group_id),
            ..Self::default()
        }
    }
}

/// Access-checked CRUD over one kind of journal record.
pub struct JournalService<T: JournalRecord> {
    repository: Arc<dyn RecordRepository<T>>,
    _record: PhantomData<fn() -> T>,
}

impl<T: JournalRecord> Clone for JournalService<T> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: JournalRecord> JournalService<T> {
    /// Creates a new journal service.
    #[must_use]
    pub fn new(repository: Arc<dyn RecordRepository<T>>) -> Self {
        Self {
            repository,
            _record: PhantomData,
        }
    }

    /// Lists the records visible to the caller for an endpoint audience.
    pub async fn list(
        &self,
        identity: &Identity,
        audience: Audience,
        query: RecordQuery<'_>,
    ) -> AppResult<Vec<T>> {
        let resource = ResourceDescriptor::read(audience)
            .owner(query.student_id)
            .group(query.group_id)
            .subject(query.subject);
        let filter = require(identity, &resource)?;

        let records = self.repository.list_records().await?;
        Ok(filter.apply(records))
    }

    /// Finds one record the caller may see.
    pub async fn get(&self, identity: &Identity, audience: Audience, record_id: &str) -> AppResult<T> {
        let record = self.load(record_id).await?;
        let filter = require(identity, &ResourceDescriptor::read_record(audience, &record))?;
        require_visible(&filter, &record)?;
        Ok(record)
    }

    /// Creates a record. Staff only; scoped teachers only for their subject.
    pub async fn create(&self, identity: &Identity, mut record: T) -> AppResult<T> {
        require(
            identity,
            &ResourceDescriptor::write(Audience::Staff, record.subject()),
        )?;
        record.validate()?;

        record.assign_id(uuid::Uuid::new_v4().to_string());
        self.repository.save_record(record.clone()).await?;
        info!(
            kind = T::KIND,
            record_id = record.record_id(),
            subject = identity.subject_id(),
            "journal record created"
        );

        Ok(record)
    }

    /// Replaces a record. Both the stored and the new subject must be in scope.
    pub async fn update(&self, identity: &Identity, record_id: &str, mut record: T) -> AppResult<T> {
        let stored = self.load(record_id).await?;
        require(
            identity,
            &ResourceDescriptor::write(Audience::Staff, stored.subject()),
        )?;
        require(
            identity,
            &ResourceDescriptor::write(Audience::Staff, record.subject()),
        )?;
        record.validate()?;

        record.assign_id(stored.record_id().to_owned());
        self.repository.save_record(record.clone()).await?;
        info!(
            kind = T::KIND,
            record_id = record.record_id(),
            subject = identity.subject_id(),
            "journal record updated"
        );

        Ok(record)
    }

    /// Deletes a record whose subject is in scope.
    pub async fn delete(&self, identity: &Identity, record_id: &str) -> AppResult<()> {
        let stored = self.load(record_id).await?;
        require(
            identity,
            &ResourceDescriptor::write(Audience::Staff, stored.subject()),
        )?;

        if !self.repository.delete_record(stored.record_id()).await? {
            return Err(not_found::<T>(record_id));
        }
        info!(
            kind = T::KIND,
            record_id = stored.record_id(),
            subject = identity.subject_id(),
            "journal record deleted"
        );

        Ok(())
    }

    async fn load(&self, record_id: &str) -> AppResult<T> {
        self.repository
            .find_record(record_id)
            .await?
            .ok_or_else(|| not_found::<T>(record_id))
    }
}

impl JournalService<Grade> {
    /// Returns the mean grade of a student, `None` when nothing is graded.
    pub async fn average_for_student(
        &self,
        identity: &Identity,
        student_id: &str,
    ) -> AppResult<Option<f64>> {
        let grades = self
            .list(identity, Audience::SelfService, RecordQuery::student(student_id))
            .await?;

        if grades.is_empty() {
            return Ok(None);
        }

        let total: u32 = grades.iter().map(|grade| u32::from(grade.value)).sum();
        Ok(Some(f64::from(total) / grades.len() as f64))
    }
}

fn not_found<T: JournalRecord>(record_id: &str) -> AppError {
    AppError::NotFound(format!("{} '{record_id}' not found", T::KIND))
}

#[cfg(test)]
mod tests;
