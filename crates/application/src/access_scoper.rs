//! Per-resource authorization and result narrowing.
//!
//! Every handler describes what it is about to touch with a
//! [`ResourceDescriptor`] and asks [`authorize`] whether the caller may
//! proceed. An allowed decision carries the [`RecordFilter`] the handler
//! must apply to whatever it loads.

use classbook_core::{AppError, AppResult, Identity, Tier};
use classbook_domain::ScopedRecord;

/// Kind of access requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Listing or fetching records.
    Read,
    /// Creating, updating or deleting records.
    Write,
}

/// Who an endpoint is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Administrators only.
    AdminOnly,
    /// Administrators and teachers.
    Staff,
    /// Any caller, restricted to their own records unless staff.
    SelfService,
    /// Any caller, restricted to their own group unless staff.
    GroupScoped,
}

/// Description of the resource a request is about to touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDescriptor<'a> {
    /// Requested operation.
    pub operation: Operation,
    /// Endpoint audience.
    pub audience: Audience,
    /// Student id named by the request.
    pub owner_id: Option<&'a str>,
    /// Group named by the request.
    pub group_id: Option<&'a str>,
    /// Subject filter named by the request.
    pub subject: Option<&'a str>,
    /// Subject of the record being written.
    pub payload_subject: Option<&'a str>,
}

impl<'a> ResourceDescriptor<'a> {
    /// Describes a read.
    #[must_use]
    pub fn read(audience: Audience) -> Self {
        Self::new(Operation::Read, audience)
    }

    /// Describes a write of a record with `payload_subject`.
    #[must_use]
    pub fn write(audience: Audience, payload_subject: &'a str) -> Self {
        Self {
            payload_subject: Some(payload_subject),
            ..Self::new(Operation::Write, audience)
        }
    }

    /// Describes a read of one stored record.
    ///
    /// The record's group is only named for group-scoped endpoints.
    #[must_use]
    pub fn read_record<R: ScopedRecord>(audience: Audience, record: &'a R) -> Self {
        let group_id = (audience == Audience::GroupScoped).then(|| record.group_id());
        Self {
            owner_id: record.student_id(),
            group_id,
            ..Self::read(audience)
        }
    }

    fn new(operation: Operation, audience: Audience) -> Self {
        Self {
            operation,
            audience,
            owner_id: None,
            group_id: None,
            subject: None,
            payload_subject: None,
        }
    }

    /// Names the student the request targets.
    #[must_use]
    pub fn owner(mut self, owner_id: Option<&'a str>) -> Self {
        self.owner_id = owner_id.map(str::trim).filter(|value| !value.is_empty());
        self
    }

    /// Names the group the request targets.
    #[must_use]
    pub fn group(mut self, group_id: Option<&'a str>) -> Self {
        self.group_id = group_id.map(str::trim).filter(|value| !value.is_empty());
        self
    }

    /// Names the subject the request filters on.
    #[must_use]
    pub fn subject(mut self, subject: Option<&'a str>) -> Self {
        self.subject = subject.map(str::trim).filter(|value| !value.is_empty());
        self
    }
}

/// Narrowing a handler applies to loaded records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Keep only records owned by this student.
    pub student_id: Option<String>,
    /// Keep only records of this group.
    pub group_id: Option<String>,
    /// Keep only records of this subject (case-insensitive).
    pub subject: Option<String>,
    /// Keep group-wide records and those assigned to this student.
    pub assignee: Option<String>,
}

impl RecordFilter {
    /// Returns whether `record` survives the narrowing.
    #[must_use]
    pub fn matches<R: ScopedRecord>(&self, record: &R) -> bool {
        let student_ok = self
            .student_id
            .as_deref()
            .is_none_or(|student_id| record.student_id() == Some(student_id));
        let group_ok = self
            .group_id
            .as_deref()
            .is_none_or(|group_id| record.group_id() == group_id);
        let subject_ok = self
            .subject
            .as_deref()
            .is_none_or(|subject| same_subject(record.subject(), subject));
        let assignee_ok = self.assignee.as_deref().is_none_or(|assignee| {
            record
                .student_id()
                .is_none_or(|student_id| student_id == assignee)
        });

        student_ok && group_ok && subject_ok && assignee_ok
    }

    /// Keeps the records that survive the narrowing.
    #[must_use]
    pub fn apply<R: ScopedRecord>(&self, records: Vec<R>) -> Vec<R> {
        records
            .into_iter()
            .filter(|record| self.matches(record))
            .collect()
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Narrowing to apply when allowed.
    pub narrowed_to: RecordFilter,
}

impl AccessDecision {
    fn allow(narrowed_to: RecordFilter) -> Self {
        Self {
            allowed: true,
            narrowed_to,
        }
    }

    fn deny() -> Self {
        Self {
            allowed: false,
            narrowed_to: RecordFilter::default(),
        }
    }
}

/// Compares discipline names case-insensitively.
#[must_use]
pub fn same_subject(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

fn requested_filter(resource: &ResourceDescriptor<'_>) -> RecordFilter {
    RecordFilter {
        student_id: resource.owner_id.map(ToOwned::to_owned),
        group_id: resource.group_id.map(ToOwned::to_owned),
        subject: resource.subject.map(ToOwned::to_owned),
        assignee: None,
    }
}

/// Decides whether `identity` may touch `resource` and how to narrow the result.
#[must_use]
pub fn authorize(identity: &Identity, resource: &ResourceDescriptor<'_>) -> AccessDecision {
    match identity.tier() {
        Tier::Admin => AccessDecision::allow(requested_filter(resource)),
        Tier::Teacher => authorize_teacher(identity, resource),
        Tier::User => authorize_user(identity, resource),
    }
}

fn authorize_teacher(identity: &Identity, resource: &ResourceDescriptor<'_>) -> AccessDecision {
    if resource.audience == Audience::AdminOnly {
        return AccessDecision::deny();
    }

    let Some(scope) = identity.scope_subject() else {
        return AccessDecision::allow(requested_filter(resource));
    };

    match resource.operation {
        Operation::Write => {
            if resource
                .payload_subject
                .is_some_and(|subject| !same_subject(subject, scope))
            {
                return AccessDecision::deny();
            }
            AccessDecision::allow(requested_filter(resource))
        }
        Operation::Read => {
            if resource
                .subject
                .is_some_and(|subject| !same_subject(subject, scope))
            {
                return AccessDecision::deny();
            }
            AccessDecision::allow(RecordFilter {
                subject: Some(scope.to_owned()),
                ..requested_filter(resource)
            })
        }
    }
}

fn authorize_user(identity: &Identity, resource: &ResourceDescriptor<'_>) -> AccessDecision {
    if resource.operation == Operation::Write {
        return AccessDecision::deny();
    }

    if resource
        .owner_id
        .is_some_and(|owner_id| owner_id != identity.subject_id())
    {
        return AccessDecision::deny();
    }

    if resource
        .group_id
        .is_some_and(|group_id| Some(group_id) != identity.group_id())
    {
        return AccessDecision::deny();
    }

    match resource.audience {
        Audience::SelfService => AccessDecision::allow(RecordFilter {
            student_id: Some(identity.subject_id().to_owned()),
            ..requested_filter(resource)
        }),
        Audience::GroupScoped => match identity.group_id() {
            Some(group_id) => AccessDecision::allow(RecordFilter {
                group_id: Some(group_id.to_owned()),
                assignee: Some(identity.subject_id().to_owned()),
                ..requested_filter(resource)
            }),
            None => AccessDecision::deny(),
        },
        Audience::AdminOnly | Audience::Staff => AccessDecision::deny(),
    }
}

/// Authorizes or fails with the generic `Forbidden` error.
pub fn require(identity: &Identity, resource: &ResourceDescriptor<'_>) -> AppResult<RecordFilter> {
    let decision = authorize(identity, resource);
    if decision.allowed {
        Ok(decision.narrowed_to)
    } else {
        tracing::debug!(
            subject = identity.subject_id(),
            tier = %identity.tier(),
            operation = ?resource.operation,
            audience = ?resource.audience,
            "access denied"
        );
        Err(AppError::access_denied())
    }
}

/// Fails with `Forbidden` unless `record` survives `filter`.
pub fn require_visible<R: ScopedRecord>(filter: &RecordFilter, record: &R) -> AppResult<()> {
    if filter.matches(record) {
        Ok(())
    } else {
        Err(AppError::access_denied())
    }
}
