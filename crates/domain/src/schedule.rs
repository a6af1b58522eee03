//! Lesson schedule entries and time-conflict detection.
//!
//! Intervals are half-open: `[start, end)`. Two lessons that merely touch
//! (one ends at 10:00, the next starts at 10:00) do not conflict.

use std::str::FromStr;

use chrono::{NaiveTime, Weekday};
use classbook_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::journal::ScopedRecord;

/// Parses a day of week such as `MONDAY`, `monday` or `Mon`.
pub fn parse_day_of_week(value: &str) -> AppResult<Weekday> {
    Weekday::from_str(value.trim())
        .map_err(|_| AppError::Validation(format!("unknown day of week '{}'", value.trim())))
}

/// Returns the canonical upper-case English name of a weekday.
#[must_use]
pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MONDAY",
        Weekday::Tue => "TUESDAY",
        Weekday::Wed => "WEDNESDAY",
        Weekday::Thu => "THURSDAY",
        Weekday::Fri => "FRIDAY",
        Weekday::Sat => "SATURDAY",
        Weekday::Sun => "SUNDAY",
    }
}

/// Validated half-open lesson time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeSlot {
    /// Creates a time slot. `start` must be strictly before `end`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> AppResult<Self> {
        if start >= end {
            return Err(AppError::Validation(format!(
                "lesson start {} must be before end {}",
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }

        Ok(Self { start, end })
    }

    /// Returns the inclusive start.
    #[must_use]
    pub fn start(&self) -> NaiveTime {
        self.start
    }

    /// Returns the exclusive end.
    #[must_use]
    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Half-open overlap: `[s1,e1)` and `[s2,e2)` overlap iff
    /// `!(e1 <= s2 || s1 >= e2)`.
    #[must_use]
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        !(self.end <= other.start || self.start >= other.end)
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}-{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

/// Partition key plus interval used by conflict detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledInterval {
    /// Identifier of the stored entry, `None` for a not-yet-persisted candidate.
    pub entry_id: Option<String>,
    /// Owning group.
    pub group_id: String,
    /// Day of week.
    pub day: Weekday,
    /// Time window.
    pub slot: TimeSlot,
}

impl ScheduledInterval {
    fn same_partition(&self, other: &ScheduledInterval) -> bool {
        self.group_id == other.group_id && self.day == other.day
    }
}

/// Returns the first existing interval that conflicts with `candidate`.
///
/// Entries outside the candidate's `(group, day)` partition and the entry
/// named by `exclude_id` are ignored.
#[must_use]
pub fn find_conflict<'a>(
    candidate: &ScheduledInterval,
    existing: &'a [ScheduledInterval],
    exclude_id: Option<&str>,
) -> Option<&'a ScheduledInterval> {
    existing.iter().find(|entry| {
        let excluded = exclude_id.is_some() && entry.entry_id.as_deref() == exclude_id;
        !excluded && candidate.same_partition(entry) && candidate.slot.overlaps(&entry.slot)
    })
}

/// Returns whether `candidate` overlaps any existing interval.
#[must_use]
pub fn has_conflict(
    candidate: &ScheduledInterval,
    existing: &[ScheduledInterval],
    exclude_id: Option<&str>,
) -> bool {
    find_conflict(candidate, existing, exclude_id).is_some()
}

/// Stored lesson of a group's weekly timetable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// Entry identifier.
    pub id: String,
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

impl ScheduleEntry {
    /// Returns the interval view used for conflict detection.
    #[must_use]
    pub fn interval(&self) -> ScheduledInterval {
        ScheduledInterval {
            entry_id: Some(self.id.clone()),
            group_id: self.group_id.clone(),
            day: self.day,
            slot: self.slot,
        }
    }
}

impl ScopedRecord for ScheduleEntry {
    const KIND: &'static str = "schedule entry";

    fn record_id(&self) -> &str {
        self.id.as_str()
    }

    fn student_id(&self) -> Option<&str> {
        None
    }

    fn group_id(&self) -> &str {
        self.group_id.as_str()
    }

    fn subject(&self) -> &str {
        self.subject.as_str()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveTime, Weekday};
    use proptest::prelude::*;

    use super::{ScheduledInterval, TimeSlot, find_conflict, has_conflict, parse_day_of_week};

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
    }

    fn interval(id: Option<&str>, group: &str, day: Weekday, from: (u32, u32), to: (u32, u32)) -> ScheduledInterval {
        ScheduledInterval {
            entry_id: id.map(ToOwned::to_owned),
            group_id: group.to_owned(),
            day,
            slot: TimeSlot::new(time(from.0, from.1), time(to.0, to.1))
                .unwrap_or_else(|_| panic!("invalid test slot")),
        }
    }

    #[test]
    fn overlapping_lessons_conflict() {
        let candidate = interval(None, "G", Weekday::Mon, (9, 0), (10, 0));
        let existing = [interval(Some("a"), "G", Weekday::Mon, (9, 30), (10, 30))];
        assert!(has_conflict(&candidate, &existing, None));
    }

    #[test]
    fn touching_lessons_do_not_conflict() {
        let candidate = interval(None, "G", Weekday::Mon, (9, 0), (10, 0));
        let existing = [interval(Some("a"), "G", Weekday::Mon, (10, 0), (11, 0))];
        assert!(!has_conflict(&candidate, &existing, None));

        let existing = [interval(Some("b"), "G", Weekday::Mon, (8, 0), (9, 0))];
        assert!(!has_conflict(&candidate, &existing, None));
    }

    #[test]
    fn contained_lesson_conflicts() {
        let candidate = interval(None, "G", Weekday::Tue, (9, 0), (12, 0));
        let existing = [interval(Some("a"), "G", Weekday::Tue, (10, 0), (10, 45))];
        assert!(has_conflict(&candidate, &existing, None));
    }

    #[test]
    fn other_group_or_day_is_ignored() {
        let candidate = interval(None, "G", Weekday::Mon, (9, 0), (10, 0));
        let existing = [
            interval(Some("a"), "H", Weekday::Mon, (9, 0), (10, 0)),
            interval(Some("b"), "G", Weekday::Tue, (9, 0), (10, 0)),
        ];
        assert!(!has_conflict(&candidate, &existing, None));
    }

    #[test]
    fn excluded_entry_does_not_conflict_with_itself() {
        let candidate = interval(Some("x"), "G", Weekday::Wed, (9, 0), (10, 0));
        let existing = [
            interval(Some("x"), "G", Weekday::Wed, (9, 0), (10, 0)),
            interval(Some("y"), "G", Weekday::Wed, (10, 0), (11, 0)),
        ];
        assert!(!has_conflict(&candidate, &existing, Some("x")));
        assert!(has_conflict(&candidate, &existing, None));
    }

    #[test]
    fn find_conflict_reports_the_conflicting_interval() {
        let candidate = interval(None, "G", Weekday::Fri, (13, 0), (14, 0));
        let existing = [
            interval(Some("a"), "G", Weekday::Fri, (8, 0), (9, 0)),
            interval(Some("b"), "G", Weekday::Fri, (13, 30), (14, 30)),
        ];
        let conflict = find_conflict(&candidate, &existing, None);
        assert_eq!(
            conflict.and_then(|entry| entry.entry_id.as_deref()),
            Some("b")
        );
    }

    #[test]
    fn slot_rejects_empty_or_inverted_window() {
        assert!(TimeSlot::new(time(10, 0), time(10, 0)).is_err());
        assert!(TimeSlot::new(time(11, 0), time(10, 0)).is_err());
    }

    #[test]
    fn day_of_week_parses_common_spellings() {
        assert_eq!(parse_day_of_week("MONDAY").ok(), Some(Weekday::Mon));
        assert_eq!(parse_day_of_week(" friday ").ok(), Some(Weekday::Fri));
        assert_eq!(parse_day_of_week("Sun").ok(), Some(Weekday::Sun));
        assert!(parse_day_of_week("someday").is_err());
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(a in 0u32..1380, la in 1u32..60, b in 0u32..1380, lb in 1u32..60) {
            let first = TimeSlot::new(minutes(a), minutes(a + la));
            let second = TimeSlot::new(minutes(b), minutes(b + lb));
            if let (Ok(first), Ok(second)) = (first, second) {
                prop_assert_eq!(first.overlaps(&second), second.overlaps(&first));
            }
        }

        #[test]
        fn back_to_back_slots_never_overlap(start in 0u32..1300, first_len in 1u32..60, second_len in 1u32..60) {
            let boundary = start + first_len;
            let first = TimeSlot::new(minutes(start), minutes(boundary));
            let second = TimeSlot::new(minutes(boundary), minutes(boundary + second_len));
            if let (Ok(first), Ok(second)) = (first, second) {
                prop_assert!(!first.overlaps(&second));
            }
        }
    }

    fn minutes(total: u32) -> NaiveTime {
        time(total / 60, total % 60)
    }
}
