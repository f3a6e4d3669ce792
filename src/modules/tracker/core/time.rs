// Time derivations for tasks: overdue flag, time remaining, relative labels.
//
// Boundaries
// - Pure. `now` is always a parameter; nothing here reads a clock.
//
// Invariants
// - All divisions floor. 30 minutes left is "0 hours remaining", never "1 hour".
// - An overdue result never carries a negative count; it reports whole days past the deadline.

use crate::modules::tracker::core::vocabulary::TaskStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Days,
    Hours,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRemaining {
    pub overdue: bool,
    pub unit: TimeUnit,
    pub value: i64,
}

impl TimeRemaining {
    pub fn describe(&self) -> String {
        match (self.overdue, self.unit) {
            (true, _) => format!("Overdue by {} days", self.value),
            (false, TimeUnit::Days) => format!("{} days remaining", self.value),
            (false, TimeUnit::Hours) => format!("{} hours remaining", self.value),
        }
    }
}

pub fn is_overdue(
    estimated_completion: Option<DateTime<Utc>>,
    status: &TaskStatus,
    now: DateTime<Utc>,
) -> bool {
    match estimated_completion {
        Some(deadline) => deadline < now && !status.is_done(),
        None => false,
    }
}

pub fn time_remaining(estimated_completion: DateTime<Utc>, now: DateTime<Utc>) -> TimeRemaining {
    // Whole hours, floored towards the past: 47h30m late is -48 hours.
    let hours = (estimated_completion - now).num_milliseconds().div_euclid(3_600_000);
    if hours < 0 {
        return TimeRemaining {
            overdue: true,
            unit: TimeUnit::Days,
            value: hours.abs() / 24,
        };
    }

    let days = hours / 24;
    if days >= 1 {
        TimeRemaining {
            overdue: false,
            unit: TimeUnit::Days,
            value: days,
        }
    } else {
        TimeRemaining {
            overdue: false,
            unit: TimeUnit::Hours,
            value: hours,
        }
    }
}

/// Buckets the time elapsed since `timestamp`. Timestamps in the future read as "Just now".
pub fn relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - timestamp).num_minutes();
    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes} minutes ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours} hours ago");
    }
    let days = hours / 24;
    if days < 7 {
        return format!("{days} days ago");
    }
    timestamp.format("%-m/%-d/%Y").to_string()
}

/// Deadline information shown for one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskTiming {
    pub overdue: bool,
    /// Absent when the task has no estimate or is already done.
    pub remaining: Option<TimeRemaining>,
}

pub fn task_timing(
    estimated_completion: Option<DateTime<Utc>>,
    status: &TaskStatus,
    now: DateTime<Utc>,
) -> TaskTiming {
    TaskTiming {
        overdue: is_overdue(estimated_completion, status, now),
        remaining: estimated_completion
            .filter(|_| !status.is_done())
            .map(|deadline| time_remaining(deadline, now)),
    }
}
