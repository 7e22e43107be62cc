//! Task model: ad-hoc work attached to a single day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const MIN_PRIORITY: i32 = 1;
pub const MAX_PRIORITY: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// Has a due date; urgency grows as it approaches.
    Deadline,
    /// Open-ended study block, no deadline pressure.
    Study,
}

/// Core task type.
///
/// Constructed through [`Task::new`] and the `with_*` builders, which keep
/// `minutes >= 1` and `priority` inside 1..=10.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub kind: TaskKind,

    /// Minutes.
    pub minutes: u32,

    /// 1-10, higher is more important.
    pub priority: i32,

    /// Only meaningful for [`TaskKind::Deadline`].
    pub deadline: Option<NaiveDate>,

    /// The day this task is planned for.
    pub for_day: NaiveDate,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>, for_day: NaiveDate) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind: TaskKind::Study,
            minutes: 30,
            priority: 5,
            deadline: None,
            for_day,
        }
    }

    pub fn with_kind(mut self, kind: TaskKind) -> Self {
        self.kind = kind;
        if kind == TaskKind::Study {
            self.deadline = None;
        }
        self
    }

    /// Marks the task as a deadline task due on `deadline`.
    pub fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.kind = TaskKind::Deadline;
        self.deadline = Some(deadline);
        self
    }

    pub fn with_minutes(mut self, minutes: u32) -> Self {
        self.minutes = minutes.max(1);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = clamp_priority(priority);
        self
    }
}

pub fn clamp_priority(priority: i32) -> i32 {
    priority.clamp(MIN_PRIORITY, MAX_PRIORITY)
}
