//! Day snapshot: raw records as a caller stores them, and their normalization.
//!
//! Normalization never fails the whole snapshot. A bad field falls back to a
//! default and a bad record is skipped, each with a `warn!`, so one broken row
//! cannot stop the rest of the day from being planned.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::date::{parse_canonical_date, to_canonical_date, WeekdayKey};
use crate::habit::{CompletionLog, Habit};
use crate::task::{clamp_priority, Task, TaskKind};

pub const DEFAULT_MINUTES: u32 = 30;
pub const DEFAULT_PRIORITY: i32 = 5;
pub const DEFAULT_HABIT_MINUTES: u32 = 15;

/// Weekday as stored: either `3` or `"3"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DayValue {
    Number(i64),
    Text(String),
}

impl DayValue {
    fn to_key(&self) -> Option<WeekdayKey> {
        let n = match self {
            DayValue::Number(n) => *n,
            DayValue::Text(s) => s.trim().parse().ok()?,
        };
        u8::try_from(n).ok().and_then(WeekdayKey::from_number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub minutes: Option<i64>,
    #[serde(default)]
    pub days: Vec<DayValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub habit_id: String,
    /// YYYY-MM-DD
    pub day: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    #[serde(rename = "type", alias = "kind")]
    pub kind: String,
    #[serde(default)]
    pub minutes: Option<i64>,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub deadline: Option<String>,
    /// YYYY-MM-DD
    pub for_day: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySnapshot {
    #[serde(default)]
    pub habits: Vec<HabitRecord>,
    #[serde(default)]
    pub completions: Vec<CompletionRecord>,
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
}

/// Clamp a raw minute budget into `0..=u32::MAX`.
pub fn clamp_minutes(raw: i64) -> u32 {
    u32::try_from(raw.max(0)).unwrap_or(u32::MAX)
}

/// Duration of an activity: missing means [`DEFAULT_MINUTES`], anything else is floored at 1.
pub fn normalize_duration(raw: Option<i64>) -> u32 {
    match raw {
        Some(m) => clamp_minutes(m).max(1),
        None => DEFAULT_MINUTES,
    }
}

pub fn normalize_priority(raw: Option<i64>) -> i32 {
    match raw {
        Some(p) => clamp_priority(p.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32),
        None => DEFAULT_PRIORITY,
    }
}

fn parse_kind(raw: &str) -> Option<TaskKind> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "deadline" => Some(TaskKind::Deadline),
        "study" => Some(TaskKind::Study),
        _ => None,
    }
}

impl HabitRecord {
    pub fn normalize(&self) -> Habit {
        let mut days = BTreeSet::new();
        for raw in &self.days {
            match raw.to_key() {
                Some(key) => {
                    days.insert(key);
                }
                None => tracing::warn!(habit = %self.id, day = ?raw, "dropping unknown weekday"),
            }
        }
        Habit {
            id: self.id.clone(),
            title: self.title.clone(),
            minutes: normalize_duration(self.minutes),
            days,
        }
    }
}

impl TaskRecord {
    /// None when `for_day` is unreadable; the task cannot be placed on any day.
    pub fn normalize(&self) -> Option<Task> {
        let for_day = match parse_canonical_date(&self.for_day) {
            Ok(day) => day,
            Err(err) => {
                tracing::warn!(task = %self.id, %err, "skipping task with bad for_day");
                return None;
            }
        };

        let kind = parse_kind(&self.kind).unwrap_or_else(|| {
            tracing::warn!(
                task = %self.id,
                kind = %self.kind,
                "unknown task type, treating as study"
            );
            TaskKind::Study
        });

        let deadline = match (kind, self.deadline.as_deref()) {
            (TaskKind::Deadline, Some(raw)) => match parse_canonical_date(raw) {
                Ok(day) => Some(day),
                Err(err) => {
                    tracing::warn!(task = %self.id, %err, "ignoring bad deadline");
                    None
                }
            },
            _ => None,
        };

        Some(Task {
            id: self.id.clone(),
            title: self.title.clone(),
            kind,
            minutes: normalize_duration(self.minutes),
            priority: normalize_priority(self.priority),
            deadline,
            for_day,
        })
    }
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            kind: match task.kind {
                TaskKind::Deadline => "deadline".to_string(),
                TaskKind::Study => "study".to_string(),
            },
            minutes: Some(i64::from(task.minutes)),
            priority: Some(i64::from(task.priority)),
            deadline: task.deadline.map(to_canonical_date),
            for_day: to_canonical_date(task.for_day),
        }
    }
}

impl From<&Habit> for HabitRecord {
    fn from(habit: &Habit) -> Self {
        Self {
            id: habit.id.clone(),
            title: habit.title.clone(),
            minutes: Some(i64::from(habit.minutes)),
            days: habit
                .days
                .iter()
                .map(|k| DayValue::Number(i64::from(k.number())))
                .collect(),
        }
    }
}

impl DaySnapshot {
    pub fn habits(&self) -> Vec<Habit> {
        self.habits.iter().map(HabitRecord::normalize).collect()
    }

    pub fn completion_log(&self) -> CompletionLog {
        let mut log = CompletionLog::new();
        for c in &self.completions {
            match parse_canonical_date(&c.day) {
                Ok(day) => {
                    log.insert(c.habit_id.clone(), day);
                }
                Err(err) => tracing::warn!(habit = %c.habit_id, %err, "skipping completion"),
            }
        }
        log
    }

    /// Tasks attached to `day`, in stored order.
    pub fn tasks_for_day(&self, day: NaiveDate) -> Vec<Task> {
        self.tasks
            .iter()
            .filter_map(TaskRecord::normalize)
            .filter(|t| t.for_day == day)
            .collect()
    }

    /// Mark or unmark a habit as done on `day`. Returns whether it is now done.
    ///
    /// Only rows for this (habit, day) pair are touched; every other stored
    /// completion is kept as is.
    pub fn toggle_completion(&mut self, habit_id: &str, day: NaiveDate) -> Result<bool> {
        if !self.habits.iter().any(|h| h.id == habit_id) {
            bail!("unknown habit: {habit_id}");
        }

        let matches = |c: &CompletionRecord| {
            c.habit_id == habit_id && parse_canonical_date(&c.day).ok() == Some(day)
        };
        let before = self.completions.len();
        self.completions.retain(|c| !matches(c));
        if self.completions.len() != before {
            return Ok(false);
        }

        self.completions.push(CompletionRecord {
            habit_id: habit_id.to_string(),
            day: to_canonical_date(day),
        });
        Ok(true)
    }

    /// Append a new task built from `draft`, returning its id.
    pub fn add_task(&mut self, draft: TaskDraft, selected_day: NaiveDate) -> Result<String> {
        let id = self.next_task_id();
        let task = draft.into_task(id.clone(), selected_day)?;
        self.tasks.push(TaskRecord::from(&task));
        Ok(id)
    }

    /// Delete the task with `task_id`.
    pub fn remove_task(&mut self, task_id: &str) -> Result<()> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != task_id);
        if self.tasks.len() == before {
            bail!("unknown task: {task_id}");
        }
        Ok(())
    }

    /// Append a new habit built from `draft`, returning its id.
    pub fn add_habit(&mut self, draft: HabitDraft) -> Result<String> {
        let id = next_free_id("h", self.habits.len(), |id| self.habits.iter().any(|h| h.id == id));
        let habit = draft.into_habit(id.clone())?;
        self.habits.push(HabitRecord::from(&habit));
        Ok(id)
    }

    /// Delete the habit with `habit_id`. Its completion history stays in the
    /// snapshot untouched.
    pub fn remove_habit(&mut self, habit_id: &str) -> Result<()> {
        let before = self.habits.len();
        self.habits.retain(|h| h.id != habit_id);
        if self.habits.len() == before {
            bail!("unknown habit: {habit_id}");
        }
        Ok(())
    }

    fn next_task_id(&self) -> String {
        next_free_id("t", self.tasks.len(), |id| self.tasks.iter().any(|t| t.id == id))
    }
}

/// First `<prefix><n>` not already taken, starting from `len + 1`.
fn next_free_id(prefix: &str, len: usize, taken: impl Fn(&str) -> bool) -> String {
    let mut n = len + 1;
    loop {
        let id = format!("{prefix}{n}");
        if !taken(&id) {
            return id;
        }
        n += 1;
    }
}

/// A habit as typed in during setup, before defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitDraft {
    pub title: String,
    pub minutes: Option<i64>,
    pub days: BTreeSet<WeekdayKey>,
}

impl HabitDraft {
    /// Requires a non-blank title and at least one weekday. Missing or zero
    /// minutes become [`DEFAULT_HABIT_MINUTES`]; anything else is floored at 1.
    pub fn into_habit(self, id: impl Into<String>) -> Result<Habit> {
        let title = self.title.trim();
        if title.is_empty() {
            bail!("habit title must not be empty");
        }
        if self.days.is_empty() {
            bail!("habit needs at least one weekday");
        }

        let minutes = match self.minutes {
            Some(m) if m != 0 => clamp_minutes(m).max(1),
            _ => DEFAULT_HABIT_MINUTES,
        };
        Ok(Habit::new(id, title, minutes).on_days(self.days))
    }
}

/// A task as typed in by the user, before defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub kind: TaskKind,
    pub minutes: Option<i64>,
    pub priority: Option<i64>,
    pub deadline: Option<NaiveDate>,
}

impl TaskDraft {
    /// Apply the entry defaults: 30 minutes, priority 5, and a deadline task
    /// without an explicit date is due on `selected_day`.
    pub fn into_task(self, id: impl Into<String>, selected_day: NaiveDate) -> Result<Task> {
        let title = self.title.trim();
        if title.is_empty() {
            bail!("task title must not be empty");
        }

        let minutes = match self.minutes {
            Some(m) if m > 0 => clamp_minutes(m),
            _ => DEFAULT_MINUTES,
        };
        let priority = match self.priority {
            Some(p) if p != 0 => normalize_priority(Some(p)),
            _ => DEFAULT_PRIORITY,
        };

        let task = Task::new(id, title, selected_day)
            .with_minutes(minutes)
            .with_priority(priority);

        Ok(match self.kind {
            TaskKind::Deadline => task.with_deadline(self.deadline.unwrap_or(selected_day)),
            TaskKind::Study => task.with_kind(TaskKind::Study),
        })
    }
}
