//! Candidate scoring.
//!
//! score = base + urgency + streak_bonus, and the breakdown is kept next to
//! the scalar so the display layer can explain a ranking.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date::days_until;
use crate::habit::streak_bonus;
use crate::task::{clamp_priority, Task, TaskKind};

/// Base score of every habit occurrence, a mid-priority task's worth.
pub const HABIT_BASE_SCORE: u32 = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base: u32,
    pub urgency: u32,
    pub streak_bonus: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.base + self.urgency + self.streak_bonus
    }
}

/// Step function over days left until a deadline.
pub fn urgency_for_days(days_left: i64) -> u32 {
    match days_left {
        d if d <= 0 => 10,
        1 => 8,
        2..=3 => 6,
        4..=7 => 3,
        _ => 1,
    }
}

pub fn score_task(task: &Task, today: NaiveDate) -> ScoreBreakdown {
    let base = clamp_priority(task.priority).unsigned_abs();
    let urgency = match (task.kind, task.deadline) {
        (TaskKind::Deadline, Some(deadline)) => urgency_for_days(days_until(deadline, today)),
        _ => 0,
    };

    ScoreBreakdown {
        base,
        urgency,
        streak_bonus: 0,
    }
}

pub fn score_habit(streak: u32) -> ScoreBreakdown {
    ScoreBreakdown {
        base: HABIT_BASE_SCORE,
        urgency: 0,
        streak_bonus: streak_bonus(streak),
    }
}
