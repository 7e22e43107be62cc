//! Focus countdown for the plan item being worked on.
//!
//! The caller owns the clock and calls [`FocusTimer::tick`] once per second.

use serde::{Deserialize, Serialize};

use crate::planner::PlanItem;

pub const CLASSIC_FOCUS_SECS: u32 = 25 * 60;
pub const MIN_TASK_FOCUS_SECS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusMode {
    /// 25 minutes regardless of the item.
    #[default]
    Classic,
    /// As long as the selected item.
    Task,
}

impl FocusMode {
    pub fn initial_secs(self, selected: Option<&PlanItem>) -> u32 {
        match self {
            FocusMode::Classic => CLASSIC_FOCUS_SECS,
            FocusMode::Task => selected
                .map(|item| item.minutes.saturating_mul(60))
                .unwrap_or(CLASSIC_FOCUS_SECS)
                .max(MIN_TASK_FOCUS_SECS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusTimer {
    pub remaining_secs: u32,
    pub running: bool,
}

impl FocusTimer {
    pub fn new(mode: FocusMode, selected: Option<&PlanItem>) -> Self {
        Self {
            remaining_secs: mode.initial_secs(selected),
            running: false,
        }
    }

    pub fn start(&mut self) {
        if self.remaining_secs > 0 {
            self.running = true;
        }
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Advance one second. Returns true on the tick that finishes the countdown.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        if self.remaining_secs <= 1 {
            self.remaining_secs = 0;
            self.running = false;
            return true;
        }
        self.remaining_secs -= 1;
        false
    }

    pub fn is_finished(&self) -> bool {
        self.remaining_secs == 0
    }

    /// "MM:SS"; minutes are not capped at 59.
    pub fn label(&self) -> String {
        format!("{:02}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }
}
