//! Lay a plan out as contiguous time blocks with breaks in between.

use serde::{Deserialize, Serialize};

use crate::date::format_minutes_as_time;
use crate::planner::PlanItem;

pub const BREAK_TITLE: &str = "Break";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSlot {
    /// Minute of day.
    pub start: u32,
    /// Minute of day, exclusive.
    pub end: u32,
    pub title: String,
    pub minutes: u32,
    pub is_break: bool,
}

impl CalendarSlot {
    pub fn start_label(&self) -> String {
        format_minutes_as_time(self.start)
    }

    pub fn end_label(&self) -> String {
        format_minutes_as_time(self.end)
    }
}

/// Convert an ordered plan into time slots starting at `start_minutes`.
///
/// A break follows every item except the last. Nothing wraps past midnight;
/// keeping the day inside 24h is the caller's job. The cursor saturates
/// instead of overflowing.
pub fn materialize(plan: &[PlanItem], start_minutes: u32, break_minutes: u32) -> Vec<CalendarSlot> {
    let mut slots = Vec::with_capacity(plan.len() * 2);
    let mut cursor = start_minutes;

    for (idx, item) in plan.iter().enumerate() {
        let end = cursor.saturating_add(item.minutes);
        slots.push(CalendarSlot {
            start: cursor,
            end,
            title: item.title.clone(),
            minutes: item.minutes,
            is_break: false,
        });
        cursor = end;

        if break_minutes > 0 && idx + 1 != plan.len() {
            let end = cursor.saturating_add(break_minutes);
            slots.push(CalendarSlot {
                start: cursor,
                end,
                title: BREAK_TITLE.to_string(),
                minutes: break_minutes,
                is_break: true,
            });
            cursor = end;
        }
    }

    slots
}
