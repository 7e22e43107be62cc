//! dayplan-core: plan-building engine for the dayplan daily planner.
//!
//! Pure functions over plain records: streaks feed habit scores, scores rank
//! the day's candidates, a greedy fill picks what fits the time budget, and
//! the calendar lays the picks out as time blocks.

pub mod calendar;
pub mod date;
pub mod focus;
pub mod habit;
pub mod input;
pub mod planner;
pub mod scoring;
pub mod task;

pub use calendar::{materialize, CalendarSlot};
pub use date::{
    add_days, days_until, format_minutes_as_time, parse_canonical_date, parse_time_of_day,
    start_of_week_monday, to_canonical_date, try_parse_time_of_day, week_dates, weekday_key,
    WeekdayKey, DEFAULT_START_MINUTES,
};
pub use focus::{FocusMode, FocusTimer};
pub use habit::{compute_streak, habits_for_day, week_score, CompletionLog, Habit};
pub use input::{clamp_minutes, DaySnapshot, HabitDraft, TaskDraft};
pub use planner::{
    build_plan, collect_candidates, plan_day, CandidateKind, DayContext, PlanItem, PlanResult,
};
pub use scoring::{score_habit, score_task, ScoreBreakdown};
pub use task::{Task, TaskKind};
