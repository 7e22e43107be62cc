//! Day planner: turns a day's tasks and habits into a ranked plan that fits a time budget.
//!
//! Ranking (deterministic):
//! - score DESC
//! - minutes ASC (shorter wins ties)
//! - input order (stable sort)
//!
//! Selection is a two-pass greedy fill over that ranking. It is an
//! approximation of the bounded knapsack, not an optimum: a high-scoring
//! item that fits is always taken even when two smaller items would have
//! scored more together. Callers rely on this exact order, so it must not be
//! swapped for an exact solver.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date::weekday_key;
use crate::habit::{compute_streak, habits_for_day, CompletionLog, Habit};
use crate::scoring::{score_habit, score_task, ScoreBreakdown};
use crate::task::{Task, TaskKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    Habit,
    Deadline,
    Study,
}

impl From<TaskKind> for CandidateKind {
    fn from(kind: TaskKind) -> Self {
        match kind {
            TaskKind::Deadline => CandidateKind::Deadline,
            TaskKind::Study => CandidateKind::Study,
        }
    }
}

/// A task or habit occurrence lifted into one shape for ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanItem {
    /// `task_<id>` or `habit_<id>`, so the two sources never collide.
    pub id: String,
    pub title: String,
    pub kind: CandidateKind,
    pub minutes: u32,
    pub score: u32,
    pub breakdown: ScoreBreakdown,
}

impl PlanItem {
    pub fn from_task(task: &Task, today: NaiveDate) -> Self {
        let breakdown = score_task(task, today);
        Self {
            id: format!("task_{}", task.id),
            title: task.title.clone(),
            kind: task.kind.into(),
            minutes: task.minutes.max(1),
            score: breakdown.total(),
            breakdown,
        }
    }

    pub fn from_habit(habit: &Habit, streak: u32) -> Self {
        let breakdown = score_habit(streak);
        Self {
            id: format!("habit_{}", habit.id),
            title: habit.title.clone(),
            kind: CandidateKind::Habit,
            minutes: habit.minutes.max(1),
            score: breakdown.total(),
            breakdown,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanResult {
    pub plan: Vec<PlanItem>,
    pub used_minutes: u32,
    pub remaining_minutes: u32,
    pub total_score: u32,
}

/// Everything one planning run needs. Nothing is read from the clock.
#[derive(Debug, Clone, Copy)]
pub struct DayContext<'a> {
    /// Reference date for urgency and streaks.
    pub today: NaiveDate,
    /// Day being planned; picks the habits scheduled on its weekday.
    pub selected_day: NaiveDate,
    pub available_minutes: u32,
    /// Tasks attached to `selected_day`.
    pub tasks: &'a [Task],
    pub habits: &'a [Habit],
    pub completions: &'a CompletionLog,
}

/// Score every candidate for the day: tasks first, then scheduled habits.
pub fn collect_candidates(ctx: &DayContext<'_>) -> Vec<PlanItem> {
    let weekday = weekday_key(ctx.selected_day);

    let tasks = ctx.tasks.iter().map(|t| PlanItem::from_task(t, ctx.today));
    let habits = habits_for_day(ctx.habits, weekday).into_iter().map(|h| {
        let streak = compute_streak(h, ctx.completions.dates_for(&h.id), ctx.today);
        PlanItem::from_habit(h, streak)
    });

    tasks.chain(habits).collect()
}

/// Rank and select candidates into a plan fitting `available_minutes`.
///
/// Pass 1 walks the ranking once and takes every item that still fits.
/// Pass 2 walks it again and takes any skipped item that fits the leftover
/// budget. Pass-1 picks come first in the plan, then pass-2 picks, each in
/// ranking order. An item longer than the whole budget is never taken.
pub fn build_plan(mut candidates: Vec<PlanItem>, available_minutes: u32) -> PlanResult {
    candidates.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.minutes.cmp(&b.minutes)));

    let mut taken = vec![false; candidates.len()];
    let mut order = Vec::new();
    let mut used: u32 = 0;

    for (i, item) in candidates.iter().enumerate() {
        if used.saturating_add(item.minutes) <= available_minutes {
            taken[i] = true;
            order.push(i);
            used += item.minutes;
        }
    }

    let first_pass = order.len();
    for (i, item) in candidates.iter().enumerate() {
        if taken[i] {
            continue;
        }
        if used.saturating_add(item.minutes) <= available_minutes {
            taken[i] = true;
            order.push(i);
            used += item.minutes;
        }
    }

    tracing::debug!(
        candidates = candidates.len(),
        available_minutes,
        first_pass,
        second_pass = order.len() - first_pass,
        used,
        "built plan"
    );

    let mut slots: Vec<Option<PlanItem>> = candidates.into_iter().map(Some).collect();
    let plan: Vec<PlanItem> = order.into_iter().filter_map(|i| slots[i].take()).collect();
    let total_score = plan.iter().map(|p| p.score).sum();

    PlanResult {
        plan,
        used_minutes: used,
        remaining_minutes: available_minutes.saturating_sub(used),
        total_score,
    }
}

/// Collect, score, rank, and select for one day.
pub fn plan_day(ctx: &DayContext<'_>) -> PlanResult {
    build_plan(collect_candidates(ctx), ctx.available_minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::{add_days, WeekdayKey};

    fn item(id: &str, minutes: u32, score: u32) -> PlanItem {
        PlanItem {
            id: id.to_string(),
            title: id.to_string(),
            kind: CandidateKind::Study,
            minutes,
            score,
            breakdown: ScoreBreakdown { base: score, urgency: 0, streak_bonus: 0 },
        }
    }

    fn ids(result: &PlanResult) -> Vec<&str> {
        result.plan.iter().map(|p| p.id.as_str()).collect()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn budget_100_takes_only_first() {
        let cands = vec![item("a", 60, 10), item("b", 60, 9), item("c", 60, 8)];
        let r = build_plan(cands, 100);
        assert_eq!(ids(&r), vec!["a"]);
        assert_eq!(r.used_minutes, 60);
        assert_eq!(r.remaining_minutes, 40);
        assert_eq!(r.total_score, 10);
    }

    #[test]
    fn budget_150_takes_two() {
        let cands = vec![item("a", 60, 10), item("b", 60, 9), item("c", 60, 8)];
        let r = build_plan(cands, 150);
        assert_eq!(ids(&r), vec!["a", "b"]);
        assert_eq!(r.used_minutes, 120);
        assert_eq!(r.remaining_minutes, 30);
        assert_eq!(r.total_score, 19);
    }

    #[test]
    fn lower_score_filler_is_taken_after_a_skip() {
        let cands = vec![item("big", 90, 10), item("mid", 50, 9), item("small", 20, 2)];
        let r = build_plan(cands, 80);
        assert_eq!(ids(&r), vec!["mid", "small"]);
        assert_eq!(r.used_minutes, 70);
        assert_eq!(r.remaining_minutes, 10);
    }

    #[test]
    fn zero_budget_is_empty() {
        let r = build_plan(vec![item("a", 1, 10)], 0);
        assert!(r.plan.is_empty());
        assert_eq!(r.used_minutes, 0);
        assert_eq!(r.remaining_minutes, 0);
        assert_eq!(r.total_score, 0);
    }

    #[test]
    fn oversized_single_candidate_never_selected() {
        let r = build_plan(vec![item("huge", 181, 20)], 180);
        assert!(r.plan.is_empty());
        assert_eq!(r.remaining_minutes, 180);
    }

    #[test]
    fn exact_fit_is_selected() {
        let r = build_plan(vec![item("a", 180, 1)], 180);
        assert_eq!(ids(&r), vec!["a"]);
        assert_eq!(r.remaining_minutes, 0);
    }

    #[test]
    fn ties_prefer_shorter_then_input_order() {
        let cands = vec![
            item("long", 45, 7),
            item("first", 30, 7),
            item("second", 30, 7),
            item("top", 60, 9),
        ];
        let r = build_plan(cands, 500);
        assert_eq!(ids(&r), vec!["top", "first", "second", "long"]);
    }

    #[test]
    fn idempotent() {
        let cands = vec![
            item("a", 25, 6),
            item("b", 25, 6),
            item("c", 40, 8),
            item("d", 15, 3),
        ];
        let r1 = build_plan(cands.clone(), 70);
        let r2 = build_plan(cands, 70);
        assert_eq!(r1, r2);
    }

    #[test]
    fn collect_candidates_namespaces_and_filters() {
        let today = monday();
        let tasks = vec![
            Task::new("1", "essay", today).with_priority(4).with_deadline(today),
            Task::new("2", "anki", today).with_priority(5).with_minutes(15),
        ];
        let habits = vec![
            Habit::new("1", "read", 20).every_day(),
            Habit::new("2", "tennis", 60).on_days([WeekdayKey::Sat]),
        ];
        let log = CompletionLog::from_completions([
            ("1", add_days(today, -3)),
            ("1", add_days(today, -2)),
            ("1", add_days(today, -1)),
        ]);
        let ctx = DayContext {
            today,
            selected_day: today,
            available_minutes: 180,
            tasks: &tasks,
            habits: &habits,
            completions: &log,
        };

        let cands = collect_candidates(&ctx);
        let got: Vec<_> = cands.iter().map(|c| (c.id.as_str(), c.kind, c.score)).collect();
        // Streak at today is 0: today itself is not completed yet.
        assert_eq!(
            got,
            vec![
                ("task_1", CandidateKind::Deadline, 14),
                ("task_2", CandidateKind::Study, 5),
                ("habit_1", CandidateKind::Habit, 6),
            ]
        );
    }

    #[test]
    fn habit_streak_bonus_flows_into_plan() {
        let today = monday();
        let habits = vec![Habit::new("r", "read", 20).every_day()];
        let log = CompletionLog::from_completions([
            ("r", add_days(today, -2)),
            ("r", add_days(today, -1)),
            ("r", today),
        ]);
        let ctx = DayContext {
            today,
            selected_day: today,
            available_minutes: 60,
            tasks: &[],
            habits: &habits,
            completions: &log,
        };
        let r = plan_day(&ctx);
        assert_eq!(r.plan.len(), 1);
        assert_eq!(r.plan[0].breakdown.streak_bonus, 2);
        assert_eq!(r.total_score, 8);
    }
}
