//! Habits, completion history, and streaks.
//!
//! A streak counts consecutive *scheduled* occurrences completed without a
//! miss. Days the habit is not scheduled on are skipped; they neither break
//! nor extend the count. [`compute_streak`] is the only streak algorithm in
//! the crate and every bonus goes through it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::date::{add_days, weekday_key, WeekdayKey};

/// How far back the streak walk looks before giving up.
pub const STREAK_LOOKBACK_DAYS: u32 = 90;

/// Streak length at which a habit earns its bonus.
pub const STREAK_BONUS_THRESHOLD: u32 = 3;

/// Points added for a habit whose streak reached [`STREAK_BONUS_THRESHOLD`].
pub const STREAK_BONUS: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub title: String,
    /// Minutes, at least 1.
    pub minutes: u32,
    pub days: BTreeSet<WeekdayKey>,
}

impl Habit {
    pub fn new(id: impl Into<String>, title: impl Into<String>, minutes: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            minutes: minutes.max(1),
            days: BTreeSet::new(),
        }
    }

    pub fn on_days(mut self, days: impl IntoIterator<Item = WeekdayKey>) -> Self {
        self.days.extend(days);
        self
    }

    pub fn every_day(self) -> Self {
        self.on_days(WeekdayKey::ALL)
    }

    pub fn is_scheduled(&self, day: WeekdayKey) -> bool {
        self.days.contains(&day)
    }
}

/// habit id -> days the habit was completed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionLog {
    by_habit: HashMap<String, BTreeSet<NaiveDate>>,
}

impl CompletionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_completions<I, S>(completions: I) -> Self
    where
        I: IntoIterator<Item = (S, NaiveDate)>,
        S: Into<String>,
    {
        let mut log = Self::new();
        for (habit_id, day) in completions {
            log.insert(habit_id, day);
        }
        log
    }

    /// Returns false if the completion was already recorded.
    pub fn insert(&mut self, habit_id: impl Into<String>, day: NaiveDate) -> bool {
        self.by_habit.entry(habit_id.into()).or_default().insert(day)
    }

    pub fn remove(&mut self, habit_id: &str, day: NaiveDate) -> bool {
        let Some(set) = self.by_habit.get_mut(habit_id) else {
            return false;
        };
        let removed = set.remove(&day);
        if set.is_empty() {
            self.by_habit.remove(habit_id);
        }
        removed
    }

    /// Flip the completion state. Returns whether the habit is now done on `day`.
    pub fn toggle(&mut self, habit_id: &str, day: NaiveDate) -> bool {
        if self.remove(habit_id, day) {
            false
        } else {
            self.insert(habit_id, day);
            true
        }
    }

    pub fn contains(&self, habit_id: &str, day: NaiveDate) -> bool {
        self.by_habit
            .get(habit_id)
            .is_some_and(|set| set.contains(&day))
    }

    /// Completion dates for a habit; empty for unknown habits.
    pub fn dates_for(&self, habit_id: &str) -> &BTreeSet<NaiveDate> {
        static EMPTY: BTreeSet<NaiveDate> = BTreeSet::new();
        self.by_habit.get(habit_id).unwrap_or(&EMPTY)
    }

    pub fn len(&self) -> usize {
        self.by_habit.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_habit.is_empty()
    }
}

/// Consecutive scheduled occurrences completed, walking back from `reference`.
pub fn compute_streak(
    habit: &Habit,
    completions: &BTreeSet<NaiveDate>,
    reference: NaiveDate,
) -> u32 {
    let mut streak = 0;
    let mut cursor = reference;

    for _ in 0..STREAK_LOOKBACK_DAYS {
        if habit.is_scheduled(weekday_key(cursor)) {
            if !completions.contains(&cursor) {
                break;
            }
            streak += 1;
        }
        cursor = add_days(cursor, -1);
    }

    streak
}

pub fn streak_bonus(streak: u32) -> u32 {
    if streak >= STREAK_BONUS_THRESHOLD {
        STREAK_BONUS
    } else {
        0
    }
}

/// Habits scheduled on `day`, in input order.
pub fn habits_for_day(habits: &[Habit], day: WeekdayKey) -> Vec<&Habit> {
    habits.iter().filter(|h| h.is_scheduled(day)).collect()
}

/// Weekly score: one point per completion inside `week`, plus the streak
/// bonus for every habit whose streak at `today` reaches the threshold.
pub fn week_score(
    habits: &[Habit],
    log: &CompletionLog,
    week: &[NaiveDate; 7],
    today: NaiveDate,
) -> u32 {
    habits
        .iter()
        .map(|h| {
            let dates = log.dates_for(&h.id);
            let done = week.iter().filter(|d| dates.contains(d)).count() as u32;
            done + streak_bonus(compute_streak(h, dates, today))
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::week_dates;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // 2026-10-19 is a Monday.
    fn monday() -> NaiveDate {
        d(2026, 10, 19)
    }

    fn dates(list: &[NaiveDate]) -> BTreeSet<NaiveDate> {
        list.iter().copied().collect()
    }

    #[test]
    fn daily_habit_three_in_a_row() {
        let h = Habit::new("h1", "read", 20).every_day();
        let today = monday();
        let done = dates(&[add_days(today, -2), add_days(today, -1), today]);
        assert_eq!(compute_streak(&h, &done, today), 3);
    }

    #[test]
    fn gap_truncates_streak() {
        let h = Habit::new("h1", "read", 20).every_day();
        let today = monday();
        // -3 missing
        let done = dates(&[
            add_days(today, -5),
            add_days(today, -4),
            add_days(today, -2),
            add_days(today, -1),
            today,
        ]);
        assert_eq!(compute_streak(&h, &done, today), 3);
    }

    #[test]
    fn missing_reference_day_is_zero() {
        let h = Habit::new("h1", "read", 20).every_day();
        let today = monday();
        let done = dates(&[add_days(today, -2), add_days(today, -1)]);
        assert_eq!(compute_streak(&h, &done, today), 0);
    }

    #[test]
    fn unscheduled_days_are_skipped() {
        // Mon/Wed/Fri habit. Reference is Friday 2026-10-23.
        let h = Habit::new("h1", "gym", 45).on_days([
            WeekdayKey::Mon,
            WeekdayKey::Wed,
            WeekdayKey::Fri,
        ]);
        let friday = d(2026, 10, 23);
        let done = dates(&[
            d(2026, 10, 16), // Fri
            d(2026, 10, 19), // Mon
            d(2026, 10, 21), // Wed
            friday,
        ]);
        assert_eq!(compute_streak(&h, &done, friday), 4);

        // Completions on unscheduled days do not count either.
        let extra = dates(&[d(2026, 10, 22), friday]);
        assert_eq!(compute_streak(&h, &extra, friday), 1);
    }

    #[test]
    fn reference_on_unscheduled_day_looks_back() {
        let h = Habit::new("h1", "gym", 45).on_days([WeekdayKey::Mon]);
        let done = dates(&[d(2026, 10, 12), monday()]);
        // Thursday reference: walks back past Wed/Tue to Monday.
        assert_eq!(compute_streak(&h, &done, d(2026, 10, 22)), 2);
    }

    #[test]
    fn weekly_habit_resolves_within_lookback() {
        let h = Habit::new("h1", "long run", 90).on_days([WeekdayKey::Sun]);
        let last_sunday = d(2026, 10, 25);
        let done: BTreeSet<_> = (0..20).map(|w| add_days(last_sunday, -7 * w)).collect();
        // 90 days cover 13 Sundays counting the reference.
        assert_eq!(compute_streak(&h, &done, last_sunday), 13);
    }

    #[test]
    fn habit_without_days_has_no_streak_and_stops() {
        let h = Habit::new("h1", "unscheduled", 10);
        let done = dates(&[monday()]);
        assert_eq!(compute_streak(&h, &done, monday()), 0);
    }

    #[test]
    fn bonus_threshold() {
        assert_eq!(streak_bonus(2), 0);
        assert_eq!(streak_bonus(3), 2);
        assert_eq!(streak_bonus(30), 2);
    }

    #[test]
    fn completion_log_toggle_is_set_like() {
        let mut log = CompletionLog::new();
        assert!(log.toggle("h1", monday()));
        assert!(log.contains("h1", monday()));
        assert!(!log.insert("h1", monday()));
        assert_eq!(log.len(), 1);

        assert!(!log.toggle("h1", monday()));
        assert!(!log.contains("h1", monday()));
        assert!(log.is_empty());
        assert!(log.dates_for("h1").is_empty());
    }

    #[test]
    fn filter_habits_by_weekday() {
        let habits = vec![
            Habit::new("a", "a", 10).on_days([WeekdayKey::Mon]),
            Habit::new("b", "b", 10).on_days([WeekdayKey::Tue]),
            Habit::new("c", "c", 10).every_day(),
        ];
        let ids: Vec<_> = habits_for_day(&habits, WeekdayKey::Mon)
            .into_iter()
            .map(|h| h.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn week_score_counts_completions_and_bonus() {
        let today = d(2026, 10, 21); // Wednesday
        let habits = vec![
            Habit::new("read", "read", 20).every_day(),
            Habit::new("gym", "gym", 45).on_days([WeekdayKey::Sat]),
        ];
        let log = CompletionLog::from_completions([
            ("read", d(2026, 10, 19)),
            ("read", d(2026, 10, 20)),
            ("read", today),
            ("gym", d(2026, 10, 17)), // previous week
        ]);
        let week = week_dates(today, 0).unwrap();
        // read: 3 in week + 2 bonus; gym: 0 in week, streak 1 -> no bonus
        assert_eq!(week_score(&habits, &log, &week, today), 5);
    }
}
