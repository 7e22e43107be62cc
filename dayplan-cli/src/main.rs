use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use dayplan_core::{
    clamp_minutes, compute_streak, materialize, parse_canonical_date, parse_time_of_day, plan_day,
    to_canonical_date, week_dates, week_score, weekday_key, CalendarSlot, DayContext, DaySnapshot,
    FocusMode, FocusTimer, HabitDraft, PlanResult, TaskDraft, TaskKind, WeekdayKey,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod calendar;
mod config;
mod state;

use config::Config;

const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Parser, Debug)]
#[command(
    name = "dayplan",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("DAYPLAN_BUILD_SHA"), ")"),
    about = "Turn habits and tasks into a ranked, time-boxed day"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default ~/.dayplan/config.toml
    Init,

    /// Rank today's candidates, fit them to the budget, and lay out the calendar
    Plan {
        #[command(flatten)]
        day: DayArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Current streak for every habit
    Streaks {
        #[command(flatten)]
        data: DataArgs,

        /// Reference date (default: local today)
        #[arg(long)]
        today: Option<String>,
    },

    /// Completion grid and score for one week
    Week {
        #[command(flatten)]
        data: DataArgs,

        #[arg(long)]
        today: Option<String>,

        /// Weeks relative to the current one (-1 = last week)
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i64,
    },

    /// Print the day's calendar as an ICS document
    ExportIcs {
        #[command(flatten)]
        day: DayArgs,

        /// Emit break slots as transparent events
        #[arg(long)]
        with_breaks: bool,
    },

    /// Toggle a habit's completion for a day
    Done {
        habit_id: String,

        #[command(flatten)]
        data: DataArgs,

        /// Day to toggle (default: local today)
        #[arg(long)]
        day: Option<String>,
    },

    /// Add a task to the snapshot
    AddTask {
        #[command(flatten)]
        data: DataArgs,

        #[arg(long)]
        title: String,

        #[arg(long, value_enum, default_value_t = KindArg::Study)]
        kind: KindArg,

        #[arg(long, allow_hyphen_values = true)]
        minutes: Option<i64>,

        #[arg(long, allow_hyphen_values = true)]
        priority: Option<i64>,

        /// YYYY-MM-DD; deadline tasks default to --day
        #[arg(long)]
        deadline: Option<String>,

        /// Day the task is planned for (default: local today)
        #[arg(long)]
        day: Option<String>,
    },

    /// Delete a task from the snapshot
    RemoveTask {
        task_id: String,

        #[command(flatten)]
        data: DataArgs,
    },

    /// Add a habit to the snapshot
    AddHabit {
        #[command(flatten)]
        data: DataArgs,

        #[arg(long)]
        title: String,

        /// Minutes per session (default: 15)
        #[arg(long, allow_hyphen_values = true)]
        minutes: Option<i64>,

        /// Weekdays, 1 = Monday .. 7 = Sunday (e.g. --days 1,3,5)
        #[arg(
            long,
            required = true,
            value_delimiter = ',',
            value_parser = clap::value_parser!(u8).range(1..=7)
        )]
        days: Vec<u8>,
    },

    /// Delete a habit from the snapshot (its completions are kept)
    RemoveHabit {
        habit_id: String,

        #[command(flatten)]
        data: DataArgs,
    },
}

#[derive(Args, Debug)]
struct DataArgs {
    /// Snapshot JSON (default: config [data] file, else ~/.dayplan/day.json)
    #[arg(long)]
    data: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DayArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Day to plan (default: --today)
    #[arg(long)]
    day: Option<String>,

    /// Reference date for urgency and streaks (default: local today)
    #[arg(long)]
    today: Option<String>,

    /// Available minutes (default: config)
    #[arg(long, allow_hyphen_values = true)]
    minutes: Option<i64>,

    /// Start time HH:MM (default: config)
    #[arg(long)]
    start: Option<String>,

    /// Break between items in minutes (default: config)
    #[arg(long = "break", allow_hyphen_values = true)]
    break_minutes: Option<i64>,

    /// Focus timer sizing
    #[arg(long, value_enum)]
    focus: Option<FocusArg>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Deadline,
    Study,
}

impl From<KindArg> for TaskKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Deadline => TaskKind::Deadline,
            KindArg::Study => TaskKind::Study,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FocusArg {
    Classic,
    Task,
}

impl From<FocusArg> for FocusMode {
    fn from(f: FocusArg) -> Self {
        match f {
            FocusArg::Classic => FocusMode::Classic,
            FocusArg::Task => FocusMode::Task,
        }
    }
}

/// Everything `plan` and `export-ics` print.
#[derive(Debug, Serialize)]
struct DayPlan {
    today: String,
    day: String,
    available_minutes: u32,
    start_time: String,
    break_minutes: u32,
    #[serde(flatten)]
    result: PlanResult,
    calendar: Vec<CalendarSlot>,
    focus: FocusTimer,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Init => {
            config::init_config()?;
        }

        Command::Plan { day, json } => {
            let cfg = config::load_config()?;
            let plan = build_day_plan(&cfg, &day)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print_plan(&plan);
            }
        }

        Command::Streaks { data, today } => {
            let cfg = config::load_config()?;
            let snapshot = state::read_snapshot(&data_path(&cfg, &data)?)?;
            let today = resolve_today(today.as_deref())?;
            print_streaks(&snapshot, today);
        }

        Command::Week { data, today, offset } => {
            let cfg = config::load_config()?;
            let snapshot = state::read_snapshot(&data_path(&cfg, &data)?)?;
            let today = resolve_today(today.as_deref())?;
            print_week(&snapshot, today, offset)?;
        }

        Command::ExportIcs { day, with_breaks } => {
            let cfg = config::load_config()?;
            let plan = build_day_plan(&cfg, &day)?;
            let date = parse_canonical_date(&plan.day)?;
            print!("{}", calendar::slots_to_ics(date, &plan.calendar, with_breaks));
        }

        Command::Done {
            habit_id,
            data,
            day,
        } => {
            let cfg = config::load_config()?;
            let path = data_path(&cfg, &data)?;
            let mut snapshot = state::read_snapshot(&path)?;
            let day = resolve_today(day.as_deref())?;

            let done = snapshot.toggle_completion(&habit_id, day)?;
            state::write_snapshot(&path, &snapshot)?;

            let mark = if done { "done" } else { "not done" };
            println!("{habit_id} on {}: {mark}", to_canonical_date(day));
        }

        Command::AddTask {
            data,
            title,
            kind,
            minutes,
            priority,
            deadline,
            day,
        } => {
            let cfg = config::load_config()?;
            let path = data_path(&cfg, &data)?;
            let mut snapshot = state::read_snapshot_or_default(&path)?;
            let day = resolve_today(day.as_deref())?;
            let deadline = deadline.as_deref().map(parse_canonical_date).transpose()?;

            let draft = TaskDraft {
                title,
                kind: kind.into(),
                minutes,
                priority,
                deadline,
            };
            let id = snapshot.add_task(draft, day)?;
            state::write_snapshot(&path, &snapshot)?;

            println!("Added task {id} for {} ({})", to_canonical_date(day), path.display());
        }

        Command::RemoveTask { task_id, data } => {
            let cfg = config::load_config()?;
            let path = data_path(&cfg, &data)?;
            let mut snapshot = state::read_snapshot(&path)?;

            snapshot.remove_task(&task_id)?;
            state::write_snapshot(&path, &snapshot)?;

            println!("Removed task {task_id} ({})", path.display());
        }

        Command::AddHabit {
            data,
            title,
            minutes,
            days,
        } => {
            let cfg = config::load_config()?;
            let path = data_path(&cfg, &data)?;
            let mut snapshot = state::read_snapshot_or_default(&path)?;

            let draft = HabitDraft {
                title,
                minutes,
                days: days.into_iter().filter_map(WeekdayKey::from_number).collect(),
            };
            let id = snapshot.add_habit(draft)?;
            state::write_snapshot(&path, &snapshot)?;

            println!("Added habit {id} ({})", path.display());
        }

        Command::RemoveHabit { habit_id, data } => {
            let cfg = config::load_config()?;
            let path = data_path(&cfg, &data)?;
            let mut snapshot = state::read_snapshot(&path)?;

            snapshot.remove_habit(&habit_id)?;
            state::write_snapshot(&path, &snapshot)?;

            println!("Removed habit {habit_id} ({})", path.display());
        }
    }

    Ok(())
}

fn init_tracing() {
    // stdout carries JSON / ICS, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn data_path(cfg: &Config, args: &DataArgs) -> Result<PathBuf> {
    if let Some(p) = &args.data {
        return Ok(p.clone());
    }
    match &cfg.data.file {
        Some(f) => Ok(PathBuf::from(f)),
        None => state::default_data_path(),
    }
}

fn resolve_today(arg: Option<&str>) -> Result<NaiveDate> {
    match arg {
        Some(s) => parse_canonical_date(s).context("--today/--day"),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn build_day_plan(cfg: &Config, args: &DayArgs) -> Result<DayPlan> {
    let snapshot = state::read_snapshot(&data_path(cfg, &args.data)?)?;

    let today = resolve_today(args.today.as_deref())?;
    let day = match args.day.as_deref() {
        Some(s) => parse_canonical_date(s).context("--day")?,
        None => today,
    };

    let start_text = args.start.as_deref().unwrap_or(&cfg.planner.start_time);
    let start = parse_time_of_day(start_text);
    // The plan must end by midnight.
    let available_minutes = clamp_minutes(args.minutes.unwrap_or(cfg.planner.available_minutes))
        .min(MINUTES_PER_DAY - start);
    let break_minutes = clamp_minutes(args.break_minutes.unwrap_or(cfg.planner.break_minutes))
        .min(MINUTES_PER_DAY);
    let focus_mode = args.focus.map(FocusMode::from).unwrap_or(cfg.planner.focus_mode);

    let tasks = snapshot.tasks_for_day(day);
    let habits = snapshot.habits();
    let log = snapshot.completion_log();
    tracing::debug!(
        day = %to_canonical_date(day),
        tasks = tasks.len(),
        habits = habits.len(),
        completions = log.len(),
        "loaded snapshot"
    );

    let result = plan_day(&DayContext {
        today,
        selected_day: day,
        available_minutes,
        tasks: &tasks,
        habits: &habits,
        completions: &log,
    });
    let calendar = materialize(&result.plan, start, break_minutes);
    let focus = FocusTimer::new(focus_mode, result.plan.first());

    Ok(DayPlan {
        today: to_canonical_date(today),
        day: to_canonical_date(day),
        available_minutes,
        start_time: dayplan_core::format_minutes_as_time(start),
        break_minutes,
        result,
        calendar,
        focus,
    })
}

fn print_plan(plan: &DayPlan) {
    let weekday = parse_canonical_date(&plan.day)
        .map(|d| weekday_key(d).label())
        .unwrap_or("?");
    println!("# Plan for {} ({weekday})\n", plan.day);
    println!(
        "Budget {} min | used {} | free {} | score {}\n",
        plan.available_minutes,
        plan.result.used_minutes,
        plan.result.remaining_minutes,
        plan.result.total_score
    );

    if plan.result.plan.is_empty() {
        println!("Nothing fits. Add tasks or raise --minutes.");
        return;
    }

    for (i, item) in plan.result.plan.iter().enumerate() {
        let b = item.breakdown;
        println!(
            "{:>2}. [{:?}] {} | {}m | score {} (base {} + urgency {} + streak {})",
            i + 1,
            item.kind,
            item.title,
            item.minutes,
            item.score,
            b.base,
            b.urgency,
            b.streak_bonus
        );
    }

    println!("\n## Calendar\n");
    for slot in &plan.calendar {
        let marker = if slot.is_break { "  ~ " } else { "" };
        println!(
            "{}-{}  {marker}{}",
            slot.start_label(),
            slot.end_label(),
            slot.title
        );
    }

    println!("\nFocus timer: {}", plan.focus.label());
}

fn print_streaks(snapshot: &DaySnapshot, today: NaiveDate) {
    let log = snapshot.completion_log();
    println!("# Streaks at {}\n", to_canonical_date(today));
    for h in snapshot.habits() {
        let streak = compute_streak(&h, log.dates_for(&h.id), today);
        let bonus = if streak >= dayplan_core::habit::STREAK_BONUS_THRESHOLD {
            " (+bonus)"
        } else {
            ""
        };
        println!("- {} | {}m | streak {streak}{bonus}", h.title, h.minutes);
    }
}

fn print_week(snapshot: &DaySnapshot, today: NaiveDate, offset: i64) -> Result<()> {
    let habits = snapshot.habits();
    let log = snapshot.completion_log();
    let week = week_dates(today, offset).context("--offset")?;

    println!(
        "# Week {} .. {}\n",
        to_canonical_date(week[0]),
        to_canonical_date(week[6])
    );

    let header: Vec<&str> = week.iter().map(|d| weekday_key(*d).label()).collect();
    println!("{:<24} {}", "", header.join(" "));
    for h in &habits {
        let cells: Vec<&str> = week
            .iter()
            .map(|d| {
                if log.contains(&h.id, *d) {
                    " x "
                } else if h.is_scheduled(weekday_key(*d)) {
                    " . "
                } else {
                    "   "
                }
            })
            .collect();
        println!("{:<24} {}", h.title, cells.join(" "));
    }

    println!("\nScore: {}", week_score(&habits, &log, &week, today));
    Ok(())
}
