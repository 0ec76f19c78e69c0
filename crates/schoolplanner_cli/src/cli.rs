//! Command-line surface.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use schoolplanner_core::model::reminder::ReminderOffset;
use schoolplanner_core::{Color, NotificationPriority, ReminderSelection, SubjectId};
use std::path::PathBuf;

/// School planner: subjects, tasks, exams and daily reminders.
#[derive(Debug, Parser)]
#[command(name = "schoolplanner", version, about)]
pub struct Cli {
    /// SQLite database file.
    #[arg(long, env = "SCHOOLPLANNER_DB", global = true)]
    pub db: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(long, env = "SCHOOLPLANNER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Directory for rolling log files.
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage subjects.
    #[command(subcommand)]
    Subject(SubjectCommand),
    /// Manage tasks.
    #[command(subcommand)]
    Task(TaskCommand),
    /// Manage exams.
    #[command(subcommand)]
    Exam(ExamCommand),
    /// Pending tasks and exams grouped by due date and subject.
    Home,
    /// List the reminder choices.
    Reminders {
        /// Show the concrete reminder date for this due date.
        #[arg(long)]
        due: Option<NaiveDate>,
    },
    /// Notification settings.
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Run the reminder sweep once, now.
    Sweep,
    /// Run the reminder sweep every day at the configured hour until Ctrl+C.
    Daemon,
    /// Quick action of a task notification.
    MarkComplete {
        #[arg(long)]
        notification: i64,
        #[arg(long)]
        task: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum SubjectCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        abbreviation: String,
        /// `#RRGGBB` or `#AARRGGBB`; derived from the name when omitted.
        #[arg(long)]
        color: Option<Color>,
    },
    List,
    Edit {
        id: SubjectId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        abbreviation: Option<String>,
        #[arg(long)]
        color: Option<Color>,
    },
    /// Delete a subject; fails while tasks or exams reference it unless
    /// `--with-items` is given.
    Delete {
        id: SubjectId,
        /// Also delete every task and exam of the subject.
        #[arg(long)]
        with_items: bool,
    },
    /// Move all tasks and exams to another subject, then delete this one.
    Migrate {
        id: SubjectId,
        #[arg(long)]
        to: SubjectId,
    },
}

/// Fields shared by task and exam add forms.
#[derive(Debug, Args)]
pub struct AddItemArgs {
    /// Entry title; repeat to add several items at once.
    #[arg(long = "title", required = true)]
    pub titles: Vec<String>,
    /// Entry description, matched to titles by position.
    #[arg(long = "description")]
    pub descriptions: Vec<String>,
    #[arg(long)]
    pub due: NaiveDate,
    /// Palette index (see `reminders`) or a date `YYYY-MM-DD`.
    #[arg(long, value_parser = parse_reminder)]
    pub reminder: ReminderSelection,
    #[arg(long)]
    pub subject: SubjectId,
}

/// Fields of an edit form; omitted flags keep the stored value.
#[derive(Debug, Args)]
pub struct EditItemArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub due: Option<NaiveDate>,
    #[arg(long, value_parser = parse_reminder)]
    pub reminder: Option<ReminderSelection>,
    #[arg(long)]
    pub subject: Option<SubjectId>,
}

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    Add(AddItemArgs),
    List {
        /// Hide completed tasks.
        #[arg(long)]
        open: bool,
    },
    Show {
        id: i64,
    },
    Edit {
        id: i64,
        #[command(flatten)]
        fields: EditItemArgs,
    },
    Complete {
        id: i64,
    },
    Reopen {
        id: i64,
    },
    Delete {
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum ExamCommand {
    Add(AddItemArgs),
    List,
    Show {
        id: i64,
    },
    Edit {
        id: i64,
        #[command(flatten)]
        fields: EditItemArgs,
    },
    Delete {
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    Show,
    Set {
        /// Hour of day (0-23) the daily sweep runs at.
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=23))]
        hour: Option<u8>,
        #[arg(long, value_parser = parse_priority)]
        priority: Option<NotificationPriority>,
    },
}

fn parse_reminder(value: &str) -> Result<ReminderSelection, String> {
    if let Ok(index) = value.trim().parse::<i32>() {
        return ReminderOffset::from_index(index)
            .map(ReminderSelection::Offset)
            .ok_or_else(|| format!("reminder index must be 0-6, got {index}"));
    }
    value
        .trim()
        .parse::<NaiveDate>()
        .map(ReminderSelection::Date)
        .map_err(|_| format!("expected a palette index or YYYY-MM-DD date, got `{value}`"))
}

fn parse_priority(value: &str) -> Result<NotificationPriority, String> {
    value.parse().map_err(|err| format!("{err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn reminder_accepts_index_or_date() {
        assert_eq!(
            parse_reminder("5").unwrap(),
            ReminderSelection::Offset(ReminderOffset::OneWeekBefore)
        );
        assert_eq!(
            parse_reminder("2026-10-20").unwrap(),
            ReminderSelection::Date(NaiveDate::from_ymd_opt(2026, 10, 20).unwrap())
        );
        assert!(parse_reminder("7").is_err());
        assert!(parse_reminder("soon").is_err());
    }

    #[test]
    fn batch_titles_are_collected() {
        let cli = Cli::try_parse_from([
            "schoolplanner",
            "task",
            "add",
            "--title",
            "Read chapter 3",
            "--title",
            "Exercises 1-4",
            "--due",
            "2026-10-25",
            "--reminder",
            "1",
            "--subject",
            "2",
        ])
        .unwrap();

        match cli.command {
            Command::Task(TaskCommand::Add(args)) => {
                assert_eq!(args.titles.len(), 2);
                assert_eq!(args.subject, 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn settings_hour_is_range_checked() {
        assert!(Cli::try_parse_from(["schoolplanner", "settings", "set", "--hour", "24"]).is_err());
        assert!(Cli::try_parse_from(["schoolplanner", "settings", "set", "--hour", "7"]).is_ok());
    }
}
