use std::fmt;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use study_core::model::{TaskId, UserId};

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingCommand,
    UnknownCommand(String),
    MissingArgument { command: &'static str, name: &'static str },
    UnexpectedArgument { command: &'static str, raw: String },
    InvalidUser { raw: String },
    InvalidDate { raw: String },
    InvalidTime { raw: String },
    InvalidTaskId { raw: String },
    UserRequired { command: &'static str },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingCommand => write!(f, "missing subcommand"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::MissingArgument { command, name } => {
                write!(f, "{command} requires <{name}>")
            }
            ArgsError::UnexpectedArgument { command, raw } => {
                write!(f, "unexpected argument for {command}: {raw}")
            }
            ArgsError::InvalidUser { raw } => write!(f, "invalid --user value: {raw}"),
            ArgsError::InvalidDate { raw } => {
                write!(f, "invalid date (expected YYYY-MM-DD): {raw}")
            }
            ArgsError::InvalidTime { raw } => write!(f, "invalid time (expected HH:MM): {raw}"),
            ArgsError::InvalidTaskId { raw } => write!(f, "invalid task id: {raw}"),
            ArgsError::UserRequired { command } => {
                write!(f, "{command} needs a user (pass --user or set STUDY_USER)")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SignUp { username: String, email: String },
    Login { identifier: String },
    Topics,
    Quiz { topic: String },
    Progress,
    Plan,
    ScheduleAdd {
        date: NaiveDate,
        time: NaiveTime,
        description: String,
    },
    ScheduleList,
    ScheduleRemove { id: TaskId },
    ScheduleRemind,
    Ask { question: String },
    History,
    Help,
}

impl Command {
    /// Commands that act on one user's data.
    pub fn needs_user(&self) -> Option<&'static str> {
        match self {
            Command::Quiz { .. } => Some("quiz"),
            Command::Progress => Some("progress"),
            Command::ScheduleAdd { .. }
            | Command::ScheduleList
            | Command::ScheduleRemove { .. }
            | Command::ScheduleRemind => Some("schedule"),
            Command::Ask { .. } => Some("ask"),
            Command::History => Some("history"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub data_dir: Option<PathBuf>,
    pub user: Option<UserId>,
    pub command: Command,
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  studybot [--user <name>] [--data-dir <dir>] <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  signup <username> <email>          Create an account (password read from stdin)");
    eprintln!("  login <username|email>             Check credentials (password read from stdin)");
    eprintln!("  topics                             List quiz topics");
    eprintln!("  quiz <topic>                       Take an interactive quiz");
    eprintln!("  progress                           Show progress dashboard");
    eprintln!("  plan                               Show the study plan and tips");
    eprintln!("  schedule add <date> <HH:MM> <task> Schedule a study task");
    eprintln!("  schedule list                      List scheduled tasks");
    eprintln!("  schedule remove <id>               Delete a task");
    eprintln!("  schedule remind                    Send reminders that are due");
    eprintln!("  ask <question>                     Ask the study assistant");
    eprintln!("  history                            Show recent assistant answers");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  STUDY_USER, STUDY_DATA_DIR, STUDY_QUESTIONS_PATH, STUDY_PLAN_PATH");
    eprintln!("  STUDY_AI_API_KEY, STUDY_AI_BASE_URL, STUDY_AI_MODEL, STUDY_NOTIFY_WEBHOOK");
    eprintln!("  RUST_LOG (default: info)");
}

impl Args {
    pub fn parse(
        args: impl IntoIterator<Item = String>,
        env_user: Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut data_dir = None;
        let mut user = None;
        let mut positional = Vec::new();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--data-dir" => data_dir = Some(PathBuf::from(require_value(&mut args, "--data-dir")?)),
                "--user" => user = Some(require_value(&mut args, "--user")?),
                "--help" | "-h" => {
                    return Ok(Self {
                        data_dir,
                        user: None,
                        command: Command::Help,
                    });
                }
                _ if arg.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positional.push(arg),
            }
        }

        let user = user
            .or(env_user)
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| UserId::new(raw.trim()).map_err(|_| ArgsError::InvalidUser { raw }))
            .transpose()?;
        let command = parse_command(positional)?;
        if let Some(command_name) = command.needs_user() {
            if user.is_none() {
                return Err(ArgsError::UserRequired {
                    command: command_name,
                });
            }
        }

        Ok(Self {
            data_dir,
            user,
            command,
        })
    }
}

fn parse_command(positional: Vec<String>) -> Result<Command, ArgsError> {
    let mut rest = positional.into_iter();
    let Some(name) = rest.next() else {
        return Err(ArgsError::MissingCommand);
    };
    let command = match name.as_str() {
        "signup" => Command::SignUp {
            username: next_arg(&mut rest, "signup", "username")?,
            email: next_arg(&mut rest, "signup", "email")?,
        },
        "login" => Command::Login {
            identifier: next_arg(&mut rest, "login", "username|email")?,
        },
        "topics" => Command::Topics,
        "quiz" => Command::Quiz {
            topic: joined(&mut rest, "quiz", "topic")?,
        },
        "progress" => Command::Progress,
        "plan" => Command::Plan,
        "schedule" => return parse_schedule(rest),
        "ask" => Command::Ask {
            question: joined(&mut rest, "ask", "question")?,
        },
        "history" => Command::History,
        "help" => Command::Help,
        _ => return Err(ArgsError::UnknownCommand(name)),
    };
    match rest.next() {
        Some(extra) => Err(ArgsError::UnexpectedArgument {
            command: "this command",
            raw: extra,
        }),
        None => Ok(command),
    }
}

fn parse_schedule(mut rest: impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let action = next_arg(&mut rest, "schedule", "add|list|remove|remind")?;
    match action.as_str() {
        "add" => {
            let raw_date = next_arg(&mut rest, "schedule add", "date")?;
            let date = raw_date
                .parse::<NaiveDate>()
                .map_err(|_| ArgsError::InvalidDate { raw: raw_date.clone() })?;
            let raw_time = next_arg(&mut rest, "schedule add", "HH:MM")?;
            let time = parse_time(&raw_time)?;
            let description = joined(&mut rest, "schedule add", "task")?;
            Ok(Command::ScheduleAdd {
                date,
                time,
                description,
            })
        }
        "list" => Ok(Command::ScheduleList),
        "remove" => {
            let raw = next_arg(&mut rest, "schedule remove", "id")?;
            let id = raw
                .parse::<TaskId>()
                .map_err(|_| ArgsError::InvalidTaskId { raw: raw.clone() })?;
            Ok(Command::ScheduleRemove { id })
        }
        "remind" => Ok(Command::ScheduleRemind),
        _ => Err(ArgsError::UnknownCommand(format!("schedule {action}"))),
    }
}

fn parse_time(raw: &str) -> Result<NaiveTime, ArgsError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| ArgsError::InvalidTime {
            raw: raw.to_string(),
        })
}

fn next_arg(
    rest: &mut impl Iterator<Item = String>,
    command: &'static str,
    name: &'static str,
) -> Result<String, ArgsError> {
    rest.next()
        .ok_or(ArgsError::MissingArgument { command, name })
}

fn joined(
    rest: &mut impl Iterator<Item = String>,
    command: &'static str,
    name: &'static str,
) -> Result<String, ArgsError> {
    let words: Vec<String> = rest.collect();
    let text = words.join(" ");
    if text.trim().is_empty() {
        return Err(ArgsError::MissingArgument { command, name });
    }
    Ok(text)
}
