use std::fmt;
use std::path::PathBuf;

use chrono::{Duration, NaiveDate};
use storage::repository::Storage;
use study_core::model::{
    PlanResource, PlanTopic, PlanWeek, Question, QuestionBank, StudyPlan, TopicMaterial, Tutorial,
    UserId,
};

#[derive(Debug, Clone)]
struct Args {
    data_dir: PathBuf,
    user: Option<UserId>,
    days: u32,
    today: Option<NaiveDate>,
    force: bool,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidUser { raw: String },
    InvalidDays { raw: String },
    InvalidToday { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidUser { raw } => write!(f, "invalid --user value: {raw}"),
            ArgsError::InvalidDays { raw } => write!(f, "invalid --days value: {raw}"),
            ArgsError::InvalidToday { raw } => {
                write!(f, "invalid --today value (expected YYYY-MM-DD): {raw}")
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

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut data_dir =
            PathBuf::from(std::env::var("STUDY_DATA_DIR").unwrap_or_else(|_| "data".into()));
        let mut user = None;
        let mut days = 3;
        let mut today = None;
        let mut force = false;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--data-dir" => data_dir = PathBuf::from(require_value(&mut args, "--data-dir")?),
                "--user" => {
                    let value = require_value(&mut args, "--user")?;
                    user = Some(
                        UserId::new(value.clone())
                            .map_err(|_| ArgsError::InvalidUser { raw: value })?,
                    );
                }
                "--days" => {
                    let value = require_value(&mut args, "--days")?;
                    days = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidDays { raw: value.clone() })?;
                }
                "--today" => {
                    let value = require_value(&mut args, "--today")?;
                    today = Some(
                        value
                            .parse::<NaiveDate>()
                            .map_err(|_| ArgsError::InvalidToday { raw: value.clone() })?,
                    );
                }
                "--force" => force = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            data_dir,
            user,
            days,
            today,
            force,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --data-dir <dir>          Data directory (default: data)");
    eprintln!("  --force                   Overwrite existing question bank and plan files");
    eprintln!("  --user <name>             Also record sample progress for this user");
    eprintln!("  --days <n>                Consecutive days of sample progress (default: 3)");
    eprintln!("  --today <YYYY-MM-DD>      Last day of sample progress (default: today)");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  STUDY_DATA_DIR");
}

fn question(text: &str, options: &[&str], answer: &str) -> Result<Question, Box<dyn std::error::Error>> {
    Ok(Question::new(
        text,
        options.iter().map(|o| (*o).to_string()).collect(),
        answer,
    )?)
}

fn sample_bank() -> Result<QuestionBank, Box<dyn std::error::Error>> {
    let mut bank = QuestionBank::new();

    let mut arrays = TopicMaterial::new(vec![
        question("What is the index of the first element?", &["0", "1", "-1"], "0")?
            .with_hint("Most languages count from zero"),
        question(
            "Time complexity of accessing an element by index?",
            &["O(1)", "O(n)", "O(log n)"],
            "O(1)",
        )?
        .with_explanation("Elements are stored contiguously, so the address is computed directly."),
        question(
            "Which technique finds a pair with a given sum in a sorted array in O(n)?",
            &["Two pointers", "Binary search per element", "Brute force"],
            "Two pointers",
        )?,
    ]);
    arrays.tutorials.push(Tutorial {
        title: "Arrays in 10 minutes".into(),
        url: "https://www.youtube.com/results?search_query=arrays+data+structure".into(),
        creator: Some("Community".into()),
        duration: Some("10:00".into()),
    });
    bank.insert("Arrays", arrays);

    let graphs = TopicMaterial::new(vec![
        question("Which structure does BFS use?", &["Queue", "Stack", "Heap"], "Queue")?
            .with_hint("First in, first out"),
        question(
            "Which algorithm finds shortest paths with non-negative weights?",
            &["Dijkstra", "Kruskal", "DFS"],
            "Dijkstra",
        )?,
    ]);
    bank.insert("Graphs", graphs);

    bank.validate()?;
    Ok(bank)
}

fn sample_plan() -> StudyPlan {
    StudyPlan {
        recommended_path: vec![
            PlanWeek {
                week: 1,
                topics: vec![PlanTopic {
                    name: "Arrays".into(),
                    estimated_hours: 6.0,
                    subtopics: vec!["Traversal".into(), "Two pointers".into()],
                    resources: vec![PlanResource {
                        title: "Arrays in 10 minutes".into(),
                        url: "https://www.youtube.com/results?search_query=arrays+data+structure"
                            .into(),
                        creator: Some("Community".into()),
                    }],
                }],
            },
            PlanWeek {
                week: 2,
                topics: vec![PlanTopic {
                    name: "Graphs".into(),
                    estimated_hours: 8.0,
                    subtopics: vec!["BFS".into(), "DFS".into(), "Shortest paths".into()],
                    resources: Vec::new(),
                }],
            },
        ],
        tips: vec![
            "Practice a little every day".into(),
            "Explain solutions out loud".into(),
        ],
        recommended_daily_hours: Some(2.0),
        recommended_weekly_hours: Some(12.0),
    }
}

async fn write_if_absent(
    path: &std::path::Path,
    body: String,
    force: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    if !force && tokio::fs::try_exists(path).await? {
        return Ok(false);
    }
    tokio::fs::write(path, body).await?;
    Ok(true)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::json(&args.data_dir).await?;

    let bank_path = args.data_dir.join("dsa_questions.json");
    let bank = serde_json::to_string_pretty(&sample_bank()?)?;
    if write_if_absent(&bank_path, bank, args.force).await? {
        println!("Wrote {}", bank_path.display());
    }

    let plan_path = args.data_dir.join("study_schedule.json");
    let plan = serde_json::to_string_pretty(&[sample_plan()])?;
    if write_if_absent(&plan_path, plan, args.force).await? {
        println!("Wrote {}", plan_path.display());
    }

    if let Some(user) = &args.user {
        let today = args
            .today
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let topics = ["Arrays", "Graphs"];
        for i in 0..args.days {
            let date = today - Duration::days(i64::from(i));
            let topic = topics[(i as usize) % topics.len()];
            storage
                .progress
                .increment_progress(user, date, topic, i64::from(i % 3 + 1))
                .await?;
        }
        println!(
            "Seeded {} day(s) of progress for {} ending {}",
            args.days, user, today
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
