use services::{AppServices, Delivery, ReplySource};
use study_core::model::UserId;

use crate::args::Command;
use crate::console::Console;

type CommandResult = Result<(), Box<dyn std::error::Error>>;

pub async fn dispatch(app: &AppServices, user: Option<&UserId>, command: Command) -> CommandResult {
    match command {
        Command::SignUp { username, email } => sign_up(app, &username, &email).await,
        Command::Login { identifier } => login(app, &identifier).await,
        Command::Topics => {
            topics(app);
            Ok(())
        }
        Command::Quiz { topic } => {
            let user = required(user)?;
            crate::quiz::run(&app.quiz(), user, &topic).await?;
            Ok(())
        }
        Command::Progress => progress(app, required(user)?).await,
        Command::Plan => {
            plan(app);
            Ok(())
        }
        Command::ScheduleAdd {
            date,
            time,
            description,
        } => {
            let added = app
                .schedule()
                .add_task(required(user)?, &description, date, time)
                .await?;
            println!(
                "Task added: {} on {} at {} (id {})",
                added.task.description(),
                added.task.date(),
                added.task.time().format("%H:%M"),
                added.task.id()
            );
            report_delivery(&added.delivery);
            Ok(())
        }
        Command::ScheduleList => schedule_list(app, required(user)?).await,
        Command::ScheduleRemove { id } => {
            let removed = app.schedule().remove_task(required(user)?, id).await?;
            println!("Task deleted: {}", removed.description());
            Ok(())
        }
        Command::ScheduleRemind => {
            let sent = remind(app, required(user)?).await?;
            if sent == 0 {
                println!("No reminders due.");
            }
            Ok(())
        }
        Command::Ask { question } => ask(app, required(user)?, &question).await,
        Command::History => history(app, required(user)?).await,
        Command::Help => {
            crate::args::print_usage();
            Ok(())
        }
    }
}

fn required(user: Option<&UserId>) -> Result<&UserId, Box<dyn std::error::Error>> {
    user.ok_or_else(|| "this command needs --user".into())
}

async fn read_password(console: &mut Console, prompt: &str) -> Result<String, Box<dyn std::error::Error>> {
    console
        .prompt(prompt)
        .await?
        .ok_or_else(|| "no password given".into())
}

async fn sign_up(app: &AppServices, username: &str, email: &str) -> CommandResult {
    let mut console = Console::new();
    let password = read_password(&mut console, "Password: ").await?;
    let confirm = read_password(&mut console, "Confirm password: ").await?;
    let user = app.auth().sign_up(username, email, &password, &confirm).await?;
    println!("Account created for {} <{}>", user.display_name, user.email);
    Ok(())
}

async fn login(app: &AppServices, identifier: &str) -> CommandResult {
    let mut console = Console::new();
    let password = read_password(&mut console, "Password: ").await?;
    let user = app.auth().sign_in(identifier, &password).await?;
    println!("Welcome back, {}! Use --user {} for your study data.", user.display_name, user.id);
    Ok(())
}

fn topics(app: &AppServices) {
    let quiz = app.quiz();
    for name in quiz.topics() {
        let count = quiz.bank().questions(&name).map_or(0, <[_]>::len);
        println!("{name} ({count} questions)");
    }
}

async fn progress(app: &AppServices, user: &UserId) -> CommandResult {
    let progress = app.progress();
    let overview = progress.overview(user).await?;
    if overview.is_empty() {
        println!("No progress yet. Take a quiz to get started.");
        return Ok(());
    }

    println!("Total questions: {}", overview.total_questions);
    println!("Topics covered:  {}", overview.topics_covered);
    println!("Current streak:  {} day(s)", overview.current_streak);

    let today = progress.today(user).await?;
    if !today.is_empty() {
        println!();
        println!("Today:");
        for (topic, count) in &today {
            println!("  {topic}: {count}");
        }
    }

    println!();
    println!("By topic:");
    for (topic, total) in &overview.topic_totals {
        println!("  {topic}: {total}");
    }

    println!();
    println!("Recent activity:");
    for (date, topics) in &overview.recent_activity {
        let summary: Vec<String> = topics.iter().map(|(t, c)| format!("{t} {c}")).collect();
        println!("  {date}: {}", summary.join(", "));
    }

    if let Some(rec) = progress.recommend(&overview) {
        println!();
        println!("Practice more {}:", rec.topic);
        for tutorial in &rec.tutorials {
            println!("  {} - {}", tutorial.title, tutorial.url);
        }
        for link in &rec.practice_links {
            println!("  {} - {}", link.title, link.url);
        }
    } else if let Some(topic) = &overview.least_practiced {
        println!();
        println!("Least practiced: {topic}");
    }
    Ok(())
}

fn plan(app: &AppServices) {
    let plan = app.plan();
    if plan.is_empty() {
        println!("No study plan available.");
        return;
    }
    for week in plan.weeks() {
        println!("Week {}", week.week);
        for topic in &week.topics {
            println!("  {} (~{} h)", topic.name, topic.estimated_hours);
            if !topic.subtopics.is_empty() {
                println!("    {}", topic.subtopics.join(", "));
            }
            for resource in &topic.resources {
                println!("    {} - {}", resource.title, resource.url);
            }
        }
    }
    let details = plan.plan();
    if let Some(daily) = details.recommended_daily_hours {
        println!("Recommended: {daily} h per day");
    }
    if let Some(weekly) = details.recommended_weekly_hours {
        println!("Recommended: {weekly} h per week");
    }
    if !plan.tips().is_empty() {
        println!();
        println!("Tips:");
        for tip in plan.tips() {
            println!("  - {tip}");
        }
    }
}

async fn schedule_list(app: &AppServices, user: &UserId) -> CommandResult {
    remind(app, user).await?;
    let tasks = app.schedule().list_tasks(user).await?;
    if tasks.is_empty() {
        println!("No scheduled tasks.");
        return Ok(());
    }
    for task in tasks {
        let mark = if task.reminded() { " (reminded)" } else { "" };
        println!(
            "{}  {} {}  {}{mark}",
            task.id(),
            task.date(),
            task.time().format("%H:%M"),
            task.description()
        );
    }
    Ok(())
}

async fn remind(app: &AppServices, user: &UserId) -> Result<usize, Box<dyn std::error::Error>> {
    let sent = app.schedule().check_reminders(user).await?;
    for item in &sent {
        println!("{}", item.reminder.body());
        report_delivery(&item.delivery);
    }
    Ok(sent.len())
}

fn report_delivery(delivery: &Delivery) {
    if let Delivery::Failed(reason) = delivery {
        eprintln!("warning: notification not delivered: {reason}");
    }
}

async fn ask(app: &AppServices, user: &UserId, question: &str) -> CommandResult {
    let reply = app.assistant().ask(user, question).await?;
    if reply.source == ReplySource::Offline {
        eprintln!("(offline mode: set STUDY_AI_API_KEY for full answers)");
    }
    println!("{}", reply.text);
    Ok(())
}

async fn history(app: &AppServices, user: &UserId) -> CommandResult {
    let exchanges = app.assistant().recent_history(user).await;
    if exchanges.is_empty() {
        println!("No questions asked yet.");
        return Ok(());
    }
    for exchange in exchanges {
        println!("[{}] Q: {}", exchange.timestamp.format("%Y-%m-%d %H:%M"), exchange.question);
        println!("{}", exchange.answer);
        println!();
    }
    Ok(())
}
