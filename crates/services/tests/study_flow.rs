use std::sync::Arc;

use chrono::NaiveTime;
use rand::SeedableRng;
use rand::rngs::StdRng;
use services::{AppServices, Clock, LogNotifier, ReplySource, ServicesConfig};
use storage::repository::Storage;
use study_core::model::{Question, QuestionBank, StudyPlan, TopicMaterial, Tutorial, UserId};
use study_core::quiz::ScoreTier;
use study_core::time::fixed_now;

fn bank() -> QuestionBank {
    let q = |text: &str, answer: &str| {
        Question::new(text, vec!["a".into(), "b".into(), "c".into()], answer).unwrap()
    };
    let mut bank = QuestionBank::new();
    bank.insert(
        "Arrays",
        TopicMaterial::new(vec![q("a1", "a"), q("a2", "b"), q("a3", "c"), q("a4", "a")]),
    );
    let mut graphs = TopicMaterial::new(vec![q("g1", "a")]);
    graphs.tutorials.push(Tutorial {
        title: "BFS explained".into(),
        url: "https://example.com/bfs".into(),
        creator: None,
        duration: None,
    });
    bank.insert("Graphs", graphs);
    bank
}

async fn app(dir: &std::path::Path) -> AppServices {
    let storage = Storage::json(dir).await.unwrap();
    AppServices::new(
        &storage,
        Clock::fixed(fixed_now()),
        Arc::new(bank()),
        Arc::new(StudyPlan::default()),
        None,
        Arc::new(LogNotifier),
    )
}

#[tokio::test]
async fn quiz_progress_and_schedule_round_trip_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path()).await;
    let user = UserId::new("alice").unwrap();

    // Answer three of four correctly: 75% lands in the middle tier.
    let quiz = app.quiz();
    let mut session = quiz
        .start_with_rng("Arrays", &mut StdRng::seed_from_u64(1))
        .unwrap();
    let mut completion = None;
    let mut answered = 0;
    while completion.is_none() {
        let question = session.current_question().unwrap();
        let choice = if answered == 0 {
            question
                .options()
                .iter()
                .find(|o| o.as_str() != question.answer())
                .unwrap()
                .clone()
        } else {
            question.answer().to_string()
        };
        session.select_option(&choice).unwrap();
        session.submit().unwrap();
        answered += 1;
        completion = quiz.advance(&user, &mut session).await.unwrap();
    }
    let completion = completion.unwrap();
    assert_eq!((completion.correct, completion.total), (3, 4));
    assert_eq!(completion.tier(), ScoreTier::PracticeMore);

    let raw = std::fs::read_to_string(dir.path().join("progress/alice_progress.json")).unwrap();
    assert!(raw.contains("\"Arrays\": 3"));

    let progress = app.progress();
    let overview = progress.overview(&user).await.unwrap();
    assert_eq!(overview.total_questions, 3);
    assert_eq!(overview.current_streak, 1);
    assert_eq!(overview.least_practiced.as_deref(), Some("Arrays"));

    let schedule = app.schedule();
    let today = Clock::fixed(fixed_now()).today();
    schedule
        .add_task(&user, "Revise graphs", today, NaiveTime::MIN)
        .await
        .unwrap();
    let fired = schedule.check_reminders(&user).await.unwrap();
    assert_eq!(fired.len(), 1);
    assert!(fired[0].delivery.is_sent());
    assert!(schedule.check_reminders(&user).await.unwrap().is_empty());

    let tasks = schedule.list_tasks(&user).await.unwrap();
    assert!(tasks[0].reminded());
}

#[tokio::test]
async fn accounts_and_offline_assistant() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path()).await;

    let auth = app.auth();
    let user = auth
        .sign_up("carol", "carol@example.com", "Passw0rdX", "Passw0rdX")
        .await
        .unwrap();
    assert!(dir.path().join("auth/users.json").exists());
    assert_eq!(auth.sign_in("carol", "Passw0rdX").await.unwrap().id, user.id);

    let reply = app
        .assistant()
        .ask(&user.id, "Explain dynamic programming")
        .await
        .unwrap();
    assert_eq!(reply.source, ReplySource::Offline);
    assert!(app.assistant().recent_history(&user.id).await.is_empty());
}

#[tokio::test]
async fn open_loads_content_from_the_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("dsa_questions.json"),
        serde_json::to_string(&bank()).unwrap(),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("study_schedule.json"),
        r#"[{"tips": ["Practice daily"], "recommended_path": []}]"#,
    )
    .unwrap();

    let app = AppServices::open(&ServicesConfig::new(dir.path()), Clock::fixed(fixed_now()))
        .await
        .unwrap();
    assert_eq!(app.quiz().topics(), ["Arrays", "Graphs"]);
    assert_eq!(app.plan().tips(), ["Practice daily"]);
}

#[tokio::test]
async fn open_without_a_question_bank_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = AppServices::open(&ServicesConfig::new(dir.path()), Clock::fixed(fixed_now())).await;
    assert!(result.is_err());
}
