use services::{QuizService, QuizServiceError};
use study_core::model::UserId;
use study_core::quiz::{QuizCompletion, QuizSession, SubmitFeedback};

use crate::console::Console;

fn show_question(session: &QuizSession) {
    let Some(question) = session.current_question() else {
        return;
    };
    let progress = session.progress();
    println!();
    println!(
        "Question {}/{}: {}",
        session.current_index() + 1,
        progress.total,
        question.text()
    );
    for (i, option) in question.options().iter().enumerate() {
        println!("  {}. {option}", i + 1);
    }
    if question.hint().is_some() {
        println!("  (h for a hint)");
    }
}

fn show_feedback(feedback: &SubmitFeedback) {
    if feedback.correct {
        println!("Correct!");
    } else {
        println!("Incorrect. The correct answer is: {}", feedback.answer);
    }
    if let Some(explanation) = &feedback.explanation {
        println!("Explanation: {explanation}");
    }
    if let Some(link) = &feedback.link {
        println!("Video solution: {link}");
    }
}

fn show_completion(completion: &QuizCompletion) {
    println!();
    println!(
        "Quiz complete! Score: {}/{} ({:.0}%)",
        completion.correct,
        completion.total,
        completion.percentage()
    );
    println!("{}", completion.tier().recommendation());
}

/// Drive one quiz over stdin. Returns the completion if the quiz was finished.
pub async fn run(
    quiz: &QuizService,
    user: &UserId,
    topic: &str,
) -> Result<Option<QuizCompletion>, Box<dyn std::error::Error>> {
    let mut session = quiz.start(topic)?;
    let mut console = Console::new();
    println!("Topic: {} ({} questions)", session.topic(), session.total());
    println!("Commands: 1..n select, h hint, s submit, n next, q quit");
    show_question(&session);

    loop {
        let Some(line) = console.prompt("> ").await? else {
            return Ok(None);
        };
        match line.trim() {
            "q" => return Ok(None),
            "h" => match session.reveal_hint() {
                Ok(hint) => println!("Hint: {hint}"),
                Err(err) => println!("{err}"),
            },
            "s" => match session.submit() {
                Ok(feedback) => show_feedback(&feedback),
                Err(err) => println!("{err}"),
            },
            "n" => match quiz.advance(user, &mut session).await {
                Ok(Some(completion)) => {
                    show_completion(&completion);
                    return Ok(Some(completion));
                }
                Ok(None) => show_question(&session),
                Err(QuizServiceError::Quiz(err)) => println!("{err}"),
                Err(err) => {
                    tracing::warn!(error = %err, "quiz result not saved");
                    println!("Could not save your score ({err}). Press n to retry.");
                }
            },
            raw => match raw.parse::<usize>() {
                Ok(n) if n >= 1 => match session.select_option_at(n - 1) {
                    Ok(()) => println!("Selected: {}", session.selected().unwrap_or_default()),
                    Err(err) => println!("{err}"),
                },
                _ => println!("Commands: 1..n select, h hint, s submit, n next, q quit"),
            },
        }
    }
}
