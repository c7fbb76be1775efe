use std::sync::Arc;

use rand::Rng;
use storage::repository::ProgressRepository;
use study_core::model::{QuestionBank, UserId};
use study_core::quiz::{QuizCompletion, QuizSession};

use crate::Clock;
use crate::error::QuizServiceError;

/// Starts quizzes from the question bank and records finished ones.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    bank: Arc<QuestionBank>,
    progress: Arc<dyn ProgressRepository>,
}

impl QuizService {
    #[must_use]
    pub fn new(clock: Clock, bank: Arc<QuestionBank>, progress: Arc<dyn ProgressRepository>) -> Self {
        Self {
            clock,
            bank,
            progress,
        }
    }

    /// Topic names in display order.
    #[must_use]
    pub fn topics(&self) -> Vec<String> {
        self.bank.topic_names().map(str::to_string).collect()
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Start a freshly shuffled session for `topic`.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::UnknownTopic` if the bank has no such topic,
    /// or `QuizServiceError::Quiz` if it has no questions.
    pub fn start(&self, topic: &str) -> Result<QuizSession, QuizServiceError> {
        self.start_with_rng(topic, &mut rand::rng())
    }

    /// # Errors
    ///
    /// Same as [`QuizService::start`].
    pub fn start_with_rng<R: Rng + ?Sized>(
        &self,
        topic: &str,
        rng: &mut R,
    ) -> Result<QuizSession, QuizServiceError> {
        let name = self
            .resolve_topic(topic)
            .ok_or_else(|| QuizServiceError::UnknownTopic(topic.to_string()))?;
        let questions = self.bank.questions(name).unwrap_or_default();
        Ok(QuizSession::new_with_rng(name, questions, rng)?)
    }

    /// Bank spelling of `topic`, matched case-insensitively.
    #[must_use]
    pub fn resolve_topic(&self, topic: &str) -> Option<&str> {
        let topic = topic.trim();
        self.bank
            .topic_names()
            .find(|name| *name == topic)
            .or_else(|| {
                self.bank
                    .topic_names()
                    .find(|name| name.eq_ignore_ascii_case(topic))
            })
    }

    /// Move past the submitted question. When this finishes the quiz the
    /// correct count is added to today's progress for the topic.
    ///
    /// A session whose completion could not be written is retried here
    /// instead of being advanced again.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Quiz` for an invalid transition, or
    /// `QuizServiceError::Storage` if the progress write fails. The session
    /// keeps the completion pending in that case.
    pub async fn advance(
        &self,
        user: &UserId,
        session: &mut QuizSession,
    ) -> Result<Option<QuizCompletion>, QuizServiceError> {
        if session.pending_completion().is_none() && session.advance()?.is_none() {
            return Ok(None);
        }
        self.record_completion(user, session).await
    }

    /// Persist a finished session's score if it has not been written yet.
    ///
    /// Returns `None` when the session is unfinished or already recorded.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if the progress write fails.
    pub async fn record_completion(
        &self,
        user: &UserId,
        session: &mut QuizSession,
    ) -> Result<Option<QuizCompletion>, QuizServiceError> {
        let Some(completion) = session.pending_completion() else {
            return Ok(None);
        };
        self.record(user, &completion).await?;
        session.mark_recorded();
        Ok(Some(completion))
    }

    async fn record(
        &self,
        user: &UserId,
        completion: &QuizCompletion,
    ) -> Result<(), QuizServiceError> {
        let today = self.clock.today();
        let correct = i64::try_from(completion.correct).unwrap_or(i64::MAX);
        let count = self
            .progress
            .increment_progress(user, today, &completion.topic, correct)
            .await?;
        tracing::info!(
            user = %user,
            topic = %completion.topic,
            correct = completion.correct,
            total = completion.total,
            today_count = count,
            "quiz completed"
        );
        Ok(())
    }
}
