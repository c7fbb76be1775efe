use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Question;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("topic {topic:?} has no questions")]
    EmptyTopic { topic: String },

    #[error("no option selected")]
    NoOptionSelected,

    #[error("{choice:?} is not an option for this question")]
    UnknownOption { choice: String },

    #[error("question already submitted")]
    AlreadySubmitted,

    #[error("question not submitted yet")]
    NotSubmitted,

    #[error("this question has no hint")]
    NoHint,

    #[error("hint already shown")]
    HintAlreadyShown,

    #[error("quiz already completed")]
    Completed,
}

impl QuizError {
    /// True for input problems the user can fix by re-answering.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::NoOptionSelected | Self::UnknownOption { .. })
    }
}

//
// ─── SCORE TIERS ───────────────────────────────────────────────────────────────
//

/// Qualitative band derived from the score ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreTier {
    /// Below 60%.
    ReviewConcepts,
    /// From 60% up to (not including) 80%.
    PracticeMore,
    /// 80% and above.
    AdvancedReady,
}

impl ScoreTier {
    #[must_use]
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio < 0.6 {
            Self::ReviewConcepts
        } else if ratio < 0.8 {
            Self::PracticeMore
        } else {
            Self::AdvancedReady
        }
    }

    #[must_use]
    pub fn recommendation(self) -> &'static str {
        match self {
            Self::ReviewConcepts => {
                "Review the concepts and watch the tutorial videos before trying again."
            }
            Self::PracticeMore => {
                "Good job! Practice more problems to improve your understanding."
            }
            Self::AdvancedReady => "Excellent! You're ready to tackle more advanced topics!",
        }
    }
}

//
// ─── EVENTS ────────────────────────────────────────────────────────────────────
//

/// Emitted once when the last question is advanced past.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizCompletion {
    pub topic: String,
    pub correct: usize,
    pub total: usize,
}

impl QuizCompletion {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64
    }

    #[must_use]
    pub fn percentage(&self) -> f64 {
        self.ratio() * 100.0
    }

    #[must_use]
    pub fn tier(&self) -> ScoreTier {
        ScoreTier::from_ratio(self.ratio())
    }
}

/// Result of submitting an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitFeedback {
    pub correct: bool,
    pub answer: String,
    pub explanation: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    AwaitingAnswer(usize),
    Submitted(usize),
    Completed,
}

/// Aggregated view of quiz progress, useful for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    pub is_complete: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One user's pass through one topic's questions in shuffled order.
///
/// The order is fixed when the session is created. Completion is reported
/// exactly once by `advance`.
#[derive(Clone)]
pub struct QuizSession {
    topic: String,
    questions: Vec<Question>,
    current: usize,
    submitted: bool,
    selected: Option<String>,
    correct: usize,
    hint_shown: bool,
    completed: bool,
    recorded: bool,
}

impl QuizSession {
    /// Start a session with a uniformly shuffled copy of `questions`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyTopic` if there are no questions.
    pub fn new(topic: impl Into<String>, questions: &[Question]) -> Result<Self, QuizError> {
        Self::new_with_rng(topic, questions, &mut rand::rng())
    }

    /// Like `new`, drawing the permutation from `rng`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyTopic` if there are no questions.
    pub fn new_with_rng<R: Rng + ?Sized>(
        topic: impl Into<String>,
        questions: &[Question],
        rng: &mut R,
    ) -> Result<Self, QuizError> {
        let topic = topic.into();
        if questions.is_empty() {
            return Err(QuizError::EmptyTopic { topic });
        }
        let mut shuffled = questions.to_vec();
        shuffled.shuffle(rng);
        Ok(Self {
            topic,
            questions: shuffled,
            current: 0,
            submitted: false,
            selected: None,
            correct: 0,
            hint_shown: false,
            completed: false,
            recorded: false,
        })
    }

    /// Reshuffle and start over on the same topic.
    pub fn restart(&mut self) {
        self.restart_with_rng(&mut rand::rng());
    }

    pub fn restart_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.questions.shuffle(rng);
        self.current = 0;
        self.submitted = false;
        self.selected = None;
        self.correct = 0;
        self.hint_shown = false;
        self.completed = false;
        self.recorded = false;
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn state(&self) -> QuizState {
        if self.completed {
            QuizState::Completed
        } else if self.submitted {
            QuizState::Submitted(self.current)
        } else {
            QuizState::AwaitingAnswer(self.current)
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.completed {
            return None;
        }
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub fn hint_shown(&self) -> bool {
        self.hint_shown
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// True when the current question is the last one.
    #[must_use]
    pub fn is_last_question(&self) -> bool {
        !self.completed && self.current + 1 == self.questions.len()
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        let answered = if self.completed {
            self.questions.len()
        } else {
            self.current + usize::from(self.submitted)
        };
        QuizProgress {
            total: self.questions.len(),
            answered,
            correct: self.correct,
            is_complete: self.completed,
        }
    }

    /// The completion summary once the session is finished.
    #[must_use]
    pub fn completion(&self) -> Option<QuizCompletion> {
        self.completed.then(|| self.build_completion())
    }

    /// True once the completion has been persisted by the caller.
    #[must_use]
    pub fn is_recorded(&self) -> bool {
        self.recorded
    }

    /// Completion that still has to be persisted, if any.
    #[must_use]
    pub fn pending_completion(&self) -> Option<QuizCompletion> {
        (self.completed && !self.recorded).then(|| self.build_completion())
    }

    /// Flag the completion as persisted. No-op before the session finishes.
    pub fn mark_recorded(&mut self) {
        if self.completed {
            self.recorded = true;
        }
    }

    /// Record a tentative choice for the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Completed` or `QuizError::AlreadySubmitted` outside
    /// `AwaitingAnswer`, and `QuizError::UnknownOption` for a choice that is not
    /// one of the options.
    pub fn select_option(&mut self, choice: &str) -> Result<(), QuizError> {
        let question = self.awaiting_question()?;
        if !question.options().iter().any(|o| o == choice) {
            return Err(QuizError::UnknownOption {
                choice: choice.to_string(),
            });
        }
        self.selected = Some(choice.to_string());
        Ok(())
    }

    /// Select an option by its zero-based position.
    ///
    /// # Errors
    ///
    /// Same as `select_option`; an out-of-range index is `UnknownOption`.
    pub fn select_option_at(&mut self, index: usize) -> Result<(), QuizError> {
        let choice = self
            .awaiting_question()?
            .options()
            .get(index)
            .cloned()
            .ok_or_else(|| QuizError::UnknownOption {
                choice: format!("#{}", index + 1),
            })?;
        self.select_option(&choice)
    }

    /// Reveal the hint of the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoHint` if the question has none and
    /// `QuizError::HintAlreadyShown` on a second reveal.
    pub fn reveal_hint(&mut self) -> Result<&str, QuizError> {
        if self.completed {
            return Err(QuizError::Completed);
        }
        if self.hint_shown {
            return Err(QuizError::HintAlreadyShown);
        }
        if self.questions[self.current].hint().is_none() {
            return Err(QuizError::NoHint);
        }
        self.hint_shown = true;
        self.questions[self.current].hint().ok_or(QuizError::NoHint)
    }

    /// Grade the selected option.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoOptionSelected` without a prior selection (the
    /// session stays in `AwaitingAnswer`), and `QuizError::AlreadySubmitted` on
    /// a repeat submit at the same index.
    pub fn submit(&mut self) -> Result<SubmitFeedback, QuizError> {
        let question = self.awaiting_question()?;
        let Some(choice) = self.selected.as_deref() else {
            return Err(QuizError::NoOptionSelected);
        };
        let feedback = SubmitFeedback {
            correct: question.is_correct(choice),
            answer: question.answer().to_string(),
            explanation: question.explanation().map(str::to_string),
            link: question.link().map(str::to_string),
        };
        if feedback.correct {
            self.correct += 1;
        }
        self.submitted = true;
        Ok(feedback)
    }

    /// Move past a submitted question.
    ///
    /// Returns the completion event when the last question is left behind.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotSubmitted` before submitting and
    /// `QuizError::Completed` once the session has finished.
    pub fn advance(&mut self) -> Result<Option<QuizCompletion>, QuizError> {
        if self.completed {
            return Err(QuizError::Completed);
        }
        if !self.submitted {
            return Err(QuizError::NotSubmitted);
        }
        self.selected = None;
        self.hint_shown = false;
        self.submitted = false;
        if self.current + 1 == self.questions.len() {
            self.current = self.questions.len();
            self.completed = true;
            return Ok(Some(self.build_completion()));
        }
        self.current += 1;
        Ok(None)
    }

    fn awaiting_question(&self) -> Result<&Question, QuizError> {
        if self.completed {
            return Err(QuizError::Completed);
        }
        if self.submitted {
            return Err(QuizError::AlreadySubmitted);
        }
        Ok(&self.questions[self.current])
    }

    fn build_completion(&self) -> QuizCompletion {
        QuizCompletion {
            topic: self.topic.clone(),
            correct: self.correct,
            total: self.questions.len(),
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("topic", &self.topic)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("submitted", &self.submitted)
            .field("correct", &self.correct)
            .field("completed", &self.completed)
            .field("recorded", &self.recorded)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn question(n: usize) -> Question {
        Question::new(
            format!("Q{n}"),
            vec![format!("right{n}"), format!("wrong{n}")],
            format!("right{n}"),
        )
        .unwrap()
    }

    fn questions(count: usize) -> Vec<Question> {
        (0..count).map(question).collect()
    }

    fn answer_current(session: &mut QuizSession, correct: bool) -> Option<QuizCompletion> {
        let q = session.current_question().unwrap().clone();
        let choice = if correct {
            q.answer().to_string()
        } else {
            q.options().iter().find(|o| *o != q.answer()).unwrap().clone()
        };
        session.select_option(&choice).unwrap();
        session.submit().unwrap();
        session.advance().unwrap()
    }

    #[test]
    fn new_session_is_a_permutation_of_the_topic() {
        let source = questions(8);
        let mut rng = StdRng::seed_from_u64(7);
        let session = QuizSession::new_with_rng("Arrays", &source, &mut rng).unwrap();

        let mut got: Vec<_> = session.questions().iter().map(|q| q.text().to_string()).collect();
        let mut want: Vec<_> = source.iter().map(|q| q.text().to_string()).collect();
        got.sort();
        want.sort();
        assert_eq!(got, want);
        assert_eq!(session.state(), QuizState::AwaitingAnswer(0));
    }

    #[test]
    fn advancing_through_all_questions_completes_once() {
        let mut session = QuizSession::new("Arrays", &questions(5)).unwrap();
        let mut completions = Vec::new();
        for _ in 0..5 {
            if let Some(done) = answer_current(&mut session, true) {
                completions.push(done);
            }
        }
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].correct, 5);
        assert_eq!(session.state(), QuizState::Completed);
        assert_eq!(session.current_index(), 5);
        assert_eq!(session.advance(), Err(QuizError::Completed));
        assert_eq!(session.completion(), Some(completions[0].clone()));
    }

    #[test]
    fn submit_without_selection_stays_awaiting() {
        let mut session = QuizSession::new("Arrays", &questions(2)).unwrap();
        let err = session.submit().unwrap_err();
        assert_eq!(err, QuizError::NoOptionSelected);
        assert!(err.is_validation());
        assert_eq!(session.state(), QuizState::AwaitingAnswer(0));
    }

    #[test]
    fn second_submit_is_rejected_and_does_not_recount() {
        let mut session = QuizSession::new("Arrays", &questions(2)).unwrap();
        let answer = session.current_question().unwrap().answer().to_string();
        session.select_option(&answer).unwrap();
        assert!(session.submit().unwrap().correct);
        assert_eq!(session.submit(), Err(QuizError::AlreadySubmitted));
        assert_eq!(session.correct_count(), 1);
        assert_eq!(session.state(), QuizState::Submitted(0));
    }

    #[test]
    fn advance_requires_submission() {
        let mut session = QuizSession::new("Arrays", &questions(2)).unwrap();
        assert_eq!(session.advance(), Err(QuizError::NotSubmitted));
    }

    #[test]
    fn unknown_option_is_rejected() {
        let mut session = QuizSession::new("Arrays", &questions(1)).unwrap();
        assert!(matches!(
            session.select_option("nope"),
            Err(QuizError::UnknownOption { .. })
        ));
        assert!(session.select_option_at(9).is_err());
        assert!(session.selected().is_none());
    }

    #[test]
    fn hint_reveals_once_and_resets_on_advance() {
        let source = vec![question(0).with_hint("first"), question(1).with_hint("second")];
        let mut session = QuizSession::new("Arrays", &source).unwrap();
        let hint = session.reveal_hint().unwrap().to_string();
        assert!(hint == "first" || hint == "second");
        assert_eq!(session.reveal_hint(), Err(QuizError::HintAlreadyShown));

        answer_current(&mut session, true);
        assert!(!session.hint_shown());
        assert!(session.reveal_hint().is_ok());
    }

    #[test]
    fn reveal_hint_without_hint_errors() {
        let mut session = QuizSession::new("Arrays", &questions(1)).unwrap();
        assert_eq!(session.reveal_hint(), Err(QuizError::NoHint));
        assert!(!session.hint_shown());
    }

    #[test]
    fn empty_topic_is_rejected() {
        assert!(matches!(
            QuizSession::new("Empty", &[]),
            Err(QuizError::EmptyTopic { .. })
        ));
    }

    #[test]
    fn feedback_carries_explanation_and_link() {
        let q = question(0)
            .with_explanation("because")
            .with_link("https://example.com/v")
            .unwrap();
        let mut session = QuizSession::new("Arrays", &[q]).unwrap();
        session.select_option("wrong0").unwrap();
        let feedback = session.submit().unwrap();
        assert!(!feedback.correct);
        assert_eq!(feedback.answer, "right0");
        assert_eq!(feedback.explanation.as_deref(), Some("because"));
        assert_eq!(feedback.link.as_deref(), Some("https://example.com/v"));
    }

    #[test]
    fn restart_resets_counters() {
        let mut session = QuizSession::new("Arrays", &questions(1)).unwrap();
        answer_current(&mut session, true);
        assert!(session.is_complete());
        session.restart();
        assert_eq!(session.state(), QuizState::AwaitingAnswer(0));
        assert_eq!(session.correct_count(), 0);
        assert!(session.completion().is_none());
    }

    #[test]
    fn completion_stays_pending_until_marked() {
        let mut session = QuizSession::new("Arrays", &questions(1)).unwrap();
        session.mark_recorded();
        assert!(!session.is_recorded());

        let done = answer_current(&mut session, true).unwrap();
        assert_eq!(session.pending_completion(), Some(done));
        session.mark_recorded();
        assert!(session.is_recorded());
        assert!(session.pending_completion().is_none());

        session.restart();
        assert!(!session.is_recorded());
    }

    fn finish_with(correct: usize, total: usize) -> QuizCompletion {
        let mut session = QuizSession::new("Graphs", &questions(total)).unwrap();
        let mut done = None;
        for i in 0..total {
            done = answer_current(&mut session, i < correct);
        }
        done.unwrap()
    }

    #[test]
    fn tiers_follow_score_bands() {
        assert_eq!(finish_with(7, 10).tier(), ScoreTier::PracticeMore);
        assert_eq!(finish_with(9, 10).tier(), ScoreTier::AdvancedReady);
        assert_eq!(finish_with(5, 10).tier(), ScoreTier::ReviewConcepts);
        assert_eq!(finish_with(6, 10).tier(), ScoreTier::PracticeMore);
        assert_eq!(finish_with(8, 10).tier(), ScoreTier::AdvancedReady);
    }

    #[test]
    fn progress_counts_submitted_question() {
        let mut session = QuizSession::new("Arrays", &questions(3)).unwrap();
        let answer = session.current_question().unwrap().answer().to_string();
        session.select_option(&answer).unwrap();
        session.submit().unwrap();
        let progress = session.progress();
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.correct, 1);
        assert!(!progress.is_complete);
    }
}
