use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("question must offer at least two options, got {count}")]
    TooFewOptions { count: usize },

    #[error("answer {answer:?} must match exactly one option, matched {matches}")]
    AnswerMismatch { answer: String, matches: usize },

    #[error("invalid link {link:?}")]
    InvalidLink { link: String },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single multiple-choice quiz question.
///
/// Optional keys in the bank file map to `None`; absence is distinct from an
/// empty value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    text: String,
    options: Vec<String>,
    answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    explanation: Option<String>,
    #[serde(default, rename = "video_solution", skip_serializing_if = "Option::is_none")]
    link: Option<String>,
}

impl Question {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text is empty, fewer than two options are
    /// given, or the answer does not match exactly one option.
    pub fn new(
        text: impl Into<String>,
        options: Vec<String>,
        answer: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let question = Self {
            text: text.into(),
            options,
            answer: answer.into(),
            hint: None,
            explanation: None,
            link: None,
        };
        question.validate()?;
        Ok(question)
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Attach an external solution link.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::InvalidLink` if the link is not an absolute URL.
    pub fn with_link(mut self, link: impl Into<String>) -> Result<Self, QuestionError> {
        let link = link.into();
        check_link(&link)?;
        self.link = Some(link);
        Ok(self)
    }

    /// Check the invariants of a deserialized question.
    ///
    /// # Errors
    ///
    /// Returns the first violated `QuestionError`.
    pub fn validate(&self) -> Result<(), QuestionError> {
        if self.text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if self.options.len() < 2 {
            return Err(QuestionError::TooFewOptions {
                count: self.options.len(),
            });
        }
        let matches = self.options.iter().filter(|o| **o == self.answer).count();
        if matches != 1 {
            return Err(QuestionError::AnswerMismatch {
                answer: self.answer.clone(),
                matches,
            });
        }
        if let Some(link) = &self.link {
            check_link(link)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    #[must_use]
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    #[must_use]
    pub fn is_correct(&self, choice: &str) -> bool {
        self.answer == choice
    }
}

pub(crate) fn check_link(link: &str) -> Result<(), QuestionError> {
    Url::parse(link)
        .map(|_| ())
        .map_err(|_| QuestionError::InvalidLink {
            link: link.to_string(),
        })
}
