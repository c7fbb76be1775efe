//! Shared error types for the services crate.

use thiserror::Error;

use storage::bank::ContentError;
use storage::json::JsonInitError;
use storage::repository::StorageError;
use study_core::model::AccountError;
use study_core::quiz::QuizError;

/// Errors emitted by a `LanguageModel` and by `AssistantService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssistantError {
    #[error("assistant is not configured")]
    Disabled,
    #[error("assistant returned an empty response")]
    EmptyResponse,
    #[error("assistant request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("assistant quota exhausted: {0}")]
    Quota(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("question is empty")]
    EmptyQuestion,
}

impl AssistantError {
    /// Whether another attempt could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            AssistantError::HttpStatus(status) => {
                *status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            AssistantError::Quota(_) | AssistantError::Http(_) | AssistantError::EmptyResponse => {
                true
            }
            _ => false,
        }
    }
}

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error("unknown topic: {0}")]
    UnknownTopic(String),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ScheduleService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScheduleServiceError {
    #[error(transparent)]
    Schedule(#[from] study_core::model::ScheduleError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by a `Notifier`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NotifyError {
    #[error("notification rejected with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by an `AuthProvider` and `AuthService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error(transparent)]
    Input(#[from] AccountError),
    #[error("Username or email already registered.")]
    AlreadyRegistered,
    #[error("Invalid username or password.")]
    InvalidCredentials,
    #[error("No account found for {0}.")]
    UnknownAccount(String),
    #[error("{0} sign-in is not supported by this provider.")]
    Unsupported(String),
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict => AuthError::AlreadyRegistered,
            other => AuthError::Storage(other),
        }
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Json(#[from] JsonInitError),
    #[error(transparent)]
    Content(#[from] ContentError),
}
