use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use study_core::model::{
    ProgressError, ProgressLog, QaExchange, Schedule, ScheduleError, ScheduleTask, TaskId, UserId,
    most_recent,
};
use study_core::reminder::{self, ReminderDue};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Progress(#[from] ProgressError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// Persisted shape of a local account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: UserId,
    pub email: String,
    /// Hex-encoded SHA-256 of the password.
    pub password_hash: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub verified: bool,
}

/// Per-user progress counters.
///
/// Implementations treat a missing or unreadable record as empty progress.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Load the user's full progress log.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for backend failures; absent or corrupt data
    /// yields an empty log.
    async fn load_progress(&self, user: &UserId) -> Result<ProgressLog, StorageError>;

    /// Add `amount` to `topic` on `date` and persist. Returns the new count.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Progress` for a negative amount, or other
    /// storage errors if the write fails.
    async fn increment_progress(
        &self,
        user: &UserId,
        date: NaiveDate,
        topic: &str,
        amount: i64,
    ) -> Result<u32, StorageError>;
}

/// Per-user scheduled tasks.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// Load the user's schedule; absent or corrupt data yields an empty schedule.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn load_schedule(&self, user: &UserId) -> Result<Schedule, StorageError>;

    /// Append a task.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the schedule cannot be stored.
    async fn add_task(&self, user: &UserId, task: ScheduleTask) -> Result<(), StorageError>;

    /// Delete a task by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Schedule` if the task does not exist.
    async fn remove_task(&self, user: &UserId, id: TaskId) -> Result<ScheduleTask, StorageError>;

    /// Flip and persist every reminder due at `now`, returning the flipped tasks.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the updated schedule cannot be stored.
    async fn mark_due_reminders(
        &self,
        user: &UserId,
        now: NaiveDateTime,
    ) -> Result<Vec<ReminderDue>, StorageError>;
}

/// Per-user log of assistant exchanges.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Append one exchange.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the log cannot be stored.
    async fn append_exchange(&self, user: &UserId, exchange: QaExchange)
    -> Result<(), StorageError>;

    /// Newest-first list of at most `limit` exchanges.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn recent_exchanges(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<QaExchange>, StorageError>;
}

/// Local account records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn get_user(&self, username: &UserId) -> Result<Option<UserRecord>, StorageError>;

    /// Fetch a user by e-mail, compared case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StorageError>;

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the username or e-mail is taken.
    async fn insert_user(&self, record: UserRecord) -> Result<(), StorageError>;
}

pub(crate) fn identity_taken(users: &[UserRecord], record: &UserRecord) -> bool {
    users.iter().any(|u| {
        u.username == record.username || u.email.eq_ignore_ascii_case(&record.email)
    })
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    progress: Arc<Mutex<HashMap<UserId, ProgressLog>>>,
    schedules: Arc<Mutex<HashMap<UserId, Schedule>>>,
    history: Arc<Mutex<HashMap<UserId, Vec<QaExchange>>>>,
    users: Arc<Mutex<Vec<UserRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load_progress(&self, user: &UserId) -> Result<ProgressLog, StorageError> {
        let guard = self.progress.lock().map_err(poisoned)?;
        Ok(guard.get(user).cloned().unwrap_or_default())
    }

    async fn increment_progress(
        &self,
        user: &UserId,
        date: NaiveDate,
        topic: &str,
        amount: i64,
    ) -> Result<u32, StorageError> {
        let mut guard = self.progress.lock().map_err(poisoned)?;
        let log = guard.entry(user.clone()).or_default();
        Ok(log.increment(date, topic, amount)?)
    }
}

#[async_trait]
impl ScheduleRepository for InMemoryRepository {
    async fn load_schedule(&self, user: &UserId) -> Result<Schedule, StorageError> {
        let guard = self.schedules.lock().map_err(poisoned)?;
        Ok(guard.get(user).cloned().unwrap_or_default())
    }

    async fn add_task(&self, user: &UserId, task: ScheduleTask) -> Result<(), StorageError> {
        let mut guard = self.schedules.lock().map_err(poisoned)?;
        guard.entry(user.clone()).or_default().add(task);
        Ok(())
    }

    async fn remove_task(&self, user: &UserId, id: TaskId) -> Result<ScheduleTask, StorageError> {
        let mut guard = self.schedules.lock().map_err(poisoned)?;
        Ok(guard.entry(user.clone()).or_default().remove(id)?)
    }

    async fn mark_due_reminders(
        &self,
        user: &UserId,
        now: NaiveDateTime,
    ) -> Result<Vec<ReminderDue>, StorageError> {
        let mut guard = self.schedules.lock().map_err(poisoned)?;
        Ok(guard
            .get_mut(user)
            .map(|schedule| reminder::scan(schedule, now))
            .unwrap_or_default())
    }
}

#[async_trait]
impl HistoryRepository for InMemoryRepository {
    async fn append_exchange(
        &self,
        user: &UserId,
        exchange: QaExchange,
    ) -> Result<(), StorageError> {
        let mut guard = self.history.lock().map_err(poisoned)?;
        guard.entry(user.clone()).or_default().push(exchange);
        Ok(())
    }

    async fn recent_exchanges(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<QaExchange>, StorageError> {
        let guard = self.history.lock().map_err(poisoned)?;
        Ok(guard
            .get(user)
            .map(|all| most_recent(all, limit))
            .unwrap_or_default())
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn get_user(&self, username: &UserId) -> Result<Option<UserRecord>, StorageError> {
        let guard = self.users.lock().map_err(poisoned)?;
        Ok(guard.iter().find(|u| &u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StorageError> {
        let guard = self.users.lock().map_err(poisoned)?;
        Ok(guard
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()))
            .cloned())
    }

    async fn insert_user(&self, record: UserRecord) -> Result<(), StorageError> {
        let mut guard = self.users.lock().map_err(poisoned)?;
        if identity_taken(&guard, &record) {
            return Err(StorageError::Conflict);
        }
        guard.push(record);
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub schedules: Arc<dyn ScheduleRepository>,
    pub history: Arc<dyn HistoryRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            progress: Arc::new(repo.clone()),
            schedules: Arc::new(repo.clone()),
            history: Arc::new(repo.clone()),
            users: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use study_core::time::fixed_clock;

    fn user(name: &str) -> UserId {
        UserId::new(name).unwrap()
    }

    #[tokio::test]
    async fn progress_is_isolated_per_user() {
        let repo = InMemoryRepository::new();
        let today = fixed_clock().today();
        repo.increment_progress(&user("alice"), today, "arrays", 3)
            .await
            .unwrap();
        let count = repo
            .increment_progress(&user("alice"), today, "arrays", 3)
            .await
            .unwrap();
        assert_eq!(count, 6);
        assert!(repo.load_progress(&user("bob")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn negative_increment_surfaces_validation_error() {
        let repo = InMemoryRepository::new();
        let err = repo
            .increment_progress(&user("alice"), fixed_clock().today(), "arrays", -2)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Progress(ProgressError::NegativeIncrement { .. })));
    }

    #[tokio::test]
    async fn duplicate_users_conflict() {
        let repo = InMemoryRepository::new();
        let record = UserRecord {
            username: user("alice"),
            email: "alice@example.com".into(),
            password_hash: "x".into(),
            display_name: None,
            verified: true,
        };
        repo.insert_user(record.clone()).await.unwrap();
        let mut other = record.clone();
        other.username = user("alice2");
        other.email = "ALICE@example.com".into();
        assert!(matches!(repo.insert_user(other).await, Err(StorageError::Conflict)));
        assert!(repo.find_by_email("Alice@Example.com").await.unwrap().is_some());
    }
}
