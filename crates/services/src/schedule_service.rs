use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use storage::repository::{ScheduleRepository, UserRepository};
use study_core::model::{ScheduleTask, TaskId, UserId};
use study_core::reminder::ReminderDue;

use crate::Clock;
use crate::error::ScheduleServiceError;
use crate::notify::Notifier;

/// Whether a notification reached its recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Failed(String),
}

impl Delivery {
    #[must_use]
    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent)
    }
}

#[derive(Debug, Clone)]
pub struct TaskAdded {
    pub task: ScheduleTask,
    pub delivery: Delivery,
}

#[derive(Debug, Clone)]
pub struct ReminderSent {
    pub reminder: ReminderDue,
    pub delivery: Delivery,
}

/// Study task scheduling with reminder notifications.
///
/// Reminders are checked on demand; there is no background timer.
#[derive(Clone)]
pub struct ScheduleService {
    clock: Clock,
    schedules: Arc<dyn ScheduleRepository>,
    users: Arc<dyn UserRepository>,
    notifier: Arc<dyn Notifier>,
}

impl ScheduleService {
    #[must_use]
    pub fn new(
        clock: Clock,
        schedules: Arc<dyn ScheduleRepository>,
        users: Arc<dyn UserRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            clock,
            schedules,
            users,
            notifier,
        }
    }

    /// Validate and store a task, then announce it.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleServiceError::Schedule` for an empty description, or
    /// `ScheduleServiceError::Storage` if the task cannot be stored. A failed
    /// notification is reported in the result instead.
    pub async fn add_task(
        &self,
        user: &UserId,
        description: &str,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<TaskAdded, ScheduleServiceError> {
        let task = ScheduleTask::new(description, date, time)?;
        self.schedules.add_task(user, task.clone()).await?;

        let body = format!(
            "New task: {} on {} at {}",
            task.description(),
            task.date(),
            task.time().format("%H:%M")
        );
        let delivery = self.notify(user, "Study Reminder Added", &body).await;
        Ok(TaskAdded { task, delivery })
    }

    /// # Errors
    ///
    /// Returns `ScheduleServiceError::Storage` if the id is unknown or the
    /// schedule cannot be stored.
    pub async fn remove_task(
        &self,
        user: &UserId,
        id: TaskId,
    ) -> Result<ScheduleTask, ScheduleServiceError> {
        let removed = self.schedules.remove_task(user, id).await?;
        tracing::info!(user = %user, task = %id, "task removed");
        Ok(removed)
    }

    /// Tasks ordered by date, then time.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleServiceError::Storage` if the schedule cannot be loaded.
    pub async fn list_tasks(&self, user: &UserId) -> Result<Vec<ScheduleTask>, ScheduleServiceError> {
        let schedule = self.schedules.load_schedule(user).await?;
        Ok(schedule.sorted().into_iter().cloned().collect())
    }

    /// Mark every due task as reminded and notify the user about each.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleServiceError::Storage` if the flags cannot be stored.
    pub async fn check_reminders(
        &self,
        user: &UserId,
    ) -> Result<Vec<ReminderSent>, ScheduleServiceError> {
        let now = self.clock.now_local();
        let due = self.schedules.mark_due_reminders(user, now).await?;
        let mut sent = Vec::with_capacity(due.len());
        for reminder in due {
            let delivery = self
                .notify(user, reminder.subject(), &reminder.body())
                .await;
            sent.push(ReminderSent { reminder, delivery });
        }
        Ok(sent)
    }

    async fn notify(&self, user: &UserId, subject: &str, body: &str) -> Delivery {
        let recipient = self.recipient(user).await;
        match self.notifier.send(subject, body, &recipient).await {
            Ok(()) => Delivery::Sent,
            Err(err) => {
                tracing::warn!(user = %user, error = %err, "notification failed");
                Delivery::Failed(err.to_string())
            }
        }
    }

    async fn recipient(&self, user: &UserId) -> String {
        match self.users.get_user(user).await {
            Ok(Some(record)) => record.email,
            Ok(None) => user.to_string(),
            Err(err) => {
                tracing::warn!(user = %user, error = %err, "cannot resolve recipient");
                user.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use async_trait::async_trait;
    use storage::repository::{InMemoryRepository, UserRecord};
    use study_core::time::fixed_clock;

    use crate::error::NotifyError;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, subject: &str, body: &str, recipient: &str) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::HttpStatus(reqwest::StatusCode::BAD_GATEWAY));
            }
            self.sent
                .lock()
                .unwrap()
                .push((subject.into(), body.into(), recipient.into()));
            Ok(())
        }
    }

    fn alice() -> UserId {
        UserId::new("alice").unwrap()
    }

    async fn service(notifier: Arc<RecordingNotifier>) -> (ScheduleService, InMemoryRepository) {
        let repo = InMemoryRepository::new();
        repo.insert_user(UserRecord {
            username: alice(),
            email: "alice@example.com".into(),
            password_hash: String::new(),
            display_name: None,
            verified: true,
        })
        .await
        .unwrap();
        let service = ScheduleService::new(
            fixed_clock(),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            notifier,
        );
        (service, repo)
    }

    #[tokio::test]
    async fn adding_announces_to_the_account_email() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (service, _) = service(notifier.clone()).await;
        let today = fixed_clock().today();
        let added = service
            .add_task(&alice(), "Graphs", today, NaiveTime::from_hms_opt(8, 0, 0).unwrap())
            .await
            .unwrap();
        assert!(added.delivery.is_sent());

        let sent = notifier.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "Study Reminder Added");
        assert_eq!(sent[0].2, "alice@example.com");
    }

    #[tokio::test]
    async fn empty_description_is_rejected() {
        let (service, _) = service(Arc::new(RecordingNotifier::default())).await;
        let err = service
            .add_task(&alice(), "  ", fixed_clock().today(), NaiveTime::MIN)
            .await
            .unwrap_err();
        assert!(matches!(err, ScheduleServiceError::Schedule(_)));
    }

    #[tokio::test]
    async fn due_reminders_fire_once_even_when_delivery_fails() {
        let notifier = Arc::new(RecordingNotifier {
            fail: true,
            ..RecordingNotifier::default()
        });
        let (service, _) = service(notifier).await;
        let today = fixed_clock().today();
        service
            .add_task(&alice(), "Arrays", today, NaiveTime::MIN)
            .await
            .unwrap();
        service
            .add_task(&alice(), "Tomorrow", today.succ_opt().unwrap(), NaiveTime::MIN)
            .await
            .unwrap();

        let first = service.check_reminders(&alice()).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].reminder.description, "Arrays");
        assert!(!first[0].delivery.is_sent());

        assert!(service.check_reminders(&alice()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_is_sorted_and_remove_deletes() {
        let (service, _) = service(Arc::new(RecordingNotifier::default())).await;
        let today = fixed_clock().today();
        let late = service
            .add_task(&alice(), "Late", today, NaiveTime::from_hms_opt(20, 0, 0).unwrap())
            .await
            .unwrap();
        service
            .add_task(&alice(), "Early", today, NaiveTime::from_hms_opt(7, 0, 0).unwrap())
            .await
            .unwrap();

        let listed = service.list_tasks(&alice()).await.unwrap();
        let names: Vec<_> = listed.iter().map(ScheduleTask::description).collect();
        assert_eq!(names, ["Early", "Late"]);

        service.remove_task(&alice(), late.task.id()).await.unwrap();
        assert_eq!(service.list_tasks(&alice()).await.unwrap().len(), 1);
    }
}
