use std::path::Path;

use chrono::NaiveDateTime;
use study_core::model::{Schedule, ScheduleTask, TaskId, UserId};
use study_core::reminder::{self, ReminderDue};

use super::{JsonRepository, OnCorrupt, read_json, write_json};
use crate::repository::{ScheduleRepository, StorageError};

/// Read a schedule file under its lock. Tasks stored without an id get one
/// generated and written back so that later reads agree on it.
async fn read_schedule(path: &Path) -> Result<Schedule, StorageError> {
    let raw: serde_json::Value = read_json(path, OnCorrupt::Default).await?;
    if raw.is_null() {
        return Ok(Schedule::default());
    }
    let missing_ids = raw
        .get("tasks")
        .and_then(serde_json::Value::as_array)
        .is_some_and(|tasks| tasks.iter().any(|task| task.get("id").is_none()));
    let schedule: Schedule = match serde_json::from_value(raw) {
        Ok(schedule) => schedule,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt data file");
            return Ok(Schedule::default());
        }
    };
    if missing_ids {
        match write_json(path, &schedule).await {
            Ok(()) => tracing::info!(path = %path.display(), "assigned ids to stored tasks"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not save task ids"),
        }
    }
    Ok(schedule)
}

#[async_trait::async_trait]
impl ScheduleRepository for JsonRepository {
    async fn load_schedule(&self, user: &UserId) -> Result<Schedule, StorageError> {
        let path = self.user_file("schedules", user, "schedule");
        let _guard = self.locks.lock(&path).await;
        read_schedule(&path).await
    }

    async fn add_task(&self, user: &UserId, task: ScheduleTask) -> Result<(), StorageError> {
        let path = self.user_file("schedules", user, "schedule");
        let _guard = self.locks.lock(&path).await;
        let mut schedule = read_schedule(&path).await?;
        tracing::info!(%user, task = %task.id(), "task scheduled");
        schedule.add(task);
        write_json(&path, &schedule).await
    }

    async fn remove_task(&self, user: &UserId, id: TaskId) -> Result<ScheduleTask, StorageError> {
        let path = self.user_file("schedules", user, "schedule");
        let _guard = self.locks.lock(&path).await;
        let mut schedule = read_schedule(&path).await?;
        let removed = schedule.remove(id)?;
        write_json(&path, &schedule).await?;
        Ok(removed)
    }

    async fn mark_due_reminders(
        &self,
        user: &UserId,
        now: NaiveDateTime,
    ) -> Result<Vec<ReminderDue>, StorageError> {
        let path = self.user_file("schedules", user, "schedule");
        let _guard = self.locks.lock(&path).await;
        let mut schedule = read_schedule(&path).await?;
        let due = reminder::scan(&mut schedule, now);
        if !due.is_empty() {
            write_json(&path, &schedule).await?;
        }
        Ok(due)
    }
}
