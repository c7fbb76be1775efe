use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::TaskId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScheduleError {
    #[error("task description cannot be empty")]
    EmptyDescription,

    #[error("task {0} not found")]
    TaskNotFound(TaskId),
}

/// A user-created study task with a one-shot reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTask {
    #[serde(default = "TaskId::generate")]
    id: TaskId,
    #[serde(rename = "task")]
    description: String,
    date: NaiveDate,
    time: NaiveTime,
    #[serde(default)]
    reminded: bool,
}

impl ScheduleTask {
    /// Create a task that has not been reminded yet.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleError::EmptyDescription` if the description is blank.
    pub fn new(
        description: impl Into<String>,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<Self, ScheduleError> {
        let description = description.into();
        let trimmed = description.trim();
        if trimmed.is_empty() {
            return Err(ScheduleError::EmptyDescription);
        }
        Ok(Self {
            id: TaskId::generate(),
            description: trimmed.to_string(),
            date,
            time,
            reminded: false,
        })
    }

    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn time(&self) -> NaiveTime {
        self.time
    }

    #[must_use]
    pub fn due_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    #[must_use]
    pub fn reminded(&self) -> bool {
        self.reminded
    }

    /// Flip the reminder flag. Returns `false` if it was already set.
    pub fn mark_reminded(&mut self) -> bool {
        if self.reminded {
            return false;
        }
        self.reminded = true;
        true
    }
}

/// All scheduled tasks of one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    tasks: Vec<ScheduleTask>,
}

impl Schedule {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, task: ScheduleTask) {
        self.tasks.push(task);
    }

    /// Remove a task by id.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleError::TaskNotFound` if no task has that id.
    pub fn remove(&mut self, id: TaskId) -> Result<ScheduleTask, ScheduleError> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(ScheduleError::TaskNotFound(id))?;
        Ok(self.tasks.remove(index))
    }

    #[must_use]
    pub fn tasks(&self) -> &[ScheduleTask] {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut [ScheduleTask] {
        &mut self.tasks
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks ordered by (date, time) for display.
    #[must_use]
    pub fn sorted(&self) -> Vec<&ScheduleTask> {
        let mut sorted: Vec<&ScheduleTask> = self.tasks.iter().collect();
        sorted.sort_by_key(|t| (t.date, t.time));
        sorted
    }
}
