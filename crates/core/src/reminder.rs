use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::model::{Schedule, ScheduleTask, TaskId};

/// A task whose reminder time has passed today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderDue {
    pub task_id: TaskId,
    pub description: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl ReminderDue {
    fn from_task(task: &ScheduleTask) -> Self {
        Self {
            task_id: task.id(),
            description: task.description().to_string(),
            date: task.date(),
            time: task.time(),
        }
    }

    #[must_use]
    pub fn subject(&self) -> &'static str {
        "Study Reminder"
    }

    #[must_use]
    pub fn body(&self) -> String {
        format!(
            "Reminder: {} is scheduled today at {}",
            self.description,
            self.time.format("%H:%M")
        )
    }
}

/// Mark every task due today at or before `now` as reminded.
///
/// Returns one event per task flipped on this pass, in stored order. Tasks on
/// other days, or already reminded, are left alone.
pub fn scan(schedule: &mut Schedule, now: NaiveDateTime) -> Vec<ReminderDue> {
    let today = now.date();
    let time_of_day = now.time();
    schedule
        .tasks_mut()
        .iter_mut()
        .filter(|task| !task.reminded() && task.date() == today && time_of_day >= task.time())
        .filter_map(|task| {
            if task.mark_reminded() {
                Some(ReminderDue::from_task(task))
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(date: &str, time: &str, description: &str) -> ScheduleTask {
        ScheduleTask::new(description, date.parse().unwrap(), time.parse().unwrap()).unwrap()
    }

    fn at(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn fires_for_every_qualifying_task() {
        let mut schedule = Schedule::new();
        schedule.add(task("2024-01-05", "09:00:00", "arrays"));
        schedule.add(task("2024-01-05", "10:00:00", "graphs"));
        schedule.add(task("2024-01-05", "18:00:00", "later"));
        schedule.add(task("2024-01-04", "08:00:00", "yesterday"));

        let due = scan(&mut schedule, at("2024-01-05 10:00:00"));
        let names: Vec<_> = due.iter().map(|d| d.description.as_str()).collect();
        assert_eq!(names, ["arrays", "graphs"]);
        assert!(!schedule.tasks()[2].reminded());
        assert!(!schedule.tasks()[3].reminded());
    }

    #[test]
    fn does_not_refire_the_same_day() {
        let mut schedule = Schedule::new();
        schedule.add(task("2024-01-05", "09:00:00", "arrays"));
        assert_eq!(scan(&mut schedule, at("2024-01-05 09:30:00")).len(), 1);
        assert!(scan(&mut schedule, at("2024-01-05 11:00:00")).is_empty());
        assert!(schedule.tasks()[0].reminded());
    }

    #[test]
    fn body_mentions_task_and_time() {
        let mut schedule = Schedule::new();
        schedule.add(task("2024-01-05", "09:00:00", "Heaps"));
        let due = scan(&mut schedule, at("2024-01-05 09:00:00"));
        assert_eq!(due[0].body(), "Reminder: Heaps is scheduled today at 09:00");
    }
}
