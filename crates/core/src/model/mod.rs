mod account;
mod bank;
mod history;
mod ids;
mod plan;
mod progress;
mod question;
mod schedule;

pub use account::{AccountError, AuthUser, SignUpRequest, validate_email, validate_password};
pub use bank::{BankError, PracticeLink, QuestionBank, TopicMaterial, Tutorial};
pub use history::{QaExchange, most_recent};
pub use ids::{ParseIdError, TaskId, UserId};
pub use plan::{PlanResource, PlanTopic, PlanWeek, StudyPlan};
pub use progress::{DayProgress, ProgressError, ProgressLog};
pub use question::{Question, QuestionError};
pub use schedule::{Schedule, ScheduleError, ScheduleTask};
