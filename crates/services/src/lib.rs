#![forbid(unsafe_code)]

pub mod app_services;
pub mod assistant;
pub mod auth;
pub mod config;
pub mod error;
pub mod notify;
pub mod plan_service;
pub mod progress_service;
pub mod quiz_service;
pub mod schedule_service;

pub use study_core::Clock;

pub use app_services::AppServices;
pub use assistant::{AssistantReply, AssistantService, FallbackReason, ReplySource, RetryPolicy};
pub use auth::{AuthProvider, AuthService, LocalAuthProvider};
pub use config::ServicesConfig;
pub use error::{
    AppServicesError, AssistantError, AuthError, NotifyError, ProgressServiceError,
    QuizServiceError, ScheduleServiceError,
};
pub use notify::{LogNotifier, Notifier, WebhookNotifier};
pub use plan_service::StudyPlanService;
pub use progress_service::{ProgressService, Recommendation};
pub use quiz_service::QuizService;
pub use schedule_service::{Delivery, ReminderSent, ScheduleService, TaskAdded};
