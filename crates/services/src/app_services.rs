use std::sync::Arc;

use storage::bank::{load_question_bank, load_study_plan};
use storage::repository::Storage;
use study_core::model::{QuestionBank, StudyPlan};

use crate::Clock;
use crate::assistant::{AssistantService, ChatCompletionsModel, LanguageModel};
use crate::auth::{AuthService, LocalAuthProvider};
use crate::config::ServicesConfig;
use crate::error::AppServicesError;
use crate::notify::{Notifier, notifier_from_env};
use crate::plan_service::StudyPlanService;
use crate::progress_service::ProgressService;
use crate::quiz_service::QuizService;
use crate::schedule_service::ScheduleService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    quiz: Arc<QuizService>,
    progress: Arc<ProgressService>,
    schedule: Arc<ScheduleService>,
    assistant: Arc<AssistantService>,
    auth: Arc<AuthService>,
    plan: Arc<StudyPlanService>,
}

impl AppServices {
    /// Build services backed by JSON files, with the model and notifier
    /// taken from the environment.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the data directory cannot be prepared or
    /// the content files cannot be loaded.
    pub async fn open(config: &ServicesConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::json(&config.data_dir).await?;
        let bank = load_question_bank(&config.questions_path).await?;
        let plan = load_study_plan(&config.plan_path).await?;
        let model = ChatCompletionsModel::from_env()
            .map(|model| Arc::new(model) as Arc<dyn LanguageModel>);
        if model.is_none() {
            tracing::info!("no model configured; assistant answers offline");
        }
        tracing::info!(
            data_dir = %config.data_dir.display(),
            topics = bank.len(),
            "services ready"
        );
        Ok(Self::new(
            &storage,
            clock,
            Arc::new(bank),
            Arc::new(plan),
            model,
            notifier_from_env(),
        ))
    }

    #[must_use]
    pub fn new(
        storage: &Storage,
        clock: Clock,
        bank: Arc<QuestionBank>,
        plan: Arc<StudyPlan>,
        model: Option<Arc<dyn LanguageModel>>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let quiz = Arc::new(QuizService::new(
            clock,
            Arc::clone(&bank),
            Arc::clone(&storage.progress),
        ));
        let progress = Arc::new(ProgressService::new(
            clock,
            Arc::clone(&bank),
            Arc::clone(&storage.progress),
        ));
        let schedule = Arc::new(ScheduleService::new(
            clock,
            Arc::clone(&storage.schedules),
            Arc::clone(&storage.users),
            notifier,
        ));
        let assistant = Arc::new(AssistantService::new(
            clock,
            model,
            bank,
            Arc::clone(&storage.history),
        ));
        let auth = Arc::new(AuthService::new(Arc::new(LocalAuthProvider::new(
            Arc::clone(&storage.users),
        ))));
        let plan = Arc::new(StudyPlanService::new(plan));

        Self {
            quiz,
            progress,
            schedule,
            assistant,
            auth,
            plan,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn schedule(&self) -> Arc<ScheduleService> {
        Arc::clone(&self.schedule)
    }

    #[must_use]
    pub fn assistant(&self) -> Arc<AssistantService> {
        Arc::clone(&self.assistant)
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }

    #[must_use]
    pub fn plan(&self) -> Arc<StudyPlanService> {
        Arc::clone(&self.plan)
    }
}
