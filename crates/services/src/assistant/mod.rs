//! Question answering backed by a language model, with an offline fallback.

mod model;
pub mod offline;
mod prompt;
mod retry;

use std::sync::Arc;

use storage::repository::HistoryRepository;
use study_core::model::{QaExchange, QuestionBank, UserId};

use crate::Clock;
use crate::error::AssistantError;

pub use model::{ChatCompletionsConfig, ChatCompletionsModel, LanguageModel};
pub use prompt::build_prompt;
pub use retry::RetryPolicy;

/// Number of exchanges returned by [`AssistantService::recent_history`].
pub const HISTORY_LIMIT: usize = 10;

/// Why the model could not answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    HighTraffic,
    QuotaReached,
    Unavailable,
}

impl FallbackReason {
    #[must_use]
    pub fn from_error(err: &AssistantError) -> Self {
        match err {
            AssistantError::Quota(_) => FallbackReason::QuotaReached,
            AssistantError::HttpStatus(status)
                if *status == reqwest::StatusCode::TOO_MANY_REQUESTS =>
            {
                FallbackReason::HighTraffic
            }
            _ => FallbackReason::Unavailable,
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            FallbackReason::HighTraffic => {
                "I'm experiencing high traffic at the moment. Please try again in a few minutes. \
                 In the meantime, you can work through the quiz topics."
            }
            FallbackReason::QuotaReached => {
                "We've reached our API limit for the moment. Please try again later. \
                 You can also review the tutorials and practice links for each topic."
            }
            FallbackReason::Unavailable => {
                "I'm having trouble processing your question right now. \
                 Please try rephrasing it or check the practice material for similar topics."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Model { attempts: u32 },
    Offline,
    Fallback(FallbackReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantReply {
    pub text: String,
    pub source: ReplySource,
}

/// Answers learner questions and keeps a per-user log of model answers.
#[derive(Clone)]
pub struct AssistantService {
    clock: Clock,
    model: Option<Arc<dyn LanguageModel>>,
    bank: Arc<QuestionBank>,
    history: Arc<dyn HistoryRepository>,
    retry: RetryPolicy,
}

impl AssistantService {
    #[must_use]
    pub fn new(
        clock: Clock,
        model: Option<Arc<dyn LanguageModel>>,
        bank: Arc<QuestionBank>,
        history: Arc<dyn HistoryRepository>,
    ) -> Self {
        Self {
            clock,
            model,
            bank,
            history,
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Whether answers come from a language model rather than the offline set.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.model.is_some()
    }

    /// Answer `question`. Model failures turn into a fallback message rather
    /// than an error.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::EmptyQuestion` for blank input. A history
    /// write failure is logged and the answer is still returned.
    pub async fn ask(
        &self,
        user: &UserId,
        question: &str,
    ) -> Result<AssistantReply, AssistantError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AssistantError::EmptyQuestion);
        }

        let Some(model) = &self.model else {
            let text = offline::explain(question).map_or_else(
                || offline::AVAILABLE_TOPICS.to_string(),
                |e| format!("# {}\n\n{}", e.title, e.body),
            );
            return Ok(AssistantReply {
                text,
                source: ReplySource::Offline,
            });
        };

        let prompt = build_prompt(question, &self.bank);
        let (result, attempts) = self.retry.run(|| model.ask(&prompt)).await;
        match result {
            Ok(answer) => {
                let exchange = QaExchange {
                    question: question.to_string(),
                    answer: answer.clone(),
                    timestamp: self.clock.now(),
                    attempts,
                };
                if let Err(err) = self.history.append_exchange(user, exchange).await {
                    tracing::warn!(user = %user, error = %err, "answer not added to history");
                }
                tracing::info!(user = %user, attempts, "assistant answered");
                Ok(AssistantReply {
                    text: answer,
                    source: ReplySource::Model { attempts },
                })
            }
            Err(err) => {
                let reason = FallbackReason::from_error(&err);
                tracing::warn!(user = %user, attempts, error = %err, "assistant unavailable");
                Ok(AssistantReply {
                    text: reason.message().to_string(),
                    source: ReplySource::Fallback(reason),
                })
            }
        }
    }

    /// Most recent model answers, newest first. An unreadable log reads as
    /// empty.
    pub async fn recent_history(&self, user: &UserId) -> Vec<QaExchange> {
        self.history
            .recent_exchanges(user, HISTORY_LIMIT)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!(user = %user, error = %err, "history unavailable");
                Vec::new()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use async_trait::async_trait;
    use reqwest::StatusCode;
    use storage::repository::{InMemoryRepository, StorageError};
    use study_core::time::fixed_clock;

    /// Replays scripted results, then keeps answering with the last one.
    struct ScriptedModel {
        script: Mutex<Vec<Result<String, AssistantError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn new(script: Vec<Result<String, AssistantError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn ask(&self, prompt: &str) -> Result<String, AssistantError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.remove(0)
            } else {
                match &script[0] {
                    Ok(text) => Ok(text.clone()),
                    Err(AssistantError::HttpStatus(s)) => Err(AssistantError::HttpStatus(*s)),
                    Err(AssistantError::Quota(q)) => Err(AssistantError::Quota(q.clone())),
                    Err(_) => Err(AssistantError::EmptyResponse),
                }
            }
        }
    }

    fn service(model: Option<Arc<dyn LanguageModel>>, repo: &InMemoryRepository) -> AssistantService {
        AssistantService::new(
            fixed_clock(),
            model,
            Arc::new(QuestionBank::new()),
            Arc::new(repo.clone()),
        )
        .with_retry_policy(RetryPolicy::immediate(3))
    }

    fn alice() -> UserId {
        UserId::new("alice").unwrap()
    }

    #[tokio::test]
    async fn retried_success_is_logged_with_attempts() {
        let repo = InMemoryRepository::new();
        let model = ScriptedModel::new(vec![
            Err(AssistantError::HttpStatus(StatusCode::SERVICE_UNAVAILABLE)),
            Ok("A stack is LIFO.".into()),
        ]);
        let reply = service(Some(model.clone()), &repo)
            .ask(&alice(), "What is a stack?")
            .await
            .unwrap();
        assert_eq!(reply.source, ReplySource::Model { attempts: 2 });

        let history = repo.recent_exchanges(&alice(), HISTORY_LIMIT).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].attempts, 2);
        assert_eq!(history[0].question, "What is a stack?");
    }

    #[tokio::test]
    async fn rate_limit_exhaustion_falls_back_after_three_attempts() {
        let repo = InMemoryRepository::new();
        let model = ScriptedModel::new(vec![Err(AssistantError::HttpStatus(
            StatusCode::TOO_MANY_REQUESTS,
        ))]);
        let reply = service(Some(model.clone()), &repo)
            .ask(&alice(), "What is a queue?")
            .await
            .unwrap();
        assert_eq!(reply.source, ReplySource::Fallback(FallbackReason::HighTraffic));
        assert!(reply.text.contains("high traffic"));
        assert_eq!(model.prompts.lock().unwrap().len(), 3);
        assert!(repo.recent_exchanges(&alice(), 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn quota_exhaustion_gets_its_own_message() {
        let repo = InMemoryRepository::new();
        let model = ScriptedModel::new(vec![Err(AssistantError::Quota("insufficient_quota".into()))]);
        let reply = service(Some(model.clone()), &repo)
            .ask(&alice(), "What is a trie?")
            .await
            .unwrap();
        assert_eq!(reply.source, ReplySource::Fallback(FallbackReason::QuotaReached));
        assert!(reply.text.contains("API limit"));
        assert_eq!(model.prompts.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn offline_mode_uses_builtin_explanations() {
        let repo = InMemoryRepository::new();
        let svc = service(None, &repo);
        assert!(!svc.enabled());

        let reply = svc.ask(&alice(), "What is memoization in DP?").await.unwrap();
        assert_eq!(reply.source, ReplySource::Offline);
        assert!(reply.text.starts_with("# Memoization"));

        let reply = svc.ask(&alice(), "What is a heap?").await.unwrap();
        assert_eq!(reply.text, offline::AVAILABLE_TOPICS);
    }

    struct BrokenHistory;

    #[async_trait]
    impl HistoryRepository for BrokenHistory {
        async fn append_exchange(
            &self,
            _user: &UserId,
            _exchange: QaExchange,
        ) -> Result<(), StorageError> {
            Err(StorageError::Connection("read-only disk".into()))
        }

        async fn recent_exchanges(
            &self,
            _user: &UserId,
            _limit: usize,
        ) -> Result<Vec<QaExchange>, StorageError> {
            Err(StorageError::Connection("read-only disk".into()))
        }
    }

    #[tokio::test]
    async fn history_failures_do_not_hide_answers() {
        let model = ScriptedModel::new(vec![Ok("A heap is a tree.".into())]);
        let svc = AssistantService::new(
            fixed_clock(),
            Some(model),
            Arc::new(QuestionBank::new()),
            Arc::new(BrokenHistory),
        )
        .with_retry_policy(RetryPolicy::immediate(3));

        let reply = svc.ask(&alice(), "What is a heap?").await.unwrap();
        assert_eq!(reply.text, "A heap is a tree.");
        assert_eq!(reply.source, ReplySource::Model { attempts: 1 });
        assert!(svc.recent_history(&alice()).await.is_empty());
    }

    #[tokio::test]
    async fn blank_question_is_rejected() {
        let repo = InMemoryRepository::new();
        let err = service(None, &repo).ask(&alice(), "   ").await.unwrap_err();
        assert!(matches!(err, AssistantError::EmptyQuestion));
    }
}
