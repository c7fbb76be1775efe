use std::sync::Arc;

use storage::repository::ProgressRepository;
use study_core::analytics::ProgressOverview;
use study_core::model::{DayProgress, PracticeLink, QuestionBank, TopicMaterial, Tutorial, UserId};

use crate::Clock;
use crate::error::ProgressServiceError;

/// Learning material suggested for the topic practiced least.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub topic: String,
    pub tutorials: Vec<Tutorial>,
    pub practice_links: Vec<PracticeLink>,
}

/// Dashboard figures derived from a user's progress log.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    bank: Arc<QuestionBank>,
    progress: Arc<dyn ProgressRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(clock: Clock, bank: Arc<QuestionBank>, progress: Arc<dyn ProgressRepository>) -> Self {
        Self {
            clock,
            bank,
            progress,
        }
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the log cannot be loaded.
    pub async fn overview(&self, user: &UserId) -> Result<ProgressOverview, ProgressServiceError> {
        let log = self.progress.load_progress(user).await?;
        Ok(ProgressOverview::from_log(&log))
    }

    /// Per-topic counts recorded today.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the log cannot be loaded.
    pub async fn today(&self, user: &UserId) -> Result<DayProgress, ProgressServiceError> {
        let log = self.progress.load_progress(user).await?;
        Ok(log.day(self.clock.today()).cloned().unwrap_or_default())
    }

    /// Resources for the least-practiced topic, if the bank has any for it.
    #[must_use]
    pub fn recommend(&self, overview: &ProgressOverview) -> Option<Recommendation> {
        let topic = overview.least_practiced.as_deref()?;
        let (name, material) = self.lookup(topic)?;
        if material.tutorials.is_empty() && material.practice_links.is_empty() {
            return None;
        }
        Some(Recommendation {
            topic: name.to_string(),
            tutorials: material.tutorials.clone(),
            practice_links: material.practice_links.clone(),
        })
    }

    fn lookup(&self, topic: &str) -> Option<(&str, &TopicMaterial)> {
        let name = self
            .bank
            .topic_names()
            .find(|name| *name == topic)
            .or_else(|| {
                self.bank
                    .topic_names()
                    .find(|name| name.eq_ignore_ascii_case(topic))
            })?;
        self.bank.topic(name).map(|material| (name, material))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use storage::repository::InMemoryRepository;
    use study_core::model::Question;
    use study_core::time::fixed_clock;

    fn bank() -> Arc<QuestionBank> {
        let q = || Question::new("q", vec!["a".into(), "b".into()], "a").unwrap();
        let mut bank = QuestionBank::new();
        let mut graphs = TopicMaterial::new(vec![q()]);
        graphs.tutorials.push(Tutorial {
            title: "Graph basics".into(),
            url: "https://example.com/graphs".into(),
            creator: None,
            duration: None,
        });
        bank.insert("Graphs", graphs);
        bank.insert("Arrays", TopicMaterial::new(vec![q()]));
        Arc::new(bank)
    }

    #[tokio::test]
    async fn overview_and_recommendation_follow_least_practiced() {
        let repo = Arc::new(InMemoryRepository::new());
        let clock = fixed_clock();
        let user = UserId::new("alice").unwrap();
        repo.increment_progress(&user, clock.today(), "Arrays", 4)
            .await
            .unwrap();
        repo.increment_progress(&user, clock.today(), "Graphs", 1)
            .await
            .unwrap();

        let service = ProgressService::new(clock, bank(), repo);
        let overview = service.overview(&user).await.unwrap();
        assert_eq!(overview.total_questions, 5);
        assert_eq!(overview.current_streak, 1);

        let rec = service.recommend(&overview).unwrap();
        assert_eq!(rec.topic, "Graphs");
        assert_eq!(rec.tutorials.len(), 1);

        let today = service.today(&user).await.unwrap();
        assert_eq!(today["Arrays"], 4);
    }

    #[tokio::test]
    async fn no_progress_means_no_recommendation() {
        let service = ProgressService::new(
            fixed_clock(),
            bank(),
            Arc::new(InMemoryRepository::new()),
        );
        let user = UserId::new("bob").unwrap();
        let overview = service.overview(&user).await.unwrap();
        assert!(overview.is_empty());
        assert!(service.recommend(&overview).is_none());
        assert!(service.today(&user).await.unwrap().is_empty());
    }
}
