use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::question::{Question, QuestionError, check_link};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BankError {
    #[error("topic {topic:?} has no questions")]
    EmptyTopic { topic: String },

    #[error("topic {topic:?}, question {index}: {source}")]
    InvalidQuestion {
        topic: String,
        index: usize,
        #[source]
        source: QuestionError,
    },

    #[error("topic {topic:?}: {source}")]
    InvalidResource {
        topic: String,
        #[source]
        source: QuestionError,
    },
}

/// A recommended video tutorial for a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tutorial {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
}

/// An external practice problem for a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeLink {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

/// Everything the bank knows about one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicMaterial {
    pub questions: Vec<Question>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "youtube_tutorials")]
    pub tutorials: Vec<Tutorial>,
    #[serde(default)]
    pub practice_links: Vec<PracticeLink>,
}

impl TopicMaterial {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            description: None,
            tutorials: Vec::new(),
            practice_links: Vec::new(),
        }
    }
}

/// Read-only view of topic → questions, keyed in lexicographic topic order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionBank {
    topics: BTreeMap<String, TopicMaterial>,
}

impl QuestionBank {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a topic.
    pub fn insert(&mut self, topic: impl Into<String>, material: TopicMaterial) {
        self.topics.insert(topic.into(), material);
    }

    /// Check every question and resource link.
    ///
    /// # Errors
    ///
    /// Returns the first `BankError` found, in topic order.
    pub fn validate(&self) -> Result<(), BankError> {
        for (topic, material) in &self.topics {
            if material.questions.is_empty() {
                return Err(BankError::EmptyTopic {
                    topic: topic.clone(),
                });
            }
            for (index, question) in material.questions.iter().enumerate() {
                question
                    .validate()
                    .map_err(|source| BankError::InvalidQuestion {
                        topic: topic.clone(),
                        index,
                        source,
                    })?;
            }
            let links = material
                .tutorials
                .iter()
                .map(|t| t.url.as_str())
                .chain(material.practice_links.iter().map(|p| p.url.as_str()));
            for link in links {
                check_link(link).map_err(|source| BankError::InvalidResource {
                    topic: topic.clone(),
                    source,
                })?;
            }
        }
        Ok(())
    }

    pub fn topic_names(&self) -> impl Iterator<Item = &str> {
        self.topics.keys().map(String::as_str)
    }

    #[must_use]
    pub fn topic(&self, name: &str) -> Option<&TopicMaterial> {
        self.topics.get(name)
    }

    #[must_use]
    pub fn questions(&self, name: &str) -> Option<&[Question]> {
        self.topics.get(name).map(|m| m.questions.as_slice())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// First topic (in key order) whose name shares a word with `text`.
    ///
    /// Words shorter than three characters are ignored on both sides.
    #[must_use]
    pub fn topic_mentioned_in(&self, text: &str) -> Option<(&str, &TopicMaterial)> {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() >= 3)
            .collect();
        self.topics
            .iter()
            .find(|(name, _)| {
                name.to_lowercase()
                    .split(|c: char| !c.is_alphanumeric())
                    .filter(|w| w.len() >= 3)
                    .any(|topic_word| {
                        words
                            .iter()
                            .any(|w| *w == topic_word || w.trim_end_matches('s') == topic_word)
                    })
            })
            .map(|(name, material)| (name.as_str(), material))
    }
}
