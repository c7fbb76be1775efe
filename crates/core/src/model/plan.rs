use serde::{Deserialize, Serialize};

/// A video or article recommended within the study plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanResource {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub creator: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanTopic {
    pub name: String,
    #[serde(default)]
    pub estimated_hours: f32,
    #[serde(default)]
    pub subtopics: Vec<String>,
    #[serde(default)]
    pub resources: Vec<PlanResource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanWeek {
    pub week: u32,
    pub topics: Vec<PlanTopic>,
}

/// Recommended learning path with weekly topics and study tips.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyPlan {
    #[serde(default)]
    pub recommended_path: Vec<PlanWeek>,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub recommended_daily_hours: Option<f32>,
    #[serde(default)]
    pub recommended_weekly_hours: Option<f32>,
}

impl StudyPlan {
    /// Total estimated hours across the whole path.
    #[must_use]
    pub fn estimated_hours(&self) -> f32 {
        self.recommended_path
            .iter()
            .flat_map(|w| &w.topics)
            .map(|t| t.estimated_hours)
            .sum()
    }
}
