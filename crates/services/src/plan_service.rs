use std::sync::Arc;

use study_core::model::{PlanWeek, StudyPlan};

/// Read-only access to the recommended study path.
#[derive(Clone, Default)]
pub struct StudyPlanService {
    plan: Arc<StudyPlan>,
}

impl StudyPlanService {
    #[must_use]
    pub fn new(plan: Arc<StudyPlan>) -> Self {
        Self { plan }
    }

    #[must_use]
    pub fn plan(&self) -> &StudyPlan {
        &self.plan
    }

    #[must_use]
    pub fn weeks(&self) -> &[PlanWeek] {
        &self.plan.recommended_path
    }

    #[must_use]
    pub fn tips(&self) -> &[String] {
        &self.plan.tips
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plan.recommended_path.is_empty() && self.plan.tips.is_empty()
    }
}
