//! Derived progress figures: streak, topic totals and recommendations.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::model::{DayProgress, ProgressLog};

/// Number of consecutive days with activity, counted back from the most
/// recent active date.
///
/// The run is anchored on the newest date in `dates`, not on today: a user
/// whose last activity was last week still reports the streak that ended then.
/// Duplicate dates are ignored.
#[must_use]
pub fn current_streak(dates: impl IntoIterator<Item = NaiveDate>) -> u32 {
    let mut sorted: Vec<NaiveDate> = dates.into_iter().collect();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.dedup();

    let Some(most_recent) = sorted.first().copied() else {
        return 0;
    };

    let mut streak = 0_u32;
    for date in sorted {
        if (most_recent - date).num_days() == i64::from(streak) {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

/// Topic with the smallest total.
///
/// Ties go to the lexicographically smallest topic name.
#[must_use]
pub fn least_practiced(totals: &BTreeMap<String, u64>) -> Option<&str> {
    let mut best: Option<(&str, u64)> = None;
    for (topic, total) in totals {
        match best {
            Some((_, min)) if *total >= min => {}
            _ => best = Some((topic.as_str(), *total)),
        }
    }
    best.map(|(topic, _)| topic)
}

/// Everything the progress dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressOverview {
    pub total_questions: u64,
    pub topics_covered: usize,
    pub current_streak: u32,
    pub topic_totals: BTreeMap<String, u64>,
    pub daily_totals: Vec<(NaiveDate, u64)>,
    pub recent_activity: Vec<(NaiveDate, DayProgress)>,
    pub least_practiced: Option<String>,
}

impl ProgressOverview {
    /// Number of recent days listed in the overview.
    pub const RECENT_DAYS: usize = 5;

    #[must_use]
    pub fn from_log(log: &ProgressLog) -> Self {
        let topic_totals = log.all_topic_totals();
        let least_practiced = least_practiced(&topic_totals).map(str::to_string);
        Self {
            total_questions: log.total_questions(),
            topics_covered: log.distinct_topics_covered(),
            current_streak: current_streak(log.dates()),
            daily_totals: log.daily_totals(),
            recent_activity: log.recent_activity(Self::RECENT_DAYS),
            topic_totals,
            least_practiced,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.daily_totals.is_empty()
    }
}
