use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("progress increment must be >= 0, got {amount}")]
    NegativeIncrement { amount: i64 },

    #[error("topic name cannot be empty")]
    EmptyTopic,
}

/// Per-topic counts for a single day.
pub type DayProgress = BTreeMap<String, u32>;

/// Date → topic → count, one per user.
///
/// Counts only grow: there is no way to remove a day or a topic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressLog {
    days: BTreeMap<NaiveDate, DayProgress>,
}

impl ProgressLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to `topic` on `date`, creating the entries if absent.
    ///
    /// An amount of zero still records the day and topic.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::NegativeIncrement` for negative amounts and
    /// `ProgressError::EmptyTopic` for a blank topic.
    pub fn increment(
        &mut self,
        date: NaiveDate,
        topic: &str,
        amount: i64,
    ) -> Result<u32, ProgressError> {
        if amount < 0 {
            return Err(ProgressError::NegativeIncrement { amount });
        }
        if topic.trim().is_empty() {
            return Err(ProgressError::EmptyTopic);
        }
        let amount = u32::try_from(amount).unwrap_or(u32::MAX);
        let count = self
            .days
            .entry(date)
            .or_default()
            .entry(topic.to_string())
            .or_insert(0);
        *count = count.saturating_add(amount);
        Ok(*count)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    #[must_use]
    pub fn day(&self, date: NaiveDate) -> Option<&DayProgress> {
        self.days.get(&date)
    }

    pub fn days(&self) -> impl DoubleEndedIterator<Item = (NaiveDate, &DayProgress)> {
        self.days.iter().map(|(date, day)| (*date, day))
    }

    /// Every date with an entry, including days whose counts are all zero.
    pub fn dates(&self) -> impl DoubleEndedIterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    /// Sum of counts per topic across all dates, in topic order.
    #[must_use]
    pub fn all_topic_totals(&self) -> BTreeMap<String, u64> {
        let mut totals = BTreeMap::new();
        for day in self.days.values() {
            for (topic, count) in day {
                *totals.entry(topic.clone()).or_insert(0) += u64::from(*count);
            }
        }
        totals
    }

    #[must_use]
    pub fn total_questions(&self) -> u64 {
        self.days
            .values()
            .flat_map(BTreeMap::values)
            .map(|c| u64::from(*c))
            .sum()
    }

    #[must_use]
    pub fn distinct_topics_covered(&self) -> usize {
        self.days
            .values()
            .flat_map(BTreeMap::keys)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Sum of counts per date, oldest first.
    #[must_use]
    pub fn daily_totals(&self) -> Vec<(NaiveDate, u64)> {
        self.days
            .iter()
            .map(|(date, day)| (*date, day.values().map(|c| u64::from(*c)).sum()))
            .collect()
    }

    /// The latest `limit` days, newest first.
    #[must_use]
    pub fn recent_activity(&self, limit: usize) -> Vec<(NaiveDate, DayProgress)> {
        self.days
            .iter()
            .rev()
            .take(limit)
            .map(|(date, day)| (*date, day.clone()))
            .collect()
    }
}
