use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One successful question/answer exchange with the assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaExchange {
    pub question: String,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
    /// How many model calls it took to get the answer.
    #[serde(default = "one")]
    pub attempts: u32,
}

fn one() -> u32 {
    1
}

/// Newest-first view of at most `limit` exchanges.
#[must_use]
pub fn most_recent(exchanges: &[QaExchange], limit: usize) -> Vec<QaExchange> {
    let mut sorted = exchanges.to_vec();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted.truncate(limit);
    sorted
}
