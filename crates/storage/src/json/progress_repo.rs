use chrono::NaiveDate;
use study_core::model::{ProgressLog, UserId};

use super::{JsonRepository, OnCorrupt, read_json, write_json};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for JsonRepository {
    async fn load_progress(&self, user: &UserId) -> Result<ProgressLog, StorageError> {
        let path = self.user_file("progress", user, "progress");
        read_json(&path, OnCorrupt::Default).await
    }

    async fn increment_progress(
        &self,
        user: &UserId,
        date: NaiveDate,
        topic: &str,
        amount: i64,
    ) -> Result<u32, StorageError> {
        let path = self.user_file("progress", user, "progress");
        let _guard = self.locks.lock(&path).await;
        let mut log: ProgressLog = read_json(&path, OnCorrupt::Default).await?;
        let count = log.increment(date, topic, amount)?;
        write_json(&path, &log).await?;
        tracing::info!(%user, %date, topic, amount, count, "progress recorded");
        Ok(count)
    }
}
