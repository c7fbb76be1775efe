use study_core::model::{QaExchange, UserId, most_recent};

use super::{JsonRepository, OnCorrupt, read_json, write_json};
use crate::repository::{HistoryRepository, StorageError};

#[async_trait::async_trait]
impl HistoryRepository for JsonRepository {
    async fn append_exchange(
        &self,
        user: &UserId,
        exchange: QaExchange,
    ) -> Result<(), StorageError> {
        let path = self.user_file("history", user, "history");
        let _guard = self.locks.lock(&path).await;
        let mut all: Vec<QaExchange> = read_json(&path, OnCorrupt::Default).await?;
        all.push(exchange);
        write_json(&path, &all).await
    }

    async fn recent_exchanges(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<QaExchange>, StorageError> {
        let path = self.user_file("history", user, "history");
        let all: Vec<QaExchange> = read_json(&path, OnCorrupt::Default).await?;
        Ok(most_recent(&all, limit))
    }
}
