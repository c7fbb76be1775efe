use std::path::PathBuf;

use study_core::model::UserId;

use super::{JsonRepository, OnCorrupt, read_json, write_json};
use crate::repository::{StorageError, UserRecord, UserRepository, identity_taken};

impl JsonRepository {
    fn users_file(&self) -> PathBuf {
        self.root.join("auth").join("users.json")
    }

    // A corrupt account file must not be silently replaced on the next sign-up.
    async fn read_users(&self) -> Result<Vec<UserRecord>, StorageError> {
        read_json(&self.users_file(), OnCorrupt::Fail).await
    }
}

#[async_trait::async_trait]
impl UserRepository for JsonRepository {
    async fn get_user(&self, username: &UserId) -> Result<Option<UserRecord>, StorageError> {
        Ok(self
            .read_users()
            .await?
            .into_iter()
            .find(|u| &u.username == username))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StorageError> {
        let email = email.trim();
        Ok(self
            .read_users()
            .await?
            .into_iter()
            .find(|u| u.email.eq_ignore_ascii_case(email)))
    }

    async fn insert_user(&self, record: UserRecord) -> Result<(), StorageError> {
        let path = self.users_file();
        let _guard = self.locks.lock(&path).await;
        let mut users = self.read_users().await?;
        if identity_taken(&users, &record) {
            return Err(StorageError::Conflict);
        }
        tracing::info!(user = %record.username, "account created");
        users.push(record);
        write_json(&path, &users).await
    }
}
