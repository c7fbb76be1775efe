//! Account sign-up and sign-in.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use storage::repository::{UserRecord, UserRepository};
use study_core::model::{AuthUser, SignUpRequest, UserId, validate_email};

use crate::error::AuthError;

/// Identity backend.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns `AuthError::AlreadyRegistered` if the name or e-mail is taken.
    async fn sign_up(&self, request: SignUpRequest) -> Result<AuthUser, AuthError>;

    /// Sign in with a username or e-mail and a password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on any mismatch.
    async fn sign_in(&self, identifier: &str, password: &str) -> Result<AuthUser, AuthError>;

    /// Sign in with a credential issued by an external identity provider.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unsupported` when the provider cannot verify it.
    async fn sign_in_with_oauth_credential(
        &self,
        provider: &str,
        credential: &str,
    ) -> Result<AuthUser, AuthError>;

    /// # Errors
    ///
    /// Returns `AuthError` if the session cannot be ended.
    async fn sign_out(&self, user: &UserId) -> Result<(), AuthError>;

    /// # Errors
    ///
    /// Returns `AuthError::UnknownAccount` if no account uses `email`.
    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

    /// The signed-in identity for `user`, if its session is active.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` for backend failures.
    async fn check_session_state(&self, user: &UserId) -> Result<Option<AuthUser>, AuthError>;
}

/// Hex-encoded SHA-256 digest.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Accounts stored through a `UserRepository`, sessions held in memory.
#[derive(Clone)]
pub struct LocalAuthProvider {
    users: Arc<dyn UserRepository>,
    sessions: Arc<Mutex<HashSet<UserId>>>,
}

impl LocalAuthProvider {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self {
            users,
            sessions: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    fn set_session(&self, user: &UserId, active: bool) {
        match self.sessions.lock() {
            Ok(mut sessions) => {
                if active {
                    sessions.insert(user.clone());
                } else {
                    sessions.remove(user);
                }
            }
            Err(err) => tracing::warn!(error = %err, "session table poisoned"),
        }
    }

    fn has_session(&self, user: &UserId) -> bool {
        self.sessions
            .lock()
            .map(|sessions| sessions.contains(user))
            .unwrap_or(false)
    }

    async fn lookup(&self, identifier: &str) -> Result<Option<UserRecord>, AuthError> {
        if identifier.contains('@') {
            return Ok(self.users.find_by_email(identifier).await?);
        }
        match UserId::new(identifier) {
            Ok(id) => Ok(self.users.get_user(&id).await?),
            Err(_) => Ok(None),
        }
    }
}

fn to_auth_user(record: UserRecord) -> AuthUser {
    AuthUser {
        display_name: record
            .display_name
            .unwrap_or_else(|| record.username.to_string()),
        id: record.username,
        email: record.email,
        verified: record.verified,
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn sign_up(&self, request: SignUpRequest) -> Result<AuthUser, AuthError> {
        let record = UserRecord {
            username: request.username,
            email: request.email,
            password_hash: hash_password(&request.password),
            display_name: None,
            verified: true,
        };
        self.users.insert_user(record.clone()).await?;
        self.set_session(&record.username, true);
        Ok(to_auth_user(record))
    }

    async fn sign_in(&self, identifier: &str, password: &str) -> Result<AuthUser, AuthError> {
        let record = self
            .lookup(identifier.trim())
            .await?
            .filter(|r| r.password_hash == hash_password(password))
            .ok_or(AuthError::InvalidCredentials)?;
        self.set_session(&record.username, true);
        tracing::info!(user = %record.username, "signed in");
        Ok(to_auth_user(record))
    }

    async fn sign_in_with_oauth_credential(
        &self,
        provider: &str,
        _credential: &str,
    ) -> Result<AuthUser, AuthError> {
        Err(AuthError::Unsupported(provider.to_string()))
    }

    async fn sign_out(&self, user: &UserId) -> Result<(), AuthError> {
        self.set_session(user, false);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let record = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AuthError::UnknownAccount(email.trim().to_string()))?;
        tracing::info!(user = %record.username, "password reset requested");
        Ok(())
    }

    async fn check_session_state(&self, user: &UserId) -> Result<Option<AuthUser>, AuthError> {
        if !self.has_session(user) {
            return Ok(None);
        }
        Ok(self.users.get_user(user).await?.map(to_auth_user))
    }
}

/// Validates raw form input before handing it to an `AuthProvider`.
#[derive(Clone)]
pub struct AuthService {
    provider: Arc<dyn AuthProvider>,
}

impl AuthService {
    #[must_use]
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    /// # Errors
    ///
    /// Returns `AuthError::Input` for invalid form fields, or whatever the
    /// provider reports.
    pub async fn sign_up(
        &self,
        username: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<AuthUser, AuthError> {
        let request = SignUpRequest::new(username, email, password, confirm_password)?;
        self.provider.sign_up(request).await
    }

    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for blank input or a mismatch.
    pub async fn sign_in(&self, identifier: &str, password: &str) -> Result<AuthUser, AuthError> {
        if identifier.trim().is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }
        self.provider.sign_in(identifier, password).await
    }

    /// # Errors
    ///
    /// Returns `AuthError::Unsupported` if the provider lacks OAuth support.
    pub async fn sign_in_with_oauth(
        &self,
        provider: &str,
        credential: &str,
    ) -> Result<AuthUser, AuthError> {
        self.provider
            .sign_in_with_oauth_credential(provider, credential)
            .await
    }

    /// # Errors
    ///
    /// Returns `AuthError` if the provider cannot end the session.
    pub async fn sign_out(&self, user: &UserId) -> Result<(), AuthError> {
        self.provider.sign_out(user).await
    }

    /// # Errors
    ///
    /// Returns `AuthError::Input` for a malformed address or
    /// `AuthError::UnknownAccount` if nobody uses it.
    pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        validate_email(email)?;
        self.provider.send_password_reset(email).await
    }

    /// # Errors
    ///
    /// Returns `AuthError` for backend failures.
    pub async fn session(&self, user: &UserId) -> Result<Option<AuthUser>, AuthError> {
        self.provider.check_session_state(user).await
    }
}
