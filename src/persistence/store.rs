use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// A refresh session. Created at login, revoked at logout, only read by
/// refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub email: String,
    pub refresh_token: String,
    pub is_revoked: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Usable for a refresh at `now`: not revoked and not past expiry.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked && now <= self.expires_at
    }
}

/// Users and refresh sessions.
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Insert a new user. Fails with `UserExists` if the email is taken.
    fn create_user(&self, user: UserRecord) -> Result<UserRecord, StoreError>;

    fn get_user_by_email(&self, email: &str) -> Result<UserRecord, StoreError>;

    fn create_session(&self, session: Session) -> Result<Session, StoreError>;

    /// Look a session up by its refresh token, revoked or not.
    fn get_session_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<Session>, StoreError>;

    /// Mark a session revoked. Unknown tokens are ignored.
    fn revoke_session(&self, refresh_token: &str) -> Result<(), StoreError>;

    fn delete_session(&self, refresh_token: &str) -> Result<(), StoreError>;
}
