use sled::{Db, Tree};

use crate::persistence::store::{Session, SessionStore, UserRecord};
use crate::utils::StoreError;

const USERS_TREE: &str = "users";
const SESSIONS_TREE: &str = "sessions";

/// `SessionStore` on an embedded sled database. Users are keyed by email,
/// sessions by refresh token, values are JSON.
#[derive(Clone)]
pub struct SledStore {
    db: Db,
    users: Tree,
    sessions: Tree,
}

impl SledStore {
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        let users = db.open_tree(USERS_TREE)?;
        let sessions = db.open_tree(SESSIONS_TREE)?;
        Ok(Self {
            db,
            users,
            sessions,
        })
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }
}

impl SessionStore for SledStore {
    fn create_user(&self, user: UserRecord) -> Result<UserRecord, StoreError> {
        let value = serde_json::to_vec(&user)?;
        match self
            .users
            .compare_and_swap(user.email.as_bytes(), None::<&[u8]>, Some(value))?
        {
            Ok(()) => Ok(user),
            Err(_) => Err(StoreError::UserExists(user.email)),
        }
    }

    fn get_user_by_email(&self, email: &str) -> Result<UserRecord, StoreError> {
        match self.users.get(email.as_bytes())? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Err(StoreError::UserNotFound(email.to_string())),
        }
    }

    fn create_session(&self, session: Session) -> Result<Session, StoreError> {
        let value = serde_json::to_vec(&session)?;
        self.sessions
            .insert(session.refresh_token.as_bytes(), value)?;
        Ok(session)
    }

    fn get_session_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<Session>, StoreError> {
        self.sessions
            .get(refresh_token.as_bytes())?
            .map(|bytes| serde_json::from_slice(&bytes))
            .transpose()
            .map_err(StoreError::from)
    }

    fn revoke_session(&self, refresh_token: &str) -> Result<(), StoreError> {
        let Some(mut session) = self.get_session_by_refresh_token(refresh_token)? else {
            return Ok(());
        };
        session.is_revoked = true;
        self.sessions
            .insert(refresh_token.as_bytes(), serde_json::to_vec(&session)?)?;
        Ok(())
    }

    fn delete_session(&self, refresh_token: &str) -> Result<(), StoreError> {
        self.sessions.remove(refresh_token.as_bytes())?;
        Ok(())
    }
}

impl std::fmt::Debug for SledStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledStore")
            .field("db", &"sled::Db")
            .field("users", &self.users.len())
            .field("sessions", &self.sessions.len())
            .finish()
    }
}
