//! Account operations behind the HTTP control endpoints.
//!
//! [`IdentityService`] is the contract the transport layer calls;
//! [`AccountService`] implements it over a [`SessionStore`] and a
//! [`TokenService`]. Access tokens last `access_ttl`, refresh sessions last
//! `refresh_ttl`, and a refresh only succeeds against a session that is
//! neither revoked nor expired.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::password::{generate_secure_token, hash_password, verify_password};
use crate::auth::token::TokenService;
use crate::config::AuthSettings;
use crate::persistence::{Session, SessionStore, UserRecord};
use crate::utils::{AuthError, Error, Result, StoreError};

const REFRESH_TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: UserView,
    pub access_token: String,
    pub refresh_token: String,
}

pub trait IdentityService: Send + Sync {
    fn create_user(&self, request: CreateUserRequest) -> Result<UserView>;
    fn login(&self, request: LoginRequest) -> Result<LoginOutcome>;
    /// Issue a fresh access token against a live refresh session.
    fn refresh(&self, refresh_token: &str) -> Result<String>;
    fn logout(&self, refresh_token: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct AccountService {
    store: Arc<dyn SessionStore>,
    tokens: TokenService,
    access_ttl: Duration,
    refresh_ttl: Duration,
    password_cost: u32,
}

impl AccountService {
    pub fn new(store: Arc<dyn SessionStore>, tokens: TokenService, settings: &AuthSettings) -> Self {
        Self {
            store,
            tokens,
            access_ttl: settings.access_ttl(),
            refresh_ttl: settings.refresh_ttl(),
            password_cost: settings.password_cost,
        }
    }

    fn issue_for(&self, user: &UserRecord) -> Result<String> {
        let issued =
            self.tokens
                .issue_access_token(&user.id, &user.email, &user.username, self.access_ttl)?;
        Ok(issued.token)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl IdentityService for AccountService {
    fn create_user(&self, request: CreateUserRequest) -> Result<UserView> {
        let email = normalize_email(&request.email);
        let username = request.username.trim().to_string();
        if username.is_empty() || email.is_empty() || request.password.is_empty() {
            return Err(Error::BadRequest(
                "username, email and password are required".to_string(),
            ));
        }

        let user = self.store.create_user(UserRecord {
            id: Uuid::new_v4().to_string(),
            username,
            email,
            password_hash: hash_password(&request.password, self.password_cost)?,
        })?;
        info!(user = %user.id, username = %user.username, "user created");

        Ok(UserView {
            id: user.id,
            username: user.username,
            email: user.email,
        })
    }

    fn login(&self, request: LoginRequest) -> Result<LoginOutcome> {
        let email = normalize_email(&request.email);
        let user = match self.store.get_user_by_email(&email) {
            Ok(user) => user,
            Err(StoreError::UserNotFound(_)) => return Err(AuthError::InvalidCredentials.into()),
            Err(e) => return Err(e.into()),
        };
        if !verify_password(&request.password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials.into());
        }

        let access_token = self.issue_for(&user)?;
        let refresh_token = generate_secure_token(REFRESH_TOKEN_BYTES);
        let now = Utc::now();
        self.store.create_session(Session {
            id: Uuid::new_v4().to_string(),
            email: user.email.clone(),
            refresh_token: refresh_token.clone(),
            is_revoked: false,
            created_at: now,
            expires_at: now + self.refresh_ttl,
        })?;
        info!(user = %user.id, "user signed in");

        Ok(LoginOutcome {
            user: UserView {
                id: user.id,
                username: user.username,
                email: user.email,
            },
            access_token,
            refresh_token,
        })
    }

    fn refresh(&self, refresh_token: &str) -> Result<String> {
        let session = self
            .store
            .get_session_by_refresh_token(refresh_token)?
            .ok_or(AuthError::SessionNotFound)?;
        if session.is_revoked {
            return Err(AuthError::SessionRevoked.into());
        }
        // Revocation is ruled out above, so an inactive session has expired.
        if !session.is_active_at(Utc::now()) {
            return Err(AuthError::SessionExpired.into());
        }

        let user = match self.store.get_user_by_email(&session.email) {
            Ok(user) => user,
            Err(StoreError::UserNotFound(_)) => return Err(AuthError::SessionNotFound.into()),
            Err(e) => return Err(e.into()),
        };
        let token = self.issue_for(&user)?;
        info!(user = %user.id, "token refreshed");
        Ok(token)
    }

    fn logout(&self, refresh_token: &str) -> Result<()> {
        self.store.revoke_session(refresh_token)?;
        info!("user logged out");
        Ok(())
    }
}
