//! Authentication: who is on the other end of a connection.
//!
//! - `token`: signs and verifies short-lived access tokens.
//! - `service`: sign-up, login, refresh and logout over a session store.
//! - `password`: password digests and random refresh tokens.

pub mod password;
pub mod service;
pub mod token;

use serde::{Deserialize, Serialize};

pub use service::{
    AccountService, CreateUserRequest, IdentityService, LoginOutcome, LoginRequest, UserView,
};
pub use token::{AccessClaims, IssuedToken, MIN_SECRET_KEY_LEN, TokenService};

/// Verified identity attached to a connection at authentication time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
        }
    }
}

#[cfg(test)]
mod tests;
