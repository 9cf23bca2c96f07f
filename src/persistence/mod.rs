//! The `persistence` module stores users and refresh sessions.
//!
//! [`SessionStore`] is the contract the account service depends on;
//! [`SledStore`] implements it on an embedded `sled` database.

pub mod sled_store;
pub mod store;

pub use sled_store::SledStore;
pub use store::{Session, SessionStore, UserRecord};

#[cfg(test)]
mod tests;
