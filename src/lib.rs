//! # chathub
//!
//! `chathub` is a real-time chat server. Authenticated clients join named
//! rooms over WebSockets and every message sent to a room is fanned out to
//! all of its members.
//!
//! ## Core Modules
//!
//! - `hub`: the single control loop that owns rooms, membership and fan-out,
//!   including slow-consumer eviction.
//! - `client`: the hub-side connection record and the pump-side handle.
//! - `auth`: access tokens, password digests and the account/session service.
//! - `persistence`: the sled-backed store for users and refresh sessions.
//! - `transport`: the axum HTTP endpoints and the WebSocket join.
//! - `config`: layered settings from file and environment.
//! - `utils`: error types and logging.

pub mod auth;
pub mod client;
pub mod config;
pub mod hub;
pub mod persistence;
pub mod transport;
pub mod utils;
