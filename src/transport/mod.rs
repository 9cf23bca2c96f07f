//! The `transport` module puts the hub and the identity service on the wire.
//!
//! It builds the axum router for the HTTP control endpoints and the WebSocket
//! join endpoint, and owns the cookie and frame formats clients see.

pub mod cookies;
pub mod http;
pub mod message;
pub mod websocket;

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::extract::FromRef;
use axum::middleware;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tracing::info;

use crate::auth::{IdentityService, TokenService};
use crate::config::Settings;
use crate::hub::Hub;

/// Everything a handler may pull out with `State<_>`.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub hub: Hub,
    pub identity: Arc<dyn IdentityService>,
    pub tokens: TokenService,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(
        hub: Hub,
        identity: Arc<dyn IdentityService>,
        tokens: TokenService,
        settings: Settings,
    ) -> Self {
        Self {
            hub,
            identity,
            tokens,
            settings: Arc::new(settings),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/signup", post(http::signup))
        .route("/login", post(http::login))
        .route("/refresh", post(http::refresh))
        .route("/logout", post(http::logout))
        .route("/websocket/createRoom", post(http::create_room))
        .route("/websocket/getRooms", get(http::get_rooms))
        .route("/websocket/getClients/{room_id}", get(http::get_clients))
        .route("/websocket/joinRoom/{room_id}", get(websocket::join_room))
        .layer(middleware::from_fn(http::log_failures))
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!("chathub listening on http://{addr}");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
