//! HTTP control endpoints
//!
//! Session endpoints (`/signup`, `/login`, `/refresh`, `/logout`) drive the
//! identity service and manage the token cookies. Room endpoints under
//! `/websocket` require a valid `access_token` cookie and talk to the hub.

use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRef, FromRequestParts, Path, Request, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::Next;
use axum::response::{AppendHeaders, IntoResponse, Response};
use tracing::{error, info, warn};

use crate::auth::{
    CreateUserRequest, Identity, IdentityService, LoginRequest, TokenService, UserView,
};
use crate::config::Settings;
use crate::hub::{Hub, MemberInfo, RoomInfo};
use crate::transport::cookies::{
    ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, read_cookie, removal_cookie, token_cookie,
};
use crate::transport::message::{LoginResponse, RoomRequest, StatusMessage};
use crate::utils::{AuthError, Error, ErrorCause, Result};

/// Identity taken from a verified `access_token` cookie. Rejects with 401.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
    TokenService: FromRef<S>,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token =
            read_cookie(&parts.headers, ACCESS_TOKEN_COOKIE).ok_or(AuthError::MissingToken)?;
        let identity = TokenService::from_ref(state).verify_access_token(&token)?;
        Ok(Self(identity))
    }
}

/// Run an identity-service call, which does blocking sled I/O, on the
/// blocking pool.
async fn off_runtime<T, F>(call: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .map_err(|e| Error::Internal(format!("identity task failed: {e}")))?
}

pub async fn signup(
    State(identity): State<Arc<dyn IdentityService>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserView>)> {
    let user = off_runtime(move || identity.create_user(request)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(identity): State<Arc<dyn IdentityService>>,
    State(settings): State<Arc<Settings>>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let outcome = off_runtime(move || identity.login(request)).await?;
    let auth = &settings.auth;

    let access = token_cookie(
        ACCESS_TOKEN_COOKIE,
        &outcome.access_token,
        auth.access_ttl(),
        auth.secure_cookies,
    );
    let refresh = token_cookie(
        REFRESH_TOKEN_COOKIE,
        &outcome.refresh_token,
        auth.refresh_ttl(),
        auth.secure_cookies,
    );

    Ok((
        AppendHeaders([
            (header::SET_COOKIE, access.to_string()),
            (header::SET_COOKIE, refresh.to_string()),
        ]),
        Json(LoginResponse {
            id: outcome.user.id,
            username: outcome.user.username,
            email: outcome.user.email,
            message: "login successful".to_string(),
        }),
    ))
}

pub async fn refresh(
    State(identity): State<Arc<dyn IdentityService>>,
    State(settings): State<Arc<Settings>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let refresh_token =
        read_cookie(&headers, REFRESH_TOKEN_COOKIE).ok_or(AuthError::MissingRefreshToken)?;
    let access_token = off_runtime(move || identity.refresh(&refresh_token)).await?;

    let auth = &settings.auth;
    let access = token_cookie(
        ACCESS_TOKEN_COOKIE,
        &access_token,
        auth.access_ttl(),
        auth.secure_cookies,
    );
    Ok((
        AppendHeaders([(header::SET_COOKIE, access.to_string())]),
        Json(StatusMessage {
            message: "token refreshed successfully".to_string(),
        }),
    ))
}

pub async fn logout(
    State(identity): State<Arc<dyn IdentityService>>,
    State(settings): State<Arc<Settings>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let refresh_token = read_cookie(&headers, REFRESH_TOKEN_COOKIE)
        .ok_or_else(|| Error::BadRequest("refresh token not provided".to_string()))?;
    off_runtime(move || identity.logout(&refresh_token)).await?;

    let secure = settings.auth.secure_cookies;
    Ok((
        AppendHeaders([
            (
                header::SET_COOKIE,
                removal_cookie(ACCESS_TOKEN_COOKIE, secure).to_string(),
            ),
            (
                header::SET_COOKIE,
                removal_cookie(REFRESH_TOKEN_COOKIE, secure).to_string(),
            ),
        ]),
        Json(StatusMessage {
            message: "logged out successfully".to_string(),
        }),
    ))
}

pub async fn create_room(
    Authenticated(identity): Authenticated,
    State(hub): State<Hub>,
    Json(request): Json<RoomRequest>,
) -> Result<(StatusCode, Json<RoomRequest>)> {
    let id = request.id.trim();
    if id.is_empty() {
        return Err(Error::BadRequest("room id is required".to_string()));
    }
    let name = if request.name.trim().is_empty() {
        id
    } else {
        request.name.trim()
    };

    let room = hub.create_room(id, name).await?;
    info!(room = %room.id, by = %identity.username, "room created over http");
    Ok((
        StatusCode::CREATED,
        Json(RoomRequest {
            id: room.id,
            name: room.name,
        }),
    ))
}

pub async fn get_rooms(
    Authenticated(_): Authenticated,
    State(hub): State<Hub>,
) -> Result<Json<Vec<RoomInfo>>> {
    Ok(Json(hub.rooms().await?))
}

pub async fn get_clients(
    Authenticated(_): Authenticated,
    State(hub): State<Hub>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<MemberInfo>>> {
    Ok(Json(hub.members(&room_id).await?))
}

/// Log every rejected request once, with its method, path and cause.
pub async fn log_failures(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;

    let status = response.status();
    let cause = response
        .extensions()
        .get::<ErrorCause>()
        .map(|c| c.0.as_str())
        .unwrap_or("-");
    if status.is_server_error() {
        error!(%method, %path, %status, cause, "request failed");
    } else if status.is_client_error() {
        warn!(%method, %path, %status, cause, "request rejected");
    }
    response
}
