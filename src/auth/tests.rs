use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use tempfile::{TempDir, tempdir};

use super::password::{generate_secure_token, hash_password, verify_password};
use super::{
    AccessClaims, AccountService, CreateUserRequest, Identity, IdentityService, LoginRequest,
    TokenService,
};
use crate::config::Settings;
use crate::persistence::{Session, SessionStore, SledStore};
use crate::utils::{AuthError, Error, StoreError};

const SECRET: &str = "test-secret-key-that-is-at-least-32-bytes";
/// Cheapest bcrypt work factor, to keep tests fast.
const TEST_COST: u32 = 4;

fn account_service() -> (AccountService, Arc<SledStore>, TempDir) {
    let tmp = tempdir().unwrap();
    let store = Arc::new(SledStore::open(tmp.path().to_str().unwrap()).unwrap());
    let tokens = TokenService::new(SECRET).unwrap();
    let mut settings = Settings::default();
    settings.auth.password_cost = TEST_COST;
    let service = AccountService::new(store.clone(), tokens, &settings.auth);
    (service, store, tmp)
}

fn signup(service: &AccountService) {
    service
        .create_user(CreateUserRequest {
            username: "alice".to_string(),
            email: "Alice@Example.com".to_string(),
            password: "hunter2".to_string(),
        })
        .unwrap();
}

fn login(service: &AccountService) -> super::LoginOutcome {
    service
        .login(LoginRequest {
            email: "alice@example.com".to_string(),
            password: "hunter2".to_string(),
        })
        .unwrap()
}

#[test]
fn short_secret_key_is_fatal() {
    let err = TokenService::new("too-short").unwrap_err();
    assert_eq!(err, AuthError::KeyTooShort { min: 32, actual: 9 });
}

#[test]
fn issued_token_verifies_to_identity() {
    let tokens = TokenService::new(SECRET).unwrap();
    let issued = tokens
        .issue_access_token("u1", "alice@example.com", "alice", Duration::minutes(15))
        .unwrap();

    assert!(!issued.claims.jti.is_empty());
    assert_eq!(issued.claims.exp - issued.claims.iat, 15 * 60);

    let identity = tokens.verify_access_token(&issued.token).unwrap();
    assert_eq!(identity, Identity::new("u1", "alice"));
}

#[test]
fn every_token_gets_a_unique_id() {
    let tokens = TokenService::new(SECRET).unwrap();
    let a = tokens
        .issue_access_token("u1", "a@b.c", "alice", Duration::minutes(1))
        .unwrap();
    let b = tokens
        .issue_access_token("u1", "a@b.c", "alice", Duration::minutes(1))
        .unwrap();
    assert_ne!(a.claims.jti, b.claims.jti);
}

#[test]
fn expired_token_is_rejected() {
    let tokens = TokenService::new(SECRET).unwrap();
    let issued = tokens
        .issue_access_token("u1", "a@b.c", "alice", Duration::seconds(-5))
        .unwrap();
    assert_eq!(
        tokens.verify_access_token(&issued.token).unwrap_err(),
        AuthError::TokenExpired
    );
}

#[test]
fn token_signed_with_other_key_is_rejected() {
    let other = TokenService::new("another-secret-key-that-is-32-bytes-long").unwrap();
    let issued = other
        .issue_access_token("u1", "a@b.c", "alice", Duration::minutes(1))
        .unwrap();

    let tokens = TokenService::new(SECRET).unwrap();
    assert!(matches!(
        tokens.verify_access_token(&issued.token),
        Err(AuthError::InvalidToken(_))
    ));
}

#[test]
fn token_with_other_algorithm_is_rejected() {
    let now = Utc::now();
    let claims = AccessClaims {
        jti: "jti".to_string(),
        sub: "u1".to_string(),
        email: "a@b.c".to_string(),
        username: "alice".to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::minutes(5)).timestamp(),
    };
    let token = encode(
        &Header::new(Algorithm::HS512),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let tokens = TokenService::new(SECRET).unwrap();
    assert_eq!(
        tokens.verify_access_token(&token).unwrap_err(),
        AuthError::UnsupportedAlgorithm
    );
}

#[test]
fn garbage_token_is_rejected() {
    let tokens = TokenService::new(SECRET).unwrap();
    assert!(matches!(
        tokens.verify_access_token("invalid.token.here"),
        Err(AuthError::InvalidToken(_))
    ));
}

#[test]
fn password_hash_round_trip() {
    let stored = hash_password("hunter2", TEST_COST).unwrap();
    assert!(stored.starts_with("$2"));
    assert!(verify_password("hunter2", &stored));
    assert!(!verify_password("hunter3", &stored));
    assert!(!verify_password("hunter2", "not-a-hash"));
    assert_ne!(stored, hash_password("hunter2", TEST_COST).unwrap());
}

#[test]
fn password_hash_rejects_invalid_cost() {
    let err = hash_password("hunter2", 2).unwrap_err();
    assert!(matches!(err, Error::Internal(_)));
    assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn secure_token_has_requested_length() {
    let token = generate_secure_token(32);
    assert_eq!(token.len(), 64);
    assert_ne!(token, generate_secure_token(32));
}

#[test]
fn signup_normalizes_email_and_rejects_duplicates() {
    let (service, store, _tmp) = account_service();
    signup(&service);

    let user = store.get_user_by_email("alice@example.com").unwrap();
    assert_eq!(user.username, "alice");
    assert_ne!(user.password_hash, "hunter2");
    assert!(verify_password("hunter2", &user.password_hash));

    let err = service
        .create_user(CreateUserRequest {
            username: "alice2".to_string(),
            email: "alice@example.com".to_string(),
            password: "pw".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, Error::Store(StoreError::UserExists(_))));
}

#[test]
fn signup_requires_all_fields() {
    let (service, _store, _tmp) = account_service();
    let err = service
        .create_user(CreateUserRequest {
            username: " ".to_string(),
            email: "x@y.z".to_string(),
            password: "pw".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));
}

#[test]
fn login_issues_tokens_and_session() {
    let (service, store, _tmp) = account_service();
    signup(&service);
    let outcome = login(&service);

    assert_eq!(outcome.user.username, "alice");
    let tokens = TokenService::new(SECRET).unwrap();
    let identity = tokens.verify_access_token(&outcome.access_token).unwrap();
    assert_eq!(identity.user_id, outcome.user.id);

    let session = store
        .get_session_by_refresh_token(&outcome.refresh_token)
        .unwrap()
        .unwrap();
    assert!(!session.is_revoked);
    assert_eq!(session.email, "alice@example.com");
    assert!(session.expires_at > Utc::now() + Duration::days(6));
}

#[test]
fn login_with_wrong_password_or_unknown_user_fails() {
    let (service, _store, _tmp) = account_service();
    signup(&service);

    let err = service
        .login(LoginRequest {
            email: "alice@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials)));

    let err = service
        .login(LoginRequest {
            email: "bob@example.com".to_string(),
            password: "hunter2".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials)));
}

#[test]
fn refresh_reissues_access_token() {
    let (service, _store, _tmp) = account_service();
    signup(&service);
    let outcome = login(&service);

    let token = service.refresh(&outcome.refresh_token).unwrap();
    let tokens = TokenService::new(SECRET).unwrap();
    assert_eq!(tokens.verify_access_token(&token).unwrap().username, "alice");
}

#[test]
fn refresh_after_logout_fails() {
    let (service, _store, _tmp) = account_service();
    signup(&service);
    let outcome = login(&service);

    service.logout(&outcome.refresh_token).unwrap();
    let err = service.refresh(&outcome.refresh_token).unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::SessionRevoked)));

    // Logging out twice is fine.
    service.logout(&outcome.refresh_token).unwrap();
}

#[test]
fn refresh_with_expired_session_fails() {
    let (service, store, _tmp) = account_service();
    signup(&service);
    let now = Utc::now();
    store
        .create_session(Session {
            id: "old".to_string(),
            email: "alice@example.com".to_string(),
            refresh_token: "stale".to_string(),
            is_revoked: false,
            created_at: now - Duration::days(8),
            expires_at: now - Duration::days(1),
        })
        .unwrap();

    let err = service.refresh("stale").unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::SessionExpired)));
}

#[test]
fn refresh_with_unknown_token_fails() {
    let (service, _store, _tmp) = account_service();
    let err = service.refresh("never-issued").unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::SessionNotFound)));
}
