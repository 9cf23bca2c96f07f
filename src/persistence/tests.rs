use super::{Session, SessionStore, SledStore, UserRecord};
use crate::utils::StoreError;
use chrono::{Duration, Utc};
use tempfile::tempdir;

fn user(email: &str) -> UserRecord {
    UserRecord {
        id: format!("id-{email}"),
        username: "alice".to_string(),
        email: email.to_string(),
        password_hash: "salt$digest".to_string(),
    }
}

fn session(token: &str) -> Session {
    let now = Utc::now();
    Session {
        id: "s1".to_string(),
        email: "alice@example.com".to_string(),
        refresh_token: token.to_string(),
        is_revoked: false,
        created_at: now,
        expires_at: now + Duration::days(7),
    }
}

#[test]
fn create_and_get_user() {
    let tmp = tempdir().unwrap();
    let store = SledStore::open(tmp.path().to_str().unwrap()).unwrap();

    store.create_user(user("alice@example.com")).unwrap();
    let found = store.get_user_by_email("alice@example.com").unwrap();
    assert_eq!(found, user("alice@example.com"));
}

#[test]
fn duplicate_email_is_rejected() {
    let tmp = tempdir().unwrap();
    let store = SledStore::open(tmp.path().to_str().unwrap()).unwrap();

    store.create_user(user("alice@example.com")).unwrap();
    let err = store.create_user(user("alice@example.com")).unwrap_err();
    assert!(matches!(err, StoreError::UserExists(email) if email == "alice@example.com"));
}

#[test]
fn unknown_user_is_not_found() {
    let tmp = tempdir().unwrap();
    let store = SledStore::open(tmp.path().to_str().unwrap()).unwrap();

    let err = store.get_user_by_email("nobody@example.com").unwrap_err();
    assert!(matches!(err, StoreError::UserNotFound(_)));
}

#[test]
fn revoke_marks_session_but_keeps_it_readable() {
    let tmp = tempdir().unwrap();
    let store = SledStore::open(tmp.path().to_str().unwrap()).unwrap();

    store.create_session(session("tok")).unwrap();
    store.revoke_session("tok").unwrap();

    let found = store.get_session_by_refresh_token("tok").unwrap().unwrap();
    assert!(found.is_revoked);
    assert!(!found.is_active_at(Utc::now()));
}

#[test]
fn revoke_and_delete_unknown_session_are_noops() {
    let tmp = tempdir().unwrap();
    let store = SledStore::open(tmp.path().to_str().unwrap()).unwrap();

    store.revoke_session("missing").unwrap();
    store.delete_session("missing").unwrap();
    assert!(store.get_session_by_refresh_token("missing").unwrap().is_none());
}

#[test]
fn delete_removes_session() {
    let tmp = tempdir().unwrap();
    let store = SledStore::open(tmp.path().to_str().unwrap()).unwrap();

    store.create_session(session("tok")).unwrap();
    store.delete_session("tok").unwrap();
    assert!(store.get_session_by_refresh_token("tok").unwrap().is_none());
}

#[test]
fn session_activity_follows_expiry() {
    let s = session("tok");
    assert!(s.is_active_at(Utc::now()));
    assert!(!s.is_active_at(s.expires_at + Duration::seconds(1)));
}
