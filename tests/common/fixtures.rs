#![allow(dead_code)]

use chrono::{Duration, Utc};
use session_backend::domain::{Provider, RefreshToken, Role, User};
use session_backend::utils::hash::{hash_password, hash_refresh_token};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

// Counter for generating unique test values
static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn next_id() -> u64 {
    TEST_COUNTER.fetch_add(1, Ordering::SeqCst)
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}{}@example.com", prefix, next_id())
}

/// Account created through the password flow.
pub fn password_user(email: &str, password: &str) -> User {
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        password_hash: Some(hash_password(password).expect("password hashing should succeed")),
        provider: None,
        roles: vec![Role::User],
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Account created through a federated provider; no password is stored.
pub fn provider_user(email: &str) -> User {
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        password_hash: None,
        provider: Some(Provider::Yandex),
        roles: vec![Role::User],
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn admin_user(email: &str, password: &str) -> User {
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        password_hash: Some(hash_password(password).expect("password hashing should succeed")),
        provider: None,
        roles: vec![Role::User, Role::Admin],
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Stored session record for `raw_token`, expiring `ttl_days` from now.
pub fn refresh_record(raw_token: &str, user_id: Uuid, user_agent: &str, ttl_days: i64) -> RefreshToken {
    RefreshToken {
        token_hash: hash_refresh_token(raw_token),
        user_id,
        user_agent: user_agent.to_string(),
        expires_at: Utc::now() + Duration::days(ttl_days),
        created_at: Utc::now(),
    }
}
