//! Request and response shapes used by the API tests

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Deserialize;
use serde_json::{json, Value};

static COUNTER: AtomicU64 = AtomicU64::new(1);

pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Registration body with a unique username and email
pub fn unique_registration() -> Value {
    let suffix = unique_suffix();
    json!({
        "username": format!("tester{suffix}"),
        "email": format!("tester{suffix}@example.com"),
        "password": "TestPass123",
    })
}

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct Created {
    pub uid: u64,
    pub userslug: String,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    pub uid: u64,
    pub username: String,
    pub userslug: String,
    pub fullname: String,
    pub joindate: i64,
    pub picture: String,
    pub reputation: i64,
    pub postcount: u64,
    pub banned: bool,
    pub status: String,
    #[serde(default)]
    pub custom_fields: std::collections::BTreeMap<String, String>,
}
