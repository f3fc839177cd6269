//! Candidate input - a registration request before it is validated

use serde::{Deserialize, Serialize};

/// Field names owned by the system. Callers can never supply them through the extension
/// side-channel, and extension filters that try to set them are rejected.
pub const RESERVED_FIELDS: &[&str] = &[
    "uid",
    "username",
    "userslug",
    "email",
    "password",
    "joindate",
    "picture",
    "gravatarpicture",
    "uploadedpicture",
    "profileviews",
    "reputation",
    "postcount",
    "lastposttime",
    "banned",
    "status",
];

/// Check whether a field name is system-owned
pub fn is_reserved(key: &str) -> bool {
    RESERVED_FIELDS.contains(&key)
}

/// Raw value of an incoming registration field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(serde_json::Number),
}

impl FieldValue {
    /// Render the value the way it is stored in a hash field
    pub fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

/// Ordered key/value pairs carried alongside the typed fields.
///
/// Keys are unique; setting an existing key replaces its value in place so that the
/// original ordering is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionFields(Vec<(String, String)>);

impl ExtensionFields {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Set a field, replacing any previous value for the same key
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Get a field value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Remove a field, returning its value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(index).1)
    }

    /// Overlay `other` on top of `self`; `other` wins on conflicting keys
    pub fn merge_from(&mut self, other: &ExtensionFields) {
        for (key, value) in other.iter() {
            self.set(key, value);
        }
    }

    /// Keep only the fields accepted by `keep`
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &str) -> bool) {
        self.0.retain(|(k, v)| keep(k, v));
    }

    /// Keys that collide with system-owned fields
    pub fn reserved_keys(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .map(|(k, _)| k.as_str())
            .filter(|k| is_reserved(k))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ExtensionFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (k, v) in iter {
            fields.set(k, v);
        }
        fields
    }
}

/// A registration request as supplied by the caller
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateInput {
    pub username: String,
    pub email: Option<String>,
    pub password: Option<String>,
    pub extensions: ExtensionFields,
}

impl CandidateInput {
    /// Create a candidate with only a username
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extensions.set(key, value);
        self
    }

    /// Build a candidate from a raw key/value mapping.
    ///
    /// `username`, `email` and `password` go to the typed fields; other system-owned keys
    /// are dropped; everything else lands in the extension side-channel. A missing username
    /// yields an empty one, which validation reports as `InvalidUsername`.
    pub fn from_fields<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (String, FieldValue)>,
    {
        let mut candidate = Self::default();

        for (key, value) in fields {
            let text = value.into_text();
            match key.as_str() {
                "username" => candidate.username = text,
                "email" => candidate.email = Some(text),
                "password" => candidate.password = Some(text),
                k if is_reserved(k) => {}
                _ => candidate.extensions.set(key, text),
            }
        }

        candidate
    }
}
