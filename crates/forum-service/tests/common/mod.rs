//! Shared fixtures for pipeline tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use forum_common::RegistrationConfig;
use forum_core::{
    ActionHook, BoxError, CandidateInput, DomainError, EmailVerifier, FilterHook, KeyValueStore,
    PasswordHasher, RepoResult, Uid, UserRecord,
};
use forum_service::{HookRegistry, ServiceContext, ServiceContextBuilder};
use forum_store::MemoryStore;
use parking_lot::Mutex;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    SetObject,
    GetObject,
    Delete,
    SetField,
    SetFieldIfAbsent,
    GetField,
    IsField,
    DeleteField,
    Increment,
    SortedSetAdd,
    SortedSetRemove,
    SortedSetScore,
    SortedSetCard,
    SortedSetRange,
}

impl Op {
    pub fn is_write(self) -> bool {
        matches!(
            self,
            Self::SetObject
                | Self::Delete
                | Self::SetField
                | Self::SetFieldIfAbsent
                | Self::DeleteField
                | Self::Increment
                | Self::SortedSetAdd
                | Self::SortedSetRemove
        )
    }
}

/// Memory store that records every call and fails on demand
#[derive(Default)]
pub struct FaultyStore {
    inner: MemoryStore,
    faults: Mutex<Vec<(Op, String)>>,
    hidden: Mutex<Vec<String>>,
    log: Mutex<Vec<(Op, String)>>,
}

impl FaultyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fail `op` on every key starting with `prefix`
    pub fn fail(&self, op: Op, prefix: &str) {
        self.faults.lock().push((op, prefix.to_string()));
    }

    pub fn clear_faults(&self) {
        self.faults.lock().clear();
    }

    /// Make field-existence lookups on `key` always answer "absent"
    pub fn hide_lookups(&self, key: &str) {
        self.hidden.lock().push(key.to_string());
    }

    pub fn writes(&self) -> Vec<(Op, String)> {
        self.log
            .lock()
            .iter()
            .filter(|(op, _)| op.is_write())
            .cloned()
            .collect()
    }

    fn check(&self, op: Op, key: &str) -> RepoResult<()> {
        self.log.lock().push((op, key.to_string()));
        let failing = self
            .faults
            .lock()
            .iter()
            .any(|(o, prefix)| *o == op && key.starts_with(prefix.as_str()));
        if failing {
            Err(DomainError::StorageError(format!("injected {op:?} failure on {key}")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KeyValueStore for FaultyStore {
    async fn set_object(&self, key: &str, fields: &[(String, String)]) -> RepoResult<()> {
        self.check(Op::SetObject, key)?;
        self.inner.set_object(key, fields).await
    }

    async fn get_object(&self, key: &str) -> RepoResult<Option<HashMap<String, String>>> {
        self.check(Op::GetObject, key)?;
        self.inner.get_object(key).await
    }

    async fn delete(&self, key: &str) -> RepoResult<()> {
        self.check(Op::Delete, key)?;
        self.inner.delete(key).await
    }

    async fn set_object_field(&self, key: &str, field: &str, value: &str) -> RepoResult<()> {
        self.check(Op::SetField, key)?;
        self.inner.set_object_field(key, field, value).await
    }

    async fn set_object_field_if_absent(
        &self,
        key: &str,
        field: &str,
        value: &str,
    ) -> RepoResult<bool> {
        self.check(Op::SetFieldIfAbsent, key)?;
        self.inner.set_object_field_if_absent(key, field, value).await
    }

    async fn get_object_field(&self, key: &str, field: &str) -> RepoResult<Option<String>> {
        self.check(Op::GetField, key)?;
        self.inner.get_object_field(key, field).await
    }

    async fn is_object_field(&self, key: &str, field: &str) -> RepoResult<bool> {
        self.check(Op::IsField, key)?;
        if self.hidden.lock().iter().any(|k| k == key) {
            return Ok(false);
        }
        self.inner.is_object_field(key, field).await
    }

    async fn delete_object_field(&self, key: &str, field: &str) -> RepoResult<()> {
        self.check(Op::DeleteField, key)?;
        self.inner.delete_object_field(key, field).await
    }

    async fn increment_object_field(&self, key: &str, field: &str) -> RepoResult<i64> {
        self.check(Op::Increment, key)?;
        self.inner.increment_object_field(key, field).await
    }

    async fn sorted_set_add(&self, key: &str, score: f64, member: &str) -> RepoResult<bool> {
        self.check(Op::SortedSetAdd, key)?;
        self.inner.sorted_set_add(key, score, member).await
    }

    async fn sorted_set_remove(&self, key: &str, member: &str) -> RepoResult<()> {
        self.check(Op::SortedSetRemove, key)?;
        self.inner.sorted_set_remove(key, member).await
    }

    async fn sorted_set_score(&self, key: &str, member: &str) -> RepoResult<Option<f64>> {
        self.check(Op::SortedSetScore, key)?;
        self.inner.sorted_set_score(key, member).await
    }

    async fn sorted_set_card(&self, key: &str) -> RepoResult<u64> {
        self.check(Op::SortedSetCard, key)?;
        self.inner.sorted_set_card(key).await
    }

    async fn sorted_set_range(&self, key: &str, start: i64, stop: i64) -> RepoResult<Vec<String>> {
        self.check(Op::SortedSetRange, key)?;
        self.inner.sorted_set_range(key, start, stop).await
    }
}

/// Email verifier that records who it was asked to verify
#[derive(Default)]
pub struct RecordingVerifier {
    pub calls: Mutex<Vec<(Uid, String)>>,
}

#[async_trait]
impl EmailVerifier for RecordingVerifier {
    async fn verify_email(&self, uid: Uid, email: &str) -> RepoResult<()> {
        self.calls.lock().push((uid, email.to_string()));
        Ok(())
    }
}

/// Cheap stand-in so tests do not pay for Argon2
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, BoxError> {
        Ok(format!("plain${}", password.len()))
    }
}

pub struct BrokenHasher;

impl PasswordHasher for BrokenHasher {
    fn hash(&self, _password: &str) -> Result<String, BoxError> {
        Err("hasher offline".into())
    }
}

/// Filter that always vetoes
pub struct ClosedRegistrations;

#[async_trait]
impl FilterHook for ClosedRegistrations {
    fn name(&self) -> &str {
        "closed-registrations"
    }

    async fn filter(&self, _candidate: CandidateInput) -> Result<CandidateInput, BoxError> {
        Err("registrations are closed".into())
    }
}

/// Filter that adds one custom field
pub struct AddField(pub &'static str, pub &'static str);

#[async_trait]
impl FilterHook for AddField {
    fn name(&self) -> &str {
        "add-field"
    }

    async fn filter(&self, mut candidate: CandidateInput) -> Result<CandidateInput, BoxError> {
        candidate.extensions.set(self.0, self.1);
        Ok(candidate)
    }
}

/// Action hook that forwards created records to a channel
pub struct ForwardCreated(pub mpsc::UnboundedSender<UserRecord>);

#[async_trait]
impl ActionHook for ForwardCreated {
    fn name(&self) -> &str {
        "forward-created"
    }

    async fn on_user_created(&self, record: &UserRecord) -> Result<(), BoxError> {
        self.0.send(record.clone())?;
        Ok(())
    }
}

pub struct Fixture {
    pub store: Arc<FaultyStore>,
    pub verifier: Arc<RecordingVerifier>,
    pub ctx: ServiceContext,
}

pub fn fixture() -> Fixture {
    fixture_with(HookRegistry::new(), RegistrationConfig::default())
}

pub fn fixture_with(hooks: HookRegistry, registration: RegistrationConfig) -> Fixture {
    let store = FaultyStore::new();
    let verifier = Arc::new(RecordingVerifier::default());
    let ctx = ServiceContextBuilder::new()
        .store(store.clone())
        .verifier(verifier.clone())
        .hasher(Arc::new(PlainHasher))
        .hooks(hooks)
        .registration(registration)
        .build()
        .expect("context");
    Fixture {
        store,
        verifier,
        ctx,
    }
}
