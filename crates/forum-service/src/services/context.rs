//! Service context - dependency container for services

use std::sync::Arc;

use forum_common::{Argon2PasswordHasher, RegistrationConfig};
use forum_core::{EmailVerifier, GroupDirectory, KeyValueStore, PasswordHasher};
use forum_store::{StoreEmailVerifier, StoreGroupDirectory};

use super::error::{ServiceError, ServiceResult};
use super::registration::{CreationOrchestrator, HookRegistry, IndexRepairer};

/// Everything services need, wired once at startup
#[derive(Clone)]
pub struct ServiceContext {
    store: Arc<dyn KeyValueStore>,
    groups: Arc<dyn GroupDirectory>,
    hooks: Arc<HookRegistry>,
    registration: Arc<RegistrationConfig>,
    orchestrator: CreationOrchestrator,
}

impl ServiceContext {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        groups: Arc<dyn GroupDirectory>,
        verifier: Arc<dyn EmailVerifier>,
        hasher: Arc<dyn PasswordHasher>,
        hooks: Arc<HookRegistry>,
        registration: Arc<RegistrationConfig>,
    ) -> Self {
        let orchestrator = CreationOrchestrator::new(
            Arc::clone(&store),
            Arc::clone(&groups),
            verifier,
            hasher,
            Arc::clone(&hooks),
            Arc::clone(&registration),
        );

        Self {
            store,
            groups,
            hooks,
            registration,
            orchestrator,
        }
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn hooks(&self) -> &HookRegistry {
        self.hooks.as_ref()
    }

    pub fn registration(&self) -> &RegistrationConfig {
        self.registration.as_ref()
    }

    pub fn orchestrator(&self) -> &CreationOrchestrator {
        &self.orchestrator
    }

    /// Reconciliation over the same store and group directory
    pub fn repairer(&self) -> IndexRepairer {
        IndexRepairer::new(
            Arc::clone(&self.store),
            Arc::clone(&self.groups),
            self.registration.default_group.clone(),
        )
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("store", &"dyn KeyValueStore")
            .field("hooks", &self.hooks)
            .field("default_group", &self.registration.default_group)
            .finish()
    }
}

/// Builder for [`ServiceContext`].
///
/// Only the store is required. Groups and email confirmation default to the store-backed
/// implementations and hashing defaults to Argon2id.
#[derive(Default)]
pub struct ServiceContextBuilder {
    store: Option<Arc<dyn KeyValueStore>>,
    groups: Option<Arc<dyn GroupDirectory>>,
    verifier: Option<Arc<dyn EmailVerifier>>,
    hasher: Option<Arc<dyn PasswordHasher>>,
    hooks: Option<HookRegistry>,
    registration: Option<RegistrationConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn groups(mut self, groups: Arc<dyn GroupDirectory>) -> Self {
        self.groups = Some(groups);
        self
    }

    pub fn verifier(mut self, verifier: Arc<dyn EmailVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn hasher(mut self, hasher: Arc<dyn PasswordHasher>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    pub fn hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn registration(mut self, config: RegistrationConfig) -> Self {
        self.registration = Some(config);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if no store was given
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let store = self
            .store
            .ok_or_else(|| ServiceError::validation("store is required"))?;
        let registration = self.registration.unwrap_or_default();

        let groups = self
            .groups
            .unwrap_or_else(|| Arc::new(StoreGroupDirectory::new(Arc::clone(&store))));
        let verifier = self.verifier.unwrap_or_else(|| {
            Arc::new(StoreEmailVerifier::new(
                Arc::clone(&store),
                registration.email_confirm_ttl_seconds,
            ))
        });
        let hasher = self
            .hasher
            .unwrap_or_else(|| Arc::new(Argon2PasswordHasher::new()));

        Ok(ServiceContext::new(
            store,
            groups,
            verifier,
            hasher,
            Arc::new(self.hooks.unwrap_or_default()),
            Arc::new(registration),
        ))
    }
}
