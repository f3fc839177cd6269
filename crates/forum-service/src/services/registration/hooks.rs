//! Extension hook registry
//!
//! Filters run before anything is written and may veto the registration or contribute
//! custom fields. Actions are notified after the account exists and cannot affect it.

use std::sync::Arc;

use forum_common::ExtensionPolicy;
use forum_core::{ActionHook, CandidateInput, DomainError, ExtensionFields, FilterHook, UserRecord};
use tracing::{debug, warn};

struct RegisteredFilter {
    priority: i32,
    hook: Arc<dyn FilterHook>,
}

/// Hooks registered at construction time.
///
/// Filters run in ascending priority; equal priorities keep registration order.
#[derive(Clone, Default)]
pub struct HookRegistry {
    filters: Vec<Arc<RegisteredFilter>>,
    actions: Vec<Arc<dyn ActionHook>>,
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("filters", &self.filter_names())
            .field("actions", &self.actions.iter().map(|a| a.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a filter. Lower priorities run first.
    #[must_use]
    pub fn with_filter(mut self, priority: i32, hook: Arc<dyn FilterHook>) -> Self {
        let at = self.filters.partition_point(|f| f.priority <= priority);
        self.filters.insert(at, Arc::new(RegisteredFilter { priority, hook }));
        self
    }

    #[must_use]
    pub fn with_action(mut self, hook: Arc<dyn ActionHook>) -> Self {
        self.actions.push(hook);
        self
    }

    /// Filter names in execution order
    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.hook.name()).collect()
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Run every filter over the candidate, in order.
    ///
    /// Each filter sees the previous filter's output. Filters may only contribute extension
    /// fields: changes to the username, email or password are discarded, and setting a
    /// system-owned field is a rejection. The returned candidate carries the caller's
    /// extension fields overlaid with everything the filters contributed.
    pub async fn before_create(
        &self,
        candidate: CandidateInput,
        policy: &ExtensionPolicy,
    ) -> Result<CandidateInput, DomainError> {
        if self.filters.is_empty() {
            return Ok(candidate);
        }

        let caller_fields = candidate.extensions.clone();
        let mut current = candidate;

        for registered in &self.filters {
            let name = registered.hook.name();
            let mut output = registered
                .hook
                .filter(current.clone())
                .await
                .map_err(|e| DomainError::rejected(name, e))?;

            if let Some(key) = output.extensions.reserved_keys().next() {
                return Err(DomainError::rejected(
                    name,
                    format!("field '{key}' is reserved"),
                ));
            }
            check_bounds(name, &output.extensions, policy)?;

            if output.username != current.username
                || output.email != current.email
                || output.password != current.password
            {
                warn!(hook = name, "Filter changed identity fields; changes discarded");
                output.username = current.username.clone();
                output.email = current.email.clone();
                output.password = current.password.clone();
            }

            debug!(hook = name, fields = output.extensions.len(), "Filter applied");
            current = output;
        }

        let mut merged = caller_fields;
        merged.merge_from(&current.extensions);
        if let Some(last) = self.filters.last() {
            check_bounds(last.hook.name(), &merged, policy)?;
        }
        current.extensions = merged;
        Ok(current)
    }

    /// Notify action hooks without waiting for them. Failures are logged only.
    pub fn fire_created(&self, record: &UserRecord) {
        if self.actions.is_empty() {
            return;
        }

        let actions = self.actions.clone();
        let record = record.clone();
        tokio::spawn(async move {
            for action in actions {
                if let Err(e) = action.on_user_created(&record).await {
                    warn!(hook = action.name(), uid = %record.uid, error = %e, "Action hook failed");
                }
            }
        });
    }
}

fn check_bounds(
    hook: &str,
    fields: &ExtensionFields,
    policy: &ExtensionPolicy,
) -> Result<(), DomainError> {
    if fields.len() > policy.max_fields {
        return Err(DomainError::rejected(
            hook,
            format!("too many custom fields ({} > {})", fields.len(), policy.max_fields),
        ));
    }
    if let Some((key, _)) = fields
        .iter()
        .find(|(_, v)| v.chars().count() > policy.max_value_length)
    {
        return Err(DomainError::rejected(
            hook,
            format!("value of '{key}' exceeds {} characters", policy.max_value_length),
        ));
    }
    Ok(())
}

/// Restrict caller-supplied custom fields to the allow-list and size limits.
///
/// Offending fields are dropped rather than failing the request.
pub fn admit_caller_fields(fields: &mut ExtensionFields, policy: &ExtensionPolicy) {
    let mut kept = 0;
    fields.retain(|key, value| {
        let admit = policy.allows(key)
            && value.chars().count() <= policy.max_value_length
            && kept < policy.max_fields;
        if admit {
            kept += 1;
        } else {
            debug!(field = key, "Dropping custom field");
        }
        admit
    });
}
