//! # Caches
//!
//! - [`LivenessCache`]: probe results keyed by URI. Concurrent probes of the
//!   same URI share one oracle call.
//! - [`ModelCache`]: built constraint models keyed by constraint graph
//!   fingerprint.
//!
//! Both are cheap to clone; clones share the same storage.

use minim_core::{ConfigurationError, ConstraintModel, Graph, QueryCapability, fingerprint};
use std::future::Future;
use std::sync::Arc;

/// Liveness results by URI.
#[derive(Debug, Clone)]
pub struct LivenessCache {
    inner: moka::future::Cache<String, bool>,
}

impl LivenessCache {
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: moka::future::Cache::new(capacity),
        }
    }

    /// Cached result for `uri`, or the result of `probe`, which is then stored.
    ///
    /// Callers racing on the same URI wait for a single `probe`.
    pub async fn get_or_probe(&self, uri: &str, probe: impl Future<Output = bool>) -> bool {
        self.inner.get_with(uri.to_string(), probe).await
    }

    pub async fn get(&self, uri: &str) -> Option<bool> {
        self.inner.get(uri).await
    }
}

/// Built constraint models by fingerprint.
#[derive(Debug, Clone)]
pub struct ModelCache {
    inner: moka::sync::Cache<String, Arc<ConstraintModel>>,
}

impl ModelCache {
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: moka::sync::Cache::new(capacity),
        }
    }

    /// The model built from `fragments`, building it on first use.
    ///
    /// The flag is `true` only for the call that built the model; concurrent
    /// callers for the same fingerprint wait for that build.
    pub fn get_or_build(
        &self,
        fragments: &[Graph],
        query: &dyn QueryCapability,
    ) -> Result<(Arc<ConstraintModel>, bool), ConfigurationError> {
        let entry = self
            .inner
            .entry(fingerprint(fragments))
            .or_try_insert_with(|| ConstraintModel::build_fragments(fragments, query).map(Arc::new))
            .map_err(|e| (*e).clone())?;
        let fresh = entry.is_fresh();
        Ok((entry.into_value(), fresh))
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new(64)
    }
}
