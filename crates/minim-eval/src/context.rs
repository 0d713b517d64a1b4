//! # Evaluation Context
//!
//! Everything a rule evaluation may consult besides the artifact graph: the
//! query capability, both oracles, the liveness cache and the configuration.
//! There is no process-wide state; the context is passed explicitly and
//! shared behind an `Arc` by concurrent evaluations.

use crate::cache::LivenessCache;
use crate::config::EvalConfig;
use crate::error::{ConfigError, EnvironmentError, LivenessCheckError};
use crate::oracle::{
    DisabledEnvironmentOracle, EnvironmentOracle, HttpLivenessOracle, LivenessOracle,
    ProcessEnvironmentOracle,
};
use minim_core::{PatternMatcher, QueryCapability};
use std::sync::Arc;
use tokio::time::timeout;

#[derive(Clone)]
pub struct EvalContext {
    query: Arc<dyn QueryCapability>,
    liveness: Arc<dyn LivenessOracle>,
    environment: Arc<dyn EnvironmentOracle>,
    liveness_cache: Option<LivenessCache>,
    config: EvalConfig,
}

impl std::fmt::Debug for EvalContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvalContext")
            .field("liveness_cache", &self.liveness_cache.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl EvalContext {
    /// Context with the default collaborators: the reference pattern matcher,
    /// the HTTP/file liveness oracle, and a process oracle when commands are
    /// allowed.
    pub fn new(config: EvalConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let liveness: Arc<dyn LivenessOracle> = Arc::new(HttpLivenessOracle::new(&config)?);
        let environment: Arc<dyn EnvironmentOracle> = if config.allow_commands {
            Arc::new(ProcessEnvironmentOracle)
        } else {
            Arc::new(DisabledEnvironmentOracle)
        };
        Ok(Self::with_oracles(config, liveness, environment))
    }

    /// Context with caller-supplied oracles and the reference pattern matcher.
    #[must_use]
    pub fn with_oracles(
        config: EvalConfig,
        liveness: Arc<dyn LivenessOracle>,
        environment: Arc<dyn EnvironmentOracle>,
    ) -> Self {
        let liveness_cache = config
            .liveness_cache
            .then(|| LivenessCache::new(config.liveness_cache_capacity));
        Self {
            query: Arc::new(PatternMatcher::new()),
            liveness,
            environment,
            liveness_cache,
            config,
        }
    }

    /// Replace the query capability.
    #[must_use]
    pub fn with_query(mut self, query: Arc<dyn QueryCapability>) -> Self {
        self.query = query;
        self
    }

    /// Share a liveness cache across contexts (and therefore across runs).
    #[must_use]
    pub fn with_liveness_cache(mut self, cache: LivenessCache) -> Self {
        self.liveness_cache = Some(cache);
        self
    }

    #[must_use]
    pub fn without_liveness_cache(mut self) -> Self {
        self.liveness_cache = None;
        self
    }

    #[must_use]
    pub fn query(&self) -> &dyn QueryCapability {
        self.query.as_ref()
    }

    #[must_use]
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    #[must_use]
    pub fn liveness_cache(&self) -> Option<&LivenessCache> {
        self.liveness_cache.as_ref()
    }

    /// Whether `uri` is live. Failed and timed-out checks count as not live.
    pub async fn probe(&self, uri: &str) -> bool {
        match &self.liveness_cache {
            Some(cache) => cache.get_or_probe(uri, self.probe_uncached(uri)).await,
            None => self.probe_uncached(uri).await,
        }
    }

    async fn probe_uncached(&self, uri: &str) -> bool {
        match self.check_liveness(uri).await {
            Ok(live) => {
                tracing::debug!(uri, live, "liveness probe");
                live
            }
            Err(e) => {
                tracing::warn!(uri, error = %e, "liveness check failed");
                false
            }
        }
    }

    /// One oracle call bounded by the probe timeout.
    pub async fn check_liveness(&self, uri: &str) -> Result<bool, LivenessCheckError> {
        let limit = self.config.probe_timeout();
        timeout(limit, self.liveness.is_live(uri))
            .await
            .map_err(|_| LivenessCheckError::Timeout(limit))?
    }

    /// Run a command bounded by the command timeout.
    pub async fn run_command(&self, command: &str) -> Result<String, EnvironmentError> {
        let limit = self.config.command_timeout();
        timeout(limit, self.environment.run(command))
            .await
            .map_err(|_| EnvironmentError::Timeout(limit))?
    }
}
