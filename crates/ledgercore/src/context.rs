//! # Client Context
//!
//! Owns the two process-wide tables of a client: pending commands and resource
//! handles. Contexts are ordinary values, so tests can run several isolated
//! ones side by side. Share one with `Arc`.
//!
//! The context is non-owning with respect to native resources. `shutdown`
//! fails commands that are still waiting, and reports handles that were never
//! released, but releases nothing itself.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use crate::command::PendingCommandTable;
use crate::config::Config;
use crate::error::Error;
use crate::error::ErrorSource;
use crate::error::Result;
use crate::handles::HandleRegistry;
use crate::invoker::AsyncInvoker;
use crate::invoker::CommandFuture;
use crate::value::FromValues;

type Extensions = anymap::Map<dyn anymap::any::Any + Send + Sync>;

/// A staging area for the configuration baked into a `ClientContext`.
pub struct ContextBuilder {
    config: Config,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self { config: Config::default() }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.config.command_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn collect_backtrace(mut self, collect: bool) -> Self {
        self.config.collect_backtrace = collect;
        self
    }

    pub fn crypto_thread_pool_size(mut self, size: usize) -> Self {
        self.config.crypto_thread_pool_size = size;
        self
    }

    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.log_filter = Some(filter.into());
        self
    }

    pub fn build(self) -> ClientContext {
        if let Some(filter) = &self.config.log_filter {
            crate::logging::init(Some(filter));
        }

        ClientContext {
            commands: Arc::new(PendingCommandTable::new()),
            handles: HandleRegistry::new(),
            config: self.config,
            extensions: Mutex::new(Extensions::new()),
            shut_down: AtomicBool::new(false),
        }
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ClientContext {
    commands: Arc<PendingCommandTable>,
    handles: HandleRegistry,
    config: Config,
    extensions: Mutex<Extensions>,
    shut_down: AtomicBool,
}

impl ClientContext {
    /// A context with the default configuration.
    pub fn new() -> Self {
        ContextBuilder::new().build()
    }

    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    pub fn commands(&self) -> &Arc<PendingCommandTable> {
        &self.commands
    }

    pub fn handles(&self) -> &HandleRegistry {
        &self.handles
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// An invoker over this context's pending table, classifying failures
    /// with detail from `source`.
    pub fn invoker(&self, source: Arc<dyn ErrorSource>) -> AsyncInvoker {
        AsyncInvoker::new(self.commands.clone(), source).collect_backtrace(self.config.collect_backtrace)
    }

    /// Awaits `future` for at most the configured command timeout.
    ///
    /// On expiry the pending entry is abandoned. The native command is not
    /// retracted; its eventual completion is discarded.
    pub async fn wait<T: FromValues>(&self, future: CommandFuture<T>) -> Result<T> {
        let id = future.command_id();
        let timeout = self.config.command_timeout();

        match tokio::time::timeout(timeout, future).await {
            Ok(result) => result,
            Err(_) => {
                self.commands.abandon(id);
                tracing::warn!(%id, ?timeout, "gave up waiting for completion");
                Err(Error::timeout(format!("{} did not complete within {:?}", id, timeout)))
            }
        }
    }

    /// Fails with `InvalidState` once `shutdown` has run.
    pub fn ensure_running(&self) -> Result<()> {
        if self.shut_down.load(Ordering::Acquire) {
            return Err(Error::invalid_state("client context has been shut down"));
        }
        Ok(())
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// Stops accepting new work and fails every command still waiting.
    /// Returns how many commands were failed.
    ///
    /// Released tombstones are purged; open handles are kept so they can
    /// still be released synchronously.
    pub fn shutdown(&self) -> usize {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return 0;
        }

        let failed = self.commands.drain_with(&Error::invalid_state("client context shut down"));
        let purged = self.handles.purge_released();
        let leaked = self.handles.live_count();
        if leaked > 0 {
            tracing::warn!(leaked, "client context shut down with handles still open");
        }
        tracing::info!(failed, purged, "client context shut down");
        failed
    }

    /// Shared, lazily created per-type state attached to this context.
    ///
    /// Every caller asking for the same `T` gets the same instance.
    pub fn extension<T: Default + Send + Sync + 'static>(&self) -> Arc<T> {
        let mut extensions = self.extensions.lock().unwrap_or_else(|e| e.into_inner());
        extensions
            .entry::<Arc<T>>()
            .or_insert_with(|| Arc::new(T::default()))
            .clone()
    }
}

impl Default for ClientContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientContext")
            .field("pending", &self.commands.len())
            .field("live_handles", &self.handles.live_count())
            .field("config", &self.config)
            .finish()
    }
}
