//! # Operation descriptor.
//!
//! [`OperationSpec`] describes one unit of work handed to the queue: which
//! [`Operation`](crate::Operation) to run, how urgent it is, how long one attempt may
//! take, and how many retries it gets after the first failure.
//!
//! A spec can be created:
//! - **Explicitly** with [`OperationSpec::new`] and the `with_*` setters
//! - **From config** with [`OperationSpec::with_defaults`]
//! - **Fluently** with [`OperationSpec::builder`]

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::config::Config;
use crate::operations::{OperationRef, Priority};

/// Descriptor for one queued operation.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use opqueue::{OperationFn, OperationRef, OperationSpec, OperationError, Priority};
///
/// let save: OperationRef = OperationFn::arc("save-game", |_ctx: CancellationToken| async move {
///     Ok::<(), OperationError>(())
/// });
///
/// let spec = OperationSpec::new("game-17", save, Priority::High)
///     .with_timeout(Some(Duration::from_secs(2)))
///     .with_max_retries(3);
///
/// assert_eq!(spec.name(), "save-game");
/// assert_eq!(spec.max_retries(), 3);
/// ```
#[derive(Clone)]
pub struct OperationSpec {
    id: Arc<str>,
    operation: OperationRef,
    priority: Priority,
    timeout: Option<Duration>,
    max_retries: u32,
    created_at: SystemTime,
}

impl OperationSpec {
    /// Creates a spec with no timeout and no retries.
    pub fn new(id: impl Into<Arc<str>>, operation: OperationRef, priority: Priority) -> Self {
        Self {
            id: id.into(),
            operation,
            priority,
            timeout: None,
            max_retries: 0,
            created_at: SystemTime::now(),
        }
    }

    /// Creates a spec inheriting timeout and retry budget from `cfg`.
    ///
    /// `cfg.timeout = 0s` is treated as no timeout.
    pub fn with_defaults(
        id: impl Into<Arc<str>>,
        operation: OperationRef,
        priority: Priority,
        cfg: &Config,
    ) -> Self {
        Self::new(id, operation, priority)
            .with_timeout(cfg.default_timeout())
            .with_max_retries(cfg.max_retries)
    }

    /// Caller-supplied identifier (diagnostics only, not required to be unique).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Shared id handle, cheap to clone into events.
    pub(crate) fn id_arc(&self) -> Arc<str> {
        Arc::clone(&self.id)
    }

    /// Operation label.
    pub fn name(&self) -> &str {
        self.operation.name()
    }

    /// The operation itself.
    pub fn operation(&self) -> &OperationRef {
        &self.operation
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Per-attempt deadline, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Additional attempts permitted after the first failure.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// When the spec was created.
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Returns the spec with an updated timeout. `Some(0s)` means no timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|d| *d > Duration::ZERO);
        self
    }

    /// Returns the spec with an updated retry budget.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Returns the spec with an updated priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

impl std::fmt::Debug for OperationSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationSpec")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("priority", &self.priority)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OperationError, OperationFn};
    use tokio_util::sync::CancellationToken;

    fn noop() -> OperationRef {
        OperationFn::arc("noop", |_ctx: CancellationToken| async {
            Ok::<(), OperationError>(())
        })
    }

    #[test]
    fn defaults_come_from_config() {
        let cfg = Config {
            timeout: Duration::from_millis(750),
            max_retries: 4,
            ..Config::default()
        };
        let spec = OperationSpec::with_defaults("a", noop(), Priority::Low, &cfg);
        assert_eq!(spec.timeout(), Some(Duration::from_millis(750)));
        assert_eq!(spec.max_retries(), 4);
        assert_eq!(spec.priority(), Priority::Low);

        let spec = OperationSpec::with_defaults("b", noop(), Priority::Low, &Config::default());
        assert_eq!(spec.timeout(), None);
        assert_eq!(spec.max_retries(), 0);
    }

    #[test]
    fn zero_timeout_means_none() {
        let spec = OperationSpec::new("a", noop(), Priority::High).with_timeout(Some(Duration::ZERO));
        assert_eq!(spec.timeout(), None);
    }
}
