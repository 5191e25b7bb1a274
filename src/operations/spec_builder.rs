use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{OperationError, OperationFn, OperationRef, OperationSpec, Priority};

/// Fluent builder for [`OperationSpec`].
///
/// ```rust
/// use std::time::Duration;
/// use opqueue::{OperationSpec, Priority};
///
/// let spec = OperationSpec::builder("save-lineup")
///     .id("lineup-3")
///     .priority(Priority::Critical)
///     .timeout(Duration::from_secs(1))
///     .max_retries(2)
///     .build(|_ctx| async { Ok(()) });
///
/// assert_eq!(spec.id(), "lineup-3");
/// assert_eq!(spec.priority(), Priority::Critical);
/// ```
#[derive(Clone)]
pub struct OperationSpecBuilder {
    name: Cow<'static, str>,
    id: Option<Arc<str>>,
    priority: Priority,
    timeout: Option<Duration>,
    max_retries: u32,
}

impl OperationSpecBuilder {
    /// Starts a builder. Defaults: id = name, `Priority::Medium`, no timeout, no retries.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            id: None,
            priority: Priority::Medium,
            timeout: None,
            max_retries: 0,
        }
    }

    pub fn id(mut self, id: impl Into<Arc<str>>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Builds the spec from a closure.
    pub fn build<F, Fut>(self, f: F) -> OperationSpec
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), OperationError>> + Send + 'static,
    {
        let op: OperationRef = OperationFn::arc(self.name.clone(), f);
        self.build_from(op)
    }

    /// Builds the spec around an existing operation.
    pub fn build_from(self, operation: OperationRef) -> OperationSpec {
        let id = self
            .id
            .unwrap_or_else(|| Arc::from(self.name.as_ref()));
        OperationSpec::new(id, operation, self.priority)
            .with_timeout(self.timeout)
            .with_max_retries(self.max_retries)
    }
}

impl OperationSpec {
    /// Creates a builder with fluent API.
    pub fn builder(name: impl Into<Cow<'static, str>>) -> OperationSpecBuilder {
        OperationSpecBuilder::new(name)
    }
}
