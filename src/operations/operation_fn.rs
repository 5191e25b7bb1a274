//! # Closure-backed operation (`OperationFn`)
//!
//! [`OperationFn`] wraps `F: Fn(CancellationToken) -> Fut` and builds a fresh future
//! for every attempt, so retries never share hidden state. Shared state between
//! attempts goes through an explicit `Arc<...>` captured by the closure.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use opqueue::{OperationFn, OperationRef, OperationError};
//!
//! let op: OperationRef = OperationFn::arc("save-settings", |_ctx: CancellationToken| async move {
//!     Ok::<_, OperationError>(())
//! });
//! assert_eq!(op.name(), "save-settings");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::OperationError;
use crate::operations::operation::Operation;

/// Closure-backed [`Operation`].
#[derive(Debug)]
pub struct OperationFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> OperationFn<F> {
    /// Creates a new closure-backed operation.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the operation and returns it behind an `Arc`.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Operation for OperationFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), OperationError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), OperationError> {
        (self.f)(ctx).await
    }
}
