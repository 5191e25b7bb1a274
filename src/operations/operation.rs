//! # Operation capability.
//!
//! An [`Operation`] is the opaque save/write action a caller hands to the queue.
//! The queue never looks inside: it only calls [`run`](Operation::run) once per
//! attempt and inspects the result.
//!
//! Each attempt receives its own [`CancellationToken`]. The token is cancelled when
//! the attempt times out or the queue shuts down. The queue does not wait for the
//! operation to honor it; an abandoned attempt may keep running in the background.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::OperationError;

/// # Asynchronous, cancelable write action.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use opqueue::{Operation, OperationError};
///
/// struct SaveRoster;
///
/// #[async_trait]
/// impl Operation for SaveRoster {
///     fn name(&self) -> &str { "save-roster" }
///
///     async fn run(&self, ctx: CancellationToken) -> Result<(), OperationError> {
///         if ctx.is_cancelled() {
///             return Err(OperationError::Canceled);
///         }
///         // write to the store...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Operation: Send + Sync + 'static {
    /// Human-readable label used in logs and events.
    fn name(&self) -> &str;

    /// Performs one attempt.
    async fn run(&self, ctx: CancellationToken) -> Result<(), OperationError>;
}

/// Shared handle to an operation.
pub type OperationRef = Arc<dyn Operation>;
