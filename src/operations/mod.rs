//! # Operation abstractions and specifications.
//!
//! This module provides the operation-related types:
//! - [`Priority`] - urgency level, selects the bucket an operation waits in
//! - [`Operation`] - trait for async save/write actions
//! - [`OperationFn`] - closure-backed implementation
//! - [`OperationRef`] - shared reference to an operation (`Arc<dyn Operation>`)
//! - [`OperationSpec`] - descriptor bundling an operation with priority, timeout and retry budget

mod operation;
mod operation_fn;
mod priority;
mod spec;
mod spec_builder;

pub use operation::{Operation, OperationRef};
pub use operation_fn::OperationFn;
pub use priority::Priority;
pub use spec::OperationSpec;
pub use spec_builder::OperationSpecBuilder;
