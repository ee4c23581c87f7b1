//! Engine-level error types.

use thiserror::Error;

/// Errors produced by the workflow engine.
///
/// The executor folds these into a failed [`crate::WorkflowExecutionResult`];
/// only [`crate::validate_workflow`] hands them to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    // ------ Entry selection ------

    /// The workflow has no trigger node at all.
    #[error("workflow has no trigger nodes")]
    NoTriggerNodes,

    /// An explicit trigger id did not name a trigger node.
    #[error("trigger node '{0}' not found")]
    TriggerNotFound(String),

    /// A manual run was requested but no trigger is manual.
    #[error("workflow has no manual trigger node")]
    NoManualTrigger,

    // ------ Validation ------

    /// Two or more nodes share the same ID.
    #[error("duplicate node ID: '{0}'")]
    DuplicateNodeId(String),
}
