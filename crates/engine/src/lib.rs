//! `engine` crate — workflow models, graph helpers, and the execution engine.

pub mod error;
pub mod events;
pub mod executor;
pub mod graph;
pub mod models;
pub mod state;

pub use error::EngineError;
pub use events::{channel_observer, NodeStateEvent};
pub use executor::{select_triggers, WorkflowExecutor};
pub use graph::{build_adjacency, validate_workflow, ValidationReport};
pub use models::{TriggerType, Workflow, WorkflowNode, WorkflowNodeConnection};
pub use state::{NodeExecutionState, WorkflowExecutionResult};
