//! Per-node execution state and the run result aggregate.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recorded for a trigger node when its pass starts.
pub const TRIGGER_NODE_RESULT: &str = "触发节点";
/// Recorded for nodes that have no action to run.
pub const SKIPPED_RESULT: &str = "跳过";
/// Run message on success.
pub const WORKFLOW_SUCCEEDED_MESSAGE: &str = "工作流执行成功";
/// Run message when a node failed.
pub const WORKFLOW_FAILED_MESSAGE: &str = "工作流执行失败";

/// State of one node within one run. Absence from the result map means
/// pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum NodeExecutionState {
    Pending,
    Running,
    Success(String),
    Failed(String),
}

impl NodeExecutionState {
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Pending | Self::Running => false,
            Self::Success(_) | Self::Failed(_) => true,
        }
    }
}

impl fmt::Display for NodeExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Success(result) => write!(f, "success: {result}"),
            Self::Failed(error) => write!(f, "failed: {error}"),
        }
    }
}

/// The report returned from one run. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowExecutionResult {
    pub workflow_id: String,
    pub success: bool,
    pub node_results: HashMap<String, NodeExecutionState>,
    pub message: String,
    pub execution_time: DateTime<Utc>,
}

impl WorkflowExecutionResult {
    pub fn succeeded(
        workflow_id: impl Into<String>,
        node_results: HashMap<String, NodeExecutionState>,
    ) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            success: true,
            node_results,
            message: WORKFLOW_SUCCEEDED_MESSAGE.to_owned(),
            execution_time: Utc::now(),
        }
    }

    pub fn failed(
        workflow_id: impl Into<String>,
        node_results: HashMap<String, NodeExecutionState>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            success: false,
            node_results,
            message: message.into(),
            execution_time: Utc::now(),
        }
    }

    pub fn state_of(&self, node_id: &str) -> Option<&NodeExecutionState> {
        self.node_results.get(node_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_success_and_failed_are_terminal() {
        assert!(!NodeExecutionState::Pending.is_terminal());
        assert!(!NodeExecutionState::Running.is_terminal());
        assert!(NodeExecutionState::Success("x".into()).is_terminal());
        assert!(NodeExecutionState::Failed("x".into()).is_terminal());
    }

    #[test]
    fn state_serialises_with_status_tag() {
        let json = serde_json::to_value(NodeExecutionState::Failed("boom".into())).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "failed", "detail": "boom" }));

        let json = serde_json::to_value(NodeExecutionState::Running).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "running" }));
    }
}
