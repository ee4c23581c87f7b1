//! Core domain models for the workflow engine.
//!
//! These types are the source of truth for what a workflow looks like in
//! memory. They serialise to the camelCase JSON the workflow files use, with
//! nodes tagged by `"type"`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::WorkflowExecutionResult;

// ---------------------------------------------------------------------------
// TriggerType
// ---------------------------------------------------------------------------

/// What starts a trigger node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    /// User-initiated "run now".
    Manual,
    /// Timer / scheduler originated.
    Schedule,
    /// Fired by an external task-automation plugin.
    Tasker,
    /// Fired by a broadcast intent.
    Intent,
}

// ---------------------------------------------------------------------------
// WorkflowNode
// ---------------------------------------------------------------------------

/// A single node in the workflow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowNode {
    /// Entry point. Never runs an action.
    #[serde(rename_all = "camelCase")]
    Trigger {
        id: String,
        name: String,
        #[serde(default)]
        description: String,
        trigger_type: TriggerType,
        #[serde(default)]
        trigger_config: BTreeMap<String, String>,
    },
    /// Runs `action_type` through the tool gateway.
    #[serde(rename_all = "camelCase")]
    Execute {
        id: String,
        name: String,
        #[serde(default)]
        description: String,
        action_type: String,
        #[serde(default)]
        action_config: BTreeMap<String, String>,
    },
    /// Decorative annotation; skipped at run time.
    Note {
        id: String,
        name: String,
        #[serde(default)]
        description: String,
    },
}

impl WorkflowNode {
    /// Manual trigger node.
    pub fn manual_trigger(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::trigger(id, name, TriggerType::Manual)
    }

    pub fn trigger(id: impl Into<String>, name: impl Into<String>, trigger_type: TriggerType) -> Self {
        Self::Trigger {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            trigger_type,
            trigger_config: BTreeMap::new(),
        }
    }

    pub fn execute<I, K, V>(
        id: impl Into<String>,
        name: impl Into<String>,
        action_type: impl Into<String>,
        action_config: I,
    ) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Execute {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            action_type: action_type.into(),
            action_config: action_config
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn note(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Note {
            id: id.into(),
            name: name.into(),
            description: String::new(),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Trigger { id, .. } | Self::Execute { id, .. } | Self::Note { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Trigger { name, .. } | Self::Execute { name, .. } | Self::Note { name, .. } => name,
        }
    }

    /// `Some(trigger_type)` for trigger nodes.
    pub fn trigger_type(&self) -> Option<TriggerType> {
        match self {
            Self::Trigger { trigger_type, .. } => Some(*trigger_type),
            _ => None,
        }
    }

    pub fn is_trigger(&self) -> bool {
        matches!(self, Self::Trigger { .. })
    }
}

// ---------------------------------------------------------------------------
// WorkflowNodeConnection
// ---------------------------------------------------------------------------

/// Directed edge from one node to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowNodeConnection {
    pub source_node_id: String,
    pub target_node_id: String,
}

impl WorkflowNodeConnection {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source_node_id: source.into(),
            target_node_id: target.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// Outcome of the most recent run, as remembered on the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    Failed,
}

/// A complete workflow definition plus its run bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub nodes: Vec<WorkflowNode>,
    #[serde(default)]
    pub connections: Vec<WorkflowNodeConnection>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub last_execution_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_execution_status: Option<ExecutionStatus>,
    #[serde(default)]
    pub total_executions: u64,
    #[serde(default)]
    pub successful_executions: u64,
    #[serde(default)]
    pub failed_executions: u64,
}

impl Workflow {
    /// Convenience constructor with a fresh id.
    pub fn new(
        name: impl Into<String>,
        nodes: Vec<WorkflowNode>,
        connections: Vec<WorkflowNodeConnection>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: String::new(),
            nodes,
            connections,
            created_at: now,
            updated_at: now,
            last_execution_time: None,
            last_execution_status: None,
            total_executions: 0,
            successful_executions: 0,
            failed_executions: 0,
        }
    }

    /// Find a node by id.
    pub fn node(&self, id: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    /// Trigger nodes in declaration order.
    pub fn trigger_nodes(&self) -> impl Iterator<Item = &WorkflowNode> {
        self.nodes.iter().filter(|n| n.is_trigger())
    }

    /// Fold one run's outcome into the execution statistics.
    pub fn record_execution(&mut self, result: &WorkflowExecutionResult) {
        self.total_executions += 1;
        if result.success {
            self.successful_executions += 1;
            self.last_execution_status = Some(ExecutionStatus::Success);
        } else {
            self.failed_executions += 1;
            self.last_execution_status = Some(ExecutionStatus::Failed);
        }
        self.last_execution_time = Some(result.execution_time);
        self.updated_at = result.execution_time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nodes_deserialise_from_tagged_json() {
        let wf: Workflow = serde_json::from_value(json!({
            "id": "wf-1",
            "name": "backup",
            "nodes": [
                { "type": "trigger", "id": "t", "name": "Start", "triggerType": "manual" },
                {
                    "type": "execute", "id": "e", "name": "Copy",
                    "actionType": "write_file",
                    "actionConfig": { "path": "a.txt", "content": "x" }
                },
                { "type": "note", "id": "n", "name": "remember" }
            ],
            "connections": [ { "sourceNodeId": "t", "targetNodeId": "e" } ]
        }))
        .expect("valid workflow json");

        assert_eq!(wf.nodes.len(), 3);
        assert_eq!(wf.node("t").and_then(WorkflowNode::trigger_type), Some(TriggerType::Manual));
        assert!(matches!(
            wf.node("e"),
            Some(WorkflowNode::Execute { action_type, action_config, .. })
                if action_type == "write_file" && action_config["path"] == "a.txt"
        ));
        assert_eq!(wf.connections, vec![WorkflowNodeConnection::new("t", "e")]);
        assert_eq!(wf.total_executions, 0);
    }

    #[test]
    fn trigger_nodes_keep_declaration_order() {
        let wf = Workflow::new(
            "w",
            vec![
                WorkflowNode::trigger("sched", "Timer", TriggerType::Schedule),
                WorkflowNode::execute("e", "E", "echo", [("k", "v")]),
                WorkflowNode::manual_trigger("m", "Manual"),
            ],
            vec![],
        );
        let ids: Vec<&str> = wf.trigger_nodes().map(WorkflowNode::id).collect();
        assert_eq!(ids, vec!["sched", "m"]);
    }

    #[test]
    fn record_execution_updates_counters() {
        let mut wf = Workflow::new("w", vec![], vec![]);
        let ok = WorkflowExecutionResult::succeeded(&wf.id, Default::default());
        let bad = WorkflowExecutionResult::failed(&wf.id, Default::default(), "boom");

        wf.record_execution(&ok);
        wf.record_execution(&bad);

        assert_eq!(wf.total_executions, 2);
        assert_eq!(wf.successful_executions, 1);
        assert_eq!(wf.failed_executions, 1);
        assert_eq!(wf.last_execution_status, Some(ExecutionStatus::Failed));
        assert_eq!(wf.last_execution_time, Some(bad.execution_time));
    }
}
