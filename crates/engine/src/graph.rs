//! Graph helpers: the successor map the executor walks, and a static check
//! to run before persisting a workflow.
//!
//! `validate_workflow` rules:
//! 1. Node IDs must be unique within the workflow (hard error).
//! 2. There must be at least one trigger node (hard error).
//! 3. Connections to or from unknown nodes are reported, not rejected.
//! 4. Nodes left over by a topological sort sit on a cycle and are reported.
//! 5. Nodes no trigger can reach are reported.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::models::{Workflow, WorkflowNodeConnection};
use crate::EngineError;

/// Successor ids per source id, in connection order. Duplicates are kept.
pub type Adjacency = HashMap<String, Vec<String>>;

/// Build the successor map from a flat connection list.
pub fn build_adjacency(connections: &[WorkflowNodeConnection]) -> Adjacency {
    let mut adjacency: Adjacency = HashMap::new();
    for conn in connections {
        adjacency
            .entry(conn.source_node_id.clone())
            .or_default()
            .push(conn.target_node_id.clone());
    }
    adjacency
}

/// Soft findings from [`validate_workflow`]. None of these stop a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Connections whose source or target is not a node of the workflow.
    pub dangling_connections: Vec<WorkflowNodeConnection>,
    /// Nodes on (or only reachable through) a cycle, sorted.
    pub cyclic_nodes: Vec<String>,
    /// Nodes no trigger can reach, sorted. Triggers themselves are excluded.
    pub unreachable_nodes: Vec<String>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.dangling_connections.is_empty()
            && self.cyclic_nodes.is_empty()
            && self.unreachable_nodes.is_empty()
    }
}

/// Statically check a workflow.
///
/// # Errors
/// - [`EngineError::DuplicateNodeId`] if two nodes share an ID.
/// - [`EngineError::NoTriggerNodes`] if nothing can start the workflow.
pub fn validate_workflow(workflow: &Workflow) -> Result<ValidationReport, EngineError> {
    // -----------------------------------------------------------------------
    // 1. Unique ids
    // -----------------------------------------------------------------------
    let mut node_set: HashSet<&str> = HashSet::new();
    for node in &workflow.nodes {
        if !node_set.insert(node.id()) {
            return Err(EngineError::DuplicateNodeId(node.id().to_owned()));
        }
    }

    // -----------------------------------------------------------------------
    // 2. At least one trigger
    // -----------------------------------------------------------------------
    if workflow.trigger_nodes().next().is_none() {
        return Err(EngineError::NoTriggerNodes);
    }

    // -----------------------------------------------------------------------
    // 3. Dangling connections
    // -----------------------------------------------------------------------
    let (valid, dangling): (Vec<&WorkflowNodeConnection>, Vec<&WorkflowNodeConnection>) = workflow
        .connections
        .iter()
        .partition(|c| {
            node_set.contains(c.source_node_id.as_str())
                && node_set.contains(c.target_node_id.as_str())
        });

    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut in_degree: HashMap<&str, usize> = node_set.iter().map(|&id| (id, 0)).collect();
    for conn in &valid {
        adjacency
            .entry(conn.source_node_id.as_str())
            .or_default()
            .push(conn.target_node_id.as_str());
        *in_degree.entry(conn.target_node_id.as_str()).or_insert(0) += 1;
    }

    // -----------------------------------------------------------------------
    // 4. Kahn's algorithm; whatever never reaches in-degree 0 is cyclic
    // -----------------------------------------------------------------------
    let mut queue: VecDeque<&str> = in_degree
        .iter()
        .filter(|(_, &d)| d == 0)
        .map(|(&id, _)| id)
        .collect();
    let mut sorted: HashSet<&str> = HashSet::with_capacity(node_set.len());

    while let Some(node_id) = queue.pop_front() {
        sorted.insert(node_id);
        for &next in adjacency.get(node_id).into_iter().flatten() {
            if let Some(deg) = in_degree.get_mut(next) {
                *deg -= 1;
                if *deg == 0 {
                    queue.push_back(next);
                }
            }
        }
    }

    let mut cyclic_nodes: Vec<String> = node_set
        .iter()
        .filter(|id| !sorted.contains(*id))
        .map(|id| (*id).to_owned())
        .collect();
    cyclic_nodes.sort();

    // -----------------------------------------------------------------------
    // 5. Reachability from every trigger
    // -----------------------------------------------------------------------
    let mut reached: HashSet<&str> = workflow.trigger_nodes().map(|n| n.id()).collect();
    let mut frontier: VecDeque<&str> = reached.iter().copied().collect();
    while let Some(node_id) = frontier.pop_front() {
        for &next in adjacency.get(node_id).into_iter().flatten() {
            if reached.insert(next) {
                frontier.push_back(next);
            }
        }
    }

    let mut unreachable_nodes: Vec<String> = node_set
        .iter()
        .filter(|id| !reached.contains(*id))
        .map(|id| (*id).to_owned())
        .collect();
    unreachable_nodes.sort();

    Ok(ValidationReport {
        dangling_connections: dangling.into_iter().cloned().collect(),
        cyclic_nodes,
        unreachable_nodes,
    })
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkflowNode;

    fn conn(from: &str, to: &str) -> WorkflowNodeConnection {
        WorkflowNodeConnection::new(from, to)
    }

    fn exec(id: &str) -> WorkflowNode {
        WorkflowNode::execute(id, id, "echo", Vec::<(String, String)>::new())
    }

    #[test]
    fn empty_connections_build_empty_map() {
        assert!(build_adjacency(&[]).is_empty());
    }

    #[test]
    fn fan_out_keeps_input_order_and_duplicates() {
        let adjacency = build_adjacency(&[
            conn("a", "c"),
            conn("a", "b"),
            conn("a", "d"),
            conn("a", "b"),
        ]);
        assert_eq!(adjacency.len(), 1);
        assert_eq!(adjacency["a"], vec!["c", "b", "d", "b"]);
    }

    #[test]
    fn clean_linear_workflow() {
        let wf = Workflow::new(
            "ok",
            vec![WorkflowNode::manual_trigger("t", "T"), exec("a"), exec("b")],
            vec![conn("t", "a"), conn("a", "b")],
        );
        let report = validate_workflow(&wf).expect("valid workflow");
        assert!(report.is_clean());
    }

    #[test]
    fn duplicate_node_id_is_rejected() {
        let wf = Workflow::new(
            "dup",
            vec![WorkflowNode::manual_trigger("t", "T"), exec("a"), exec("a")],
            vec![],
        );
        assert_eq!(
            validate_workflow(&wf),
            Err(EngineError::DuplicateNodeId("a".into()))
        );
    }

    #[test]
    fn workflow_without_trigger_is_rejected() {
        let wf = Workflow::new("none", vec![exec("a")], vec![]);
        assert_eq!(validate_workflow(&wf), Err(EngineError::NoTriggerNodes));
    }

    #[test]
    fn dangling_connection_is_reported() {
        let wf = Workflow::new(
            "ghost",
            vec![WorkflowNode::manual_trigger("t", "T"), exec("a")],
            vec![conn("t", "a"), conn("a", "ghost")],
        );
        let report = validate_workflow(&wf).expect("dangling edges are soft");
        assert_eq!(report.dangling_connections, vec![conn("a", "ghost")]);
        assert!(report.cyclic_nodes.is_empty());
    }

    #[test]
    fn cycle_and_unreachable_nodes_are_reported() {
        // t → a → b → a (cycle), c stands alone
        let wf = Workflow::new(
            "loop",
            vec![WorkflowNode::manual_trigger("t", "T"), exec("a"), exec("b"), exec("c")],
            vec![conn("t", "a"), conn("a", "b"), conn("b", "a")],
        );
        let report = validate_workflow(&wf).expect("cycles are soft");
        assert_eq!(report.cyclic_nodes, vec!["a", "b"]);
        assert_eq!(report.unreachable_nodes, vec!["c"]);
    }

    #[test]
    fn bundled_demo_workflow_is_clean() {
        let wf: Workflow =
            serde_json::from_str(include_str!("../../../demos/daily-note.json")).expect("demo parses");
        let report = validate_workflow(&wf).expect("demo is valid");
        assert!(report.is_clean(), "{report:?}");
    }
}
