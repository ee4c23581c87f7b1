//! Workflow execution engine.
//!
//! `WorkflowExecutor` is the central orchestrator:
//! 1. Picks the entry triggers (one explicit trigger, or every manual one).
//! 2. Builds the successor map once.
//! 3. Per trigger, in order: records the trigger as done, then walks its
//!    successors breadth-first, running execute nodes through the tool
//!    gateway one at a time.
//! 4. Stops the whole run at the first failing node.
//!
//! A node runs at most once per run: anything already in the result map is
//! skipped, which also keeps cyclic graphs from looping. Nothing is ever
//! returned as `Err`; every failure ends up in the result's message.

use std::any::Any;
use std::collections::{HashMap, HashSet, VecDeque};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error, info, instrument, warn};

use tools::{ToolGateway, ToolInvocation};

use crate::graph::{build_adjacency, Adjacency};
use crate::models::{TriggerType, Workflow, WorkflowNode};
use crate::state::{
    NodeExecutionState, WorkflowExecutionResult, SKIPPED_RESULT, TRIGGER_NODE_RESULT,
    WORKFLOW_FAILED_MESSAGE,
};
use crate::EngineError;

// ---------------------------------------------------------------------------
// WorkflowExecutor
// ---------------------------------------------------------------------------

/// Runs workflows against a tool gateway.
///
/// Holds no per-run state, so one executor can serve any number of runs,
/// including concurrent ones.
#[derive(Clone)]
pub struct WorkflowExecutor {
    gateway: Arc<dyn ToolGateway>,
}

impl WorkflowExecutor {
    /// Create a new executor.
    pub fn new(gateway: Arc<dyn ToolGateway>) -> Self {
        Self { gateway }
    }

    /// Run the workflow.
    ///
    /// With `trigger_node_id`, that trigger is the only entry point (timed or
    /// external invocation). Without it, every manual trigger is an entry
    /// point, processed in declaration order.
    ///
    /// `on_node_state_change` is called in-line for every transition.
    #[instrument(skip(self, workflow, on_node_state_change), fields(workflow_id = %workflow.id))]
    pub async fn execute_workflow<F>(
        &self,
        workflow: &Workflow,
        trigger_node_id: Option<&str>,
        on_node_state_change: F,
    ) -> WorkflowExecutionResult
    where
        F: FnMut(&str, &NodeExecutionState),
    {
        let triggers = match select_triggers(workflow, trigger_node_id) {
            Ok(triggers) => triggers,
            Err(e) => {
                warn!(error = %e, "workflow not started");
                return WorkflowExecutionResult::failed(&workflow.id, HashMap::new(), e.to_string());
            }
        };

        info!(
            "starting workflow '{}' from {} trigger(s)",
            workflow.name,
            triggers.len()
        );

        // Node lookup map, built once per run. The first node wins on duplicate ids.
        let mut nodes: HashMap<&str, &WorkflowNode> = HashMap::with_capacity(workflow.nodes.len());
        for node in &workflow.nodes {
            nodes.entry(node.id()).or_insert(node);
        }

        let mut run = Run {
            nodes,
            gateway: self.gateway.as_ref(),
            adjacency: build_adjacency(&workflow.connections),
            node_results: HashMap::new(),
            on_state_change: on_node_state_change,
        };

        let outcome = AssertUnwindSafe(run.run_triggers(&triggers))
            .catch_unwind()
            .await;
        let mut node_results = run.node_results;

        match outcome {
            Ok(true) => {
                info!("workflow '{}' succeeded", workflow.name);
                WorkflowExecutionResult::succeeded(&workflow.id, node_results)
            }
            Ok(false) => {
                error!("workflow '{}' failed", workflow.name);
                WorkflowExecutionResult::failed(&workflow.id, node_results, WORKFLOW_FAILED_MESSAGE)
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!("workflow '{}' aborted: {}", workflow.name, message);
                // A node interrupted mid-execution still gets a terminal state.
                for state in node_results.values_mut() {
                    if !state.is_terminal() {
                        *state = NodeExecutionState::Failed(format!(
                            "workflow execution error: {message}"
                        ));
                    }
                }
                WorkflowExecutionResult::failed(
                    &workflow.id,
                    node_results,
                    format!("workflow execution error: {message}"),
                )
            }
        }
    }
}

/// Entry points for one run.
///
/// # Errors
/// - [`EngineError::NoTriggerNodes`] if the workflow has no trigger at all.
/// - [`EngineError::TriggerNotFound`] if `trigger_node_id` names no trigger.
/// - [`EngineError::NoManualTrigger`] for a manual run without manual triggers.
pub fn select_triggers<'w>(
    workflow: &'w Workflow,
    trigger_node_id: Option<&str>,
) -> Result<Vec<&'w WorkflowNode>, EngineError> {
    let triggers: Vec<&WorkflowNode> = workflow.trigger_nodes().collect();
    if triggers.is_empty() {
        return Err(EngineError::NoTriggerNodes);
    }

    match trigger_node_id {
        Some(id) => triggers
            .into_iter()
            .find(|t| t.id() == id)
            .map(|t| vec![t])
            .ok_or_else(|| EngineError::TriggerNotFound(id.to_owned())),
        None => {
            let manual: Vec<&WorkflowNode> = triggers
                .into_iter()
                .filter(|t| t.trigger_type() == Some(TriggerType::Manual))
                .collect();
            if manual.is_empty() {
                Err(EngineError::NoManualTrigger)
            } else {
                Ok(manual)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Internal: state owned by a single run
// ---------------------------------------------------------------------------

struct Run<'a, F> {
    nodes: HashMap<&'a str, &'a WorkflowNode>,
    gateway: &'a dyn ToolGateway,
    adjacency: Adjacency,
    node_results: HashMap<String, NodeExecutionState>,
    on_state_change: F,
}

impl<'a, F> Run<'a, F>
where
    F: FnMut(&str, &NodeExecutionState),
{
    /// Trigger passes, strictly one after another. `false` on first failure.
    async fn run_triggers(&mut self, triggers: &[&'a WorkflowNode]) -> bool {
        for trigger in triggers {
            let trigger_id = trigger.id();

            if self.node_results.contains_key(trigger_id) {
                debug!(node_id = %trigger_id, "trigger already has a result, keeping it");
            } else {
                self.record(trigger_id, NodeExecutionState::Success(TRIGGER_NODE_RESULT.to_owned()));
            }

            if !self.execute_bfs(trigger_id).await {
                error!(trigger_id = %trigger_id, "trigger pass failed, halting run");
                return false;
            }
        }
        true
    }

    /// One BFS pass from the trigger's direct successors.
    async fn execute_bfs(&mut self, trigger_id: &str) -> bool {
        let mut queue: VecDeque<String> = self.successors(trigger_id).into_iter().collect();
        let mut visited: HashSet<String> = HashSet::new();

        while let Some(node_id) = queue.pop_front() {
            if !visited.insert(node_id.clone()) {
                continue;
            }

            if self.node_results.contains_key(&node_id) {
                debug!(node_id = %node_id, "node already executed in this run, skipping");
                continue;
            }

            let Some(&node) = self.nodes.get(node_id.as_str()) else {
                warn!(node_id = %node_id, "connection targets unknown node, skipping");
                continue;
            };

            if !self.execute_node(node).await {
                return false;
            }

            queue.extend(self.successors(&node_id));
        }

        true
    }

    /// Run one node. `true` means keep traversing.
    async fn execute_node(&mut self, node: &'a WorkflowNode) -> bool {
        let WorkflowNode::Execute {
            id,
            name,
            action_type,
            action_config,
            ..
        } = node
        else {
            debug!(node_id = %node.id(), "no action for this node kind, skipping");
            self.record(node.id(), NodeExecutionState::Success(SKIPPED_RESULT.to_owned()));
            return true;
        };

        self.record(id, NodeExecutionState::Running);

        if action_type.trim().is_empty() {
            self.record(
                id,
                NodeExecutionState::Failed(format!("node {name} missing actionType")),
            );
            return false;
        }

        let invocation = ToolInvocation::new(action_type.clone(), action_config.clone());
        let outcome = AssertUnwindSafe(self.gateway.invoke(&invocation))
            .catch_unwind()
            .await;

        let state = match outcome {
            Ok(Ok(result)) if result.success => NodeExecutionState::Success(result.result_text()),
            Ok(Ok(result)) => NodeExecutionState::Failed(
                result
                    .error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| "unknown error".to_owned()),
            ),
            Ok(Err(e)) => NodeExecutionState::Failed(format!("node execution exception: {e}")),
            Err(panic) => NodeExecutionState::Failed(format!(
                "node execution exception: {}",
                panic_message(panic.as_ref())
            )),
        };

        let succeeded = matches!(state, NodeExecutionState::Success(_));
        if succeeded {
            info!(node_id = %id, action = %action_type, "node succeeded");
        } else {
            error!(node_id = %id, action = %action_type, state = %state, "node failed");
        }
        self.record(id, state);
        succeeded
    }

    fn successors(&self, node_id: &str) -> Vec<String> {
        self.adjacency.get(node_id).cloned().unwrap_or_default()
    }

    /// Store first, then notify: a panicking observer must not leave a node
    /// behind in its previous state.
    fn record(&mut self, node_id: &str, state: NodeExecutionState) {
        self.node_results.insert(node_id.to_owned(), state.clone());
        (self.on_state_change)(node_id, &state);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_owned()
    }
}
