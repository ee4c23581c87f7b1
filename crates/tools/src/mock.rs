//! `MockGateway` — a test double for [`ToolGateway`].
//!
//! Scripts an outcome per tool name and records every invocation it receives,
//! so engine tests can assert on call order and call counts.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::{ToolError, ToolGateway, ToolInvocation, ToolResult};

/// Behaviour scripted for one tool name.
#[derive(Debug, Clone)]
pub enum MockBehaviour {
    /// Succeed with a specific JSON value.
    ReturnValue(Value),
    /// Return `success = false` with an optional error text.
    Fail(Option<String>),
    /// Return `Err(ToolError::Execution)`.
    Error(String),
    /// Panic inside `invoke`.
    Panic(String),
}

/// A mock gateway that records every call it receives and answers with a
/// programmer-specified outcome.
#[derive(Clone)]
pub struct MockGateway {
    behaviours: HashMap<String, MockBehaviour>,
    /// Used for tool names without a scripted behaviour.
    fallback: MockBehaviour,
    /// All invocations seen (in call order).
    pub calls: Arc<Mutex<Vec<ToolInvocation>>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    /// A gateway where every tool succeeds with `"ok"`.
    pub fn new() -> Self {
        Self {
            behaviours: HashMap::new(),
            fallback: MockBehaviour::ReturnValue(Value::String("ok".into())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Script the behaviour of one tool.
    pub fn with(mut self, tool: impl Into<String>, behaviour: MockBehaviour) -> Self {
        self.behaviours.insert(tool.into(), behaviour);
        self
    }

    pub fn returning(self, tool: impl Into<String>, value: Value) -> Self {
        self.with(tool, MockBehaviour::ReturnValue(value))
    }

    pub fn failing(self, tool: impl Into<String>, error: Option<&str>) -> Self {
        self.with(tool, MockBehaviour::Fail(error.map(str::to_owned)))
    }

    pub fn erroring(self, tool: impl Into<String>, msg: impl Into<String>) -> Self {
        self.with(tool, MockBehaviour::Error(msg.into()))
    }

    pub fn panicking(self, tool: impl Into<String>, msg: impl Into<String>) -> Self {
        self.with(tool, MockBehaviour::Panic(msg.into()))
    }

    /// Total number of invocations.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Number of invocations of one tool.
    pub fn calls_to(&self, tool: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.name == tool)
            .count()
    }

    /// Tool names in call order.
    pub fn call_order(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }
}

#[async_trait]
impl ToolGateway for MockGateway {
    async fn invoke(&self, invocation: &ToolInvocation) -> Result<ToolResult, ToolError> {
        self.calls.lock().unwrap().push(invocation.clone());

        let behaviour = self
            .behaviours
            .get(&invocation.name)
            .unwrap_or(&self.fallback);

        match behaviour {
            MockBehaviour::ReturnValue(v) => Ok(ToolResult::success(&invocation.name, v.clone())),
            MockBehaviour::Fail(err) => Ok(ToolResult {
                tool_name: invocation.name.clone(),
                success: false,
                result: Value::Null,
                error: err.clone(),
            }),
            MockBehaviour::Error(msg) => Err(ToolError::Execution(msg.clone())),
            MockBehaviour::Panic(msg) => panic!("{msg}"),
        }
    }
}
