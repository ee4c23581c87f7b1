//! The gateway contract the engine consumes, and the per-tool trait behind
//! the stock registry gateway.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ToolError;

/// A named action plus its string parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    pub parameters: BTreeMap<String, String>,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, parameters: BTreeMap<String, String>) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }

    /// Look up a parameter, failing with [`ToolError::MissingParameter`].
    pub fn required(&self, key: &str) -> Result<&str, ToolError> {
        self.parameters
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ToolError::MissingParameter(key.to_owned()))
    }
}

/// Outcome of one gateway call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub tool_name: String,
    pub success: bool,
    pub result: Value,
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(tool_name: impl Into<String>, result: Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            result,
            error: None,
        }
    }

    pub fn failure(tool_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            result: Value::Null,
            error: Some(error.into()),
        }
    }

    /// The result as display text: JSON strings verbatim, everything else
    /// serialised.
    pub fn result_text(&self) -> String {
        match &self.result {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Resolves a named action to a concrete operation and runs it.
///
/// `Ok` with `success == false` is an ordinary failure; `Err` means the
/// invocation itself blew up. Any timeout is the gateway's business.
#[async_trait]
pub trait ToolGateway: Send + Sync {
    async fn invoke(&self, invocation: &ToolInvocation) -> Result<ToolResult, ToolError>;
}

/// A single tool that can be registered in a [`crate::ToolRegistry`].
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the tool is registered and invoked under.
    fn name(&self) -> &str;

    /// Run the tool and return its JSON output.
    async fn call(&self, invocation: &ToolInvocation) -> Result<Value, ToolError>;
}
