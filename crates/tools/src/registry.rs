//! `ToolRegistry` — the stock [`ToolGateway`], dispatching by tool name.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::builtin::{EchoTool, ListFilesTool, ReadFileTool, SleepTool, WriteFileTool};
use crate::{Tool, ToolError, ToolGateway, ToolInvocation, ToolResult};

/// Settings shared by the built-in tools.
#[derive(Debug, Clone)]
pub struct ToolsConfig {
    /// Directory that relative paths in file tools are resolved against.
    pub base_dir: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
        }
    }
}

/// Maps tool names to [`Tool`] implementations.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-loaded with every built-in tool.
    pub fn with_builtins(config: &ToolsConfig) -> Self {
        let mut registry = Self::new();
        registry.register(EchoTool);
        registry.register(SleepTool);
        registry.register(ReadFileTool::new(config.base_dir.clone()));
        registry.register(WriteFileTool::new(config.base_dir.clone()));
        registry.register(ListFilesTool::new(config.base_dir.clone()));
        registry
    }

    /// Register a tool, replacing any tool already registered under its name.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.name().to_owned(), Arc::new(tool));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[async_trait]
impl ToolGateway for ToolRegistry {
    async fn invoke(&self, invocation: &ToolInvocation) -> Result<ToolResult, ToolError> {
        let Some(tool) = self.tools.get(&invocation.name) else {
            warn!(tool = %invocation.name, "unknown tool");
            return Ok(ToolResult::failure(
                &invocation.name,
                format!("unknown tool: {}", invocation.name),
            ));
        };

        debug!(tool = %invocation.name, params = ?invocation.parameters, "invoking tool");

        match tool.call(invocation).await {
            Ok(value) => Ok(ToolResult::success(&invocation.name, value)),
            Err(e) => {
                warn!(tool = %invocation.name, error = %e, "tool failed");
                Ok(ToolResult::failure(&invocation.name, e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use serde_json::json;

    fn invocation(name: &str, params: &[(&str, &str)]) -> ToolInvocation {
        ToolInvocation::new(
            name,
            params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[tokio::test]
    async fn dispatches_to_registered_tool() {
        let registry = ToolRegistry::with_builtins(&ToolsConfig::default());
        let result = registry
            .invoke(&invocation("echo", &[("msg", "hi")]))
            .await
            .expect("echo never errors");

        assert!(result.success);
        assert_eq!(result.result, json!({ "msg": "hi" }));
    }

    #[tokio::test]
    async fn unknown_tool_is_a_failure_not_an_error() {
        let registry = ToolRegistry::new();
        let result = registry
            .invoke(&invocation("nope", &[]))
            .await
            .expect("unknown tools are reported in-band");

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("unknown tool: nope"));
    }

    #[tokio::test]
    async fn tool_error_becomes_failed_result() {
        let registry = ToolRegistry::with_builtins(&ToolsConfig::default());
        let result = registry
            .invoke(&invocation("read_file", &[]))
            .await
            .expect("tool errors are reported in-band");

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("missing parameter 'path'"));
    }

    #[test]
    fn builtins_are_registered() {
        let registry = ToolRegistry::with_builtins(&ToolsConfig::default());
        assert_eq!(
            registry.names(),
            vec!["echo", "list_files", "read_file", "sleep", "write_file"]
        );
        assert!(registry.contains("sleep"));
    }
}
