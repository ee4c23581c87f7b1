//! `workflow-runner` CLI entry-point.
//!
//! Available sub-commands:
//! - `validate` — statically check a workflow JSON file.
//! - `run`      — execute a workflow JSON file with the built-in tools.
//!
//! Logs go to stderr (`RUST_LOG`, default `info`); stdout carries node
//! transitions and the final result.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use engine::{validate_workflow, Workflow, WorkflowExecutor};
use tools::{ToolRegistry, ToolsConfig};

#[derive(Parser)]
#[command(
    name = "workflow-runner",
    about = "Run trigger-driven tool workflows",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a workflow definition JSON file.
    Validate {
        /// Path to the workflow JSON file.
        path: PathBuf,
    },
    /// Execute a workflow definition JSON file.
    Run {
        /// Path to the workflow JSON file.
        path: PathBuf,
        /// Start from this trigger node only; otherwise all manual triggers run.
        #[arg(long, env = "WORKFLOW_TRIGGER")]
        trigger: Option<String>,
        /// Directory relative file-tool paths resolve against.
        #[arg(long, env = "WORKFLOW_WORKDIR", default_value = ".")]
        workdir: PathBuf,
        /// Write the workflow back with updated execution statistics.
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Validate { path } => {
            let workflow = load_workflow(&path).await?;

            match validate_workflow(&workflow) {
                Ok(report) => {
                    for conn in &report.dangling_connections {
                        println!(
                            "warning: connection {} -> {} references an unknown node",
                            conn.source_node_id, conn.target_node_id
                        );
                    }
                    if !report.cyclic_nodes.is_empty() {
                        println!("warning: nodes on a cycle: {:?}", report.cyclic_nodes);
                    }
                    if !report.unreachable_nodes.is_empty() {
                        println!("warning: unreachable nodes: {:?}", report.unreachable_nodes);
                    }
                    println!("✅ Workflow '{}' is valid.", workflow.name);
                }
                Err(e) => {
                    eprintln!("❌ Validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Command::Run {
            path,
            trigger,
            workdir,
            save,
        } => {
            let mut workflow = load_workflow(&path).await?;

            let registry = ToolRegistry::with_builtins(&ToolsConfig { base_dir: workdir });
            info!(tools = ?registry.names(), "tool registry ready");
            let executor = WorkflowExecutor::new(Arc::new(registry));

            let result = executor
                .execute_workflow(&workflow, trigger.as_deref(), |node_id, state| {
                    println!("[{node_id}] {state}");
                })
                .await;

            println!(
                "{}",
                serde_json::to_string_pretty(&result).context("cannot serialise result")?
            );

            if save {
                workflow.record_execution(&result);
                let json = serde_json::to_string_pretty(&workflow)
                    .context("cannot serialise workflow")?;
                tokio::fs::write(&path, json)
                    .await
                    .with_context(|| format!("cannot write {}", path.display()))?;
                info!("execution statistics saved to {}", path.display());
            }

            if !result.success {
                warn!("{}", result.message);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

async fn load_workflow(path: &Path) -> Result<Workflow> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read file {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid workflow JSON in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loads_bundled_demo_workflow() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/daily-note.json");
        let workflow = load_workflow(&path).await.expect("demo loads");
        assert_eq!(workflow.id, "daily-note");
        assert_eq!(workflow.trigger_nodes().count(), 2);
    }

    #[tokio::test]
    async fn missing_file_reports_path() {
        let err = load_workflow(Path::new("does/not/exist.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does/not/exist.json"), "{err}");
    }
}
