//! Built-in tools shipped with the default registry.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;

use crate::{Tool, ToolError, ToolInvocation};

/// Returns its parameters as a JSON object.
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    async fn call(&self, invocation: &ToolInvocation) -> Result<Value, ToolError> {
        Ok(json!(invocation.parameters))
    }
}

/// Waits `duration_ms` milliseconds.
pub struct SleepTool;

#[async_trait]
impl Tool for SleepTool {
    fn name(&self) -> &str {
        "sleep"
    }

    async fn call(&self, invocation: &ToolInvocation) -> Result<Value, ToolError> {
        let raw = invocation.required("duration_ms")?;
        let ms: u64 = raw.parse().map_err(|_| ToolError::InvalidParameter {
            name: "duration_ms".into(),
            message: format!("expected a non-negative integer, got '{raw}'"),
        })?;

        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(json!({ "slept_ms": ms }))
    }
}

fn resolve(base_dir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/// Reads a UTF-8 file and returns its contents.
pub struct ReadFileTool {
    base_dir: PathBuf,
}

impl ReadFileTool {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    async fn call(&self, invocation: &ToolInvocation) -> Result<Value, ToolError> {
        let path = resolve(&self.base_dir, invocation.required("path")?);
        let content = tokio::fs::read_to_string(&path).await?;
        Ok(Value::String(content))
    }
}

/// Writes (or appends, with `append=true`) `content` to `path`.
pub struct WriteFileTool {
    base_dir: PathBuf,
}

impl WriteFileTool {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    async fn call(&self, invocation: &ToolInvocation) -> Result<Value, ToolError> {
        let path = resolve(&self.base_dir, invocation.required("path")?);
        let content = invocation.required("content")?;
        let append = match invocation.parameters.get("append").map(String::as_str) {
            None | Some("false") => false,
            Some("true") => true,
            Some(other) => {
                return Err(ToolError::InvalidParameter {
                    name: "append".into(),
                    message: format!("expected 'true' or 'false', got '{other}'"),
                })
            }
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(&path)
            .await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;

        Ok(json!({
            "path": path.display().to_string(),
            "bytes_written": content.len(),
        }))
    }
}

/// Lists the entries of a directory, sorted by name.
pub struct ListFilesTool {
    base_dir: PathBuf,
}

impl ListFilesTool {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }
}

#[async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &str {
        "list_files"
    }

    async fn call(&self, invocation: &ToolInvocation) -> Result<Value, ToolError> {
        let path = resolve(&self.base_dir, invocation.required("path")?);
        let mut entries = tokio::fs::read_dir(&path).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(json!(names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn invocation(name: &str, params: &[(&str, &str)]) -> ToolInvocation {
        ToolInvocation::new(
            name,
            params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn sleep_reports_duration() {
        let out = SleepTool
            .call(&invocation("sleep", &[("duration_ms", "250")]))
            .await
            .unwrap();
        assert_eq!(out, json!({ "slept_ms": 250 }));
    }

    #[tokio::test]
    async fn sleep_rejects_non_numeric_duration() {
        let err = SleepTool
            .call(&invocation("sleep", &[("duration_ms", "soon")]))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParameter { name, .. } if name == "duration_ms"));
    }

    #[tokio::test]
    async fn write_append_read_and_list() {
        let dir = TempDir::new().unwrap();
        let write = WriteFileTool::new(dir.path().to_path_buf());
        let read = ReadFileTool::new(dir.path().to_path_buf());
        let list = ListFilesTool::new(dir.path().to_path_buf());

        write
            .call(&invocation("write_file", &[("path", "out/log.txt"), ("content", "one\n")]))
            .await
            .unwrap();
        write
            .call(&invocation(
                "write_file",
                &[("path", "out/log.txt"), ("content", "two\n"), ("append", "true")],
            ))
            .await
            .unwrap();

        let content = read
            .call(&invocation("read_file", &[("path", "out/log.txt")]))
            .await
            .unwrap();
        assert_eq!(content, json!("one\ntwo\n"));

        let listing = list
            .call(&invocation("list_files", &[("path", "out")]))
            .await
            .unwrap();
        assert_eq!(listing, json!(["log.txt"]));
    }

    #[tokio::test]
    async fn read_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = ReadFileTool::new(dir.path().to_path_buf())
            .call(&invocation("read_file", &[("path", "absent.txt")]))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Io(_)));
    }
}
