//! File Reader
//!
//! Supplies file contents for the `files` field of tasks handed to
//! LLM-backed agents. Injected so tests and embedders can swap the source.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

use crate::error::TaskError;

#[async_trait]
pub trait FileReader: Send + Sync {
    async fn read(&self, path: &str) -> Result<String, TaskError>;
}

/// Reads files from disk, relative to a workspace root
pub struct FsFileReader {
    root: PathBuf,
}

impl FsFileReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve `path` under the root; absolute paths and `..` are refused
    fn resolve(&self, path: &str) -> Result<PathBuf, TaskError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if path.is_empty() || escapes {
            return Err(TaskError::FileRead {
                path: path.to_string(),
                reason: "path outside workspace".to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl FileReader for FsFileReader {
    async fn read(&self, path: &str) -> Result<String, TaskError> {
        let full = self.resolve(path)?;
        tokio::fs::read_to_string(&full)
            .await
            .map_err(|e| TaskError::FileRead {
                path: path.to_string(),
                reason: e.to_string(),
            })
    }
}
