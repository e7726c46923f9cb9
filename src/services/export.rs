//! Scene export.
//!
//! An exporter writes the scene file the HTTP listener serves. The server
//! never parses the scene itself beyond the GLB header check that follows
//! every export.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use std::path::Path;

use tokio::process::Command;
use wire::glb::{GlbError, GlbHeader};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to launch `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with {status}: {stderr}")]
    Failed { command: String, status: String, stderr: String },
    #[error("cannot read scene file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("scene file is not a valid GLB: {0}")]
    Invalid(#[from] GlbError),
}

/// Produces the scene file at a given path.
#[async_trait::async_trait]
pub trait SceneExporter: Send + Sync {
    /// Write a fresh scene to `path`.
    async fn export(&self, path: &Path) -> Result<(), ExportError>;

    /// Short label for logs.
    fn describe(&self) -> String;
}

/// Runs a shell command with `GLB_PATH` set to the output path.
pub struct CommandExporter {
    command: String,
}

impl CommandExporter {
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self { command: command.into() }
    }
}

#[async_trait::async_trait]
impl SceneExporter for CommandExporter {
    async fn export(&self, path: &Path) -> Result<(), ExportError> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .env("GLB_PATH", path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ExportError::Launch { command: self.command.clone(), source })?;

        if output.status.success() {
            return Ok(());
        }
        Err(ExportError::Failed {
            command: self.command.clone(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        })
    }

    fn describe(&self) -> String {
        format!("command `{}`", self.command)
    }
}

/// The authoring tool writes the file itself; exporting is a no-op.
pub struct NoopExporter;

#[async_trait::async_trait]
impl SceneExporter for NoopExporter {
    async fn export(&self, _path: &Path) -> Result<(), ExportError> {
        Ok(())
    }

    fn describe(&self) -> String {
        "external writer".to_owned()
    }
}

/// Read `path` and check its GLB header.
///
/// # Errors
///
/// [`ExportError::Read`] if the file cannot be read, [`ExportError::Invalid`]
/// if the header check fails.
pub async fn validate_scene(path: &Path) -> Result<GlbHeader, ExportError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ExportError::Read { path: path.display().to_string(), source })?;
    Ok(GlbHeader::parse(&bytes)?)
}
