// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Docker runtime client backed by the `docker` CLI.
//!
//! Each capability call runs one `docker` subcommand, except the graceful
//! stop, which signals and then waits. Failures are classified
//! from the CLI's stderr: daemon connection errors become
//! [`RuntimeError::Unavailable`], "is not running" becomes
//! [`RuntimeError::NotRunning`], and missing objects become
//! [`RuntimeError::NotFound`].

use super::{ImageSummary, RuntimeClient, RuntimeError, StopReport};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tether_core::{ContainerId, ImageRef};

/// Signal sent for a graceful stop.
const STOP_SIGNAL: &str = "SIGTERM";

/// Runtime client that shells out to the docker CLI.
#[derive(Clone, Debug)]
pub struct DockerCliClient {
    binary: PathBuf,
    host: Option<String>,
}

impl Default for DockerCliClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DockerCliClient {
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("docker"),
            host: None,
        }
    }

    /// Use a specific docker executable
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Talk to a specific daemon (`--host`)
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Run a docker CLI command and return trimmed stdout on success.
    async fn run_docker(&self, args: &[&str]) -> Result<String, RuntimeError> {
        let mut cmd = tokio::process::Command::new(&self.binary);
        if let Some(host) = &self.host {
            cmd.arg("--host").arg(host);
        }
        cmd.args(args).kill_on_drop(true);

        let start = Instant::now();
        let output = cmd.output().await.map_err(|e| {
            RuntimeError::Unavailable(format!(
                "failed to exec {}: {}",
                self.binary.display(),
                e
            ))
        })?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        if output.status.success() {
            tracing::debug!(?args, elapsed_ms, "docker command succeeded");
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!(?args, elapsed_ms, stderr = %stderr.trim(), "docker command failed");
            Err(classify_failure(args.first().copied().unwrap_or(""), stderr.trim()))
        }
    }
}

#[async_trait]
impl RuntimeClient for DockerCliClient {
    async fn list_images(&self) -> Result<Vec<ImageSummary>, RuntimeError> {
        let stdout = self
            .run_docker(&["image", "ls", "--no-trunc", "--format", "{{json .}}"])
            .await?;
        parse_image_lines(&stdout)
    }

    async fn pull_image(&self, image: &ImageRef) -> Result<(), RuntimeError> {
        let reference = image.to_string();
        tracing::info!(image = %reference, "pulling image");
        self.run_docker(&["pull", "--quiet", &reference]).await?;
        Ok(())
    }

    async fn create_container(
        &self,
        image: &ImageRef,
        command: &[String],
    ) -> Result<ContainerId, RuntimeError> {
        let reference = image.to_string();
        let mut args = vec!["create", reference.as_str()];
        args.extend(command.iter().map(String::as_str));

        let stdout = self.run_docker(&args).await?;
        // docker may print pull progress before the id; the id is the last line
        let id = stdout.lines().next_back().map(str::trim).unwrap_or("");
        if id.is_empty() {
            return Err(RuntimeError::Rejected("docker create returned no container id".into()));
        }
        Ok(ContainerId::new(id))
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), RuntimeError> {
        self.run_docker(&["start", id.as_str()]).await?;
        Ok(())
    }

    async fn stop_container(
        &self,
        id: &ContainerId,
        grace: Duration,
    ) -> Result<StopReport, RuntimeError> {
        // Not `docker stop`: it SIGKILLs on timeout, and the kill belongs to the caller
        match self.run_docker(&["kill", "--signal", STOP_SIGNAL, id.as_str()]).await {
            Ok(_) => {}
            Err(RuntimeError::NotRunning(_)) => {
                return Ok(StopReport {
                    exited_in_time: true,
                });
            }
            Err(e) => return Err(e),
        }

        match tokio::time::timeout(grace, self.run_docker(&["wait", id.as_str()])).await {
            Ok(stdout) => {
                let exit_code = parse_exit_code(&stdout?)?;
                tracing::debug!(container_id = %id.short(12), exit_code, "container exited");
                Ok(StopReport {
                    exited_in_time: true,
                })
            }
            Err(_) => Ok(StopReport {
                exited_in_time: false,
            }),
        }
    }

    async fn kill_container(&self, id: &ContainerId, signal: &str) -> Result<(), RuntimeError> {
        self.run_docker(&["kill", "--signal", signal, id.as_str()]).await?;
        Ok(())
    }
}

/// Map docker CLI stderr to a runtime error.
pub(crate) fn classify_failure(subcommand: &str, stderr: &str) -> RuntimeError {
    let lower = stderr.to_ascii_lowercase();
    if lower.contains("cannot connect to the docker daemon")
        || lower.contains("error during connect")
        || lower.contains("permission denied while trying to connect")
    {
        RuntimeError::Unavailable(stderr.to_string())
    } else if lower.contains("is not running") {
        RuntimeError::NotRunning(stderr.to_string())
    } else if lower.contains("no such container")
        || lower.contains("no such image")
        || lower.contains("manifest unknown")
    {
        RuntimeError::NotFound(stderr.to_string())
    } else {
        RuntimeError::Rejected(format!("docker {} failed: {}", subcommand, stderr))
    }
}

/// One line of `docker image ls --format '{{json .}}'`
#[derive(Debug, Deserialize)]
struct ImageLine {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Repository")]
    repository: String,
    #[serde(rename = "Tag")]
    tag: String,
}

/// Parse `docker image ls` JSON lines, grouping tags by image id.
pub(crate) fn parse_image_lines(stdout: &str) -> Result<Vec<ImageSummary>, RuntimeError> {
    let mut images: Vec<ImageSummary> = Vec::new();
    for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let entry: ImageLine = serde_json::from_str(line).map_err(|e| {
            RuntimeError::Rejected(format!("unexpected docker image ls output: {}", e))
        })?;
        let repo_tag = format!("{}:{}", entry.repository, entry.tag);
        match images.iter_mut().find(|img| img.id == entry.id) {
            Some(img) => img.repo_tags.push(repo_tag),
            None => images.push(ImageSummary {
                id: entry.id,
                repo_tags: vec![repo_tag],
            }),
        }
    }
    Ok(images)
}

/// Parse the exit code printed by `docker wait`.
pub(crate) fn parse_exit_code(stdout: &str) -> Result<i64, RuntimeError> {
    stdout.trim().parse().map_err(|_| {
        RuntimeError::Rejected(format!("unexpected docker wait output: {:?}", stdout.trim()))
    })
}

#[cfg(test)]
#[path = "docker_tests.rs"]
mod tests;
