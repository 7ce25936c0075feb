// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container runtime capability
//!
//! The `RuntimeClient` trait is the narrow surface the lifecycle engine
//! drives: image listing and pulls, container create/start, and the two
//! termination calls (timed stop and signal kill). Connection handling,
//! auth and transport all live behind it.

mod docker;

pub use docker::DockerCliClient;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeRuntimeClient, RuntimeCall, RuntimeOp, StopBehavior};

use async_trait::async_trait;
use std::time::Duration;
use tether_core::{ContainerId, ImageRef};
use thiserror::Error;

/// Errors from runtime operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// The runtime could not be reached at all (daemon down, binary missing, auth)
    #[error("runtime unavailable: {0}")]
    Unavailable(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// The container has already exited
    #[error("container not running: {0}")]
    NotRunning(String),
    /// The runtime gave up waiting for the container to stop
    #[error("stop timed out: {0}")]
    StopTimeout(String),
    #[error("runtime rejected request: {0}")]
    Rejected(String),
}

/// A locally known image as reported by the runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSummary {
    pub id: String,
    /// `repository:tag` entries pointing at this image
    pub repo_tags: Vec<String>,
}

impl ImageSummary {
    pub fn new(
        id: impl Into<String>,
        repo_tags: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            id: id.into(),
            repo_tags: repo_tags.into_iter().map(Into::into).collect(),
        }
    }
}

/// Result of a graceful stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopReport {
    /// Whether the container's main process exited before the grace period ran out
    pub exited_in_time: bool,
}

/// Client for a container runtime daemon
#[async_trait]
pub trait RuntimeClient: Clone + Send + Sync + 'static {
    /// List locally available images
    async fn list_images(&self) -> Result<Vec<ImageSummary>, RuntimeError>;

    /// Pull an image from its registry
    ///
    /// Unbounded: no timeout is imposed here.
    async fn pull_image(&self, image: &ImageRef) -> Result<(), RuntimeError>;

    /// Create (but do not start) a container running `command`
    async fn create_container(
        &self,
        image: &ImageRef,
        command: &[String],
    ) -> Result<ContainerId, RuntimeError>;

    /// Start a created container
    async fn start_container(&self, id: &ContainerId) -> Result<(), RuntimeError>;

    /// Ask the container to exit, waiting up to `grace` for it to do so.
    ///
    /// May block for the full grace period. Never kills the container itself
    /// when the grace period runs out; that is left to `kill_container`.
    async fn stop_container(
        &self,
        id: &ContainerId,
        grace: Duration,
    ) -> Result<StopReport, RuntimeError>;

    /// Send `signal` to the container's main process
    ///
    /// Returns `RuntimeError::NotRunning` if the container has already exited.
    async fn kill_container(&self, id: &ContainerId, signal: &str) -> Result<(), RuntimeError>;
}
