// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted runtime client for tests.
//!
//! Records every call, tracks which containers are running, and lets tests
//! inject failures per operation and choose how containers react to a stop.

use super::{ImageSummary, RuntimeClient, RuntimeError, StopReport};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tether_core::{ContainerId, ImageRef};

/// Recorded runtime call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
    ListImages,
    PullImage { image: String },
    CreateContainer { image: String, command: Vec<String> },
    StartContainer { id: String },
    StopContainer { id: String, grace: Duration },
    KillContainer { id: String, signal: String },
}

/// Operation selector for failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeOp {
    ListImages,
    Pull,
    Create,
    Start,
    Stop,
    Kill,
}

/// How a fake container reacts to a graceful stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBehavior {
    /// The process exits this long after the stop signal. If that is longer
    /// than the grace period, the stop call reports no exit.
    ExitsAfter(Duration),
    /// The process ignores the signal; stop blocks for the whole grace period
    /// and reports no exit.
    Ignores,
    /// Stop returns at once reporting no exit, before the grace period is up.
    ReturnsEarly,
}

struct FakeRuntimeState {
    images: Vec<ImageSummary>,
    calls: Vec<RuntimeCall>,
    failures: HashMap<RuntimeOp, RuntimeError>,
    /// Container id -> running
    containers: HashMap<String, bool>,
    next_id: u64,
    stop_behavior: StopBehavior,
}

/// Fake runtime client for testing
#[derive(Clone)]
pub struct FakeRuntimeClient {
    inner: Arc<Mutex<FakeRuntimeState>>,
}

impl Default for FakeRuntimeClient {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeRuntimeState {
                images: Vec::new(),
                calls: Vec::new(),
                failures: HashMap::new(),
                containers: HashMap::new(),
                next_id: 1,
                stop_behavior: StopBehavior::ExitsAfter(Duration::ZERO),
            })),
        }
    }
}

impl FakeRuntimeClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a locally available image
    pub fn with_image(self, id: &str, repo_tags: &[&str]) -> Self {
        self.inner.lock().images.push(ImageSummary::new(id, repo_tags.iter().copied()));
        self
    }

    pub fn with_stop_behavior(self, behavior: StopBehavior) -> Self {
        self.inner.lock().stop_behavior = behavior;
        self
    }

    /// Make every call to `op` fail with `error`
    pub fn fail(&self, op: RuntimeOp, error: RuntimeError) {
        self.inner.lock().failures.insert(op, error);
    }

    /// Register a container directly, bypassing create/start
    pub fn add_container(&self, id: &str, running: bool) {
        self.inner.lock().containers.insert(id.to_string(), running);
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.inner.lock().calls.clone()
    }

    /// Count recorded calls to `op`
    pub fn call_count(&self, op: RuntimeOp) -> usize {
        self.inner.lock().calls.iter().filter(|c| c.op() == op).count()
    }

    /// Whether a container is known and currently running
    pub fn is_running(&self, id: &str) -> bool {
        self.inner.lock().containers.get(id).copied().unwrap_or(false)
    }

    /// Record `call` and return the injected failure for its operation, if any.
    fn record(&self, call: RuntimeCall) -> Result<(), RuntimeError> {
        let mut inner = self.inner.lock();
        let op = call.op();
        inner.calls.push(call);
        match inner.failures.get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl RuntimeCall {
    pub fn op(&self) -> RuntimeOp {
        match self {
            RuntimeCall::ListImages => RuntimeOp::ListImages,
            RuntimeCall::PullImage { .. } => RuntimeOp::Pull,
            RuntimeCall::CreateContainer { .. } => RuntimeOp::Create,
            RuntimeCall::StartContainer { .. } => RuntimeOp::Start,
            RuntimeCall::StopContainer { .. } => RuntimeOp::Stop,
            RuntimeCall::KillContainer { .. } => RuntimeOp::Kill,
        }
    }
}

#[async_trait]
impl RuntimeClient for FakeRuntimeClient {
    async fn list_images(&self) -> Result<Vec<ImageSummary>, RuntimeError> {
        self.record(RuntimeCall::ListImages)?;
        Ok(self.inner.lock().images.clone())
    }

    async fn pull_image(&self, image: &ImageRef) -> Result<(), RuntimeError> {
        self.record(RuntimeCall::PullImage {
            image: image.to_string(),
        })?;
        let mut inner = self.inner.lock();
        let id = format!("sha256:pulled{}", inner.images.len());
        let repo_tag = format!("{}:{}", image.repository(), image.effective_tag());
        inner.images.push(ImageSummary::new(id, [repo_tag]));
        Ok(())
    }

    async fn create_container(
        &self,
        image: &ImageRef,
        command: &[String],
    ) -> Result<ContainerId, RuntimeError> {
        self.record(RuntimeCall::CreateContainer {
            image: image.to_string(),
            command: command.to_vec(),
        })?;
        let mut inner = self.inner.lock();
        let id = format!("c{}", inner.next_id);
        inner.next_id += 1;
        inner.containers.insert(id.clone(), false);
        Ok(ContainerId::new(id))
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), RuntimeError> {
        self.record(RuntimeCall::StartContainer {
            id: id.to_string(),
        })?;
        let mut inner = self.inner.lock();
        match inner.containers.get_mut(id.as_str()) {
            Some(running) => {
                *running = true;
                Ok(())
            }
            None => Err(RuntimeError::NotFound(id.to_string())),
        }
    }

    async fn stop_container(
        &self,
        id: &ContainerId,
        grace: Duration,
    ) -> Result<StopReport, RuntimeError> {
        self.record(RuntimeCall::StopContainer {
            id: id.to_string(),
            grace,
        })?;
        let behavior = {
            let inner = self.inner.lock();
            if !inner.containers.contains_key(id.as_str()) {
                return Err(RuntimeError::NotFound(id.to_string()));
            }
            inner.stop_behavior
        };

        let (wait, exited) = match behavior {
            StopBehavior::ExitsAfter(after) if after <= grace => (after, true),
            StopBehavior::ExitsAfter(_) | StopBehavior::Ignores => (grace, false),
            StopBehavior::ReturnsEarly => (Duration::ZERO, false),
        };
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }

        if exited {
            self.inner.lock().containers.insert(id.to_string(), false);
        }
        Ok(StopReport {
            exited_in_time: exited,
        })
    }

    async fn kill_container(&self, id: &ContainerId, signal: &str) -> Result<(), RuntimeError> {
        self.record(RuntimeCall::KillContainer {
            id: id.to_string(),
            signal: signal.to_string(),
        })?;
        let mut inner = self.inner.lock();
        match inner.containers.get_mut(id.as_str()) {
            Some(running) if *running => {
                *running = false;
                Ok(())
            }
            Some(_) => Err(RuntimeError::NotRunning(id.to_string())),
            None => Err(RuntimeError::NotFound(id.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
