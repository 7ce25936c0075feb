// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle orchestrator: one container from image check to termination.

use crate::config::LifecycleConfig;
use crate::controller::ContainerController;
use crate::error::LifecycleError;
use crate::resolver::{ImageResolver, Provision};
use crate::scheduler::{TerminationScheduler, TerminationTask};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tether_adapters::RuntimeClient;
use tether_core::{
    Clock, ContainerId, ImageRef, LifecycleState, SystemClock, TerminationOutcome, Transition,
};
use tokio_util::sync::CancellationToken;

/// Final report of a run, suitable for audit logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleResult {
    pub final_state: LifecycleState,
    pub image: ImageRef,
    pub container_id: Option<ContainerId>,
    /// How the last termination request ended, if one was made
    pub outcome: Option<TerminationOutcome>,
    pub transitions: Vec<Transition>,
}

/// Drives a single container through resolve, create/start and terminate.
///
/// Owns the container handle exclusively. All state changes go through
/// [`LifecycleState::can_transition_to`] and are recorded with a timestamp
/// from the injected clock.
pub struct Orchestrator<C, K = SystemClock> {
    image: ImageRef,
    command: Vec<String>,
    resolver: ImageResolver<C>,
    controller: ContainerController<C>,
    scheduler: TerminationScheduler<C>,
    clock: K,
    state: LifecycleState,
    history: Vec<Transition>,
    outcome: Option<TerminationOutcome>,
    pending: Option<TerminationTask>,
}

impl<C: RuntimeClient> Orchestrator<C> {
    pub fn new(client: C, image: ImageRef, config: LifecycleConfig) -> Self {
        Self::with_clock(client, image, config, SystemClock)
    }
}

impl<C: RuntimeClient, K: Clock> Orchestrator<C, K> {
    pub fn with_clock(client: C, image: ImageRef, config: LifecycleConfig, clock: K) -> Self {
        Self {
            command: config.effective_command(),
            resolver: ImageResolver::new(client.clone(), config.match_policy),
            controller: ContainerController::new(client.clone()),
            scheduler: TerminationScheduler::new(client, config.kill_signal),
            image,
            clock,
            state: LifecycleState::Uninitialized,
            history: Vec::new(),
            outcome: None,
            pending: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn image(&self) -> &ImageRef {
        &self.image
    }

    pub fn container_id(&self) -> Option<&ContainerId> {
        self.controller.handle()
    }

    pub fn history(&self) -> &[Transition] {
        &self.history
    }

    pub fn outcome(&self) -> Option<TerminationOutcome> {
        self.outcome
    }

    /// Snapshot of the current state for reporting.
    pub fn result(&self) -> LifecycleResult {
        LifecycleResult {
            final_state: self.state,
            image: self.image.clone(),
            container_id: self.controller.handle().cloned(),
            outcome: self.outcome,
            transitions: self.history.clone(),
        }
    }

    /// Make the image available locally, pulling it if needed.
    pub async fn prepare(&mut self) -> Result<Provision, LifecycleError> {
        self.require("prepare", LifecycleState::Uninitialized)?;
        match self.resolver.ensure(&self.image).await {
            Ok(provision) => {
                tracing::info!(image = %self.image, %provision, "image ready");
                self.transition(LifecycleState::ImageResolved);
                Ok(provision)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Create and start the container.
    ///
    /// If start fails after create succeeded, the half-created container is
    /// killed on a best-effort basis; a cleanup failure is logged and the
    /// start error is returned.
    pub async fn launch(&mut self) -> Result<ContainerId, LifecycleError> {
        self.require("launch", LifecycleState::ImageResolved)?;
        match self.controller.create_and_start(&self.image, &self.command).await {
            Ok(id) => {
                self.transition(LifecycleState::Running);
                Ok(id)
            }
            Err(e) => {
                if let Some(id) = self.controller.handle().cloned() {
                    if let Err(cleanup) = self.scheduler.kill(&id).await {
                        tracing::warn!(
                            container_id = %id.short(12),
                            error = %cleanup,
                            "cleanup kill of unstarted container failed",
                        );
                    }
                }
                Err(self.fail(e))
            }
        }
    }

    /// Start terminating the container in the background.
    ///
    /// Only one termination may be outstanding. Use
    /// [`finish_termination`](Self::finish_termination) to wait for it.
    pub fn begin_termination(
        &mut self,
        grace: Duration,
        cancel: CancellationToken,
    ) -> Result<(), LifecycleError> {
        if let Some(task) = &self.pending {
            return Err(LifecycleError::TerminationPending(task.container_id().clone()));
        }
        self.require("terminate", LifecycleState::Running)?;
        let Some(id) = self.controller.handle().cloned() else {
            return Err(LifecycleError::InvalidState {
                operation: "terminate",
                state: self.state,
            });
        };

        self.transition(LifecycleState::Stopping);
        self.pending = Some(self.scheduler.spawn(id, grace, cancel));
        Ok(())
    }

    /// Cancel the outstanding termination, if any.
    pub fn cancel_termination(&self) {
        if let Some(task) = &self.pending {
            task.cancel();
        }
    }

    /// Wait for the outstanding termination and apply its outcome.
    pub async fn finish_termination(&mut self) -> Result<TerminationOutcome, LifecycleError> {
        let Some(task) = self.pending.take() else {
            return Err(LifecycleError::InvalidState {
                operation: "finish termination",
                state: self.state,
            });
        };

        match task.wait().await {
            Ok(outcome) => {
                self.outcome = Some(outcome);
                match outcome.final_state() {
                    Some(state) => self.transition(state),
                    None => {
                        tracing::info!(
                            image = %self.image,
                            "termination cancelled, container left running"
                        );
                        self.transition(LifecycleState::Running);
                    }
                }
                Ok(outcome)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Terminate the container and wait for the outcome.
    pub async fn terminate(
        &mut self,
        grace: Duration,
        cancel: CancellationToken,
    ) -> Result<TerminationOutcome, LifecycleError> {
        self.begin_termination(grace, cancel)?;
        self.finish_termination().await
    }

    /// Resolve, create/start, wait for `trigger`, then terminate.
    ///
    /// `cancel` applies to the termination only. On error the orchestrator
    /// is left `Failed` and [`result`](Self::result) still reports it.
    pub async fn run(
        &mut self,
        grace: Duration,
        trigger: impl Future<Output = ()>,
        cancel: CancellationToken,
    ) -> Result<LifecycleResult, LifecycleError> {
        self.prepare().await?;
        let id = self.launch().await?;
        tracing::info!(
            container_id = %id.short(12),
            image = %self.image,
            "container running, awaiting termination trigger"
        );

        trigger.await;
        self.terminate(grace, cancel).await?;
        Ok(self.result())
    }

    fn require(
        &self,
        operation: &'static str,
        expected: LifecycleState,
    ) -> Result<(), LifecycleError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(LifecycleError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn transition(&mut self, to: LifecycleState) {
        let from = self.state;
        if !from.can_transition_to(to) {
            tracing::warn!(%from, %to, "ignoring illegal lifecycle transition");
            return;
        }
        self.state = to;
        self.history.push(Transition {
            from,
            to,
            at_ms: self.clock.epoch_ms(),
        });
        tracing::info!(%from, %to, image = %self.image, "lifecycle transition");
    }

    /// Move to `Failed` and hand the error back to the caller.
    fn fail(&mut self, error: LifecycleError) -> LifecycleError {
        tracing::error!(
            image = %self.image,
            phase = ?error.phase(),
            error = %error,
            "lifecycle failed",
        );
        self.transition(LifecycleState::Failed);
        error
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
