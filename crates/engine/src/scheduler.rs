// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timed termination: graceful stop with escalation to kill.
//!
//! # Sequence
//!
//! 1. Cancelled already? Return `Cancelled` without touching the runtime.
//! 2. Zero grace period? Kill immediately.
//! 3. Issue the stop with the grace period as its deadline. The stop call is
//!    not interruptible; cancellation during it is only observed afterwards.
//! 4. Exited in time? `StoppedGracefully`.
//! 5. Otherwise wait out the rest of the deadline, racing cancellation. A
//!    cancellation at any point after the stop was issued suppresses the kill.
//! 6. Kill. A container that already exited counts as killed.

use crate::error::LifecycleError;
use std::time::Duration;
use tether_adapters::{RuntimeClient, RuntimeError, StopReport};
use tether_core::{ContainerId, Phase, TerminationOutcome};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Convert a signed grace period in seconds; zero or negative means none.
pub fn grace_period(secs: i64) -> Duration {
    Duration::from_secs(secs.max(0).unsigned_abs())
}

/// Issues graceful stops and escalates to kill after the deadline.
#[derive(Clone)]
pub struct TerminationScheduler<C> {
    client: C,
    kill_signal: String,
}

impl<C: RuntimeClient> TerminationScheduler<C> {
    pub fn new(client: C, kill_signal: impl Into<String>) -> Self {
        Self {
            client,
            kill_signal: kill_signal.into(),
        }
    }

    /// Terminate `id`, giving it `grace` to exit before it is killed.
    pub async fn terminate(
        &self,
        id: &ContainerId,
        grace: Duration,
        cancel: &CancellationToken,
    ) -> Result<TerminationOutcome, LifecycleError> {
        let container_id = id.short(12);
        if cancel.is_cancelled() {
            tracing::info!(%container_id, "termination cancelled before stop was issued");
            return Ok(TerminationOutcome::Cancelled);
        }

        if grace.is_zero() {
            tracing::info!(%container_id, "no grace period, killing container");
            self.kill(id).await?;
            return Ok(TerminationOutcome::KilledImmediately);
        }

        let deadline = Instant::now() + grace;
        let grace_ms = grace.as_millis() as u64;
        tracing::info!(%container_id, grace_ms, "stopping container");

        let report = match self.client.stop_container(id, grace).await {
            Ok(report) => report,
            Err(RuntimeError::StopTimeout(msg)) => {
                tracing::debug!(%container_id, %msg, "runtime reported stop timeout");
                StopReport {
                    exited_in_time: false,
                }
            }
            Err(e) => {
                return Err(LifecycleError::runtime(Phase::Stop, e, |source| {
                    LifecycleError::StopFailed {
                        id: id.clone(),
                        source,
                    }
                }))
            }
        };

        if report.exited_in_time {
            tracing::info!(%container_id, "container stopped gracefully");
            return Ok(TerminationOutcome::StoppedGracefully);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(%container_id, "termination cancelled, kill suppressed");
                return Ok(TerminationOutcome::Cancelled);
            }
            _ = tokio::time::sleep_until(deadline) => {}
        }

        tracing::warn!(%container_id, grace_ms, "grace period elapsed, killing container");
        self.kill(id).await?;
        Ok(TerminationOutcome::KilledAfterTimeout)
    }

    /// Forcefully kill `id`. An already-exited container is not an error.
    pub async fn kill(&self, id: &ContainerId) -> Result<(), LifecycleError> {
        match self.client.kill_container(id, &self.kill_signal).await {
            Ok(()) => {
                tracing::info!(
                    container_id = %id.short(12),
                    signal = %self.kill_signal,
                    "container killed"
                );
                Ok(())
            }
            Err(RuntimeError::NotRunning(_)) => {
                tracing::debug!(container_id = %id.short(12), "container already stopped");
                Ok(())
            }
            Err(e) => Err(LifecycleError::runtime(Phase::Kill, e, |source| {
                LifecycleError::KillFailed {
                    id: id.clone(),
                    source,
                }
            })),
        }
    }

    /// Run [`terminate`](Self::terminate) as a background task.
    ///
    /// Cancelling `cancel` (or calling [`TerminationTask::cancel`]) follows
    /// the same rules as the inline call.
    pub fn spawn(
        &self,
        id: ContainerId,
        grace: Duration,
        cancel: CancellationToken,
    ) -> TerminationTask {
        let scheduler = self.clone();
        let task_cancel = cancel.clone();
        let task_id = id.clone();
        let handle =
            tokio::spawn(async move { scheduler.terminate(&task_id, grace, &task_cancel).await });
        TerminationTask {
            id,
            cancel,
            handle,
        }
    }
}

/// A termination running in the background.
pub struct TerminationTask {
    id: ContainerId,
    cancel: CancellationToken,
    handle: JoinHandle<Result<TerminationOutcome, LifecycleError>>,
}

impl TerminationTask {
    pub fn container_id(&self) -> &ContainerId {
        &self.id
    }

    /// Withdraw the request. Has no effect on a stop already in flight.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the termination to finish.
    pub async fn wait(self) -> Result<TerminationOutcome, LifecycleError> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(LifecycleError::TaskAborted(e.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
