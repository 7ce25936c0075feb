// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle error taxonomy.
//!
//! Every runtime failure is attributed to the [`Phase`] it happened in. A
//! transport-level failure (`RuntimeError::Unavailable`) in any phase becomes
//! [`LifecycleError::RuntimeUnavailable`]; everything else maps to the
//! phase's own variant. None of these are retried.

use tether_adapters::RuntimeError;
use tether_core::{ContainerId, ImageRef, LifecycleState, Phase};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("runtime unavailable during {phase}: {source}")]
    RuntimeUnavailable { phase: Phase, source: RuntimeError },

    #[error("failed to query local images: {source}")]
    QueryFailed { source: RuntimeError },

    #[error("failed to pull image {image}: {source}")]
    PullFailed { image: ImageRef, source: RuntimeError },

    #[error("failed to create container from {image}: {source}")]
    CreateFailed { image: ImageRef, source: RuntimeError },

    #[error("failed to start container {id}: {source}")]
    StartFailed { id: ContainerId, source: RuntimeError },

    #[error("failed to stop container {id}: {source}")]
    StopFailed { id: ContainerId, source: RuntimeError },

    #[error("failed to kill container {id}: {source}")]
    KillFailed { id: ContainerId, source: RuntimeError },

    #[error("cannot {operation} while {state}")]
    InvalidState { operation: &'static str, state: LifecycleState },

    #[error("container {0} was already created for this lifecycle")]
    ContainerExists(ContainerId),

    #[error("a termination request is already outstanding for container {0}")]
    TerminationPending(ContainerId),

    #[error("termination task aborted: {0}")]
    TaskAborted(String),
}

impl LifecycleError {
    /// Classify a runtime failure in `phase`, using `wrap` unless the runtime
    /// was unreachable.
    pub(crate) fn runtime(
        phase: Phase,
        source: RuntimeError,
        wrap: impl FnOnce(RuntimeError) -> LifecycleError,
    ) -> Self {
        match source {
            RuntimeError::Unavailable(_) => LifecycleError::RuntimeUnavailable { phase, source },
            other => wrap(other),
        }
    }

    /// The runtime phase this failure belongs to, if it came from the runtime.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            LifecycleError::RuntimeUnavailable { phase, .. } => Some(*phase),
            LifecycleError::QueryFailed { .. } => Some(Phase::Resolve),
            LifecycleError::PullFailed { .. } => Some(Phase::Pull),
            LifecycleError::CreateFailed { .. } => Some(Phase::Create),
            LifecycleError::StartFailed { .. } => Some(Phase::Start),
            LifecycleError::StopFailed { .. } => Some(Phase::Stop),
            LifecycleError::KillFailed { .. } => Some(Phase::Kill),
            LifecycleError::InvalidState { .. }
            | LifecycleError::ContainerExists(_)
            | LifecycleError::TerminationPending(_)
            | LifecycleError::TaskAborted(_) => None,
        }
    }

    /// The underlying runtime error, if any.
    pub fn runtime_error(&self) -> Option<&RuntimeError> {
        match self {
            LifecycleError::RuntimeUnavailable { source, .. }
            | LifecycleError::QueryFailed { source }
            | LifecycleError::PullFailed { source, .. }
            | LifecycleError::CreateFailed { source, .. }
            | LifecycleError::StartFailed { source, .. }
            | LifecycleError::StopFailed { source, .. }
            | LifecycleError::KillFailed { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Whether this failure happened while resolving or pulling the image,
    /// as opposed to operating on a container.
    pub fn is_image_failure(&self) -> bool {
        self.phase().is_some_and(|p| p.is_image_phase())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
