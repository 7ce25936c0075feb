// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle state machine.
//!
//! ```text
//! Uninitialized ──resolve──▶ ImageResolved ──create+start──▶ Running
//!                                  │                           │
//!                                  └──create/start fails──▶ Failed
//!                                                              │
//! Running ──terminate──▶ Stopping ──exit in time──▶ Stopped    │
//!                           │  └──deadline, kill──▶ Killed     │
//!                           └──cancelled──▶ Running            │
//! any non-terminal ──unrecoverable runtime error──▶ Failed ◀───┘
//! ```
//!
//! `Created` is reserved for a create-without-start flow; the orchestrator
//! currently folds it into the `Running` transition.

use serde::{Deserialize, Serialize};

/// Orchestrator-visible state of the single managed container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    #[default]
    Uninitialized,
    ImageResolved,
    Created,
    Running,
    Stopping,
    Stopped,
    Killed,
    Failed,
}

impl LifecycleState {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleState::Stopped | LifecycleState::Killed | LifecycleState::Failed)
    }

    /// Check whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        if self.is_terminal() {
            return false;
        }
        match (self, next) {
            (_, Failed) => true,
            (Uninitialized, ImageResolved) => true,
            (ImageResolved, Created | Running) => true,
            (Created, Running) => true,
            (Running, Stopping) => true,
            // Cancelled termination hands the container back
            (Stopping, Stopped | Killed | Running) => true,
            _ => false,
        }
    }
}

crate::simple_display! {
    LifecycleState {
        Uninitialized => "uninitialized",
        ImageResolved => "image_resolved",
        Created => "created",
        Running => "running",
        Stopping => "stopping",
        Stopped => "stopped",
        Killed => "killed",
        Failed => "failed",
    }
}

/// A recorded state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: LifecycleState,
    pub to: LifecycleState,
    /// Wall-clock time of the change, milliseconds since the Unix epoch
    pub at_ms: u64,
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
