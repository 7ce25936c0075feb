// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outcome of a termination request.

use crate::state::LifecycleState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationOutcome {
    /// The container exited on its own within the grace period
    StoppedGracefully,
    /// The grace period elapsed and a kill was issued
    KilledAfterTimeout,
    /// No grace period was given; the container was killed outright
    KilledImmediately,
    /// The caller withdrew the request; no kill was issued
    Cancelled,
}

impl TerminationOutcome {
    /// The lifecycle state this outcome settles in, or `None` when the
    /// container is still alive.
    pub fn final_state(&self) -> Option<LifecycleState> {
        match self {
            TerminationOutcome::StoppedGracefully => Some(LifecycleState::Stopped),
            TerminationOutcome::KilledAfterTimeout | TerminationOutcome::KilledImmediately => {
                Some(LifecycleState::Killed)
            }
            TerminationOutcome::Cancelled => None,
        }
    }
}

crate::simple_display! {
    TerminationOutcome {
        StoppedGracefully => "stopped gracefully",
        KilledAfterTimeout => "killed after timeout",
        KilledImmediately => "killed immediately",
        Cancelled => "cancelled",
    }
}
