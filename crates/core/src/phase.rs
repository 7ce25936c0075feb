// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle phases, used to attribute runtime failures.

use serde::{Deserialize, Serialize};

/// The runtime operation a lifecycle step was performing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Resolve,
    Pull,
    Create,
    Start,
    Stop,
    Kill,
}

impl Phase {
    /// Whether this phase belongs to image resolution rather than a
    /// container operation.
    pub fn is_image_phase(&self) -> bool {
        matches!(self, Phase::Resolve | Phase::Pull)
    }
}

crate::simple_display! {
    Phase {
        Resolve => "resolve",
        Pull => "pull",
        Create => "create",
        Start => "start",
        Stop => "stop",
        Kill => "kill",
    }
}
