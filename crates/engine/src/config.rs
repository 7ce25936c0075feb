// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle configuration.

use tether_core::MatchPolicy;

/// Signal used for forceful termination.
pub const DEFAULT_KILL_SIGNAL: &str = "SIGKILL";

/// A command that never exits on its own, keeping the container alive until
/// it is terminated.
pub fn placeholder_command() -> Vec<String> {
    ["tail", "-f", "/dev/null"].iter().map(|s| s.to_string()).collect()
}

/// Per-orchestrator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// Container entry command. Empty means [`placeholder_command`].
    pub command: Vec<String>,
    /// How the image resolver matches local tags
    pub match_policy: MatchPolicy,
    /// Signal sent by the kill escalation
    pub kill_signal: String,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            command: placeholder_command(),
            match_policy: MatchPolicy::default(),
            kill_signal: DEFAULT_KILL_SIGNAL.to_string(),
        }
    }
}

impl LifecycleConfig {
    tether_core::setters! {
        into {
            kill_signal: String,
        }
        set {
            command: Vec<String>,
            match_policy: MatchPolicy,
        }
    }

    /// The command to run, falling back to the placeholder when none is set.
    pub fn effective_command(&self) -> Vec<String> {
        if self.command.is_empty() {
            placeholder_command()
        } else {
            self.command.clone()
        }
    }
}
