// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::exit_error::{ExitError, EXIT_CANCELLED, EXIT_FAILED};
use serde::Serialize;
use tether_core::LifecycleState;
use tether_engine::LifecycleResult;

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

/// Audit line printed on stdout when a run ends.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    #[serde(flatten)]
    pub result: &'a LifecycleResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<'a> Report<'a> {
    pub fn new(result: &'a LifecycleResult, error: Option<String>) -> Self {
        Self { result, error }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Map a finished run to the process outcome.
///
/// Stopped and Killed are success. A run that ends with the container still
/// running means the termination was cancelled.
pub fn outcome_status(result: &LifecycleResult) -> Result<(), ExitError> {
    match result.final_state {
        LifecycleState::Stopped | LifecycleState::Killed => Ok(()),
        LifecycleState::Running => Err(ExitError::new(
            EXIT_CANCELLED,
            match &result.container_id {
                Some(id) => format!("termination cancelled, container {} left running", id),
                None => "termination cancelled".to_string(),
            },
        )),
        state => Err(ExitError::new(EXIT_FAILED, format!("lifecycle ended in state {}", state))),
    }
}
