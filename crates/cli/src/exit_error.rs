// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error carrying a process exit code.
//!
//! `run` returns `ExitError` for outcomes that are reported but not
//! successful, so `main()` alone decides how the process ends.

use std::fmt;

/// The lifecycle ended in `Failed`
pub const EXIT_FAILED: i32 = 1;
/// Termination was cancelled and the container is still running
pub const EXIT_CANCELLED: i32 = 2;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ExitError {}
