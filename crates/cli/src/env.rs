// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI.

use std::path::PathBuf;

/// Grace period used when neither `--grace-secs` nor `TETHER_GRACE_SECS` is set
pub const DEFAULT_GRACE_SECS: i64 = 10;

/// Docker executable override (`TETHER_DOCKER_BIN`)
pub fn docker_bin() -> Option<PathBuf> {
    std::env::var("TETHER_DOCKER_BIN").ok().filter(|s| !s.is_empty()).map(PathBuf::from)
}

/// Daemon address passed to docker as `--host` (`TETHER_DOCKER_HOST`)
pub fn docker_host() -> Option<String> {
    std::env::var("TETHER_DOCKER_HOST").ok().filter(|s| !s.is_empty())
}

/// Default grace period in seconds (`TETHER_GRACE_SECS`, default 10).
/// Unparseable values fall back to the default.
pub fn grace_secs() -> i64 {
    parse_grace_secs(std::env::var("TETHER_GRACE_SECS").ok().as_deref())
}

pub(crate) fn parse_grace_secs(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok()).unwrap_or(DEFAULT_GRACE_SECS)
}

/// Log filter directive: TETHER_LOG > RUST_LOG > "info"
pub fn log_filter() -> String {
    std::env::var("TETHER_LOG")
        .ok()
        .filter(|s| !s.is_empty())
        .or_else(|| std::env::var("RUST_LOG").ok().filter(|s| !s.is_empty()))
        .unwrap_or_else(|| "info".to_string())
}
