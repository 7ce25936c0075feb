// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tether-engine: container lifecycle orchestration
//!
//! - [`ImageResolver`] checks local images and pulls when absent
//! - [`ContainerController`] creates and starts the container
//! - [`TerminationScheduler`] stops with a deadline and escalates to kill
//! - [`Orchestrator`] drives one container through the whole flow

mod config;
mod controller;
mod error;
mod orchestrator;
mod resolver;
mod scheduler;

pub use config::{placeholder_command, LifecycleConfig, DEFAULT_KILL_SIGNAL};
pub use controller::ContainerController;
pub use error::LifecycleError;
pub use orchestrator::{LifecycleResult, Orchestrator};
pub use resolver::{ImageResolver, Provision, Resolution};
pub use scheduler::{grace_period, TerminationScheduler, TerminationTask};
pub use tokio_util::sync::CancellationToken;
