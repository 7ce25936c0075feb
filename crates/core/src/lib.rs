// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tether-core: Domain types for the tether container lifecycle tool

pub mod macros;

pub mod clock;
pub mod container;
pub mod image;
pub mod phase;
pub mod state;
pub mod termination;

pub use clock::{Clock, FakeClock, SystemClock};
pub use container::ContainerId;
pub use image::{ImageRef, ImageRefError, MatchPolicy};
pub use phase::Phase;
pub use state::{LifecycleState, Transition};
pub use termination::TerminationOutcome;
