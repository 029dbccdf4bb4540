// Copyright 2025 the Loopguard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loopguard Session: per-item playback accounting and the stop decision.
//!
//! ## Overview
//!
//! A [`Machine`] owns at most one tracked media item and its
//! [`TrackingSession`]. The host feeds it selections, position samples and
//! lifecycle signals; it answers with small descriptive values telling the
//! caller what happened (attached, reset, cycle counted, stop required).
//! It never talks to the host itself.
//!
//! ## States
//!
//! - [`State::Idle`]: nothing tracked.
//! - [`State::Tracking`]: counters are live.
//! - [`State::Stopped`]: the stop rule fired; samples are ignored until the
//!   session is reset or replaced.
//!
//! ## Counting cycles
//!
//! End-of-media events are unreliable on looping players, so three
//! independent heuristics each count a cycle (see [`cycle`]):
//! an explicit end, a seek that lands near the start, and a position sample
//! that wraps backward. A single real loop can trip more than one of them.
//!
//! ## Example
//!
//! ```
//! use core::time::Duration;
//! use loopguard_session::{Config, Machine, Playback, State, StopRule};
//!
//! let config = Config { stop: StopRule::Cycles { count: 2 }, ..Config::default() };
//! let mut machine: Machine<u32> = Machine::new(config);
//!
//! let now = Duration::ZERO;
//! let _ = machine.observe(Some(7), "/watch/a", Playback::new(0.0, 12.0), now);
//! assert_eq!(machine.state(), State::Tracking);
//!
//! assert!(machine.ended().stop.is_none());
//! assert!(machine.ended().stop.is_some());
//! assert_eq!(machine.state(), State::Stopped);
//! ```

pub mod config;
pub mod cycle;
mod machine;
mod session;

pub use config::{Config, StopRule};
pub use cycle::CycleSignal;
pub use machine::{Detached, Machine, Observed, ResetReason, State, Step, StopReason};
pub use session::{Playback, TrackingSession};
