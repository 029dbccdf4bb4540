// Copyright 2025 the Loopguard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cycle heuristics.
//!
//! Looping players do not reliably report the end of media, so a completed
//! cycle is inferred from any of three signals:
//!
//! - [`CycleSignal::Ended`]: the player said it reached the end.
//! - [`CycleSignal::SeekToStart`]: a seek landed before [`NEAR_START`] while
//!   the previous position was past [`MIN_PRIOR_POSITION`].
//! - [`CycleSignal::Wrap`]: a routine sample fell more than
//!   [`WRAP_TOLERANCE`] below a previous position past
//!   [`MIN_PRIOR_POSITION`], outside the [`RESET_GRACE`] window.
//!
//! The heuristics are independent; nothing prevents one loop boundary from
//! being counted by two of them.

use core::time::Duration;

use crate::config::{MIN_PRIOR_POSITION, NEAR_START, RESET_GRACE, WRAP_TOLERANCE};

/// Which heuristic counted a cycle.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CycleSignal {
    /// Explicit end-of-media event.
    Ended,
    /// Position jump back to the start.
    SeekToStart,
    /// Backward wrap between two samples.
    Wrap,
}

impl CycleSignal {
    /// Short label used in logs.
    pub fn label(self) -> &'static str {
        match self {
            Self::Ended => "ended",
            Self::SeekToStart => "seek-to-start",
            Self::Wrap => "wrap",
        }
    }
}

/// True when a seek to `position` after `last` looks like a restart.
pub fn seek_is_restart(position: f64, last: f64) -> bool {
    position < NEAR_START && last > MIN_PRIOR_POSITION
}

/// True when a sample at `position` after `last` looks like a loop wrap.
///
/// `since_reset` is the host time elapsed since the session was last reset;
/// inside [`RESET_GRACE`] the previous position may be stale and no wrap is
/// reported.
pub fn sample_wraps(position: f64, last: f64, since_reset: Duration) -> bool {
    since_reset >= RESET_GRACE && last > MIN_PRIOR_POSITION && position + WRAP_TOLERANCE < last
}
