// Copyright 2025 the Loopguard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stop rule, logging flag, and detection thresholds.

use core::fmt;
use core::time::Duration;

/// When playback of a tracked item must stop.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StopRule {
    /// Stop after this many seconds of forward playback.
    Elapsed {
        /// Limit in seconds.
        seconds: f64,
    },
    /// Stop after this many completed cycles.
    Cycles {
        /// Limit in cycles.
        count: u32,
    },
}

impl fmt::Display for StopRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Elapsed { seconds } => write!(f, "elapsed limit={seconds}s"),
            Self::Cycles { count } => write!(f, "cycles limit={count}"),
        }
    }
}

/// Stop rule used by [`Config::default`].
pub const STOP_RULE: StopRule = StopRule::Cycles { count: 3 };

/// Whether the observer logs by default.
pub const LOGGING: bool = true;

/// A seek landing before this position (seconds) may be a restart.
pub const NEAR_START: f64 = 0.15;

/// The previous position (seconds) must be past this for a jump back to count as a cycle.
pub const MIN_PRIOR_POSITION: f64 = 0.8;

/// A sample must fall at least this far (seconds) below the previous one to count as a wrap.
pub const WRAP_TOLERANCE: f64 = 0.1;

/// Wraps seen this soon after a reset are ignored.
pub const RESET_GRACE: Duration = Duration::from_millis(1500);

/// Remaining time (seconds) under which a sample is considered near the end.
pub const NEAR_END: f64 = 0.2;

/// Runtime configuration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Config {
    /// Stop condition.
    pub stop: StopRule,
    /// Emit log events.
    pub logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stop: STOP_RULE,
            logging: LOGGING,
        }
    }
}
