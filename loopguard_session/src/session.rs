// Copyright 2025 the Loopguard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Playback samples and the mutable per-item session.

use core::time::Duration;

use crate::config::StopRule;
use crate::cycle::CycleSignal;
use crate::machine::StopReason;

/// A playback reading taken from the tracked element.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Playback {
    /// Current position in seconds.
    pub position: f64,
    /// Media duration in seconds; `0.0` when unknown.
    pub duration: f64,
}

impl Playback {
    /// Build a reading, replacing non-finite values with `0.0`.
    pub fn new(position: f64, duration: f64) -> Self {
        Self {
            position: finite_or_zero(position),
            duration: finite_or_zero(duration),
        }
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

/// Accumulated progress for the tracked item.
///
/// Counters only move forward; the only way back to zero is a reset, which
/// the [`Machine`](crate::Machine) performs on attach, route change, or
/// metadata reload.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackingSession {
    pub(crate) accumulated: f64,
    pub(crate) cycles: u32,
    pub(crate) last_position: f64,
    pub(crate) stopped: bool,
    pub(crate) near_end: bool,
    pub(crate) reset_at: Duration,
}

impl TrackingSession {
    pub(crate) fn new(position: f64, now: Duration) -> Self {
        Self {
            accumulated: 0.0,
            cycles: 0,
            last_position: position,
            stopped: false,
            near_end: false,
            reset_at: now,
        }
    }

    pub(crate) fn reset(&mut self, position: f64, now: Duration) {
        *self = Self::new(position, now);
    }

    /// Seconds of forward playback since the last reset.
    pub fn accumulated(&self) -> f64 {
        self.accumulated
    }

    /// Completed cycles since the last reset.
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Position of the last accepted sample.
    pub fn last_position(&self) -> f64 {
        self.last_position
    }

    /// True once the stop rule fired for this session.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// True when the last sample was close to a known end of media.
    pub fn near_end(&self) -> bool {
        self.near_end
    }

    /// Host timestamp of the last reset.
    pub fn reset_at(&self) -> Duration {
        self.reset_at
    }

    pub(crate) fn since_reset(&self, now: Duration) -> Duration {
        now.saturating_sub(self.reset_at)
    }

    /// Count one cycle and report whether the rule now requires a stop.
    pub(crate) fn count_cycle(
        &mut self,
        signal: CycleSignal,
        rule: StopRule,
    ) -> Option<StopReason> {
        self.cycles += 1;
        match rule {
            StopRule::Cycles { count } if self.cycles >= count => {
                self.fire_stop(StopReason::Cycles(signal))
            }
            _ => None,
        }
    }

    /// Latch the stopped flag. Only the first call yields the reason.
    pub(crate) fn fire_stop(&mut self, reason: StopReason) -> Option<StopReason> {
        if self.stopped {
            return None;
        }
        self.stopped = true;
        Some(reason)
    }
}
