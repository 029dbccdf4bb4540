// Copyright 2025 the Loopguard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Observation scheduling.
//!
//! ## Overview
//!
//! Structural notifications are the fast path for noticing a new active item,
//! but hosts drop or coalesce them. Two timers back them up while the tracked
//! view is open:
//!
//! - a steady poll every [`STEADY_PERIOD`];
//! - a startup burst every [`BURST_PERIOD`] for [`BURST_WINDOW`] after entering
//!   the view, which cancels itself once the window has passed.
//!
//! The [`Scheduler`] does not touch the host. Like a router that only computes
//! an order for a dispatcher to execute, it returns [`Command`]s and leaves
//! carrying them out to the [`Observer`](crate::Observer). Every producer ends
//! in the same idempotent re-evaluation, so overlapping ticks and
//! notifications are harmless.

use core::time::Duration;

use crate::host::Mutation;

/// Period of the steady poll.
pub const STEADY_PERIOD: Duration = Duration::from_millis(1000);

/// Period of the startup burst.
pub const BURST_PERIOD: Duration = Duration::from_millis(300);

/// How long the startup burst runs.
pub const BURST_WINDOW: Duration = Duration::from_secs(5);

/// Which structural changes the host should report.
///
/// The host picks the scope root; it should prefer the container of the
/// tracked feed and fall back to the whole document.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct WatchSpec {
    /// Attribute names whose changes are reported.
    pub attributes: &'static [&'static str],
    /// Report child insertions and removals.
    pub child_list: bool,
    /// Include the whole subtree below the root.
    pub subtree: bool,
}

/// Watch used by [`Scheduler::default`].
pub const WATCH: WatchSpec = WatchSpec {
    attributes: &["is-active"],
    child_list: true,
    subtree: true,
};

/// Repeating timers owned by the scheduler.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Timer {
    /// Low-frequency poll while in scope.
    Steady,
    /// High-frequency poll right after entering scope.
    Burst,
}

/// Host work requested by the scheduler.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Start reporting structural changes.
    Watch(WatchSpec),
    /// Stop reporting structural changes.
    Unwatch,
    /// Start a repeating timer.
    Start(Timer, Duration),
    /// Cancel a repeating timer.
    Cancel(Timer),
}

/// What a timer tick asks for.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Tick {
    /// Run selection again.
    Reevaluate,
    /// The timer outlived its purpose; cancel it.
    Cancel(Timer),
    /// Stale tick from a timer that is no longer ours.
    Ignore,
}

/// Why a re-evaluation happens. Used for logging only.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Cause {
    /// A navigation event.
    Navigation(crate::host::Navigation),
    /// A watched attribute changed.
    Attribute,
    /// Children were added or removed.
    Children,
    /// Steady poll tick.
    Poll,
    /// Startup burst tick.
    Burst,
}

impl Cause {
    /// Short label used in logs.
    pub fn label(self) -> &'static str {
        match self {
            Self::Navigation(n) => n.label(),
            Self::Attribute => "attribute-change",
            Self::Children => "children-change",
            Self::Poll => "poll",
            Self::Burst => "burst",
        }
    }
}

/// Tracks which observation paths are running.
#[derive(Clone, Debug)]
pub struct Scheduler {
    watch: WatchSpec,
    watching: bool,
    steady: bool,
    burst_until: Option<Duration>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(WATCH)
    }
}

impl Scheduler {
    /// Create an inactive scheduler that will request `watch` when started.
    pub fn new(watch: WatchSpec) -> Self {
        Self {
            watch,
            watching: false,
            steady: false,
            burst_until: None,
        }
    }

    /// True between [`enter`](Self::enter) and [`leave`](Self::leave).
    pub fn is_active(&self) -> bool {
        self.watching
    }

    /// True while the startup burst is running.
    pub fn is_bursting(&self) -> bool {
        self.burst_until.is_some()
    }

    /// Start all observation paths. No-op while already active.
    pub fn enter(&mut self, now: Duration) -> Vec<Command> {
        if self.watching {
            return Vec::new();
        }
        self.watching = true;
        self.steady = true;
        self.burst_until = Some(now + BURST_WINDOW);
        vec![
            Command::Watch(self.watch),
            Command::Start(Timer::Steady, STEADY_PERIOD),
            Command::Start(Timer::Burst, BURST_PERIOD),
        ]
    }

    /// Stop every path that is running.
    pub fn leave(&mut self) -> Vec<Command> {
        let mut out = Vec::new();
        if self.burst_until.take().is_some() {
            out.push(Command::Cancel(Timer::Burst));
        }
        if core::mem::take(&mut self.steady) {
            out.push(Command::Cancel(Timer::Steady));
        }
        if core::mem::take(&mut self.watching) {
            out.push(Command::Unwatch);
        }
        out
    }

    /// Classify a timer tick at host time `now`.
    pub fn tick(&mut self, timer: Timer, now: Duration) -> Tick {
        match timer {
            Timer::Steady if self.steady => Tick::Reevaluate,
            Timer::Burst => match self.burst_until {
                Some(until) if now < until => Tick::Reevaluate,
                Some(_) => {
                    self.burst_until = None;
                    Tick::Cancel(Timer::Burst)
                }
                None => Tick::Ignore,
            },
            Timer::Steady => Tick::Ignore,
        }
    }

    /// The first mutation in `batch` that warrants re-evaluation, if any.
    pub fn relevant(&self, batch: &[Mutation]) -> Option<Cause> {
        batch.iter().find_map(|m| match m {
            Mutation::Attribute(name) if self.watch.attributes.contains(&name.as_str()) => {
                Some(Cause::Attribute)
            }
            Mutation::Children { added, removed } if added + removed > 0 => Some(Cause::Children),
            _ => None,
        })
    }
}
