// Copyright 2025 the Loopguard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The session state machine.

use core::time::Duration;

use crate::config::{Config, NEAR_END, StopRule};
use crate::cycle::{self, CycleSignal};
use crate::session::{Playback, TrackingSession};

/// Coarse state derived from the tracked session.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum State {
    /// No item is tracked.
    Idle,
    /// An item is tracked and counters are live.
    Tracking,
    /// The stop rule fired for the current session.
    Stopped,
}

/// Why a session was (re)started.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ResetReason {
    /// The selection settled on the same element under a different route.
    RouteChanged,
    /// A sample arrived after the route moved under a reused element.
    RouteChangedDuringPlayback,
    /// The element loaded new media.
    MetadataLoaded,
}

impl ResetReason {
    /// Short label used in logs.
    pub fn label(self) -> &'static str {
        match self {
            Self::RouteChanged => "route-changed-same-item",
            Self::RouteChangedDuringPlayback => "route-changed-during-playback",
            Self::MetadataLoaded => "metadata-loaded",
        }
    }
}

/// Why the stop rule fired.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StopReason {
    /// Cycle limit reached; carries the heuristic that counted the last cycle.
    Cycles(CycleSignal),
    /// Elapsed-seconds limit reached.
    Elapsed,
}

impl StopReason {
    /// Short label used in logs.
    pub fn label(self) -> &'static str {
        match self {
            Self::Cycles(CycleSignal::Ended) => "cycles-ended",
            Self::Cycles(CycleSignal::SeekToStart) => "cycles-seeking",
            Self::Cycles(CycleSignal::Wrap) => "cycles-wrap",
            Self::Elapsed => "elapsed",
        }
    }
}

/// An item that stopped being tracked, with its final session.
#[derive(Clone, Debug, PartialEq)]
pub struct Detached<K> {
    /// The former tracked item.
    pub item: K,
    /// Its session at the time of detaching.
    pub session: TrackingSession,
}

/// Outcome of [`Machine::observe`].
#[derive(Clone, Debug, PartialEq)]
pub enum Observed<K> {
    /// Nothing was selected; state is untouched.
    Indeterminate,
    /// Same item, same route.
    Unchanged,
    /// A new item is tracked. Listeners of `previous` must be removed.
    Attached {
        /// Newly tracked item.
        item: K,
        /// Item that was replaced, if any.
        previous: Option<Detached<K>>,
    },
    /// Same item, counters cleared.
    Reset(ResetReason),
}

/// What a signal did to the session.
///
/// `stop` is `Some` only on the transition into [`State::Stopped`]; callers
/// issue the stop action exactly when it is set.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[must_use]
pub struct Step {
    /// The session was reset before the signal was processed.
    pub reset: Option<ResetReason>,
    /// A cycle was counted.
    pub cycle: Option<CycleSignal>,
    /// The stop rule fired.
    pub stop: Option<StopReason>,
}

#[derive(Clone, Debug)]
struct Tracked<K> {
    item: K,
    session: TrackingSession,
}

/// Owns the tracked item, its session, and the last known route.
///
/// Every mutation goes through this type. All methods are cheap and
/// idempotent with respect to repeated identical input, so callers may invoke
/// [`observe`](Self::observe) from as many producers as they like.
#[derive(Clone, Debug)]
pub struct Machine<K> {
    config: Config,
    route: Option<String>,
    tracked: Option<Tracked<K>>,
}

impl<K: Copy + Eq> Machine<K> {
    /// Create an idle machine.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            route: None,
            tracked: None,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current coarse state.
    pub fn state(&self) -> State {
        match &self.tracked {
            None => State::Idle,
            Some(t) if t.session.stopped => State::Stopped,
            Some(_) => State::Tracking,
        }
    }

    /// The tracked item, if any.
    pub fn item(&self) -> Option<K> {
        self.tracked.as_ref().map(|t| t.item)
    }

    /// The live session, if any.
    pub fn session(&self) -> Option<&TrackingSession> {
        self.tracked.as_ref().map(|t| &t.session)
    }

    /// Route recorded at the last attach or reset.
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    /// Apply a selection result.
    ///
    /// `playback` is the current reading of `selected`; it seeds the baseline
    /// position of a fresh or reset session.
    pub fn observe(
        &mut self,
        selected: Option<K>,
        route: &str,
        playback: Playback,
        now: Duration,
    ) -> Observed<K> {
        let Some(item) = selected else {
            return Observed::Indeterminate;
        };
        let route_changed = self.route.as_deref() != Some(route);

        if let Some(tracked) = self.tracked.as_mut()
            && tracked.item == item
        {
            if !route_changed {
                return Observed::Unchanged;
            }
            self.route = Some(route.to_owned());
            tracked.session.reset(playback.position, now);
            return Observed::Reset(ResetReason::RouteChanged);
        }

        let previous = self.tracked.take().map(|t| Detached {
            item: t.item,
            session: t.session,
        });
        self.route = Some(route.to_owned());
        self.tracked = Some(Tracked {
            item,
            session: TrackingSession::new(playback.position, now),
        });
        Observed::Attached { item, previous }
    }

    /// Drop the tracked item and forget the route.
    pub fn leave(&mut self) -> Option<Detached<K>> {
        self.route = None;
        self.tracked.take().map(|t| Detached {
            item: t.item,
            session: t.session,
        })
    }

    /// New media was loaded into the tracked element.
    pub fn metadata_loaded(&mut self, playback: Playback, now: Duration) -> Step {
        let Some(tracked) = self.tracked.as_mut() else {
            return Step::default();
        };
        tracked.session.reset(playback.position, now);
        Step {
            reset: Some(ResetReason::MetadataLoaded),
            ..Step::default()
        }
    }

    /// The tracked element reported the end of its media.
    pub fn ended(&mut self) -> Step {
        self.count(CycleSignal::Ended)
    }

    /// The tracked element jumped to `position`.
    pub fn seeking(&mut self, position: f64) -> Step {
        let last = match self.live() {
            Some(t) => t.session.last_position,
            None => return Step::default(),
        };
        if !cycle::seek_is_restart(position, last) {
            return Step::default();
        }
        self.count(CycleSignal::SeekToStart)
    }

    /// Process a routine position sample.
    ///
    /// `route` is the host route when it is known to be in scope; a mismatch
    /// with the recorded route resets the session before the sample counts.
    pub fn sample(&mut self, playback: Playback, route: Option<&str>, now: Duration) -> Step {
        let mut step = Step::default();
        let rule = self.config.stop;
        let Some(tracked) = self.tracked.as_mut() else {
            return step;
        };
        let session = &mut tracked.session;
        if session.stopped {
            return step;
        }

        if let Some(route) = route
            && self.route.as_deref() != Some(route)
        {
            self.route = Some(route.to_owned());
            session.reset(playback.position, now);
            step.reset = Some(ResetReason::RouteChangedDuringPlayback);
        }

        let position = playback.position;
        let last = session.last_position;
        let wrapped = cycle::sample_wraps(position, last, session.since_reset(now));
        if wrapped {
            step.cycle = Some(CycleSignal::Wrap);
            step.stop = session.count_cycle(CycleSignal::Wrap, rule);
            if step.stop.is_some() {
                return step;
            }
        }

        let baseline = if wrapped { 0.0 } else { last };
        session.accumulated += (position - baseline).max(0.0);
        if wrapped && playback.duration > 0.0 {
            session.accumulated += (playback.duration - last).max(0.0);
        }
        if let StopRule::Elapsed { seconds } = rule
            && session.accumulated >= seconds
        {
            step.stop = session.fire_stop(StopReason::Elapsed);
            return step;
        }

        if playback.duration > 0.0 {
            session.near_end = playback.duration - position < NEAR_END;
        }
        session.last_position = position;
        step
    }

    fn live(&self) -> Option<&Tracked<K>> {
        self.tracked.as_ref().filter(|t| !t.session.stopped)
    }

    fn count(&mut self, signal: CycleSignal) -> Step {
        let rule = self.config.stop;
        let Some(tracked) = self.tracked.as_mut().filter(|t| !t.session.stopped) else {
            return Step::default();
        };
        Step {
            reset: None,
            cycle: Some(signal),
            stop: tracked.session.count_cycle(signal, rule),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    fn cycles(count: u32) -> Config {
        Config {
            stop: StopRule::Cycles { count },
            logging: false,
        }
    }

    fn elapsed(seconds: f64) -> Config {
        Config {
            stop: StopRule::Elapsed { seconds },
            logging: false,
        }
    }

    fn attached(config: Config, item: u32) -> Machine<u32> {
        let mut m = Machine::new(config);
        let out = m.observe(Some(item), "/a", Playback::new(0.0, 15.0), Duration::ZERO);
        assert!(matches!(out, Observed::Attached { previous: None, .. }));
        m
    }

    fn at(position: f64) -> Playback {
        Playback::new(position, 15.0)
    }

    #[test]
    fn starts_idle() {
        let m: Machine<u32> = Machine::new(Config::default());
        assert_eq!(m.state(), State::Idle);
        assert!(m.session().is_none());
        assert!(m.route().is_none());
    }

    #[test]
    fn indeterminate_selection_leaves_state_alone() {
        let mut m = attached(elapsed(100.0), 1);
        let _ = m.sample(at(3.0), Some("/a"), secs(3.0));
        let before = m.session().cloned();
        for i in 0..5 {
            let out = m.observe(None, "/other", at(0.0), secs(4.0 + f64::from(i)));
            assert_eq!(out, Observed::Indeterminate);
        }
        assert_eq!(m.session().cloned(), before);
        assert_eq!(m.item(), Some(1));
        assert_eq!(m.route(), Some("/a"));
    }

    #[test]
    fn same_item_same_route_is_unchanged() {
        let mut m = attached(elapsed(100.0), 1);
        let _ = m.sample(at(2.0), Some("/a"), secs(2.0));
        assert_eq!(
            m.observe(Some(1), "/a", at(2.0), secs(2.5)),
            Observed::Unchanged
        );
        assert_eq!(m.session().unwrap().accumulated(), 2.0);
    }

    #[test]
    fn same_item_new_route_resets_in_place() {
        let mut m = attached(cycles(5), 1);
        let _ = m.ended();
        let out = m.observe(Some(1), "/b", at(0.3), secs(8.0));
        assert_eq!(out, Observed::Reset(ResetReason::RouteChanged));
        let s = m.session().unwrap();
        assert_eq!(s.cycles(), 0);
        assert_eq!(s.last_position(), 0.3);
        assert_eq!(s.reset_at(), secs(8.0));
        assert_eq!(m.item(), Some(1));
        assert_eq!(m.route(), Some("/b"));
    }

    #[test]
    fn switching_item_fully_resets_and_reports_previous() {
        let mut m = attached(cycles(2), 1);
        let _ = m.sample(at(5.0), Some("/a"), secs(5.0));
        assert!(m.ended().stop.is_none());
        assert!(m.ended().stop.is_some());
        assert_eq!(m.state(), State::Stopped);

        let out = m.observe(Some(2), "/a", at(0.0), secs(20.0));
        let Observed::Attached { item, previous } = out else {
            panic!("expected attach, got {out:?}");
        };
        assert_eq!(item, 2);
        let previous = previous.unwrap();
        assert_eq!(previous.item, 1);
        assert_eq!(previous.session.cycles(), 2);

        let s = m.session().unwrap();
        assert_eq!(s.accumulated(), 0.0);
        assert_eq!(s.cycles(), 0);
        assert!(!s.is_stopped());
        assert_eq!(m.state(), State::Tracking);
    }

    #[test]
    fn ended_three_times_stops_once() {
        let mut m = attached(cycles(3), 1);
        assert_eq!(m.ended().stop, None);
        assert_eq!(m.ended().stop, None);
        let third = m.ended();
        assert_eq!(third.cycle, Some(CycleSignal::Ended));
        assert_eq!(third.stop, Some(StopReason::Cycles(CycleSignal::Ended)));
        assert_eq!(m.session().unwrap().cycles(), 3);

        // Frozen afterwards.
        assert_eq!(m.ended(), Step::default());
        assert_eq!(m.session().unwrap().cycles(), 3);
    }

    #[test]
    fn elapsed_limit_fires_on_crossing_sample() {
        let mut m = attached(elapsed(25.0), 1);
        let mut stops = 0;
        for (i, p) in [0.0, 10.0, 20.0, 24.9, 26.0].into_iter().enumerate() {
            let step = m.sample(Playback::new(p, 0.0), Some("/a"), secs(i as f64));
            if step.stop.is_some() {
                stops += 1;
                assert_eq!(p, 26.0);
                assert_eq!(step.stop, Some(StopReason::Elapsed));
            }
        }
        assert_eq!(stops, 1);
        let s = m.session().unwrap();
        assert!((s.accumulated() - 26.0).abs() < 1e-9);
        assert!(s.is_stopped());
    }

    #[test]
    fn forward_samples_sum_deltas_regardless_of_rate() {
        let mut coarse = attached(elapsed(1000.0), 1);
        let mut fine = attached(elapsed(1000.0), 1);
        for p in [2.0, 4.0, 8.0] {
            let _ = coarse.sample(at(p), Some("/a"), secs(p));
        }
        for p in [1.0, 1.0, 2.0, 3.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 8.0] {
            let _ = fine.sample(at(p), Some("/a"), secs(p));
        }
        assert_eq!(coarse.session().unwrap().accumulated(), 8.0);
        assert_eq!(fine.session().unwrap().accumulated(), 8.0);
    }

    #[test]
    fn wrap_after_grace_counts_once_and_credits_tail() {
        let mut m = attached(elapsed(1000.0), 1);
        let _ = m.sample(at(14.0), Some("/a"), secs(14.0));
        let before = m.session().unwrap().accumulated();

        let step = m.sample(at(0.5), Some("/a"), secs(15.5));
        assert_eq!(step.cycle, Some(CycleSignal::Wrap));
        let s = m.session().unwrap();
        assert_eq!(s.cycles(), 1);
        // 0.5 into the new cycle plus the 1.0 tail of the previous one.
        assert!((s.accumulated() - (before + 1.5)).abs() < 1e-9);
        assert_eq!(s.last_position(), 0.5);
    }

    #[test]
    fn wrap_without_duration_credits_only_forward_part() {
        let mut m = attached(elapsed(1000.0), 1);
        let _ = m.sample(Playback::new(9.0, 0.0), Some("/a"), secs(9.0));
        let _ = m.sample(Playback::new(0.25, 0.0), Some("/a"), secs(10.0));
        let s = m.session().unwrap();
        assert_eq!(s.cycles(), 1);
        assert!((s.accumulated() - 9.25).abs() < 1e-9);
    }

    #[test]
    fn wrap_inside_grace_is_ignored() {
        let mut m = attached(cycles(1), 1);
        // Reset-in-place at t=10 with a stale high baseline.
        let _ = m.metadata_loaded(at(12.0), secs(10.0));
        let step = m.sample(at(0.1), Some("/a"), secs(11.0));
        assert_eq!(step.cycle, None);
        assert_eq!(m.session().unwrap().cycles(), 0);
        assert_eq!(m.state(), State::Tracking);
    }

    #[test]
    fn wrap_reaching_cycle_limit_stops() {
        let mut m = attached(cycles(1), 1);
        let _ = m.sample(at(14.9), Some("/a"), secs(14.9));
        let step = m.sample(at(0.1), Some("/a"), secs(15.1));
        assert_eq!(step.stop, Some(StopReason::Cycles(CycleSignal::Wrap)));
        assert_eq!(m.state(), State::Stopped);
    }

    #[test]
    fn samples_after_stop_are_frozen() {
        let mut m = attached(elapsed(5.0), 1);
        assert!(m.sample(at(6.0), Some("/a"), secs(6.0)).stop.is_some());
        let frozen = m.session().cloned();
        for p in [7.0, 12.0, 0.1, 14.0] {
            assert_eq!(m.sample(at(p), Some("/a"), secs(30.0)), Step::default());
        }
        assert_eq!(m.seeking(0.0), Step::default());
        assert_eq!(m.ended(), Step::default());
        assert_eq!(m.session().cloned(), frozen);
    }

    #[test]
    fn seek_to_start_counts_cycle() {
        let mut m = attached(cycles(2), 1);
        let _ = m.sample(at(10.0), Some("/a"), secs(10.0));
        assert_eq!(m.seeking(5.0), Step::default());
        let step = m.seeking(0.05);
        assert_eq!(step.cycle, Some(CycleSignal::SeekToStart));
        assert_eq!(m.session().unwrap().cycles(), 1);
    }

    #[test]
    fn ended_and_wrap_can_both_count_one_loop() {
        let mut m = attached(cycles(10), 1);
        let _ = m.sample(at(14.95), Some("/a"), secs(14.95));
        let _ = m.ended();
        let _ = m.sample(at(0.05), Some("/a"), secs(15.2));
        assert_eq!(m.session().unwrap().cycles(), 2);
    }

    #[test]
    fn route_change_seen_in_sample_resets_first() {
        let mut m = attached(elapsed(100.0), 1);
        let _ = m.sample(at(8.0), Some("/a"), secs(8.0));
        let step = m.sample(at(0.2), Some("/b"), secs(9.0));
        assert_eq!(step.reset, Some(ResetReason::RouteChangedDuringPlayback));
        assert_eq!(step.cycle, None);
        let s = m.session().unwrap();
        assert_eq!(s.accumulated(), 0.0);
        assert_eq!(s.last_position(), 0.2);
        assert_eq!(m.route(), Some("/b"));
    }

    #[test]
    fn unknown_route_skips_mismatch_check() {
        let mut m = attached(elapsed(100.0), 1);
        let step = m.sample(at(3.0), None, secs(3.0));
        assert_eq!(step.reset, None);
        assert_eq!(m.session().unwrap().accumulated(), 3.0);
    }

    #[test]
    fn metadata_reset_clears_stop() {
        let mut m = attached(cycles(1), 1);
        assert!(m.ended().stop.is_some());
        let step = m.metadata_loaded(at(0.0), secs(3.0));
        assert_eq!(step.reset, Some(ResetReason::MetadataLoaded));
        assert_eq!(m.state(), State::Tracking);
        assert!(m.ended().stop.is_some());
    }

    #[test]
    fn near_end_tracks_last_sample() {
        let mut m = attached(elapsed(100.0), 1);
        let _ = m.sample(at(5.0), Some("/a"), secs(2.0));
        assert!(!m.session().unwrap().near_end());
        let _ = m.sample(at(14.9), Some("/a"), secs(12.0));
        assert!(m.session().unwrap().near_end());
        // Looping back to the start clears it.
        let step = m.sample(at(0.5), Some("/a"), secs(12.6));
        assert_eq!(step.cycle, Some(CycleSignal::Wrap));
        assert!(!m.session().unwrap().near_end());
    }

    #[test]
    fn leave_returns_detached_and_clears_route() {
        let mut m = attached(cycles(3), 4);
        let gone = m.leave().unwrap();
        assert_eq!(gone.item, 4);
        assert_eq!(m.state(), State::Idle);
        assert!(m.route().is_none());
        assert!(m.leave().is_none());
        // Idle machine ignores signals.
        assert_eq!(m.ended(), Step::default());
        assert_eq!(m.sample(at(1.0), Some("/a"), secs(1.0)), Step::default());
        assert_eq!(m.metadata_loaded(at(0.0), secs(1.0)), Step::default());
    }
}
