// Copyright 2025 the Loopguard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The observer: host input in, host commands out.

use core::fmt;
use core::time::Duration;

use loopguard_select::select;
use loopguard_session::{Config, Detached, Machine, Observed, State, Step};

use crate::actuate::{Halted, halt};
use crate::hooks::{Listeners, MediaEvent};
use crate::host::{Actuator, Host, Mutation, Navigation};
use crate::schedule::{Cause, Command, Scheduler, Tick, Timer};

/// Seconds with two decimals, for log fields.
struct Secs(f64);

impl fmt::Display for Secs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}s", self.0)
    }
}

/// Drives selection, session accounting, and the stop action for one page.
///
/// ## Usage
///
/// - Construct with [`Observer::new`], handing over the host.
/// - Call [`bootstrap`](Self::bootstrap) once, then forward host input:
///   [`navigate`](Self::navigate), [`structure_changed`](Self::structure_changed),
///   [`timer_fired`](Self::timer_fired), and [`media_event`](Self::media_event).
///
/// None of the entry points return errors. Host failures are logged and the
/// observer degrades to doing nothing for that input.
pub struct Observer<H: Host> {
    host: H,
    machine: Machine<H::Media>,
    scheduler: Scheduler,
    listeners: Listeners<H::Media>,
    halted: Option<Halted>,
}

impl<H: Host> fmt::Debug for Observer<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("machine", &self.machine)
            .field("scheduler", &self.scheduler)
            .field("listeners", &self.listeners)
            .field("halted", &self.halted)
            .finish_non_exhaustive()
    }
}

impl<H> Observer<H>
where
    H: Host + Actuator<<H as Host>::Media>,
{
    /// Create an observer over `host`. Nothing runs until [`bootstrap`](Self::bootstrap).
    pub fn new(host: H, config: Config) -> Self {
        Self {
            host,
            machine: Machine::new(config),
            scheduler: Scheduler::default(),
            listeners: Listeners::default(),
            halted: None,
        }
    }

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably (for scripted hosts that change the page between inputs).
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The session state machine.
    pub fn machine(&self) -> &Machine<H::Media> {
        &self.machine
    }

    /// The observation scheduler.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// How the stop action went for the current session, once it has run.
    ///
    /// Cleared whenever the session is replaced or reset.
    pub fn halted(&self) -> Option<Halted> {
        self.halted
    }

    fn logging(&self) -> bool {
        self.machine.config().logging
    }

    /// Start observing if the page is already in scope.
    pub fn bootstrap(&mut self, now: Duration) {
        if self.logging() {
            tracing::info!(route = self.host.route(), "bootstrap");
        }
        let commands = if self.host.in_scope() {
            self.scheduler.enter(now)
        } else {
            self.scheduler.leave()
        };
        self.apply(commands);
    }

    /// React to a host navigation event.
    pub fn navigate(&mut self, event: Navigation, now: Duration) {
        if self.logging() {
            tracing::info!(
                event = event.label(),
                route = self.host.route(),
                "navigation"
            );
        }
        if !self.host.in_scope() {
            let commands = self.scheduler.leave();
            self.apply(commands);
            self.release("route-away");
            return;
        }
        let commands = self.scheduler.enter(now);
        self.apply(commands);
        self.reevaluate(Cause::Navigation(event), now);
    }

    /// React to a batch of structural changes reported by the host watch.
    pub fn structure_changed(&mut self, batch: &[Mutation], now: Duration) {
        if !self.scheduler.is_active() {
            return;
        }
        if let Some(cause) = self.scheduler.relevant(batch) {
            self.reevaluate(cause, now);
        }
    }

    /// React to a tick of one of the scheduler's timers.
    pub fn timer_fired(&mut self, timer: Timer, now: Duration) {
        match self.scheduler.tick(timer, now) {
            Tick::Reevaluate => {
                let cause = match timer {
                    Timer::Steady => Cause::Poll,
                    Timer::Burst => Cause::Burst,
                };
                self.reevaluate(cause, now);
            }
            Tick::Cancel(timer) => self.apply(vec![Command::Cancel(timer)]),
            Tick::Ignore => {}
        }
    }

    /// React to a playback event of `media`.
    pub fn media_event(&mut self, media: H::Media, event: MediaEvent, now: Duration) {
        if !self.listeners.accepts(media, event.kind()) {
            if self.logging() {
                tracing::trace!(?media, ?event, "event from untracked media");
            }
            return;
        }
        let step = match event {
            MediaEvent::Progress => {
                let playback = self.host.playback(media);
                let route = self.host.in_scope().then(|| self.host.route());
                self.machine.sample(playback, route, now)
            }
            MediaEvent::Ended => self.machine.ended(),
            MediaEvent::Seeking => self.machine.seeking(self.host.playback(media).position),
            MediaEvent::MetadataLoaded => {
                let playback = self.host.playback(media);
                self.machine.metadata_loaded(playback, now)
            }
            MediaEvent::Paused => {
                if self.logging() {
                    let by_us = self.machine.state() == State::Stopped;
                    tracing::info!(?media, stopped_by_rule = by_us, "media paused");
                }
                return;
            }
            MediaEvent::Playing => {
                if self.logging() {
                    let p = self.host.playback(media);
                    tracing::info!(
                        ?media,
                        position = %Secs(p.position),
                        duration = %Secs(p.duration),
                        "media playing"
                    );
                }
                return;
            }
        };
        self.settle(media, step);
    }

    /// Resolve the active media and attach, reset, or leave the session alone.
    ///
    /// Safe to call any number of times: an unchanged selection on an
    /// unchanged route is a no-op.
    pub fn reevaluate(&mut self, cause: Cause, now: Duration) {
        if !self.host.in_scope() {
            self.release("left-scope");
            return;
        }
        let selection = select(
            self.host.marked_active(),
            &self.host.candidates(),
            self.host.viewport(),
        );
        let Some(media) = selection.and_then(|s| self.host.media_of(s.item)) else {
            if self.logging() {
                tracing::debug!(cause = cause.label(), "no active media yet");
            }
            return;
        };
        let playback = self.host.playback(media);
        match self
            .machine
            .observe(Some(media), self.host.route(), playback, now)
        {
            Observed::Indeterminate | Observed::Unchanged => {}
            Observed::Reset(reason) => {
                self.halted = None;
                if self.logging() {
                    tracing::info!(
                        ?media,
                        reason = reason.label(),
                        position = %Secs(playback.position),
                        route = self.host.route(),
                        "session reset"
                    );
                }
            }
            Observed::Attached { item, previous } => {
                self.halted = None;
                if let Some(previous) = &previous {
                    self.report_detached(previous, "switch");
                }
                if let Err(err) = self.listeners.attach(&mut self.host, item)
                    && self.logging()
                {
                    tracing::warn!(media = ?item, %err, "listener registration failed");
                }
                if self.logging() {
                    tracing::info!(
                        media = ?item,
                        cause = cause.label(),
                        rule = %self.machine.config().stop,
                        route = self.host.route(),
                        "attached"
                    );
                }
            }
        }
    }

    fn release(&mut self, why: &'static str) {
        if let Err(err) = self.listeners.detach(&mut self.host)
            && self.logging()
        {
            tracing::warn!(%err, "listener removal failed");
        }
        self.halted = None;
        if let Some(gone) = self.machine.leave() {
            self.report_detached(&gone, why);
        }
    }

    fn report_detached(&self, gone: &Detached<H::Media>, why: &'static str) {
        if self.logging() {
            tracing::info!(
                media = ?gone.item,
                reason = why,
                accumulated = %Secs(gone.session.accumulated()),
                cycles = gone.session.cycles(),
                stopped = gone.session.is_stopped(),
                near_end = gone.session.near_end(),
                "detached"
            );
        }
    }

    fn settle(&mut self, media: H::Media, step: Step) {
        let logging = self.logging();
        if step.reset.is_some() {
            self.halted = None;
        }
        if logging {
            if let Some(reason) = step.reset {
                tracing::info!(?media, reason = reason.label(), "session reset");
            }
            if let (Some(signal), Some(session)) = (step.cycle, self.machine.session()) {
                tracing::info!(
                    ?media,
                    via = signal.label(),
                    cycles = session.cycles(),
                    "cycle detected"
                );
            }
        }
        let Some(reason) = step.stop else {
            return;
        };
        if logging && let Some(session) = self.machine.session() {
            tracing::info!(
                ?media,
                reason = reason.label(),
                accumulated = %Secs(session.accumulated()),
                cycles = session.cycles(),
                "stop rule reached"
            );
        }
        let halted = halt(&mut self.host, media, reason, logging);
        if logging {
            match halted {
                Halted::Paused => {}
                Halted::Muted => tracing::info!(?media, "muted"),
                Halted::Failed => tracing::error!(?media, "playback left running"),
            }
        }
        self.halted = Some(halted);
    }

    fn apply(&mut self, commands: Vec<Command>) {
        for command in commands {
            let result = match command {
                Command::Watch(spec) => self.host.watch(&spec),
                Command::Unwatch => self.host.unwatch(),
                Command::Start(timer, period) => self.host.start_timer(timer, period),
                Command::Cancel(timer) => self.host.cancel_timer(timer),
            };
            if self.logging() {
                match result {
                    Ok(()) => tracing::debug!(?command, "host command"),
                    Err(err) => tracing::warn!(?command, %err, "host command failed"),
                }
            }
        }
    }
}
