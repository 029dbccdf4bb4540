// Copyright 2025 the Loopguard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host environment as seen by the observer.
//!
//! A host is whatever embeds the page: a browser binding, a test double, a
//! scripted simulation. It answers queries about the current route and the
//! rendered items, and carries out commands (listen, watch, timers). Input
//! flows the other way, through the [`Observer`](crate::Observer) entry points.

use core::fmt::Debug;
use core::time::Duration;

use kurbo::Rect;
use loopguard_select::Candidate;
use loopguard_session::Playback;

use crate::error::{ActuationError, HostError};
use crate::hooks::MediaEvents;
use crate::schedule::{Timer, WatchSpec};

/// Queries and commands provided by the embedding page.
pub trait Host {
    /// Handle of a rendered container that may hold media.
    type Item: Copy + Eq + Debug;
    /// Handle of a media element. Equality is element identity.
    type Media: Copy + Eq + Debug;

    /// Current route identity (for example the location path).
    fn route(&self) -> &str;

    /// Whether the current route is one where tracking applies.
    fn in_scope(&self) -> bool;

    /// The item the page explicitly flags as active, if any.
    fn marked_active(&self) -> Option<Self::Item>;

    /// All rendered items that could be active, in document order.
    fn candidates(&self) -> Vec<Candidate<Self::Item>>;

    /// The visible region, in the same space as candidate bounds.
    fn viewport(&self) -> Rect;

    /// The media element inside `item`, if it has one yet.
    fn media_of(&self, item: Self::Item) -> Option<Self::Media>;

    /// Current position and duration of `media`.
    fn playback(&self, media: Self::Media) -> Playback;

    /// Deliver `events` for `media` to [`Observer::media_event`](crate::Observer::media_event).
    fn listen(&mut self, media: Self::Media, events: MediaEvents) -> Result<(), HostError>;

    /// Stop delivering `events` for `media`.
    fn unlisten(&mut self, media: Self::Media, events: MediaEvents) -> Result<(), HostError>;

    /// Start reporting structural changes described by `spec` to
    /// [`Observer::structure_changed`](crate::Observer::structure_changed).
    fn watch(&mut self, spec: &WatchSpec) -> Result<(), HostError>;

    /// Stop reporting structural changes.
    fn unwatch(&mut self) -> Result<(), HostError>;

    /// Fire [`Observer::timer_fired`](crate::Observer::timer_fired) for `timer` every `period`.
    fn start_timer(&mut self, timer: Timer, period: Duration) -> Result<(), HostError>;

    /// Cancel a repeating timer.
    fn cancel_timer(&mut self, timer: Timer) -> Result<(), HostError>;
}

/// Playback commands on a media element.
pub trait Actuator<M> {
    /// Pause playback.
    fn pause(&mut self, media: M) -> Result<(), ActuationError>;
    /// Silence playback.
    fn mute(&mut self, media: M) -> Result<(), ActuationError>;
}

/// Host navigation lifecycle events.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Navigation {
    /// The application started a route transition.
    RouteStart,
    /// The application finished a route transition.
    RouteFinish,
    /// The application replaced page data without a transition.
    DataUpdated,
    /// Browser history moved.
    HistoryPop,
    /// The document finished loading.
    DomReady,
}

impl Navigation {
    /// Short label used in logs.
    pub fn label(self) -> &'static str {
        match self {
            Self::RouteStart => "route-start",
            Self::RouteFinish => "route-finish",
            Self::DataUpdated => "data-updated",
            Self::HistoryPop => "history-pop",
            Self::DomReady => "dom-ready",
        }
    }
}

/// A structural change reported by the host watch.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Mutation {
    /// An attribute changed on some node in scope.
    Attribute(String),
    /// Children were inserted or removed.
    Children {
        /// Inserted node count.
        added: usize,
        /// Removed node count.
        removed: usize,
    },
}
