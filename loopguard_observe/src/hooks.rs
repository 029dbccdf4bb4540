// Copyright 2025 the Loopguard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-element listener registration.
//!
//! The observer listens to exactly one media element at a time. All event
//! kinds are registered in one host call and removed in one host call, so a
//! switch between elements never leaves a partial set behind on the old one.

use core::fmt::Debug;

use crate::error::HostError;
use crate::host::Host;

bitflags::bitflags! {
    /// Media event kinds the observer subscribes to.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MediaEvents: u8 {
        /// Position update.
        const PROGRESS = 0b0000_0001;
        /// End of media reached.
        const ENDED    = 0b0000_0010;
        /// Position jump started.
        const SEEKING  = 0b0000_0100;
        /// Playback paused.
        const PAUSED   = 0b0000_1000;
        /// Playback (re)started.
        const PLAYING  = 0b0001_0000;
        /// New media metadata loaded.
        const METADATA = 0b0010_0000;
    }
}

/// A single media event delivered by the host.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MediaEvent {
    /// Position update.
    Progress,
    /// End of media reached.
    Ended,
    /// Position jump started.
    Seeking,
    /// Playback paused.
    Paused,
    /// Playback (re)started.
    Playing,
    /// New media metadata loaded.
    MetadataLoaded,
}

impl MediaEvent {
    /// The registration flag for this kind.
    pub fn kind(self) -> MediaEvents {
        match self {
            Self::Progress => MediaEvents::PROGRESS,
            Self::Ended => MediaEvents::ENDED,
            Self::Seeking => MediaEvents::SEEKING,
            Self::Paused => MediaEvents::PAUSED,
            Self::Playing => MediaEvents::PLAYING,
            Self::MetadataLoaded => MediaEvents::METADATA,
        }
    }
}

/// The current registration, if any.
#[derive(Clone, Debug)]
pub struct Listeners<M> {
    current: Option<(M, MediaEvents)>,
}

impl<M> Default for Listeners<M> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<M: Copy + Eq + Debug> Listeners<M> {
    /// Element currently listened to.
    pub fn media(&self) -> Option<M> {
        self.current.map(|(m, _)| m)
    }

    /// Whether an event of `kind` from `media` should be handled.
    ///
    /// Events from a previous element that slipped through before its
    /// listeners were removed are rejected here.
    pub fn accepts(&self, media: M, kind: MediaEvents) -> bool {
        matches!(self.current, Some((m, events)) if m == media && events.contains(kind))
    }

    /// Register every event kind on `media`, replacing any prior registration.
    ///
    /// The registration is recorded even when the host call fails so a later
    /// [`detach`](Self::detach) still attempts removal.
    pub(crate) fn attach<H: Host<Media = M>>(
        &mut self,
        host: &mut H,
        media: M,
    ) -> Result<(), HostError> {
        let detached = self.detach(host);
        self.current = Some((media, MediaEvents::all()));
        host.listen(media, MediaEvents::all())?;
        detached.map(|_| ())
    }

    /// Remove the whole registration. Returns the element that was released.
    pub(crate) fn detach<H: Host<Media = M>>(
        &mut self,
        host: &mut H,
    ) -> Result<Option<M>, HostError> {
        let Some((media, events)) = self.current.take() else {
            return Ok(None);
        };
        host.unlisten(media, events)?;
        Ok(Some(media))
    }
}
