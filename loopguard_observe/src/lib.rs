// Copyright 2025 the Loopguard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loopguard Observe: keep a playback stop rule enforced on a page that keeps
//! swapping its media elements.
//!
//! ## Overview
//!
//! Single-page feeds recycle their nodes. The element playing now may be a
//! fresh node, the same node with new media loaded into it, or the same node
//! under a new route with nothing else changed. No single host signal covers
//! all of these, so the [`Observer`] listens to all of them and funnels every
//! one into the same idempotent re-evaluation:
//!
//! 1) Navigation events ([`Navigation`]) open and close the tracked view.
//! 2) Structural changes ([`Mutation`]) and two timers (a steady poll and a
//!    short startup burst, see [`schedule`]) trigger selection.
//! 3) Selection ([`loopguard_select`]) resolves the active item and its media
//!    element.
//! 4) The session machine ([`loopguard_session`]) attaches, resets in place,
//!    or leaves the session alone.
//! 5) Media events ([`MediaEvent`]) from the one registered element feed the
//!    cycle and elapsed-time accounting; when the stop rule fires, the element
//!    is paused, or muted if pausing fails (see [`actuate`]).
//!
//! ## Layering
//!
//! The host is abstracted by [`Host`] and [`Actuator`]. The observer never
//! blocks and never returns an error: host failures are logged through
//! `tracing` and otherwise ignored, so a misbehaving host degrades to the
//! observer doing nothing.
//!
//! ## Threading
//!
//! Everything runs synchronously inside the host's callbacks on one thread.
//! Overlapping producers need no coordination because re-evaluating an
//! unchanged page is a no-op.

pub mod actuate;
pub mod error;
pub mod hooks;
pub mod host;
mod observer;
pub mod schedule;

pub use error::{ActuationError, HostError};
pub use hooks::{MediaEvent, MediaEvents};
pub use host::{Actuator, Host, Mutation, Navigation};
pub use observer::Observer;
