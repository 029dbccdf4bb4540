// Copyright 2025 the Loopguard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loopguard Select: pick the item a user is currently watching.
//!
//! ## Overview
//!
//! A feed renders many items at once, usually stacked vertically, and only one
//! of them is "the one being watched". This crate resolves that item from two
//! kinds of evidence:
//!
//! 1) An explicit marker. If the host can name an item it flagged as active,
//!    that item wins outright.
//! 2) Geometry. Otherwise every candidate is scored against the viewport:
//!    the vertical overlap with the viewport, minus the distance between the
//!    viewport's vertical center and the nearest point of the item's vertical
//!    span. The best score wins and ties keep the earlier candidate.
//!
//! An empty candidate list yields `None`. That is not an error: callers should
//! treat it as "not yet determinable" and try again on the next observation.
//!
//! Selection is pure. It does not query the host or remember past answers.
//!
//! This crate is `no_std` and does not allocate.
//!
//! ## Example
//!
//! ```
//! use kurbo::Rect;
//! use loopguard_select::{Candidate, SelectedBy, select};
//!
//! let viewport = Rect::new(0.0, 0.0, 400.0, 800.0);
//! let candidates = [
//!     Candidate { item: 1_u32, bounds: Rect::new(0.0, -700.0, 400.0, 100.0) },
//!     Candidate { item: 2_u32, bounds: Rect::new(0.0, 100.0, 400.0, 900.0) },
//! ];
//!
//! let picked = select(None, &candidates, viewport).unwrap();
//! assert_eq!(picked.item, 2);
//! assert_eq!(picked.by, SelectedBy::Geometry);
//!
//! // A marker short-circuits geometry.
//! let picked = select(Some(1), &candidates, viewport).unwrap();
//! assert_eq!(picked.item, 1);
//! assert_eq!(picked.by, SelectedBy::Marker);
//! ```

#![no_std]

mod select;
mod types;

pub use select::{score, select};
pub use types::{Candidate, SelectedBy, Selection};
