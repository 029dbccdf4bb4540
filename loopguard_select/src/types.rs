// Copyright 2025 the Loopguard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inputs and outputs of selection.

use kurbo::Rect;

/// A renderable item that may be the active one, with its bounds in viewport
/// coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Candidate<K> {
    /// Host handle for the item.
    pub item: K,
    /// Bounding box in the same space as the viewport.
    pub bounds: Rect,
}

/// Which evidence decided a [`Selection`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SelectedBy {
    /// The host flagged the item as active.
    Marker,
    /// The item had the best viewport score.
    Geometry,
}

/// Result of [`select`](crate::select).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Selection<K> {
    /// The winning item.
    pub item: K,
    /// How it was chosen.
    pub by: SelectedBy,
}
