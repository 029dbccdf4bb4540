// Copyright 2025 the Loopguard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Marker and viewport based selection.

use kurbo::Rect;

use crate::types::{Candidate, SelectedBy, Selection};

/// Score `bounds` against `viewport`; higher is a better match.
///
/// The score is the vertical overlap between the two boxes minus the distance
/// from the viewport's vertical center to the nearest point of `bounds`'
/// vertical span. An item centered on the viewport and covering it scores the
/// viewport height; items entirely off screen score negative. Bounds without
/// a finite vertical span (no layout yet) score NaN.
pub fn score(bounds: Rect, viewport: Rect) -> f64 {
    if !(bounds.y0.is_finite() && bounds.y1.is_finite()) {
        return f64::NAN;
    }
    let center = viewport.center().y;
    let nearest = center.max(bounds.y0).min(bounds.y1);
    let overlap = (bounds.y1.min(viewport.y1) - bounds.y0.max(viewport.y0)).max(0.0);
    let distance = if nearest > center {
        nearest - center
    } else {
        center - nearest
    };
    overlap - distance
}

/// Pick the active item.
///
/// `marked` wins when present. Otherwise the candidate with the highest
/// [`score`] is returned; on equal scores the earliest candidate is kept.
/// Candidates with a NaN score are never selected.
pub fn select<K: Copy>(
    marked: Option<K>,
    candidates: &[Candidate<K>],
    viewport: Rect,
) -> Option<Selection<K>> {
    if let Some(item) = marked {
        return Some(Selection {
            item,
            by: SelectedBy::Marker,
        });
    }

    // Single pass; strict comparison keeps the first of equal scores.
    let mut best: Option<K> = None;
    let mut best_score = f64::NEG_INFINITY;
    for c in candidates {
        let s = score(c.bounds, viewport);
        if s > best_score {
            best_score = s;
            best = Some(c.item);
        }
    }

    best.map(|item| Selection {
        item,
        by: SelectedBy::Geometry,
    })
}
