// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spatial damage derived from compositing changes.

use alloc::vec::Vec;

use kurbo::Rect;
use strata_core::compositing::CompositingChanges;
use strata_core::layer::LayerStore;

/// A region of the output that needs repainting.
///
/// A layer that gains or loses a backing moves its pixels between surfaces,
/// so both the old and new surface need repainting over its bounds.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DamageRegion {
    /// The entire output needs repainting.
    #[default]
    Full,
    /// A list of absolute rectangles that need repainting.
    Rects(Vec<Rect>),
    /// Nothing changed; the previous frame can be reused.
    None,
}

impl DamageRegion {
    /// Computes the damage implied by one compositing pass.
    ///
    /// Toggling compositing mode damages everything. Otherwise the bounds of
    /// each layer that gained or lost a backing are damaged; empty bounds
    /// are skipped. Destroyed layers contribute the bounds they had when
    /// destroyed.
    #[must_use]
    pub fn from_changes(store: &LayerStore, changes: &CompositingChanges) -> Self {
        if changes.compositing_mode_changed.is_some() {
            return Self::Full;
        }
        let dropped = |idx: u32| changes.dropped.iter().any(|&(d, _)| d == idx);
        let live = changes
            .newly_composited
            .iter()
            .chain(changes.no_longer_composited.iter().filter(|&&idx| !dropped(idx)))
            .map(|&idx| store.bounds_at(idx));
        let rects: Vec<Rect> = live
            .chain(changes.dropped.iter().map(|&(_, r)| r))
            .filter(|r| r.area() > 0.0)
            .collect();
        if rects.is_empty() {
            Self::None
        } else {
            Self::Rects(rects)
        }
    }

    /// Returns `true` if no region needs repainting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns the union of all damaged rectangles, or `None` for
    /// [`Full`](Self::Full) and [`None`](Self::None).
    #[must_use]
    pub fn bounding_box(&self) -> Option<Rect> {
        match self {
            Self::Rects(rects) => rects.iter().copied().reduce(|a, b| a.union(b)),
            _ => None,
        }
    }

    /// Merges another damage region into this one.
    pub fn merge(&mut self, other: &Self) {
        match (&mut *self, other) {
            (Self::Full, _) | (_, Self::None) => {}
            (_, Self::Full) => *self = Self::Full,
            (Self::None, _) => *self = other.clone(),
            (Self::Rects(a), Self::Rects(b)) => a.extend_from_slice(b),
        }
    }
}
