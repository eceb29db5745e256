// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-pass change reporting.
//!
//! [`CompositingChanges`] uses raw slot indices (`u32`) rather than
//! [`LayerId`](crate::layer::LayerId) handles so that consumers can index
//! directly into the store via the `*_at()` accessors (e.g.
//! [`bounds_at`](crate::layer::LayerStore::bounds_at)) without paying for
//! generation checks on every access.

use alloc::vec::Vec;

use kurbo::Rect;

use crate::dirty;
use crate::layer::LayerStore;
use crate::overlap::OverlapStats;

/// The set of changes produced by a single compositing pass.
#[derive(Clone, Debug, Default)]
pub struct CompositingChanges {
    /// Layers that gained a backing (own or squashed).
    pub newly_composited: Vec<u32>,
    /// Layers that lost their backing, including composited layers that
    /// were destroyed.
    pub no_longer_composited: Vec<u32>,
    /// Composited layers destroyed since the last pass, with the bounds they
    /// had when destroyed. Their slots may already hold new layers, so
    /// [`bounds_at`](LayerStore::bounds_at) does not describe them.
    pub dropped: Vec<(u32, Rect)>,
    /// Layers whose reasons or compositing state changed.
    pub reasons_changed: Vec<u32>,
    /// Layers whose style was set since the last pass.
    pub style: Vec<u32>,
    /// Layers whose absolute bounds moved, directly or through an ancestor.
    pub geometry: Vec<u32>,
    /// Layers added since the last pass.
    pub added: Vec<u32>,
    /// Layers removed since the last pass.
    pub removed: Vec<u32>,
    /// Whether the tree topology changed.
    pub topology_changed: bool,
    /// `Some(enabled)` when the pass toggled compositing mode.
    pub compositing_mode_changed: Option<bool>,
    /// Overlap map usage during the pass.
    pub overlap: OverlapStats,
}

impl CompositingChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.newly_composited.clear();
        self.no_longer_composited.clear();
        self.dropped.clear();
        self.reasons_changed.clear();
        self.style.clear();
        self.geometry.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
        self.compositing_mode_changed = None;
        self.overlap = OverlapStats::default();
    }

    /// Returns `true` if the pass changed which layers are composited.
    #[must_use]
    pub fn composited_set_changed(&self) -> bool {
        !self.newly_composited.is_empty() || !self.no_longer_composited.is_empty()
    }
}

impl LayerStore {
    /// Drains every dirty channel and lifecycle list into `changes`.
    pub(crate) fn drain_input_changes(&mut self, changes: &mut CompositingChanges) {
        changes.style = self
            .dirty
            .drain(dirty::STYLE)
            .deterministic()
            .run()
            .collect();

        // GEOMETRY propagates, so collect every affected descendant.
        changes.geometry = self
            .dirty
            .drain(dirty::GEOMETRY)
            .affected()
            .deterministic()
            .run()
            .collect();

        let topology: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();
        changes.topology_changed = !topology.is_empty();

        // Move lifecycle lists.
        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
        core::mem::swap(&mut self.pending_dropped, &mut changes.dropped);
        self.pending_added.clear();
        self.pending_removed.clear();
        self.pending_dropped.clear();
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;

    use super::*;
    use crate::layer::{BoxId, LayerStyle, Position};

    fn positioned() -> LayerStyle {
        LayerStyle::positioned(Position::Relative, None)
    }

    #[test]
    fn drain_reports_lifecycle_and_clears() {
        let mut store = LayerStore::new(BoxId(0), LayerStyle::default());
        let root = store.root();
        let a = store.create_layer(root, BoxId(1), positioned());

        let mut changes = CompositingChanges::default();
        store.drain_input_changes(&mut changes);
        assert!(changes.added.contains(&a.index()));
        assert!(changes.topology_changed);

        store.drain_input_changes(&mut changes);
        assert!(changes.added.is_empty());
        assert!(!changes.topology_changed);
        assert!(changes.style.is_empty());
    }

    #[test]
    fn geometry_propagates_to_descendants() {
        let mut store = LayerStore::new(BoxId(0), LayerStyle::default());
        let root = store.root();
        let a = store.create_layer(root, BoxId(1), positioned());
        let b = store.create_layer(a, BoxId(2), positioned());
        let c = store.create_layer(root, BoxId(3), positioned());

        let mut changes = CompositingChanges::default();
        store.drain_input_changes(&mut changes);

        store.set_bounds(a, Rect::new(0.0, 0.0, 10.0, 10.0));
        store.drain_input_changes(&mut changes);
        assert!(changes.geometry.contains(&a.index()));
        assert!(changes.geometry.contains(&b.index()));
        assert!(!changes.geometry.contains(&c.index()));
    }

    #[test]
    fn style_is_local() {
        let mut store = LayerStore::new(BoxId(0), LayerStyle::default());
        let root = store.root();
        let a = store.create_layer(root, BoxId(1), positioned());
        let b = store.create_layer(a, BoxId(2), positioned());

        let mut changes = CompositingChanges::default();
        store.drain_input_changes(&mut changes);

        store.set_style(a, LayerStyle::positioned(Position::Absolute, Some(2)));
        store.drain_input_changes(&mut changes);
        assert_eq!(changes.style, [a.index()]);
        assert!(!changes.style.contains(&b.index()));
    }

    #[test]
    fn removed_layers_are_reported() {
        let mut store = LayerStore::new(BoxId(0), LayerStyle::default());
        let root = store.root();
        let a = store.create_layer(root, BoxId(1), positioned());

        let mut changes = CompositingChanges::default();
        store.drain_input_changes(&mut changes);
        store.destroy_layer(a);
        store.drain_input_changes(&mut changes);
        assert_eq!(changes.removed, [a.index()]);
        assert!(changes.topology_changed);
    }
}
