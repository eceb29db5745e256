// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint plan: the layers of one tree in back-to-front order, each with the
//! backing it paints into.

use alloc::vec::Vec;

use kurbo::Rect;
use strata_core::compositing::CompositingState;
use strata_core::layer::{LayerId, LayerStore};
use strata_core::reasons::CompositingReasons;

/// Where a layer's content ends up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PaintTarget {
    /// Compositing mode is off; everything paints into one software surface.
    Software,
    /// The layer has a backing of its own.
    OwnBacking,
    /// The layer paints into the squashed backing owned by the given
    /// composited ancestor.
    Squashed(LayerId),
    /// The layer paints into the backing of the given composited ancestor.
    Ancestor(LayerId),
}

/// A single entry in the paint plan.
///
/// Items are produced in back-to-front order: for each layer, its negative
/// z-order subtree, then the layer itself, then its normal-flow and positive
/// z-order subtrees.
#[derive(Clone, Copy, Debug)]
pub struct PaintItem {
    /// The layer this item originates from.
    pub layer: LayerId,
    /// Backing the layer paints into.
    pub target: PaintTarget,
    /// Whether the layer paints its own box. Layers that only clip their
    /// overflow leave painting to an ancestor.
    pub paints_self: bool,
    /// Absolute clipped bounds.
    pub bounds: Rect,
    /// Reasons recorded by the last compositing pass.
    pub reasons: CompositingReasons,
    /// Nesting depth in the paint walk; the root is at 0.
    pub depth: u32,
}

/// An ordered list of paint items for a whole layer tree.
#[derive(Clone, Debug, Default)]
pub struct PaintPlan {
    /// Paint items in back-to-front order.
    pub items: Vec<PaintItem>,
}

impl PaintPlan {
    /// Builds the plan for `store` from its stacking lists and the last
    /// compositing pass.
    ///
    /// # Panics
    ///
    /// Panics if the stacking lists are out of date. A compositing pass
    /// leaves them fresh; tree edits after it require
    /// [`LayerStore::update_stacking_lists`].
    #[must_use]
    pub fn build(store: &LayerStore) -> Self {
        let mut plan = Self::default();
        plan.rebuild(store);
        plan
    }

    /// Like [`build`](Self::build), but reuses this plan's allocation.
    pub fn rebuild(&mut self, store: &LayerStore) {
        self.items.clear();
        let software = !store.compositing_mode_enabled();
        self.walk(store, store.root(), None, software, 0);
    }

    /// Clears the plan for reuse.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of distinct backings the plan paints into: one per layer with
    /// its own backing, plus one per squashed backing owner.
    #[must_use]
    pub fn backing_count(&self) -> usize {
        let mut owners: Vec<LayerId> = Vec::new();
        let mut own = 0;
        for item in &self.items {
            match item.target {
                PaintTarget::OwnBacking => own += 1,
                PaintTarget::Squashed(owner) if !owners.contains(&owner) => owners.push(owner),
                _ => {}
            }
        }
        own + owners.len()
    }

    fn walk(
        &mut self,
        store: &LayerStore,
        id: LayerId,
        ancestor: Option<LayerId>,
        software: bool,
        depth: u32,
    ) {
        let state = store.compositing_state(id);
        let target = if software {
            PaintTarget::Software
        } else {
            match state {
                CompositingState::PaintsIntoOwnBacking => PaintTarget::OwnBacking,
                CompositingState::PaintsIntoSquashedBacking => {
                    PaintTarget::Squashed(ancestor.unwrap_or_else(|| store.root()))
                }
                CompositingState::NotComposited => {
                    PaintTarget::Ancestor(ancestor.unwrap_or_else(|| store.root()))
                }
            }
        };
        // Squashed layers share a backing; their descendants paint into it
        // through the owner.
        let child_ancestor = match target {
            PaintTarget::OwnBacking => Some(id),
            PaintTarget::Squashed(owner) => Some(owner),
            _ => ancestor,
        };

        let lists = store.stacking_lists(id);
        for c in lists.negative_z_order() {
            self.walk(store, c, child_ancestor, software, depth + 1);
        }
        self.items.push(PaintItem {
            layer: id,
            target,
            paints_self: store.is_self_painting(id),
            bounds: store.bounds(id),
            reasons: store.compositing_reasons(id),
            depth,
        });
        for c in lists.normal_flow().chain(lists.positive_z_order()) {
            self.walk(store, c, child_ancestor, software, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use strata_core::compositing::CompositingUpdater;
    use strata_core::config::CompositingConfig;
    use strata_core::layer::{BoxId, LayerStyle, Position};
    use strata_core::trace::Tracer;
    use strata_core::transform::Transform3d;

    use super::*;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect::new(x, y, x + w, y + h)
    }

    fn z(z: i32) -> LayerStyle {
        LayerStyle::positioned(Position::Absolute, Some(z))
    }

    fn setup() -> (LayerStore, [LayerId; 4]) {
        let mut store = LayerStore::new(BoxId(0), LayerStyle::default());
        let root = store.root();
        store.set_bounds(root, rect(0.0, 0.0, 800.0, 600.0));
        let neg = store.create_layer(root, BoxId(1), z(-1));
        store.set_bounds(neg, rect(0.0, 0.0, 10.0, 10.0));
        let tilted = store.create_layer(
            root,
            BoxId(2),
            LayerStyle {
                transform: Some(Transform3d::from_rotation_y(0.3)),
                ..z(1)
            },
        );
        store.set_bounds(tilted, rect(100.0, 100.0, 50.0, 50.0));
        let over = store.create_layer(root, BoxId(3), z(2));
        store.set_bounds(over, rect(120.0, 120.0, 50.0, 50.0));
        (store, [root, neg, tilted, over])
    }

    #[test]
    fn items_are_back_to_front() {
        let (mut store, [root, neg, tilted, over]) = setup();
        let _ = CompositingUpdater::new(CompositingConfig::low_dpi())
            .update(&mut store, &mut Tracer::none());

        let plan = PaintPlan::build(&store);
        let order: Vec<_> = plan.items.iter().map(|i| i.layer).collect();
        assert_eq!(order, [neg, root, tilted, over]);
        assert_eq!(plan.items[0].depth, 1);
        assert_eq!(plan.items[1].depth, 0);
    }

    #[test]
    fn targets_follow_compositing_state() {
        let (mut store, [root, neg, tilted, over]) = setup();
        let _ = CompositingUpdater::new(CompositingConfig::low_dpi())
            .update(&mut store, &mut Tracer::none());

        let plan = PaintPlan::build(&store);
        let target = |id: LayerId| {
            plan.items
                .iter()
                .find(|i| i.layer == id)
                .map(|i| i.target)
        };
        assert_eq!(target(root), Some(PaintTarget::OwnBacking));
        assert_eq!(target(neg), Some(PaintTarget::Ancestor(root)));
        assert_eq!(target(tilted), Some(PaintTarget::OwnBacking));
        assert_eq!(target(over), Some(PaintTarget::Squashed(root)));
        assert_eq!(plan.backing_count(), 3);
    }

    #[test]
    fn software_mode_targets_software() {
        let (mut store, _) = setup();
        let _ = CompositingUpdater::new(CompositingConfig::software())
            .update(&mut store, &mut Tracer::none());

        let plan = PaintPlan::build(&store);
        assert!(plan.items.iter().all(|i| i.target == PaintTarget::Software));
        assert_eq!(plan.backing_count(), 0);
    }

    #[test]
    #[should_panic(expected = "stacking lists are out of date")]
    fn stale_lists_panic() {
        let (store, _) = setup();
        let _ = PaintPlan::build(&store);
    }
}
