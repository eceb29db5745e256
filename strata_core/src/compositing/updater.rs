// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The compositing-requirements walk.
//!
//! The walk visits every layer once, depth first, in paint order: a layer's
//! negative z-order list, then its normal-flow list, then its positive
//! z-order list. Each child subtree is fully visited before the next sibling.
//!
//! Per layer, reasons are gathered in this order:
//!
//! 1. Direct reasons from the [`ReasonPolicy`], dropped when the layer cannot
//!    be composited.
//! 2. Overlap: a layer painted after composited content at its level is
//!    assumed to overlap it, unless overlap testing is active, in which case
//!    the [`OverlapMap`] decides.
//! 3. Negative z-order children that composite force their stacking context
//!    to composite too, so that they stay underneath its content.
//! 4. Subtree reasons: effects that must apply to composited descendants.
//! 5. The root is composited iff anything else is; otherwise compositing
//!    mode is turned off and all reasons are cleared.

use alloc::vec;
use alloc::vec::Vec;

use kurbo::Rect;

use super::changes::CompositingChanges;
use super::CompositingState;
use crate::config::CompositingConfig;
use crate::layer::{BlendMode, ContentKind, INVALID, LayerStore, Position};
use crate::overlap::{OverlapMap, is_empty};
use crate::policy::{DefaultReasonPolicy, ReasonPolicy};
use crate::reasons::CompositingReasons;
use crate::trace::{CompositingModeEvent, PassBeginEvent, PassSummary, Tracer};
#[cfg(feature = "trace-rich")]
use crate::trace::{LayerDecisionEvent, OverlapContextEvent, OverlapContextOp};

/// Decides which layers are composited.
///
/// Holds the settings and the direct-reason policy; all per-pass state lives
/// on the stack of [`update`](Self::update).
#[derive(Debug)]
pub struct CompositingUpdater<P = DefaultReasonPolicy> {
    config: CompositingConfig,
    policy: P,
    pass_index: u64,
}

impl CompositingUpdater {
    /// Creates an updater using the [`DefaultReasonPolicy`] for `config`.
    #[must_use]
    pub fn new(config: CompositingConfig) -> Self {
        Self::with_policy(config, DefaultReasonPolicy::new(config))
    }
}

impl<P: ReasonPolicy> CompositingUpdater<P> {
    /// Creates an updater with a custom direct-reason policy.
    #[must_use]
    pub fn with_policy(config: CompositingConfig, policy: P) -> Self {
        Self {
            config,
            policy,
            pass_index: 0,
        }
    }

    /// Returns the settings.
    #[must_use]
    pub fn config(&self) -> &CompositingConfig {
        &self.config
    }

    /// Returns the number of passes run so far.
    #[must_use]
    pub fn pass_index(&self) -> u64 {
        self.pass_index
    }

    /// Runs one compositing pass over `store` and returns what changed.
    pub fn update(
        &mut self,
        store: &mut LayerStore,
        tracer: &mut Tracer<'_>,
    ) -> CompositingChanges {
        let mut changes = CompositingChanges::default();
        self.update_into(store, tracer, &mut changes);
        changes
    }

    /// Like [`update`](Self::update), but reuses a caller-provided buffer.
    pub fn update_into(
        &mut self,
        store: &mut LayerStore,
        tracer: &mut Tracer<'_>,
        changes: &mut CompositingChanges,
    ) {
        changes.clear();
        let pass_index = self.pass_index;
        self.pass_index += 1;

        tracer.pass_begin(&PassBeginEvent {
            pass_index,
            layer_count: store.layer_count() as u32,
        });

        store.drain_input_changes(changes);
        store.update_stacking_lists();

        let previous_reasons = store.reasons.clone();
        let previous_state = store.state.clone();
        let previous_mode = store.compositing_mode;

        let root = store.root;
        let mut walk = Walk {
            store,
            policy: &self.policy,
            config: self.config,
            map: OverlapMap::new(),
            unclipped: Vec::new(),
            tracer,
            #[cfg(feature = "trace-rich")]
            pass_index,
            visited: 0,
            mode: false,
        };
        let mut data = RecursionData::root();
        let mut any_3d = false;
        let _ = walk.visit(root, &mut data, &mut any_3d);
        debug_assert_eq!(walk.map.depth(), 1, "unbalanced overlap contexts");

        let Walk {
            store,
            map,
            visited,
            mode,
            tracer,
            ..
        } = walk;

        if !mode {
            store.clear_compositing_outputs();
        }
        store.compositing_mode = mode;
        if mode != previous_mode {
            changes.compositing_mode_changed = Some(mode);
            tracer.compositing_mode(&CompositingModeEvent {
                pass_index,
                enabled: mode,
            });
        }

        // Destroyed layers never show up in the walk below.
        changes
            .no_longer_composited
            .extend(changes.dropped.iter().map(|&(idx, _)| idx));

        // Slots allocated since the last pass have no previous decision.
        let mut is_fresh = vec![false; store.len as usize];
        for &idx in &changes.added {
            is_fresh[idx as usize] = true;
        }

        let mut own_backings = 0;
        let mut squashed = 0;
        for id in store.layers() {
            let i = id.index() as usize;
            let state = store.state[i];
            match state {
                CompositingState::PaintsIntoOwnBacking => own_backings += 1,
                CompositingState::PaintsIntoSquashedBacking => squashed += 1,
                CompositingState::NotComposited => {}
            }
            let (was_reasons, was_state) = if i < previous_state.len() {
                (previous_reasons[i], previous_state[i])
            } else {
                (CompositingReasons::empty(), CompositingState::NotComposited)
            };
            let fresh = is_fresh[i];
            let was_composited = !fresh && was_state.is_composited();
            if state.is_composited() && !was_composited {
                changes.newly_composited.push(id.index());
            } else if !state.is_composited() && was_composited {
                changes.no_longer_composited.push(id.index());
            }
            if fresh || was_reasons != store.reasons[i] || was_state != state {
                changes.reasons_changed.push(id.index());
            }
        }

        changes.overlap = map.stats();
        tracer.pass_summary(&PassSummary {
            pass_index,
            layers_visited: visited,
            own_backings,
            squashed,
            compositing_mode: mode,
            overlap: changes.overlap,
        });
    }
}

/// State threaded through the walk, one copy per recursion level.
#[derive(Clone, Copy, Debug)]
struct RecursionData {
    /// Nearest composited ancestor, if any.
    compositing_ancestor: Option<u32>,
    /// Something at this level has been composited.
    subtree_is_compositing: bool,
    /// The overlap map can be trusted for layers at this level.
    testing_overlap: bool,
    /// A composited layer with a blend mode sits below this level without an
    /// isolating stacking context in between.
    has_unisolated_composited_blending_descendant: bool,
}

impl RecursionData {
    fn root() -> Self {
        Self {
            compositing_ancestor: None,
            subtree_is_compositing: false,
            testing_overlap: true,
            has_unisolated_composited_blending_descendant: false,
        }
    }
}

/// What a layer scrolls along with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScrollAnchor {
    Viewport,
    Scroller(u32),
    Document,
}

struct Walk<'a, 't, P: ?Sized> {
    store: &'a mut LayerStore,
    policy: &'a P,
    config: CompositingConfig,
    map: OverlapMap,
    /// Out-of-flow layers that escaped a clipping ancestor, in paint order.
    unclipped: Vec<u32>,
    tracer: &'a mut Tracer<'t>,
    #[cfg(feature = "trace-rich")]
    pass_index: u64,
    visited: u32,
    mode: bool,
}

impl<P: ReasonPolicy + ?Sized> Walk<'_, '_, P> {
    /// Visits `idx` and its subtree. Returns the union of the absolute bounds
    /// of the layer and every layer below it in paint order.
    fn visit(
        &mut self,
        idx: u32,
        current: &mut RecursionData,
        descendant_has_3d: &mut bool,
    ) -> Rect {
        self.visited += 1;
        let i = idx as usize;
        let epoch = self.store.epoch;
        let id = self.store.id_at(idx);
        let is_root = idx == self.store.root;
        let bounds = self.store.bounds[i];
        let style = self.store.style[i];
        let can_be_composited = self.can_be_composited(idx);

        let mut direct = self.policy.direct_reasons(self.store, id);
        if let Some(ancestor) = current.compositing_ancestor {
            if self.store.style[ancestor as usize].content == ContentKind::Video {
                direct |= CompositingReasons::VIDEO_OVERLAY;
            }
        }
        if !can_be_composited {
            direct = CompositingReasons::empty();
        }
        let mut reasons = direct;

        let mut overlap = if current.subtree_is_compositing {
            CompositingReasons::ASSUMED_OVERLAP
        } else {
            CompositingReasons::empty()
        };
        if current.testing_overlap && !direct.requires_compositing_or_squashing() {
            overlap = if self.map.overlaps(bounds) {
                CompositingReasons::OVERLAP
            } else {
                CompositingReasons::empty()
            };
        }
        reasons |= overlap;

        if self.config.prefer_compositing_to_lcd_text {
            let own_box = self.store.box_id[i];
            let store = &*self.store;
            let mut assumed = false;
            self.unclipped.retain(|&d| {
                if store.style[d as usize].containing_block == Some(own_box) {
                    return false;
                }
                if scroll_anchor(store, idx) != scroll_anchor(store, d) {
                    assumed = true;
                }
                true
            });
            if assumed {
                reasons |= CompositingReasons::ASSUMED_OVERLAP;
            }
            if reasons.contains(CompositingReasons::OUT_OF_FLOW_CLIPPING) {
                self.unclipped.push(idx);
            }
        }

        let mut child = RecursionData {
            subtree_is_compositing: false,
            has_unisolated_composited_blending_descendant: false,
            ..*current
        };

        let mut will_be_composited =
            can_be_composited && reasons.requires_compositing_or_squashing();
        if will_be_composited {
            current.subtree_is_compositing = true;
            child.compositing_ancestor = Some(idx);
            // Children paint into this backing until one of them composites,
            // so they need not test against anything behind this layer.
            self.begin_context();
            child.testing_overlap = true;
        }

        let mut any_descendant_has_3d = false;
        let mut descendant_bounds = bounds;
        let mut foreground = false;

        if self.store.is_stacking_context_at(idx) {
            let mut k = 0;
            while k < self.store.negative_z[i].len() {
                let c = self.store.negative_z[i][k];
                let r = self.visit(c, &mut child, &mut any_descendant_has_3d);
                descendant_bounds = union_nonempty(descendant_bounds, r);

                if child.subtree_is_compositing {
                    reasons |= CompositingReasons::NEGATIVE_Z_INDEX_CHILDREN;
                    if !will_be_composited {
                        // Composite with a separate foreground so the negative
                        // children stay between background and content.
                        child.compositing_ancestor = Some(idx);
                        self.begin_context();
                        will_be_composited = true;
                        foreground = true;

                        self.begin_context();
                        self.map.add(self.store.bounds[c as usize]);
                        self.finish_context();
                    }
                }
                k += 1;
            }
        }

        if foreground {
            // The foreground is a new backing for everything after the
            // negative list; start testing from an empty context.
            self.finish_context();
            self.begin_context();
            child.testing_overlap = true;
        }

        let mut k = 0;
        while k < self.store.normal_flow[i].len() {
            let c = self.store.normal_flow[i][k];
            let r = self.visit(c, &mut child, &mut any_descendant_has_3d);
            descendant_bounds = union_nonempty(descendant_bounds, r);
            k += 1;
        }
        let mut k = 0;
        while k < self.store.positive_z[i].len() {
            let c = self.store.positive_z[i][k];
            let r = self.visit(c, &mut child, &mut any_descendant_has_3d);
            descendant_bounds = union_nonempty(descendant_bounds, r);
            k += 1;
        }
        debug_assert_eq!(
            self.store.epoch, epoch,
            "layer lists mutated during the compositing walk"
        );

        // Layers that do not composite paint into their compositing
        // ancestor's backing and still count for overlap.
        if child
            .compositing_ancestor
            .is_some_and(|a| a != self.store.root)
        {
            self.map.add(bounds);
        }

        let is_stacking_context = self.store.is_stacking_context_at(idx);
        if is_stacking_context {
            self.store.isolates_composited_descendants[i] =
                child.has_unisolated_composited_blending_descendant;
        } else {
            self.store.isolates_composited_descendants[i] = false;
            current.has_unisolated_composited_blending_descendant |=
                child.has_unisolated_composited_blending_descendant;
        }

        let potential = self.store.potential_reasons[i];
        let mut subtree = CompositingReasons::empty();
        if child.subtree_is_compositing {
            subtree |= potential & CompositingReasons::COMBO_COMPOSITED_DESCENDANTS;
            if self.store.isolates_composited_descendants[i] {
                subtree |= CompositingReasons::ISOLATE_COMPOSITED_DESCENDANTS;
            }
        }
        if any_descendant_has_3d {
            subtree |= potential & CompositingReasons::COMBO_3D_DESCENDANTS;
        }
        reasons |= subtree;

        if !will_be_composited && can_be_composited && subtree.requires_compositing() {
            child.compositing_ancestor = Some(idx);
            // Effectively a no-op context; `add` targets the one below it.
            self.begin_context();
            self.map.add(descendant_bounds);
            will_be_composited = true;
        }

        if child.subtree_is_compositing {
            current.subtree_is_compositing = true;
        }
        self.store.has_compositing_descendant[i] = child.subtree_is_compositing;

        if is_root {
            let root_can = can_be_composited;
            if root_can
                && (child.subtree_is_compositing
                    || reasons.requires_compositing_or_squashing()
                    || self.config.force_compositing_mode)
            {
                will_be_composited = true;
                reasons |= CompositingReasons::ROOT;
                self.mode = true;
            } else {
                will_be_composited = false;
                reasons = CompositingReasons::empty();
                self.mode = false;
            }
        }

        if will_be_composited && style.blend_mode != BlendMode::Normal {
            current.has_unisolated_composited_blending_descendant = true;
        }

        // A clipping layer that composites contains its descendants'
        // animations, so their uncertainty does not leak out. The layer's own
        // animation or unbounded clip always leaks.
        let is_composited_clipping_layer = can_be_composited
            && reasons.contains(CompositingReasons::CLIPS_COMPOSITING_DESCENDANTS);
        if (!child.testing_overlap && !is_composited_clipping_layer)
            || style.animating_transform
            || style.unbounded_clip
        {
            current.testing_overlap = false;
        }

        if child.compositing_ancestor == Some(idx) {
            self.finish_context();
        }

        *descendant_has_3d |= any_descendant_has_3d || self.store.has_3d_transform_at(idx);

        let state = if !will_be_composited {
            CompositingState::NotComposited
        } else if self.config.layer_squashing
            && !reasons.requires_compositing()
            && reasons.requires_squashing()
        {
            CompositingState::PaintsIntoSquashedBacking
        } else {
            CompositingState::PaintsIntoOwnBacking
        };
        self.store.reasons[i] = reasons;
        self.store.state[i] = state;

        #[cfg(feature = "trace-rich")]
        self.tracer.layer_decision(&LayerDecisionEvent {
            pass_index: self.pass_index,
            layer_index: idx,
            reasons,
            state,
        });

        descendant_bounds
    }

    fn can_be_composited(&self, idx: u32) -> bool {
        self.config.accelerated_compositing
            && self.store.is_self_painting_at(idx)
            && !self.store.style[idx as usize].layout_pending
    }

    fn begin_context(&mut self) {
        self.map.begin_new_context();
        #[cfg(feature = "trace-rich")]
        self.tracer.overlap_context(&OverlapContextEvent {
            pass_index: self.pass_index,
            op: OverlapContextOp::Begin,
            depth: self.map.depth(),
        });
    }

    fn finish_context(&mut self) {
        self.map.finish_context();
        #[cfg(feature = "trace-rich")]
        self.tracer.overlap_context(&OverlapContextEvent {
            pass_index: self.pass_index,
            op: OverlapContextOp::Finish,
            depth: self.map.depth(),
        });
    }
}

impl LayerStore {
    /// Resets every compositing output, as when compositing mode is off.
    fn clear_compositing_outputs(&mut self) {
        for r in &mut self.reasons {
            *r = CompositingReasons::empty();
        }
        for s in &mut self.state {
            *s = CompositingState::NotComposited;
        }
        for h in &mut self.has_compositing_descendant {
            *h = false;
        }
        for f in &mut self.isolates_composited_descendants {
            *f = false;
        }
    }
}

/// Fixed layers move with the viewport; everything else moves with its
/// nearest scrolling ancestor, or with the document.
fn scroll_anchor(store: &LayerStore, idx: u32) -> ScrollAnchor {
    if store.style[idx as usize].position == Position::Fixed {
        return ScrollAnchor::Viewport;
    }
    let mut p = store.parent[idx as usize];
    while p != INVALID {
        if store.style[p as usize].scrollable {
            return ScrollAnchor::Scroller(p);
        }
        p = store.parent[p as usize];
    }
    ScrollAnchor::Document
}

fn union_nonempty(a: Rect, b: Rect) -> Rect {
    match (is_empty(a), is_empty(b)) {
        (_, true) => a,
        (true, false) => b,
        (false, false) => a.union(b),
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;
    use crate::layer::{BoxId, LayerId, LayerStyle};
    use crate::transform::Transform3d;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect::new(x, y, x + w, y + h)
    }

    fn new_store() -> LayerStore {
        new_store_with_root(LayerStyle::default())
    }

    fn new_store_with_root(style: LayerStyle) -> LayerStore {
        let mut store = LayerStore::new(BoxId(0), style);
        let root = store.root();
        store.set_bounds(root, rect(0.0, 0.0, 800.0, 600.0));
        store
    }

    fn add(
        store: &mut LayerStore,
        parent: LayerId,
        box_id: u32,
        style: LayerStyle,
        bounds: Rect,
    ) -> LayerId {
        let id = store.create_layer(parent, BoxId(box_id), style);
        store.set_bounds(id, bounds);
        id
    }

    fn z(z: i32) -> LayerStyle {
        LayerStyle::positioned(Position::Absolute, Some(z))
    }

    fn auto() -> LayerStyle {
        LayerStyle::positioned(Position::Relative, None)
    }

    fn three_d(base: LayerStyle) -> LayerStyle {
        LayerStyle {
            transform: Some(Transform3d::from_rotation_y(0.5)),
            ..base
        }
    }

    fn run(store: &mut LayerStore, config: CompositingConfig) -> CompositingChanges {
        CompositingUpdater::new(config).update(store, &mut Tracer::none())
    }

    /// A composited first sibling, an overlapping second, a disjoint third.
    fn abc(store: &mut LayerStore) -> (LayerId, LayerId, LayerId) {
        let root = store.root();
        let a = add(store, root, 1, three_d(auto()), rect(0.0, 0.0, 100.0, 100.0));
        let b = add(store, root, 2, auto(), rect(50.0, 50.0, 100.0, 100.0));
        let c = add(store, root, 3, auto(), rect(300.0, 300.0, 50.0, 50.0));
        (a, b, c)
    }

    #[test]
    fn sibling_overlap_scenario() {
        let mut store = new_store();
        let (a, b, c) = abc(&mut store);
        let changes = run(&mut store, CompositingConfig::low_dpi());

        assert_eq!(
            store.compositing_reasons(a),
            CompositingReasons::TRANSFORM_3D
        );
        assert_eq!(
            store.compositing_state(a),
            CompositingState::PaintsIntoOwnBacking
        );

        assert_eq!(store.compositing_reasons(b), CompositingReasons::OVERLAP);
        assert_eq!(
            store.compositing_state(b),
            CompositingState::PaintsIntoSquashedBacking
        );

        assert!(store.compositing_reasons(c).is_empty());
        assert!(!store.is_composited(c));

        let root = store.root();
        assert_eq!(store.compositing_reasons(root), CompositingReasons::ROOT);
        assert!(store.has_compositing_descendant(root));
        assert!(store.compositing_mode_enabled());
        assert_eq!(changes.compositing_mode_changed, Some(true));
    }

    #[test]
    fn squashing_disabled_gives_own_backing() {
        let mut store = new_store();
        let (_, b, _) = abc(&mut store);
        let config = CompositingConfig {
            layer_squashing: false,
            ..CompositingConfig::low_dpi()
        };
        let _ = run(&mut store, config);
        assert_eq!(
            store.compositing_state(b),
            CompositingState::PaintsIntoOwnBacking
        );
    }

    #[test]
    fn overlap_contexts_balance() {
        let mut store = new_store();
        let (a, _, _) = abc(&mut store);
        let root = store.root();
        let p = add(&mut store, root, 10, z(0), rect(0.0, 0.0, 200.0, 200.0));
        let _ = add(&mut store, p, 11, three_d(z(-1)), rect(10.0, 10.0, 50.0, 50.0));
        let _ = add(&mut store, a, 12, three_d(auto()), rect(5.0, 5.0, 5.0, 5.0));

        let changes = run(&mut store, CompositingConfig::high_dpi());
        assert_eq!(
            changes.overlap.contexts_begun,
            changes.overlap.contexts_finished
        );
        assert!(changes.overlap.max_depth > 1);
    }

    #[test]
    fn second_pass_is_idempotent() {
        let mut store = new_store();
        let (a, _, _) = abc(&mut store);
        let root = store.root();
        let p = add(&mut store, root, 10, z(0), rect(0.0, 0.0, 200.0, 200.0));
        let _ = add(&mut store, p, 11, three_d(z(-1)), rect(10.0, 10.0, 50.0, 50.0));
        let _ = add(
            &mut store,
            a,
            12,
            LayerStyle {
                blend_mode: BlendMode::Screen,
                ..three_d(z(1))
            },
            rect(5.0, 5.0, 5.0, 5.0),
        );

        let mut updater = CompositingUpdater::new(CompositingConfig::high_dpi());
        let _ = updater.update(&mut store, &mut Tracer::none());
        let snapshot: Vec<_> = store
            .layers()
            .map(|id| (store.compositing_reasons(id), store.compositing_state(id)))
            .collect();

        let changes = updater.update(&mut store, &mut Tracer::none());
        let again: Vec<_> = store
            .layers()
            .map(|id| (store.compositing_reasons(id), store.compositing_state(id)))
            .collect();
        assert_eq!(snapshot, again);
        assert!(changes.newly_composited.is_empty());
        assert!(changes.no_longer_composited.is_empty());
        assert!(changes.reasons_changed.is_empty());
        assert_eq!(changes.compositing_mode_changed, None);
        assert_eq!(updater.pass_index(), 2);
    }

    /// Two stacking contexts; the second overlaps a composited child of the
    /// first.
    fn monotonic_tree() -> (LayerStore, Vec<LayerId>) {
        let mut store = new_store();
        let root = store.root();
        let a = add(&mut store, root, 1, z(1), rect(0.0, 0.0, 100.0, 100.0));
        let a1 = add(&mut store, a, 2, z(1), rect(10.0, 10.0, 20.0, 20.0));
        let a2 = add(&mut store, a, 3, three_d(z(2)), rect(70.0, 70.0, 20.0, 20.0));
        let b = add(&mut store, root, 4, z(2), rect(80.0, 80.0, 100.0, 100.0));
        let b1 = add(&mut store, b, 5, z(1), rect(90.0, 90.0, 10.0, 10.0));
        let c = add(&mut store, root, 6, z(3), rect(400.0, 400.0, 50.0, 50.0));
        (store, vec![root, a, a1, a2, b, b1, c])
    }

    #[test]
    fn adding_a_direct_reason_never_uncomposites_self_or_ancestors() {
        let (mut baseline, ids) = monotonic_tree();
        let _ = run(&mut baseline, CompositingConfig::low_dpi());
        assert!(baseline.is_composited(ids[3]));
        assert!(baseline.is_composited(ids[4]), "b overlaps a2");

        for &target in &ids {
            let (mut store, _) = monotonic_tree();
            let style = LayerStyle {
                animating_opacity: true,
                ..*store.style(target)
            };
            store.set_style(target, style);
            let _ = run(&mut store, CompositingConfig::low_dpi());

            assert!(store.is_composited(target), "{target:?} gained a reason");
            let chain: Vec<_> = store.ancestors(target).collect();
            for id in chain {
                assert!(
                    !baseline.is_composited(id) || store.is_composited(id),
                    "{id:?} lost compositing when {target:?} gained a reason"
                );
            }
        }
    }

    #[test]
    fn descendant_overlap_is_absorbed_by_a_newly_composited_parent() {
        let build = |animate: bool| {
            let mut store = new_store();
            let root = store.root();
            let _ = add(&mut store, root, 1, three_d(z(1)), rect(0.0, 0.0, 100.0, 100.0));
            let p = add(
                &mut store,
                root,
                2,
                LayerStyle {
                    animating_opacity: animate,
                    ..z(2)
                },
                rect(200.0, 200.0, 100.0, 100.0),
            );
            let d = add(&mut store, p, 3, z(1), rect(50.0, 50.0, 10.0, 10.0));
            let _ = run(&mut store, CompositingConfig::low_dpi());
            (store, p, d)
        };

        let (store, p, d) = build(false);
        assert!(!store.is_composited(p));
        assert_eq!(store.compositing_reasons(d), CompositingReasons::OVERLAP);
        assert!(store.is_composited(d));

        // `p` now owns a backing and `d` paints into it; `d` tests against
        // the fresh context `p` opened and no longer overlaps anything.
        let (store, p, d) = build(true);
        assert_eq!(
            store.compositing_state(p),
            CompositingState::PaintsIntoOwnBacking
        );
        assert!(store.compositing_reasons(d).is_empty());
        assert!(!store.is_composited(d));
    }

    #[test]
    fn unbounded_clip_stops_overlap_testing_for_later_siblings() {
        let build = |unbounded_clip: bool| {
            let mut store = new_store();
            let root = store.root();
            let _ = add(&mut store, root, 1, three_d(z(1)), rect(0.0, 0.0, 100.0, 100.0));
            let u = add(
                &mut store,
                root,
                2,
                LayerStyle {
                    unbounded_clip,
                    ..z(2)
                },
                rect(200.0, 200.0, 50.0, 50.0),
            );
            let b = add(&mut store, root, 3, z(3), rect(400.0, 400.0, 50.0, 50.0));
            let _ = run(&mut store, CompositingConfig::low_dpi());
            (store, u, b)
        };

        let (store, _, b) = build(false);
        assert!(!store.is_composited(b));

        let (store, u, b) = build(true);
        assert!(!store.is_composited(u), "u is tested before the clip applies");
        assert_eq!(
            store.compositing_reasons(b),
            CompositingReasons::ASSUMED_OVERLAP
        );
        assert_eq!(
            store.compositing_state(b),
            CompositingState::PaintsIntoSquashedBacking
        );
    }

    #[test]
    fn destroyed_composited_layer_is_no_longer_composited() {
        let mut store = new_store();
        let root = store.root();
        let a = add(&mut store, root, 1, three_d(auto()), rect(0.0, 0.0, 10.0, 10.0));
        let b = add(&mut store, root, 2, three_d(auto()), rect(20.0, 0.0, 10.0, 10.0));
        let mut updater = CompositingUpdater::new(CompositingConfig::low_dpi());
        let _ = updater.update(&mut store, &mut Tracer::none());

        store.destroy_layer(b);
        let changes = updater.update(&mut store, &mut Tracer::none());
        assert!(store.is_composited(a));
        assert_eq!(changes.removed, [b.index()]);
        assert_eq!(changes.no_longer_composited, [b.index()]);
        assert_eq!(changes.dropped, [(b.index(), rect(20.0, 0.0, 10.0, 10.0))]);
        assert!(changes.newly_composited.is_empty());
    }

    #[test]
    fn union_skips_empty_bounds() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let flat = rect(50.0, 50.0, 0.0, 20.0);
        assert_eq!(union_nonempty(a, flat), a);
        assert_eq!(union_nonempty(flat, a), a);
        assert_eq!(
            union_nonempty(a, rect(20.0, 20.0, 5.0, 5.0)),
            rect(0.0, 0.0, 25.0, 25.0)
        );
    }

    #[test]
    fn composited_negative_child_forces_foreground() {
        let mut store = new_store();
        let root = store.root();
        let p = add(&mut store, root, 1, z(0), rect(0.0, 0.0, 200.0, 200.0));
        let n = add(&mut store, p, 2, three_d(z(-1)), rect(10.0, 10.0, 50.0, 50.0));
        // Overlaps `n`, but paints into the fresh foreground context.
        let q = add(&mut store, p, 3, auto(), rect(20.0, 20.0, 10.0, 10.0));

        let changes = run(&mut store, CompositingConfig::low_dpi());
        assert_eq!(
            store.compositing_reasons(p),
            CompositingReasons::NEGATIVE_Z_INDEX_CHILDREN
        );
        assert_eq!(
            store.compositing_state(p),
            CompositingState::PaintsIntoOwnBacking
        );
        assert!(store.is_composited(n));
        assert!(!store.is_composited(q));
        assert_eq!(changes.overlap.contexts_begun, 4);
        assert_eq!(changes.overlap.contexts_finished, 4);
    }

    #[test]
    fn nothing_composited_disables_compositing_mode() {
        let mut store = new_store();
        let root = store.root();
        let _ = add(&mut store, root, 1, auto(), rect(0.0, 0.0, 10.0, 10.0));
        let changes = run(&mut store, CompositingConfig::high_dpi());
        assert!(!store.compositing_mode_enabled());
        assert!(!store.is_composited(root));
        assert_eq!(changes.compositing_mode_changed, None);
    }

    #[test]
    fn root_that_cannot_composite_clears_everything() {
        let mut store = new_store_with_root(LayerStyle {
            layout_pending: true,
            ..LayerStyle::default()
        });
        let root = store.root();
        let a = add(&mut store, root, 1, three_d(auto()), rect(0.0, 0.0, 10.0, 10.0));
        let _ = run(&mut store, CompositingConfig::low_dpi());
        assert!(!store.compositing_mode_enabled());
        assert!(store.compositing_reasons(a).is_empty());
        assert!(!store.is_composited(a));
        assert!(!store.has_compositing_descendant(root));
    }

    #[test]
    fn losing_the_last_reason_reports_transitions() {
        let mut store = new_store();
        let root = store.root();
        let a = add(&mut store, root, 1, three_d(auto()), rect(0.0, 0.0, 10.0, 10.0));
        let mut updater = CompositingUpdater::new(CompositingConfig::low_dpi());

        let changes = updater.update(&mut store, &mut Tracer::none());
        assert!(changes.newly_composited.contains(&a.index()));
        assert!(changes.newly_composited.contains(&root.index()));

        store.set_style(a, auto());
        let changes = updater.update(&mut store, &mut Tracer::none());
        assert_eq!(changes.compositing_mode_changed, Some(false));
        assert!(changes.no_longer_composited.contains(&a.index()));
        assert!(changes.no_longer_composited.contains(&root.index()));
        assert!(changes.reasons_changed.contains(&a.index()));
        assert_eq!(changes.style, [a.index()]);
        assert!(store.compositing_reasons(root).is_empty());
    }

    #[test]
    fn forced_mode_composites_lone_root() {
        let mut store = new_store();
        let config = CompositingConfig {
            force_compositing_mode: true,
            ..CompositingConfig::low_dpi()
        };
        let _ = run(&mut store, config);
        let root = store.root();
        assert!(store.compositing_mode_enabled());
        assert_eq!(store.compositing_reasons(root), CompositingReasons::ROOT);
    }

    #[test]
    fn software_config_composites_nothing() {
        let mut store = new_store();
        let (a, b, _) = abc(&mut store);
        let _ = run(&mut store, CompositingConfig::software());
        assert!(!store.compositing_mode_enabled());
        assert!(!store.is_composited(a));
        assert!(!store.is_composited(b));
    }

    #[test]
    fn layout_pending_layer_cannot_composite() {
        let mut store = new_store();
        let root = store.root();
        let a = add(
            &mut store,
            root,
            1,
            LayerStyle {
                layout_pending: true,
                ..three_d(auto())
            },
            rect(0.0, 0.0, 10.0, 10.0),
        );
        let _ = run(&mut store, CompositingConfig::low_dpi());
        assert!(!store.is_composited(a));
    }

    #[test]
    fn clipping_layer_composites_for_descendants() {
        let mut store = new_store();
        let root = store.root();
        let k = add(
            &mut store,
            root,
            1,
            LayerStyle {
                overflow_clip: true,
                ..z(0)
            },
            rect(0.0, 0.0, 100.0, 100.0),
        );
        let d = add(&mut store, k, 2, three_d(auto()), rect(10.0, 10.0, 200.0, 20.0));
        let _ = run(&mut store, CompositingConfig::low_dpi());
        assert!(store.is_composited(d));
        assert_eq!(
            store.compositing_reasons(k),
            CompositingReasons::CLIPS_COMPOSITING_DESCENDANTS
        );
        assert!(store.has_compositing_descendant(k));
    }

    #[test]
    fn preserve_3d_composites_with_3d_descendants() {
        let mut store = new_store();
        let root = store.root();
        let p = add(
            &mut store,
            root,
            1,
            LayerStyle {
                preserves_3d: true,
                ..auto()
            },
            rect(0.0, 0.0, 100.0, 100.0),
        );
        let _ = add(&mut store, p, 2, three_d(auto()), rect(10.0, 10.0, 10.0, 10.0));
        let _ = run(&mut store, CompositingConfig::low_dpi());
        assert_eq!(
            store.compositing_reasons(p),
            CompositingReasons::PRESERVE_3D_WITH_3D_DESCENDANTS
        );
    }

    #[test]
    fn blending_descendant_isolates_stacking_context() {
        let mut store = new_store();
        let root = store.root();
        let g = add(
            &mut store,
            root,
            1,
            LayerStyle {
                isolation: true,
                ..auto()
            },
            rect(0.0, 0.0, 100.0, 100.0),
        );
        let _ = add(
            &mut store,
            g,
            2,
            LayerStyle {
                blend_mode: BlendMode::Multiply,
                ..three_d(auto())
            },
            rect(10.0, 10.0, 10.0, 10.0),
        );
        let _ = run(&mut store, CompositingConfig::low_dpi());
        assert!(store.should_isolate_composited_descendants(g));
        assert!(
            store
                .compositing_reasons(g)
                .contains(CompositingReasons::ISOLATE_COMPOSITED_DESCENDANTS)
        );
        assert!(!store.should_isolate_composited_descendants(root));
    }

    #[test]
    fn animating_transform_disables_overlap_testing() {
        let mut store = new_store();
        let root = store.root();
        let a = add(
            &mut store,
            root,
            1,
            LayerStyle {
                animating_transform: true,
                ..auto()
            },
            rect(0.0, 0.0, 50.0, 50.0),
        );
        let b = add(&mut store, root, 2, auto(), rect(500.0, 500.0, 10.0, 10.0));
        let _ = run(&mut store, CompositingConfig::low_dpi());
        assert!(store.is_composited(a));
        assert_eq!(
            store.compositing_reasons(b),
            CompositingReasons::ASSUMED_OVERLAP
        );
        assert_eq!(
            store.compositing_state(b),
            CompositingState::PaintsIntoSquashedBacking
        );
    }

    /// A scroller holding an out-of-flow box that escapes its clip, followed
    /// by a disjoint sibling.
    fn unclipped_tree(containing_block: Option<BoxId>) -> (LayerStore, LayerId, LayerId) {
        let mut store = new_store();
        let root = store.root();
        let s = add(
            &mut store,
            root,
            1,
            LayerStyle {
                overflow_clip: true,
                scrollable: true,
                ..z(0)
            },
            rect(0.0, 0.0, 100.0, 100.0),
        );
        let f = add(
            &mut store,
            s,
            2,
            LayerStyle {
                escapes_ancestor_clip: true,
                containing_block,
                ..LayerStyle::positioned(Position::Absolute, None)
            },
            rect(0.0, 0.0, 10.0, 10.0),
        );
        let t = add(&mut store, root, 3, z(1), rect(500.0, 500.0, 10.0, 10.0));
        (store, f, t)
    }

    #[test]
    fn unclipped_descendant_forces_assumed_overlap() {
        let (mut store, f, t) = unclipped_tree(None);
        let _ = run(&mut store, CompositingConfig::high_dpi());
        assert!(
            store
                .compositing_reasons(f)
                .contains(CompositingReasons::OUT_OF_FLOW_CLIPPING)
        );
        assert_eq!(
            store.compositing_reasons(t),
            CompositingReasons::ASSUMED_OVERLAP
        );

        let (mut store, f, t) = unclipped_tree(None);
        let _ = run(&mut store, CompositingConfig::low_dpi());
        assert!(!store.is_composited(f));
        assert!(!store.is_composited(t));
    }

    #[test]
    fn unclipped_descendant_dropped_at_its_containing_block() {
        let (mut store, f, t) = unclipped_tree(Some(BoxId(3)));
        let _ = run(&mut store, CompositingConfig::high_dpi());
        assert!(store.is_composited(f));
        assert!(!store.is_composited(t));
    }

    #[test]
    fn children_of_video_get_overlay_reason() {
        let mut store = new_store();
        let root = store.root();
        let v = add(
            &mut store,
            root,
            1,
            LayerStyle {
                content: ContentKind::Video,
                ..z(0)
            },
            rect(0.0, 0.0, 100.0, 100.0),
        );
        let o = add(&mut store, v, 2, auto(), rect(10.0, 10.0, 10.0, 10.0));
        let _ = run(&mut store, CompositingConfig::low_dpi());
        assert!(
            store
                .compositing_reasons(v)
                .contains(CompositingReasons::VIDEO)
        );
        assert!(
            store
                .compositing_reasons(o)
                .contains(CompositingReasons::VIDEO_OVERLAY)
        );
        assert_eq!(
            store.compositing_state(o),
            CompositingState::PaintsIntoOwnBacking
        );
    }

    #[test]
    fn custom_policy_is_consulted() {
        struct CanvasEverywhere;
        impl ReasonPolicy for CanvasEverywhere {
            fn direct_reasons(&self, store: &LayerStore, id: LayerId) -> CompositingReasons {
                if store.is_root_layer(id) {
                    CompositingReasons::empty()
                } else {
                    CompositingReasons::CANVAS
                }
            }
        }

        let mut store = new_store();
        let (a, b, c) = abc(&mut store);
        let mut updater =
            CompositingUpdater::with_policy(CompositingConfig::low_dpi(), CanvasEverywhere);
        let _ = updater.update(&mut store, &mut Tracer::none());
        for id in [a, b, c] {
            assert!(
                store
                    .compositing_reasons(id)
                    .contains(CompositingReasons::CANVAS)
            );
        }
        // The 3-D transform's own reason is not the policy's to give.
        assert_eq!(store.compositing_reasons(a), CompositingReasons::CANVAS);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn pass_summary_is_traced() {
        use crate::trace::TraceSink;

        #[derive(Default)]
        struct Recorder {
            begins: u32,
            summaries: Vec<PassSummary>,
            modes: Vec<bool>,
        }
        impl TraceSink for Recorder {
            fn on_pass_begin(&mut self, _: &PassBeginEvent) {
                self.begins += 1;
            }
            fn on_compositing_mode(&mut self, e: &CompositingModeEvent) {
                self.modes.push(e.enabled);
            }
            fn on_pass_summary(&mut self, s: &PassSummary) {
                self.summaries.push(*s);
            }
        }

        let mut store = new_store();
        let _ = abc(&mut store);
        let mut sink = Recorder::default();
        let mut tracer = Tracer::new(&mut sink);
        let _ = CompositingUpdater::new(CompositingConfig::low_dpi()).update(&mut store, &mut tracer);
        drop(tracer);

        assert_eq!(sink.begins, 1);
        assert_eq!(sink.modes, [true]);
        let summary = sink.summaries[0];
        assert_eq!(summary.layers_visited, 4);
        assert_eq!(summary.own_backings, 2);
        assert_eq!(summary.squashed, 1);
    }
}
