// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays layer storage with allocation, topology, and style
//! management.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use kurbo::Rect;
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use crate::compositing::CompositingState;
use crate::dirty;
use crate::reasons::CompositingReasons;

use super::id::{BoxId, INVALID, LayerId};
use super::style::{LayerStyle, LayerType};
use super::traverse::{Ancestors, Children, PreOrder};

/// Struct-of-arrays storage for the layers of one box tree.
///
/// Layers are addressed by [`LayerId`] handles. Internally, each layer
/// occupies a slot in parallel arrays. Destroyed layers are recycled via a
/// free list, and generation counters prevent stale handle access.
///
/// The store always holds exactly one root layer, created with the store.
/// Every other layer is created directly under a parent, so a layer has no
/// parent iff it is the root.
#[derive(Debug)]
pub struct LayerStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,
    pub(crate) root: u32,

    // -- Inputs (set by layout and style) --
    pub(crate) box_id: Vec<BoxId>,
    pub(crate) style: Vec<LayerStyle>,
    pub(crate) bounds: Vec<Rect>,

    // -- Derived from style --
    pub(crate) potential_reasons: Vec<CompositingReasons>,

    // -- Stacking node (memoized against `epoch`) --
    pub(crate) negative_z: Vec<Vec<u32>>,
    pub(crate) normal_flow: Vec<Vec<u32>>,
    pub(crate) positive_z: Vec<Vec<u32>>,
    pub(crate) lists_epoch: Vec<u64>,
    pub(crate) descendant_3d: Vec<bool>,
    pub(crate) descendant_3d_epoch: Vec<u64>,
    pub(crate) epoch: u64,

    // -- Outputs (written by the compositing pass) --
    pub(crate) reasons: Vec<CompositingReasons>,
    pub(crate) state: Vec<CompositingState>,
    pub(crate) has_compositing_descendant: Vec<bool>,
    pub(crate) isolates_composited_descendants: Vec<bool>,
    pub(crate) compositing_mode: bool,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,
    pub(crate) box_to_layer: BTreeMap<BoxId, u32>,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
    /// Composited layers destroyed since the last pass, with their last
    /// bounds. Captured at destroy time since the slot may be reused.
    pub(crate) pending_dropped: Vec<(u32, Rect)>,
}

impl LayerStore {
    /// Creates a store whose root layer belongs to `root_box`.
    ///
    /// The root layer exists for the lifetime of the store, whatever its
    /// style.
    #[must_use]
    pub fn new(root_box: BoxId, root_style: LayerStyle) -> Self {
        let mut store = Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            root: 0,
            box_id: Vec::new(),
            style: Vec::new(),
            bounds: Vec::new(),
            potential_reasons: Vec::new(),
            negative_z: Vec::new(),
            normal_flow: Vec::new(),
            positive_z: Vec::new(),
            lists_epoch: Vec::new(),
            descendant_3d: Vec::new(),
            descendant_3d_epoch: Vec::new(),
            epoch: 1,
            reasons: Vec::new(),
            state: Vec::new(),
            has_compositing_descendant: Vec::new(),
            isolates_composited_descendants: Vec::new(),
            compositing_mode: false,
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            box_to_layer: BTreeMap::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
            pending_dropped: Vec::new(),
        };
        store.root = store.alloc_slot(root_box, root_style);
        store
    }

    // -- Allocation API --

    /// Creates a layer for `box_id` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is stale, if `box_id` already has a layer, or if
    /// `style` does not need a layer.
    pub fn create_layer(&mut self, parent: LayerId, box_id: BoxId, style: LayerStyle) -> LayerId {
        self.validate(parent);
        assert!(style.needs_layer(), "box style does not need a layer");
        let idx = self.alloc_slot(box_id, style);
        self.link_last_child(parent.idx, idx);
        self.id_at(idx)
    }

    /// Creates a layer for `box_id` immediately before `sibling`.
    ///
    /// # Panics
    ///
    /// Panics if `sibling` is stale or is the root, if `box_id` already has
    /// a layer, or if `style` does not need a layer.
    pub fn create_layer_before(
        &mut self,
        sibling: LayerId,
        box_id: BoxId,
        style: LayerStyle,
    ) -> LayerId {
        self.validate(sibling);
        assert!(sibling.idx != self.root, "the root layer has no siblings");
        assert!(style.needs_layer(), "box style does not need a layer");
        let idx = self.alloc_slot(box_id, style);
        self.link_before(idx, sibling.idx);
        self.id_at(idx)
    }

    /// Destroys a layer, freeing its slot for reuse.
    ///
    /// The layer's children take its place in its parent's child list, in
    /// order, so they are re-parented to the nearest surviving ancestor.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or refers to the root layer.
    pub fn destroy_layer(&mut self, id: LayerId) {
        self.validate(id);
        let idx = id.idx;
        assert!(idx != self.root, "cannot destroy the root layer");

        let p = self.parent[idx as usize];
        // Splice children into the parent, before the destroyed layer.
        while self.first_child[idx as usize] != INVALID {
            let child = self.first_child[idx as usize];
            self.unlink_from_parent(child);
            self.dirty.remove_dependency(child, idx, dirty::GEOMETRY);
            self.link_before(child, idx);
        }

        self.unlink_from_parent(idx);
        self.dirty.remove_dependency(idx, p, dirty::GEOMETRY);
        self.dirty.remove_key(idx);

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;
        let _ = self.box_to_layer.remove(&self.box_id[idx as usize]);

        if self.state[idx as usize].is_composited() {
            self.pending_dropped.push((idx, self.bounds[idx as usize]));
        }
        self.free_list.push(idx);
        self.pending_removed.push(idx);
        self.bump_epoch();
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Returns whether the given handle refers to a live layer.
    #[must_use]
    pub fn is_alive(&self, id: LayerId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Returns the number of live layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Topology API --

    /// Returns the root layer.
    #[must_use]
    pub fn root(&self) -> LayerId {
        self.id_at(self.root)
    }

    /// Returns `true` if `id` is the root layer.
    #[must_use]
    pub fn is_root_layer(&self, id: LayerId) -> bool {
        self.validate(id);
        id.idx == self.root
    }

    /// Moves `child` to be the last child of `new_parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if `child` is the root, or if
    /// `new_parent` lies inside `child`'s subtree.
    pub fn reparent(&mut self, child: LayerId, new_parent: LayerId) {
        self.validate(child);
        self.validate(new_parent);
        assert!(child.idx != self.root, "cannot reparent the root layer");
        assert!(
            child != new_parent && !self.ancestors(new_parent).any(|a| a == child),
            "cannot add a layer to its own subtree"
        );

        let old_p = self.parent[child.idx as usize];
        self.unlink_from_parent(child.idx);
        self.dirty
            .remove_dependency(child.idx, old_p, dirty::GEOMETRY);
        self.dirty.mark(old_p, dirty::TOPOLOGY);
        self.link_last_child(new_parent.idx, child.idx);
    }

    /// Moves `child` to sit immediately before `sibling`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if either is the root, or if
    /// `sibling` lies inside `child`'s subtree.
    pub fn move_before(&mut self, child: LayerId, sibling: LayerId) {
        self.validate(child);
        self.validate(sibling);
        assert!(
            child.idx != self.root && sibling.idx != self.root,
            "the root layer has no siblings"
        );
        if child == sibling {
            return;
        }
        assert!(
            !self.ancestors(sibling).any(|a| a == child),
            "cannot add a layer to its own subtree"
        );

        let old_p = self.parent[child.idx as usize];
        self.unlink_from_parent(child.idx);
        self.dirty
            .remove_dependency(child.idx, old_p, dirty::GEOMETRY);
        self.dirty.mark(old_p, dirty::TOPOLOGY);
        self.link_before(child.idx, sibling.idx);
    }

    /// Returns the parent of a layer, if any.
    #[must_use]
    pub fn parent(&self, id: LayerId) -> Option<LayerId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.id_at(p))
    }

    /// Returns an iterator over the direct children of a layer.
    #[must_use]
    pub fn children(&self, id: LayerId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns an iterator over the strict ancestors of a layer, nearest
    /// first.
    #[must_use]
    pub fn ancestors(&self, id: LayerId) -> Ancestors<'_> {
        self.validate(id);
        Ancestors::new(self, self.parent[id.idx as usize])
    }

    /// Returns a depth-first pre-order iterator over the whole tree, in
    /// document order.
    #[must_use]
    pub fn layers(&self) -> PreOrder<'_> {
        PreOrder::new(self, self.root)
    }

    // -- Box lookup --

    /// Returns the layer owned by `box_id`, if the box has one.
    #[must_use]
    pub fn layer_for_box(&self, box_id: BoxId) -> Option<LayerId> {
        self.box_to_layer.get(&box_id).map(|&idx| self.id_at(idx))
    }

    /// Returns the box that owns a layer.
    #[must_use]
    pub fn box_of(&self, id: LayerId) -> BoxId {
        self.validate(id);
        self.box_id[id.idx as usize]
    }

    // -- Input getters --

    /// Returns the style of a layer's box.
    #[must_use]
    pub fn style(&self, id: LayerId) -> &LayerStyle {
        self.validate(id);
        &self.style[id.idx as usize]
    }

    /// Returns the absolute clipped bounding box of a layer.
    #[must_use]
    pub fn bounds(&self, id: LayerId) -> Rect {
        self.validate(id);
        self.bounds[id.idx as usize]
    }

    // -- Derived getters --

    /// Returns the kind of layer the box style calls for.
    ///
    /// The root is always a [`LayerType::Normal`] layer.
    #[must_use]
    pub fn layer_type(&self, id: LayerId) -> LayerType {
        self.validate(id);
        self.layer_type_at(id.idx)
    }

    /// Returns `true` if the layer paints its own box rather than relying on
    /// an ancestor to do so.
    #[must_use]
    pub fn is_self_painting(&self, id: LayerId) -> bool {
        self.validate(id);
        self.is_self_painting_at(id.idx)
    }

    /// Returns `true` if the layer establishes a stacking context.
    #[must_use]
    pub fn is_stacking_context(&self, id: LayerId) -> bool {
        self.validate(id);
        self.is_stacking_context_at(id.idx)
    }

    /// Returns `true` if the layer takes no part in z-ordering.
    #[must_use]
    pub fn is_normal_flow_only(&self, id: LayerId) -> bool {
        self.validate(id);
        self.is_normal_flow_only_at(id.idx)
    }

    /// Returns the stack level of the layer within its stacking context.
    #[must_use]
    pub fn z_index(&self, id: LayerId) -> i32 {
        self.validate(id);
        self.style[id.idx as usize].effective_z_index()
    }

    /// Returns `true` if the layer's own transform has a 3-D component.
    #[must_use]
    pub fn has_3d_transform(&self, id: LayerId) -> bool {
        self.validate(id);
        self.has_3d_transform_at(id.idx)
    }

    /// Returns the reasons the layer could have from its style alone.
    #[must_use]
    pub fn potential_reasons(&self, id: LayerId) -> CompositingReasons {
        self.validate(id);
        self.potential_reasons[id.idx as usize]
    }

    // -- Output getters --

    /// Returns the reasons recorded for a layer by the last compositing
    /// pass.
    #[must_use]
    pub fn compositing_reasons(&self, id: LayerId) -> CompositingReasons {
        self.validate(id);
        self.reasons[id.idx as usize]
    }

    /// Returns how the layer is composited after the last pass.
    #[must_use]
    pub fn compositing_state(&self, id: LayerId) -> CompositingState {
        self.validate(id);
        self.state[id.idx as usize]
    }

    /// Returns `true` if the layer got a compositing identity in the last
    /// pass (its own backing or a squashed one).
    #[must_use]
    pub fn is_composited(&self, id: LayerId) -> bool {
        self.compositing_state(id) != CompositingState::NotComposited
    }

    /// Returns `true` if some descendant was composited in the last pass.
    #[must_use]
    pub fn has_compositing_descendant(&self, id: LayerId) -> bool {
        self.validate(id);
        self.has_compositing_descendant[id.idx as usize]
    }

    /// Returns `true` if this stacking context must isolate the blending of
    /// its composited descendants.
    #[must_use]
    pub fn should_isolate_composited_descendants(&self, id: LayerId) -> bool {
        self.validate(id);
        self.isolates_composited_descendants[id.idx as usize]
    }

    /// Returns `true` if the last pass left the tree in compositing mode.
    ///
    /// When `false`, the whole tree paints on the software path.
    #[must_use]
    pub fn compositing_mode_enabled(&self) -> bool {
        self.compositing_mode
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets the style of a layer's box.
    ///
    /// Marks the STYLE channel and invalidates the stacking lists.
    pub fn set_style(&mut self, id: LayerId, style: LayerStyle) {
        self.validate(id);
        let idx = id.idx as usize;
        self.style[idx] = style;
        self.potential_reasons[idx] = CompositingReasons::potential_from_style(&style);
        self.bump_epoch();
        self.dirty.mark(id.idx, dirty::STYLE);
    }

    /// Applies a new style to a layer's box, destroying the layer if the
    /// box no longer needs one.
    ///
    /// Returns the layer if it survives. The root layer always survives.
    pub fn apply_style(&mut self, id: LayerId, style: LayerStyle) -> Option<LayerId> {
        self.validate(id);
        if id.idx != self.root && !style.needs_layer() {
            self.destroy_layer(id);
            return None;
        }
        self.set_style(id, style);
        Some(id)
    }

    /// Sets the absolute clipped bounding box of a layer.
    ///
    /// Marks the GEOMETRY channel with eager propagation to descendants.
    pub fn set_bounds(&mut self, id: LayerId, bounds: Rect) {
        self.validate(id);
        self.bounds[id.idx as usize] = bounds;
        self.dirty.mark_with(id.idx, dirty::GEOMETRY, &EagerPolicy);
    }

    // -- Raw-index accessors for backends --
    //
    // These accept raw slot indices (as found in `CompositingChanges`) rather
    // than `LayerId` handles, skipping generation validation.

    /// Returns the handle for the live layer at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn id_at(&self, idx: u32) -> LayerId {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        LayerId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Returns the bounds at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn bounds_at(&self, idx: u32) -> Rect {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.bounds[idx as usize]
    }

    /// Returns the compositing state at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn compositing_state_at(&self, idx: u32) -> CompositingState {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.state[idx as usize]
    }

    // -- Crate-internal slot helpers --

    pub(crate) fn layer_type_at(&self, idx: u32) -> LayerType {
        if idx == self.root {
            LayerType::Normal
        } else {
            self.style[idx as usize].layer_type()
        }
    }

    pub(crate) fn is_self_painting_at(&self, idx: u32) -> bool {
        let style = &self.style[idx as usize];
        self.layer_type_at(idx) == LayerType::Normal
            || style.overlay_scrollbars
            || style.needs_composited_scrolling
    }

    pub(crate) fn is_stacking_context_at(&self, idx: u32) -> bool {
        self.style[idx as usize].creates_stacking_context(idx == self.root)
    }

    pub(crate) fn is_normal_flow_only_at(&self, idx: u32) -> bool {
        self.style[idx as usize].is_normal_flow_only(idx == self.root)
    }

    pub(crate) fn has_3d_transform_at(&self, idx: u32) -> bool {
        self.style[idx as usize]
            .transform
            .is_some_and(|t| t.has_3d_component())
    }

    pub(crate) fn bump_epoch(&mut self) {
        self.epoch += 1;
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    fn validate(&self, id: LayerId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale LayerId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Takes a slot from the free list or grows the arrays, and initializes
    /// it as a detached layer for `box_id`.
    fn alloc_slot(&mut self, box_id: BoxId, style: LayerStyle) -> u32 {
        assert!(
            !self.box_to_layer.contains_key(&box_id),
            "box {box_id:?} already has a layer"
        );
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot; its generation was bumped on destroy.
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.box_id.push(box_id);
            self.style.push(style);
            self.bounds.push(Rect::ZERO);
            self.potential_reasons.push(CompositingReasons::empty());
            self.negative_z.push(Vec::new());
            self.normal_flow.push(Vec::new());
            self.positive_z.push(Vec::new());
            self.lists_epoch.push(0);
            self.descendant_3d.push(false);
            self.descendant_3d_epoch.push(0);
            self.reasons.push(CompositingReasons::empty());
            self.state.push(CompositingState::NotComposited);
            self.has_compositing_descendant.push(false);
            self.isolates_composited_descendants.push(false);
            self.generation.push(0);
            idx
        };

        let i = idx as usize;
        self.parent[i] = INVALID;
        self.first_child[i] = INVALID;
        self.next_sibling[i] = INVALID;
        self.prev_sibling[i] = INVALID;
        self.box_id[i] = box_id;
        self.style[i] = style;
        self.bounds[i] = Rect::ZERO;
        self.potential_reasons[i] = CompositingReasons::potential_from_style(&style);
        self.negative_z[i].clear();
        self.normal_flow[i].clear();
        self.positive_z[i].clear();
        self.lists_epoch[i] = 0;
        self.descendant_3d[i] = false;
        self.descendant_3d_epoch[i] = 0;
        self.reasons[i] = CompositingReasons::empty();
        self.state[i] = CompositingState::NotComposited;
        self.has_compositing_descendant[i] = false;
        self.isolates_composited_descendants[i] = false;

        let _ = self.box_to_layer.insert(box_id, idx);
        self.pending_added.push(idx);
        self.bump_epoch();
        self.dirty.mark(idx, dirty::TOPOLOGY);
        self.dirty.mark(idx, dirty::STYLE);
        idx
    }

    /// Appends detached `c` to `p`'s child list.
    fn link_last_child(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            // Walk to last child.
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }
        self.finish_link(p, c);
    }

    /// Inserts detached `c` before `s` in `s`'s parent's child list.
    fn link_before(&mut self, c: u32, s: u32) {
        let p = self.parent[s as usize];
        self.parent[c as usize] = p;
        self.next_sibling[c as usize] = s;
        self.prev_sibling[c as usize] = self.prev_sibling[s as usize];

        if self.prev_sibling[s as usize] != INVALID {
            self.next_sibling[self.prev_sibling[s as usize] as usize] = c;
        } else {
            // `s` was the first child.
            self.first_child[p as usize] = c;
        }
        self.prev_sibling[s as usize] = c;
        self.finish_link(p, c);
    }

    /// Adds the geometry dependency for a fresh `p -> c` edge and marks the
    /// structural change.
    fn finish_link(&mut self, p: u32, c: u32) {
        let _ = self.dirty.add_dependency(c, p, dirty::GEOMETRY);
        self.dirty.mark_with(c, dirty::GEOMETRY, &EagerPolicy);
        self.bump_epoch();
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }
}
