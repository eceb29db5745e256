// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stacking node z-order lists.
//!
//! Every layer owns three child lists:
//!
//! - **negative z-order**: z-ordered descendants with a negative stack level,
//! - **normal flow**: direct children that take no part in z-ordering,
//! - **positive z-order**: z-ordered descendants with a stack level of zero
//!   or more.
//!
//! Only stacking contexts have z-order lists. A layer that is not a stacking
//! context contributes its z-ordered descendants to its enclosing stacking
//! context's lists. Both z-order lists are stably sorted by stack level, so
//! ties keep document order.
//!
//! Lists are memoized against the store's epoch, which moves on every
//! topology or style change. [`LayerStore::update_stacking_lists`] brings
//! every list up to date; [`LayerStore::stacking_lists`] reads them and
//! asserts they are fresh.

use alloc::vec::Vec;

use super::id::LayerId;
use super::store::LayerStore;

/// Read-only view of one layer's z-order and normal-flow lists.
#[derive(Clone, Copy, Debug)]
pub struct StackingLists<'a> {
    store: &'a LayerStore,
    negative: &'a [u32],
    normal_flow: &'a [u32],
    positive: &'a [u32],
}

impl<'a> StackingLists<'a> {
    /// Negative z-order list, bottom to top.
    pub fn negative_z_order(&self) -> impl DoubleEndedIterator<Item = LayerId> + 'a {
        let store = self.store;
        self.negative.iter().map(move |&i| store.id_at(i))
    }

    /// Normal-flow list, in document order.
    pub fn normal_flow(&self) -> impl DoubleEndedIterator<Item = LayerId> + 'a {
        let store = self.store;
        self.normal_flow.iter().map(move |&i| store.id_at(i))
    }

    /// Positive z-order list, bottom to top.
    pub fn positive_z_order(&self) -> impl DoubleEndedIterator<Item = LayerId> + 'a {
        let store = self.store;
        self.positive.iter().map(move |&i| store.id_at(i))
    }

    /// All three lists in paint order: negative, normal flow, positive.
    pub fn paint_order(&self) -> impl Iterator<Item = LayerId> + 'a {
        self.negative_z_order()
            .chain(self.normal_flow())
            .chain(self.positive_z_order())
    }

    /// All three lists in hit-test order, topmost first.
    pub fn hit_test_order(&self) -> impl Iterator<Item = LayerId> + 'a {
        self.positive_z_order()
            .rev()
            .chain(self.normal_flow().rev())
            .chain(self.negative_z_order().rev())
    }

    /// Returns `true` if all three lists are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.negative.is_empty() && self.normal_flow.is_empty() && self.positive.is_empty()
    }
}

impl LayerStore {
    // -- Stacking API --

    /// Rebuilds every stale stacking list in the tree.
    pub fn update_stacking_lists(&mut self) {
        let order: Vec<u32> = self.layers().map(LayerId::index).collect();
        for idx in order {
            if self.lists_epoch[idx as usize] != self.epoch {
                self.rebuild_stacking_lists(idx);
            }
        }
    }

    /// Returns the lists of a layer.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or if the lists are out of date; call
    /// [`update_stacking_lists`](Self::update_stacking_lists) after mutating
    /// the tree.
    #[must_use]
    pub fn stacking_lists(&self, id: LayerId) -> StackingLists<'_> {
        assert!(self.is_alive(id), "stale LayerId: {id:?}");
        let i = id.idx as usize;
        assert!(
            self.lists_epoch[i] == self.epoch,
            "stacking lists are out of date"
        );
        StackingLists {
            store: self,
            negative: &self.negative_z[i],
            normal_flow: &self.normal_flow[i],
            positive: &self.positive_z[i],
        }
    }

    /// Returns the lists of a layer, rebuilding them first if stale.
    pub fn z_order_lists(&mut self, id: LayerId) -> StackingLists<'_> {
        assert!(self.is_alive(id), "stale LayerId: {id:?}");
        if self.lists_epoch[id.idx as usize] != self.epoch {
            self.rebuild_stacking_lists(id.idx);
        }
        self.stacking_lists(id)
    }

    /// Returns `true` if a 3-D transformed layer lives in the same 3-D
    /// rendering context below this layer.
    ///
    /// Only z-ordered descendants can be transformed, so only the z-order
    /// lists are searched. The answer is memoized against the epoch.
    pub fn has_3d_transformed_descendant(&mut self, id: LayerId) -> bool {
        assert!(self.is_alive(id), "stale LayerId: {id:?}");
        self.update_stacking_lists();
        self.update_3d_descendant_status(id.idx);
        self.descendant_3d[id.idx as usize]
    }

    // -- Internal helpers --

    fn rebuild_stacking_lists(&mut self, idx: u32) {
        let mut negative = core::mem::take(&mut self.negative_z[idx as usize]);
        let mut normal_flow = core::mem::take(&mut self.normal_flow[idx as usize]);
        let mut positive = core::mem::take(&mut self.positive_z[idx as usize]);
        negative.clear();
        normal_flow.clear();
        positive.clear();

        let mut c = self.first_child[idx as usize];
        while c != super::id::INVALID {
            if self.is_normal_flow_only_at(c) {
                normal_flow.push(c);
            }
            c = self.next_sibling[c as usize];
        }

        if self.is_stacking_context_at(idx) {
            let mut c = self.first_child[idx as usize];
            while c != super::id::INVALID {
                self.collect_z_ordered(c, &mut negative, &mut positive);
                c = self.next_sibling[c as usize];
            }
            let z = |i: &u32| self.style[*i as usize].effective_z_index();
            negative.sort_by_key(z);
            positive.sort_by_key(z);
        }

        let i = idx as usize;
        self.negative_z[i] = negative;
        self.normal_flow[i] = normal_flow;
        self.positive_z[i] = positive;
        self.lists_epoch[i] = self.epoch;
    }

    /// Adds `idx` and, unless it is a stacking context itself, its z-ordered
    /// descendants to the enclosing context's lists.
    fn collect_z_ordered(&self, idx: u32, negative: &mut Vec<u32>, positive: &mut Vec<u32>) {
        if !self.is_normal_flow_only_at(idx) {
            if self.style[idx as usize].effective_z_index() < 0 {
                negative.push(idx);
            } else {
                positive.push(idx);
            }
        }
        if !self.is_stacking_context_at(idx) {
            let mut c = self.first_child[idx as usize];
            while c != super::id::INVALID {
                self.collect_z_ordered(c, negative, positive);
                c = self.next_sibling[c as usize];
            }
        }
    }

    /// Recomputes the memoized 3-D descendant flag and returns what this
    /// layer contributes to its enclosing context's flag.
    fn update_3d_descendant_status(&mut self, idx: u32) -> bool {
        let i = idx as usize;
        if self.descendant_3d_epoch[i] != self.epoch {
            let mut has = false;
            let mut k = 0;
            while k < self.negative_z[i].len() {
                let child = self.negative_z[i][k];
                has |= self.update_3d_descendant_status(child);
                k += 1;
            }
            let mut k = 0;
            while k < self.positive_z[i].len() {
                let child = self.positive_z[i][k];
                has |= self.update_3d_descendant_status(child);
                k += 1;
            }
            self.descendant_3d[i] = has;
            self.descendant_3d_epoch[i] = self.epoch;
        }

        // The root of a 3-D rendering context carries the flag for the
        // whole context.
        if self.style[i].preserves_3d {
            self.has_3d_transform_at(idx) || self.descendant_3d[i]
        } else {
            self.has_3d_transform_at(idx)
        }
    }
}
