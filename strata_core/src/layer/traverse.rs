// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{INVALID, LayerId};
use super::store::LayerStore;

/// An iterator over the direct children of a layer.
///
/// Created by [`LayerStore::children`].
#[derive(Debug)]
pub struct Children<'a> {
    store: &'a LayerStore,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(store: &'a LayerStore, first: u32) -> Self {
        Self {
            store,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = LayerId;

    fn next(&mut self) -> Option<LayerId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.next_sibling[idx as usize];
        Some(self.store.id_at(idx))
    }
}

/// An iterator over the strict ancestors of a layer, nearest first.
///
/// Created by [`LayerStore::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    store: &'a LayerStore,
    current: u32,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(store: &'a LayerStore, first: u32) -> Self {
        Self {
            store,
            current: first,
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = LayerId;

    fn next(&mut self) -> Option<LayerId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.parent[idx as usize];
        Some(self.store.id_at(idx))
    }
}

/// A depth-first pre-order iterator over a subtree, in document order.
///
/// Created by [`LayerStore::layers`]. Walks sibling links directly, so it
/// needs no stack.
#[derive(Debug)]
pub struct PreOrder<'a> {
    store: &'a LayerStore,
    start: u32,
    current: u32,
}

impl<'a> PreOrder<'a> {
    pub(crate) fn new(store: &'a LayerStore, start: u32) -> Self {
        Self {
            store,
            start,
            current: start,
        }
    }
}

impl Iterator for PreOrder<'_> {
    type Item = LayerId;

    fn next(&mut self) -> Option<LayerId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        let s = self.store;

        self.current = if s.first_child[idx as usize] != INVALID {
            s.first_child[idx as usize]
        } else {
            // Climb until a node with a next sibling, stopping at the start.
            let mut n = idx;
            loop {
                if n == self.start {
                    break INVALID;
                }
                let next = s.next_sibling[n as usize];
                if next != INVALID {
                    break next;
                }
                n = s.parent[n as usize];
            }
        };
        Some(s.id_at(idx))
    }
}
