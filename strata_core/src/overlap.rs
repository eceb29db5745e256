// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlap map used during the compositing pass.
//!
//! The map is a stack of *contexts*. Each context collects the screen
//! rectangles of layers painted so far at one compositing level, plus the
//! union of those rectangles for cheap rejection.
//!
//! The stack always holds at least one context, a sentinel at the bottom.
//! Rectangles are recorded into the context *below* the top one: a layer
//! that opens a context for its own subtree keeps testing its children
//! against the top, while what the children paint lands where the layer's
//! later siblings will see it.

use alloc::vec;
use alloc::vec::Vec;

use kurbo::Rect;

/// Counters describing how a compositing pass used the overlap map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OverlapStats {
    /// Number of contexts pushed.
    pub contexts_begun: u32,
    /// Number of contexts popped.
    pub contexts_finished: u32,
    /// Deepest stack seen, sentinel included.
    pub max_depth: u32,
}

#[derive(Clone, Debug, Default)]
struct OverlapContext {
    rects: Vec<Rect>,
    bounds: Option<Rect>,
}

impl OverlapContext {
    fn add(&mut self, rect: Rect) {
        self.rects.push(rect);
        self.bounds = Some(match self.bounds {
            Some(b) => b.union(rect),
            None => rect,
        });
    }

    fn overlaps(&self, rect: Rect) -> bool {
        let Some(bounds) = self.bounds else {
            return false;
        };
        if !intersects(bounds, rect) {
            return false;
        }
        self.rects.iter().any(|r| intersects(*r, rect))
    }
}

/// Stack of rectangle sets tracking what composited content has been painted.
#[derive(Clone, Debug)]
pub struct OverlapMap {
    stack: Vec<OverlapContext>,
    stats: OverlapStats,
}

impl Default for OverlapMap {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlapMap {
    /// Creates a map holding only the sentinel context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stack: vec![OverlapContext::default()],
            stats: OverlapStats {
                contexts_begun: 0,
                contexts_finished: 0,
                max_depth: 1,
            },
        }
    }

    /// Pushes an empty context.
    pub fn begin_new_context(&mut self) {
        self.stack.push(OverlapContext::default());
        self.stats.contexts_begun += 1;
        self.stats.max_depth = self.stats.max_depth.max(self.depth());
    }

    /// Pops the top context and merges every rectangle it holds into the new
    /// top.
    ///
    /// Finishing with only the sentinel left is a no-op.
    pub fn finish_context(&mut self) {
        if self.stack.len() < 2 {
            return;
        }
        if let Some(top) = self.stack.pop() {
            if let Some(parent) = self.stack.last_mut() {
                for rect in top.rects {
                    parent.add(rect);
                }
            }
            self.stats.contexts_finished += 1;
        }
    }

    /// Records `rect` into the context below the top one.
    ///
    /// Rectangles with zero area are ignored.
    pub fn add(&mut self, rect: Rect) {
        if is_empty(rect) {
            return;
        }
        let len = self.stack.len();
        debug_assert!(len >= 2, "overlap map add needs an open context");
        let target = len.saturating_sub(2);
        self.stack[target].add(rect);
    }

    /// Returns `true` if `rect` overlaps anything in the top context.
    ///
    /// Rectangles with zero area never overlap.
    #[must_use]
    pub fn overlaps(&self, rect: Rect) -> bool {
        if is_empty(rect) {
            return false;
        }
        self.stack.last().is_some_and(|top| top.overlaps(rect))
    }

    /// Number of contexts on the stack, sentinel included.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.stack.len() as u32
    }

    /// Counters accumulated since the map was created.
    #[must_use]
    pub fn stats(&self) -> OverlapStats {
        self.stats
    }
}

/// Returns `true` for rectangles without positive width and height.
pub(crate) fn is_empty(rect: Rect) -> bool {
    !(rect.width() > 0.0 && rect.height() > 0.0)
}

/// Strict intersection: rectangles that only share an edge do not overlap.
fn intersects(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_only_overlaps_nothing() {
        let map = OverlapMap::new();
        assert_eq!(map.depth(), 1);
        assert!(!map.overlaps(Rect::new(0.0, 0.0, 100.0, 100.0)));
    }

    #[test]
    fn add_writes_below_top() {
        let mut map = OverlapMap::new();
        map.begin_new_context();
        map.add(Rect::new(0.0, 0.0, 50.0, 50.0));
        // The rectangle went into the sentinel, not the top.
        assert!(!map.overlaps(Rect::new(10.0, 10.0, 20.0, 20.0)));
        map.finish_context();
        assert!(map.overlaps(Rect::new(10.0, 10.0, 20.0, 20.0)));
    }

    #[test]
    fn finish_merges_rects_not_bounds() {
        let mut map = OverlapMap::new();
        map.begin_new_context();
        map.begin_new_context();
        map.add(Rect::new(0.0, 0.0, 10.0, 10.0));
        map.add(Rect::new(90.0, 90.0, 100.0, 100.0));
        map.finish_context();
        // The gap between the two rectangles is inside their union but
        // covered by neither.
        assert!(!map.overlaps(Rect::new(40.0, 40.0, 60.0, 60.0)));
        assert!(map.overlaps(Rect::new(5.0, 5.0, 15.0, 15.0)));
        map.finish_context();
        assert_eq!(map.depth(), 1);

        // The sentinel is never popped.
        map.finish_context();
        assert_eq!(map.depth(), 1);
        assert!(map.overlaps(Rect::new(95.0, 95.0, 99.0, 99.0)));
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let mut map = OverlapMap::new();
        map.begin_new_context();
        map.add(Rect::new(0.0, 0.0, 10.0, 10.0));
        map.finish_context();
        assert!(!map.overlaps(Rect::new(10.0, 0.0, 20.0, 10.0)));
        assert!(map.overlaps(Rect::new(9.0, 0.0, 20.0, 10.0)));
    }

    #[test]
    fn zero_area_rects_are_ignored() {
        let mut map = OverlapMap::new();
        map.begin_new_context();
        map.add(Rect::new(0.0, 0.0, 0.0, 100.0));
        map.finish_context();
        assert!(!map.overlaps(Rect::new(-10.0, -10.0, 10.0, 10.0)));

        map.begin_new_context();
        map.add(Rect::new(0.0, 0.0, 100.0, 100.0));
        map.finish_context();
        assert!(!map.overlaps(Rect::new(5.0, 5.0, 5.0, 50.0)));
    }

    #[test]
    fn stats_track_balance_and_depth() {
        let mut map = OverlapMap::new();
        map.begin_new_context();
        map.begin_new_context();
        map.finish_context();
        map.begin_new_context();
        map.finish_context();
        map.finish_context();

        let stats = map.stats();
        assert_eq!(stats.contexts_begun, 3);
        assert_eq!(stats.contexts_finished, 3);
        assert_eq!(stats.max_depth, 3);
        assert_eq!(map.depth(), 1);
    }
}
