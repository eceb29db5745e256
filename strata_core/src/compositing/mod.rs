// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compositing assignment.
//!
//! [`CompositingUpdater`] decides, once per layout pass, which layers get a
//! composited backing and why. It walks the stacking tree in paint order,
//! threading an [`OverlapMap`](crate::overlap::OverlapMap) through the walk
//! so that a layer painted on top of composited content is itself
//! composited (otherwise it would be drawn underneath).
//!
//! The result of a pass is written back into the
//! [`LayerStore`](crate::layer::LayerStore) and summarized in
//! [`CompositingChanges`].

mod changes;
mod updater;

pub use changes::CompositingChanges;
pub use updater::CompositingUpdater;

/// How a layer is composited after a pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CompositingState {
    /// The layer paints into its compositing ancestor's backing.
    #[default]
    NotComposited,
    /// The layer has a backing of its own.
    PaintsIntoOwnBacking,
    /// The layer shares a squashed backing with other overlap-only layers.
    PaintsIntoSquashedBacking,
}

impl CompositingState {
    /// Returns `true` for any state other than
    /// [`NotComposited`](Self::NotComposited).
    #[inline]
    #[must_use]
    pub const fn is_composited(self) -> bool {
        !matches!(self, Self::NotComposited)
    }
}
