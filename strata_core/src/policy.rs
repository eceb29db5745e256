// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Direct compositing reasons.
//!
//! The compositing pass asks a [`ReasonPolicy`] for the reasons a layer
//! needs a backing on its own account, before looking at overlap or at its
//! descendants. [`DefaultReasonPolicy`] reads them off the layer's style and
//! content; hosts can substitute their own policy to add or veto reasons.

use crate::config::CompositingConfig;
use crate::layer::{LayerId, LayerStore};
use crate::reasons::CompositingReasons;

/// Computes the direct compositing reasons of a layer.
pub trait ReasonPolicy {
    /// Returns the reasons `id` needs a backing independent of its position
    /// in paint order.
    fn direct_reasons(&self, store: &LayerStore, id: LayerId) -> CompositingReasons;
}

/// Reason policy driven by style, content kind, and [`CompositingConfig`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultReasonPolicy {
    config: CompositingConfig,
}

impl DefaultReasonPolicy {
    /// Creates a policy for the given settings.
    #[must_use]
    pub const fn new(config: CompositingConfig) -> Self {
        Self { config }
    }
}

impl ReasonPolicy for DefaultReasonPolicy {
    fn direct_reasons(&self, store: &LayerStore, id: LayerId) -> CompositingReasons {
        let style = store.style(id);
        let mut reasons = store.potential_reasons(id)
            & CompositingReasons::COMBO_DIRECT_STYLE_DETERMINED;
        reasons |= CompositingReasons::from_content(style);

        if !self.config.composite_fixed_position {
            reasons.remove(CompositingReasons::POSITION_FIXED);
        }
        if self.config.prefer_compositing_to_lcd_text && style.escapes_ancestor_clip {
            reasons |= CompositingReasons::OUT_OF_FLOW_CLIPPING;
        }
        if self.config.force_compositing_mode && store.is_root_layer(id) {
            reasons |= CompositingReasons::ROOT;
        }
        reasons
    }
}

impl<P: ReasonPolicy + ?Sized> ReasonPolicy for &P {
    fn direct_reasons(&self, store: &LayerStore, id: LayerId) -> CompositingReasons {
        (**self).direct_reasons(store, id)
    }
}
