// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compositing reasons.
//!
//! Every composited layer carries a [`CompositingReasons`] bitmask recording
//! *why* it was given a backing. Reasons fall into four families:
//!
//! - **Direct**: a function of the layer's own style or content (3-D
//!   transform, running animation, video, fixed position, ...).
//! - **Overlap**: the layer is painted after, and on top of, something that
//!   is already composited.
//! - **Subtree**: the layer has composited descendants and applies an effect
//!   (clip, opacity, mask, ...) that must reach them too.
//! - **Structural**: the root layer, and layers that must composite to keep
//!   their negative z-order children underneath their own content.
//!
//! Overlap-derived reasons are *squashable*: a layer that has nothing but
//! squashable reasons may share a backing with other such layers instead of
//! getting its own.

use bitflags::bitflags;

use crate::layer::{BlendMode, ContentKind, LayerStyle, Position};

bitflags! {
    /// Set of reasons a layer needs a composited backing.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CompositingReasons: u64 {
        /// The layer has a transform with a 3-D component.
        const TRANSFORM_3D = 1 << 0;
        /// The layer's content is a video.
        const VIDEO = 1 << 1;
        /// The layer's content is an accelerated canvas.
        const CANVAS = 1 << 2;
        /// The layer's content is a plugin.
        const PLUGIN = 1 << 3;
        /// The layer's content is a nested frame.
        const IFRAME = 1 << 4;
        /// The layer hides its back face and is transformed in 3-D.
        const BACKFACE_VISIBILITY_HIDDEN = 1 << 5;
        /// The layer runs a transform animation.
        const ACTIVE_TRANSFORM_ANIMATION = 1 << 6;
        /// The layer runs an opacity animation.
        const ACTIVE_OPACITY_ANIMATION = 1 << 7;
        /// The layer declares `will-change: transform`.
        const WILL_CHANGE_TRANSFORM = 1 << 8;
        /// The layer is fixed-position.
        const POSITION_FIXED = 1 << 9;
        /// The layer scrolls its overflow on the compositor.
        const OVERFLOW_SCROLLING = 1 << 10;
        /// The layer is out-of-flow and escapes a clipping ancestor.
        const OUT_OF_FLOW_CLIPPING = 1 << 11;
        /// The layer paints on top of a composited video.
        const VIDEO_OVERLAY = 1 << 12;

        /// The layer overlaps composited content painted before it.
        const OVERLAP = 1 << 13;
        /// The layer may overlap composited content; testing was not possible.
        const ASSUMED_OVERLAP = 1 << 14;

        /// Flat transform applied to composited descendants.
        const TRANSFORM_WITH_COMPOSITED_DESCENDANTS = 1 << 15;
        /// Opacity applied to composited descendants.
        const OPACITY_WITH_COMPOSITED_DESCENDANTS = 1 << 16;
        /// Mask applied to composited descendants.
        const MASK_WITH_COMPOSITED_DESCENDANTS = 1 << 17;
        /// Filter applied to composited descendants.
        const FILTER_WITH_COMPOSITED_DESCENDANTS = 1 << 18;
        /// Blend mode applied to composited descendants.
        const BLENDING_WITH_COMPOSITED_DESCENDANTS = 1 << 19;
        /// The layer isolates blending of composited descendants.
        const ISOLATE_COMPOSITED_DESCENDANTS = 1 << 20;
        /// The layer clips composited descendants.
        const CLIPS_COMPOSITING_DESCENDANTS = 1 << 21;
        /// `transform-style: preserve-3d` with 3-D transformed descendants.
        const PRESERVE_3D_WITH_3D_DESCENDANTS = 1 << 22;
        /// `perspective` with 3-D transformed descendants.
        const PERSPECTIVE_WITH_3D_DESCENDANTS = 1 << 23;

        /// The layer has composited negative z-order children.
        const NEGATIVE_Z_INDEX_CHILDREN = 1 << 24;
        /// The layer is the root of a composited tree.
        const ROOT = 1 << 25;
    }
}

impl CompositingReasons {
    /// Reasons that only justify squashing into a shared backing.
    pub const COMBO_SQUASHABLE: Self = Self::OVERLAP.union(Self::ASSUMED_OVERLAP);

    /// Direct reasons that can be read off the style alone.
    pub const COMBO_DIRECT_STYLE_DETERMINED: Self = Self::TRANSFORM_3D
        .union(Self::BACKFACE_VISIBILITY_HIDDEN)
        .union(Self::ACTIVE_TRANSFORM_ANIMATION)
        .union(Self::ACTIVE_OPACITY_ANIMATION)
        .union(Self::WILL_CHANGE_TRANSFORM);

    /// Own-effect reasons that apply once the layer has composited
    /// descendants.
    pub const COMBO_COMPOSITED_DESCENDANTS: Self = Self::TRANSFORM_WITH_COMPOSITED_DESCENDANTS
        .union(Self::OPACITY_WITH_COMPOSITED_DESCENDANTS)
        .union(Self::MASK_WITH_COMPOSITED_DESCENDANTS)
        .union(Self::FILTER_WITH_COMPOSITED_DESCENDANTS)
        .union(Self::BLENDING_WITH_COMPOSITED_DESCENDANTS)
        .union(Self::CLIPS_COMPOSITING_DESCENDANTS);

    /// Reasons that apply once the layer has 3-D transformed descendants.
    pub const COMBO_3D_DESCENDANTS: Self =
        Self::PRESERVE_3D_WITH_3D_DESCENDANTS.union(Self::PERSPECTIVE_WITH_3D_DESCENDANTS);

    /// Every reason that [`potential_from_style`](Self::potential_from_style)
    /// can produce.
    pub const COMBO_ALL_STYLE_DETERMINED: Self = Self::COMBO_DIRECT_STYLE_DETERMINED
        .union(Self::COMBO_COMPOSITED_DESCENDANTS)
        .union(Self::COMBO_3D_DESCENDANTS);

    /// Computes the reasons a layer *could* have from its style alone,
    /// independent of where it sits in the tree.
    ///
    /// Direct style reasons are included as-is; subtree reasons are included
    /// as candidates that the updater masks in once descendant information is
    /// known.
    #[must_use]
    pub fn potential_from_style(style: &LayerStyle) -> Self {
        let mut reasons = Self::empty();
        if let Some(transform) = &style.transform {
            if transform.has_3d_component() {
                reasons |= Self::TRANSFORM_3D;
                if style.backface_hidden {
                    reasons |= Self::BACKFACE_VISIBILITY_HIDDEN;
                }
            }
            reasons |= Self::TRANSFORM_WITH_COMPOSITED_DESCENDANTS;
        }
        if style.animating_transform {
            reasons |= Self::ACTIVE_TRANSFORM_ANIMATION;
        }
        if style.animating_opacity {
            reasons |= Self::ACTIVE_OPACITY_ANIMATION;
        }
        if style.will_change_transform {
            reasons |= Self::WILL_CHANGE_TRANSFORM;
        }
        if style.opacity < 1.0 {
            reasons |= Self::OPACITY_WITH_COMPOSITED_DESCENDANTS;
        }
        if style.has_mask {
            reasons |= Self::MASK_WITH_COMPOSITED_DESCENDANTS;
        }
        if style.has_filter {
            reasons |= Self::FILTER_WITH_COMPOSITED_DESCENDANTS;
        }
        if style.blend_mode != BlendMode::Normal {
            reasons |= Self::BLENDING_WITH_COMPOSITED_DESCENDANTS;
        }
        if style.overflow_clip {
            reasons |= Self::CLIPS_COMPOSITING_DESCENDANTS;
        }
        if style.preserves_3d {
            reasons |= Self::PRESERVE_3D_WITH_3D_DESCENDANTS;
        }
        if style.has_perspective {
            reasons |= Self::PERSPECTIVE_WITH_3D_DESCENDANTS;
        }
        reasons
    }

    /// Direct reasons that depend on content or positioning rather than on
    /// paint effects.
    #[must_use]
    pub fn from_content(style: &LayerStyle) -> Self {
        let mut reasons = match style.content {
            ContentKind::Normal => Self::empty(),
            ContentKind::Video => Self::VIDEO,
            ContentKind::Canvas => Self::CANVAS,
            ContentKind::Plugin => Self::PLUGIN,
            ContentKind::Frame => Self::IFRAME,
        };
        if style.needs_composited_scrolling {
            reasons |= Self::OVERFLOW_SCROLLING;
        }
        if style.position == Position::Fixed {
            reasons |= Self::POSITION_FIXED;
        }
        reasons
    }

    /// Returns `true` if these reasons call for a dedicated backing.
    #[inline]
    #[must_use]
    pub const fn requires_compositing(self) -> bool {
        !self.difference(Self::COMBO_SQUASHABLE).is_empty()
    }

    /// Returns `true` if any reason allows squashing into a shared backing.
    #[inline]
    #[must_use]
    pub const fn requires_squashing(self) -> bool {
        self.intersects(Self::COMBO_SQUASHABLE)
    }

    /// Returns `true` if the layer needs any kind of compositing identity.
    #[inline]
    #[must_use]
    pub const fn requires_compositing_or_squashing(self) -> bool {
        !self.is_empty()
    }
}
