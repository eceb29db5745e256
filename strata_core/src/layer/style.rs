// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolved box style, as far as layering and compositing care.

use crate::transform::Transform3d;

use super::id::BoxId;

/// CSS positioning scheme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Position {
    /// `position: static`.
    #[default]
    Static,
    /// `position: relative`.
    Relative,
    /// `position: absolute`.
    Absolute,
    /// `position: fixed`.
    Fixed,
}

impl Position {
    /// Returns `true` for any scheme other than `static`.
    #[inline]
    #[must_use]
    pub const fn is_positioned(self) -> bool {
        !matches!(self, Self::Static)
    }

    /// Returns `true` for `absolute` and `fixed`.
    #[inline]
    #[must_use]
    pub const fn is_out_of_flow(self) -> bool {
        matches!(self, Self::Absolute | Self::Fixed)
    }
}

/// `mix-blend-mode` of a box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Standard source-over compositing.
    #[default]
    Normal,
    /// Multiply blend.
    Multiply,
    /// Screen blend.
    Screen,
    /// Overlay blend.
    Overlay,
    /// Difference blend.
    Difference,
}

/// Replaced content a box presents, if any.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// Ordinary flow content.
    #[default]
    Normal,
    /// A video element.
    Video,
    /// An accelerated canvas.
    Canvas,
    /// A plugin surface.
    Plugin,
    /// A nested browsing context.
    Frame,
}

/// Whether, and why, a box needs a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerType {
    /// The box paints into an ancestor layer.
    None,
    /// The box needs a layer only to clip its overflow; it does not paint
    /// itself.
    OverflowClip,
    /// The box needs a full painting layer.
    Normal,
}

/// Resolved style flags of the box that owns a layer.
///
/// Produced by style resolution and layout; the compositing engine treats
/// these as read-only inputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerStyle {
    /// Positioning scheme.
    pub position: Position,
    /// `z-index`; `None` is `auto`. Only honored on positioned boxes.
    pub z_index: Option<i32>,
    /// `transform`, if any.
    pub transform: Option<Transform3d>,
    /// `transform-style: preserve-3d`.
    pub preserves_3d: bool,
    /// `perspective` is set.
    pub has_perspective: bool,
    /// `backface-visibility: hidden`.
    pub backface_hidden: bool,
    /// `opacity`, in `0.0..=1.0`.
    pub opacity: f32,
    /// `mix-blend-mode`.
    pub blend_mode: BlendMode,
    /// `isolation: isolate`.
    pub isolation: bool,
    /// `overflow` other than `visible`.
    pub overflow_clip: bool,
    /// The box is a scroll container with scrollable overflow.
    pub scrollable: bool,
    /// The scroll container needs its scrolling done on the compositor.
    pub needs_composited_scrolling: bool,
    /// The scroll container uses overlay scrollbars.
    pub overlay_scrollbars: bool,
    /// A mask is applied.
    pub has_mask: bool,
    /// A filter is applied.
    pub has_filter: bool,
    /// Replaced content kind.
    pub content: ContentKind,
    /// A transform animation is running.
    pub animating_transform: bool,
    /// An opacity animation is running.
    pub animating_opacity: bool,
    /// `will-change: transform`.
    pub will_change_transform: bool,
    /// The box is out-of-flow and not clipped by an ancestor that clips its
    /// in-flow siblings.
    pub escapes_ancestor_clip: bool,
    /// The box's clip cannot be bounded ahead of time, so its painted extent
    /// is unknown to layers painted after it.
    pub unbounded_clip: bool,
    /// The box's containing block, if known.
    pub containing_block: Option<BoxId>,
    /// Layout has not produced final geometry for this box yet.
    pub layout_pending: bool,
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            position: Position::Static,
            z_index: None,
            transform: None,
            preserves_3d: false,
            has_perspective: false,
            backface_hidden: false,
            opacity: 1.0,
            blend_mode: BlendMode::Normal,
            isolation: false,
            overflow_clip: false,
            scrollable: false,
            needs_composited_scrolling: false,
            overlay_scrollbars: false,
            has_mask: false,
            has_filter: false,
            content: ContentKind::Normal,
            animating_transform: false,
            animating_opacity: false,
            will_change_transform: false,
            escapes_ancestor_clip: false,
            unbounded_clip: false,
            containing_block: None,
            layout_pending: false,
        }
    }
}

impl LayerStyle {
    /// Style of a positioned box with the given `z-index`.
    #[must_use]
    pub fn positioned(position: Position, z_index: Option<i32>) -> Self {
        Self {
            position,
            z_index,
            ..Self::default()
        }
    }

    /// Returns `true` if the box has an opacity below 1.
    #[inline]
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }

    /// Classifies the layer this style needs, if any.
    #[must_use]
    pub fn layer_type(&self) -> LayerType {
        if self.position.is_positioned()
            || self.transform.is_some()
            || self.is_transparent()
            || self.blend_mode != BlendMode::Normal
            || self.isolation
            || self.has_mask
            || self.has_filter
            || self.preserves_3d
            || self.has_perspective
            || self.content != ContentKind::Normal
            || self.animating_transform
            || self.animating_opacity
            || self.will_change_transform
        {
            LayerType::Normal
        } else if self.overflow_clip {
            LayerType::OverflowClip
        } else {
            LayerType::None
        }
    }

    /// Returns `true` if a box with this style needs a layer.
    #[inline]
    #[must_use]
    pub fn needs_layer(&self) -> bool {
        self.layer_type() != LayerType::None
    }

    /// Returns `true` if the box establishes a stacking context.
    ///
    /// The root box always does.
    #[must_use]
    pub fn creates_stacking_context(&self, is_root: bool) -> bool {
        is_root
            || (self.position.is_positioned() && self.z_index.is_some())
            || self.position == Position::Fixed
            || self.transform.is_some()
            || self.is_transparent()
            || self.blend_mode != BlendMode::Normal
            || self.isolation
            || self.has_mask
            || self.has_filter
            || self.preserves_3d
            || self.has_perspective
            || self.will_change_transform
    }

    /// Returns `true` if the layer paints in normal-flow order and takes no
    /// part in z-ordering.
    #[must_use]
    pub fn is_normal_flow_only(&self, is_root: bool) -> bool {
        if is_root {
            return false;
        }
        let could_be_normal_flow =
            self.overflow_clip || self.has_mask || self.content != ContentKind::Normal;
        let prevents_normal_flow = self.position.is_positioned()
            || self.transform.is_some()
            || self.has_filter
            || self.blend_mode != BlendMode::Normal
            || self.is_transparent();
        could_be_normal_flow && !prevents_normal_flow
    }

    /// The stack level used to order this layer within its stacking context.
    ///
    /// `auto` and ignored `z-index` values order as 0.
    #[inline]
    #[must_use]
    pub fn effective_z_index(&self) -> i32 {
        if self.position.is_positioned() {
            self.z_index.unwrap_or(0)
        } else {
            0
        }
    }
}
