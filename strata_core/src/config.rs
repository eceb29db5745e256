// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compositing settings.

/// Settings that steer the compositing pass.
///
/// Presets cover the common host configurations; individual fields can be
/// overridden with struct update syntax.
///
/// ```
/// use strata_core::config::CompositingConfig;
///
/// let config = CompositingConfig {
///     force_compositing_mode: true,
///     ..CompositingConfig::high_dpi()
/// };
/// assert!(config.accelerated_compositing);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompositingConfig {
    /// GPU compositing is available. When off, no layer is ever composited.
    pub accelerated_compositing: bool,
    /// Composite eagerly rather than keep subpixel text antialiasing.
    ///
    /// Enables the out-of-flow clipping reason and the unclipped-descendant
    /// overlap heuristic.
    pub prefer_compositing_to_lcd_text: bool,
    /// Fixed-position layers get a direct reason.
    pub composite_fixed_position: bool,
    /// Layers whose only reasons are overlap-derived share a squashed
    /// backing instead of getting their own.
    pub layer_squashing: bool,
    /// The root layer is always composited.
    pub force_compositing_mode: bool,
}

impl CompositingConfig {
    /// High-DPI displays: grayscale text costs nothing, so composite freely.
    #[must_use]
    pub const fn high_dpi() -> Self {
        Self {
            accelerated_compositing: true,
            prefer_compositing_to_lcd_text: true,
            composite_fixed_position: true,
            layer_squashing: true,
            force_compositing_mode: false,
        }
    }

    /// Low-DPI displays: keep LCD text wherever possible.
    #[must_use]
    pub const fn low_dpi() -> Self {
        Self {
            accelerated_compositing: true,
            prefer_compositing_to_lcd_text: false,
            composite_fixed_position: false,
            layer_squashing: true,
            force_compositing_mode: false,
        }
    }

    /// No GPU: everything paints on the software path.
    #[must_use]
    pub const fn software() -> Self {
        Self {
            accelerated_compositing: false,
            prefer_compositing_to_lcd_text: false,
            composite_fixed_position: false,
            layer_squashing: false,
            force_compositing_mode: false,
        }
    }
}

impl Default for CompositingConfig {
    fn default() -> Self {
        Self::low_dpi()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_low_dpi() {
        assert_eq!(CompositingConfig::default(), CompositingConfig::low_dpi());
    }

    #[test]
    fn software_disables_acceleration() {
        let config = CompositingConfig::software();
        assert!(!config.accelerated_compositing);
        assert!(!config.layer_squashing);
    }
}
