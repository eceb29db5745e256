// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the compositing pass.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! compositing updater calls as it walks the tree. All method bodies default
//! to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`LayerDecisionEvent`] and
//!   [`OverlapContextEvent`] plus the corresponding `TraceSink` methods.

use crate::overlap::OverlapStats;
#[cfg(feature = "trace-rich")]
use crate::{compositing::CompositingState, reasons::CompositingReasons};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Direction of an overlap-map context change.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OverlapContextOp {
    /// A context was pushed.
    Begin,
    /// A context was popped and merged into its parent.
    Finish,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a compositing pass starts.
#[derive(Clone, Copy, Debug)]
pub struct PassBeginEvent {
    /// Monotonic pass counter.
    pub pass_index: u64,
    /// Number of live layers in the tree.
    pub layer_count: u32,
}

/// Emitted once the decision for a single layer is final.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct LayerDecisionEvent {
    /// Pass counter.
    pub pass_index: u64,
    /// Slot index of the layer.
    pub layer_index: u32,
    /// Reasons recorded for the layer.
    pub reasons: CompositingReasons,
    /// Resulting compositing state.
    pub state: CompositingState,
}

/// Emitted whenever the overlap map pushes or pops a context.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct OverlapContextEvent {
    /// Pass counter.
    pub pass_index: u64,
    /// What happened.
    pub op: OverlapContextOp,
    /// Stack depth after the change, sentinel included.
    pub depth: u32,
}

/// Emitted when a pass turns compositing mode on or off.
#[derive(Clone, Copy, Debug)]
pub struct CompositingModeEvent {
    /// Pass counter.
    pub pass_index: u64,
    /// Whether compositing mode is now enabled.
    pub enabled: bool,
}

/// Per-pass summary emitted when a compositing pass ends.
#[derive(Clone, Copy, Debug)]
pub struct PassSummary {
    /// Pass counter.
    pub pass_index: u64,
    /// Number of layers the walk visited.
    pub layers_visited: u32,
    /// Layers painting into their own backing.
    pub own_backings: u32,
    /// Layers painting into a squashed backing.
    pub squashed: u32,
    /// Whether compositing mode is enabled after the pass.
    pub compositing_mode: bool,
    /// Overlap map usage.
    pub overlap: OverlapStats,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the compositing pass.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a pass starts.
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        _ = e;
    }

    /// Called when a pass toggles compositing mode.
    fn on_compositing_mode(&mut self, e: &CompositingModeEvent) {
        _ = e;
    }

    /// Called with a per-pass summary.
    fn on_pass_summary(&mut self, s: &PassSummary) {
        _ = s;
    }

    /// Called with each per-layer decision (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_layer_decision(&mut self, e: &LayerDecisionEvent) {
        _ = e;
    }

    /// Called on each overlap context change (requires `trace-rich`
    /// feature).
    #[cfg(feature = "trace-rich")]
    fn on_overlap_context(&mut self, e: &OverlapContextEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`PassBeginEvent`].
    #[inline]
    pub fn pass_begin(&mut self, e: &PassBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pass_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CompositingModeEvent`].
    #[inline]
    pub fn compositing_mode(&mut self, e: &CompositingModeEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_compositing_mode(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PassSummary`].
    #[inline]
    pub fn pass_summary(&mut self, s: &PassSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_pass_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits a [`LayerDecisionEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn layer_decision(&mut self, e: &LayerDecisionEvent) {
        if let Some(s) = &mut self.sink {
            s.on_layer_decision(e);
        }
    }

    /// Emits an [`OverlapContextEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn overlap_context(&mut self, e: &OverlapContextEvent) {
        if let Some(s) = &mut self.sink {
            s.on_overlap_context(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
