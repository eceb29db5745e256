// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use strata_core::compositing::CompositingState;
use strata_core::trace::{
    CompositingModeEvent, LayerDecisionEvent, OverlapContextEvent, OverlapContextOp,
    PassBeginEvent, PassSummary, TraceSink,
};

use crate::reason_names;

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    decisions: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("decisions", &self.decisions)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            decisions: true,
        }
    }

    /// Drops per-layer decision and overlap-context lines, keeping only
    /// per-pass events.
    #[must_use]
    pub fn passes_only(mut self) -> Self {
        self.decisions = false;
        self
    }

    /// Consumes the sink and returns its writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn state_name(state: CompositingState) -> &'static str {
    match state {
        CompositingState::NotComposited => "none",
        CompositingState::PaintsIntoOwnBacking => "own",
        CompositingState::PaintsIntoSquashedBacking => "squashed",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[pass:begin] pass={} layers={}",
            e.pass_index, e.layer_count,
        );
    }

    fn on_compositing_mode(&mut self, e: &CompositingModeEvent) {
        let mode = if e.enabled { "on" } else { "off" };
        let _ = writeln!(self.writer, "[mode] pass={} compositing={mode}", e.pass_index);
    }

    fn on_pass_summary(&mut self, s: &PassSummary) {
        let mode = if s.compositing_mode { "on" } else { "off" };
        let _ = writeln!(
            self.writer,
            "[summary] pass={} visited={} own={} squashed={} mode={mode} \
             contexts={}/{} max_depth={}",
            s.pass_index,
            s.layers_visited,
            s.own_backings,
            s.squashed,
            s.overlap.contexts_begun,
            s.overlap.contexts_finished,
            s.overlap.max_depth,
        );
    }

    fn on_layer_decision(&mut self, e: &LayerDecisionEvent) {
        if !self.decisions {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[layer] pass={} #{} {} reasons={}",
            e.pass_index,
            e.layer_index,
            state_name(e.state),
            reason_names(e.reasons),
        );
    }

    fn on_overlap_context(&mut self, e: &OverlapContextEvent) {
        if !self.decisions {
            return;
        }
        let op = match e.op {
            OverlapContextOp::Begin => "begin",
            OverlapContextOp::Finish => "finish",
        };
        let _ = writeln!(
            self.writer,
            "[overlap:{op}] pass={} depth={}",
            e.pass_index, e.depth,
        );
    }
}
