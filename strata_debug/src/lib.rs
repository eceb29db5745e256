// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing, tree dumps, and JSON snapshots for strata diagnostics.
//!
//! - [`pretty::PrettyPrintSink`]: a [`TraceSink`](strata_core::trace::TraceSink)
//!   that writes one line per compositing event.
//! - [`tree::dump_tree`]: indented text dump of the stacking tree with
//!   each layer's reasons and backing.
//! - [`json::snapshot`]: the whole layer tree as a `serde_json` value.

pub mod json;
pub mod pretty;
pub mod tree;

use strata_core::reasons::CompositingReasons;

/// Formats reasons as lowercase flag names joined by `|`, or `-` when empty.
#[must_use]
pub fn reason_names(reasons: CompositingReasons) -> String {
    if reasons.is_empty() {
        return String::from("-");
    }
    reasons
        .iter_names()
        .map(|(name, _)| name.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("|")
}
