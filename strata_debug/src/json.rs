// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON snapshots of a layer tree.
//!
//! A snapshot captures every live layer with its tree links, stacking
//! inputs and the last compositing decision, for diffing between passes or
//! loading into external tooling.

use std::io::{self, Write};

use serde_json::{Value, json};

use strata_core::compositing::CompositingState;
use strata_core::layer::{LayerId, LayerStore};

/// Captures the layer tree of `store` as a JSON value.
///
/// Layers appear in pre-order. Each entry carries its slot `index`, which
/// `parent` refers to.
#[must_use]
pub fn snapshot(store: &LayerStore) -> Value {
    let layers: Vec<Value> = store.layers().map(|id| layer(store, id)).collect();
    json!({
        "compositing_mode": store.compositing_mode_enabled(),
        "root": store.root().index(),
        "layers": layers,
    })
}

/// Writes [`snapshot`] to `writer` as pretty-printed JSON.
pub fn write_snapshot(store: &LayerStore, writer: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &snapshot(store))?;
    writeln!(writer)
}

fn layer(store: &LayerStore, id: LayerId) -> Value {
    let b = store.bounds(id);
    let reasons: Vec<&str> = store
        .compositing_reasons(id)
        .iter_names()
        .map(|(name, _)| name)
        .collect();
    let state = match store.compositing_state(id) {
        CompositingState::NotComposited => "not_composited",
        CompositingState::PaintsIntoOwnBacking => "own_backing",
        CompositingState::PaintsIntoSquashedBacking => "squashed_backing",
    };
    json!({
        "index": id.index(),
        "generation": id.generation(),
        "box": store.box_of(id).0,
        "parent": store.parent(id).map(|p| p.index()),
        "z_index": store.z_index(id),
        "stacking_context": store.is_stacking_context(id),
        "self_painting": store.is_self_painting(id),
        "bounds": [b.x0, b.y0, b.x1, b.y1],
        "state": state,
        "reasons": reasons,
        "has_compositing_descendant": store.has_compositing_descendant(id),
        "isolates": store.should_isolate_composited_descendants(id),
    })
}
