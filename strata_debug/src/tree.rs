// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Indented text dump of the stacking tree.

use std::io::{self, Write};

use strata_core::compositing::CompositingState;
use strata_core::layer::{LayerId, LayerStore};

use crate::reason_names;

/// Writes the stacking tree of `store` in paint order, one layer per line.
///
/// Each line lists the slot index, box, z-index, backing and reasons.
/// Children are prefixed with `-` for the negative z-order list, `=` for
/// normal flow and `+` for the positive z-order list.
///
/// ```text
/// #0 box=0 z=0 [own] bounds=(0,0)-(800,600) reasons=root
///   -#1 box=1 z=-1 [none] bounds=(0,0)-(10,10) reasons=-
///   +#2 box=2 z=1 [own] bounds=(100,100)-(150,150) reasons=transform_3d
/// ```
///
/// # Panics
///
/// Panics if the stacking lists are out of date.
pub fn dump_tree(store: &LayerStore, writer: &mut dyn Write) -> io::Result<()> {
    if !store.compositing_mode_enabled() {
        writeln!(writer, "(compositing off)")?;
    }
    dump_layer(store, store.root(), "", 0, writer)
}

/// Like [`dump_tree`], collected into a `String`.
#[must_use]
pub fn format_tree(store: &LayerStore) -> String {
    let mut out = Vec::new();
    // Writing to a `Vec` cannot fail.
    let _ = dump_tree(store, &mut out);
    String::from_utf8_lossy(&out).into_owned()
}

fn dump_layer(
    store: &LayerStore,
    id: LayerId,
    marker: &str,
    depth: usize,
    writer: &mut dyn Write,
) -> io::Result<()> {
    let state = match store.compositing_state(id) {
        CompositingState::NotComposited => "none",
        CompositingState::PaintsIntoOwnBacking => "own",
        CompositingState::PaintsIntoSquashedBacking => "squashed",
    };
    let b = store.bounds(id);
    write!(
        writer,
        "{:indent$}{marker}#{} box={} z={} [{state}] bounds=({},{})-({},{}) reasons={}",
        "",
        id.index(),
        store.box_of(id).0,
        store.z_index(id),
        b.x0,
        b.y0,
        b.x1,
        b.y1,
        reason_names(store.compositing_reasons(id)),
        indent = depth * 2,
    )?;
    if store.should_isolate_composited_descendants(id) {
        write!(writer, " isolate")?;
    }
    writeln!(writer)?;

    let lists = store.stacking_lists(id);
    for c in lists.negative_z_order() {
        dump_layer(store, c, "-", depth + 1, writer)?;
    }
    for c in lists.normal_flow() {
        dump_layer(store, c, "=", depth + 1, writer)?;
    }
    for c in lists.positive_z_order() {
        dump_layer(store, c, "+", depth + 1, writer)?;
    }
    Ok(())
}
