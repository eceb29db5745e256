// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runs a few compositing passes over a small page and prints what happened.
//!
//! Events go to a [`PrettyPrintSink`](strata_debug::pretty::PrettyPrintSink)
//! on stdout. After each pass the demo dumps the stacking tree, the paint
//! plan and the damage, and finally writes a JSON snapshot of the tree.

use std::fs::File;
use std::io::BufWriter;

use kurbo::{Point, Rect};
use strata_core::compositing::CompositingUpdater;
use strata_core::config::CompositingConfig;
use strata_core::layer::{BoxId, ContentKind, LayerStore, LayerStyle, Position};
use strata_core::trace::Tracer;
use strata_core::transform::Transform3d;
use strata_debug::pretty::PrettyPrintSink;
use strata_debug::tree::format_tree;
use strata_render::{DamageRegion, PaintPlan, PaintTarget, hit_test};

fn main() {
    let mut sink = PrettyPrintSink::new(Box::new(std::io::stdout()));
    let mut updater = CompositingUpdater::new(CompositingConfig::high_dpi());
    let mut plan = PaintPlan::default();

    // -- page --------------------------------------------------------------
    let mut store = LayerStore::new(BoxId(0), LayerStyle::default());
    let root = store.root();
    store.set_bounds(root, Rect::new(0.0, 0.0, 1280.0, 2000.0));

    let header = store.create_layer(
        root,
        BoxId(1),
        LayerStyle::positioned(Position::Fixed, Some(10)),
    );
    store.set_bounds(header, Rect::new(0.0, 0.0, 1280.0, 64.0));

    let backdrop = store.create_layer(
        root,
        BoxId(2),
        LayerStyle::positioned(Position::Absolute, Some(-1)),
    );
    store.set_bounds(backdrop, Rect::new(0.0, 0.0, 1280.0, 600.0));

    let article = store.create_layer(
        root,
        BoxId(3),
        LayerStyle::positioned(Position::Relative, None),
    );
    store.set_bounds(article, Rect::new(200.0, 100.0, 1080.0, 1900.0));

    let video = store.create_layer(
        article,
        BoxId(4),
        LayerStyle {
            content: ContentKind::Video,
            ..LayerStyle::positioned(Position::Relative, None)
        },
    );
    store.set_bounds(video, Rect::new(240.0, 140.0, 880.0, 500.0));

    let caption = store.create_layer(
        article,
        BoxId(5),
        LayerStyle::positioned(Position::Relative, Some(1)),
    );
    store.set_bounds(caption, Rect::new(240.0, 460.0, 880.0, 520.0));

    // -- passes ------------------------------------------------------------
    run_pass(&mut updater, &mut store, &mut sink, &mut plan, "initial");

    // The caption starts a transform animation.
    let style = *store.style(caption);
    store.set_style(
        caption,
        LayerStyle {
            animating_transform: true,
            transform: Some(Transform3d::from_translation(0.0, -8.0, 0.0)),
            ..style
        },
    );
    run_pass(&mut updater, &mut store, &mut sink, &mut plan, "animation");

    // The video ends and its box becomes a plain flow box.
    let _ = store.apply_style(video, LayerStyle::default());
    run_pass(&mut updater, &mut store, &mut sink, &mut plan, "video removed");

    let probe = Point::new(300.0, 30.0);
    if let Some(hit) = hit_test(&store, probe) {
        println!("hit at {probe:?}: box {}", store.box_of(hit).0);
    }

    let path = "snapshot.json";
    let file = File::create(path).expect("failed to create snapshot.json");
    let mut writer = BufWriter::new(file);
    strata_debug::json::write_snapshot(&store, &mut writer).expect("failed to write snapshot");
    println!("Wrote {path} ({} layers)", store.layer_count());
}

fn run_pass(
    updater: &mut CompositingUpdater,
    store: &mut LayerStore,
    sink: &mut PrettyPrintSink,
    plan: &mut PaintPlan,
    label: &str,
) {
    println!("== {label} ==");
    let changes = updater.update(store, &mut Tracer::new(sink));

    print!("{}", format_tree(store));

    plan.rebuild(store);
    for item in &plan.items {
        let target = match item.target {
            PaintTarget::Software => String::from("software"),
            PaintTarget::OwnBacking => String::from("own"),
            PaintTarget::Squashed(owner) => format!("squashed into #{}", owner.index()),
            PaintTarget::Ancestor(owner) => format!("into #{}", owner.index()),
        };
        println!(
            "{:indent$}paint #{} -> {target}",
            "",
            item.layer.index(),
            indent = item.depth as usize * 2,
        );
    }
    println!("backings: {}", plan.backing_count());

    match DamageRegion::from_changes(store, &changes) {
        DamageRegion::Full => println!("damage: full"),
        DamageRegion::None => println!("damage: none"),
        DamageRegion::Rects(rects) => println!("damage: {} rect(s)", rects.len()),
    }
}
