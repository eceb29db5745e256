// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer tree and compositing assignment.
//!
//! `strata_core` decides which layers of a stacking tree get a composited
//! backing, and why. It is `no_std` compatible (with `alloc`) and uses
//! array-based struct-of-arrays storage with index handles for
//! cache-friendly traversal.
//!
//! # Architecture
//!
//! Layout and style resolution feed a layer tree; once per layout pass the
//! compositing updater walks it in paint order and writes its decisions
//! back:
//!
//! ```text
//!   Box tree (style + bounds)
//!       │
//!       ▼
//!   LayerStore ──► update_stacking_lists() ──► StackingLists
//!       │                                          │
//!       ▼                                          ▼
//!   CompositingUpdater::update() ◄── OverlapMap, ReasonPolicy
//!       │
//!       ▼
//!   CompositingReasons + CompositingState per layer ──► CompositingChanges
//!       │
//!       ▼
//!   Paint / hit-test walkers (strata_render)
//! ```
//!
//! **[`layer`]**: Struct-of-arrays layer tree with generational handles.
//! Style and bounds are set by the caller; z-order lists are derived and
//! memoized.
//!
//! **[`dirty`]**: Multi-channel dirty tracking via `understory_dirty`.
//! STYLE is local, GEOMETRY propagates to descendants, TOPOLOGY marks
//! structural edits.
//!
//! **[`reasons`]**: The [`CompositingReasons`](reasons::CompositingReasons)
//! bitmask and its direct, overlap, subtree, and structural families.
//!
//! **[`policy`]**: The [`ReasonPolicy`](policy::ReasonPolicy) trait that
//! supplies direct reasons.
//!
//! **[`overlap`]**: The stack-of-contexts overlap map used during a pass.
//!
//! **[`compositing`]**: The
//! [`CompositingUpdater`](compositing::CompositingUpdater) walk and per-pass
//! [`CompositingChanges`](compositing::CompositingChanges).
//!
//! **[`config`]**: [`CompositingConfig`](config::CompositingConfig) presets.
//!
//! **[`transform`]**: 3D affine transform type used by layer styles.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! pass instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-layer
//!   decision and overlap-context events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod compositing;
pub mod config;
pub mod dirty;
pub mod layer;
pub mod overlap;
pub mod policy;
pub mod reasons;
pub mod trace;
pub mod transform;
