// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer tree data model.
//!
//! A *layer* is the painting unit created for a box whose style needs one
//! (positioning, transforms, opacity, clipping, replaced content, ...). Each
//! layer has:
//!
//! - An identity ([`LayerId`]), a generational handle that becomes stale when
//!   the layer is destroyed, and an owning box ([`BoxId`]).
//! - Topology: parent, first-child, and sibling links forming an ordered
//!   tree that mirrors the layer-bearing boxes in document order.
//! - **Inputs** set by style resolution and layout:
//!   [`style`](LayerStore::set_style) and
//!   [`bounds`](LayerStore::set_bounds).
//! - **Stacking lists** derived from the inputs (see [`StackingLists`]).
//! - **Outputs** written by the compositing pass: reasons, compositing
//!   state, and descendant flags.
//!
//! Layers are stored in struct-of-arrays layout with index-based handles
//! for cache-friendly traversal.
//!
//! # Dirty tracking
//!
//! Mutations automatically mark the corresponding dirty channel (see
//! [`dirty`](crate::dirty)):
//!
//! - **STYLE**: local-only; only the restyled layer is marked.
//! - **GEOMETRY**: propagates to all descendants, since absolute bounds
//!   move with their ancestors.
//! - **TOPOLOGY**: structural changes (create, destroy, reparent).

mod id;
mod stacking;
mod store;
mod style;
mod traverse;

pub use id::{BoxId, INVALID, LayerId};
pub use stacking::StackingLists;
pub use store::LayerStore;
pub use style::{BlendMode, ContentKind, LayerStyle, LayerType, Position};
pub use traverse::{Ancestors, Children, PreOrder};
