// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Strata uses multi-channel dirty tracking (via [`understory_dirty`]) to
//! report what changed between two compositing passes. Each channel
//! represents an independent category of change.
//!
//! # Propagation semantics
//!
//! - **Propagating**: [`GEOMETRY`] uses
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) with dependency edges
//!   from child to parent. Moving or resizing a box moves every descendant
//!   layer's absolute bounds with it.
//!
//! - **Local-only**: [`STYLE`] is marked with the default policy. Style
//!   flags are per-box; descendants keep their own potential reasons.
//!
//! - **Structural**: [`TOPOLOGY`] is marked on tree mutations (create,
//!   destroy, add, remove, reparent). It does not propagate.
//!
//! # Consumption
//!
//! Each [`CompositingUpdater::update`](crate::compositing::CompositingUpdater::update)
//! call drains all channels and surfaces the result in
//! [`CompositingChanges`](crate::compositing::CompositingChanges).

use understory_dirty::Channel;

/// Style flags changed: potential reasons and stacking role recomputed.
pub const STYLE: Channel = Channel::new(0);

/// Absolute bounds changed for the layer and its descendants.
pub const GEOMETRY: Channel = Channel::new(1);

/// Tree topology changed.
pub const TOPOLOGY: Channel = Channel::new(2);
