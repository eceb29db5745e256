// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint plans, hit testing, and damage tracking for strata layer trees.
//!
//! This crate consumes the stacking lists and compositing decisions that
//! [`strata_core`] produces. It provides:
//!
//! - [`PaintPlan`]: layers in back-to-front paint order, each tagged with
//!   the backing it paints into
//! - [`hit_test`] and [`hit_test_all`]: front-to-back point queries
//! - [`DamageRegion`]: what to repaint after a compositing pass

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod damage;
mod plan;

pub use damage::DamageRegion;
pub use hit_test::{hit_test, hit_test_all};
pub use plan::{PaintItem, PaintPlan, PaintTarget};
