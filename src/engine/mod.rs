// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Costing and pricing engine.
//!
//! Pure computation over a [`ProductSnapshot`]: no I/O, no shared state.
//! Callers assemble the snapshot (see [`resolver::resolve`]) and hand it to
//! [`calculate`].

pub mod aggregate;
pub mod money;
pub mod pricing;
pub mod proration;
pub mod report;
pub mod resolver;
pub mod snapshot;

pub use money::{Money, Percent, Quantity};
pub use report::PricingReport;
pub use resolver::Catalog;
pub use snapshot::ProductSnapshot;

use crate::error::EngineError;
use crate::models::Product;

/// Validates `snapshot` and builds its pricing report.
pub fn calculate(snapshot: &ProductSnapshot) -> Result<PricingReport, EngineError> {
    report::build(snapshot)
}

/// Resolves `product` against `catalog`, then prices it.
pub fn calculate_product(product: &Product, catalog: &Catalog) -> Result<PricingReport, EngineError> {
    let snapshot = resolver::resolve(product, catalog)?;
    calculate(&snapshot)
}
