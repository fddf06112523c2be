// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use thiserror::Error;

/// Which catalog a product line points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Ingredient,
    FixedExpense,
    VariableExpense,
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CatalogKind::Ingredient => "ingredient",
            CatalogKind::FixedExpense => "fixed expense",
            CatalogKind::VariableExpense => "variable expense",
        };
        f.write_str(s)
    }
}

/// Failures raised by the costing engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A product line names a catalog entry the snapshot does not carry.
    /// Snapshot assembly is expected to rule this out.
    #[error("{kind} #{id} referenced by product line is missing from the catalog")]
    InvalidReference { kind: CatalogKind, id: i64 },

    /// A product or line value is outside its accepted range.
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
}

impl EngineError {
    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// A product value large enough to overflow fixed-point arithmetic.
    pub fn overflow(field: &'static str) -> Self {
        EngineError::invalid_input(field, "value is too large to compute")
    }

    /// True when the user can fix the failure by correcting their input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, EngineError::InvalidInput { .. })
    }

    /// Name of the offending field, when there is one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            EngineError::InvalidInput { field, .. } => Some(field),
            EngineError::InvalidReference { .. } => None,
        }
    }
}
