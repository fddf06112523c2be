// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::money::{Money, Percent, Quantity};
use crate::error::EngineError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Highest accepted margin, in percentage points.
pub const MAX_MARGIN_PERCENT: Decimal = Decimal::ONE_THOUSAND;

/// Upper bound for day and minute counts, the range of a 32-bit column.
pub const MAX_COUNT: i64 = i32::MAX as i64;

/// Everything the engine needs to price one product, already resolved
/// against the catalog and scoped to a single owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub product_id: i64,
    pub name: String,
    pub preparation_minutes: i64,
    pub margin_percent: Percent,
    pub analysis_period_days: i64,
    #[serde(default)]
    pub ingredient_lines: Vec<IngredientLine>,
    #[serde(default)]
    pub fixed_expense_lines: Vec<FixedExpenseLine>,
    #[serde(default)]
    pub variable_expense_lines: Vec<VariableExpenseLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientLine {
    pub name: String,
    pub unit: String,
    pub quantity: Quantity,
    pub price_per_unit: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedExpenseLine {
    pub name: String,
    pub monthly_value: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableExpenseLine {
    pub name: String,
    pub unit: String,
    pub quantity: Quantity,
    pub value_per_unit: Money,
}

/// Checks the product-level terms shared by snapshots and product records.
pub fn validate_terms(
    preparation_minutes: i64,
    margin: Percent,
    analysis_period_days: i64,
) -> Result<(), EngineError> {
    if analysis_period_days <= 0 {
        return Err(EngineError::invalid_input(
            "analysisPeriodDays",
            format!("must be greater than zero, got {}", analysis_period_days),
        ));
    }
    if analysis_period_days > MAX_COUNT {
        return Err(EngineError::invalid_input(
            "analysisPeriodDays",
            format!("must not exceed {}, got {}", MAX_COUNT, analysis_period_days),
        ));
    }
    if preparation_minutes <= 0 || preparation_minutes > MAX_COUNT {
        return Err(EngineError::invalid_input(
            "preparationMinutes",
            format!("must be between 1 and {}, got {}", MAX_COUNT, preparation_minutes),
        ));
    }
    let m = margin.points();
    if m < Decimal::ZERO || m > MAX_MARGIN_PERCENT {
        return Err(EngineError::invalid_input(
            "marginPercent",
            format!("must be between 0 and {}, got {}", MAX_MARGIN_PERCENT, m),
        ));
    }
    Ok(())
}

impl ProductSnapshot {
    /// Rejects any value the calculation cannot accept. Runs before any
    /// arithmetic so a failed snapshot never yields a partial report.
    pub fn validate(&self) -> Result<(), EngineError> {
        validate_terms(
            self.preparation_minutes,
            self.margin_percent,
            self.analysis_period_days,
        )?;
        for line in &self.ingredient_lines {
            if !line.quantity.is_positive() {
                return Err(EngineError::invalid_input(
                    "ingredientLines.quantity",
                    format!("'{}' must have a quantity greater than zero", line.name),
                ));
            }
            if line.price_per_unit.is_negative() {
                return Err(EngineError::invalid_input(
                    "ingredientLines.pricePerUnit",
                    format!("'{}' has a negative price", line.name),
                ));
            }
        }
        for line in &self.fixed_expense_lines {
            if line.monthly_value.is_negative() {
                return Err(EngineError::invalid_input(
                    "fixedExpenseLines.monthlyValue",
                    format!("'{}' has a negative monthly value", line.name),
                ));
            }
        }
        for line in &self.variable_expense_lines {
            if !line.quantity.is_positive() {
                return Err(EngineError::invalid_input(
                    "variableExpenseLines.quantity",
                    format!("'{}' must have a quantity greater than zero", line.name),
                ));
            }
            if line.value_per_unit.is_negative() {
                return Err(EngineError::invalid_input(
                    "variableExpenseLines.valuePerUnit",
                    format!("'{}' has a negative value per unit", line.name),
                ));
            }
        }
        Ok(())
    }
}
