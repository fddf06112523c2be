// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub price_per_unit: Decimal,
    pub unit: String, // lower-cased on write
    pub supplier: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedExpense {
    pub id: i64,
    pub name: String,
    pub monthly_value: Decimal,
    pub description: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableExpense {
    pub id: i64,
    pub name: String,
    pub value_per_unit: Decimal,
    pub unit: String,
    pub description: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductIngredient {
    pub ingredient_id: i64,
    pub quantity: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductFixedExpense {
    pub fixed_expense_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariableExpense {
    pub variable_expense_id: i64,
    pub quantity: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub preparation_minutes: i64,
    pub margin_percent: Decimal, // percentage points, 0-1000
    pub analysis_period_days: i64,
    pub ingredients: Vec<ProductIngredient>,
    pub fixed_expenses: Vec<ProductFixedExpense>,
    pub variable_expenses: Vec<ProductVariableExpense>,
}
