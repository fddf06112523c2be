// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Turns product lines into cost contributions.
//!
//! `resolve` looks each line's reference up in a [`Catalog`] and produces a
//! [`ProductSnapshot`]; the `cost` methods below give each snapshot line's
//! contribution to its bucket.

use super::money::{Money, Percent, Quantity};
use super::proration;
use super::snapshot::{FixedExpenseLine, IngredientLine, ProductSnapshot, VariableExpenseLine};
use crate::error::{CatalogKind, EngineError};
use crate::models::{FixedExpense, Ingredient, Product, VariableExpense};
use std::collections::HashMap;

/// Catalog entries a product may reference, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    ingredients: HashMap<i64, Ingredient>,
    fixed_expenses: HashMap<i64, FixedExpense>,
    variable_expenses: HashMap<i64, VariableExpense>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_ingredient(&mut self, ingredient: Ingredient) {
        self.ingredients.insert(ingredient.id, ingredient);
    }

    pub fn add_fixed_expense(&mut self, expense: FixedExpense) {
        self.fixed_expenses.insert(expense.id, expense);
    }

    pub fn add_variable_expense(&mut self, expense: VariableExpense) {
        self.variable_expenses.insert(expense.id, expense);
    }

    pub fn len(&self) -> usize {
        self.ingredients.len() + self.fixed_expenses.len() + self.variable_expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds the snapshot the engine prices, keeping the product's line order.
pub fn resolve(product: &Product, catalog: &Catalog) -> Result<ProductSnapshot, EngineError> {
    let mut ingredient_lines = Vec::with_capacity(product.ingredients.len());
    for line in &product.ingredients {
        let ing = catalog
            .ingredients
            .get(&line.ingredient_id)
            .ok_or(EngineError::InvalidReference {
                kind: CatalogKind::Ingredient,
                id: line.ingredient_id,
            })?;
        ingredient_lines.push(IngredientLine {
            name: ing.name.clone(),
            unit: ing.unit.clone(),
            quantity: Quantity::new(line.quantity),
            price_per_unit: Money::new(ing.price_per_unit),
        });
    }

    let mut fixed_expense_lines = Vec::with_capacity(product.fixed_expenses.len());
    for line in &product.fixed_expenses {
        let exp = catalog
            .fixed_expenses
            .get(&line.fixed_expense_id)
            .ok_or(EngineError::InvalidReference {
                kind: CatalogKind::FixedExpense,
                id: line.fixed_expense_id,
            })?;
        fixed_expense_lines.push(FixedExpenseLine {
            name: exp.name.clone(),
            monthly_value: Money::new(exp.monthly_value),
        });
    }

    let mut variable_expense_lines = Vec::with_capacity(product.variable_expenses.len());
    for line in &product.variable_expenses {
        let exp = catalog
            .variable_expenses
            .get(&line.variable_expense_id)
            .ok_or(EngineError::InvalidReference {
                kind: CatalogKind::VariableExpense,
                id: line.variable_expense_id,
            })?;
        variable_expense_lines.push(VariableExpenseLine {
            name: exp.name.clone(),
            unit: exp.unit.clone(),
            quantity: Quantity::new(line.quantity),
            value_per_unit: Money::new(exp.value_per_unit),
        });
    }

    Ok(ProductSnapshot {
        product_id: product.id,
        name: product.name.clone(),
        preparation_minutes: product.preparation_minutes,
        margin_percent: Percent::new(product.margin_percent),
        analysis_period_days: product.analysis_period_days,
        ingredient_lines,
        fixed_expense_lines,
        variable_expense_lines,
    })
}

impl IngredientLine {
    pub fn cost(&self) -> Result<Money, EngineError> {
        self.price_per_unit
            .checked_times(self.quantity)
            .ok_or(EngineError::overflow("ingredientLines.quantity"))
    }
}

impl VariableExpenseLine {
    pub fn cost(&self) -> Result<Money, EngineError> {
        self.value_per_unit
            .checked_times(self.quantity)
            .ok_or(EngineError::overflow("variableExpenseLines.quantity"))
    }
}

impl FixedExpenseLine {
    /// Fixed expenses carry no quantity; their cost depends on the period.
    pub fn cost(&self, period_days: i64) -> Result<Money, EngineError> {
        proration::prorate(self.monthly_value, period_days)
    }
}
