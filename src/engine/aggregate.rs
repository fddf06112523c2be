// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::money::Money;
use super::snapshot::ProductSnapshot;
use crate::error::EngineError;
use tracing::debug;

/// Per-unit production cost split by origin.
///
/// Each bucket is rounded once to currency precision; `total` is the exact
/// sum of the three rounded buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostBuckets {
    pub ingredients: Money,
    pub fixed: Money,
    pub variable: Money,
    pub total: Money,
}

/// Bucket totals plus each line's unrounded contribution, in snapshot order.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub buckets: CostBuckets,
    pub ingredient_costs: Vec<Money>,
    pub fixed_costs: Vec<Money>,
    pub variable_costs: Vec<Money>,
}

fn bucket(costs: &[Money], field: &'static str) -> Result<Money, EngineError> {
    costs
        .iter()
        .try_fold(Money::zero(), |acc, c| acc.checked_add(*c))
        .map(|m| m.rounded())
        .ok_or(EngineError::overflow(field))
}

pub fn aggregate(snapshot: &ProductSnapshot) -> Result<Aggregate, EngineError> {
    let ingredient_costs = snapshot
        .ingredient_lines
        .iter()
        .map(|l| l.cost())
        .collect::<Result<Vec<Money>, EngineError>>()?;

    let fixed_costs = snapshot
        .fixed_expense_lines
        .iter()
        .map(|l| l.cost(snapshot.analysis_period_days))
        .collect::<Result<Vec<Money>, EngineError>>()?;

    let variable_costs = snapshot
        .variable_expense_lines
        .iter()
        .map(|l| l.cost())
        .collect::<Result<Vec<Money>, EngineError>>()?;

    let ingredients = bucket(&ingredient_costs, "ingredientLines")?;
    let fixed = bucket(&fixed_costs, "fixedExpenseLines")?;
    let variable = bucket(&variable_costs, "variableExpenseLines")?;
    let total = bucket(&[ingredients, fixed, variable], "costTotal")?;

    debug!(
        product = snapshot.product_id,
        %ingredients, %fixed, %variable, %total,
        "aggregated production cost"
    );

    Ok(Aggregate {
        buckets: CostBuckets {
            ingredients,
            fixed,
            variable,
            total,
        },
        ingredient_costs,
        fixed_costs,
        variable_costs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::money::{Percent, Quantity};
    use crate::engine::snapshot::{FixedExpenseLine, IngredientLine, VariableExpenseLine};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn snapshot(period: i64) -> ProductSnapshot {
        ProductSnapshot {
            product_id: 1,
            name: "Pão de mel".into(),
            preparation_minutes: 60,
            margin_percent: Percent::new(dec!(50)),
            analysis_period_days: period,
            ingredient_lines: vec![
                IngredientLine {
                    name: "Honey".into(),
                    unit: "kg".into(),
                    quantity: Quantity::new(dec!(0.2)),
                    price_per_unit: Money::new(dec!(30.00)),
                },
                IngredientLine {
                    name: "Flour".into(),
                    unit: "kg".into(),
                    quantity: Quantity::new(dec!(0.5)),
                    price_per_unit: Money::new(dec!(8.00)),
                },
            ],
            fixed_expense_lines: vec![FixedExpenseLine {
                name: "Rent".into(),
                monthly_value: Money::new(dec!(150.00)),
            }],
            variable_expense_lines: vec![VariableExpenseLine {
                name: "Box".into(),
                unit: "piece".into(),
                quantity: Quantity::new(dec!(2)),
                value_per_unit: Money::new(dec!(2.50)),
            }],
        }
    }

    #[test]
    fn sums_each_bucket() {
        let agg = aggregate(&snapshot(30)).unwrap();
        assert_eq!(agg.buckets.ingredients.amount(), dec!(10.00));
        assert_eq!(agg.buckets.fixed.amount(), dec!(150.00));
        assert_eq!(agg.buckets.variable.amount(), dec!(5.00));
        assert_eq!(agg.buckets.total.amount(), dec!(165.00));
        assert_eq!(agg.ingredient_costs.len(), 2);
    }

    #[test]
    fn fixed_bucket_follows_period() {
        let agg = aggregate(&snapshot(15)).unwrap();
        assert_eq!(agg.buckets.fixed.amount(), dec!(75.00));
        assert_eq!(agg.buckets.total.amount(), dec!(90.00));
    }

    #[test]
    fn empty_collections_contribute_zero() {
        let mut s = snapshot(30);
        s.ingredient_lines.clear();
        s.fixed_expense_lines.clear();
        s.variable_expense_lines.clear();
        let agg = aggregate(&s).unwrap();
        assert!(agg.buckets.total.is_zero());
    }

    #[test]
    fn rounds_bucket_once_not_per_line() {
        let mut s = snapshot(30);
        s.ingredient_lines = (0..3)
            .map(|i| IngredientLine {
                name: format!("Spice {}", i),
                unit: "g".into(),
                quantity: Quantity::new(dec!(1)),
                price_per_unit: Money::new(dec!(0.004)),
            })
            .collect();
        let agg = aggregate(&s).unwrap();
        // per-line rounding would give 0.00; the bucket sees 0.012
        assert_eq!(agg.buckets.ingredients.amount(), dec!(0.01));
    }

    #[test]
    fn additivity_is_exact() {
        let mut s = snapshot(7);
        s.fixed_expense_lines.push(FixedExpenseLine {
            name: "Internet".into(),
            monthly_value: Money::new(dec!(99.90)),
        });
        let b = aggregate(&s).unwrap().buckets;
        assert_eq!(b.total, b.ingredients + b.fixed + b.variable);
    }

    #[test]
    fn overflowing_lines_are_an_input_error() {
        let mut s = snapshot(30);
        s.ingredient_lines[0].price_per_unit = Money::new(Decimal::MAX);
        s.ingredient_lines[1].price_per_unit = Money::new(Decimal::MAX);
        s.ingredient_lines[0].quantity = Quantity::new(dec!(1));
        s.ingredient_lines[1].quantity = Quantity::new(dec!(1));
        let err = aggregate(&s).unwrap_err();
        assert_eq!(err.field(), Some("ingredientLines"));

        s.ingredient_lines[0].quantity = Quantity::new(dec!(2));
        let err = aggregate(&s).unwrap_err();
        assert_eq!(err.field(), Some("ingredientLines.quantity"));
    }
}
