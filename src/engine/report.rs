// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::aggregate::{self, CostBuckets};
use super::money::{Money, Percent, Quantity};
use super::pricing::{self, Pricing, Projection};
use super::snapshot::ProductSnapshot;
use crate::error::EngineError;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingReport {
    pub product_id: i64,
    pub name: String,
    pub analysis_period_days: i64,
    pub margin_percent: Percent,
    pub costs: CostBreakdown,
    pub pricing: Pricing,
    pub projection: Projection,
    pub line_detail: LineDetail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub ingredients: Money,
    pub fixed: Money,
    pub variable: Money,
    pub total: Money,
    pub ingredients_percent: Percent,
    pub fixed_percent: Percent,
    pub variable_percent: Percent,
}

impl From<CostBuckets> for CostBreakdown {
    fn from(b: CostBuckets) -> Self {
        CostBreakdown {
            ingredients: b.ingredients,
            fixed: b.fixed,
            variable: b.variable,
            total: b.total,
            ingredients_percent: Percent::ratio(b.ingredients, b.total),
            fixed_percent: Percent::ratio(b.fixed, b.total),
            variable_percent: Percent::ratio(b.variable, b.total),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineDetail {
    pub ingredients: Vec<UnitLineDetail>,
    pub fixed_expenses: Vec<FixedLineDetail>,
    pub variable_expenses: Vec<UnitLineDetail>,
}

/// An ingredient or variable expense line: priced per unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitLineDetail {
    pub name: String,
    pub quantity: Quantity,
    pub unit: String,
    pub unit_price: Money,
    pub line_cost: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedLineDetail {
    pub name: String,
    pub monthly_value: Money,
    pub prorated_cost: Money,
}

/// Prices one product snapshot.
///
/// Input is validated before any arithmetic. The result depends only on the
/// snapshot, so equal snapshots always produce equal reports.
pub fn build(snapshot: &ProductSnapshot) -> Result<PricingReport, EngineError> {
    snapshot.validate()?;

    let agg = aggregate::aggregate(snapshot)?;
    let cost_total = agg.buckets.total;
    let pricing = pricing::price(cost_total, snapshot.margin_percent)?;
    let projection = pricing::project(cost_total, &pricing, snapshot.analysis_period_days)?;

    if cost_total.is_zero() {
        debug!(
            product = snapshot.product_id,
            "no recorded costs; suggested price is zero"
        );
    }

    let ingredients = snapshot
        .ingredient_lines
        .iter()
        .zip(&agg.ingredient_costs)
        .map(|(l, c)| UnitLineDetail {
            name: l.name.clone(),
            quantity: l.quantity,
            unit: l.unit.clone(),
            unit_price: l.price_per_unit,
            line_cost: *c,
        })
        .collect();
    let fixed_expenses = snapshot
        .fixed_expense_lines
        .iter()
        .zip(&agg.fixed_costs)
        .map(|(l, c)| FixedLineDetail {
            name: l.name.clone(),
            monthly_value: l.monthly_value,
            prorated_cost: *c,
        })
        .collect();
    let variable_expenses = snapshot
        .variable_expense_lines
        .iter()
        .zip(&agg.variable_costs)
        .map(|(l, c)| UnitLineDetail {
            name: l.name.clone(),
            quantity: l.quantity,
            unit: l.unit.clone(),
            unit_price: l.value_per_unit,
            line_cost: *c,
        })
        .collect();

    Ok(PricingReport {
        product_id: snapshot.product_id,
        name: snapshot.name.clone(),
        analysis_period_days: snapshot.analysis_period_days,
        margin_percent: snapshot.margin_percent,
        costs: agg.buckets.into(),
        pricing,
        projection,
        line_detail: LineDetail {
            ingredients,
            fixed_expenses,
            variable_expenses,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::snapshot::{FixedExpenseLine, IngredientLine, VariableExpenseLine};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn scenario(period: i64, margin: Decimal) -> ProductSnapshot {
        ProductSnapshot {
            product_id: 42,
            name: "Bolo de pote".into(),
            preparation_minutes: 45,
            margin_percent: Percent::new(margin),
            analysis_period_days: period,
            ingredient_lines: vec![IngredientLine {
                name: "Chocolate".into(),
                unit: "kg".into(),
                quantity: Quantity::new(dec!(0.25)),
                price_per_unit: Money::new(dec!(40.00)),
            }],
            fixed_expense_lines: vec![FixedExpenseLine {
                name: "Rent".into(),
                monthly_value: Money::new(dec!(150.00)),
            }],
            variable_expense_lines: vec![VariableExpenseLine {
                name: "Jar".into(),
                unit: "piece".into(),
                quantity: Quantity::new(dec!(1)),
                value_per_unit: Money::new(dec!(5.00)),
            }],
        }
    }

    fn empty(margin: Decimal) -> ProductSnapshot {
        let mut s = scenario(30, margin);
        s.ingredient_lines.clear();
        s.fixed_expense_lines.clear();
        s.variable_expense_lines.clear();
        s
    }

    #[test]
    fn full_month_at_fifty_percent() {
        let r = build(&scenario(30, dec!(50))).unwrap();
        assert_eq!(r.costs.total.amount(), dec!(165.00));
        assert_eq!(r.pricing.suggested_price.amount(), dec!(247.50));
        assert_eq!(r.line_detail.fixed_expenses[0].prorated_cost.amount(), dec!(150));
    }

    #[test]
    fn half_month_prorates_fixed_costs() {
        let r = build(&scenario(15, dec!(50))).unwrap();
        assert_eq!(r.costs.fixed.amount(), dec!(75.00));
        assert_eq!(r.costs.total.amount(), dec!(90.00));
        assert_eq!(r.projection.assumed_quantity, 15);
    }

    #[test]
    fn zero_cost_for_any_margin() {
        for m in [dec!(0), dec!(50), dec!(1000)] {
            let r = build(&empty(m)).unwrap();
            assert!(r.costs.total.is_zero());
            assert!(r.pricing.suggested_price.is_zero());
            assert!(r.pricing.margin_value.is_zero());
            assert_eq!(r.projection.roi_percent, Percent::zero());
            assert_eq!(r.costs.ingredients_percent, Percent::zero());
        }
    }

    #[test]
    fn cost_shares_add_up() {
        let r = build(&scenario(30, dec!(50))).unwrap();
        let c = r.costs;
        assert_eq!(c.total, c.ingredients + c.fixed + c.variable);
        let shares = c.ingredients_percent.points() + c.fixed_percent.points() + c.variable_percent.points();
        assert_eq!(shares.round_dp(6), dec!(100));
    }

    #[test]
    fn invalid_period_is_rejected_before_computing() {
        let err = build(&scenario(0, dec!(50))).unwrap_err();
        assert_eq!(err.field(), Some("analysisPeriodDays"));
    }

    #[test]
    fn identical_snapshots_give_identical_reports() {
        let s = scenario(21, dec!(37.5));
        assert_eq!(build(&s).unwrap(), build(&s.clone()).unwrap());
    }

    #[test]
    fn serializes_fixed_point_strings() {
        let r = build(&scenario(30, dec!(50))).unwrap();
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["costs"]["total"], json!("165.00"));
        assert_eq!(v["pricing"]["suggestedPrice"], json!("247.50"));
        assert_eq!(v["projection"]["roiPercent"], json!("50.00"));
        assert_eq!(
            v["lineDetail"]["ingredients"][0],
            json!({
                "name": "Chocolate",
                "quantity": "0.250",
                "unit": "kg",
                "unitPrice": "40.00",
                "lineCost": "10.00"
            })
        );
        assert_eq!(v["lineDetail"]["fixedExpenses"][0]["proratedCost"], json!("150.00"));
    }
}
