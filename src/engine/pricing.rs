// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Suggested sale price and period projection.
//!
//! Projections assume one unit produced and sold per day of the analysis
//! period. There is no production-rate input.

use super::money::{Money, Percent};
use crate::error::EngineError;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub suggested_price: Money,
    pub margin_percent: Percent,
    pub margin_value: Money,
    /// Sale price as a percentage of cost.
    pub markup_percent: Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub assumed_quantity: i64,
    pub revenue: Money,
    pub total_cost: Money,
    pub profit: Money,
    pub roi_percent: Percent,
}

/// Applies `margin` on top of `cost_total`. A zero cost yields a zero price.
pub fn price(cost_total: Money, margin: Percent) -> Result<Pricing, EngineError> {
    let suggested_price = cost_total
        .checked_scale(Decimal::ONE + margin.fraction())
        .ok_or(EngineError::overflow("marginPercent"))?;
    Ok(Pricing {
        suggested_price,
        margin_percent: margin,
        margin_value: suggested_price - cost_total,
        markup_percent: Percent::ratio(suggested_price, cost_total),
    })
}

pub fn project(
    cost_total: Money,
    pricing: &Pricing,
    period_days: i64,
) -> Result<Projection, EngineError> {
    let qty = Decimal::from(period_days);
    let overflow = || EngineError::overflow("analysisPeriodDays");
    let revenue = pricing.suggested_price.checked_scale(qty).ok_or_else(overflow)?;
    let total_cost = cost_total.checked_scale(qty).ok_or_else(overflow)?;
    let profit = revenue - total_cost;
    Ok(Projection {
        assumed_quantity: period_days,
        revenue,
        total_cost,
        profit,
        roi_percent: Percent::ratio(profit, total_cost),
    })
}
