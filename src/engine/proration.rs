// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Attribution of monthly fixed expenses to an analysis period.
//!
//! A month is always 30 days here, whatever the calendar says.

use super::money::Money;
use crate::error::EngineError;
use rust_decimal::Decimal;

pub const DAYS_PER_MONTH: u32 = 30;

/// Monthly value spread over a 30-day month. Not rounded.
pub fn daily_cost(monthly_value: Money) -> Money {
    Money::new(monthly_value.amount() / Decimal::from(DAYS_PER_MONTH))
}

/// Share of `monthly_value` attributable to `period_days` days.
///
/// The result keeps full precision; callers round once, after summing.
pub fn prorate(monthly_value: Money, period_days: i64) -> Result<Money, EngineError> {
    if period_days <= 0 {
        return Err(EngineError::invalid_input(
            "analysisPeriodDays",
            format!("must be greater than zero, got {}", period_days),
        ));
    }
    if monthly_value.is_zero() {
        return Ok(Money::zero());
    }
    daily_cost(monthly_value)
        .checked_scale(Decimal::from(period_days))
        .ok_or(EngineError::overflow("fixedExpenseLines.monthlyValue"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn full_month_returns_monthly_value() {
        let m = Money::new(dec!(150.00));
        assert_eq!(prorate(m, 30).unwrap().amount(), dec!(150));
    }

    #[test]
    fn half_month() {
        let m = Money::new(dec!(150.00));
        assert_eq!(prorate(m, 15).unwrap().amount(), dec!(75));
    }

    #[test]
    fn linear_in_period() {
        let m = Money::new(dec!(1234.56));
        for period in [1_i64, 7, 10, 29, 31, 90, 365] {
            let expected = dec!(41.152) * Decimal::from(period);
            assert_eq!(prorate(m, period).unwrap().amount(), expected);
        }
    }

    #[test]
    fn awkward_monthly_value_rounds_back_after_a_full_month() {
        let m = Money::new(dec!(100.00));
        let p = prorate(m, 30).unwrap();
        assert_eq!(p.rounded().amount(), dec!(100.00));
        assert_eq!(prorate(m, 7).unwrap().rounded().amount(), dec!(23.33));
    }

    #[test]
    fn zero_monthly_value_is_zero() {
        assert!(prorate(Money::zero(), 45).unwrap().is_zero());
    }

    #[test]
    fn zero_period_is_rejected() {
        let err = prorate(Money::new(dec!(10)), 0).unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(err.field(), Some("analysisPeriodDays"));
    }
}
