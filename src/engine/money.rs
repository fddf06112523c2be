// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Fixed-point value types shared by every cost figure.
//!
//! Values are carried at full `Decimal` precision through the whole
//! calculation. Rounding to currency (2 places) or quantity (3 places)
//! precision happens in exactly two spots: when an aggregated cost bucket is
//! closed, and when a value is rendered for display or serialization.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Sub};

/// Fractional digits for currency amounts.
pub const CURRENCY_DP: u32 = 2;
/// Fractional digits for physical quantities.
pub const QUANTITY_DP: u32 = 3;

fn half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// A currency amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub const fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Rounds to currency precision, half away from zero (0.005 -> 0.01).
    pub fn rounded(&self) -> Self {
        Money(half_up(self.0, CURRENCY_DP))
    }

    /// Scales the amount by a plain factor (a day count, a rate). `None` on
    /// overflow.
    pub fn checked_scale(&self, factor: Decimal) -> Option<Self> {
        self.0.checked_mul(factor).map(Money)
    }

    /// Amount times a line quantity. `None` on overflow.
    pub fn checked_times(&self, qty: Quantity) -> Option<Self> {
        self.checked_scale(qty.0)
    }

    pub fn checked_add(&self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money(d)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.rounded().0)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// A physical quantity of an ingredient or a variable expense unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
#[serde(transparent)]
pub struct Quantity(Decimal);

impl Quantity {
    pub const fn new(value: Decimal) -> Self {
        Quantity(value)
    }

    pub const fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl From<Decimal> for Quantity {
    fn from(d: Decimal) -> Self {
        Quantity(d)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", half_up(self.0, QUANTITY_DP))
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A percentage expressed in points (`50` means 50%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
#[serde(transparent)]
pub struct Percent(Decimal);

impl Percent {
    pub const fn new(points: Decimal) -> Self {
        Percent(points)
    }

    pub const fn zero() -> Self {
        Percent(Decimal::ZERO)
    }

    pub const fn points(&self) -> Decimal {
        self.0
    }

    /// Points as a plain fraction (`50` -> `0.5`).
    pub fn fraction(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    /// `part / whole * 100`, or zero when `whole` is not positive.
    pub fn ratio(part: Money, whole: Money) -> Self {
        if !whole.is_positive() {
            return Percent::zero();
        }
        match part.amount().checked_div(whole.amount()) {
            Some(r) => Percent(r * Decimal::ONE_HUNDRED),
            None => Percent::zero(),
        }
    }
}

impl From<Decimal> for Percent {
    fn from(d: Decimal) -> Self {
        Percent(d)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", half_up(self.0, CURRENCY_DP))
    }
}

impl Serialize for Percent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
