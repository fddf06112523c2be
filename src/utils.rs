// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::Money;
use crate::error::EngineError;
use anyhow::{Context, Result, anyhow};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

/// Values and quantities carry at most 10 integer digits.
pub const MAX_INTEGER_DIGITS: u32 = 10;
const INTEGER_LIMIT: i64 = 10_000_000_000;

/// Largest accepted unit price for ingredients and variable expenses.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 2);

pub const SETTING_DEFAULT_MARGIN: &str = "default_margin";
pub const SETTING_DEFAULT_PERIOD: &str = "default_period";
pub const SETTING_CURRENCY_SYMBOL: &str = "currency_symbol";
pub const KNOWN_SETTINGS: [&str; 3] = [
    SETTING_DEFAULT_MARGIN,
    SETTING_DEFAULT_PERIOD,
    SETTING_CURRENCY_SYMBOL,
];

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

fn parse_with_scale(field: &'static str, s: &str, max_dp: u32) -> Result<Decimal> {
    let d = parse_decimal(s)?.normalize();
    if d.scale() > max_dp {
        return Err(EngineError::invalid_input(
            field,
            format!("'{}' has more than {} decimal places", s.trim(), max_dp),
        )
        .into());
    }
    if d.abs() >= Decimal::from(INTEGER_LIMIT) {
        return Err(EngineError::invalid_input(
            field,
            format!("'{}' has more than {} integer digits", s.trim(), MAX_INTEGER_DIGITS),
        )
        .into());
    }
    Ok(d)
}

/// A currency amount that may be zero but never negative.
pub fn parse_non_negative(field: &'static str, s: &str) -> Result<Decimal> {
    let d = parse_with_scale(field, s, 2)?;
    if d < Decimal::ZERO {
        return Err(EngineError::invalid_input(field, "must not be negative").into());
    }
    Ok(d)
}

/// A per-unit price: non-negative and capped at `MAX_UNIT_PRICE`.
pub fn parse_unit_price(field: &'static str, s: &str) -> Result<Decimal> {
    let d = parse_non_negative(field, s)?;
    if d > MAX_UNIT_PRICE {
        return Err(EngineError::invalid_input(
            field,
            format!("must not exceed {}", MAX_UNIT_PRICE),
        )
        .into());
    }
    Ok(d)
}

pub fn parse_quantity(field: &'static str, s: &str) -> Result<Decimal> {
    let d = parse_with_scale(field, s, 3)?;
    if d <= Decimal::ZERO {
        return Err(EngineError::invalid_input(field, "must be greater than zero").into());
    }
    Ok(d)
}

pub fn parse_count(field: &'static str, s: &str) -> Result<i64> {
    s.trim().parse::<i64>().map_err(|_| {
        EngineError::invalid_input(field, format!("'{}' is not a whole number", s.trim())).into()
    })
}

/// Reads a decimal stored as TEXT, naming the record when it is corrupt.
pub fn stored_decimal(raw: &str, what: &str) -> Result<Decimal> {
    raw.parse::<Decimal>()
        .with_context(|| format!("Invalid stored value '{}' for {}", raw, what))
}

/// Timestamp in the format SQLite's `datetime('now')` produces.
pub fn now_stamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn normalize_unit(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Trimmed value of a required argument.
pub fn required(sub: &clap::ArgMatches, id: &str) -> Result<String> {
    sub.get_one::<String>(id)
        .map(|s| s.trim().to_string())
        .ok_or_else(|| anyhow!("Missing required argument --{}", id))
}

/// Trimmed value of an optional argument; blank counts as absent.
pub fn optional(sub: &clap::ArgMatches, id: &str) -> Option<String> {
    sub.get_one::<String>(id)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Two-decimal rendering with half-up rounding, as reports show money.
pub fn money_str(d: Decimal) -> String {
    Money::new(d).to_string()
}

pub fn fmt_money(d: &Decimal, symbol: &str) -> String {
    format!("{} {}", symbol, money_str(*d))
}

/// Preparation time as "45min", "2h" or "1h 30min".
pub fn fmt_minutes(minutes: i64) -> String {
    if minutes >= 60 {
        let h = minutes / 60;
        let m = minutes % 60;
        if m > 0 {
            format!("{}h {}min", h, m)
        } else {
            format!("{}h", h)
        }
    } else {
        format!("{}min", minutes)
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

fn id_by_name(conn: &Connection, table: &str, label: &str, name: &str) -> Result<i64> {
    let sql = format!("SELECT id FROM {} WHERE name=?1", table);
    let id: Option<i64> = conn
        .query_row(&sql, params![name], |r| r.get(0))
        .optional()?;
    id.ok_or_else(|| anyhow!("{} '{}' not found", label, name))
}

pub fn id_for_ingredient(conn: &Connection, name: &str) -> Result<i64> {
    id_by_name(conn, "ingredients", "Ingredient", name)
}

pub fn id_for_fixed_expense(conn: &Connection, name: &str) -> Result<i64> {
    id_by_name(conn, "fixed_expenses", "Fixed expense", name)
}

pub fn id_for_variable_expense(conn: &Connection, name: &str) -> Result<i64> {
    id_by_name(conn, "variable_expenses", "Variable expense", name)
}

pub fn id_for_product(conn: &Connection, name: &str) -> Result<i64> {
    id_by_name(conn, "products", "Product", name)
}

/// First free name of the form "Copy of X", "Copy of X (2)", ...
pub fn unique_copy_name(conn: &Connection, table: &str, name: &str) -> Result<String> {
    let base = format!("Copy of {}", name);
    let sql = format!("SELECT 1 FROM {} WHERE name=?1", table);
    let mut candidate = base.clone();
    let mut n = 1;
    loop {
        let taken: Option<i64> = conn
            .query_row(&sql, params![candidate], |r| r.get(0))
            .optional()?;
        if taken.is_none() {
            return Ok(candidate);
        }
        n += 1;
        candidate = format!("{} ({})", base, n);
    }
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn default_margin(conn: &Connection) -> Result<Decimal> {
    match get_setting(conn, SETTING_DEFAULT_MARGIN)? {
        Some(s) => stored_decimal(&s, SETTING_DEFAULT_MARGIN),
        None => Ok(Decimal::from(30)),
    }
}

pub fn default_period(conn: &Connection) -> Result<i64> {
    match get_setting(conn, SETTING_DEFAULT_PERIOD)? {
        Some(s) => s
            .parse::<i64>()
            .with_context(|| format!("Invalid stored value '{}' for {}", s, SETTING_DEFAULT_PERIOD)),
        None => Ok(30),
    }
}

pub fn currency_symbol(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, SETTING_CURRENCY_SYMBOL)?.unwrap_or_else(|| "R$".to_string()))
}
