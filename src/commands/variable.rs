// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::EngineError;
use crate::models::VariableExpense;
use crate::utils::{
    currency_symbol, fmt_money, id_for_variable_expense, maybe_print_json, money_str, normalize_unit,
    now_stamp, optional, parse_unit_price, pretty_table, required, stored_decimal,
};
use anyhow::Result;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => {
            let mut items = all(conn)?;
            if sub.get_flag("active") {
                items.retain(|e| e.active);
            }
            print_list(conn, sub, &items)?;
        }
        Some(("update", sub)) => update(conn, sub)?,
        Some(("rm", sub)) => {
            let name = required(sub, "name")?;
            let id = id_for_variable_expense(conn, &name)?;
            conn.execute("DELETE FROM variable_expenses WHERE id=?1", params![id])?;
            info!(id, name = %name, "variable expense removed");
            println!("Removed variable expense '{}'", name);
        }
        Some(("toggle", sub)) => {
            let name = required(sub, "name")?;
            let active = toggle(conn, &name)?;
            println!(
                "Variable expense '{}' is now {}",
                name,
                if active { "active" } else { "inactive" }
            );
        }
        Some(("by-unit", sub)) => {
            let unit = normalize_unit(&required(sub, "unit")?);
            let items: Vec<VariableExpense> =
                all(conn)?.into_iter().filter(|e| e.unit == unit).collect();
            print_list(conn, sub, &items)?;
        }
        Some(("stats", sub)) => stats(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = required(sub, "name")?;
    if name.is_empty() {
        return Err(EngineError::invalid_input("name", "must not be empty").into());
    }
    let value = parse_unit_price("valuePerUnit", &required(sub, "value")?)?;
    let unit = normalize_unit(&required(sub, "unit")?);
    if unit.is_empty() {
        return Err(EngineError::invalid_input("unit", "must not be empty").into());
    }
    let description = optional(sub, "description");
    let active = !sub.get_flag("inactive");
    conn.execute(
        "INSERT INTO variable_expenses(name, value_per_unit, unit, description, active)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![name, value.to_string(), unit, description, active],
    )?;
    info!(name = %name, value = %value, active, "variable expense added");
    println!("Added variable expense '{}' ({} per {})", name, value, unit);
    Ok(())
}

fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = required(sub, "name")?;
    let id = id_for_variable_expense(conn, &name)?;
    let tx = conn.unchecked_transaction()?;
    if let Some(v) = optional(sub, "value") {
        let value = parse_unit_price("valuePerUnit", &v)?;
        tx.execute(
            "UPDATE variable_expenses SET value_per_unit=?1 WHERE id=?2",
            params![value.to_string(), id],
        )?;
    }
    if let Some(u) = optional(sub, "unit") {
        tx.execute(
            "UPDATE variable_expenses SET unit=?1 WHERE id=?2",
            params![normalize_unit(&u), id],
        )?;
    }
    if let Some(d) = optional(sub, "description") {
        tx.execute(
            "UPDATE variable_expenses SET description=?1 WHERE id=?2",
            params![d, id],
        )?;
    }
    let mut shown = name;
    if let Some(new_name) = optional(sub, "rename") {
        tx.execute(
            "UPDATE variable_expenses SET name=?1 WHERE id=?2",
            params![new_name, id],
        )?;
        shown = new_name;
    }
    tx.execute(
        "UPDATE variable_expenses SET updated_at=?1 WHERE id=?2",
        params![now_stamp(), id],
    )?;
    tx.commit()?;
    info!(id, name = %shown, "variable expense updated");
    println!("Updated variable expense '{}'", shown);
    Ok(())
}

/// Every variable expense, ordered by name.
pub fn all(conn: &Connection) -> Result<Vec<VariableExpense>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, value_per_unit, unit, description, active
         FROM variable_expenses ORDER BY name, id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, Option<String>>(4)?,
            r.get::<_, bool>(5)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, name, value, unit, description, active) = row?;
        let value_per_unit = stored_decimal(&value, &format!("variable expense '{}'", name))?;
        out.push(VariableExpense {
            id,
            name,
            value_per_unit,
            unit,
            description,
            active,
        });
    }
    Ok(out)
}

/// Flips the active flag and returns the new state.
pub fn toggle(conn: &Connection, name: &str) -> Result<bool> {
    let id = id_for_variable_expense(conn, name)?;
    conn.execute(
        "UPDATE variable_expenses SET active = 1 - active, updated_at=?1 WHERE id=?2",
        params![now_stamp(), id],
    )?;
    let active: bool = conn.query_row(
        "SELECT active FROM variable_expenses WHERE id=?1",
        params![id],
        |r| r.get(0),
    )?;
    info!(id, active, "variable expense toggled");
    Ok(active)
}

fn print_list(conn: &Connection, sub: &clap::ArgMatches, items: &[VariableExpense]) -> Result<()> {
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        return Ok(());
    }
    let symbol = currency_symbol(conn)?;
    let data = items
        .iter()
        .map(|e| {
            vec![
                e.name.clone(),
                fmt_money(&e.value_per_unit, &symbol),
                e.unit.clone(),
                if e.active { "yes" } else { "no" }.to_string(),
                e.description.clone().unwrap_or_default(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Name", "Value/Unit", "Unit", "Active", "Description"], data)
    );
    Ok(())
}

fn stats(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let items = all(conn)?;
    let active = items.iter().filter(|e| e.active).count();
    let values: Vec<Decimal> = items.iter().map(|e| e.value_per_unit).collect();
    let sum: Decimal = values.iter().sum();
    let average = if values.is_empty() {
        Decimal::ZERO
    } else {
        sum / Decimal::from(values.len())
    };
    let min = values.iter().min().copied().unwrap_or_default();
    let max = values.iter().max().copied().unwrap_or_default();
    let mut units: Vec<&str> = items.iter().map(|e| e.unit.as_str()).collect();
    units.sort_unstable();
    units.dedup();

    let v = json!({
        "count": items.len(),
        "active": active,
        "inactive": items.len() - active,
        "averageValue": money_str(average),
        "minValue": money_str(min),
        "maxValue": money_str(max),
        "units": units,
    });
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &v)? {
        return Ok(());
    }
    let symbol = currency_symbol(conn)?;
    let rows = vec![
        vec!["Variable expenses".into(), items.len().to_string()],
        vec!["Active".into(), active.to_string()],
        vec!["Inactive".into(), (items.len() - active).to_string()],
        vec!["Average value".into(), fmt_money(&average, &symbol)],
        vec!["Lowest value".into(), fmt_money(&min, &symbol)],
        vec!["Highest value".into(), fmt_money(&max, &symbol)],
        vec!["Units".into(), units.join(", ")],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], rows));
    Ok(())
}
