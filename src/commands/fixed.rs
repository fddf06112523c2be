// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::EngineError;
use crate::models::FixedExpense;
use crate::utils::{
    currency_symbol, fmt_money, id_for_fixed_expense, maybe_print_json, money_str, now_stamp, optional,
    parse_non_negative, pretty_table, required, stored_decimal,
};
use anyhow::Result;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = required(sub, "name")?;
            if name.is_empty() {
                return Err(EngineError::invalid_input("name", "must not be empty").into());
            }
            let value = parse_non_negative("monthlyValue", &required(sub, "value")?)?;
            let description = optional(sub, "description");
            let active = !sub.get_flag("inactive");
            conn.execute(
                "INSERT INTO fixed_expenses(name, monthly_value, description, active) VALUES (?1, ?2, ?3, ?4)",
                params![name, value.to_string(), description, active],
            )?;
            info!(name = %name, monthly = %value, active, "fixed expense added");
            println!("Added fixed expense '{}' ({} per month)", name, value);
        }
        Some(("list", sub)) => {
            let mut items = all(conn)?;
            if sub.get_flag("active") {
                items.retain(|e| e.active);
            }
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
                let symbol = currency_symbol(conn)?;
                let data = items
                    .iter()
                    .map(|e| {
                        vec![
                            e.name.clone(),
                            fmt_money(&e.monthly_value, &symbol),
                            if e.active { "yes" } else { "no" }.to_string(),
                            e.description.clone().unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Name", "Monthly", "Active", "Description"], data)
                );
            }
        }
        Some(("update", sub)) => {
            let name = required(sub, "name")?;
            let id = id_for_fixed_expense(conn, &name)?;
            let tx = conn.unchecked_transaction()?;
            if let Some(v) = optional(sub, "value") {
                let value = parse_non_negative("monthlyValue", &v)?;
                tx.execute(
                    "UPDATE fixed_expenses SET monthly_value=?1 WHERE id=?2",
                    params![value.to_string(), id],
                )?;
            }
            if let Some(d) = optional(sub, "description") {
                tx.execute(
                    "UPDATE fixed_expenses SET description=?1 WHERE id=?2",
                    params![d, id],
                )?;
            }
            let mut shown = name;
            if let Some(new_name) = optional(sub, "rename") {
                tx.execute(
                    "UPDATE fixed_expenses SET name=?1 WHERE id=?2",
                    params![new_name, id],
                )?;
                shown = new_name;
            }
            tx.execute(
                "UPDATE fixed_expenses SET updated_at=?1 WHERE id=?2",
                params![now_stamp(), id],
            )?;
            tx.commit()?;
            info!(id, name = %shown, "fixed expense updated");
            println!("Updated fixed expense '{}'", shown);
        }
        Some(("rm", sub)) => {
            let name = required(sub, "name")?;
            let id = id_for_fixed_expense(conn, &name)?;
            conn.execute("DELETE FROM fixed_expenses WHERE id=?1", params![id])?;
            info!(id, name = %name, "fixed expense removed");
            println!("Removed fixed expense '{}'", name);
        }
        Some(("toggle", sub)) => {
            let name = required(sub, "name")?;
            let active = toggle(conn, &name)?;
            println!(
                "Fixed expense '{}' is now {}",
                name,
                if active { "active" } else { "inactive" }
            );
        }
        Some(("total", sub)) => {
            let active: Vec<FixedExpense> = all(conn)?.into_iter().filter(|e| e.active).collect();
            let total: Decimal = active.iter().map(|e| e.monthly_value).sum();
            let v = json!({ "count": active.len(), "monthlyTotal": money_str(total) });
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &v)? {
                println!(
                    "{} active fixed expenses, {} per month",
                    active.len(),
                    fmt_money(&total, &currency_symbol(conn)?)
                );
            }
        }
        Some(("stats", sub)) => stats(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Every fixed expense, ordered by name.
pub fn all(conn: &Connection) -> Result<Vec<FixedExpense>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, monthly_value, description, active FROM fixed_expenses ORDER BY name, id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, Option<String>>(3)?,
            r.get::<_, bool>(4)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, name, value, description, active) = row?;
        let monthly_value = stored_decimal(&value, &format!("fixed expense '{}'", name))?;
        out.push(FixedExpense {
            id,
            name,
            monthly_value,
            description,
            active,
        });
    }
    Ok(out)
}

/// Flips the active flag and returns the new state.
pub fn toggle(conn: &Connection, name: &str) -> Result<bool> {
    let id = id_for_fixed_expense(conn, name)?;
    conn.execute(
        "UPDATE fixed_expenses SET active = 1 - active, updated_at=?1 WHERE id=?2",
        params![now_stamp(), id],
    )?;
    let active: bool = conn.query_row(
        "SELECT active FROM fixed_expenses WHERE id=?1",
        params![id],
        |r| r.get(0),
    )?;
    info!(id, active, "fixed expense toggled");
    Ok(active)
}

fn stats(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let items = all(conn)?;
    let active: Vec<&FixedExpense> = items.iter().filter(|e| e.active).collect();
    let active_sum: Decimal = active.iter().map(|e| e.monthly_value).sum();
    let average = if active.is_empty() {
        Decimal::ZERO
    } else {
        active_sum / Decimal::from(active.len())
    };
    let max = items
        .iter()
        .max_by(|a, b| a.monthly_value.cmp(&b.monthly_value));

    let v = json!({
        "count": items.len(),
        "active": active.len(),
        "inactive": items.len() - active.len(),
        "activeMonthlyTotal": money_str(active_sum),
        "activeAverage": money_str(average),
        "largest": max.map(|e| e.name.clone()),
    });
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &v)? {
        return Ok(());
    }
    let symbol = currency_symbol(conn)?;
    let rows = vec![
        vec!["Fixed expenses".into(), items.len().to_string()],
        vec!["Active".into(), active.len().to_string()],
        vec!["Inactive".into(), (items.len() - active.len()).to_string()],
        vec!["Active monthly total".into(), fmt_money(&active_sum, &symbol)],
        vec!["Active average".into(), fmt_money(&average, &symbol)],
        vec![
            "Largest".into(),
            max.map(|e| format!("{} ({})", e.name, fmt_money(&e.monthly_value, &symbol)))
                .unwrap_or_else(|| "-".into()),
        ],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], rows));
    Ok(())
}
