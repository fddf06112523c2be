// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::EngineError;
use crate::models::Ingredient;
use crate::utils::{
    currency_symbol, fmt_money, id_for_ingredient, maybe_print_json, money_str, normalize_unit, now_stamp,
    optional, parse_unit_price, pretty_table, required, stored_decimal, unique_copy_name,
};
use anyhow::{Result, bail};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => {
            let items = all(conn)?;
            print_list(conn, sub, &items)?;
        }
        Some(("update", sub)) => update(conn, sub)?,
        Some(("rm", sub)) => {
            let name = required(sub, "name")?;
            let id = id_for_ingredient(conn, &name)?;
            conn.execute("DELETE FROM ingredients WHERE id=?1", params![id])?;
            info!(id, name = %name, "ingredient removed");
            println!("Removed ingredient '{}'", name);
        }
        Some(("search", sub)) => {
            let q = required(sub, "q")?;
            let items = search(conn, &q)?;
            print_list(conn, sub, &items)?;
        }
        Some(("stats", sub)) => stats(conn, sub)?,
        Some(("duplicate", sub)) => {
            let name = required(sub, "name")?;
            let copy = duplicate(conn, &name)?;
            println!("Duplicated ingredient '{}' as '{}'", name, copy);
        }
        Some(("by-supplier", sub)) => {
            let supplier = required(sub, "supplier")?;
            let items: Vec<Ingredient> = all(conn)?
                .into_iter()
                .filter(|i| {
                    i.supplier
                        .as_deref()
                        .is_some_and(|s| s.eq_ignore_ascii_case(&supplier))
                })
                .collect();
            print_list(conn, sub, &items)?;
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = required(sub, "name")?;
    if name.is_empty() {
        return Err(EngineError::invalid_input("name", "must not be empty").into());
    }
    let price = parse_unit_price("pricePerUnit", &required(sub, "price")?)?;
    let unit = normalize_unit(&required(sub, "unit")?);
    if unit.is_empty() {
        return Err(EngineError::invalid_input("unit", "must not be empty").into());
    }
    let supplier = optional(sub, "supplier");
    conn.execute(
        "INSERT INTO ingredients(name, price_per_unit, unit, supplier) VALUES (?1, ?2, ?3, ?4)",
        params![name, price.to_string(), unit, supplier],
    )?;
    info!(name = %name, price = %price, "ingredient added");
    println!("Added ingredient '{}' ({} per {})", name, price, unit);
    Ok(())
}

fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = required(sub, "name")?;
    let id = id_for_ingredient(conn, &name)?;
    let tx = conn.unchecked_transaction()?;
    if let Some(p) = optional(sub, "price") {
        let price = parse_unit_price("pricePerUnit", &p)?;
        tx.execute(
            "UPDATE ingredients SET price_per_unit=?1 WHERE id=?2",
            params![price.to_string(), id],
        )?;
    }
    if let Some(u) = optional(sub, "unit") {
        tx.execute(
            "UPDATE ingredients SET unit=?1 WHERE id=?2",
            params![normalize_unit(&u), id],
        )?;
    }
    if let Some(s) = optional(sub, "supplier") {
        tx.execute(
            "UPDATE ingredients SET supplier=?1 WHERE id=?2",
            params![s, id],
        )?;
    }
    let mut shown = name.clone();
    if let Some(new_name) = optional(sub, "rename") {
        tx.execute(
            "UPDATE ingredients SET name=?1 WHERE id=?2",
            params![new_name, id],
        )?;
        shown = new_name;
    }
    tx.execute(
        "UPDATE ingredients SET updated_at=?1 WHERE id=?2",
        params![now_stamp(), id],
    )?;
    tx.commit()?;
    info!(id, name = %shown, "ingredient updated");
    println!("Updated ingredient '{}'", shown);
    Ok(())
}

/// Every ingredient, ordered by name.
pub fn all(conn: &Connection) -> Result<Vec<Ingredient>> {
    query(conn, "SELECT id, name, price_per_unit, unit, supplier FROM ingredients ORDER BY name, id", &[])
}

/// Case-insensitive match on name or supplier.
pub fn search(conn: &Connection, term: &str) -> Result<Vec<Ingredient>> {
    let term = term.trim();
    if term.is_empty() {
        bail!("Search term must not be empty");
    }
    let pattern = format!("%{}%", term.to_lowercase());
    query(
        conn,
        "SELECT id, name, price_per_unit, unit, supplier FROM ingredients
         WHERE lower(name) LIKE ?1 OR lower(coalesce(supplier, '')) LIKE ?1
         ORDER BY name, id",
        &[&pattern],
    )
}

fn query(conn: &Connection, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<Ingredient>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(args, |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, Option<String>>(4)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, name, price, unit, supplier) = row?;
        let price_per_unit = stored_decimal(&price, &format!("ingredient '{}'", name))?;
        out.push(Ingredient {
            id,
            name,
            price_per_unit,
            unit,
            supplier,
        });
    }
    Ok(out)
}

/// Copies an ingredient under the first free "Copy of ..." name.
pub fn duplicate(conn: &Connection, name: &str) -> Result<String> {
    let id = id_for_ingredient(conn, name)?;
    let copy = unique_copy_name(conn, "ingredients", name)?;
    conn.execute(
        "INSERT INTO ingredients(name, price_per_unit, unit, supplier)
         SELECT ?1, price_per_unit, unit, supplier FROM ingredients WHERE id=?2",
        params![copy, id],
    )?;
    info!(source = id, name = %copy, "ingredient duplicated");
    Ok(copy)
}

fn print_list(conn: &Connection, sub: &clap::ArgMatches, items: &[Ingredient]) -> Result<()> {
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        return Ok(());
    }
    let symbol = currency_symbol(conn)?;
    let data = items
        .iter()
        .map(|i| {
            vec![
                i.name.clone(),
                fmt_money(&i.price_per_unit, &symbol),
                i.unit.clone(),
                i.supplier.clone().unwrap_or_default(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Name", "Price/Unit", "Unit", "Supplier"], data)
    );
    Ok(())
}

fn stats(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let items = all(conn)?;
    let count = items.len();
    let prices: Vec<Decimal> = items.iter().map(|i| i.price_per_unit).collect();
    let sum: Decimal = prices.iter().sum();
    let average = if count > 0 {
        sum / Decimal::from(count)
    } else {
        Decimal::ZERO
    };
    let min = prices.iter().min().copied().unwrap_or_default();
    let max = prices.iter().max().copied().unwrap_or_default();
    let mut suppliers: Vec<String> = items
        .iter()
        .filter_map(|i| i.supplier.as_ref().map(|s| s.to_lowercase()))
        .collect();
    suppliers.sort();
    suppliers.dedup();
    let most_expensive = items
        .iter()
        .max_by(|a, b| a.price_per_unit.cmp(&b.price_per_unit))
        .map(|i| i.name.clone());

    let v = json!({
        "count": count,
        "averagePrice": money_str(average),
        "minPrice": money_str(min),
        "maxPrice": money_str(max),
        "supplierCount": suppliers.len(),
        "mostExpensive": most_expensive,
    });
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &v)? {
        return Ok(());
    }
    let symbol = currency_symbol(conn)?;
    let rows = vec![
        vec!["Ingredients".into(), count.to_string()],
        vec!["Average price".into(), fmt_money(&average, &symbol)],
        vec!["Lowest price".into(), fmt_money(&min, &symbol)],
        vec!["Highest price".into(), fmt_money(&max, &symbol)],
        vec!["Suppliers".into(), suppliers.len().to_string()],
        vec![
            "Most expensive".into(),
            most_expensive.unwrap_or_else(|| "-".into()),
        ],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], rows));
    Ok(())
}
