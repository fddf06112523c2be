// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{exporter, reports};
use crate::engine::snapshot::validate_terms;
use crate::engine::Percent;
use crate::error::EngineError;
use crate::models::Product;
use crate::utils::{
    currency_symbol, default_margin, default_period, fmt_minutes, id_for_fixed_expense,
    id_for_ingredient, id_for_product, id_for_variable_expense, maybe_print_json, now_stamp,
    optional, parse_count, parse_non_negative, parse_quantity, pretty_table, required,
    unique_copy_name,
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
            let products = all(conn)?;
            print_list(sub, &products)?;
        }
        Some(("update", sub)) => update(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("rm", sub)) => {
            let name = required(sub, "name")?;
            let id = id_for_product(conn, &name)?;
            conn.execute("DELETE FROM products WHERE id=?1", params![id])?;
            info!(id, name = %name, "product removed");
            println!("Removed product '{}'", name);
        }
        Some(("search", sub)) => {
            let q = required(sub, "q")?;
            let products = search(conn, &q)?;
            print_list(sub, &products)?;
        }
        Some(("stats", sub)) => stats(conn, sub)?,
        Some(("duplicate", sub)) => {
            let name = required(sub, "name")?;
            let copy = duplicate(conn, &name)?;
            println!("Duplicated product '{}' as '{}'", name, copy);
        }
        Some(("link", sub)) => link(conn, sub)?,
        Some(("unlink", sub)) => unlink(conn, sub)?,
        Some(("calculate", sub)) => reports::calculate(conn, sub)?,
        Some(("export", sub)) => exporter::export(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn parse_margin(s: &str) -> Result<Decimal> {
    parse_non_negative("marginPercent", s)
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = required(sub, "name")?;
    if name.is_empty() {
        return Err(EngineError::invalid_input("name", "must not be empty").into());
    }
    let prep = parse_count("preparationMinutes", &required(sub, "prep-minutes")?)?;
    let margin = match optional(sub, "margin") {
        Some(s) => parse_margin(&s)?,
        None => default_margin(conn)?,
    };
    let period = match optional(sub, "period") {
        Some(s) => parse_count("analysisPeriodDays", &s)?,
        None => default_period(conn)?,
    };
    validate_terms(prep, Percent::new(margin), period)?;
    let description = optional(sub, "description");
    conn.execute(
        "INSERT INTO products(name, description, preparation_minutes, margin_percent, analysis_period_days)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![name, description, prep, margin.to_string(), period],
    )?;
    info!(name = %name, margin = %margin, period, "product added");
    println!(
        "Added product '{}' ({} margin {}%, {} days)",
        name,
        fmt_minutes(prep),
        margin,
        period
    );
    Ok(())
}

fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = required(sub, "name")?;
    let current = reports::load_product(conn, &name)?;
    let prep = match optional(sub, "prep-minutes") {
        Some(s) => parse_count("preparationMinutes", &s)?,
        None => current.preparation_minutes,
    };
    let margin = match optional(sub, "margin") {
        Some(s) => parse_margin(&s)?,
        None => current.margin_percent,
    };
    let period = match optional(sub, "period") {
        Some(s) => parse_count("analysisPeriodDays", &s)?,
        None => current.analysis_period_days,
    };
    validate_terms(prep, Percent::new(margin), period)?;
    let description = optional(sub, "description").or(current.description);
    let new_name = optional(sub, "rename").unwrap_or(current.name);
    conn.execute(
        "UPDATE products SET name=?1, description=?2, preparation_minutes=?3,
         margin_percent=?4, analysis_period_days=?5, updated_at=?6 WHERE id=?7",
        params![
            new_name,
            description,
            prep,
            margin.to_string(),
            period,
            now_stamp(),
            current.id
        ],
    )?;
    info!(id = current.id, name = %new_name, "product updated");
    println!("Updated product '{}'", new_name);
    Ok(())
}

fn product_names(conn: &Connection, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<Product>> {
    let mut stmt = conn.prepare(sql)?;
    let names = stmt
        .query_map(args, |r| r.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    names
        .iter()
        .map(|n| reports::load_product(conn, n))
        .collect()
}

/// Every product with its lines, ordered by name.
pub fn all(conn: &Connection) -> Result<Vec<Product>> {
    product_names(conn, "SELECT name FROM products ORDER BY name, id", &[])
}

/// Case-insensitive match on name or description.
pub fn search(conn: &Connection, term: &str) -> Result<Vec<Product>> {
    let term = term.trim();
    if term.is_empty() {
        bail!("Search term must not be empty");
    }
    let pattern = format!("%{}%", term.to_lowercase());
    product_names(
        conn,
        "SELECT name FROM products
         WHERE lower(name) LIKE ?1 OR lower(coalesce(description, '')) LIKE ?1
         ORDER BY name, id",
        &[&pattern],
    )
}

fn line_count(p: &Product) -> usize {
    p.ingredients.len() + p.fixed_expenses.len() + p.variable_expenses.len()
}

fn print_list(sub: &clap::ArgMatches, products: &[Product]) -> Result<()> {
    let items: Vec<_> = products
        .iter()
        .map(|p| {
            json!({
                "name": p.name,
                "description": p.description,
                "preparationMinutes": p.preparation_minutes,
                "marginPercent": p.margin_percent.to_string(),
                "analysisPeriodDays": p.analysis_period_days,
                "ingredients": p.ingredients.len(),
                "fixedExpenses": p.fixed_expenses.len(),
                "variableExpenses": p.variable_expenses.len(),
            })
        })
        .collect();
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        return Ok(());
    }
    let data = products
        .iter()
        .map(|p| {
            vec![
                p.name.clone(),
                fmt_minutes(p.preparation_minutes),
                format!("{}%", p.margin_percent),
                format!("{} days", p.analysis_period_days),
                line_count(p).to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Name", "Preparation", "Margin", "Period", "Lines"], data)
    );
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = required(sub, "name")?;
    let product = reports::load_product(conn, &name)?;
    let report = reports::product_report(conn, &name)?;
    let v = json!({
        "name": product.name,
        "description": product.description,
        "preparationMinutes": product.preparation_minutes,
        "marginPercent": report.margin_percent,
        "analysisPeriodDays": product.analysis_period_days,
        "costTotal": report.costs.total,
        "lineDetail": report.line_detail,
    });
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &v)? {
        return Ok(());
    }
    let symbol = currency_symbol(conn)?;
    let mut header = vec![
        vec!["Name".into(), product.name.clone()],
        vec!["Preparation".into(), fmt_minutes(product.preparation_minutes)],
        vec!["Margin".into(), format!("{}%", report.margin_percent)],
        vec!["Period".into(), format!("{} days", product.analysis_period_days)],
    ];
    if let Some(d) = &product.description {
        header.push(vec!["Description".into(), d.clone()]);
    }
    println!("{}", pretty_table(&["Product", ""], header));
    reports::print_report(&report, &symbol);
    Ok(())
}

fn stats(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let products = all(conn)?;
    let count = products.len();
    let (avg_margin, avg_prep) = if count == 0 {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        let n = Decimal::from(count);
        let margins: Decimal = products.iter().map(|p| p.margin_percent).sum();
        let preps: i64 = products.iter().map(|p| p.preparation_minutes).sum();
        (margins / n, Decimal::from(preps) / n)
    };
    let most_complex = products.iter().max_by_key(|p| line_count(p));
    let highest_margin = products
        .iter()
        .max_by(|a, b| a.margin_percent.cmp(&b.margin_percent));

    let v = json!({
        "count": count,
        "averageMarginPercent": Percent::new(avg_margin),
        "averagePreparationMinutes": avg_prep.round_dp(1).to_string(),
        "mostComplex": most_complex.map(|p| p.name.clone()),
        "highestMargin": highest_margin.map(|p| p.name.clone()),
    });
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &v)? {
        return Ok(());
    }
    let rows = vec![
        vec!["Products".into(), count.to_string()],
        vec!["Average margin".into(), format!("{}%", Percent::new(avg_margin))],
        vec![
            "Average preparation".into(),
            format!("{} min", avg_prep.round_dp(1)),
        ],
        vec![
            "Most complex".into(),
            most_complex
                .map(|p| format!("{} ({} lines)", p.name, line_count(p)))
                .unwrap_or_else(|| "-".into()),
        ],
        vec![
            "Highest margin".into(),
            highest_margin
                .map(|p| format!("{} ({}%)", p.name, p.margin_percent))
                .unwrap_or_else(|| "-".into()),
        ],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], rows));
    Ok(())
}

/// Copies a product and all of its lines under the first free "Copy of ..." name.
pub fn duplicate(conn: &Connection, name: &str) -> Result<String> {
    let id = id_for_product(conn, name)?;
    let copy = unique_copy_name(conn, "products", name)?;
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO products(name, description, preparation_minutes, margin_percent, analysis_period_days)
         SELECT ?1, description, preparation_minutes, margin_percent, analysis_period_days
         FROM products WHERE id=?2",
        params![copy, id],
    )?;
    let new_id = tx.last_insert_rowid();
    tx.execute(
        "INSERT INTO product_ingredients(product_id, ingredient_id, quantity)
         SELECT ?1, ingredient_id, quantity FROM product_ingredients WHERE product_id=?2",
        params![new_id, id],
    )?;
    tx.execute(
        "INSERT INTO product_fixed_expenses(product_id, fixed_expense_id)
         SELECT ?1, fixed_expense_id FROM product_fixed_expenses WHERE product_id=?2",
        params![new_id, id],
    )?;
    tx.execute(
        "INSERT INTO product_variable_expenses(product_id, variable_expense_id, quantity)
         SELECT ?1, variable_expense_id, quantity FROM product_variable_expenses WHERE product_id=?2",
        params![new_id, id],
    )?;
    tx.commit()?;
    info!(source = id, id = new_id, name = %copy, "product duplicated");
    Ok(copy)
}

fn touch(conn: &Connection, product_id: i64) -> Result<()> {
    conn.execute(
        "UPDATE products SET updated_at=?1 WHERE id=?2",
        params![now_stamp(), product_id],
    )?;
    Ok(())
}

fn link(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let Some((kind, sub)) = m.subcommand() else {
        return Ok(());
    };
    let product = required(sub, "product")?;
    let name = required(sub, "name")?;
    let product_id = id_for_product(conn, &product)?;
    match kind {
        "ingredient" => {
            let id = id_for_ingredient(conn, &name)?;
            let qty = parse_quantity("quantity", &required(sub, "quantity")?)?;
            conn.execute(
                "INSERT INTO product_ingredients(product_id, ingredient_id, quantity) VALUES (?1, ?2, ?3)
                 ON CONFLICT(product_id, ingredient_id) DO UPDATE SET quantity=excluded.quantity",
                params![product_id, id, qty.to_string()],
            )?;
            println!("Linked ingredient '{}' x {} to '{}'", name, qty, product);
        }
        "fixed" => {
            let id = id_for_fixed_expense(conn, &name)?;
            conn.execute(
                "INSERT OR IGNORE INTO product_fixed_expenses(product_id, fixed_expense_id) VALUES (?1, ?2)",
                params![product_id, id],
            )?;
            println!("Linked fixed expense '{}' to '{}'", name, product);
        }
        "variable" => {
            let id = id_for_variable_expense(conn, &name)?;
            let qty = parse_quantity("quantity", &required(sub, "quantity")?)?;
            conn.execute(
                "INSERT INTO product_variable_expenses(product_id, variable_expense_id, quantity) VALUES (?1, ?2, ?3)
                 ON CONFLICT(product_id, variable_expense_id) DO UPDATE SET quantity=excluded.quantity",
                params![product_id, id, qty.to_string()],
            )?;
            println!("Linked variable expense '{}' x {} to '{}'", name, qty, product);
        }
        other => bail!("Unknown line kind: {}", other),
    }
    touch(conn, product_id)?;
    info!(product = product_id, kind, name = %name, "line linked");
    Ok(())
}

fn unlink(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let Some((kind, sub)) = m.subcommand() else {
        return Ok(());
    };
    let product = required(sub, "product")?;
    let name = required(sub, "name")?;
    let product_id = id_for_product(conn, &product)?;
    let (label, removed) = match kind {
        "ingredient" => {
            let id = id_for_ingredient(conn, &name)?;
            let n = conn.execute(
                "DELETE FROM product_ingredients WHERE product_id=?1 AND ingredient_id=?2",
                params![product_id, id],
            )?;
            ("Ingredient", n)
        }
        "fixed" => {
            let id = id_for_fixed_expense(conn, &name)?;
            let n = conn.execute(
                "DELETE FROM product_fixed_expenses WHERE product_id=?1 AND fixed_expense_id=?2",
                params![product_id, id],
            )?;
            ("Fixed expense", n)
        }
        "variable" => {
            let id = id_for_variable_expense(conn, &name)?;
            let n = conn.execute(
                "DELETE FROM product_variable_expenses WHERE product_id=?1 AND variable_expense_id=?2",
                params![product_id, id],
            )?;
            ("Variable expense", n)
        }
        other => bail!("Unknown line kind: {}", other),
    };
    if removed == 0 {
        bail!("{} '{}' is not linked to '{}'", label, name, product);
    }
    touch(conn, product_id)?;
    info!(product = product_id, kind, name = %name, "line unlinked");
    println!("Unlinked {} '{}' from '{}'", label.to_lowercase(), name, product);
    Ok(())
}
