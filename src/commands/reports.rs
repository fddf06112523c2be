// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{fixed, ingredients, variable};
use crate::engine::{self, Catalog, PricingReport};
use crate::models::{Product, ProductFixedExpense, ProductIngredient, ProductVariableExpense};
use crate::utils::{currency_symbol, fmt_money, id_for_product, maybe_print_json, pretty_table, stored_decimal};
use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use tracing::debug;

/// Loads a product row and its lines, each list ordered by catalog name.
pub fn load_product(conn: &Connection, name: &str) -> Result<Product> {
    let id = id_for_product(conn, name)?;
    let (name, description, preparation_minutes, margin_raw, analysis_period_days) = conn
        .query_row(
            "SELECT name, description, preparation_minutes, margin_percent, analysis_period_days
             FROM products WHERE id=?1",
            params![id],
            |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, Option<String>>(1)?,
                    r.get::<_, i64>(2)?,
                    r.get::<_, String>(3)?,
                    r.get::<_, i64>(4)?,
                ))
            },
        )
        .with_context(|| format!("Load product '{}'", name))?;
    let margin_percent = stored_decimal(&margin_raw, &format!("product '{}' margin", name))?;

    let mut stmt = conn.prepare(
        "SELECT pi.ingredient_id, pi.quantity FROM product_ingredients pi
         JOIN ingredients i ON i.id = pi.ingredient_id
         WHERE pi.product_id=?1 ORDER BY i.name, i.id",
    )?;
    let rows = stmt.query_map(params![id], |r| {
        Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?))
    })?;
    let mut ingredients = Vec::new();
    for row in rows {
        let (ingredient_id, q) = row?;
        ingredients.push(ProductIngredient {
            ingredient_id,
            quantity: stored_decimal(&q, &format!("product '{}' ingredient line", name))?,
        });
    }

    let mut stmt = conn.prepare(
        "SELECT pf.fixed_expense_id FROM product_fixed_expenses pf
         JOIN fixed_expenses f ON f.id = pf.fixed_expense_id
         WHERE pf.product_id=?1 ORDER BY f.name, f.id",
    )?;
    let fixed_expenses = stmt
        .query_map(params![id], |r| {
            Ok(ProductFixedExpense {
                fixed_expense_id: r.get(0)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stmt = conn.prepare(
        "SELECT pv.variable_expense_id, pv.quantity FROM product_variable_expenses pv
         JOIN variable_expenses v ON v.id = pv.variable_expense_id
         WHERE pv.product_id=?1 ORDER BY v.name, v.id",
    )?;
    let rows = stmt.query_map(params![id], |r| {
        Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?))
    })?;
    let mut variable_expenses = Vec::new();
    for row in rows {
        let (variable_expense_id, q) = row?;
        variable_expenses.push(ProductVariableExpense {
            variable_expense_id,
            quantity: stored_decimal(&q, &format!("product '{}' variable expense line", name))?,
        });
    }

    Ok(Product {
        id,
        name,
        description,
        preparation_minutes,
        margin_percent,
        analysis_period_days,
        ingredients,
        fixed_expenses,
        variable_expenses,
    })
}

/// The whole catalog. Inactive expenses are included: a link is honoured
/// until it is removed, and `doctor` reports it.
pub fn load_catalog(conn: &Connection) -> Result<Catalog> {
    let mut catalog = Catalog::new();
    for i in ingredients::all(conn)? {
        catalog.add_ingredient(i);
    }
    for f in fixed::all(conn)? {
        catalog.add_fixed_expense(f);
    }
    for v in variable::all(conn)? {
        catalog.add_variable_expense(v);
    }
    Ok(catalog)
}

pub fn product_report(conn: &Connection, name: &str) -> Result<PricingReport> {
    let product = load_product(conn, name)?;
    let catalog = load_catalog(conn)?;
    debug!(product = product.id, entries = catalog.len(), "resolving product lines");
    let report = engine::calculate_product(&product, &catalog)
        .with_context(|| format!("Calculate price for '{}'", product.name))?;
    Ok(report)
}

/// `product calculate`: the pricing report as tables or JSON.
pub fn calculate(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = crate::utils::required(sub, "name")?;
    let report = product_report(conn, &name)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    let symbol = currency_symbol(conn)?;
    print_report(&report, &symbol);
    Ok(())
}

fn money(m: &engine::Money, symbol: &str) -> String {
    fmt_money(&m.amount(), symbol)
}

pub fn print_report(r: &PricingReport, symbol: &str) {
    println!(
        "{} ({} days, margin {}%)",
        r.name, r.analysis_period_days, r.margin_percent
    );

    let mut lines = Vec::new();
    for l in &r.line_detail.ingredients {
        lines.push(vec![
            "Ingredient".into(),
            l.name.clone(),
            format!("{} {}", l.quantity, l.unit),
            money(&l.unit_price, symbol),
            money(&l.line_cost, symbol),
        ]);
    }
    for l in &r.line_detail.fixed_expenses {
        lines.push(vec![
            "Fixed".into(),
            l.name.clone(),
            format!("{} days", r.analysis_period_days),
            format!("{}/month", money(&l.monthly_value, symbol)),
            money(&l.prorated_cost, symbol),
        ]);
    }
    for l in &r.line_detail.variable_expenses {
        lines.push(vec![
            "Variable".into(),
            l.name.clone(),
            format!("{} {}", l.quantity, l.unit),
            money(&l.unit_price, symbol),
            money(&l.line_cost, symbol),
        ]);
    }
    if !lines.is_empty() {
        println!(
            "{}",
            pretty_table(&["Type", "Name", "Quantity", "Unit price", "Cost"], lines)
        );
    }

    let c = &r.costs;
    let costs = vec![
        vec!["Ingredients".into(), money(&c.ingredients, symbol), format!("{}%", c.ingredients_percent)],
        vec!["Fixed".into(), money(&c.fixed, symbol), format!("{}%", c.fixed_percent)],
        vec!["Variable".into(), money(&c.variable, symbol), format!("{}%", c.variable_percent)],
        vec!["Total".into(), money(&c.total, symbol), String::new()],
    ];
    println!("{}", pretty_table(&["Cost", "Amount", "Share"], costs));

    let p = &r.pricing;
    let j = &r.projection;
    let summary = vec![
        vec!["Suggested price".into(), money(&p.suggested_price, symbol)],
        vec!["Margin".into(), format!("{}% ({})", p.margin_percent, money(&p.margin_value, symbol))],
        vec!["Markup".into(), format!("{}%", p.markup_percent)],
        vec!["Assumed units".into(), j.assumed_quantity.to_string()],
        vec!["Projected revenue".into(), money(&j.revenue, symbol)],
        vec!["Projected cost".into(), money(&j.total_cost, symbol)],
        vec!["Projected profit".into(), money(&j.profit, symbol)],
        vec!["ROI".into(), format!("{}%", j.roi_percent)],
    ];
    println!("{}", pretty_table(&["Pricing", "Value"], summary));
}
