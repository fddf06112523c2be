// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::Percent;
use crate::engine::snapshot::validate_terms;
use crate::utils::{MAX_UNIT_PRICE, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub code: &'static str,
    pub detail: String,
}

impl Issue {
    fn new(code: &'static str, detail: String) -> Self {
        Issue { code, detail }
    }
}

pub fn handle(conn: &Connection) -> Result<()> {
    let issues = check(conn)?;
    if issues.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.code.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

/// Runs every check against raw stored values, so corrupt rows are
/// reported instead of aborting the scan.
pub fn check(conn: &Connection) -> Result<Vec<Issue>> {
    let mut issues = Vec::new();

    // 1) Products without any lines
    let mut stmt = conn.prepare(
        "SELECT p.name FROM products p
         WHERE NOT EXISTS (SELECT 1 FROM product_ingredients WHERE product_id=p.id)
           AND NOT EXISTS (SELECT 1 FROM product_fixed_expenses WHERE product_id=p.id)
           AND NOT EXISTS (SELECT 1 FROM product_variable_expenses WHERE product_id=p.id)
         ORDER BY p.name",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let name: String = r.get(0)?;
        issues.push(Issue::new("product_without_lines", name));
    }

    // 2) Links to inactive expenses (still counted in calculations)
    let mut stmt = conn.prepare(
        "SELECT p.name, f.name, 'fixed' FROM product_fixed_expenses pf
         JOIN products p ON p.id=pf.product_id
         JOIN fixed_expenses f ON f.id=pf.fixed_expense_id
         WHERE f.active=0
         UNION ALL
         SELECT p.name, v.name, 'variable' FROM product_variable_expenses pv
         JOIN products p ON p.id=pv.product_id
         JOIN variable_expenses v ON v.id=pv.variable_expense_id
         WHERE v.active=0
         ORDER BY 1, 2",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let (product, expense, kind): (String, String, String) = (r.get(0)?, r.get(1)?, r.get(2)?);
        issues.push(Issue::new(
            "inactive_expense_linked",
            format!("{} -> {} expense '{}'", product, kind, expense),
        ));
    }

    // 3) Line quantities
    let mut stmt = conn.prepare(
        "SELECT p.name, i.name, pi.quantity FROM product_ingredients pi
         JOIN products p ON p.id=pi.product_id
         JOIN ingredients i ON i.id=pi.ingredient_id
         UNION ALL
         SELECT p.name, v.name, pv.quantity FROM product_variable_expenses pv
         JOIN products p ON p.id=pv.product_id
         JOIN variable_expenses v ON v.id=pv.variable_expense_id
         ORDER BY 1, 2",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let (product, item, raw): (String, String, String) = (r.get(0)?, r.get(1)?, r.get(2)?);
        match raw.parse::<Decimal>() {
            Ok(q) if q > Decimal::ZERO => {}
            _ => issues.push(Issue::new(
                "bad_quantity",
                format!("{} -> '{}' quantity {}", product, item, raw),
            )),
        }
    }

    // 4) Catalog prices
    for (table, column, label) in [
        ("ingredients", "price_per_unit", "ingredient"),
        ("variable_expenses", "value_per_unit", "variable expense"),
        ("fixed_expenses", "monthly_value", "fixed expense"),
    ] {
        let sql = format!("SELECT name, {} FROM {} ORDER BY name", column, table);
        let mut stmt = conn.prepare(&sql)?;
        let mut cur = stmt.query([])?;
        while let Some(r) = cur.next()? {
            let (name, raw): (String, String) = (r.get(0)?, r.get(1)?);
            let ok = match raw.parse::<Decimal>() {
                Ok(v) => {
                    v >= Decimal::ZERO && (table == "fixed_expenses" || v <= MAX_UNIT_PRICE)
                }
                Err(_) => false,
            };
            if !ok {
                issues.push(Issue::new(
                    "bad_price",
                    format!("{} '{}' value {}", label, name, raw),
                ));
            }
        }
    }

    // 5) Product terms
    let mut stmt = conn.prepare(
        "SELECT name, preparation_minutes, margin_percent, analysis_period_days
         FROM products ORDER BY name",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let name: String = r.get(0)?;
        let prep: i64 = r.get(1)?;
        let margin_raw: String = r.get(2)?;
        let period: i64 = r.get(3)?;
        let problem = match margin_raw.parse::<Decimal>() {
            Ok(m) => validate_terms(prep, Percent::new(m), period)
                .err()
                .map(|e| e.to_string()),
            Err(_) => Some(format!("unreadable margin {}", margin_raw)),
        };
        if let Some(p) = problem {
            issues.push(Issue::new("bad_product_terms", format!("{}: {}", name, p)));
        }
    }

    Ok(issues)
}
