// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pricebook::commands::{doctor, settings};
use pricebook::{cli, db, utils};
use rusqlite::Connection;
use rust_decimal_macros::dec;

fn codes(conn: &Connection) -> Vec<&'static str> {
    doctor::check(conn).unwrap().into_iter().map(|i| i.code).collect()
}

#[test]
fn clean_database_has_no_issues() {
    let conn = db::open_in_memory().unwrap();
    assert!(codes(&conn).is_empty());
    doctor::handle(&conn).unwrap();
}

#[test]
fn reports_empty_products_and_inactive_links() {
    let conn = db::open_in_memory().unwrap();
    conn.execute_batch(
        r#"
        INSERT INTO fixed_expenses(id, name, monthly_value, active) VALUES (1, 'Old rent', '300', 0);
        INSERT INTO products(id, name, preparation_minutes, margin_percent, analysis_period_days)
            VALUES (1, 'Empty', 10, '30', 30), (2, 'Linked', 10, '30', 30);
        INSERT INTO product_fixed_expenses(product_id, fixed_expense_id) VALUES (2, 1);
        "#,
    )
    .unwrap();
    let issues = doctor::check(&conn).unwrap();
    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].code, "product_without_lines");
    assert_eq!(issues[0].detail, "Empty");
    assert_eq!(issues[1].code, "inactive_expense_linked");
    assert_eq!(issues[1].detail, "Linked -> fixed expense 'Old rent'");
}

#[test]
fn reports_corrupt_stored_values() {
    let conn = db::open_in_memory().unwrap();
    conn.execute_batch(
        r#"
        INSERT INTO ingredients(id, name, price_per_unit, unit) VALUES (1, 'Flour', '-2', 'kg');
        INSERT INTO products(id, name, preparation_minutes, margin_percent, analysis_period_days)
            VALUES (1, 'Bread', 30, '1500', 30);
        INSERT INTO product_ingredients(product_id, ingredient_id, quantity) VALUES (1, 1, '0');
        "#,
    )
    .unwrap();
    let found = codes(&conn);
    assert!(found.contains(&"bad_quantity"));
    assert!(found.contains(&"bad_price"));
    assert!(found.contains(&"bad_product_terms"));
    assert!(!found.contains(&"product_without_lines"));
}

#[test]
fn settings_fall_back_to_defaults() {
    let conn = db::open_in_memory().unwrap();
    assert_eq!(settings::effective(&conn, "default_margin").unwrap(), "30");
    assert_eq!(settings::effective(&conn, "default_period").unwrap(), "30");
    assert_eq!(settings::effective(&conn, "currency_symbol").unwrap(), "R$");
    assert!(settings::effective(&conn, "language").is_err());
}

#[test]
fn config_set_validates_values() {
    let conn = db::open_in_memory().unwrap();
    let run = |args: &[&str]| {
        let mut argv = vec!["pricebook", "config"];
        argv.extend_from_slice(args);
        let matches = cli::build_cli().get_matches_from(argv);
        match matches.subcommand() {
            Some(("config", m)) => settings::handle(&conn, m),
            _ => panic!("config subcommand not matched"),
        }
    };

    run(&["set", "--key", "default_margin", "--value", "42.5"]).unwrap();
    assert_eq!(utils::default_margin(&conn).unwrap(), dec!(42.5));
    run(&["set", "--key", "currency_symbol", "--value", " € "]).unwrap();
    assert_eq!(utils::currency_symbol(&conn).unwrap(), "€");

    assert!(run(&["set", "--key", "default_margin", "--value", "1001"]).is_err());
    assert!(run(&["set", "--key", "default_period", "--value", "0"]).is_err());
    assert!(run(&["set", "--key", "default_period", "--value", "1.5"]).is_err());
    assert!(run(&["set", "--key", "theme", "--value", "dark"]).is_err());
    assert_eq!(utils::default_period(&conn).unwrap(), 30);
    run(&["list"]).unwrap();
}
