// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pricebook::error::EngineError;
use pricebook::{cli, commands, db};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["pricebook"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("ingredient", m)) => commands::ingredients::handle(conn, m),
        Some(("fixed", m)) => commands::fixed::handle(conn, m),
        Some(("variable", m)) => commands::variable::handle(conn, m),
        other => panic!("unexpected subcommand {:?}", other.map(|(n, _)| n)),
    }
}

fn field_of(err: &anyhow::Error) -> Option<&'static str> {
    err.downcast_ref::<EngineError>().and_then(|e| e.field())
}

#[test]
fn ingredient_add_trims_and_lowercases_unit() {
    let conn = db::open_in_memory().unwrap();
    run(
        &conn,
        &["ingredient", "add", "--name", " Flour ", "--price", "4.90", "--unit", " KG ", "--supplier", "Mill"],
    )
    .unwrap();
    let (name, price, unit): (String, String, String) = conn
        .query_row(
            "SELECT name, price_per_unit, unit FROM ingredients",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!(name, "Flour");
    assert_eq!(price.parse::<Decimal>().unwrap(), dec!(4.90));
    assert_eq!(unit, "kg");
}

#[test]
fn ingredient_price_is_validated() {
    let conn = db::open_in_memory().unwrap();
    let err = run(
        &conn,
        &["ingredient", "add", "--name", "Salt", "--price=-1", "--unit", "kg"],
    )
    .unwrap_err();
    assert_eq!(field_of(&err), Some("pricePerUnit"));

    let err = run(
        &conn,
        &["ingredient", "add", "--name", "Saffron", "--price", "1000000.00", "--unit", "g"],
    )
    .unwrap_err();
    assert_eq!(field_of(&err), Some("pricePerUnit"));

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM ingredients", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn ingredient_update_and_rename() {
    let conn = db::open_in_memory().unwrap();
    run(&conn, &["ingredient", "add", "--name", "Milk", "--price", "5", "--unit", "l"]).unwrap();
    run(
        &conn,
        &["ingredient", "update", "--name", "Milk", "--price", "5.50", "--rename", "Whole milk"],
    )
    .unwrap();
    let price: String = conn
        .query_row(
            "SELECT price_per_unit FROM ingredients WHERE name='Whole milk'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(price.parse::<Decimal>().unwrap(), dec!(5.50));
    let err = run(&conn, &["ingredient", "rm", "--name", "Milk"]).unwrap_err();
    assert_eq!(err.to_string(), "Ingredient 'Milk' not found");
}

#[test]
fn ingredient_duplicate_picks_free_names() {
    let conn = db::open_in_memory().unwrap();
    run(&conn, &["ingredient", "add", "--name", "Sugar", "--price", "3.20", "--unit", "kg"]).unwrap();
    assert_eq!(
        commands::ingredients::duplicate(&conn, "Sugar").unwrap(),
        "Copy of Sugar"
    );
    assert_eq!(
        commands::ingredients::duplicate(&conn, "Sugar").unwrap(),
        "Copy of Sugar (2)"
    );
    let price: String = conn
        .query_row(
            "SELECT price_per_unit FROM ingredients WHERE name='Copy of Sugar (2)'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(price.parse::<Decimal>().unwrap(), dec!(3.20));
}

#[test]
fn ingredient_search_matches_name_and_supplier() {
    let conn = db::open_in_memory().unwrap();
    run(&conn, &["ingredient", "add", "--name", "Cocoa", "--price", "30", "--unit", "kg", "--supplier", "Atacadão"]).unwrap();
    run(&conn, &["ingredient", "add", "--name", "Butter", "--price", "45", "--unit", "kg", "--supplier", "Dairy Farm"]).unwrap();
    let by_name = commands::ingredients::search(&conn, "COCO").unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].name, "Cocoa");
    let by_supplier = commands::ingredients::search(&conn, "dairy").unwrap();
    assert_eq!(by_supplier[0].name, "Butter");
    assert!(commands::ingredients::search(&conn, "  ").is_err());
}

#[test]
fn fixed_toggle_and_total() {
    let conn = db::open_in_memory().unwrap();
    run(&conn, &["fixed", "add", "--name", "Rent", "--value", "900"]).unwrap();
    run(&conn, &["fixed", "add", "--name", "Internet", "--value", "100.50"]).unwrap();
    run(&conn, &["fixed", "add", "--name", "Gym", "--value", "80", "--inactive"]).unwrap();

    let active_total = |conn: &Connection| -> Decimal {
        commands::fixed::all(conn)
            .unwrap()
            .into_iter()
            .filter(|e| e.active)
            .map(|e| e.monthly_value)
            .sum()
    };
    assert_eq!(active_total(&conn), dec!(1000.50));

    assert!(!commands::fixed::toggle(&conn, "Internet").unwrap());
    assert!(commands::fixed::toggle(&conn, "Gym").unwrap());
    assert_eq!(active_total(&conn), dec!(980));
    run(&conn, &["fixed", "total"]).unwrap();
}

#[test]
fn fixed_value_allows_zero_but_not_negative() {
    let conn = db::open_in_memory().unwrap();
    run(&conn, &["fixed", "add", "--name", "Donated space", "--value", "0"]).unwrap();
    let err = run(&conn, &["fixed", "add", "--name", "Bad", "--value=-10"]).unwrap_err();
    assert_eq!(field_of(&err), Some("monthlyValue"));
}

#[test]
fn variable_by_unit_and_removal_cascades() {
    let conn = db::open_in_memory().unwrap();
    run(&conn, &["variable", "add", "--name", "Jar", "--value", "2.50", "--unit", "Piece"]).unwrap();
    run(&conn, &["variable", "add", "--name", "Gas", "--value", "0.35", "--unit", "km"]).unwrap();
    let pieces: Vec<_> = commands::variable::all(&conn)
        .unwrap()
        .into_iter()
        .filter(|e| e.unit == "piece")
        .collect();
    assert_eq!(pieces.len(), 1);
    run(&conn, &["variable", "by-unit", "--unit", "PIECE", "--json"]).unwrap();

    conn.execute(
        "INSERT INTO products(name, preparation_minutes, margin_percent, analysis_period_days)
         VALUES ('Cake', 60, '30', 30)",
        [],
    )
    .unwrap();
    let jar: i64 = conn
        .query_row("SELECT id FROM variable_expenses WHERE name='Jar'", [], |r| r.get(0))
        .unwrap();
    conn.execute(
        "INSERT INTO product_variable_expenses(product_id, variable_expense_id, quantity)
         VALUES (1, ?1, '1')",
        params![jar],
    )
    .unwrap();
    run(&conn, &["variable", "rm", "--name", "Jar"]).unwrap();
    let links: i64 = conn
        .query_row("SELECT COUNT(*) FROM product_variable_expenses", [], |r| r.get(0))
        .unwrap();
    assert_eq!(links, 0);
}

#[test]
fn failed_rename_leaves_record_untouched() {
    let conn = db::open_in_memory().unwrap();
    run(&conn, &["fixed", "add", "--name", "Rent", "--value", "100"]).unwrap();
    run(&conn, &["fixed", "add", "--name", "Gas", "--value", "40"]).unwrap();
    assert!(run(&conn, &["fixed", "update", "--name", "Rent", "--value", "999", "--rename", "Gas"]).is_err());
    let rent = commands::fixed::all(&conn)
        .unwrap()
        .into_iter()
        .find(|e| e.name == "Rent")
        .unwrap();
    assert_eq!(rent.monthly_value, dec!(100));

    run(&conn, &["ingredient", "add", "--name", "Flour", "--price", "4.90", "--unit", "kg"]).unwrap();
    run(&conn, &["ingredient", "add", "--name", "Sugar", "--price", "3", "--unit", "kg"]).unwrap();
    assert!(run(&conn, &["ingredient", "update", "--name", "Flour", "--price", "7", "--unit", "g", "--rename", "Sugar"]).is_err());
    let flour = commands::ingredients::all(&conn)
        .unwrap()
        .into_iter()
        .find(|i| i.name == "Flour")
        .unwrap();
    assert_eq!(flour.price_per_unit, dec!(4.90));
    assert_eq!(flour.unit, "kg");

    run(&conn, &["variable", "add", "--name", "Jar", "--value", "2.50", "--unit", "piece"]).unwrap();
    run(&conn, &["variable", "add", "--name", "Box", "--value", "1", "--unit", "piece"]).unwrap();
    assert!(run(&conn, &["variable", "update", "--name", "Jar", "--value", "9", "--rename", "Box"]).is_err());
    let jar = commands::variable::all(&conn)
        .unwrap()
        .into_iter()
        .find(|v| v.name == "Jar")
        .unwrap();
    assert_eq!(jar.value_per_unit, dec!(2.50));
}

#[test]
fn values_beyond_ten_integer_digits_are_rejected() {
    let conn = db::open_in_memory().unwrap();
    run(&conn, &["fixed", "add", "--name", "Lease", "--value", "9999999999.99"]).unwrap();
    let err = run(&conn, &["fixed", "add", "--name", "Huge", "--value", "10000000000"]).unwrap_err();
    assert_eq!(field_of(&err), Some("monthlyValue"));
    let err = run(&conn, &["fixed", "update", "--name", "Lease", "--value", "12345678901"]).unwrap_err();
    assert_eq!(field_of(&err), Some("monthlyValue"));
}
