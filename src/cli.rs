// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version};

fn opt(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id).long(id).help(help)
}

fn req(id: &'static str, help: &'static str) -> Arg {
    opt(id, help).required(true)
}

fn flag(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id).long(id).action(ArgAction::SetTrue).help(help)
}

fn json_flags() -> [Arg; 2] {
    [
        flag("json", "Print as pretty JSON"),
        flag("jsonl", "Print as JSON lines"),
    ]
}

fn ingredient_cmd() -> Command {
    Command::new("ingredient")
        .about("Manage ingredients (raw materials priced per unit)")
        .subcommand(
            Command::new("add")
                .about("Register an ingredient")
                .arg(req("name", "Ingredient name"))
                .arg(req("price", "Price per unit"))
                .arg(req("unit", "Unit of measure (kg, l, piece, ...)"))
                .arg(opt("supplier", "Supplier or place of purchase")),
        )
        .subcommand(Command::new("list").about("List ingredients").args(json_flags()))
        .subcommand(
            Command::new("update")
                .about("Change an ingredient")
                .arg(req("name", "Ingredient name"))
                .arg(opt("price", "New price per unit"))
                .arg(opt("unit", "New unit of measure"))
                .arg(opt("supplier", "New supplier"))
                .arg(opt("rename", "New name")),
        )
        .subcommand(
            Command::new("rm")
                .about("Remove an ingredient and its product links")
                .arg(req("name", "Ingredient name")),
        )
        .subcommand(
            Command::new("search")
                .about("Search ingredients by name or supplier")
                .arg(req("q", "Search term"))
                .args(json_flags()),
        )
        .subcommand(Command::new("stats").about("Ingredient statistics").args(json_flags()))
        .subcommand(
            Command::new("duplicate")
                .about("Copy an ingredient under a new name")
                .arg(req("name", "Ingredient name")),
        )
        .subcommand(
            Command::new("by-supplier")
                .about("List ingredients from one supplier")
                .arg(req("supplier", "Supplier name"))
                .args(json_flags()),
        )
}

fn fixed_cmd() -> Command {
    Command::new("fixed")
        .about("Manage fixed monthly expenses")
        .subcommand(
            Command::new("add")
                .about("Register a fixed expense")
                .arg(req("name", "Expense name"))
                .arg(req("value", "Monthly value"))
                .arg(opt("description", "Free-form description"))
                .arg(flag("inactive", "Create the expense as inactive")),
        )
        .subcommand(
            Command::new("list")
                .about("List fixed expenses")
                .arg(flag("active", "Only active expenses"))
                .args(json_flags()),
        )
        .subcommand(
            Command::new("update")
                .about("Change a fixed expense")
                .arg(req("name", "Expense name"))
                .arg(opt("value", "New monthly value"))
                .arg(opt("description", "New description"))
                .arg(opt("rename", "New name")),
        )
        .subcommand(
            Command::new("rm")
                .about("Remove a fixed expense and its product links")
                .arg(req("name", "Expense name")),
        )
        .subcommand(
            Command::new("toggle")
                .about("Flip a fixed expense between active and inactive")
                .arg(req("name", "Expense name")),
        )
        .subcommand(
            Command::new("total")
                .about("Monthly total of active fixed expenses")
                .args(json_flags()),
        )
        .subcommand(Command::new("stats").about("Fixed expense statistics").args(json_flags()))
}

fn variable_cmd() -> Command {
    Command::new("variable")
        .about("Manage variable expenses (packaging, fuel, ...)")
        .subcommand(
            Command::new("add")
                .about("Register a variable expense")
                .arg(req("name", "Expense name"))
                .arg(req("value", "Value per unit"))
                .arg(req("unit", "Unit of measure"))
                .arg(opt("description", "Free-form description"))
                .arg(flag("inactive", "Create the expense as inactive")),
        )
        .subcommand(
            Command::new("list")
                .about("List variable expenses")
                .arg(flag("active", "Only active expenses"))
                .args(json_flags()),
        )
        .subcommand(
            Command::new("update")
                .about("Change a variable expense")
                .arg(req("name", "Expense name"))
                .arg(opt("value", "New value per unit"))
                .arg(opt("unit", "New unit of measure"))
                .arg(opt("description", "New description"))
                .arg(opt("rename", "New name")),
        )
        .subcommand(
            Command::new("rm")
                .about("Remove a variable expense and its product links")
                .arg(req("name", "Expense name")),
        )
        .subcommand(
            Command::new("toggle")
                .about("Flip a variable expense between active and inactive")
                .arg(req("name", "Expense name")),
        )
        .subcommand(
            Command::new("by-unit")
                .about("List variable expenses measured in one unit")
                .arg(req("unit", "Unit of measure"))
                .args(json_flags()),
        )
        .subcommand(Command::new("stats").about("Variable expense statistics").args(json_flags()))
}

fn line_kinds(verb: &'static str, with_quantity: bool) -> Command {
    let kind = |name: &'static str, about: &'static str, qty: bool| {
        let mut c = Command::new(name)
            .about(about)
            .arg(req("product", "Product name"))
            .arg(req("name", "Catalog entry name"));
        if qty {
            c = c.arg(req("quantity", "Quantity used per unit of product"));
        }
        c
    };
    Command::new(verb)
        .about(if with_quantity {
            "Attach a catalog entry to a product (replaces an existing link)"
        } else {
            "Detach a catalog entry from a product"
        })
        .subcommand(kind("ingredient", "Ingredient line", with_quantity))
        .subcommand(kind("fixed", "Fixed expense line", false))
        .subcommand(kind("variable", "Variable expense line", with_quantity))
}

fn product_cmd() -> Command {
    Command::new("product")
        .about("Manage products and calculate their prices")
        .subcommand(
            Command::new("add")
                .about("Register a product")
                .arg(req("name", "Product name"))
                .arg(req("prep-minutes", "Preparation time in minutes"))
                .arg(opt("margin", "Profit margin in percent (0-1000)"))
                .arg(opt("period", "Analysis period in days"))
                .arg(opt("description", "Free-form description")),
        )
        .subcommand(Command::new("list").about("List products").args(json_flags()))
        .subcommand(
            Command::new("update")
                .about("Change a product")
                .arg(req("name", "Product name"))
                .arg(opt("prep-minutes", "New preparation time in minutes"))
                .arg(opt("margin", "New profit margin in percent"))
                .arg(opt("period", "New analysis period in days"))
                .arg(opt("description", "New description"))
                .arg(opt("rename", "New name")),
        )
        .subcommand(
            Command::new("show")
                .about("Show a product and its lines")
                .arg(req("name", "Product name"))
                .args(json_flags()),
        )
        .subcommand(
            Command::new("rm")
                .about("Remove a product")
                .arg(req("name", "Product name")),
        )
        .subcommand(
            Command::new("search")
                .about("Search products by name or description")
                .arg(req("q", "Search term"))
                .args(json_flags()),
        )
        .subcommand(Command::new("stats").about("Product statistics").args(json_flags()))
        .subcommand(
            Command::new("duplicate")
                .about("Copy a product with all its lines")
                .arg(req("name", "Product name")),
        )
        .subcommand(line_kinds("link", true))
        .subcommand(line_kinds("unlink", false))
        .subcommand(
            Command::new("calculate")
                .about("Production cost, suggested price and period projection")
                .arg(req("name", "Product name"))
                .args(json_flags()),
        )
        .subcommand(
            Command::new("export")
                .about("Write the pricing report to a file")
                .arg(req("name", "Product name"))
                .arg(req("format", "json|csv"))
                .arg(req("out", "Output path")),
        )
}

fn config_cmd() -> Command {
    Command::new("config")
        .about("Read and write settings")
        .subcommand(
            Command::new("get")
                .about("Print one setting")
                .arg(req("key", "default_margin|default_period|currency_symbol")),
        )
        .subcommand(
            Command::new("set")
                .about("Store one setting")
                .arg(req("key", "default_margin|default_period|currency_symbol"))
                .arg(req("value", "Setting value")),
        )
        .subcommand(Command::new("list").about("Print all settings"))
}

pub fn build_cli() -> Command {
    Command::new("pricebook")
        .version(crate_version!())
        .about("Ingredient and expense costing with suggested sale prices")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Increase log output (-v info, -vv debug)"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(ingredient_cmd())
        .subcommand(fixed_cmd())
        .subcommand(variable_cmd())
        .subcommand(product_cmd())
        .subcommand(config_cmd())
        .subcommand(Command::new("doctor").about("Check the catalog for inconsistencies"))
}
