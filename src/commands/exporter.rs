// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::reports::product_report;
use crate::engine::PricingReport;
use crate::utils::required;
use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => bail!("Unknown format: {} (use csv|json)", other),
        }
    }
}

/// `product export`: the format is checked before the report is built or
/// anything is written.
pub fn export(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let format = ExportFormat::parse(&required(sub, "format")?)?;
    let name = required(sub, "name")?;
    let out = required(sub, "out")?;
    let report = product_report(conn, &name)?;
    write_report(&report, format, Path::new(&out))?;
    info!(product = report.product_id, path = %out, ?format, "report exported");
    println!("Exported '{}' to {}", report.name, out);
    Ok(())
}

pub fn write_report(report: &PricingReport, format: ExportFormat, out: &Path) -> Result<()> {
    match format {
        ExportFormat::Json => {
            let body = serde_json::to_string_pretty(report)?;
            std::fs::write(out, body).with_context(|| format!("Write {}", out.display()))?;
        }
        ExportFormat::Csv => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Write {}", out.display()))?;
            write_csv(&mut wtr, report)?;
            wtr.flush()?;
        }
    }
    Ok(())
}

// One table: line rows first, then one row per summary figure.
fn write_csv<W: std::io::Write>(wtr: &mut csv::Writer<W>, r: &PricingReport) -> Result<()> {
    wtr.write_record(["section", "item", "quantity", "unit", "unit_price", "amount"])?;
    let d = &r.line_detail;
    for l in &d.ingredients {
        wtr.write_record([
            "ingredient".to_string(),
            l.name.clone(),
            l.quantity.to_string(),
            l.unit.clone(),
            l.unit_price.to_string(),
            l.line_cost.to_string(),
        ])?;
    }
    for l in &d.fixed_expenses {
        wtr.write_record([
            "fixed_expense".to_string(),
            l.name.clone(),
            r.analysis_period_days.to_string(),
            "day".to_string(),
            l.monthly_value.to_string(),
            l.prorated_cost.to_string(),
        ])?;
    }
    for l in &d.variable_expenses {
        wtr.write_record([
            "variable_expense".to_string(),
            l.name.clone(),
            l.quantity.to_string(),
            l.unit.clone(),
            l.unit_price.to_string(),
            l.line_cost.to_string(),
        ])?;
    }

    let c = &r.costs;
    let p = &r.pricing;
    let j = &r.projection;
    let summary = [
        ("cost", "ingredients", c.ingredients.to_string()),
        ("cost", "fixed", c.fixed.to_string()),
        ("cost", "variable", c.variable.to_string()),
        ("cost", "total", c.total.to_string()),
        ("pricing", "suggested_price", p.suggested_price.to_string()),
        ("pricing", "margin_percent", p.margin_percent.to_string()),
        ("pricing", "margin_value", p.margin_value.to_string()),
        ("pricing", "markup_percent", p.markup_percent.to_string()),
        ("projection", "assumed_quantity", j.assumed_quantity.to_string()),
        ("projection", "revenue", j.revenue.to_string()),
        ("projection", "total_cost", j.total_cost.to_string()),
        ("projection", "profit", j.profit.to_string()),
        ("projection", "roi_percent", j.roi_percent.to_string()),
    ];
    for (section, item, amount) in summary {
        wtr.write_record([section, item, "", "", "", amount.as_str()])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names_are_case_insensitive() {
        assert_eq!(ExportFormat::parse(" JSON ").unwrap(), ExportFormat::Json);
        assert_eq!(ExportFormat::parse("csv").unwrap(), ExportFormat::Csv);
        let err = ExportFormat::parse("xml").unwrap_err();
        assert!(err.to_string().contains("Unknown format: xml"));
    }
}
