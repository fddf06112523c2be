// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::snapshot::{MAX_COUNT, MAX_MARGIN_PERCENT};
use crate::error::EngineError;
use crate::utils::{
    KNOWN_SETTINGS, SETTING_CURRENCY_SYMBOL, SETTING_DEFAULT_MARGIN, SETTING_DEFAULT_PERIOD,
    currency_symbol, default_margin, default_period, parse_count, parse_non_negative,
    pretty_table, required, set_setting,
};
use anyhow::{Result, bail};
use rusqlite::Connection;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => {
            let key = required(sub, "key")?;
            println!("{}", effective(conn, &key)?);
        }
        Some(("set", sub)) => {
            let key = required(sub, "key")?;
            let value = required(sub, "value")?;
            let stored = set(conn, &key, &value)?;
            println!("{} = {}", key, stored);
        }
        Some(("list", _)) => {
            let mut rows = Vec::new();
            for key in KNOWN_SETTINGS {
                rows.push(vec![key.to_string(), effective(conn, key)?]);
            }
            println!("{}", pretty_table(&["Setting", "Value"], rows));
        }
        _ => {}
    }
    Ok(())
}

/// The stored value, or the built-in default when none is stored.
pub fn effective(conn: &Connection, key: &str) -> Result<String> {
    Ok(match key {
        SETTING_DEFAULT_MARGIN => default_margin(conn)?.to_string(),
        SETTING_DEFAULT_PERIOD => default_period(conn)?.to_string(),
        SETTING_CURRENCY_SYMBOL => currency_symbol(conn)?,
        other => bail!(
            "Unknown setting '{}' (known: {})",
            other,
            KNOWN_SETTINGS.join(", ")
        ),
    })
}

/// Validates and stores a setting, returning the normalized value.
pub fn set(conn: &Connection, key: &str, value: &str) -> Result<String> {
    let stored = match key {
        SETTING_DEFAULT_MARGIN => {
            let m = parse_non_negative("default_margin", value)?;
            if m > MAX_MARGIN_PERCENT {
                return Err(EngineError::invalid_input(
                    "default_margin",
                    format!("must be between 0 and {}", MAX_MARGIN_PERCENT),
                )
                .into());
            }
            m.to_string()
        }
        SETTING_DEFAULT_PERIOD => {
            let p = parse_count("default_period", value)?;
            if p <= 0 || p > MAX_COUNT {
                return Err(EngineError::invalid_input(
                    "default_period",
                    format!("must be between 1 and {}", MAX_COUNT),
                )
                .into());
            }
            p.to_string()
        }
        SETTING_CURRENCY_SYMBOL => {
            let s = value.trim();
            if s.is_empty() {
                return Err(EngineError::invalid_input("currency_symbol", "must not be empty").into());
            }
            s.to_string()
        }
        other => bail!(
            "Unknown setting '{}' (known: {})",
            other,
            KNOWN_SETTINGS.join(", ")
        ),
    };
    set_setting(conn, key, &stored)?;
    info!(key, value = %stored, "setting stored");
    Ok(stored)
}
