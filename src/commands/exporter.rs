// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::importer::HEADER;
use super::{ADULTS, optional_date, require_role};
use crate::app::App;
use crate::models::{Transaction, TransactionFilters, User};
use anyhow::{Result, bail};
use std::io::Write;

pub fn handle(app: &App, user: &User, m: &clap::ArgMatches) -> Result<()> {
    require_role(user, ADULTS)?;
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(app, user, sub),
        _ => Ok(()),
    }
}

fn export_transactions(app: &App, user: &User, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let mut data = app.ledger().list_transactions(
        user.id,
        &TransactionFilters {
            start_date: optional_date(sub, "from")?,
            end_date: optional_date(sub, "to")?,
            ..TransactionFilters::default()
        },
    )?;
    // Oldest first, so a re-import replays in order.
    data.reverse();

    match fmt.as_str() {
        "csv" => write_csv(std::fs::File::create(out)?, &data)?,
        "json" => std::fs::write(out, serde_json::to_string_pretty(&data)?)?,
        _ => bail!("Unknown format: {} (use csv|json)", fmt),
    }
    println!("Exported {} transaction(s) to {}", data.len(), out);
    Ok(())
}

/// Amounts are written in minor units, the form the importer reads back.
pub fn write_csv<W: Write>(out: W, data: &[Transaction]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(HEADER)?;
    for t in data {
        wtr.write_record([
            t.date.to_string(),
            t.amount.to_string(),
            t.kind.to_string(),
            t.description.clone(),
            t.category_id.map(|c| c.to_string()).unwrap_or_default(),
            t.account_id.to_string(),
            t.is_shared.to_string(),
            t.tags.join(","),
            t.transfer_to_account_id.map(|a| a.to_string()).unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
