// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{ADULTS, require_role};
use crate::app::App;
use crate::models::{NewTransaction, TxKind, User};
use crate::utils::{id_for_account, id_for_category, parse_tags};
use anyhow::{Context, Result, anyhow};
use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use std::collections::{HashMap, hash_map::Entry};
use std::fs::File;
use std::io::Read;
use tracing::{info, warn};

/// Column order shared with the exporter.
pub const HEADER: [&str; 9] = [
    "date",
    "amount",
    "type",
    "description",
    "category",
    "account",
    "is_shared",
    "tags",
    "transfer_to",
];

#[derive(Debug, Default, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub errors: Vec<String>,
}

pub fn handle(app: &App, user: &User, m: &clap::ArgMatches) -> Result<()> {
    require_role(user, ADULTS)?;
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let path = sub.get_one::<String>("path").unwrap().trim();
            let file = File::open(path).with_context(|| format!("Open CSV {}", path))?;
            let summary = import_transactions(app, user, file)?;
            println!("Imported {} transaction(s) from {}", summary.imported, path);
            for e in &summary.errors {
                eprintln!("  {}", e);
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Each row goes through the ledger on its own; bad rows are reported as
/// `row N: ...` (N counts the header as row 1) and skipped.
pub fn import_transactions<R: Read>(app: &App, user: &User, input: R) -> Result<ImportSummary> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);
    let mut summary = ImportSummary::default();
    let mut accounts: HashMap<String, i64> = HashMap::new();
    let mut categories: HashMap<String, i64> = HashMap::new();

    for (i, result) in rdr.records().enumerate() {
        let row = i + 2;
        let outcome = result
            .map_err(anyhow::Error::from)
            .and_then(|rec| request_from_record(app, user, &rec, &mut accounts, &mut categories))
            .and_then(|req| Ok(app.ledger().create_transaction(user.id, &req)?));
        match outcome {
            Ok(_) => summary.imported += 1,
            Err(e) => {
                warn!(row, error = %e, "import row rejected");
                summary.errors.push(format!("row {}: {}", row, e));
            }
        }
    }
    info!(imported = summary.imported, rejected = summary.errors.len(), "import finished");
    Ok(summary)
}

fn cached(
    cache: &mut HashMap<String, i64>,
    key: &str,
    lookup: impl FnOnce() -> crate::error::Result<i64>,
) -> Result<i64> {
    Ok(match cache.entry(key.to_string()) {
        Entry::Occupied(entry) => *entry.get(),
        Entry::Vacant(entry) => *entry.insert(lookup()?),
    })
}

fn request_from_record(
    app: &App,
    user: &User,
    rec: &StringRecord,
    accounts: &mut HashMap<String, i64>,
    categories: &mut HashMap<String, i64>,
) -> Result<NewTransaction> {
    if rec.len() < 6 {
        return Err(anyhow!("insufficient columns"));
    }
    let field = |i: usize| rec.get(i).unwrap_or("").trim();
    let conn = app.conn()?;

    let amount: i64 = field(1)
        .parse()
        .map_err(|_| anyhow!("invalid amount '{}'", field(1)))?;
    let kind: TxKind = field(2).parse()?;
    let account = field(5);
    let account_id = cached(accounts, account, || id_for_account(&conn, user.id, account))?;

    let mut req = NewTransaction::new(account_id, amount, kind, field(0));
    req.description = field(3).to_string();
    let category = field(4);
    if !category.is_empty() {
        req.category_id = Some(cached(categories, category, || {
            id_for_category(&conn, category)
        })?);
    }
    req.is_shared = match field(6) {
        "" => true,
        s => s
            .parse()
            .map_err(|_| anyhow!("invalid is_shared '{}'", s))?,
    };
    req.tags = parse_tags(field(7));
    let dest = field(8);
    if !dest.is_empty() {
        req.transfer_to_account_id =
            Some(cached(accounts, dest, || id_for_account(&conn, user.id, dest))?);
    }
    Ok(req)
}
