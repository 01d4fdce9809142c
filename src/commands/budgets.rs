// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{ADMIN, ADULTS, require_role};
use crate::app::App;
use crate::models::User;
use crate::store::{budgets, categories};
use crate::utils::{fmt_amount, id_for_category, maybe_print_json, parse_amount, parse_month, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(app: &App, user: &User, m: &clap::ArgMatches) -> Result<()> {
    let conn = app.conn()?;
    match m.subcommand() {
        Some(("set", sub)) => {
            require_role(user, ADMIN)?;
            set(&conn, sub)?
        }
        Some(("list", sub)) => {
            require_role(user, ADULTS)?;
            list(&conn, sub)?
        }
        Some(("summary", sub)) => {
            require_role(user, ADULTS)?;
            summary(&conn, sub)?
        }
        Some(("rm", sub)) => {
            require_role(user, ADMIN)?;
            let id = *sub.get_one::<i64>("id").unwrap();
            budgets::delete(&conn, id)?;
            println!("Removed budget {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = sub.get_one::<String>("month").unwrap();
    let (year, mon) = parse_month(month)?;
    let cat = sub.get_one::<String>("category").unwrap();
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let cat_id = id_for_category(conn, cat)?;
    budgets::upsert(conn, cat_id, amount, year, mon)?;
    println!("Budget set for {} / {} = {}", month, cat, fmt_amount(amount));
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let period = sub
        .get_one::<String>("month")
        .map(|m| parse_month(m))
        .transpose()?;
    let data = budgets::find(conn, period)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let names = categories::find_all(conn)?;
        let rows = data
            .iter()
            .map(|b| {
                let cat = names
                    .iter()
                    .find(|c| c.id == b.category_id)
                    .map(|c| c.name.clone())
                    .unwrap_or_default();
                vec![
                    b.id.to_string(),
                    format!("{}-{:02}", b.year, b.month),
                    cat,
                    fmt_amount(b.amount),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["ID", "Month", "Category", "Budget"], rows));
    }
    Ok(())
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = parse_month(sub.get_one::<String>("month").unwrap())?;
    let data = budgets::summary(conn, year, month)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|s| {
                vec![
                    s.category_name.clone(),
                    fmt_amount(s.budget_amount),
                    fmt_amount(s.actual_amount),
                    fmt_amount(s.remaining),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Category", "Budget", "Spent", "Remaining"], rows)
        );
    }
    Ok(())
}
