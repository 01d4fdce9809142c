// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{ADULTS, optional_date, require_role};
use crate::app::App;
use crate::models::{
    NewTransaction, RecurringRule, Transaction, TransactionFilters, TransactionPatch, TxKind, User,
};
use crate::utils::{
    fmt_amount, id_for_account, id_for_category, maybe_print_json, month_bounds, parse_amount,
    parse_date, parse_month, parse_tags, pretty_table,
};
use anyhow::Result;
use chrono::Duration;

pub fn handle(app: &App, user: &User, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(app, user, sub)?,
        Some(("list", sub)) => list(app, user, sub)?,
        Some(("show", sub)) => show(app, sub)?,
        Some(("update", sub)) => update(app, user, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            app.ledger().delete_transaction(id)?;
            println!("Deleted transaction {}", id);
        }
        Some(("generate", sub)) => {
            require_role(user, ADULTS)?;
            generate(app, user, sub)?
        }
        _ => {}
    }
    Ok(())
}

/// Builds the create request from `tx add` arguments.
pub fn request_from_args(app: &App, user: &User, sub: &clap::ArgMatches) -> Result<NewTransaction> {
    let conn = app.conn()?;
    let date = sub.get_one::<String>("date").unwrap().trim().to_string();
    let account_id = id_for_account(&conn, user.id, sub.get_one::<String>("account").unwrap())?;
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let kind: TxKind = sub.get_one::<String>("kind").unwrap().parse()?;

    let mut req = NewTransaction::new(account_id, amount, kind, date);
    req.category_id = sub
        .get_one::<String>("category")
        .map(|c| id_for_category(&conn, c))
        .transpose()?;
    req.description = sub.get_one::<String>("description").unwrap().clone();
    req.is_shared = sub.get_flag("shared");
    req.tags = sub
        .get_one::<String>("tags")
        .map(|t| parse_tags(t))
        .unwrap_or_default();
    req.transfer_to_account_id = sub
        .get_one::<String>("to")
        .map(|a| id_for_account(&conn, user.id, a))
        .transpose()?;
    if let Some(freq) = sub.get_one::<String>("recurring") {
        let mut rule = RecurringRule::new(freq.parse()?);
        rule.day = sub.get_one::<u32>("day").copied();
        rule.day_of_week = sub.get_one::<u32>("weekday").copied();
        req.is_recurring = true;
        req.recurring_rule = Some(rule);
    }
    Ok(req)
}

fn add(app: &App, user: &User, sub: &clap::ArgMatches) -> Result<()> {
    let req = request_from_args(app, user, sub)?;
    let tx = app.ledger().create_transaction(user.id, &req)?;
    println!(
        "Recorded {} {} on {} (id {}){}",
        tx.kind,
        fmt_amount(tx.amount),
        tx.date,
        tx.id,
        if tx.is_template() { " as recurring template" } else { "" }
    );
    Ok(())
}

fn list(app: &App, user: &User, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(app, user, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        println!("{}", table(&data));
    }
    Ok(())
}

pub fn query_rows(app: &App, user: &User, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    let conn = app.conn()?;
    let mut filters = TransactionFilters {
        account_id: sub
            .get_one::<String>("account")
            .map(|a| id_for_account(&conn, user.id, a))
            .transpose()?,
        category_id: sub
            .get_one::<String>("category")
            .map(|c| id_for_category(&conn, c))
            .transpose()?,
        kind: sub
            .get_one::<String>("kind")
            .map(|k| k.parse())
            .transpose()?,
        start_date: optional_date(sub, "from")?,
        end_date: optional_date(sub, "to")?,
        is_shared: sub.get_one::<bool>("shared").copied(),
        limit: sub.get_one::<usize>("limit").copied(),
    };
    drop(conn);
    if let Some(month) = sub.get_one::<String>("month") {
        let (y, m) = parse_month(month)?;
        let (start, next) = month_bounds(y, m)?;
        filters.start_date = Some(start);
        filters.end_date = Some(next - Duration::days(1));
    }
    Ok(app.ledger().list_transactions(user.id, &filters)?)
}

pub(crate) fn table(data: &[Transaction]) -> comfy_table::Table {
    let rows = data
        .iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                t.date.to_string(),
                t.kind.to_string(),
                fmt_amount(t.amount),
                t.account_id.to_string(),
                t.transfer_to_account_id.map(|a| a.to_string()).unwrap_or_default(),
                t.category_id.map(|c| c.to_string()).unwrap_or_default(),
                t.description.clone(),
                t.tags.join(","),
            ]
        })
        .collect();
    pretty_table(
        &["ID", "Date", "Kind", "Amount", "Account", "To", "Category", "Description", "Tags"],
        rows,
    )
}

fn show(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let tx = app.ledger().get_transaction(*sub.get_one::<i64>("id").unwrap())?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &tx)? {
        println!("{}", table(std::slice::from_ref(&tx)));
    }
    Ok(())
}

fn update(app: &App, user: &User, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let patch = {
        let conn = app.conn()?;
        TransactionPatch {
            account_id: sub
                .get_one::<String>("account")
                .map(|a| id_for_account(&conn, user.id, a))
                .transpose()?,
            category_id: sub
                .get_one::<String>("category")
                .map(|c| id_for_category(&conn, c))
                .transpose()?,
            amount: sub
                .get_one::<String>("amount")
                .map(|a| parse_amount(a))
                .transpose()?,
            description: sub.get_one::<String>("description").cloned(),
            date: sub.get_one::<String>("date").cloned(),
            is_shared: sub.get_one::<bool>("shared").copied(),
            tags: sub.get_one::<String>("tags").map(|t| parse_tags(t)),
        }
    };
    let tx = app.ledger().update_transaction(id, &patch)?;
    println!("Updated transaction {} ({} on {})", tx.id, fmt_amount(tx.amount), tx.date);
    Ok(())
}

fn generate(app: &App, user: &User, sub: &clap::ArgMatches) -> Result<()> {
    let until = parse_date(sub.get_one::<String>("until").unwrap())?;
    let report = app.ledger().generate_recurring(user.id, until)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        println!(
            "Generated {} occurrence(s) from {} template(s)",
            report.generated, report.templates_considered
        );
        for e in &report.errors {
            eprintln!("  {}", e);
        }
    }
    Ok(())
}
