// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{ADMIN, optional_date, require_role, today_arg, transactions::table};
use crate::app::App;
use crate::models::{SearchFilters, User};
use crate::store::reports;
use crate::utils::{
    fmt_amount, fmt_money, id_for_account, id_for_category, maybe_print_json, parse_amount,
    parse_month, parse_tags, pretty_table,
};
use anyhow::Result;
use rusqlite::Connection;

/// Family-wide views (`by-member`, `--family`) are admin only.
pub fn handle(app: &App, user: &User, m: &clap::ArgMatches) -> Result<()> {
    if let Some((name, sub)) = m.subcommand() {
        let family = sub.try_get_one::<bool>("family").ok().flatten().copied().unwrap_or(false);
        if name == "by-member" || family {
            require_role(user, ADMIN)?;
        }
    }
    let conn = app.conn()?;
    match m.subcommand() {
        Some(("monthly", sub)) => monthly(&conn, user, sub)?,
        Some(("by-category", sub)) => by_category(&conn, user, sub)?,
        Some(("by-member", sub)) => by_member(&conn, sub)?,
        Some(("trends", sub)) => trends(&conn, user, sub)?,
        Some(("dashboard", sub)) => dashboard(&conn, user, sub)?,
        Some(("search", sub)) => search(&conn, user, sub)?,
        _ => {}
    }
    Ok(())
}

fn scope(user: &User, sub: &clap::ArgMatches) -> Option<i64> {
    if sub.get_flag("family") { None } else { Some(user.id) }
}

fn monthly(conn: &Connection, user: &User, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = parse_month(sub.get_one::<String>("month").unwrap())?;
    let s = reports::month_summary(conn, scope(user, sub), year, month)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        let rows = vec![vec![
            format!("{}-{:02}", s.year, s.month),
            fmt_amount(s.total_income),
            fmt_amount(s.total_expense),
            fmt_amount(s.net),
        ]];
        println!("{}", pretty_table(&["Month", "Income", "Expense", "Net"], rows));
    }
    Ok(())
}

fn by_category(conn: &Connection, user: &User, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = parse_month(sub.get_one::<String>("month").unwrap())?;
    let data = reports::spending_by_category(conn, scope(user, sub), year, month)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|c| {
                vec![
                    c.category_name.clone(),
                    fmt_amount(c.total_amount),
                    format!("{}%", c.percentage),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Category", "Spent", "Share"], rows));
    }
    Ok(())
}

fn by_member(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = parse_month(sub.get_one::<String>("month").unwrap())?;
    let data = reports::spending_by_member(conn, year, month)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.user_name.clone(),
                    fmt_amount(r.total_income),
                    fmt_amount(r.total_expense),
                    fmt_amount(r.net),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Member", "Income", "Expense", "Net"], rows));
    }
    Ok(())
}

fn trends(conn: &Connection, user: &User, sub: &clap::ArgMatches) -> Result<()> {
    let months = *sub.get_one::<u32>("months").unwrap();
    let data = reports::trends(conn, scope(user, sub), months, today_arg(sub)?)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|p| {
                vec![
                    format!("{}-{:02}", p.year, p.month),
                    fmt_amount(p.total_income),
                    fmt_amount(p.total_expense),
                    fmt_amount(p.net),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Month", "Income", "Expense", "Net"], rows));
    }
    Ok(())
}

fn dashboard(conn: &Connection, user: &User, sub: &clap::ArgMatches) -> Result<()> {
    let d = reports::dashboard(conn, user.id, today_arg(sub)?)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &d)? {
        let accounts = d
            .accounts
            .iter()
            .map(|a| vec![a.name.clone(), fmt_money(a.balance, &a.currency)])
            .collect();
        println!("{}", pretty_table(&["Account", "Balance"], accounts));
        let s = &d.month_summary;
        println!(
            "{}-{:02}: income {} expense {} net {}",
            s.year,
            s.month,
            fmt_amount(s.total_income),
            fmt_amount(s.total_expense),
            fmt_amount(s.net)
        );
        println!("{}", table(&d.recent_transactions));
    }
    Ok(())
}

fn search(conn: &Connection, user: &User, sub: &clap::ArgMatches) -> Result<()> {
    let filters = SearchFilters {
        user_id: scope(user, sub),
        description: sub.get_one::<String>("q").cloned(),
        min_amount: sub
            .get_one::<String>("min")
            .map(|a| parse_amount(a))
            .transpose()?,
        max_amount: sub
            .get_one::<String>("max")
            .map(|a| parse_amount(a))
            .transpose()?,
        start_date: optional_date(sub, "from")?,
        end_date: optional_date(sub, "to")?,
        category_id: sub
            .get_one::<String>("category")
            .map(|c| id_for_category(conn, c))
            .transpose()?,
        account_id: sub
            .get_one::<String>("account")
            .map(|a| id_for_account(conn, user.id, a))
            .transpose()?,
        tags: sub
            .get_one::<String>("tags")
            .map(|t| parse_tags(t))
            .unwrap_or_default(),
    };
    let result = reports::search(conn, &filters)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &result)? {
        println!("{}", table(&result.transactions));
        println!("{} match(es)", result.total_count);
    }
    Ok(())
}
