// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{ADMIN, optional_date, require_role};
use crate::app::App;
use crate::models::{Allowance, AllowancePatch, Role, User};
use crate::store::{allowances, users};
use crate::utils::{fmt_amount, maybe_print_json, parse_amount, parse_date, pretty_table};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

/// Admins manage allowances; other members only see their own.
pub fn handle(app: &App, user: &User, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("set" | "update" | "rm", _)) = m.subcommand() {
        require_role(user, ADMIN)?;
    }
    let conn = app.conn()?;
    match m.subcommand() {
        Some(("set", sub)) => {
            let member = member(&conn, sub.get_one::<String>("user").unwrap())?;
            let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
            let start = parse_date(sub.get_one::<String>("start").unwrap())?;
            let a = allowances::upsert(&conn, member.id, amount, start)?;
            println!(
                "Allowance for '{}': {} from {} (id {})",
                member.name,
                fmt_amount(a.amount),
                a.period_start,
                a.id
            );
        }
        Some(("list", sub)) => {
            let data = if user.role == Role::Admin {
                allowances::find_all(&conn)?
            } else {
                allowances::find_by_user(&conn, user.id)?.into_iter().collect()
            };
            print_allowances(&conn, sub, &data)?;
        }
        Some(("status", sub)) => {
            let who = match sub.get_one::<String>("user") {
                Some(email) => member(&conn, email)?,
                None => user.clone(),
            };
            if who.id != user.id {
                require_role(user, ADMIN)?;
            }
            let a = allowances::find_by_user(&conn, who.id)?
                .ok_or_else(|| anyhow!("'{}' has no allowance", who.name))?;
            print_allowances(&conn, sub, std::slice::from_ref(&a))?;
        }
        Some(("update", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let patch = AllowancePatch {
                amount: sub
                    .get_one::<String>("amount")
                    .map(|a| parse_amount(a))
                    .transpose()?,
                period_start: optional_date(sub, "start")?,
            };
            let a = allowances::update(&conn, id, &patch)?;
            println!("Updated allowance {} ({} from {})", a.id, fmt_amount(a.amount), a.period_start);
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            allowances::delete(&conn, id)?;
            println!("Removed allowance {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn member(conn: &Connection, email: &str) -> Result<User> {
    users::find_by_email(conn, email)?.ok_or_else(|| anyhow!("No member with email '{}'", email))
}

fn print_allowances(conn: &Connection, sub: &clap::ArgMatches, data: &[Allowance]) -> Result<()> {
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let mut rows = Vec::new();
        for a in data {
            let name = users::find_by_id(conn, a.user_id)?.name;
            rows.push(vec![
                a.id.to_string(),
                name,
                a.period_start.to_string(),
                fmt_amount(a.amount),
                fmt_amount(a.spent),
                fmt_amount(a.remaining),
            ]);
        }
        println!(
            "{}",
            pretty_table(&["ID", "Member", "From", "Amount", "Spent", "Remaining"], rows)
        );
    }
    Ok(())
}
