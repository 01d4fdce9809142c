// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{ADMIN, require_role};
use crate::app::App;
use crate::models::{AccountPatch, AccountType, NewAccount, User};
use crate::store::accounts;
use crate::utils::{fmt_money, id_for_account, maybe_print_json, parse_amount, pretty_table};
use anyhow::Result;

pub fn handle(app: &App, user: &User, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let typ: AccountType = sub.get_one::<String>("type").unwrap().parse()?;
            let opening = match sub.get_one::<String>("opening") {
                Some(s) => parse_amount(s)?,
                None => 0,
            };
            let account = app.ledger().open_account(
                user.id,
                &NewAccount {
                    name: sub.get_one::<String>("name").unwrap().clone(),
                    r#type: typ,
                    currency: sub.get_one::<String>("currency").unwrap().clone(),
                    opening_balance: opening,
                },
            )?;
            println!(
                "Added account '{}' ({}, {}) balance {}",
                account.name,
                account.r#type,
                account.currency,
                fmt_money(account.balance, &account.currency)
            );
        }
        Some(("list", sub)) => {
            let conn = app.conn()?;
            let data = if sub.get_flag("all") {
                require_role(user, ADMIN)?;
                accounts::find_all(&conn)?
            } else {
                accounts::find_by_user(&conn, user.id)?
            };
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|a| {
                        vec![
                            a.id.to_string(),
                            a.name.clone(),
                            a.r#type.to_string(),
                            a.currency.clone(),
                            fmt_money(a.balance, &a.currency),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Name", "Type", "Currency", "Balance"], rows)
                );
            }
        }
        Some(("update", sub)) => {
            let conn = app.conn()?;
            let id = id_for_account(&conn, user.id, sub.get_one::<String>("account").unwrap())?;
            let patch = AccountPatch {
                name: sub.get_one::<String>("name").cloned(),
                r#type: sub
                    .get_one::<String>("type")
                    .map(|s| s.parse())
                    .transpose()?,
                currency: sub.get_one::<String>("currency").cloned(),
            };
            let account = accounts::update(&conn, id, &patch)?;
            println!("Updated account '{}'", account.name);
        }
        Some(("rm", sub)) => {
            let conn = app.conn()?;
            let key = sub.get_one::<String>("account").unwrap();
            let id = id_for_account(&conn, user.id, key)?;
            accounts::delete(&conn, id)?;
            println!("Removed account '{}'", key);
        }
        _ => {}
    }
    Ok(())
}
