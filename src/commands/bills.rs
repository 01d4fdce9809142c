// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{ADMIN, ADULTS, require_role, today_arg};
use crate::app::App;
use crate::models::{BillReminder, BillReminderPatch, NewBillReminder, PayBillRequest, User};
use crate::store::bills;
use crate::utils::{
    fmt_amount, id_for_account, id_for_category, maybe_print_json, parse_amount, pretty_table,
};
use anyhow::Result;

pub fn handle(app: &App, user: &User, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list" | "upcoming" | "pay", _)) => require_role(user, ADULTS)?,
        _ => require_role(user, ADMIN)?,
    }
    match m.subcommand() {
        Some(("add", sub)) => {
            let conn = app.conn()?;
            let bill = bills::insert(
                &conn,
                &NewBillReminder {
                    name: sub.get_one::<String>("name").unwrap().clone(),
                    amount: parse_amount(sub.get_one::<String>("amount").unwrap())?,
                    due_day: *sub.get_one::<u32>("due-day").unwrap(),
                    frequency: sub.get_one::<String>("frequency").unwrap().parse()?,
                    category_id: sub
                        .get_one::<String>("category")
                        .map(|c| id_for_category(&conn, c))
                        .transpose()?,
                    account_id: sub
                        .get_one::<String>("account")
                        .map(|a| id_for_account(&conn, user.id, a))
                        .transpose()?,
                    next_due_date: sub.get_one::<String>("next-due").unwrap().clone(),
                },
            )?;
            println!(
                "Added bill '{}' ({} {}, next due {})",
                bill.name,
                fmt_amount(bill.amount),
                bill.frequency,
                bill.next_due_date
            );
        }
        Some(("list", sub)) => {
            let data = bills::find_all(&*app.conn()?)?;
            print_bills(sub, &data)?;
        }
        Some(("upcoming", sub)) => {
            let today = today_arg(sub)?;
            let days = *sub.get_one::<u32>("days").unwrap();
            let data = bills::find_upcoming(&*app.conn()?, today, days)?;
            print_bills(sub, &data)?;
        }
        Some(("update", sub)) => {
            let conn = app.conn()?;
            let id = *sub.get_one::<i64>("id").unwrap();
            let patch = BillReminderPatch {
                name: sub.get_one::<String>("name").cloned(),
                amount: sub
                    .get_one::<String>("amount")
                    .map(|a| parse_amount(a))
                    .transpose()?,
                due_day: sub.get_one::<u32>("due-day").copied(),
                frequency: sub
                    .get_one::<String>("frequency")
                    .map(|f| f.parse())
                    .transpose()?,
                category_id: sub
                    .get_one::<String>("category")
                    .map(|c| id_for_category(&conn, c))
                    .transpose()?,
                account_id: sub
                    .get_one::<String>("account")
                    .map(|a| id_for_account(&conn, user.id, a))
                    .transpose()?,
                is_active: sub.get_one::<bool>("active").copied(),
            };
            let bill = bills::update(&conn, id, &patch)?;
            println!("Updated bill '{}'", bill.name);
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            bills::delete(&*app.conn()?, id)?;
            println!("Removed bill {}", id);
        }
        Some(("pay", sub)) => {
            let bill_id = *sub.get_one::<i64>("id").unwrap();
            let account_id = {
                let conn = app.conn()?;
                id_for_account(&conn, user.id, sub.get_one::<String>("account").unwrap())?
            };
            let req = PayBillRequest {
                account_id,
                date: sub.get_one::<String>("date").unwrap().trim().to_string(),
            };
            let (tx, bill) = app.ledger().pay_bill(user.id, bill_id, &req)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &tx)? {
                println!(
                    "Paid '{}' ({}) as transaction {}; next due {}",
                    bill.name,
                    fmt_amount(-tx.amount),
                    tx.id,
                    bill.next_due_date
                );
            }
        }
        _ => {}
    }
    Ok(())
}

fn print_bills(sub: &clap::ArgMatches, data: &[BillReminder]) -> Result<()> {
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|b| {
                vec![
                    b.id.to_string(),
                    b.name.clone(),
                    fmt_amount(b.amount),
                    b.frequency.to_string(),
                    b.due_day.to_string(),
                    b.next_due_date.to_string(),
                    if b.is_active { "yes" } else { "no" }.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Bill", "Amount", "Frequency", "Due day", "Next due", "Active"],
                rows
            )
        );
    }
    Ok(())
}
