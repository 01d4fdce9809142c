// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{ADMIN, ADULTS, optional_date, require_role};
use crate::app::App;
use crate::models::{GoalStatus, NewSavingGoal, SavingGoalPatch, User};
use crate::store::goals;
use crate::utils::{fmt_amount, maybe_print_json, parse_amount, pretty_table};
use anyhow::Result;

/// Listing is open to adults; every change is admin only.
pub fn handle(app: &App, user: &User, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", _)) => require_role(user, ADULTS)?,
        _ => require_role(user, ADMIN)?,
    }
    let conn = app.conn()?;
    match m.subcommand() {
        Some(("add", sub)) => {
            let goal = goals::insert(
                &conn,
                &NewSavingGoal {
                    name: sub.get_one::<String>("name").unwrap().clone(),
                    target_amount: parse_amount(sub.get_one::<String>("target").unwrap())?,
                    target_date: optional_date(sub, "date")?,
                    priority: *sub.get_one::<i64>("priority").unwrap(),
                },
            )?;
            println!("Added goal '{}' (id {})", goal.name, goal.id);
        }
        Some(("list", sub)) => {
            let data = goals::find_all(&conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|g| {
                        vec![
                            g.id.to_string(),
                            g.name.clone(),
                            fmt_amount(g.current_amount),
                            fmt_amount(g.target_amount),
                            g.target_date.map(|d| d.to_string()).unwrap_or_default(),
                            g.priority.to_string(),
                            g.status.to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["ID", "Goal", "Saved", "Target", "By", "Priority", "Status"],
                        rows
                    )
                );
            }
        }
        Some(("contribute", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
            let goal = goals::contribute(&conn, id, amount)?;
            println!(
                "'{}': {} of {}{}",
                goal.name,
                fmt_amount(goal.current_amount),
                fmt_amount(goal.target_amount),
                if goal.status == GoalStatus::Completed { " (completed)" } else { "" }
            );
        }
        Some(("update", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let patch = SavingGoalPatch {
                name: sub.get_one::<String>("name").cloned(),
                target_amount: sub
                    .get_one::<String>("target")
                    .map(|a| parse_amount(a))
                    .transpose()?,
                target_date: optional_date(sub, "date")?,
                priority: sub.get_one::<i64>("priority").copied(),
                status: sub
                    .get_one::<String>("status")
                    .map(|s| s.parse())
                    .transpose()?,
            };
            let goal = goals::update(&conn, id, &patch)?;
            println!("Updated goal '{}'", goal.name);
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            goals::delete(&conn, id)?;
            println!("Removed goal {}", id);
        }
        _ => {}
    }
    Ok(())
}
