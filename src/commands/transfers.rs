// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{ADULTS, require_role};
use crate::app::App;
use crate::models::{TransferRequest, User};
use crate::utils::{fmt_amount, id_for_account, maybe_print_json, parse_amount};
use anyhow::Result;

pub fn handle(app: &App, user: &User, m: &clap::ArgMatches) -> Result<()> {
    require_role(user, ADULTS)?;
    let req = {
        let conn = app.conn()?;
        TransferRequest {
            from_account_id: id_for_account(&conn, user.id, m.get_one::<String>("from").unwrap())?,
            to_account_id: id_for_account(&conn, user.id, m.get_one::<String>("to").unwrap())?,
            amount: parse_amount(m.get_one::<String>("amount").unwrap())?,
            description: m.get_one::<String>("description").unwrap().clone(),
            date: m.get_one::<String>("date").unwrap().trim().to_string(),
        }
    };
    let tx = app.ledger().create_transfer(user.id, &req)?;
    if !maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &tx)? {
        println!(
            "Transferred {} from account {} to account {} on {} (id {})",
            fmt_amount(req.amount),
            req.from_account_id,
            req.to_account_id,
            tx.date,
            tx.id
        );
    }
    Ok(())
}
