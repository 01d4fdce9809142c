// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{ADMIN, acting_user, require_role};
use crate::app::App;
use crate::models::{NewUser, Role};
use crate::store::users;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Result, anyhow};

/// Member management, admin only. Until the family has an admin there is
/// nobody to act as, so the first `user add` goes through unchecked.
pub fn handle(app: &App, as_email: Option<&str>, m: &clap::ArgMatches) -> Result<()> {
    let conn = app.conn()?;
    if users::first_admin(&conn)?.is_some() {
        require_role(&acting_user(app, as_email)?, ADMIN)?;
    }
    match m.subcommand() {
        Some(("add", sub)) => {
            let role: Role = sub.get_one::<String>("role").unwrap().parse()?;
            let user = users::insert(
                &conn,
                &NewUser {
                    name: sub.get_one::<String>("name").unwrap().clone(),
                    email: sub.get_one::<String>("email").unwrap().clone(),
                    role,
                },
            )?;
            println!("Added {} '{}' <{}> (id {})", user.role, user.name, user.email, user.id);
        }
        Some(("list", sub)) => {
            let data = users::find_all(&conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|u| {
                        vec![
                            u.id.to_string(),
                            u.name.clone(),
                            u.email.clone(),
                            u.role.to_string(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["ID", "Name", "Email", "Role"], rows));
            }
        }
        Some(("role", sub)) => {
            let email = sub.get_one::<String>("email").unwrap();
            let role: Role = sub.get_one::<String>("role").unwrap().parse()?;
            let user = users::find_by_email(&conn, email)?
                .ok_or_else(|| anyhow!("No member with email '{}'", email))?;
            let user = users::update_role(&conn, user.id, role)?;
            println!("'{}' is now {}", user.name, user.role);
        }
        Some(("rm", sub)) => {
            let email = sub.get_one::<String>("email").unwrap();
            let user = users::find_by_email(&conn, email)?
                .ok_or_else(|| anyhow!("No member with email '{}'", email))?;
            users::delete(&conn, user.id)?;
            println!("Removed '{}'", user.name);
        }
        _ => {}
    }
    Ok(())
}
