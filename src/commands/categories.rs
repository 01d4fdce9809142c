// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{ADMIN, ADULTS, require_role};
use crate::app::App;
use crate::models::{CategoryKind, CategoryPatch, NewCategory, User};
use crate::store::categories;
use crate::utils::{id_for_category, maybe_print_json, pretty_table};
use anyhow::Result;

pub fn handle(app: &App, user: &User, m: &clap::ArgMatches) -> Result<()> {
    let conn = app.conn()?;
    match m.subcommand() {
        Some(("add", sub)) => {
            require_role(user, ADULTS)?;
            let kind: CategoryKind = sub.get_one::<String>("kind").unwrap().parse()?;
            let parent_id = sub
                .get_one::<String>("parent")
                .map(|p| id_for_category(&conn, p))
                .transpose()?;
            let cat = categories::insert(
                &conn,
                &NewCategory {
                    parent_id,
                    name: sub.get_one::<String>("name").unwrap().clone(),
                    kind,
                    icon: sub.get_one::<String>("icon").cloned(),
                    sort_order: *sub.get_one::<i64>("sort").unwrap(),
                },
            )?;
            println!("Added category '{}' ({}, id {})", cat.name, cat.kind, cat.id);
        }
        Some(("list", sub)) => {
            let data = categories::find_all(&conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|c| {
                        let parent = c
                            .parent_id
                            .and_then(|p| data.iter().find(|x| x.id == p))
                            .map(|x| x.name.clone())
                            .unwrap_or_default();
                        vec![
                            c.id.to_string(),
                            c.name.clone(),
                            c.kind.to_string(),
                            parent,
                            c.icon.clone().unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Category", "Kind", "Parent", "Icon"], rows)
                );
            }
        }
        Some(("update", sub)) => {
            require_role(user, ADMIN)?;
            let id = id_for_category(&conn, sub.get_one::<String>("category").unwrap())?;
            let patch = CategoryPatch {
                name: sub.get_one::<String>("name").cloned(),
                icon: sub.get_one::<String>("icon").cloned(),
                sort_order: sub.get_one::<i64>("sort").copied(),
            };
            let cat = categories::update(&conn, id, &patch)?;
            println!("Updated category '{}'", cat.name);
        }
        Some(("rm", sub)) => {
            require_role(user, ADMIN)?;
            let key = sub.get_one::<String>("category").unwrap();
            let id = id_for_category(&conn, key)?;
            categories::delete(&conn, id)?;
            println!("Removed category '{}'", key);
        }
        _ => {}
    }
    Ok(())
}
