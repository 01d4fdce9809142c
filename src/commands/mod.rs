// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod allowances;
pub mod bills;
pub mod budgets;
pub mod categories;
pub mod exporter;
pub mod goals;
pub mod importer;
pub mod reports;
pub mod transactions;
pub mod transfers;
pub mod users;

use crate::app::App;
use crate::error::Error;
use crate::models::{Role, User};
use crate::store::users as user_store;
use crate::utils::parse_date;
use anyhow::{Result, anyhow};
use chrono::NaiveDate;

/// The member a command acts for: `--as <email>`, else the first admin.
pub fn acting_user(app: &App, email: Option<&str>) -> Result<User> {
    let conn = app.conn()?;
    match email {
        Some(e) => user_store::find_by_email(&conn, e)?
            .ok_or_else(|| anyhow!("No member with email '{}'", e.trim())),
        None => user_store::first_admin(&conn)?.ok_or_else(|| {
            anyhow!("No admin yet; create one with `fambudg user add --role admin`")
        }),
    }
}

pub const ADMIN: &[Role] = &[Role::Admin];
pub const ADULTS: &[Role] = &[Role::Admin, Role::Member];

/// Refuses the command unless the acting member holds one of `allowed`.
pub fn require_role(user: &User, allowed: &[Role]) -> crate::error::Result<()> {
    if allowed.contains(&user.role) {
        return Ok(());
    }
    Err(Error::forbidden(format!(
        "'{}' is {}, this needs {}",
        user.email,
        user.role,
        allowed
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(" or ")
    )))
}

/// `--today` if given, else the local date.
pub(crate) fn today_arg(sub: &clap::ArgMatches) -> Result<NaiveDate> {
    match sub.get_one::<String>("today") {
        Some(s) => Ok(parse_date(s)?),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

pub(crate) fn optional_date(sub: &clap::ArgMatches, id: &str) -> Result<Option<NaiveDate>> {
    Ok(sub
        .get_one::<String>(id)
        .map(|s| parse_date(s))
        .transpose()?)
}
