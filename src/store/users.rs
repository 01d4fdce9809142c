// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{Error, Result};
use crate::models::{NewUser, Role, User};
use rusqlite::{Connection, OptionalExtension, Row, params};

const COLUMNS: &str = "id, name, email, role, created_at";

fn map_row(r: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: r.get(0)?,
        name: r.get(1)?,
        email: r.get(2)?,
        role: r.get(3)?,
        created_at: r.get(4)?,
    })
}

pub fn insert(conn: &Connection, user: &NewUser) -> Result<User> {
    let email = user.email.trim().to_lowercase();
    if user.name.trim().is_empty() {
        return Err(Error::validation("User name must not be empty"));
    }
    if !email.contains('@') {
        return Err(Error::validation(format!("Invalid email '{}'", user.email)));
    }
    if find_by_email(conn, &email)?.is_some() {
        return Err(Error::validation(format!("Email '{}' already registered", email)));
    }
    conn.execute(
        "INSERT INTO users(name, email, role) VALUES (?1, ?2, ?3)",
        params![user.name.trim(), email, user.role],
    )?;
    find_by_id(conn, conn.last_insert_rowid())
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<User> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM users WHERE id=?1"),
        params![id],
        map_row,
    )
    .optional()?
    .ok_or_else(|| Error::not_found("user", id))
}

pub fn find_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    Ok(conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM users WHERE email=?1"),
            params![email.trim().to_lowercase()],
            map_row,
        )
        .optional()?)
}

pub fn first_admin(conn: &Connection) -> Result<Option<User>> {
    Ok(conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM users WHERE role='admin' ORDER BY id LIMIT 1"),
            [],
            map_row,
        )
        .optional()?)
}

pub fn find_all(conn: &Connection) -> Result<Vec<User>> {
    let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM users ORDER BY id"))?;
    let rows = stmt.query_map([], map_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn update_role(conn: &Connection, id: i64, role: Role) -> Result<User> {
    let n = conn.execute("UPDATE users SET role=?1 WHERE id=?2", params![role, id])?;
    if n == 0 {
        return Err(Error::not_found("user", id));
    }
    find_by_id(conn, id)
}

pub fn delete(conn: &Connection, id: i64) -> Result<()> {
    let owned: i64 = conn.query_row(
        "SELECT (SELECT COUNT(*) FROM accounts WHERE user_id=?1)
              + (SELECT COUNT(*) FROM transactions WHERE user_id=?1)",
        params![id],
        |r| r.get(0),
    )?;
    if owned > 0 {
        return Err(Error::validation(format!(
            "User {} still owns accounts or transactions",
            id
        )));
    }
    let n = conn.execute("DELETE FROM users WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(Error::not_found("user", id));
    }
    Ok(())
}
