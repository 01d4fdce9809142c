// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{Error, Result};
use crate::models::{Category, CategoryPatch, NewCategory};
use rusqlite::{Connection, OptionalExtension, Row, params};

const COLUMNS: &str = "id, parent_id, name, kind, icon, sort_order";

fn map_row(r: &Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: r.get(0)?,
        parent_id: r.get(1)?,
        name: r.get(2)?,
        kind: r.get(3)?,
        icon: r.get(4)?,
        sort_order: r.get(5)?,
    })
}

pub fn insert(conn: &Connection, cat: &NewCategory) -> Result<Category> {
    let name = cat.name.trim();
    if name.is_empty() {
        return Err(Error::validation("Category name must not be empty"));
    }
    if let Some(parent) = cat.parent_id {
        find_by_id(conn, parent)?;
    }
    if find_by_name(conn, name)?.is_some() {
        return Err(Error::validation(format!("Category '{}' already exists", name)));
    }
    conn.execute(
        "INSERT INTO categories(parent_id, name, kind, icon, sort_order) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![cat.parent_id, name, cat.kind, cat.icon, cat.sort_order],
    )?;
    find_by_id(conn, conn.last_insert_rowid())
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Category> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM categories WHERE id=?1"),
        params![id],
        map_row,
    )
    .optional()?
    .ok_or_else(|| Error::not_found("category", id))
}

pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Category>> {
    Ok(conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM categories WHERE name=?1"),
            params![name],
            map_row,
        )
        .optional()?)
}

pub fn find_all(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM categories ORDER BY sort_order, name"
    ))?;
    let rows = stmt.query_map([], map_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn update(conn: &Connection, id: i64, patch: &CategoryPatch) -> Result<Category> {
    let current = find_by_id(conn, id)?;
    let name = patch
        .name
        .as_deref()
        .map(str::trim)
        .unwrap_or(&current.name)
        .to_string();
    if name.is_empty() {
        return Err(Error::validation("Category name must not be empty"));
    }
    let icon = patch.icon.clone().or(current.icon);
    let sort_order = patch.sort_order.unwrap_or(current.sort_order);
    conn.execute(
        "UPDATE categories SET name=?1, icon=?2, sort_order=?3 WHERE id=?4",
        params![name, icon, sort_order, id],
    )?;
    find_by_id(conn, id)
}

pub fn delete(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM categories WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(Error::not_found("category", id));
    }
    Ok(())
}
