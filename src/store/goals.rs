// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{Error, Result};
use crate::models::{GoalStatus, NewSavingGoal, SavingGoal, SavingGoalPatch};
use rusqlite::{Connection, OptionalExtension, Row, params};

const COLUMNS: &str =
    "id, name, target_amount, current_amount, target_date, priority, status, created_at, updated_at";

fn map_row(r: &Row) -> rusqlite::Result<SavingGoal> {
    Ok(SavingGoal {
        id: r.get(0)?,
        name: r.get(1)?,
        target_amount: r.get(2)?,
        current_amount: r.get(3)?,
        target_date: r.get(4)?,
        priority: r.get(5)?,
        status: r.get(6)?,
        created_at: r.get(7)?,
        updated_at: r.get(8)?,
    })
}

fn check(name: &str, target: i64, priority: i64) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("Goal name must not be empty"));
    }
    if target <= 0 {
        return Err(Error::validation("Goal target must be positive"));
    }
    if priority < 1 {
        return Err(Error::validation("Goal priority must be at least 1"));
    }
    Ok(())
}

pub fn insert(conn: &Connection, goal: &NewSavingGoal) -> Result<SavingGoal> {
    check(&goal.name, goal.target_amount, goal.priority)?;
    conn.execute(
        "INSERT INTO saving_goals(name, target_amount, target_date, priority) VALUES (?1, ?2, ?3, ?4)",
        params![goal.name.trim(), goal.target_amount, goal.target_date, goal.priority],
    )?;
    find_by_id(conn, conn.last_insert_rowid())
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<SavingGoal> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM saving_goals WHERE id=?1"),
        params![id],
        map_row,
    )
    .optional()?
    .ok_or_else(|| Error::not_found("saving goal", id))
}

pub fn find_all(conn: &Connection) -> Result<Vec<SavingGoal>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM saving_goals ORDER BY priority, id"
    ))?;
    let rows = stmt.query_map([], map_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn update(conn: &Connection, id: i64, patch: &SavingGoalPatch) -> Result<SavingGoal> {
    let cur = find_by_id(conn, id)?;
    let name = patch.name.clone().unwrap_or(cur.name);
    let target = patch.target_amount.unwrap_or(cur.target_amount);
    let priority = patch.priority.unwrap_or(cur.priority);
    check(&name, target, priority)?;
    conn.execute(
        "UPDATE saving_goals
            SET name=?1, target_amount=?2, target_date=?3, priority=?4, status=?5,
                updated_at=datetime('now')
          WHERE id=?6",
        params![
            name.trim(),
            target,
            patch.target_date.or(cur.target_date),
            priority,
            patch.status.unwrap_or(cur.status),
            id
        ],
    )?;
    find_by_id(conn, id)
}

/// Adds to `current_amount`; reaching the target completes the goal.
pub fn contribute(conn: &Connection, id: i64, amount: i64) -> Result<SavingGoal> {
    if amount <= 0 {
        return Err(Error::validation("Contribution must be positive"));
    }
    let goal = find_by_id(conn, id)?;
    if goal.status != GoalStatus::Active {
        return Err(Error::validation(format!(
            "Goal {} is {}, not active",
            id, goal.status
        )));
    }
    let current = goal.current_amount + amount;
    let status = if current >= goal.target_amount {
        GoalStatus::Completed
    } else {
        GoalStatus::Active
    };
    conn.execute(
        "UPDATE saving_goals SET current_amount=?1, status=?2, updated_at=datetime('now') WHERE id=?3",
        params![current, status, id],
    )?;
    find_by_id(conn, id)
}

pub fn delete(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM saving_goals WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(Error::not_found("saving goal", id));
    }
    Ok(())
}
