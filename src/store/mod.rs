// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Parameterized SQL over a borrowed connection.
//!
//! Every function takes `&Connection`, so the same call works on a pooled
//! connection or inside a `rusqlite::Transaction` opened by
//! [`crate::db::unit_of_work`].

pub mod accounts;
pub mod allowances;
pub mod bills;
pub mod budgets;
pub mod categories;
pub mod goals;
pub mod reports;
pub mod transactions;
pub mod users;

use rusqlite::types::Type;

/// Wraps a decode failure of a TEXT column so it surfaces as a storage error.
pub(crate) fn text_decode_error(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}
