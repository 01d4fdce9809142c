// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{Ledger, bookkeeping};
use crate::db;
use crate::models::{Frequency, GenerateReport, RecurringRule, Transaction};
use crate::store::transactions::{self, TransactionDraft};
use crate::utils::{add_months, with_day_clamped};
use chrono::{Datelike, Duration, NaiveDate};
use tracing::{debug, info, instrument, warn};

/// The occurrence one period after `from`.
///
/// Monthly and yearly steps clamp to the end of the target month, and a
/// day-of-month pin is clamped the same way. `day_of_week` is not consulted:
/// weekly steps are exactly seven days. `None` only past the calendar's end.
pub fn next_occurrence(from: NaiveDate, rule: &RecurringRule) -> Option<NaiveDate> {
    match rule.frequency {
        Frequency::Daily => from.checked_add_signed(Duration::days(1)),
        Frequency::Weekly => from.checked_add_signed(Duration::days(7)),
        Frequency::Monthly => {
            let next = add_months(from, 1)?;
            Some(match rule.day {
                Some(day) => with_day_clamped(next, day),
                None => next,
            })
        }
        Frequency::Yearly => add_months(from, 12),
    }
}

/// Monthly templates without a pin keep the template's own day, so a
/// 31st does not drift to the 28th after February.
fn effective_rule(template: &Transaction, rule: &RecurringRule) -> RecurringRule {
    let mut rule = rule.clone();
    if rule.frequency == Frequency::Monthly && rule.day.is_none() {
        rule.day = Some(template.date.day());
    }
    rule
}

fn occurrence_of(template: &Transaction, date: NaiveDate) -> TransactionDraft {
    TransactionDraft {
        user_id: template.user_id,
        account_id: template.account_id,
        category_id: template.category_id,
        amount: template.amount,
        kind: template.kind,
        description: template.description.clone(),
        date,
        is_shared: template.is_shared,
        is_recurring: false,
        recurring_rule: None,
        tags: template.tags.clone(),
        transfer_to_account_id: template.transfer_to_account_id,
        template_id: Some(template.id),
    }
}

impl Ledger {
    /// Materialises every occurrence due on or before `up_to` for each of the
    /// user's templates.
    ///
    /// Each occurrence commits on its own. A failure is recorded and ends that
    /// template's run; the remaining templates still run.
    #[instrument(skip(self), fields(up_to = %up_to))]
    pub fn generate_recurring(
        &self,
        user_id: i64,
        up_to: NaiveDate,
    ) -> crate::error::Result<GenerateReport> {
        let mut conn = self.pool.get()?;
        let templates = transactions::find_recurring_templates(&conn, user_id)?;
        let mut report = GenerateReport {
            templates_considered: templates.len(),
            ..GenerateReport::default()
        };

        for template in &templates {
            let Some(rule) = template.recurring_rule.as_ref() else {
                continue;
            };
            let rule = effective_rule(template, rule);

            let start = match transactions::find_latest_occurrence(&conn, template) {
                Ok(Some(prior)) => prior.date.max(template.date),
                Ok(None) => template.date,
                Err(e) => {
                    warn!(template_id = template.id, error = %e, "prior occurrence lookup failed");
                    report.errors.push(format!("template {}: {}", template.id, e));
                    continue;
                }
            };

            let mut next = next_occurrence(start, &rule);
            while let Some(date) = next.filter(|d| *d <= up_to) {
                let draft = occurrence_of(template, date);
                match db::unit_of_work(&mut conn, |uow| bookkeeping::record(uow, &draft)) {
                    Ok(tx) => {
                        debug!(template_id = template.id, id = tx.id, %date, "occurrence generated");
                        report.generated += 1;
                    }
                    Err(e) => {
                        warn!(template_id = template.id, %date, error = %e, "occurrence failed");
                        report
                            .errors
                            .push(format!("template {} date {}: {}", template.id, date, e));
                        break;
                    }
                }
                next = next_occurrence(date, &rule);
            }
        }

        info!(
            generated = report.generated,
            templates = report.templates_considered,
            errors = report.errors.len(),
            "recurring generation finished"
        );
        Ok(report)
    }
}

