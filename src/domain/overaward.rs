use super::award::{AwardLine, ValueCode};
use super::money::Amount;
use crate::error::{EngineError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How an overaward ledger entry came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverawardOrigin {
    /// Imported from the predecessor system.
    Legacy,
    /// A reassessment reduced an amount already disbursed.
    Reassessment,
    /// A manual adjustment entered by ministry staff.
    Manual,
    /// A deduction taken from a later disbursement, repaying the debt.
    AwardDeducted,
}

/// One append-only row of the overaward ledger.
///
/// Positive amounts are debt; negative amounts are credits (deductions or
/// manual adjustments). The running balance for a (student, value code) pair
/// is the sum of its entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverawardEntry {
    pub student_id: u32,
    pub value_code: ValueCode,
    pub amount: Decimal,
    pub origin: OverawardOrigin,
    pub application_id: Option<u32>,
    pub created_at: NaiveDate,
}

/// Result of running the overaward deduction over one schedule's awards.
///
/// `ledger_credits` are not yet persisted: the orchestrator appends them only
/// after the e-Cert file has been promoted, so a failed run leaves the ledger
/// untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct DeductionOutcome {
    pub lines: Vec<AwardLine>,
    pub ledger_credits: Vec<OverawardEntry>,
}

/// Deducts outstanding overawards from a schedule's estimated amounts.
///
/// For each award line whose value code carries a positive balance, up to
/// `min(estimated, balance)` is withheld; the withheld amount becomes
/// `amount_subtracted` and `effective = estimated - subtracted`. `balances`
/// is consumed in place so that a student's later schedules, processed in
/// creation order, see the reduced debt (first in, first served).
pub fn deduct_overawards(
    student_id: u32,
    application_id: u32,
    awards: &[AwardLine],
    balances: &mut HashMap<ValueCode, Decimal>,
    as_of: NaiveDate,
) -> Result<DeductionOutcome> {
    let mut lines = Vec::with_capacity(awards.len());
    let mut ledger_credits = Vec::new();

    for award in awards {
        let mut line = award.clone();
        let outstanding = balances
            .get(&line.value_code)
            .copied()
            .unwrap_or(Decimal::ZERO);

        if outstanding > Decimal::ZERO {
            let subtracted = line
                .estimated_amount
                .min(Amount::new(outstanding).map_err(|_| {
                    EngineError::CalculationInvariant(format!(
                        "negative outstanding balance {outstanding} for {}",
                        line.value_code.as_str()
                    ))
                })?);

            if !subtracted.is_zero() {
                line.amount_subtracted = subtracted;
                balances.insert(line.value_code, outstanding - subtracted.value());
                ledger_credits.push(OverawardEntry {
                    student_id,
                    value_code: line.value_code,
                    amount: -subtracted.value(),
                    origin: OverawardOrigin::AwardDeducted,
                    application_id: Some(application_id),
                    created_at: as_of,
                });
            }
        }

        // checked_sub proves the invariant: effective can never be negative.
        line.effective_amount = Some(line.estimated_amount.checked_sub(line.amount_subtracted)?);
        lines.push(line);
    }

    Ok(DeductionOutcome {
        lines,
        ledger_credits,
    })
}

/// Computes the overaward created when a reassessment lowers an amount that
/// was already disbursed for a prior schedule of the same application.
///
/// Only a positive difference is a debt; a reassessment that raises the
/// entitlement creates no ledger entry.
pub fn reassessment_overaward(
    previously_disbursed: Amount,
    newly_assessed: Amount,
) -> Option<Decimal> {
    let diff = previously_disbursed.value() - newly_assessed.value();
    if diff > Decimal::ZERO { Some(diff) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn amount(d: Decimal) -> Amount {
        Amount::new(d).unwrap()
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()
    }

    #[test]
    fn test_deduction_capped_by_estimated_amount() {
        let awards = vec![AwardLine::new(ValueCode::CSLF, amount(dec!(100)))];
        let mut balances = HashMap::from([(ValueCode::CSLF, dec!(250))]);

        let outcome =
            deduct_overawards(1, 10, &awards, &mut balances, as_of()).unwrap();

        let line = &outcome.lines[0];
        assert_eq!(line.amount_subtracted, amount(dec!(100)));
        assert_eq!(line.effective_amount, Some(Amount::ZERO));
        // 150 of debt remains for the next schedule.
        assert_eq!(balances[&ValueCode::CSLF], dec!(150));
        assert_eq!(outcome.ledger_credits.len(), 1);
        assert_eq!(outcome.ledger_credits[0].amount, dec!(-100));
        assert_eq!(outcome.ledger_credits[0].origin, OverawardOrigin::AwardDeducted);
    }

    #[test]
    fn test_deduction_capped_by_balance() {
        let awards = vec![AwardLine::new(ValueCode::CSLF, amount(dec!(500)))];
        let mut balances = HashMap::from([(ValueCode::CSLF, dec!(120.50))]);

        let outcome =
            deduct_overawards(1, 10, &awards, &mut balances, as_of()).unwrap();

        let line = &outcome.lines[0];
        assert_eq!(line.amount_subtracted, amount(dec!(120.50)));
        assert_eq!(line.effective_amount, Some(amount(dec!(379.50))));
        assert_eq!(balances[&ValueCode::CSLF], Decimal::ZERO);
    }

    #[test]
    fn test_no_balance_means_no_deduction() {
        let awards = vec![
            AwardLine::new(ValueCode::CSLF, amount(dec!(300))),
            AwardLine::new(ValueCode::CSGF, amount(dec!(200))),
        ];
        let mut balances = HashMap::from([(ValueCode::BCSL, dec!(75))]);

        let outcome =
            deduct_overawards(1, 10, &awards, &mut balances, as_of()).unwrap();

        assert!(outcome.ledger_credits.is_empty());
        for line in &outcome.lines {
            assert_eq!(line.amount_subtracted, Amount::ZERO);
            assert_eq!(line.effective_amount, Some(line.estimated_amount));
        }
    }

    #[test]
    fn test_credit_balance_is_ignored() {
        let awards = vec![AwardLine::new(ValueCode::CSLF, amount(dec!(300)))];
        let mut balances = HashMap::from([(ValueCode::CSLF, dec!(-50))]);

        let outcome =
            deduct_overawards(1, 10, &awards, &mut balances, as_of()).unwrap();

        assert_eq!(outcome.lines[0].amount_subtracted, Amount::ZERO);
        assert_eq!(balances[&ValueCode::CSLF], dec!(-50));
    }

    #[test]
    fn test_fifo_across_schedules_of_one_student() {
        // Two schedules deducted in creation order share one balance map.
        let mut balances = HashMap::from([(ValueCode::CSLF, dec!(150))]);

        let first = vec![AwardLine::new(ValueCode::CSLF, amount(dec!(100)))];
        let outcome1 =
            deduct_overawards(1, 10, &first, &mut balances, as_of()).unwrap();
        assert_eq!(outcome1.lines[0].amount_subtracted, amount(dec!(100)));

        let second = vec![AwardLine::new(ValueCode::CSLF, amount(dec!(100)))];
        let outcome2 =
            deduct_overawards(1, 10, &second, &mut balances, as_of()).unwrap();
        assert_eq!(outcome2.lines[0].amount_subtracted, amount(dec!(50)));
        assert_eq!(outcome2.lines[0].effective_amount, Some(amount(dec!(50))));
        assert_eq!(balances[&ValueCode::CSLF], Decimal::ZERO);
    }

    #[test]
    fn test_reassessment_overaward_only_positive() {
        assert_eq!(
            reassessment_overaward(amount(dec!(800)), amount(dec!(650))),
            Some(dec!(150))
        );
        assert_eq!(
            reassessment_overaward(amount(dec!(500)), amount(dec!(500))),
            None
        );
        assert_eq!(
            reassessment_overaward(amount(dec!(400)), amount(dec!(650))),
            None
        );
    }
}
