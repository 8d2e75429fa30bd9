use super::award::{AwardLine, ValueCode, ValueType};
use super::money::Amount;
use serde::{Deserialize, Serialize};

/// Value codes never counted toward the tuition remittance cap, in either
/// computation mode. These are provincial roll-up grants whose component
/// grants are already represented by their own lines.
pub const TUITION_REMITTANCE_EXCLUSIONS: &[ValueCode] = &[ValueCode::BCSG];

/// Which amount column the remittance sum reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemittanceMode {
    /// Before certification: `estimated - subtracted`.
    Estimated,
    /// At/after certification: the finalized effective amount.
    Effective,
}

/// Costs the institution may collect directly from the disbursement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OfferingCosts {
    pub actual_tuition: Amount,
    pub program_related_costs: Amount,
}

fn eligible_for_remittance(line: &AwardLine) -> bool {
    if TUITION_REMITTANCE_EXCLUSIONS.contains(&line.value_code) {
        return false;
    }
    matches!(
        line.value_type(),
        ValueType::CanadaLoan | ValueType::ProvincialLoan | ValueType::CanadaGrant
    )
}

/// Maximum amount an institution may withhold for tuition:
/// `min(sum of eligible awards, actual tuition + program-related costs)`.
///
/// In `Effective` mode, lines that have not been certified yet contribute
/// nothing.
pub fn max_tuition_remittance(
    awards: &[AwardLine],
    costs: OfferingCosts,
    mode: RemittanceMode,
) -> Amount {
    let sum = awards
        .iter()
        .filter(|line| eligible_for_remittance(line))
        .fold(Amount::ZERO, |acc, line| {
            let contribution = match mode {
                RemittanceMode::Estimated => line
                    .estimated_amount
                    .checked_sub(line.amount_subtracted)
                    .unwrap_or(Amount::ZERO),
                RemittanceMode::Effective => line.effective_amount.unwrap_or(Amount::ZERO),
            };
            acc + contribution
        });

    sum.min(costs.actual_tuition + costs.program_related_costs)
}
