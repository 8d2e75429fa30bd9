use super::award::AwardLine;
use super::eligibility::IneligibilityReason;
use super::money::Amount;
use super::remittance::OfferingCosts;
use crate::error::EngineError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a disbursement schedule.
///
/// Pending -> Sent -> Completed | Cancelled, with Pending -> Cancelled also
/// reachable when a reassessment supersedes a schedule before it is ever
/// certified. Completed and Cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisbursementStatus {
    Pending,
    Sent,
    Completed,
    Cancelled,
}

impl DisbursementStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for DisbursementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Full-time or part-time study, selecting distinct award rules and a
/// distinct agreement number lineage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferingIntensity {
    FullTime,
    PartTime,
}

impl OfferingIntensity {
    pub fn code(&self) -> char {
        match self {
            Self::FullTime => 'F',
            Self::PartTime => 'P',
        }
    }
}

/// One disbursement event for a student application.
///
/// Created when an assessment is finalized. The certification batch mutates
/// status and computed amounts; the response processor completes or cancels.
/// Once terminal, award amounts are frozen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisbursementSchedule {
    pub document_number: String,
    pub student_id: u32,
    pub application_id: u32,
    pub intensity: OfferingIntensity,
    pub disbursement_date: NaiveDate,
    /// Position in the creation order of the student's schedules. Overaward
    /// deductions must be applied in ascending order of this key.
    pub created_order: u32,
    /// Whether the institution has confirmed enrolment for this application.
    pub enrolment_confirmed: bool,
    /// True when this is the first disbursement of its application, which is
    /// the one the enrolment-confirmation gate applies to.
    pub first_of_application: bool,
    pub msfaa_number: Option<u64>,
    /// Tuition and program-related costs of the offering, used for the
    /// tuition-remittance cap.
    pub offering_costs: OfferingCosts,
    pub awards: Vec<AwardLine>,
    pub status: DisbursementStatus,
    pub status_date: Option<NaiveDate>,
    /// Itemized certification failures from the most recent batch run.
    pub ineligibility_reasons: Vec<IneligibilityReason>,
    /// Error codes reported back by the funding authority, if any.
    pub feedback_error_codes: Vec<String>,
}

impl DisbursementSchedule {
    fn invalid_transition(&self, attempted: &str) -> EngineError {
        EngineError::InvalidTransition {
            document_number: self.document_number.clone(),
            from: self.status.to_string(),
            attempted: attempted.to_string(),
        }
    }

    /// Total of the effective amounts, available only once certified.
    pub fn total_effective(&self) -> Amount {
        self.awards
            .iter()
            .filter_map(|a| a.effective_amount)
            .fold(Amount::ZERO, |acc, a| acc + a)
    }

    /// Applies computed effective amounts to this schedule's award lines.
    ///
    /// Rejected on a terminal schedule: amounts are frozen once the record
    /// has completed or been cancelled.
    pub fn apply_certified_amounts(&mut self, lines: Vec<AwardLine>) -> Result<(), EngineError> {
        if self.status.is_terminal() {
            return Err(self.invalid_transition("amount update"));
        }
        self.awards = lines;
        Ok(())
    }

    /// Pending -> Sent.
    ///
    /// `can_certify` is the outcome of pre-validation; `enrolment_gate_passed`
    /// is the caller-evaluated enrolment-confirmation gate for a first
    /// disbursement (a later disbursement of the same application passes
    /// unconditionally).
    pub fn mark_sent(
        &mut self,
        can_certify: bool,
        enrolment_gate_passed: bool,
        date: NaiveDate,
    ) -> Result<(), EngineError> {
        if self.status != DisbursementStatus::Pending {
            return Err(self.invalid_transition("sent"));
        }
        if !can_certify {
            return Err(self.invalid_transition("sent (certification failures outstanding)"));
        }
        if !enrolment_gate_passed {
            return Err(self.invalid_transition("sent (enrolment not confirmed)"));
        }
        self.status = DisbursementStatus::Sent;
        self.status_date = Some(date);
        Ok(())
    }

    /// Sent -> Completed, on a positive acknowledgement from the funding
    /// authority.
    pub fn complete(&mut self, date: NaiveDate) -> Result<(), EngineError> {
        if self.status != DisbursementStatus::Sent {
            return Err(self.invalid_transition("completed"));
        }
        self.status = DisbursementStatus::Completed;
        self.status_date = Some(date);
        Ok(())
    }

    /// Cancels from any non-terminal state. Cancelling an already cancelled
    /// schedule is a no-op, not an error.
    pub fn cancel(&mut self, date: NaiveDate) -> Result<(), EngineError> {
        match self.status {
            DisbursementStatus::Cancelled => Ok(()),
            DisbursementStatus::Completed => Err(self.invalid_transition("cancelled")),
            DisbursementStatus::Pending | DisbursementStatus::Sent => {
                self.status = DisbursementStatus::Cancelled;
                self.status_date = Some(date);
                Ok(())
            }
        }
    }
}
