use super::agreement::MsfaaRecord;
use super::schedule::{DisbursementSchedule, OfferingIntensity};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The closed set of reasons a disbursement can fail pre-validation.
///
/// Blocking reasons stop acceptance outright; advisory reasons leave the
/// record acceptable but not yet certifiable. The partition lives in
/// [`IneligibilityReason::is_blocking`] and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IneligibilityReason {
    DisabilityStatusNotConfirmed,
    MsfaaNotSigned,
    MsfaaCancelled,
    StopDisbursementRestriction,
    NoEstimatedAwards,
    EnrolmentNotConfirmed,
    PartTimeLoanLimitReached,
}

impl IneligibilityReason {
    pub fn is_blocking(&self) -> bool {
        match self {
            IneligibilityReason::DisabilityStatusNotConfirmed
            | IneligibilityReason::MsfaaNotSigned
            | IneligibilityReason::MsfaaCancelled
            | IneligibilityReason::StopDisbursementRestriction
            | IneligibilityReason::NoEstimatedAwards => true,
            IneligibilityReason::EnrolmentNotConfirmed
            | IneligibilityReason::PartTimeLoanLimitReached => false,
        }
    }
}

/// Outcome of pre-validating one disbursement. Failures are data, never
/// errors; a single pass surfaces every outstanding problem at once.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EligibilityResult {
    pub reasons: Vec<IneligibilityReason>,
}

impl EligibilityResult {
    /// No blocking failure present.
    pub fn can_accept(&self) -> bool {
        !self.reasons.iter().any(|r| r.is_blocking())
    }

    /// No failure of any kind present.
    pub fn can_certify(&self) -> bool {
        self.reasons.is_empty()
    }
}

/// Everything the checks read, gathered up front by the orchestrator so the
/// checks themselves stay pure. An unreachable data source fails while
/// building the context, not inside a rule.
#[derive(Debug, Clone)]
pub struct EligibilityContext {
    pub as_of: NaiveDate,
    pub disability_verified: bool,
    pub msfaa: Option<MsfaaRecord>,
    pub has_stop_disbursement_restriction: bool,
    pub part_time_loan_limit_reached: bool,
}

type Check = fn(&DisbursementSchedule, &EligibilityContext) -> Option<IneligibilityReason>;

fn check_disability_status(
    _schedule: &DisbursementSchedule,
    ctx: &EligibilityContext,
) -> Option<IneligibilityReason> {
    if ctx.disability_verified {
        None
    } else {
        Some(IneligibilityReason::DisabilityStatusNotConfirmed)
    }
}

fn check_msfaa(
    _schedule: &DisbursementSchedule,
    ctx: &EligibilityContext,
) -> Option<IneligibilityReason> {
    match &ctx.msfaa {
        None => Some(IneligibilityReason::MsfaaNotSigned),
        Some(record) if record.is_cancelled() => Some(IneligibilityReason::MsfaaCancelled),
        Some(record) if !record.is_currently_valid(ctx.as_of) => {
            Some(IneligibilityReason::MsfaaNotSigned)
        }
        Some(_) => None,
    }
}

fn check_restrictions(
    _schedule: &DisbursementSchedule,
    ctx: &EligibilityContext,
) -> Option<IneligibilityReason> {
    if ctx.has_stop_disbursement_restriction {
        Some(IneligibilityReason::StopDisbursementRestriction)
    } else {
        None
    }
}

fn check_estimated_awards(
    schedule: &DisbursementSchedule,
    _ctx: &EligibilityContext,
) -> Option<IneligibilityReason> {
    if schedule.awards.iter().all(|a| a.estimated_amount.is_zero()) {
        Some(IneligibilityReason::NoEstimatedAwards)
    } else {
        None
    }
}

fn check_enrolment_confirmation(
    schedule: &DisbursementSchedule,
    _ctx: &EligibilityContext,
) -> Option<IneligibilityReason> {
    if schedule.first_of_application && !schedule.enrolment_confirmed {
        Some(IneligibilityReason::EnrolmentNotConfirmed)
    } else {
        None
    }
}

fn check_part_time_loan_limit(
    _schedule: &DisbursementSchedule,
    ctx: &EligibilityContext,
) -> Option<IneligibilityReason> {
    if ctx.part_time_loan_limit_reached {
        Some(IneligibilityReason::PartTimeLoanLimitReached)
    } else {
        None
    }
}

const FULL_TIME_CHECKS: &[Check] = &[
    check_disability_status,
    check_msfaa,
    check_restrictions,
    check_estimated_awards,
    check_enrolment_confirmation,
];

const PART_TIME_CHECKS: &[Check] = &[
    check_msfaa,
    check_restrictions,
    check_estimated_awards,
    check_enrolment_confirmation,
    check_part_time_loan_limit,
];

/// Runs the rule sequence for the schedule's offering intensity.
///
/// Every check runs; each appends at most one reason. Business failures never
/// abort the sequence.
pub fn evaluate(
    schedule: &DisbursementSchedule,
    ctx: &EligibilityContext,
) -> EligibilityResult {
    let checks = match schedule.intensity {
        OfferingIntensity::FullTime => FULL_TIME_CHECKS,
        OfferingIntensity::PartTime => PART_TIME_CHECKS,
    };

    let reasons = checks
        .iter()
        .filter_map(|check| check(schedule, ctx))
        .collect();

    EligibilityResult { reasons }
}
