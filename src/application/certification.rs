use super::msfaa::MsfaaManager;
use super::summary::RunSummary;
use crate::domain::award::AwardLine;
use crate::domain::eligibility::{self, EligibilityContext};
use crate::domain::money::Amount;
use crate::domain::overaward::{OverawardEntry, deduct_overawards};
use crate::domain::ports::{
    OverawardStoreBox, RestrictionStoreBox, ScheduleStoreBox, StudentStoreBox, TransferChannelBox,
};
use crate::domain::remittance::{RemittanceMode, max_tuition_remittance};
use crate::domain::schedule::DisbursementSchedule;
use crate::error::{EngineError, Result};
use crate::interfaces::ecert::filename::outbound_file_name;
use crate::interfaces::ecert::records::{EcertDetail, EcertFile};
use chrono::{Days, NaiveDate};
use futures::StreamExt;
use tracing::{debug, info};

/// A schedule becomes due this many days before its disbursement date.
pub const ECERT_WINDOW_DAYS: u64 = 5;

/// Bound on students processed at once. Schedules of one student always run
/// sequentially, in creation order, so money-affecting work is serialized per
/// student.
pub const MAX_CONCURRENT_STUDENTS: usize = 8;

/// One certified disbursement waiting for the file write to succeed before
/// any of its state is committed.
struct CertifiedItem {
    schedule: DisbursementSchedule,
    lines: Vec<AwardLine>,
    ledger_credits: Vec<OverawardEntry>,
    detail: EcertDetail,
}

#[derive(Default)]
struct StudentOutcome {
    certified: Vec<CertifiedItem>,
    skipped: u32,
    errors: Vec<String>,
}

/// Drives one certification batch: select eligible Pending disbursements,
/// pre-validate, calculate, encode, deliver, then transition state.
///
/// No schedule or ledger mutation is committed until the output file has been
/// promoted at its delivery location; a failure anywhere before that leaves
/// every schedule Pending.
pub struct CertificationEngine {
    schedules: ScheduleStoreBox,
    overawards: OverawardStoreBox,
    msfaa: MsfaaManager,
    restrictions: RestrictionStoreBox,
    students: StudentStoreBox,
    transfer: TransferChannelBox,
}

impl CertificationEngine {
    pub fn new(
        schedules: ScheduleStoreBox,
        overawards: OverawardStoreBox,
        msfaa: MsfaaManager,
        restrictions: RestrictionStoreBox,
        students: StudentStoreBox,
        transfer: TransferChannelBox,
    ) -> Self {
        Self {
            schedules,
            overawards,
            msfaa,
            restrictions,
            students,
            transfer,
        }
    }

    pub async fn execute(
        &self,
        as_of: NaiveDate,
        environment: &str,
        file_sequence: u32,
    ) -> Result<RunSummary> {
        let window_end = as_of
            .checked_add_days(Days::new(ECERT_WINDOW_DAYS))
            .unwrap_or(as_of);
        let due = self.schedules.due_for_certification(window_end).await?;
        info!(count = due.len(), %window_end, "selected disbursements for certification");

        // Group per student, preserving the store's creation ordering.
        let mut groups: Vec<(u32, Vec<DisbursementSchedule>)> = Vec::new();
        for schedule in due {
            match groups.last_mut() {
                Some((student_id, group)) if *student_id == schedule.student_id => {
                    group.push(schedule);
                }
                _ => groups.push((schedule.student_id, vec![schedule])),
            }
        }

        let outcomes: Vec<Result<StudentOutcome>> = futures::stream::iter(
            groups
                .into_iter()
                .map(|(student_id, group)| self.process_student(student_id, group, as_of)),
        )
        .buffer_unordered(MAX_CONCURRENT_STUDENTS)
        .collect()
        .await;

        let mut summary = RunSummary::default();
        let mut certified: Vec<CertifiedItem> = Vec::new();
        for outcome in outcomes {
            let outcome = outcome?;
            summary.schedules_skipped += outcome.skipped;
            for error in outcome.errors {
                summary.error(error);
            }
            certified.extend(outcome.certified);
        }

        if certified.is_empty() {
            info!("nothing certifiable; no file produced");
            return Ok(summary);
        }

        certified.sort_by(|a, b| a.schedule.document_number.cmp(&b.schedule.document_number));

        let file = EcertFile {
            environment: environment.to_string(),
            file_date: as_of,
            sequence: file_sequence,
            details: certified.iter().map(|c| c.detail.clone()).collect(),
        };
        let file_name = outbound_file_name(environment, as_of, file_sequence);
        self.transfer.upload(&file_name, &file.encode()).await?;
        summary.files_produced = 1;
        info!(%file_name, details = certified.len(), "e-cert file delivered");

        // The file is at its final location; now commit state.
        for item in certified {
            let mut schedule = item.schedule;
            let enrolment_gate_passed =
                !schedule.first_of_application || schedule.enrolment_confirmed;
            schedule.apply_certified_amounts(item.lines)?;
            schedule.mark_sent(true, enrolment_gate_passed, as_of)?;
            self.schedules.store(schedule).await?;
            for credit in item.ledger_credits {
                self.overawards.append(credit).await?;
            }
            summary.schedules_certified += 1;
        }

        Ok(summary)
    }

    /// Processes all due schedules of one student, sequentially and in
    /// creation order so overaward debt is consumed first in, first served.
    async fn process_student(
        &self,
        student_id: u32,
        group: Vec<DisbursementSchedule>,
        as_of: NaiveDate,
    ) -> Result<StudentOutcome> {
        let mut outcome = StudentOutcome::default();

        let Some(profile) = self.students.profile(student_id).await? else {
            for schedule in &group {
                outcome.errors.push(format!(
                    "{}: student {student_id} has no profile on record",
                    schedule.document_number
                ));
            }
            return Ok(outcome);
        };

        let disability_verified = self.students.disability_verified(student_id).await?;
        let part_time_loan_limit_reached = self
            .students
            .part_time_loan_limit_reached(student_id)
            .await?;
        let has_restriction = self.restrictions.has_stop_disbursement(student_id).await?;
        let mut balances = self.overawards.balances(student_id).await?;

        for mut schedule in group {
            let msfaa = self
                .msfaa
                .current_valid(student_id, schedule.intensity, as_of)
                .await?;
            let ctx = EligibilityContext {
                as_of,
                disability_verified,
                msfaa,
                has_stop_disbursement_restriction: has_restriction,
                part_time_loan_limit_reached,
            };

            let result = eligibility::evaluate(&schedule, &ctx);
            schedule.ineligibility_reasons = result.reasons.clone();
            if !result.can_certify() {
                debug!(
                    document = %schedule.document_number,
                    reasons = ?result.reasons,
                    "schedule not certifiable this run"
                );
                // Failures stay attached to the record as data; the schedule
                // remains Pending for a later run.
                self.schedules.store(schedule).await?;
                outcome.skipped += 1;
                continue;
            }

            match deduct_overawards(
                student_id,
                schedule.application_id,
                &schedule.awards,
                &mut balances,
                as_of,
            ) {
                Ok(deduction) => {
                    let tuition_remittance = max_tuition_remittance(
                        &deduction.lines,
                        schedule.offering_costs,
                        RemittanceMode::Effective,
                    );
                    let total_disbursed = deduction
                        .lines
                        .iter()
                        .filter_map(|l| l.effective_amount)
                        .fold(Amount::ZERO, |acc, a| acc + a);

                    let detail = EcertDetail {
                        sin: profile.sin.clone(),
                        document_number: schedule.document_number.clone(),
                        disbursement_date: schedule.disbursement_date,
                        msfaa_number: schedule.msfaa_number,
                        intensity: schedule.intensity,
                        surname: profile.surname.clone(),
                        given_name: profile.given_name.clone(),
                        birth_date: profile.birth_date,
                        total_disbursed,
                        tuition_remittance,
                        enrolment_confirmed: schedule.enrolment_confirmed,
                    };
                    outcome.certified.push(CertifiedItem {
                        schedule,
                        lines: deduction.lines,
                        ledger_credits: deduction.ledger_credits,
                        detail,
                    });
                }
                Err(EngineError::CalculationInvariant(reason)) => {
                    // Fatal for this one disbursement; siblings continue.
                    outcome
                        .errors
                        .push(format!("{}: {reason}", schedule.document_number));
                }
                Err(other) => return Err(other),
            }
        }

        Ok(outcome)
    }
}
