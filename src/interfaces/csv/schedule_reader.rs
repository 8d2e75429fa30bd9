use crate::domain::award::{AwardLine, ValueCode};
use crate::domain::money::Amount;
use crate::domain::remittance::OfferingCosts;
use crate::domain::schedule::{DisbursementSchedule, DisbursementStatus, OfferingIntensity};
use crate::error::{EngineError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One CSV row of the disbursement intake: a single award line plus the
/// attributes of the schedule it belongs to. Consecutive rows sharing a
/// document number form one schedule.
#[derive(Debug, Deserialize)]
pub struct ScheduleRow {
    pub document_number: String,
    pub student_id: u32,
    pub application_id: u32,
    pub intensity: OfferingIntensity,
    pub disbursement_date: NaiveDate,
    pub created_order: u32,
    pub enrolment_confirmed: bool,
    pub first_of_application: bool,
    pub msfaa_number: Option<u64>,
    pub actual_tuition: Decimal,
    pub program_related_costs: Decimal,
    pub status: DisbursementStatus,
    pub value_code: String,
    pub estimated_amount: Decimal,
}

/// Reads disbursement schedules from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record lengths,
/// and groups award-line rows into schedules in a streaming pass.
pub struct ScheduleReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ScheduleReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Reads every row and assembles schedules, in file order.
    pub fn schedules(self) -> Result<Vec<DisbursementSchedule>> {
        let mut schedules: Vec<DisbursementSchedule> = Vec::new();

        for row in self.reader.into_deserialize::<ScheduleRow>() {
            let row = row?;
            let value_code = ValueCode::parse(&row.value_code).ok_or_else(|| {
                EngineError::Validation(format!("unknown award value code {:?}", row.value_code))
            })?;
            let line = AwardLine::new(value_code, Amount::new(row.estimated_amount)?);

            match schedules
                .last_mut()
                .filter(|s| s.document_number == row.document_number)
            {
                Some(schedule) => schedule.awards.push(line),
                None => schedules.push(DisbursementSchedule {
                    document_number: row.document_number,
                    student_id: row.student_id,
                    application_id: row.application_id,
                    intensity: row.intensity,
                    disbursement_date: row.disbursement_date,
                    created_order: row.created_order,
                    enrolment_confirmed: row.enrolment_confirmed,
                    first_of_application: row.first_of_application,
                    msfaa_number: row.msfaa_number,
                    offering_costs: OfferingCosts {
                        actual_tuition: Amount::new(row.actual_tuition)?,
                        program_related_costs: Amount::new(row.program_related_costs)?,
                    },
                    awards: vec![line],
                    status: row.status,
                    status_date: None,
                    ineligibility_reasons: vec![],
                    feedback_error_codes: vec![],
                }),
            }
        }

        Ok(schedules)
    }
}
