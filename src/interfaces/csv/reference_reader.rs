use crate::domain::agreement::MsfaaRecord;
use crate::domain::award::ValueCode;
use crate::domain::overaward::{OverawardEntry, OverawardOrigin};
use crate::domain::ports::StudentProfile;
use crate::domain::schedule::OfferingIntensity;
use crate::error::{EngineError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::io::Read;

fn rows<R: Read, T: DeserializeOwned>(source: R) -> impl Iterator<Item = Result<T>> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(source)
        .into_deserialize()
        .map(|r| r.map_err(EngineError::from))
}

/// One student of the reference fixture, combining the identity profile with
/// the assessment facts the eligibility checks consult.
#[derive(Debug, Clone, Deserialize)]
pub struct StudentRow {
    pub student_id: u32,
    pub sin: String,
    pub surname: String,
    pub given_name: String,
    pub birth_date: NaiveDate,
    pub disability_verified: bool,
    pub part_time_loan_limit_reached: bool,
    pub stop_disbursement_restriction: bool,
}

impl StudentRow {
    pub fn profile(&self) -> StudentProfile {
        StudentProfile {
            student_id: self.student_id,
            sin: self.sin.clone(),
            surname: self.surname.clone(),
            given_name: self.given_name.clone(),
            birth_date: self.birth_date,
        }
    }
}

pub fn read_students<R: Read>(source: R) -> Result<Vec<StudentRow>> {
    rows(source).collect()
}

#[derive(Debug, Deserialize)]
struct OverawardRow {
    student_id: u32,
    value_code: String,
    amount: Decimal,
    origin: OverawardOrigin,
    application_id: Option<u32>,
    created_at: NaiveDate,
}

pub fn read_overawards<R: Read>(source: R) -> Result<Vec<OverawardEntry>> {
    rows(source)
        .map(|row| {
            let row: OverawardRow = row?;
            let value_code = ValueCode::parse(&row.value_code).ok_or_else(|| {
                EngineError::Validation(format!("unknown award value code {:?}", row.value_code))
            })?;
            Ok(OverawardEntry {
                student_id: row.student_id,
                value_code,
                amount: row.amount,
                origin: row.origin,
                application_id: row.application_id,
                created_at: row.created_at,
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct MsfaaRow {
    msfaa_number: u64,
    student_id: u32,
    application_id: u32,
    intensity: OfferingIntensity,
    signed_date: Option<NaiveDate>,
    cancelled_date: Option<NaiveDate>,
    created_at: NaiveDate,
}

pub fn read_msfaas<R: Read>(source: R) -> Result<Vec<MsfaaRecord>> {
    rows(source)
        .map(|row| {
            let row: MsfaaRow = row?;
            Ok(MsfaaRecord {
                msfaa_number: row.msfaa_number,
                student_id: row.student_id,
                application_id: row.application_id,
                intensity: row.intensity,
                signed_date: row.signed_date,
                cancelled_date: row.cancelled_date,
                created_at: row.created_at,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_read_students() {
        let data = "student_id,sin,surname,given_name,birth_date,disability_verified,part_time_loan_limit_reached,stop_disbursement_restriction\n\
                    1,123456789,Côté,Amélie,2001-02-28,true,false,false\n";
        let students = read_students(data.as_bytes()).unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].profile().surname, "Côté");
    }

    #[test]
    fn test_read_overawards_signed_amounts() {
        let data = "student_id,value_code,amount,origin,application_id,created_at\n\
                    1,CSLF,250.00,legacy,,2024-05-01\n\
                    1,CSLF,-100.00,award-deducted,10,2025-01-15\n";
        let entries = read_overawards(data.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].origin, OverawardOrigin::Legacy);
        assert_eq!(entries[1].amount, dec!(-100));
        assert_eq!(entries[1].application_id, Some(10));
    }

    #[test]
    fn test_read_msfaas_optional_dates() {
        let data = "msfaa_number,student_id,application_id,intensity,signed_date,cancelled_date,created_at\n\
                    920000001,1,10,fulltime,2026-01-05,,2026-01-01\n\
                    920000002,1,10,parttime,,,2026-02-01\n";
        let records = read_msfaas(data.as_bytes()).unwrap();
        assert_eq!(records[0].signed_date, Some(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()));
        assert!(records[1].is_pending_signature());
    }
}
