//! Shared fixtures for unit tests.

use crate::domain::agreement::MsfaaRecord;
use crate::domain::award::{AwardLine, ValueCode};
use crate::domain::money::Amount;
use crate::domain::ports::StudentProfile;
use crate::domain::remittance::OfferingCosts;
use crate::domain::schedule::{DisbursementSchedule, DisbursementStatus, OfferingIntensity};
use crate::infrastructure::in_memory::StudentFacts;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub fn pending_schedule(
    document_number: &str,
    student_id: u32,
    created_order: u32,
    loan_amount: Decimal,
) -> DisbursementSchedule {
    DisbursementSchedule {
        document_number: document_number.to_string(),
        student_id,
        application_id: 10,
        intensity: OfferingIntensity::FullTime,
        disbursement_date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
        created_order,
        enrolment_confirmed: true,
        first_of_application: created_order == 1,
        msfaa_number: Some(920000001),
        offering_costs: OfferingCosts {
            actual_tuition: Amount::new(dec!(5000)).unwrap(),
            program_related_costs: Amount::ZERO,
        },
        awards: vec![AwardLine::new(
            ValueCode::CSLF,
            Amount::new(loan_amount).unwrap(),
        )],
        status: DisbursementStatus::Pending,
        status_date: None,
        ineligibility_reasons: vec![],
        feedback_error_codes: vec![],
    }
}

pub fn facts(student_id: u32) -> StudentFacts {
    StudentFacts {
        profile: StudentProfile {
            student_id,
            sin: "123456789".to_string(),
            surname: "Tremblay".to_string(),
            given_name: "Pascale".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2001, 2, 28).unwrap(),
        },
        disability_verified: true,
        part_time_loan_limit_reached: false,
    }
}

pub fn msfaa_signed(student_id: u32, msfaa_number: u64) -> MsfaaRecord {
    MsfaaRecord {
        msfaa_number,
        student_id,
        application_id: 10,
        intensity: OfferingIntensity::FullTime,
        signed_date: Some(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()),
        cancelled_date: None,
        created_at: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
    }
}
