use super::schedule::OfferingIntensity;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// A signed Master Student Financial Assistance Agreement stays usable for
/// two years from its signing date.
pub const MSFAA_VALIDITY_DAYS: u64 = 730;

/// One issued MSFAA record.
///
/// `signed_date` stays unset until the student signs; an unsigned record is
/// pending signature and treated as currently valid. At most one record per
/// (student, intensity) is currently valid at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsfaaRecord {
    pub msfaa_number: u64,
    pub student_id: u32,
    pub application_id: u32,
    pub intensity: OfferingIntensity,
    pub signed_date: Option<NaiveDate>,
    pub cancelled_date: Option<NaiveDate>,
    pub created_at: NaiveDate,
}

impl MsfaaRecord {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled_date.is_some()
    }

    pub fn is_pending_signature(&self) -> bool {
        !self.is_cancelled() && self.signed_date.is_none()
    }

    /// Signed and inside the validity window as of the given date.
    pub fn is_signed_and_current(&self, as_of: NaiveDate) -> bool {
        if self.is_cancelled() {
            return false;
        }
        match self.signed_date {
            Some(signed) => {
                as_of >= signed
                    && (as_of - signed).num_days() as u64 <= MSFAA_VALIDITY_DAYS
            }
            None => false,
        }
    }

    /// Pending signature, or signed and current.
    pub fn is_currently_valid(&self, as_of: NaiveDate) -> bool {
        self.is_pending_signature() || self.is_signed_and_current(as_of)
    }
}

/// Whether an agreement signed at `start_date` still covers a study period
/// ending at `end_date`. A missing date is conservatively invalid.
pub fn is_valid_between(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> bool {
    match (start_date, end_date) {
        (Some(start), Some(end)) => {
            end >= start
                && end < start.checked_add_days(Days::new(MSFAA_VALIDITY_DAYS)).unwrap_or(end)
        }
        _ => false,
    }
}
