use super::agreement::MsfaaRecord;
use super::award::ValueCode;
use super::overaward::OverawardEntry;
use super::schedule::{DisbursementSchedule, OfferingIntensity};
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Disbursement schedule repository owned by the surrounding system.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Pending schedules whose disbursement date has entered the
    /// certification window as of the given date, in creation order.
    async fn due_for_certification(&self, window_end: NaiveDate)
    -> Result<Vec<DisbursementSchedule>>;
    async fn get(&self, document_number: &str) -> Result<Option<DisbursementSchedule>>;
    async fn store(&self, schedule: DisbursementSchedule) -> Result<()>;
    async fn all(&self) -> Result<Vec<DisbursementSchedule>>;
}

/// Append-only overaward ledger.
#[async_trait]
pub trait OverawardStore: Send + Sync {
    /// Outstanding balance per value code for one student (sum of entries).
    async fn balances(&self, student_id: u32) -> Result<HashMap<ValueCode, Decimal>>;
    async fn append(&self, entry: OverawardEntry) -> Result<()>;
    async fn entries(&self, student_id: u32) -> Result<Vec<OverawardEntry>>;
}

/// MSFAA records plus the intensity-scoped number sequence.
#[async_trait]
pub trait MsfaaStore: Send + Sync {
    /// Allocates the next agreement number. Implementations must serialize
    /// allocation so concurrent callers never receive the same number.
    async fn next_sequence(&self, intensity: OfferingIntensity) -> Result<u64>;
    async fn store(&self, record: MsfaaRecord) -> Result<()>;
    /// All records for the pair, most recently created first.
    async fn records_for(
        &self,
        student_id: u32,
        intensity: OfferingIntensity,
    ) -> Result<Vec<MsfaaRecord>>;
}

/// Lookup into the externally managed restriction system.
#[async_trait]
pub trait RestrictionStore: Send + Sync {
    async fn has_stop_disbursement(&self, student_id: u32) -> Result<bool>;
}

/// Identity fields carried on certificate detail records.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StudentProfile {
    pub student_id: u32,
    pub sin: String,
    pub surname: String,
    pub given_name: String,
    pub birth_date: NaiveDate,
}

/// Student/assessment facts owned by the surrounding system.
#[async_trait]
pub trait StudentStore: Send + Sync {
    async fn profile(&self, student_id: u32) -> Result<Option<StudentProfile>>;
    async fn disability_verified(&self, student_id: u32) -> Result<bool>;
    async fn part_time_loan_limit_reached(&self, student_id: u32) -> Result<bool>;
}

/// Remote file-transfer channel to the funding authority.
#[async_trait]
pub trait TransferChannel: Send + Sync {
    /// Uploads a complete file. A partially written file must never be
    /// observable under `name`: implementations write to a temporary name
    /// and promote atomically on success.
    async fn upload(&self, name: &str, contents: &str) -> Result<()>;
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;
    async fn download(&self, name: &str) -> Result<String>;
    /// Moves a processed inbound file out of the pickup location.
    async fn archive(&self, name: &str) -> Result<()>;
}

pub type ScheduleStoreBox = Box<dyn ScheduleStore>;
pub type OverawardStoreBox = Box<dyn OverawardStore>;
pub type MsfaaStoreBox = Box<dyn MsfaaStore>;
pub type RestrictionStoreBox = Box<dyn RestrictionStore>;
pub type StudentStoreBox = Box<dyn StudentStore>;
pub type TransferChannelBox = Box<dyn TransferChannel>;
