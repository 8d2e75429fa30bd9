use crate::domain::agreement::MsfaaRecord;
use crate::domain::award::ValueCode;
use crate::domain::overaward::OverawardEntry;
use crate::domain::ports::{
    MsfaaStore, OverawardStore, RestrictionStore, ScheduleStore, StudentProfile, StudentStore,
};
use crate::domain::schedule::{DisbursementSchedule, DisbursementStatus, OfferingIntensity};
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory disbursement repository.
///
/// Uses `Arc<RwLock<HashMap>>` for shared concurrent access. Used by the CLI
/// fixture runs and by tests; production deployments plug in the surrounding
/// system's repository.
#[derive(Default, Clone)]
pub struct InMemoryScheduleStore {
    schedules: Arc<RwLock<HashMap<String, DisbursementSchedule>>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, schedules: Vec<DisbursementSchedule>) {
        let mut map = self.schedules.write().await;
        for schedule in schedules {
            map.insert(schedule.document_number.clone(), schedule);
        }
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn due_for_certification(
        &self,
        window_end: NaiveDate,
    ) -> Result<Vec<DisbursementSchedule>> {
        let map = self.schedules.read().await;
        let mut due: Vec<DisbursementSchedule> = map
            .values()
            .filter(|s| {
                s.status == DisbursementStatus::Pending && s.disbursement_date <= window_end
            })
            .cloned()
            .collect();
        // Creation order within a student is the deduction order contract.
        due.sort_by(|a, b| {
            (a.student_id, a.created_order, a.document_number.as_str()).cmp(&(
                b.student_id,
                b.created_order,
                b.document_number.as_str(),
            ))
        });
        Ok(due)
    }

    async fn get(&self, document_number: &str) -> Result<Option<DisbursementSchedule>> {
        let map = self.schedules.read().await;
        Ok(map.get(document_number).cloned())
    }

    async fn store(&self, schedule: DisbursementSchedule) -> Result<()> {
        let mut map = self.schedules.write().await;
        map.insert(schedule.document_number.clone(), schedule);
        Ok(())
    }

    async fn all(&self) -> Result<Vec<DisbursementSchedule>> {
        let map = self.schedules.read().await;
        let mut all: Vec<DisbursementSchedule> = map.values().cloned().collect();
        all.sort_by(|a, b| a.document_number.cmp(&b.document_number));
        Ok(all)
    }
}

/// Append-only in-memory overaward ledger.
#[derive(Default, Clone)]
pub struct InMemoryOverawardStore {
    entries: Arc<RwLock<Vec<OverawardEntry>>>,
}

impl InMemoryOverawardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, entries: Vec<OverawardEntry>) {
        self.entries.write().await.extend(entries);
    }
}

#[async_trait]
impl OverawardStore for InMemoryOverawardStore {
    async fn balances(&self, student_id: u32) -> Result<HashMap<ValueCode, Decimal>> {
        let entries = self.entries.read().await;
        let mut balances: HashMap<ValueCode, Decimal> = HashMap::new();
        for entry in entries.iter().filter(|e| e.student_id == student_id) {
            *balances.entry(entry.value_code).or_insert(Decimal::ZERO) += entry.amount;
        }
        Ok(balances)
    }

    async fn append(&self, entry: OverawardEntry) -> Result<()> {
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn entries(&self, student_id: u32) -> Result<Vec<OverawardEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|e| e.student_id == student_id)
            .cloned()
            .collect())
    }
}

const FULL_TIME_SEQUENCE_START: u64 = 920_000_000;
const PART_TIME_SEQUENCE_START: u64 = 960_000_000;

/// Agreement numbers are carried in a ten-digit wire field.
const MSFAA_NUMBER_MAX: u64 = 9_999_999_999;

/// MSFAA records plus the per-intensity number sequences.
///
/// `next_sequence` allocates under the write lock, so concurrent callers are
/// serialized and never see the same number.
#[derive(Clone)]
pub struct InMemoryMsfaaStore {
    records: Arc<RwLock<Vec<MsfaaRecord>>>,
    sequences: Arc<RwLock<HashMap<OfferingIntensity, u64>>>,
}

impl Default for InMemoryMsfaaStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMsfaaStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            sequences: Arc::new(RwLock::new(HashMap::from([
                (OfferingIntensity::FullTime, FULL_TIME_SEQUENCE_START),
                (OfferingIntensity::PartTime, PART_TIME_SEQUENCE_START),
            ]))),
        }
    }

    pub async fn seed(&self, records: Vec<MsfaaRecord>) {
        self.records.write().await.extend(records);
    }
}

#[async_trait]
impl MsfaaStore for InMemoryMsfaaStore {
    async fn next_sequence(&self, intensity: OfferingIntensity) -> Result<u64> {
        let mut sequences = self.sequences.write().await;
        let next = sequences
            .entry(intensity)
            .and_modify(|n| *n += 1)
            .or_insert(1);
        if *next > MSFAA_NUMBER_MAX {
            return Err(crate::error::EngineError::ConcurrencyConflict(format!(
                "msfaa number sequence exhausted for {intensity:?}"
            )));
        }
        Ok(*next)
    }

    async fn store(&self, record: MsfaaRecord) -> Result<()> {
        let mut records = self.records.write().await;
        match records
            .iter_mut()
            .find(|r| r.msfaa_number == record.msfaa_number)
        {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        Ok(())
    }

    async fn records_for(
        &self,
        student_id: u32,
        intensity: OfferingIntensity,
    ) -> Result<Vec<MsfaaRecord>> {
        let records = self.records.read().await;
        let mut matching: Vec<MsfaaRecord> = records
            .iter()
            .filter(|r| r.student_id == student_id && r.intensity == intensity)
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.msfaa_number.cmp(&a.msfaa_number))
        });
        Ok(matching)
    }
}

/// Stop-disbursement restriction flags keyed by student.
#[derive(Default, Clone)]
pub struct InMemoryRestrictionStore {
    restricted: Arc<RwLock<HashSet<u32>>>,
}

impl InMemoryRestrictionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn restrict(&self, student_id: u32) {
        self.restricted.write().await.insert(student_id);
    }
}

#[async_trait]
impl RestrictionStore for InMemoryRestrictionStore {
    async fn has_stop_disbursement(&self, student_id: u32) -> Result<bool> {
        Ok(self.restricted.read().await.contains(&student_id))
    }
}

/// Student identity plus the assessment facts eligibility checks consult.
#[derive(Debug, Clone)]
pub struct StudentFacts {
    pub profile: StudentProfile,
    pub disability_verified: bool,
    pub part_time_loan_limit_reached: bool,
}

#[derive(Default, Clone)]
pub struct InMemoryStudentStore {
    students: Arc<RwLock<HashMap<u32, StudentFacts>>>,
}

impl InMemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, facts: Vec<StudentFacts>) {
        let mut map = self.students.write().await;
        for f in facts {
            map.insert(f.profile.student_id, f);
        }
    }
}

#[async_trait]
impl StudentStore for InMemoryStudentStore {
    async fn profile(&self, student_id: u32) -> Result<Option<StudentProfile>> {
        let map = self.students.read().await;
        Ok(map.get(&student_id).map(|f| f.profile.clone()))
    }

    async fn disability_verified(&self, student_id: u32) -> Result<bool> {
        let map = self.students.read().await;
        Ok(map.get(&student_id).is_some_and(|f| f.disability_verified))
    }

    async fn part_time_loan_limit_reached(&self, student_id: u32) -> Result<bool> {
        let map = self.students.read().await;
        Ok(map
            .get(&student_id)
            .is_some_and(|f| f.part_time_loan_limit_reached))
    }
}
