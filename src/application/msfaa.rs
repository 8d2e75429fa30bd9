use crate::domain::agreement::MsfaaRecord;
use crate::domain::ports::MsfaaStoreBox;
use crate::domain::schedule::OfferingIntensity;
use crate::error::Result;
use chrono::NaiveDate;

/// Issues and resolves MSFAA records, one lineage per (student, intensity).
pub struct MsfaaManager {
    store: MsfaaStoreBox,
}

impl MsfaaManager {
    pub fn new(store: MsfaaStoreBox) -> Self {
        Self { store }
    }

    /// Issues a new agreement with the next number from the intensity-scoped
    /// sequence. Any previous non-cancelled record for the pair is cancelled
    /// first, keeping at most one currently valid record per
    /// (student, intensity).
    pub async fn create(
        &self,
        student_id: u32,
        application_id: u32,
        intensity: OfferingIntensity,
        today: NaiveDate,
    ) -> Result<MsfaaRecord> {
        for mut prior in self.store.records_for(student_id, intensity).await? {
            if !prior.is_cancelled() {
                prior.cancelled_date = Some(today);
                self.store.store(prior).await?;
            }
        }

        let msfaa_number = self.store.next_sequence(intensity).await?;
        let record = MsfaaRecord {
            msfaa_number,
            student_id,
            application_id,
            intensity,
            signed_date: None,
            cancelled_date: None,
            created_at: today,
        };
        self.store.store(record.clone()).await?;
        tracing::debug!(
            student_id,
            msfaa_number,
            "issued msfaa agreement pending signature"
        );
        Ok(record)
    }

    /// The currently valid agreement for the pair, if any.
    ///
    /// A record pending signature is always current and wins over a
    /// signed-but-expiring one; otherwise the most recent signed record
    /// inside the validity window is returned.
    pub async fn current_valid(
        &self,
        student_id: u32,
        intensity: OfferingIntensity,
        as_of: NaiveDate,
    ) -> Result<Option<MsfaaRecord>> {
        let records = self.store.records_for(student_id, intensity).await?;

        let pending = records.iter().find(|r| r.is_pending_signature());
        if let Some(record) = pending {
            return Ok(Some(record.clone()));
        }

        Ok(records
            .iter()
            .find(|r| r.is_signed_and_current(as_of))
            .cloned())
    }
}
