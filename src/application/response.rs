use super::summary::RunSummary;
use crate::domain::ports::{ScheduleStoreBox, TransferChannelBox};
use crate::error::{EngineError, Result};
use crate::interfaces::ecert::filename::feedback_prefix;
use crate::interfaces::ecert::records::{FeedbackDetail, FeedbackFile, FeedbackStatus};
use chrono::NaiveDate;
use tracing::{info, warn};

/// Applies inbound acknowledgement/cancellation files to the disbursement
/// repository.
///
/// A malformed file aborts only itself; sibling files in the same run keep
/// processing. A detail record naming an unknown document is a warning, since
/// a batch may legitimately reference records reconciled in a prior run.
pub struct ResponseProcessor {
    schedules: ScheduleStoreBox,
    transfer: TransferChannelBox,
}

impl ResponseProcessor {
    pub fn new(schedules: ScheduleStoreBox, transfer: TransferChannelBox) -> Self {
        Self {
            schedules,
            transfer,
        }
    }

    pub async fn process(&self, environment: &str, as_of: NaiveDate) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let names = self.transfer.list(&feedback_prefix(environment)).await?;
        info!(count = names.len(), "feedback files waiting");

        for name in names {
            let contents = self.transfer.download(&name).await?;
            match FeedbackFile::decode(&name, &contents) {
                Ok(file) => {
                    for detail in &file.details {
                        self.apply_detail(&name, detail, as_of, &mut summary)
                            .await?;
                    }
                    self.transfer.archive(&name).await?;
                    summary.files_processed += 1;
                }
                Err(EngineError::FileFormat { file, line, reason }) => {
                    // This file is unusable; leave it for investigation and
                    // carry on with its siblings.
                    summary.error(format!("{file} rejected at line {line}: {reason}"));
                }
                Err(other) => return Err(other),
            }
        }

        Ok(summary)
    }

    async fn apply_detail(
        &self,
        file: &str,
        detail: &FeedbackDetail,
        as_of: NaiveDate,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let Some(mut schedule) = self.schedules.get(&detail.document_number).await? else {
            summary.warn(format!(
                "{file} line {}: no schedule for document {}",
                detail.line_number, detail.document_number
            ));
            return Ok(());
        };

        let Some(status) = detail.status else {
            summary.warn(format!(
                "{file} line {}: unknown disbursement status for document {}",
                detail.line_number, detail.document_number
            ));
            return Ok(());
        };

        for code in &detail.error_codes {
            if !schedule.feedback_error_codes.contains(code) {
                schedule.feedback_error_codes.push(code.clone());
            }
        }

        let transition = match status {
            FeedbackStatus::Accepted => schedule.complete(as_of),
            FeedbackStatus::Cancelled | FeedbackStatus::Rejected => schedule.cancel(as_of),
        };

        match transition {
            Ok(()) => {
                match status {
                    FeedbackStatus::Accepted => summary.schedules_completed += 1,
                    _ => summary.schedules_cancelled += 1,
                }
                self.schedules.store(schedule).await?;
            }
            Err(EngineError::InvalidTransition { from, .. }) => {
                // Already reconciled by an earlier run, or the authority and
                // our records disagree; either way not fatal for the batch.
                warn!(
                    document = %detail.document_number,
                    %from,
                    "feedback transition not applicable"
                );
                summary.warn(format!(
                    "{file} line {}: document {} already {from}",
                    detail.line_number, detail.document_number
                ));
                self.schedules.store(schedule).await?;
            }
            Err(other) => return Err(other),
        }

        Ok(())
    }
}
