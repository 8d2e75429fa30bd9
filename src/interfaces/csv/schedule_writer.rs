use crate::domain::schedule::DisbursementSchedule;
use crate::error::Result;
use std::io::Write;

/// Writes final schedule states as CSV, one row per schedule.
pub struct ScheduleWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ScheduleWriter<W> {
    pub fn new(target: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(target),
        }
    }

    pub fn write_schedules(&mut self, schedules: &[DisbursementSchedule]) -> Result<()> {
        self.writer.write_record([
            "document_number",
            "status",
            "total_effective",
            "reasons",
            "feedback_error_codes",
        ])?;

        for schedule in schedules {
            let reasons = schedule
                .ineligibility_reasons
                .iter()
                .map(|r| format!("{r:?}"))
                .collect::<Vec<_>>()
                .join("|");
            let status = schedule.status.to_string();
            let total = schedule.total_effective().to_string();
            let codes = schedule.feedback_error_codes.join("|");
            self.writer.write_record([
                schedule.document_number.as_str(),
                status.as_str(),
                total.as_str(),
                reasons.as_str(),
                codes.as_str(),
            ])?;
        }

        self.writer.flush()?;
        Ok(())
    }
}
