use serde::Serialize;

/// Structured outcome of one batch run, consumed by operational monitoring.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunSummary {
    pub files_produced: u32,
    pub files_processed: u32,
    pub schedules_certified: u32,
    pub schedules_skipped: u32,
    pub schedules_completed: u32,
    pub schedules_cancelled: u32,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl RunSummary {
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.warnings.push(message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{message}");
        self.errors.push(message);
    }
}
