use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// A malformed inbound file. Aborts processing of that one file only;
    /// sibling files in the same batch continue.
    #[error("malformed file {file} (line {line}): {reason}")]
    FileFormat {
        file: String,
        line: usize,
        reason: String,
    },
    /// An impossible computed value, e.g. a negative effective amount.
    /// Fatal for the disbursement it was computed for.
    #[error("calculation invariant violated: {0}")]
    CalculationInvariant(String),
    /// Sequence or ledger contention. The batch job retries with backoff.
    #[error("concurrency conflict: {0}")]
    ConcurrencyConflict(String),
    /// An illegal disbursement lifecycle transition.
    #[error("document {document_number}: cannot move from {from} to {attempted}")]
    InvalidTransition {
        document_number: String,
        from: String,
        attempted: String,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Storage or transfer channel unavailable. Aborts the run.
    #[error("infrastructure error: {0}")]
    Infrastructure(#[from] std::io::Error),
    #[error("validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
