use crate::domain::flow::FlowStep;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Intent `{intent}` is not accepted on the {step} step")]
    InvalidTransition { intent: &'static str, step: FlowStep },
    #[error("A payer mode must be selected before continuing")]
    PayerModeRequired,
    #[error("A verification is already in progress")]
    VerificationInProgress,
    #[error("Flow has ended on the {0} step")]
    FlowClosed(FlowStep),
    #[error("Verification service error: {0}")]
    VerifierError(String),
    #[error("Bank connection error: {0}")]
    BankError(String),
    #[error("Address lookup error: {0}")]
    AddressLookupError(String),
    #[error("Flow session is no longer running")]
    SessionClosed,
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, FlowError>;
