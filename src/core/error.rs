use crate::transaction::TransactionId;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DbError {
    #[error("Key '{0}' not found")]
    KeyNotFound(String),

    #[error("Key '{0}' not visible in snapshot")]
    KeyNotVisible(String),

    #[error("Write-write conflict on key '{0}'")]
    WriteWriteConflict(String),

    #[error("Transaction {0} is not active")]
    TransactionNotActive(TransactionId),
}

pub type Result<T> = std::result::Result<T, DbError>;
