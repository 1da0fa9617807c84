// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

use crate::ids::RecordKey;
use crate::model::{ConfirmStatus, NewStockEntry, StockEntryUpdate, StockRecord};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The backend answered `success: false`; the message is for the user
    /// as-is.
    #[error("{0}")]
    Rejected(String),
    #[error("cannot reach backend: {0}")]
    Transport(String),
    #[error("backend returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("script error: {0}")]
    Script(String),
    #[error("malformed backend response: {0}")]
    Decode(String),
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Remote operations of the spreadsheet backend. Mutations return the
/// backend's confirmation message on success.
pub trait Backend {
    fn list_categories(&mut self) -> BackendResult<Vec<String>>;
    fn next_category_prefix(&mut self) -> BackendResult<String>;
    fn next_product_prefix(&mut self, category: &str) -> BackendResult<String>;
    fn list_records(&mut self) -> BackendResult<Vec<StockRecord>>;
    fn add_record(&mut self, entry: &NewStockEntry) -> BackendResult<String>;
    fn update_record(&mut self, key: RecordKey, entry: &StockEntryUpdate)
    -> BackendResult<String>;
    fn set_confirm(&mut self, key: RecordKey, status: ConfirmStatus) -> BackendResult<String>;
}

#[cfg(test)]
mod tests {
    use super::BackendError;

    #[test]
    fn rejected_error_displays_message_verbatim() {
        let error = BackendError::Rejected("Row 4 is locked".to_owned());
        assert_eq!(error.to_string(), "Row 4 is locked");
    }

    #[test]
    fn server_error_includes_status() {
        let error = BackendError::Server {
            status: 503,
            message: "unavailable".to_owned(),
        };
        assert_eq!(error.to_string(), "backend returned 503: unavailable");
    }
}
