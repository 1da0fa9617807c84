// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::dates::format_display_date;
use crate::ids::RecordKey;

/// Product prefix shown before the backend has answered for a category.
pub const DEFAULT_PRODUCT_PREFIX: &str = "1-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfirmStatus {
    Pending,
    Confirmed,
}

impl ConfirmStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "No",
            Self::Confirmed => "Yes",
        }
    }

    /// Decodes the sheet's `Confirm` column. Anything other than "Yes" is still
    /// awaiting confirmation.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("yes") {
            Self::Confirmed
        } else {
            Self::Pending
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Pending => Self::Confirmed,
            Self::Confirmed => Self::Pending,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub key: RecordKey,
    pub main_office: String,
    pub sub_office: String,
    pub date: String,
    pub category: String,
    pub product: String,
    pub confirm: ConfirmStatus,
}

impl StockRecord {
    pub fn display_date(&self) -> String {
        format_display_date(&self.date)
    }

    pub fn is_pending(&self) -> bool {
        self.confirm == ConfirmStatus::Pending
    }
}

/// The record set as of the last successful fetch. Replaced wholesale on
/// every refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    records: Vec<StockRecord>,
}

impl RecordSet {
    pub fn new(records: Vec<StockRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[StockRecord] {
        &self.records
    }

    pub fn get(&self, key: RecordKey) -> Option<&StockRecord> {
        self.records.iter().find(|record| record.key == key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.records.iter().filter(|record| record.is_pending()).count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryList {
    codes: Vec<String>,
    next_prefix: String,
}

impl CategoryList {
    pub fn new(codes: Vec<String>, next_prefix: impl Into<String>) -> Self {
        Self {
            codes,
            next_prefix: next_prefix.into(),
        }
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn next_prefix(&self) -> &str {
        &self.next_prefix
    }

    pub fn position(&self, code: &str) -> Option<usize> {
        self.codes.iter().position(|candidate| candidate == code)
    }
}

/// Fields sent to `addStockItem`, after code resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStockEntry {
    pub main_office: String,
    pub sub_office: String,
    pub date: String,
    pub category: String,
    pub product: String,
}

/// Full field set sent to `updateStockItem`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockEntryUpdate {
    pub main_office: String,
    pub sub_office: String,
    pub date: String,
    pub category: String,
    pub product: String,
    pub confirm: ConfirmStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabKind {
    Add,
    Edit,
    Confirm,
}

impl TabKind {
    pub const ALL: [Self; 3] = [Self::Add, Self::Edit, Self::Confirm];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Add => "Add entry",
            Self::Edit => "Edit entries",
            Self::Confirm => "Confirm entries",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Danger,
}

/// A human-readable message shown next to the form or table it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            text: text.into(),
        }
    }

    pub fn danger(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Danger,
            text: text.into(),
        }
    }
}
