// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use stockdesk_app::{
    Backend, BackendError, BackendResult, ConfirmStatus, NewStockEntry, RecordKey,
    StockEntryUpdate, StockRecord,
};

const MAIN_OFFICES: [&str; 3] = ["North", "Harbour", "Central"];
const SUB_OFFICES: [&str; 4] = ["Depot 1", "Depot 2", "Yard", "Annex"];
const CATEGORIES: [&str; 3] = ["1-Fasteners", "2-Bolts", "3-Cabling"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Operation {
    ListCategories,
    NextCategoryPrefix,
    NextProductPrefix,
    ListRecords,
    AddRecord,
    UpdateRecord,
    SetConfirm,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list_categories: usize,
    pub next_category_prefix: usize,
    pub next_product_prefix: usize,
    pub list_records: usize,
    pub add_record: usize,
    pub update_record: usize,
    pub set_confirm: usize,
}

impl CallCounts {
    fn bump(&mut self, operation: Operation) {
        let slot = match operation {
            Operation::ListCategories => &mut self.list_categories,
            Operation::NextCategoryPrefix => &mut self.next_category_prefix,
            Operation::NextProductPrefix => &mut self.next_product_prefix,
            Operation::ListRecords => &mut self.list_records,
            Operation::AddRecord => &mut self.add_record,
            Operation::UpdateRecord => &mut self.update_record,
            Operation::SetConfirm => &mut self.set_confirm,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        self.list_categories
            + self.next_category_prefix
            + self.next_product_prefix
            + self.list_records
            + self.add_record
            + self.update_record
            + self.set_confirm
    }
}

/// In-process stand-in for the spreadsheet backend. Counts every call,
/// records every mutation it was asked to make, and fails the operations
/// registered with [`MockBackend::fail_on`].
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    pub categories: Vec<String>,
    pub next_category_prefix: String,
    pub product_prefixes: BTreeMap<String, String>,
    pub records: Vec<StockRecord>,
    pub calls: CallCounts,
    pub added: Vec<NewStockEntry>,
    pub updates: Vec<(RecordKey, StockEntryUpdate)>,
    pub confirmations: Vec<(RecordKey, ConfirmStatus)>,
    failures: BTreeMap<Operation, BackendError>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend holding `sample_records()` and the sample categories.
    pub fn seeded() -> Self {
        let mut product_prefixes = BTreeMap::new();
        for (index, code) in CATEGORIES.iter().enumerate() {
            product_prefixes.insert((*code).to_owned(), format!("{}-4-", index + 1));
        }
        Self {
            categories: CATEGORIES.iter().map(|code| (*code).to_owned()).collect(),
            next_category_prefix: format!("{}-", CATEGORIES.len() + 1),
            product_prefixes,
            records: sample_records(),
            ..Self::default()
        }
    }

    pub fn fail_on(&mut self, operation: Operation, error: BackendError) {
        self.failures.insert(operation, error);
    }

    pub fn clear_failure(&mut self, operation: Operation) {
        self.failures.remove(&operation);
    }

    fn enter(&mut self, operation: Operation) -> BackendResult<()> {
        self.calls.bump(operation);
        match self.failures.get(&operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl Backend for MockBackend {
    fn list_categories(&mut self) -> BackendResult<Vec<String>> {
        self.enter(Operation::ListCategories)?;
        Ok(self.categories.clone())
    }

    fn next_category_prefix(&mut self) -> BackendResult<String> {
        self.enter(Operation::NextCategoryPrefix)?;
        Ok(self.next_category_prefix.clone())
    }

    fn next_product_prefix(&mut self, category: &str) -> BackendResult<String> {
        self.enter(Operation::NextProductPrefix)?;
        Ok(self
            .product_prefixes
            .get(category)
            .cloned()
            .unwrap_or_else(|| format!("{category}-1-")))
    }

    fn list_records(&mut self) -> BackendResult<Vec<StockRecord>> {
        self.enter(Operation::ListRecords)?;
        Ok(self.records.clone())
    }

    fn add_record(&mut self, entry: &NewStockEntry) -> BackendResult<String> {
        self.enter(Operation::AddRecord)?;
        self.added.push(entry.clone());
        self.records.push(StockRecord {
            key: RecordKey::from_position(self.records.len()),
            main_office: entry.main_office.clone(),
            sub_office: entry.sub_office.clone(),
            date: entry.date.clone(),
            category: entry.category.clone(),
            product: entry.product.clone(),
            confirm: ConfirmStatus::Pending,
        });
        if !self.categories.contains(&entry.category) {
            self.categories.push(entry.category.clone());
        }
        Ok("Item added successfully".to_owned())
    }

    fn update_record(
        &mut self,
        key: RecordKey,
        entry: &StockEntryUpdate,
    ) -> BackendResult<String> {
        self.enter(Operation::UpdateRecord)?;
        self.updates.push((key, entry.clone()));
        let record = self
            .records
            .iter_mut()
            .find(|record| record.key == key)
            .ok_or_else(|| BackendError::Rejected(format!("Row {key} not found")))?;
        record.main_office = entry.main_office.clone();
        record.sub_office = entry.sub_office.clone();
        record.date = entry.date.clone();
        record.category = entry.category.clone();
        record.product = entry.product.clone();
        record.confirm = entry.confirm;
        Ok("Item updated successfully".to_owned())
    }

    fn set_confirm(&mut self, key: RecordKey, status: ConfirmStatus) -> BackendResult<String> {
        self.enter(Operation::SetConfirm)?;
        self.confirmations.push((key, status));
        let record = self
            .records
            .iter_mut()
            .find(|record| record.key == key)
            .ok_or_else(|| BackendError::Rejected(format!("Row {key} not found")))?;
        record.confirm = status;
        Ok("Status updated".to_owned())
    }
}

pub fn sample_record(key: i64, confirm: ConfirmStatus) -> StockRecord {
    let slot = usize::try_from(key).unwrap_or(0);
    StockRecord {
        key: RecordKey::new(key),
        main_office: MAIN_OFFICES[slot % MAIN_OFFICES.len()].to_owned(),
        sub_office: SUB_OFFICES[slot % SUB_OFFICES.len()].to_owned(),
        date: format!("2024-03-{:02}T00:00:00.000Z", slot % 28 + 1),
        category: CATEGORIES[slot % CATEGORIES.len()].to_owned(),
        product: format!("{}-{}-Item {key}", slot % CATEGORIES.len() + 1, slot + 1),
        confirm,
    }
}

/// Three rows in the sheet's natural order: confirmed, pending, pending.
pub fn sample_records() -> Vec<StockRecord> {
    vec![
        sample_record(0, ConfirmStatus::Confirmed),
        sample_record(1, ConfirmStatus::Pending),
        sample_record(2, ConfirmStatus::Pending),
    ]
}
