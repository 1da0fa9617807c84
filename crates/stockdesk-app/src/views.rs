// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ids::RecordKey;
use crate::model::{ConfirmStatus, StockRecord};

pub const VIEW_COLUMNS: [&str; 7] = [
    "Main office",
    "Sub office",
    "Date",
    "Category",
    "Product",
    "Confirmed",
    "Action",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Edit,
    Confirm,
    Reverse,
}

impl RowAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Edit => "Edit",
            Self::Confirm => "Confirm",
            Self::Reverse => "Reverse",
        }
    }

    /// Status the record moves to when a confirm-view action is taken.
    pub const fn target_status(self) -> Option<ConfirmStatus> {
        match self {
            Self::Edit => None,
            Self::Confirm => Some(ConfirmStatus::Confirmed),
            Self::Reverse => Some(ConfirmStatus::Pending),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRow {
    pub key: RecordKey,
    pub main_office: String,
    pub sub_office: String,
    pub date: String,
    pub category: String,
    pub product: String,
    pub status: ConfirmStatus,
    pub action: RowAction,
}

impl ViewRow {
    fn project(record: &StockRecord, action: RowAction) -> Self {
        Self {
            key: record.key,
            main_office: record.main_office.clone(),
            sub_office: record.sub_office.clone(),
            date: record.display_date(),
            category: record.category.clone(),
            product: record.product.clone(),
            status: record.confirm,
            action,
        }
    }

    pub fn cells(&self) -> [String; 7] {
        [
            self.main_office.clone(),
            self.sub_office.clone(),
            self.date.clone(),
            self.category.clone(),
            self.product.clone(),
            self.status.as_str().to_owned(),
            self.action.label().to_owned(),
        ]
    }
}

/// One row per record, in fetch order.
pub fn edit_view(records: &[StockRecord]) -> Vec<ViewRow> {
    records
        .iter()
        .map(|record| ViewRow::project(record, RowAction::Edit))
        .collect()
}

/// Pending rows first, then confirmed rows, each group in fetch order.
pub fn confirm_view(records: &[StockRecord]) -> Vec<ViewRow> {
    let (pending, confirmed): (Vec<&StockRecord>, Vec<&StockRecord>) =
        records.iter().partition(|record| record.is_pending());
    pending
        .into_iter()
        .map(|record| ViewRow::project(record, RowAction::Confirm))
        .chain(
            confirmed
                .into_iter()
                .map(|record| ViewRow::project(record, RowAction::Reverse)),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{RowAction, confirm_view, edit_view};
    use crate::{ConfirmStatus, RecordKey, StockRecord};

    fn record(key: i64, product: &str, confirm: ConfirmStatus) -> StockRecord {
        StockRecord {
            key: RecordKey::new(key),
            main_office: "North".to_owned(),
            sub_office: "Depot".to_owned(),
            date: "2024-01-02".to_owned(),
            category: "1-Bolts".to_owned(),
            product: product.to_owned(),
            confirm,
        }
    }

    #[test]
    fn confirm_view_puts_pending_first_and_keeps_order() {
        let records = vec![
            record(0, "a", ConfirmStatus::Confirmed),
            record(1, "b", ConfirmStatus::Pending),
            record(2, "c", ConfirmStatus::Pending),
        ];
        let rows = confirm_view(&records);
        let keys: Vec<i64> = rows.iter().map(|row| row.key.get()).collect();
        assert_eq!(keys, vec![1, 2, 0]);
        assert_eq!(
            rows.iter().map(|row| row.status).collect::<Vec<_>>(),
            vec![
                ConfirmStatus::Pending,
                ConfirmStatus::Pending,
                ConfirmStatus::Confirmed
            ]
        );
    }

    #[test]
    fn confirm_view_actions_match_status() {
        let records = vec![
            record(0, "a", ConfirmStatus::Confirmed),
            record(1, "b", ConfirmStatus::Pending),
        ];
        let rows = confirm_view(&records);
        assert_eq!(rows[0].action, RowAction::Confirm);
        assert_eq!(rows[1].action, RowAction::Reverse);
        assert_eq!(
            RowAction::Confirm.target_status(),
            Some(ConfirmStatus::Confirmed)
        );
        assert_eq!(
            RowAction::Reverse.target_status(),
            Some(ConfirmStatus::Pending)
        );
    }

    #[test]
    fn duplicate_records_keep_their_own_keys() {
        let records = vec![
            record(0, "same", ConfirmStatus::Confirmed),
            record(1, "same", ConfirmStatus::Pending),
            record(2, "same", ConfirmStatus::Confirmed),
        ];
        let keys: Vec<i64> = confirm_view(&records)
            .iter()
            .map(|row| row.key.get())
            .collect();
        assert_eq!(keys, vec![1, 0, 2]);
    }

    #[test]
    fn edit_view_keeps_fetch_order() {
        let records = vec![
            record(5, "z", ConfirmStatus::Confirmed),
            record(2, "a", ConfirmStatus::Pending),
        ];
        let rows = edit_view(&records);
        assert_eq!(rows[0].key, RecordKey::new(5));
        assert_eq!(rows[1].key, RecordKey::new(2));
        assert!(rows.iter().all(|row| row.action == RowAction::Edit));
        assert_eq!(rows[0].date, "02/01/2024");
        assert_eq!(rows[0].cells()[5], "Yes");
    }
}
