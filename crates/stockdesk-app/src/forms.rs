// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

use crate::codes::{CategoryInput, ProductInput};
use crate::dates::{format_display_date, is_valid_date};
use crate::ids::RecordKey;
use crate::model::{ConfirmStatus, NewStockEntry, StockEntryUpdate, StockRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill all required fields")]
    MissingField,
    #[error("Please enter a valid date in DD/MM/YYYY format")]
    InvalidDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddField {
    MainOffice,
    SubOffice,
    Date,
    Category,
    NewCategory,
    Product,
    NewProduct,
}

impl AddField {
    pub const ALL: [Self; 7] = [
        Self::MainOffice,
        Self::SubOffice,
        Self::Date,
        Self::Category,
        Self::NewCategory,
        Self::Product,
        Self::NewProduct,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::MainOffice => "Main office",
            Self::SubOffice => "Sub office",
            Self::Date => "Date",
            Self::Category => "Category",
            Self::NewCategory => "New category",
            Self::Product => "Product",
            Self::NewProduct => "New product",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddForm {
    pub main_office: String,
    pub sub_office: String,
    pub date: String,
    pub category: CategoryInput,
    pub product: ProductInput,
}

impl AddForm {
    /// Fields the user can currently reach. Panel inputs only exist while
    /// their panel is open, and the selector is skipped while it is locked.
    pub fn active_fields(&self) -> Vec<AddField> {
        AddField::ALL
            .into_iter()
            .filter(|field| match field {
                AddField::Category => !self.category.selector_locked(),
                AddField::NewCategory => self.category.new_panel_open,
                AddField::Product => !self.product.new_panel_open,
                AddField::NewProduct => self.product.new_panel_open,
                _ => true,
            })
            .collect()
    }

    /// Free-text buffer behind a field. The category selector is a choice,
    /// not text, so it has none.
    pub fn text_mut(&mut self, field: AddField) -> Option<&mut String> {
        match field {
            AddField::MainOffice => Some(&mut self.main_office),
            AddField::SubOffice => Some(&mut self.sub_office),
            AddField::Date => Some(&mut self.date),
            AddField::Category => None,
            AddField::NewCategory => Some(&mut self.category.new_name),
            AddField::Product => Some(&mut self.product.value),
            AddField::NewProduct => Some(&mut self.product.new_name),
        }
    }

    pub fn text(&self, field: AddField) -> &str {
        match field {
            AddField::MainOffice => &self.main_office,
            AddField::SubOffice => &self.sub_office,
            AddField::Date => &self.date,
            AddField::Category => self.category.selected.as_deref().unwrap_or(""),
            AddField::NewCategory => &self.category.new_name,
            AddField::Product => &self.product.value,
            AddField::NewProduct => &self.product.new_name,
        }
    }

    pub fn resolved_category(&self, next_category_prefix: &str) -> String {
        self.category.resolve(next_category_prefix)
    }

    pub fn submission(&self, next_category_prefix: &str) -> Result<NewStockEntry, ValidationError> {
        let category = self.resolved_category(next_category_prefix);
        let product = self.product.resolve();
        if is_blank(&self.main_office)
            || is_blank(&self.sub_office)
            || is_blank(&self.date)
            || is_blank(&category)
            || self.product.entered_suffix().is_empty()
        {
            return Err(ValidationError::MissingField);
        }
        let date = self.date.trim();
        if !is_valid_date(date) {
            return Err(ValidationError::InvalidDate);
        }

        Ok(NewStockEntry {
            main_office: self.main_office.trim().to_owned(),
            sub_office: self.sub_office.trim().to_owned(),
            date: date.to_owned(),
            category,
            product,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    MainOffice,
    SubOffice,
    Date,
    Category,
    Product,
    Confirm,
}

impl EditField {
    pub const ALL: [Self; 6] = [
        Self::MainOffice,
        Self::SubOffice,
        Self::Date,
        Self::Category,
        Self::Product,
        Self::Confirm,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::MainOffice => "Main office",
            Self::SubOffice => "Sub office",
            Self::Date => "Date",
            Self::Category => "Category",
            Self::Product => "Product",
            Self::Confirm => "Confirmed",
        }
    }
}

/// Contents of the edit modal. Category and product are edited as plain
/// codes; they are never re-derived from prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    pub key: RecordKey,
    pub main_office: String,
    pub sub_office: String,
    pub date: String,
    pub category: String,
    pub product: String,
    pub confirm: ConfirmStatus,
}

impl EditForm {
    pub fn from_record(record: &StockRecord) -> Self {
        Self {
            key: record.key,
            main_office: record.main_office.clone(),
            sub_office: record.sub_office.clone(),
            date: format_display_date(&record.date),
            category: record.category.clone(),
            product: record.product.clone(),
            confirm: record.confirm,
        }
    }

    pub fn text_mut(&mut self, field: EditField) -> Option<&mut String> {
        match field {
            EditField::MainOffice => Some(&mut self.main_office),
            EditField::SubOffice => Some(&mut self.sub_office),
            EditField::Date => Some(&mut self.date),
            EditField::Category => Some(&mut self.category),
            EditField::Product => Some(&mut self.product),
            EditField::Confirm => None,
        }
    }

    pub fn text(&self, field: EditField) -> &str {
        match field {
            EditField::MainOffice => &self.main_office,
            EditField::SubOffice => &self.sub_office,
            EditField::Date => &self.date,
            EditField::Category => &self.category,
            EditField::Product => &self.product,
            EditField::Confirm => self.confirm.as_str(),
        }
    }

    pub fn submission(&self) -> Result<StockEntryUpdate, ValidationError> {
        if [
            &self.main_office,
            &self.sub_office,
            &self.date,
            &self.category,
            &self.product,
        ]
        .into_iter()
        .any(|value| is_blank(value))
        {
            return Err(ValidationError::MissingField);
        }
        let date = self.date.trim();
        if !is_valid_date(date) {
            return Err(ValidationError::InvalidDate);
        }

        Ok(StockEntryUpdate {
            main_office: self.main_office.trim().to_owned(),
            sub_office: self.sub_office.trim().to_owned(),
            date: date.to_owned(),
            category: self.category.trim().to_owned(),
            product: self.product.trim().to_owned(),
            confirm: self.confirm,
        })
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::{AddField, AddForm, EditForm, ValidationError};
    use crate::{CategoryInput, ConfirmStatus, ProductInput, RecordKey, StockRecord};

    fn filled_form() -> AddForm {
        AddForm {
            main_office: "North".to_owned(),
            sub_office: "Depot 4".to_owned(),
            date: "05/03/2024".to_owned(),
            category: CategoryInput {
                selected: Some("2-Bolts".to_owned()),
                ..CategoryInput::default()
            },
            product: ProductInput {
                value: "M8".to_owned(),
                prefix: "2-5-".to_owned(),
                ..ProductInput::default()
            },
        }
    }

    #[test]
    fn complete_form_resolves_codes() {
        let entry = filled_form().submission("9-").expect("valid form");
        assert_eq!(entry.category, "2-Bolts");
        assert_eq!(entry.product, "2-5-M8");
        assert_eq!(entry.date, "05/03/2024");
    }

    #[test]
    fn missing_fields_are_reported_before_date() {
        let mut form = filled_form();
        form.sub_office = "  ".to_owned();
        form.date = "bogus".to_owned();
        assert_eq!(form.submission("9-"), Err(ValidationError::MissingField));
    }

    #[test]
    fn product_prefix_alone_does_not_satisfy_required_check() {
        let mut form = filled_form();
        form.product.value.clear();
        assert_eq!(form.submission("9-"), Err(ValidationError::MissingField));
    }

    #[test]
    fn missing_category_is_rejected() {
        let mut form = filled_form();
        form.category.selected = None;
        assert_eq!(form.submission("9-"), Err(ValidationError::MissingField));
    }

    #[test]
    fn malformed_date_is_rejected() {
        let mut form = filled_form();
        form.date = "2024-03-05".to_owned();
        assert_eq!(form.submission("9-"), Err(ValidationError::InvalidDate));
    }

    #[test]
    fn active_fields_follow_panels() {
        let mut form = AddForm::default();
        assert_eq!(
            form.active_fields(),
            vec![
                AddField::MainOffice,
                AddField::SubOffice,
                AddField::Date,
                AddField::Category,
                AddField::Product,
            ]
        );

        form.category.toggle_new_panel();
        form.product.open_new_panel(None);
        assert_eq!(
            form.active_fields(),
            vec![
                AddField::MainOffice,
                AddField::SubOffice,
                AddField::Date,
                AddField::NewCategory,
                AddField::NewProduct,
            ]
        );
    }

    #[test]
    fn edit_form_prefills_display_date() {
        let record = StockRecord {
            key: RecordKey::new(4),
            main_office: "North".to_owned(),
            sub_office: "Depot".to_owned(),
            date: "2024-03-05T00:00:00.000Z".to_owned(),
            category: "2-Bolts".to_owned(),
            product: "2-1-M8".to_owned(),
            confirm: ConfirmStatus::Confirmed,
        };
        let form = EditForm::from_record(&record);
        assert_eq!(form.date, "05/03/2024");
        assert_eq!(form.key, RecordKey::new(4));

        let update = form.submission().expect("valid edit");
        assert_eq!(update.confirm, ConfirmStatus::Confirmed);
        assert_eq!(update.product, "2-1-M8");
    }

    #[test]
    fn edit_form_validates_like_add() {
        let mut form = EditForm {
            key: RecordKey::new(0),
            main_office: "North".to_owned(),
            sub_office: "Depot".to_owned(),
            date: "31/04/2024".to_owned(),
            category: "2-Bolts".to_owned(),
            product: "2-1-M8".to_owned(),
            confirm: ConfirmStatus::Pending,
        };
        assert_eq!(form.submission(), Err(ValidationError::InvalidDate));
        form.category.clear();
        assert_eq!(form.submission(), Err(ValidationError::MissingField));
    }
}
