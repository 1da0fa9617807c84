// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::backend::{Backend, BackendError};
use crate::forms::{AddForm, EditForm};
use crate::ids::RecordKey;
use crate::model::{CategoryList, ConfirmStatus, Notice, RecordSet};

/// How long a successfully saved edit modal stays up before it closes.
pub const EDITOR_DISMISS_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    pub form: EditForm,
    pub notice: Option<Notice>,
    pub token: u64,
    pub dismiss_pending: bool,
}

/// Returned after a successful update. The caller closes the editor once
/// `delay` has passed by handing `token` back to
/// [`FormController::dismiss_editor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DismissTicket {
    pub token: u64,
    pub delay: Duration,
}

/// Drives every user action against the backend and owns the snapshots the
/// views are built from.
#[derive(Debug)]
pub struct FormController<B> {
    backend: B,
    records: RecordSet,
    categories: CategoryList,
    add_form: AddForm,
    add_notice: Option<Notice>,
    tables_notice: Option<Notice>,
    editor: Option<Editor>,
    alert: Option<String>,
    editor_token: u64,
}

impl<B: Backend> FormController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            records: RecordSet::default(),
            categories: CategoryList::default(),
            add_form: AddForm::default(),
            add_notice: None,
            tables_notice: None,
            editor: None,
            alert: None,
            editor_token: 0,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    pub fn categories(&self) -> &CategoryList {
        &self.categories
    }

    pub fn add_form(&self) -> &AddForm {
        &self.add_form
    }

    pub fn add_form_mut(&mut self) -> &mut AddForm {
        &mut self.add_form
    }

    pub fn add_notice(&self) -> Option<&Notice> {
        self.add_notice.as_ref()
    }

    pub fn tables_notice(&self) -> Option<&Notice> {
        self.tables_notice.as_ref()
    }

    pub fn editor(&self) -> Option<&Editor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut Editor> {
        self.editor.as_mut()
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn acknowledge_alert(&mut self) {
        self.alert = None;
    }

    pub fn clear_add_notice(&mut self) {
        self.add_notice = None;
    }

    pub fn clear_tables_notice(&mut self) {
        self.tables_notice = None;
    }

    /// Startup load: categories first, then records.
    pub fn load_all(&mut self) {
        self.refresh_categories();
        self.refresh_records();
    }

    pub fn refresh_categories(&mut self) -> bool {
        let fetched = self.backend.list_categories().and_then(|codes| {
            let prefix = self.backend.next_category_prefix()?;
            Ok(CategoryList::new(codes, prefix))
        });
        match fetched {
            Ok(categories) => {
                debug!(count = categories.codes().len(), "categories refreshed");
                self.categories = categories;
                true
            }
            Err(error) => {
                warn!(%error, "category refresh failed");
                self.add_notice = Some(Notice::danger(format!(
                    "Error loading categories: {error}"
                )));
                false
            }
        }
    }

    pub fn refresh_records(&mut self) -> bool {
        match self.backend.list_records() {
            Ok(records) => {
                debug!(count = records.len(), "records refreshed");
                self.records = RecordSet::new(records);
                self.tables_notice = None;
                true
            }
            Err(error) => {
                warn!(%error, "record refresh failed");
                self.tables_notice = Some(Notice::danger(format!("Error loading data: {error}")));
                false
            }
        }
    }

    /// Picks an existing category and fetches the product prefix hint for it.
    /// Ignored while the new-category panel locks the selector.
    pub fn select_category(&mut self, code: Option<String>) {
        if self.add_form.category.selector_locked() {
            return;
        }
        self.add_form.category.selected = code.filter(|code| !code.is_empty());
        let Some(category) = self.add_form.category.selected.clone() else {
            return;
        };
        match self.backend.next_product_prefix(&category) {
            Ok(prefix) => {
                debug!(%category, %prefix, "product prefix hint");
                self.add_form.product.prefix = prefix;
            }
            Err(error) => {
                warn!(%category, %error, "product prefix lookup failed");
                self.add_notice = Some(Notice::danger(format!("Error: {error}")));
            }
        }
    }

    /// Steps through "no category" followed by every known code.
    pub fn cycle_category(&mut self, delta: isize) {
        let codes = self.categories.codes();
        let slots = codes.len() as isize + 1;
        let current = self
            .add_form
            .category
            .selected
            .as_deref()
            .and_then(|code| self.categories.position(code))
            .map_or(0, |index| index as isize + 1);
        let next = (current + delta).rem_euclid(slots);
        let code = if next == 0 {
            None
        } else {
            codes.get(next as usize - 1).cloned()
        };
        self.select_category(code);
    }

    pub fn toggle_new_category(&mut self) -> bool {
        self.add_form.category.toggle_new_panel()
    }

    /// Opens the new-product panel with a prefix for the category the form
    /// currently resolves to, or closes it.
    pub fn toggle_new_product(&mut self) -> bool {
        if self.add_form.product.new_panel_open {
            self.add_form.product.close_new_panel();
            return false;
        }

        let category = self
            .add_form
            .resolved_category(self.categories.next_prefix());
        if category.is_empty() {
            self.add_notice = Some(Notice::warning("Please select or add a category first"));
            return false;
        }

        match self.backend.next_product_prefix(&category) {
            Ok(prefix) => self.add_form.product.open_new_panel(Some(prefix)),
            Err(error) => {
                warn!(%category, %error, "new product prefix lookup failed");
                self.add_form.product.open_new_panel(None);
                self.add_notice = Some(Notice::danger(format!("Error: {error}")));
            }
        }
        true
    }

    pub fn submit_add(&mut self) -> bool {
        let entry = match self.add_form.submission(self.categories.next_prefix()) {
            Ok(entry) => entry,
            Err(error) => {
                self.add_notice = Some(Notice::warning(error.to_string()));
                return false;
            }
        };

        match self.backend.add_record(&entry) {
            Ok(message) => {
                info!(category = %entry.category, product = %entry.product, "entry added");
                self.add_notice = Some(Notice::success(message));
                self.add_form = AddForm::default();
                self.refresh_records();
                self.refresh_categories();
                true
            }
            Err(error) => {
                warn!(%error, "add rejected");
                self.add_notice = Some(failure_notice(&error));
                false
            }
        }
    }

    /// Opens the edit modal pre-filled from the last fetched snapshot.
    pub fn open_editor(&mut self, key: RecordKey) -> bool {
        let Some(record) = self.records.get(key) else {
            self.tables_notice = Some(Notice::warning(format!(
                "Entry {key} is no longer loaded; refresh and retry"
            )));
            return false;
        };
        self.editor_token = self.editor_token.wrapping_add(1);
        self.editor = Some(Editor {
            form: EditForm::from_record(record),
            notice: None,
            token: self.editor_token,
            dismiss_pending: false,
        });
        true
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    /// Closes the editor if it is still the one the ticket was issued for.
    pub fn dismiss_editor(&mut self, token: u64) -> bool {
        if self.editor.as_ref().is_some_and(|editor| editor.token == token) {
            self.editor = None;
            return true;
        }
        false
    }

    pub fn submit_update(&mut self) -> Option<DismissTicket> {
        let editor = self.editor.as_mut()?;
        let update = match editor.form.submission() {
            Ok(update) => update,
            Err(error) => {
                editor.notice = Some(Notice::warning(error.to_string()));
                return None;
            }
        };
        let key = editor.form.key;

        match self.backend.update_record(key, &update) {
            Ok(message) => {
                info!(%key, "entry updated");
                let token = editor.token;
                editor.notice = Some(Notice::success(message));
                editor.dismiss_pending = true;
                self.refresh_records();
                Some(DismissTicket {
                    token,
                    delay: EDITOR_DISMISS_DELAY,
                })
            }
            Err(error) => {
                warn!(%key, %error, "update rejected");
                editor.notice = Some(failure_notice(&error));
                None
            }
        }
    }

    pub fn confirm(&mut self, key: RecordKey) -> bool {
        self.set_confirm(key, ConfirmStatus::Confirmed)
    }

    pub fn reverse(&mut self, key: RecordKey) -> bool {
        self.set_confirm(key, ConfirmStatus::Pending)
    }

    /// Confirmation flips report failures through a blocking alert rather
    /// than an inline notice.
    pub fn set_confirm(&mut self, key: RecordKey, status: ConfirmStatus) -> bool {
        match self.backend.set_confirm(key, status) {
            Ok(_) => {
                info!(%key, status = status.label(), "confirmation changed");
                self.refresh_records();
                true
            }
            Err(error) => {
                warn!(%key, %error, "confirmation change failed");
                self.alert = Some(format!("Error: {error}"));
                false
            }
        }
    }
}

fn failure_notice(error: &BackendError) -> Notice {
    match error {
        BackendError::Rejected(message) => Notice::danger(message.clone()),
        other => Notice::danger(format!("Error: {other}")),
    }
}
