// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use stockdesk_app::{
    BackendError, ConfirmStatus, EDITOR_DISMISS_DELAY, FormController, RecordKey, Severity,
    confirm_view,
};
use stockdesk_testkit::{MockBackend, Operation};

fn loaded_controller() -> FormController<MockBackend> {
    let mut controller = FormController::new(MockBackend::seeded());
    controller.load_all();
    controller
}

fn fill_add_form(controller: &mut FormController<MockBackend>) {
    let form = controller.add_form_mut();
    form.main_office = "North".to_owned();
    form.sub_office = "Yard".to_owned();
    form.date = "29/02/2024".to_owned();
    form.product.value = "Washer".to_owned();
}

#[test]
fn startup_loads_categories_then_records() {
    let controller = loaded_controller();
    let calls = &controller.backend().calls;
    assert_eq!(calls.list_categories, 1);
    assert_eq!(calls.next_category_prefix, 1);
    assert_eq!(calls.list_records, 1);
    assert_eq!(controller.records().len(), 3);
    assert_eq!(controller.categories().next_prefix(), "4-");
}

#[test]
fn load_failures_leave_previous_snapshots_and_report() {
    let mut controller = loaded_controller();
    controller.backend_mut().fail_on(
        Operation::ListRecords,
        BackendError::Transport("connection refused".to_owned()),
    );
    controller.backend_mut().fail_on(
        Operation::ListCategories,
        BackendError::Transport("connection refused".to_owned()),
    );

    assert!(!controller.refresh_records());
    assert!(!controller.refresh_categories());
    assert_eq!(controller.records().len(), 3);
    assert_eq!(controller.categories().codes().len(), 3);

    let tables = controller.tables_notice().expect("tables notice");
    assert!(tables.text.starts_with("Error loading data: "));
    let add = controller.add_notice().expect("add notice");
    assert!(add.text.starts_with("Error loading categories: "));
}

#[test]
fn successful_record_refresh_clears_load_error() {
    let mut controller = FormController::new(MockBackend::seeded());
    controller.backend_mut().fail_on(
        Operation::ListRecords,
        BackendError::Transport("down".to_owned()),
    );
    controller.load_all();
    assert!(controller.tables_notice().is_some());

    controller.backend_mut().clear_failure(Operation::ListRecords);
    assert!(controller.refresh_records());
    assert_eq!(controller.records().len(), 3);
    assert!(controller.tables_notice().is_none());
}

#[test]
fn stale_entry_warning_can_be_cleared() {
    let mut controller = loaded_controller();
    assert!(!controller.open_editor(RecordKey::new(99)));
    assert!(controller.tables_notice().is_some());

    controller.clear_tables_notice();
    assert!(controller.tables_notice().is_none());
}

#[test]
fn successful_add_refetches_records_and_categories_once() {
    let mut controller = loaded_controller();
    controller.select_category(Some("2-Bolts".to_owned()));
    fill_add_form(&mut controller);

    let before = controller.backend().calls.clone();
    assert!(controller.submit_add());
    let after = &controller.backend().calls;

    assert_eq!(after.add_record, before.add_record + 1);
    assert_eq!(after.list_records, before.list_records + 1);
    assert_eq!(after.list_categories, before.list_categories + 1);

    let added = &controller.backend().added[0];
    assert_eq!(added.category, "2-Bolts");
    assert_eq!(added.product, "2-4-Washer");
    assert_eq!(controller.records().len(), 4);

    let notice = controller.add_notice().expect("success notice");
    assert_eq!(notice.severity, Severity::Success);
    assert_eq!(notice.text, "Item added successfully");
}

#[test]
fn successful_add_resets_form_and_panels() {
    let mut controller = loaded_controller();
    controller.toggle_new_category();
    controller.add_form_mut().category.new_name = "Widgets".to_owned();
    assert!(controller.toggle_new_product());
    controller.add_form_mut().product.new_name = "Sprocket".to_owned();
    fill_add_form(&mut controller);

    assert!(controller.submit_add());
    let added = &controller.backend().added[0];
    assert_eq!(added.category, "4-Widgets");
    assert_eq!(added.product, "4-Widgets-1-Sprocket");

    let form = controller.add_form();
    assert!(form.main_office.is_empty());
    assert!(form.category.selected.is_none());
    assert!(!form.category.new_panel_open);
    assert!(!form.product.new_panel_open);
    assert_eq!(form.product.prefix, "1-");
    assert_eq!(controller.categories().codes().len(), 4);
}

#[test]
fn validation_failures_never_reach_backend() {
    let mut controller = loaded_controller();
    let before = controller.backend().calls.total();

    assert!(!controller.submit_add());
    assert_eq!(
        controller.add_notice().map(|notice| notice.text.as_str()),
        Some("Please fill all required fields")
    );

    controller.select_category(Some("1-Fasteners".to_owned()));
    fill_add_form(&mut controller);
    controller.add_form_mut().date = "29/02/2023".to_owned();
    let with_lookup = controller.backend().calls.total();
    assert_eq!(with_lookup, before + 1);

    assert!(!controller.submit_add());
    let notice = controller.add_notice().expect("date notice");
    assert_eq!(notice.severity, Severity::Warning);
    assert_eq!(notice.text, "Please enter a valid date in DD/MM/YYYY format");
    assert_eq!(controller.backend().calls.total(), with_lookup);
}

#[test]
fn rejected_add_keeps_form_for_correction() {
    let mut controller = loaded_controller();
    controller.select_category(Some("2-Bolts".to_owned()));
    fill_add_form(&mut controller);
    controller.backend_mut().fail_on(
        Operation::AddRecord,
        BackendError::Rejected("Duplicate product code".to_owned()),
    );

    assert!(!controller.submit_add());
    let notice = controller.add_notice().expect("danger notice");
    assert_eq!(notice.severity, Severity::Danger);
    assert_eq!(notice.text, "Duplicate product code");
    assert_eq!(controller.add_form().main_office, "North");
}

#[test]
fn transport_failure_on_add_is_prefixed() {
    let mut controller = loaded_controller();
    controller.select_category(Some("2-Bolts".to_owned()));
    fill_add_form(&mut controller);
    controller.backend_mut().fail_on(
        Operation::AddRecord,
        BackendError::Transport("timed out".to_owned()),
    );

    assert!(!controller.submit_add());
    assert_eq!(
        controller.add_notice().map(|notice| notice.text.as_str()),
        Some("Error: cannot reach backend: timed out")
    );
}

#[test]
fn category_selection_fetches_product_prefix() {
    let mut controller = loaded_controller();
    controller.select_category(Some("3-Cabling".to_owned()));
    assert_eq!(controller.add_form().product.prefix, "3-4-");
    assert_eq!(controller.backend().calls.next_product_prefix, 1);

    controller.cycle_category(1);
    assert_eq!(controller.add_form().category.selected, None);
    controller.cycle_category(1);
    assert_eq!(
        controller.add_form().category.selected.as_deref(),
        Some("1-Fasteners")
    );
    controller.cycle_category(-1);
    assert_eq!(controller.add_form().category.selected, None);
}

#[test]
fn locked_selector_ignores_category_changes() {
    let mut controller = loaded_controller();
    controller.toggle_new_category();
    controller.select_category(Some("2-Bolts".to_owned()));
    assert_eq!(controller.add_form().category.selected, None);
    assert_eq!(controller.backend().calls.next_product_prefix, 0);
}

#[test]
fn new_product_requires_a_category() {
    let mut controller = loaded_controller();
    assert!(!controller.toggle_new_product());
    assert_eq!(
        controller.add_notice().map(|notice| notice.text.as_str()),
        Some("Please select or add a category first")
    );
    assert!(!controller.add_form().product.new_panel_open);
}

#[test]
fn new_product_panel_opens_even_when_prefix_lookup_fails() {
    let mut controller = loaded_controller();
    controller.select_category(Some("2-Bolts".to_owned()));
    controller.backend_mut().fail_on(
        Operation::NextProductPrefix,
        BackendError::Transport("timed out".to_owned()),
    );

    assert!(controller.toggle_new_product());
    assert!(controller.add_form().product.new_panel_open);
    let notice = controller.add_notice().expect("danger notice");
    assert_eq!(notice.severity, Severity::Danger);
    assert_eq!(notice.text, "Error: cannot reach backend: timed out");
}

#[test]
fn editor_prefills_from_snapshot_by_key() {
    let mut controller = loaded_controller();
    assert!(controller.open_editor(RecordKey::new(2)));
    let editor = controller.editor().expect("editor open");
    assert_eq!(editor.form.key, RecordKey::new(2));
    assert_eq!(editor.form.date, "03/03/2024");
    assert!(editor.notice.is_none());

    assert!(!controller.open_editor(RecordKey::new(99)));
    assert!(controller.tables_notice().is_some());
}

#[test]
fn failed_update_keeps_modal_open_with_backend_message() {
    let mut controller = loaded_controller();
    controller.open_editor(RecordKey::new(1));
    controller.backend_mut().fail_on(
        Operation::UpdateRecord,
        BackendError::Rejected("Row is protected".to_owned()),
    );

    assert_eq!(controller.submit_update(), None);
    let editor = controller.editor().expect("editor stays open");
    let notice = editor.notice.as_ref().expect("notice");
    assert_eq!(notice.severity, Severity::Danger);
    assert_eq!(notice.text, "Row is protected");
    assert!(!editor.dismiss_pending);
}

#[test]
fn successful_update_schedules_dismissal() {
    let mut controller = loaded_controller();
    controller.open_editor(RecordKey::new(1));
    if let Some(editor) = controller.editor_mut() {
        editor.form.sub_office = "Annex".to_owned();
        editor.form.confirm = ConfirmStatus::Confirmed;
    }
    let records_before = controller.backend().calls.list_records;

    let ticket = controller.submit_update().expect("dismiss ticket");
    assert_eq!(ticket.delay, EDITOR_DISMISS_DELAY);
    assert_eq!(controller.backend().calls.list_records, records_before + 1);

    let editor = controller.editor().expect("not dismissed synchronously");
    assert!(editor.dismiss_pending);
    assert_eq!(
        editor.notice.as_ref().map(|notice| notice.text.as_str()),
        Some("Item updated successfully")
    );

    let (key, update) = &controller.backend().updates[0];
    assert_eq!(*key, RecordKey::new(1));
    assert_eq!(update.sub_office, "Annex");
    assert_eq!(update.confirm, ConfirmStatus::Confirmed);

    assert!(controller.dismiss_editor(ticket.token));
    assert!(controller.editor().is_none());
}

#[test]
fn stale_dismissal_does_not_close_newer_editor() {
    let mut controller = loaded_controller();
    controller.open_editor(RecordKey::new(1));
    let ticket = controller.submit_update().expect("dismiss ticket");

    controller.open_editor(RecordKey::new(2));
    assert!(!controller.dismiss_editor(ticket.token));
    assert_eq!(
        controller.editor().map(|editor| editor.form.key),
        Some(RecordKey::new(2))
    );
}

#[test]
fn invalid_update_is_reported_in_modal() {
    let mut controller = loaded_controller();
    controller.open_editor(RecordKey::new(0));
    if let Some(editor) = controller.editor_mut() {
        editor.form.date = "31/09/2024".to_owned();
    }
    assert_eq!(controller.submit_update(), None);
    assert_eq!(controller.backend().calls.update_record, 0);
    assert_eq!(
        controller
            .editor()
            .and_then(|editor| editor.notice.as_ref())
            .map(|notice| notice.severity),
        Some(Severity::Warning)
    );
}

#[test]
fn confirm_and_reverse_refresh_records() {
    let mut controller = loaded_controller();
    let before = controller.backend().calls.list_records;

    assert!(controller.confirm(RecordKey::new(1)));
    assert!(controller.reverse(RecordKey::new(0)));
    assert_eq!(controller.backend().calls.list_records, before + 2);
    assert_eq!(
        controller.backend().confirmations,
        vec![
            (RecordKey::new(1), ConfirmStatus::Confirmed),
            (RecordKey::new(0), ConfirmStatus::Pending),
        ]
    );

    let order: Vec<i64> = confirm_view(controller.records().records())
        .iter()
        .map(|row| row.key.get())
        .collect();
    assert_eq!(order, vec![0, 2, 1]);
}

#[test]
fn confirm_failure_raises_blocking_alert() {
    let mut controller = loaded_controller();
    controller.backend_mut().fail_on(
        Operation::SetConfirm,
        BackendError::Rejected("Sheet is read-only".to_owned()),
    );
    let before = controller.backend().calls.list_records;

    assert!(!controller.confirm(RecordKey::new(1)));
    assert_eq!(controller.alert(), Some("Error: Sheet is read-only"));
    assert_eq!(controller.backend().calls.list_records, before);

    controller.acknowledge_alert();
    assert!(controller.alert().is_none());
}
