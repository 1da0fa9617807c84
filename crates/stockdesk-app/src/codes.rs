// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::DEFAULT_PRODUCT_PREFIX;

/// Category half of the add form: either an existing code picked from the
/// list, or a new name typed into the new-category panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryInput {
    pub selected: Option<String>,
    pub new_panel_open: bool,
    pub new_name: String,
}

impl CategoryInput {
    /// Opening the panel clears its text; the existing selector is locked
    /// while it is open.
    pub fn toggle_new_panel(&mut self) -> bool {
        self.new_panel_open = !self.new_panel_open;
        if self.new_panel_open {
            self.new_name.clear();
        }
        self.new_panel_open
    }

    pub fn selector_locked(&self) -> bool {
        self.new_panel_open
    }

    pub fn typed_new_name(&self) -> Option<&str> {
        let trimmed = self.new_name.trim();
        (self.new_panel_open && !trimmed.is_empty()).then_some(trimmed)
    }

    /// Existing code, or `next_prefix` + the new name when the panel is in use.
    pub fn resolve(&self, next_prefix: &str) -> String {
        match self.typed_new_name() {
            Some(name) => format!("{next_prefix}{name}"),
            None => self.selected.clone().unwrap_or_default(),
        }
    }
}

/// Product half of the add form. Both prefixes are hints fetched from the
/// backend and are not re-checked at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub value: String,
    pub prefix: String,
    pub new_panel_open: bool,
    pub new_name: String,
    pub new_prefix: String,
}

impl Default for ProductInput {
    fn default() -> Self {
        Self {
            value: String::new(),
            prefix: DEFAULT_PRODUCT_PREFIX.to_owned(),
            new_panel_open: false,
            new_name: String::new(),
            new_prefix: String::new(),
        }
    }
}

impl ProductInput {
    pub fn open_new_panel(&mut self, new_prefix: Option<String>) {
        self.new_panel_open = true;
        self.new_name.clear();
        if let Some(prefix) = new_prefix {
            self.new_prefix = prefix;
        }
    }

    pub fn close_new_panel(&mut self) {
        self.new_panel_open = false;
    }

    pub fn typed_new_name(&self) -> Option<&str> {
        let trimmed = self.new_name.trim();
        (self.new_panel_open && !trimmed.is_empty()).then_some(trimmed)
    }

    /// The user-entered part of the code, without any prefix.
    pub fn entered_suffix(&self) -> &str {
        match self.typed_new_name() {
            Some(name) => name,
            None => self.value.trim(),
        }
    }

    pub fn resolve(&self) -> String {
        match self.typed_new_name() {
            Some(name) => format!("{}{name}", self.new_prefix),
            None => format!("{}{}", self.prefix, self.value.trim()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CategoryInput, ProductInput};

    #[test]
    fn new_category_gets_backend_prefix() {
        let input = CategoryInput {
            selected: Some("2-Bolts".to_owned()),
            new_panel_open: true,
            new_name: "  Widgets ".to_owned(),
        };
        assert_eq!(input.resolve("4-"), "4-Widgets");
    }

    #[test]
    fn closed_panel_keeps_selected_code_verbatim() {
        let input = CategoryInput {
            selected: Some("2-Bolts".to_owned()),
            new_panel_open: false,
            new_name: "Widgets".to_owned(),
        };
        assert_eq!(input.resolve("4-"), "2-Bolts");
    }

    #[test]
    fn blank_new_category_falls_back_to_selection() {
        let input = CategoryInput {
            selected: Some("2-Bolts".to_owned()),
            new_panel_open: true,
            new_name: "   ".to_owned(),
        };
        assert_eq!(input.resolve("4-"), "2-Bolts");
        assert_eq!(CategoryInput::default().resolve("4-"), "");
    }

    #[test]
    fn toggling_category_panel_clears_typed_name() {
        let mut input = CategoryInput {
            new_name: "stale".to_owned(),
            ..CategoryInput::default()
        };
        assert!(input.toggle_new_panel());
        assert!(input.new_name.is_empty());
        assert!(input.selector_locked());
        assert!(!input.toggle_new_panel());
        assert!(!input.selector_locked());
    }

    #[test]
    fn existing_product_uses_category_prefix() {
        let input = ProductInput {
            value: " M8 ".to_owned(),
            prefix: "3-".to_owned(),
            ..ProductInput::default()
        };
        assert_eq!(input.resolve(), "3-M8");
        assert_eq!(input.entered_suffix(), "M8");
    }

    #[test]
    fn new_product_uses_new_prefix() {
        let mut input = ProductInput {
            value: "ignored".to_owned(),
            prefix: "3-".to_owned(),
            ..ProductInput::default()
        };
        input.open_new_panel(Some("3-7-".to_owned()));
        input.new_name = "Hex nut".to_owned();
        assert_eq!(input.resolve(), "3-7-Hex nut");
    }

    #[test]
    fn default_product_prefix_applies_before_lookup() {
        let input = ProductInput {
            value: "Washer".to_owned(),
            ..ProductInput::default()
        };
        assert_eq!(input.resolve(), "1-Washer");
    }
}
