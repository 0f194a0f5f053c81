// Per-field error state for forms, fed by local validation and 400 responses

use std::collections::{BTreeMap, BTreeSet};

use crate::error::FieldErrors;

#[derive(Debug, Clone, Default)]
pub struct FormErrors {
    fields: BTreeSet<String>,
    errors: BTreeMap<String, String>,
    touched: BTreeSet<String>,
}

impl FormErrors {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    /// Record a client-side error on a declared field
    pub fn set_error(&mut self, field: &str, message: impl Into<String>) {
        if self.has_field(field) {
            self.errors.insert(field.to_string(), message.into());
        }
    }

    /// Copy a server field map onto the form. Unknown field names are dropped.
    pub fn apply_server_validation_errors(&mut self, errors: &FieldErrors) {
        for (field, message) in errors {
            if self.has_field(field) {
                self.errors.insert(field.clone(), message.clone());
                self.touched.insert(field.clone());
            }
        }
    }

    pub fn mark_all_touched(&mut self) {
        self.touched = self.fields.clone();
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.contains(field)
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn clear(&mut self) {
        self.errors.clear();
        self.touched.clear();
    }
}
