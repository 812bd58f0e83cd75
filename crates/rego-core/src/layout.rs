//! Selector table describing where each value lives on the results page.
//!
//! The lookup page has no stable identifiers for its values, so extraction
//! is positional. Keeping the positions here, instead of inline in the
//! parser, lets the table be checked on its own and overridden from the
//! `[layout]` section of the config file when the page changes.

use crate::error::{ConfigError, ConfigResult};
use crate::types::LabelField;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Text the lookup page shows when a plate has no matching record.
pub const INVALID_REGISTRATION_MARKER: &str = "The details you entered do not match our records. \
     Please check and try again. Need help? Call us on 13 77 88.";

/// Positional layout of the results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLayout {
    /// Literal text that marks an unknown plate
    pub invalid_marker: String,
    /// Container holding the vehicle summary
    pub plate_detail: String,
    /// Repeated element inside the summary container
    pub detail_item: String,
    /// Position of the model among the summary items
    pub model_index: usize,
    /// Position of the VIN among the summary items
    pub vin_index: usize,
    /// Label prefix stripped from the VIN text
    pub vin_label: String,
    /// Repeated label/value rows, in document order
    pub label_value_row: String,
    /// Column elements inside each row
    pub value_column: String,
    /// Position of the value column inside a row
    pub value_column_index: usize,
    /// Element holding the value text inside the value column
    pub value_text: String,
    /// Which row holds which field, with its fallback
    pub fields: Vec<LabelValueField>,
}

/// One entry of the label/value table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelValueField {
    /// Field the value is stored in
    pub field: LabelField,
    /// Index into the label/value rows
    pub row: usize,
    /// Value used when the page leaves the field empty
    pub fallback: String,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            invalid_marker: INVALID_REGISTRATION_MARKER.to_string(),
            plate_detail: ".plate-detail".to_string(),
            detail_item: "small".to_string(),
            model_index: 1,
            vin_index: 2,
            vin_label: "VIN/chassis: ".to_string(),
            label_value_row: ".snswLabelValue".to_string(),
            value_column: ".col-xs-6".to_string(),
            value_column_index: 2,
            value_text: "strong".to_string(),
            fields: LabelField::ALL
                .iter()
                .enumerate()
                .map(|(row, &field)| LabelValueField {
                    field,
                    row,
                    fallback: field.default_fallback().to_string(),
                })
                .collect(),
        }
    }
}

impl PageLayout {
    /// Check the table is complete and unambiguous.
    ///
    /// Every [`LabelField`] must appear exactly once and no two fields may
    /// share a row.
    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            field: "layout.fields".to_string(),
            reason,
        };

        let mut seen_fields = HashSet::new();
        let mut seen_rows = HashSet::new();
        for entry in &self.fields {
            if !seen_fields.insert(entry.field) {
                return Err(invalid(format!("{:?} is listed more than once", entry.field)));
            }
            if !seen_rows.insert(entry.row) {
                return Err(invalid(format!("row {} is assigned twice", entry.row)));
            }
        }

        if let Some(missing) = LabelField::ALL.iter().find(|f| !seen_fields.contains(f)) {
            return Err(invalid(format!("{missing:?} has no row")));
        }

        if self.invalid_marker.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "layout.invalid_marker".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
