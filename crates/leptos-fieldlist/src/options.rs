//! Widget Options

use serde::Deserialize;

/// Markup and text settings for field list widgets.
///
/// Every field is optional when decoded from a page-supplied object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FieldListOptions {
    /// Selector matching each field list container
    pub container_selector: String,
    /// Label of the add control
    pub add_text: String,
    /// Label of each remove control
    pub remove_text: String,
    /// Alert shown when removing the only row
    pub last_row_message: String,
}

impl Default for FieldListOptions {
    fn default() -> Self {
        Self {
            container_selector: "div.form-field-field-list".to_string(),
            add_text: "+".to_string(),
            remove_text: "-".to_string(),
            last_row_message: "Cannot remove an item when there is only one item.".to_string(),
        }
    }
}
