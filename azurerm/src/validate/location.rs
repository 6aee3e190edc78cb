//! Azure regions

use super::Validator;
use crate::sdk::{Diagnostics, Dynamic};

/// Lowercases a region and strips spaces, so `West Europe` and `westeurope`
/// compare equal.
pub fn normalize_location(input: &str) -> String {
    input.replace(' ', "").to_lowercase()
}

pub struct Location;

impl Validator for Location {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Some(s) = value.as_string() {
            if normalize_location(s).is_empty() {
                diagnostics.add_attribute_error(
                    attribute_path,
                    format!("{} must not be empty", attribute_path),
                    None,
                );
            }
        }
    }
}
