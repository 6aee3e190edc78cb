//! Field validators
//!
//! Validators run against a single configured value and report problems as
//! diagnostics on the attribute path they were given. Values of the wrong
//! type are left to the schema's type check and ignored here.

mod location;
mod names;

pub use location::{normalize_location, Location};
pub use names::{
    configuration_store_name, managed_lustre_file_system_name, resource_group_name,
    ConfigurationStoreName, ManagedLustreFileSystemName, ResourceGroupName,
};

use regex::Regex;
use std::sync::OnceLock;

use crate::sdk::{Diagnostics, Dynamic};

pub trait Validator: Send + Sync {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics);
}

/// Adapts a plain string check into a [`Validator`].
pub(crate) fn report(
    check: fn(&str) -> Vec<String>,
    value: &Dynamic,
    attribute_path: &str,
    diagnostics: &mut Diagnostics,
) {
    if let Some(s) = value.as_string() {
        for problem in check(s) {
            diagnostics.add_attribute_error(
                attribute_path,
                format!("invalid value for {}", attribute_path),
                Some(problem),
            );
        }
    }
}

/// Compiles `pattern` once into `cell`.
pub(crate) fn cached_regex(
    cell: &'static OnceLock<Result<Regex, regex::Error>>,
    pattern: &str,
) -> Result<&'static Regex, String> {
    cell.get_or_init(|| Regex::new(pattern))
        .as_ref()
        .map_err(|e| format!("compiling pattern {:?}: {}", pattern, e))
}

pub struct StringPattern {
    pub pattern: Regex,
    pub description: String,
}

impl StringPattern {
    pub fn new(pattern: &str, description: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            description: description.into(),
        })
    }
}

impl Validator for StringPattern {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Some(s) = value.as_string() {
            if !self.pattern.is_match(s) {
                diagnostics.add_attribute_error(
                    attribute_path,
                    format!("{} must match {}", attribute_path, self.description),
                    Some(format!("Value '{}' does not match pattern", s)),
                );
            }
        }
    }
}

/// Accepts only the listed values, optionally ignoring case.
pub struct StringInSlice {
    pub values: Vec<String>,
    pub ignore_case: bool,
}

impl StringInSlice {
    pub fn new<S: AsRef<str>>(values: &[S]) -> Self {
        Self {
            values: values.iter().map(|v| v.as_ref().to_string()).collect(),
            ignore_case: false,
        }
    }

    pub fn ignoring_case<S: AsRef<str>>(values: &[S]) -> Self {
        Self {
            ignore_case: true,
            ..Self::new(values)
        }
    }

    fn contains(&self, input: &str) -> bool {
        self.values.iter().any(|v| {
            if self.ignore_case {
                v.eq_ignore_ascii_case(input)
            } else {
                v == input
            }
        })
    }
}

impl Validator for StringInSlice {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Some(s) = value.as_string() {
            if !self.contains(s) {
                diagnostics.add_attribute_error(
                    attribute_path,
                    format!(
                        "expected {} to be one of [{}]",
                        attribute_path,
                        self.values.join(", ")
                    ),
                    Some(format!("got {}", s)),
                );
            }
        }
    }
}

/// Numbers within an inclusive range.
pub struct IntBetween {
    pub min: i64,
    pub max: i64,
}

impl Validator for IntBetween {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        let Some(n) = value.as_number() else {
            return;
        };
        if n.fract() != 0.0 || n < self.min as f64 || n > self.max as f64 {
            diagnostics.add_attribute_error(
                attribute_path,
                format!(
                    "expected {} to be an integer in the range ({} - {})",
                    attribute_path, self.min, self.max
                ),
                Some(format!("got {}", n)),
            );
        }
    }
}
