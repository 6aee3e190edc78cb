//! Naming rules for Azure resources

use regex::Regex;
use std::sync::OnceLock;

use super::{cached_regex, report, Validator};
use crate::sdk::{Diagnostics, Dynamic};

/// Checks a Managed Lustre File System name: 2 to 80 characters, starting
/// and ending with an alphanumeric, with alphanumerics, `-` and `_` between.
pub fn managed_lustre_file_system_name(input: &str) -> Vec<String> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

    let length = input.chars().count();
    if !(2..=80).contains(&length) {
        return vec![format!(
            "the name must be between 2 and 80 characters long, got {}",
            length
        )];
    }

    match cached_regex(&PATTERN, r"^[0-9a-zA-Z][-0-9a-zA-Z_]{0,78}[0-9a-zA-Z]$") {
        Ok(pattern) if pattern.is_match(input) => Vec::new(),
        Ok(_) => vec![format!(
            "{:?} must start and end with an alphanumeric character and may only contain alphanumerics, hyphens and underscores",
            input
        )],
        Err(e) => vec![e],
    }
}

pub fn resource_group_name(input: &str) -> Vec<String> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

    let mut problems = Vec::new();
    let length = input.chars().count();
    if length == 0 {
        problems.push("the name cannot be blank".to_string());
    }
    if length > 90 {
        problems.push("the name may be up to 90 characters long".to_string());
    }
    if input.ends_with('.') {
        problems.push("the name cannot end with a period".to_string());
    }

    match cached_regex(&PATTERN, r"^[-\w._()]*$") {
        Ok(pattern) if !pattern.is_match(input) => problems.push(
            "the name may only contain alphanumerics, underscores, parentheses, hyphens and periods"
                .to_string(),
        ),
        Ok(_) => {}
        Err(e) => problems.push(e),
    }

    problems
}

pub fn configuration_store_name(input: &str) -> Vec<String> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

    match cached_regex(&PATTERN, r"^[a-zA-Z0-9-]{5,50}$") {
        Ok(pattern) if pattern.is_match(input) => Vec::new(),
        Ok(_) => vec![format!(
            "{:?} may only contain alphanumeric characters and dashes and must be between 5-50 chars",
            input
        )],
        Err(e) => vec![e],
    }
}

pub struct ManagedLustreFileSystemName;

impl Validator for ManagedLustreFileSystemName {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        report(
            managed_lustre_file_system_name,
            value,
            attribute_path,
            diagnostics,
        );
    }
}

pub struct ResourceGroupName;

impl Validator for ResourceGroupName {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        report(resource_group_name, value, attribute_path, diagnostics);
    }
}

pub struct ConfigurationStoreName;

impl Validator for ConfigurationStoreName {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        report(configuration_store_name, value, attribute_path, diagnostics);
    }
}
