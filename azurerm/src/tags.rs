//! Tag reconciliation
//!
//! Resources expose two tag attributes: `tags`, which the user manages, and
//! `tags_all`, the effective set sent to Azure once the provider's default
//! tags are merged in. On write the user's tags win over defaults; on read
//! any tag whose value equals the default of the same key is attributed to
//! the defaults and left out of `tags`.
//!
//! The read split is lossy: a tag the user set explicitly with the same key
//! and value as a default tag is reported only in `tags_all`.

use armclient::{NullableTags, Tags};

use crate::sdk::{Attribute, AttributeBuilder, AttributeType, Diagnostics, Dynamic, ResourceData};
use crate::validate::Validator;

pub const TAGS: &str = "tags";
pub const TAGS_ALL: &str = "tags_all";

const MAX_TAGS: usize = 50;
const MAX_KEY_LENGTH: usize = 512;
const MAX_VALUE_LENGTH: usize = 256;

/// Default tags overlaid with the resource's own tags.
pub fn merge(resource_tags: &Tags, default_tags: &Tags) -> Tags {
    let mut merged = default_tags.clone();
    merged.extend(
        resource_tags
            .iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );
    merged
}

/// Splits tags returned by the API into `(tags, tags_all)`.
pub fn split_read(api_tags: &Tags, default_tags: &Tags) -> (Tags, Tags) {
    let tags = api_tags
        .iter()
        .filter(|(k, v)| default_tags.get(*k) != Some(*v))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    (tags, api_tags.clone())
}

/// Writes the merged tag set to `tags_all` and returns it for the API call.
pub fn ensure_tags_all_set(data: &mut ResourceData, default_tags: &Tags) -> Tags {
    let merged = merge(&expand(data), default_tags);
    data.set_string_map(TAGS_ALL, &merged);
    merged
}

/// Stores tags read back from the API. Missing tags read as empty.
pub fn ensure_tags_all_read_set(
    data: &mut ResourceData,
    api_tags: Option<&Tags>,
    default_tags: &Tags,
) {
    let empty = Tags::new();
    let (tags, tags_all) = split_read(api_tags.unwrap_or(&empty), default_tags);
    data.set_string_map(TAGS, &tags);
    data.set_string_map(TAGS_ALL, &tags_all);
}

/// As [`ensure_tags_all_read_set`] for APIs whose tag values may be null.
/// A null value reads as the empty string.
pub fn ensure_tags_all_read_set_optional(
    data: &mut ResourceData,
    api_tags: Option<&NullableTags>,
    default_tags: &Tags,
) {
    let api_tags: Option<Tags> = api_tags.map(|tags| {
        tags.iter()
            .map(|(k, v)| (k.clone(), v.clone().unwrap_or_default()))
            .collect()
    });
    ensure_tags_all_read_set(data, api_tags.as_ref(), default_tags);
}

/// True when the effective tag set differs from the one last applied,
/// either because `tags` changed or because the provider's default tags did.
pub fn has_change(data: &ResourceData, default_tags: &Tags) -> bool {
    if data.has_change(TAGS) {
        return true;
    }

    let applied: Tags = data
        .get_prior(TAGS_ALL)
        .and_then(Dynamic::as_map)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|(k, v)| v.as_string().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default();
    merge(&expand(data), default_tags) != applied
}

/// The user's `tags` as sent to the API.
pub fn expand(data: &ResourceData) -> Tags {
    data.get_string_map(TAGS)
}

pub fn flatten(tags: Option<&Tags>) -> Dynamic {
    Dynamic::Map(
        tags.map(|tags| {
            tags.iter()
                .map(|(k, v)| (k.clone(), Dynamic::String(v.clone())))
                .collect()
        })
        .unwrap_or_default(),
    )
}

/// Limits Azure enforces on tags. Returns one message per problem.
pub fn validate(tags: &Tags) -> Vec<String> {
    let mut problems = Vec::new();

    if tags.len() > MAX_TAGS {
        problems.push(format!(
            "a maximum of {} tags can be applied to each ARM resource",
            MAX_TAGS
        ));
    }

    let mut keys: Vec<&String> = tags.keys().collect();
    keys.sort();
    for key in keys {
        if key.chars().count() > MAX_KEY_LENGTH {
            problems.push(format!(
                "the maximum length for a tag key is {} characters: {:?} is {} characters",
                MAX_KEY_LENGTH,
                key,
                key.chars().count()
            ));
        }

        let value = &tags[key];
        if value.chars().count() > MAX_VALUE_LENGTH {
            problems.push(format!(
                "the maximum length for a tag value is {} characters: the value for {:?} is {} characters",
                MAX_VALUE_LENGTH,
                key,
                value.chars().count()
            ));
        }
    }

    problems
}

pub struct TagsValidator;

impl Validator for TagsValidator {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        let Some(entries) = value.as_map() else {
            return;
        };
        let tags: Tags = entries
            .iter()
            .filter_map(|(k, v)| v.as_string().map(|s| (k.clone(), s.to_string())))
            .collect();

        for problem in validate(&tags) {
            diagnostics.add_attribute_error(attribute_path, "invalid tags", Some(problem));
        }
    }
}

pub fn schema() -> Attribute {
    AttributeBuilder::new(TAGS, AttributeType::Map(Box::new(AttributeType::String)))
        .description("Tags assigned to the resource")
        .optional()
        .validator(TagsValidator)
        .build()
}

pub fn schema_all() -> Attribute {
    AttributeBuilder::new(TAGS_ALL, AttributeType::Map(Box::new(AttributeType::String)))
        .description("All tags assigned to the resource, including those inherited from the provider's default_tags")
        .computed()
        .build()
}
