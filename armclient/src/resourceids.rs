//! Resource ID parsing and formatting
//!
//! A resource ID is a sequence of segments. [`Parser`] walks an input ID
//! against the expected segments and collects the user-specified values;
//! the typed IDs below wrap it for the resources this crate knows about.

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentType {
    Static,
    ResourceProvider,
    SubscriptionId,
    ResourceGroup,
    UserSpecified,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: &'static str,
    pub segment_type: SegmentType,
    /// Expected value for static and resource provider segments.
    pub fixed_value: Option<&'static str>,
    pub example_value: &'static str,
}

impl Segment {
    pub fn static_segment(name: &'static str, value: &'static str) -> Self {
        Self {
            name,
            segment_type: SegmentType::Static,
            fixed_value: Some(value),
            example_value: value,
        }
    }

    pub fn resource_provider(name: &'static str, value: &'static str) -> Self {
        Self {
            name,
            segment_type: SegmentType::ResourceProvider,
            fixed_value: Some(value),
            example_value: value,
        }
    }

    pub fn subscription_id(name: &'static str) -> Self {
        Self {
            name,
            segment_type: SegmentType::SubscriptionId,
            fixed_value: None,
            example_value: "12345678-1234-9876-4563-123456789012",
        }
    }

    pub fn resource_group(name: &'static str) -> Self {
        Self {
            name,
            segment_type: SegmentType::ResourceGroup,
            fixed_value: None,
            example_value: "example-resource-group",
        }
    }

    pub fn user_specified(name: &'static str, example_value: &'static str) -> Self {
        Self {
            name,
            segment_type: SegmentType::UserSpecified,
            fixed_value: None,
            example_value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("the resource ID was empty")]
    Empty,

    #[error(
        "parsing {input:?}: the segment {segment:?} was missing or did not match; an example of a valid ID is {example:?}"
    )]
    MissingSegment {
        input: String,
        segment: String,
        example: String,
    },

    #[error("parsing {input:?}: unexpected trailing segments {trailing:?}")]
    TrailingSegments { input: String, trailing: String },
}

/// Values pulled out of an ID, keyed by segment name.
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    pub raw_input: String,
    pub parsed: HashMap<String, String>,
}

impl ParseResult {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.parsed.get(name).map(String::as_str)
    }

    fn required(&self, name: &str) -> Result<String, ParseError> {
        self.get(name)
            .map(str::to_string)
            .ok_or_else(|| ParseError::MissingSegment {
                input: self.raw_input.clone(),
                segment: name.to_string(),
                example: String::new(),
            })
    }
}

pub struct Parser {
    segments: Vec<Segment>,
}

impl Parser {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// ID built from every segment's example value.
    pub fn example(&self) -> String {
        self.segments
            .iter()
            .map(|s| format!("/{}", s.example_value))
            .collect()
    }

    /// Matches `input` against the segments. Static and provider segments
    /// compare exactly unless `insensitively` is set.
    pub fn parse(&self, input: &str, insensitively: bool) -> Result<ParseResult, ParseError> {
        let trimmed = input.trim_matches('/');
        if trimmed.is_empty() {
            return Err(ParseError::Empty);
        }

        let mut parts = trimmed.split('/');
        let mut parsed = HashMap::new();

        for segment in &self.segments {
            let missing = || ParseError::MissingSegment {
                input: input.to_string(),
                segment: segment.name.to_string(),
                example: self.example(),
            };

            let part = parts.next().filter(|p| !p.is_empty()).ok_or_else(missing)?;

            match segment.fixed_value {
                Some(expected) => {
                    let matches = if insensitively {
                        part.eq_ignore_ascii_case(expected)
                    } else {
                        part == expected
                    };
                    if !matches {
                        return Err(missing());
                    }
                    parsed.insert(segment.name.to_string(), expected.to_string());
                }
                None => {
                    parsed.insert(segment.name.to_string(), part.to_string());
                }
            }
        }

        let trailing: Vec<&str> = parts.collect();
        if !trailing.is_empty() {
            return Err(ParseError::TrailingSegments {
                input: input.to_string(),
                trailing: trailing.join("/"),
            });
        }

        Ok(ParseResult {
            raw_input: input.to_string(),
            parsed,
        })
    }
}

/// Common behaviour of the typed resource IDs.
pub trait ResourceId: fmt::Display {
    /// The Resource Manager form, e.g. `/subscriptions/x/resourceGroups/y`.
    fn id(&self) -> String;

    fn segments() -> Vec<Segment>
    where
        Self: Sized;
}

fn parse_with<T: ResourceId>(input: &str, insensitively: bool) -> Result<ParseResult, ParseError> {
    Parser::new(T::segments()).parse(input, insensitively)
}

fn describe(kind: &str, components: &[(&str, &str)]) -> String {
    let body = components
        .iter()
        .map(|(label, value)| format!("{}: {:?}", label, value))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{} ({})", kind, body)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId {
    pub subscription_id: String,
}

impl SubscriptionId {
    pub fn new(subscription_id: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, ParseError> {
        Self::from_result(parse_with::<Self>(input, false)?)
    }

    pub fn parse_insensitively(input: &str) -> Result<Self, ParseError> {
        Self::from_result(parse_with::<Self>(input, true)?)
    }

    fn from_result(result: ParseResult) -> Result<Self, ParseError> {
        Ok(Self {
            subscription_id: result.required("subscriptionId")?,
        })
    }
}

impl ResourceId for SubscriptionId {
    fn id(&self) -> String {
        format!("/subscriptions/{}", self.subscription_id)
    }

    fn segments() -> Vec<Segment> {
        vec![
            Segment::static_segment("staticSubscriptions", "subscriptions"),
            Segment::subscription_id("subscriptionId"),
        ]
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&describe(
            "Subscription",
            &[("Subscription", self.subscription_id.as_str())],
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceGroupId {
    pub subscription_id: String,
    pub resource_group_name: String,
}

impl ResourceGroupId {
    pub fn new(subscription_id: impl Into<String>, resource_group_name: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group_name: resource_group_name.into(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, ParseError> {
        Self::from_result(parse_with::<Self>(input, false)?)
    }

    pub fn parse_insensitively(input: &str) -> Result<Self, ParseError> {
        Self::from_result(parse_with::<Self>(input, true)?)
    }

    fn from_result(result: ParseResult) -> Result<Self, ParseError> {
        Ok(Self {
            subscription_id: result.required("subscriptionId")?,
            resource_group_name: result.required("resourceGroupName")?,
        })
    }
}

impl ResourceId for ResourceGroupId {
    fn id(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}",
            self.subscription_id, self.resource_group_name
        )
    }

    fn segments() -> Vec<Segment> {
        vec![
            Segment::static_segment("staticSubscriptions", "subscriptions"),
            Segment::subscription_id("subscriptionId"),
            Segment::static_segment("staticResourceGroups", "resourceGroups"),
            Segment::resource_group("resourceGroupName"),
        ]
    }
}

impl fmt::Display for ResourceGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&describe(
            "Resource Group",
            &[
                ("Subscription", self.subscription_id.as_str()),
                ("Resource Group Name", self.resource_group_name.as_str()),
            ],
        ))
    }
}

/// ID of a Managed Lustre (`Microsoft.StorageCache/amlFilesystems`) file system.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AmlFilesystemId {
    pub subscription_id: String,
    pub resource_group_name: String,
    pub aml_filesystem_name: String,
}

impl AmlFilesystemId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group_name: impl Into<String>,
        aml_filesystem_name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group_name: resource_group_name.into(),
            aml_filesystem_name: aml_filesystem_name.into(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, ParseError> {
        Self::from_result(parse_with::<Self>(input, false)?)
    }

    pub fn parse_insensitively(input: &str) -> Result<Self, ParseError> {
        Self::from_result(parse_with::<Self>(input, true)?)
    }

    fn from_result(result: ParseResult) -> Result<Self, ParseError> {
        Ok(Self {
            subscription_id: result.required("subscriptionId")?,
            resource_group_name: result.required("resourceGroupName")?,
            aml_filesystem_name: result.required("amlFilesystemName")?,
        })
    }
}

impl ResourceId for AmlFilesystemId {
    fn id(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.StorageCache/amlFilesystems/{}",
            self.subscription_id, self.resource_group_name, self.aml_filesystem_name
        )
    }

    fn segments() -> Vec<Segment> {
        vec![
            Segment::static_segment("staticSubscriptions", "subscriptions"),
            Segment::subscription_id("subscriptionId"),
            Segment::static_segment("staticResourceGroups", "resourceGroups"),
            Segment::resource_group("resourceGroupName"),
            Segment::static_segment("staticProviders", "providers"),
            Segment::resource_provider("staticMicrosoftStorageCache", "Microsoft.StorageCache"),
            Segment::static_segment("staticAmlFilesystems", "amlFilesystems"),
            Segment::user_specified("amlFilesystemName", "amlFilesystemValue"),
        ]
    }
}

impl fmt::Display for AmlFilesystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&describe(
            "Aml Filesystem",
            &[
                ("Subscription", self.subscription_id.as_str()),
                ("Resource Group Name", self.resource_group_name.as_str()),
                ("Aml Filesystem Name", self.aml_filesystem_name.as_str()),
            ],
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigurationStoreId {
    pub subscription_id: String,
    pub resource_group_name: String,
    pub configuration_store_name: String,
}

impl ConfigurationStoreId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group_name: impl Into<String>,
        configuration_store_name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group_name: resource_group_name.into(),
            configuration_store_name: configuration_store_name.into(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, ParseError> {
        Self::from_result(parse_with::<Self>(input, false)?)
    }

    pub fn parse_insensitively(input: &str) -> Result<Self, ParseError> {
        Self::from_result(parse_with::<Self>(input, true)?)
    }

    fn from_result(result: ParseResult) -> Result<Self, ParseError> {
        Ok(Self {
            subscription_id: result.required("subscriptionId")?,
            resource_group_name: result.required("resourceGroupName")?,
            configuration_store_name: result.required("configurationStoreName")?,
        })
    }
}

impl ResourceId for ConfigurationStoreId {
    fn id(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.AppConfiguration/configurationStores/{}",
            self.subscription_id, self.resource_group_name, self.configuration_store_name
        )
    }

    fn segments() -> Vec<Segment> {
        vec![
            Segment::static_segment("staticSubscriptions", "subscriptions"),
            Segment::subscription_id("subscriptionId"),
            Segment::static_segment("staticResourceGroups", "resourceGroups"),
            Segment::resource_group("resourceGroupName"),
            Segment::static_segment("staticProviders", "providers"),
            Segment::resource_provider(
                "staticMicrosoftAppConfiguration",
                "Microsoft.AppConfiguration",
            ),
            Segment::static_segment("staticConfigurationStores", "configurationStores"),
            Segment::user_specified("configurationStoreName", "configurationStoreValue"),
        ]
    }
}

impl fmt::Display for ConfigurationStoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&describe(
            "Configuration Store",
            &[
                ("Subscription", self.subscription_id.as_str()),
                ("Resource Group Name", self.resource_group_name.as_str()),
                ("Configuration Store Name", self.configuration_store_name.as_str()),
            ],
        ))
    }
}

/// A soft-deleted configuration store, addressed by location rather than
/// resource group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeletedConfigurationStoreId {
    pub subscription_id: String,
    pub location_name: String,
    pub deleted_configuration_store_name: String,
}

impl DeletedConfigurationStoreId {
    pub fn new(
        subscription_id: impl Into<String>,
        location_name: impl Into<String>,
        deleted_configuration_store_name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            location_name: location_name.into(),
            deleted_configuration_store_name: deleted_configuration_store_name.into(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, ParseError> {
        Self::from_result(parse_with::<Self>(input, false)?)
    }

    pub fn parse_insensitively(input: &str) -> Result<Self, ParseError> {
        Self::from_result(parse_with::<Self>(input, true)?)
    }

    fn from_result(result: ParseResult) -> Result<Self, ParseError> {
        Ok(Self {
            subscription_id: result.required("subscriptionId")?,
            location_name: result.required("locationName")?,
            deleted_configuration_store_name: result.required("deletedConfigurationStoreName")?,
        })
    }
}

impl ResourceId for DeletedConfigurationStoreId {
    fn id(&self) -> String {
        format!(
            "/subscriptions/{}/providers/Microsoft.AppConfiguration/locations/{}/deletedConfigurationStores/{}",
            self.subscription_id, self.location_name, self.deleted_configuration_store_name
        )
    }

    fn segments() -> Vec<Segment> {
        vec![
            Segment::static_segment("staticSubscriptions", "subscriptions"),
            Segment::subscription_id("subscriptionId"),
            Segment::static_segment("staticProviders", "providers"),
            Segment::resource_provider(
                "staticMicrosoftAppConfiguration",
                "Microsoft.AppConfiguration",
            ),
            Segment::static_segment("staticLocations", "locations"),
            Segment::user_specified("locationName", "locationValue"),
            Segment::static_segment(
                "staticDeletedConfigurationStores",
                "deletedConfigurationStores",
            ),
            Segment::user_specified(
                "deletedConfigurationStoreName",
                "deletedConfigurationStoreValue",
            ),
        ]
    }
}

impl fmt::Display for DeletedConfigurationStoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&describe(
            "Deleted Configuration Store",
            &[
                ("Subscription", self.subscription_id.as_str()),
                ("Location Name", self.location_name.as_str()),
                (
                    "Deleted Configuration Store Name",
                    self.deleted_configuration_store_name.as_str(),
                ),
            ],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_group_id_round_trips_through_its_string_form() {
        let id = ResourceGroupId::new("sub", "rg1");
        assert_eq!(id.id(), "/subscriptions/sub/resourceGroups/rg1");
        assert_eq!(ResourceGroupId::parse(&id.id()).unwrap(), id);
    }

    #[test]
    fn display_is_human_readable() {
        let id = ResourceGroupId::new("x", "y");
        assert_eq!(
            id.to_string(),
            "Resource Group (Subscription: \"x\"\nResource Group Name: \"y\")"
        );
    }

    #[test]
    fn parse_is_case_sensitive_on_static_segments() {
        let input = "/subscriptions/sub/resourcegroups/rg1/providers/microsoft.storagecache/amlfilesystems/fs1";
        assert!(AmlFilesystemId::parse(input).is_err());

        let id = AmlFilesystemId::parse_insensitively(input).unwrap();
        assert_eq!(id.aml_filesystem_name, "fs1");
        assert_eq!(
            id.id(),
            "/subscriptions/sub/resourceGroups/rg1/providers/Microsoft.StorageCache/amlFilesystems/fs1"
        );
    }

    #[test]
    fn parse_reports_the_first_missing_segment() {
        let err = ConfigurationStoreId::parse("/subscriptions/sub/resourceGroups/rg1").unwrap_err();
        match err {
            ParseError::MissingSegment { segment, example, .. } => {
                assert_eq!(segment, "staticProviders");
                assert!(example.contains("configurationStoreValue"));
            }
            other => panic!("expected MissingSegment, got {:?}", other),
        }
    }

    #[test]
    fn parse_rejects_trailing_segments_and_empty_input() {
        let result = ResourceGroupId::parse("/subscriptions/sub/resourceGroups/rg1/extra");
        assert!(matches!(result, Err(ParseError::TrailingSegments { .. })));

        assert_eq!(SubscriptionId::parse(""), Err(ParseError::Empty));
        assert_eq!(SubscriptionId::parse("/"), Err(ParseError::Empty));
    }

    #[test]
    fn deleted_configuration_store_id_is_scoped_to_location() {
        let id = DeletedConfigurationStoreId::new("sub", "westeurope", "store1");
        assert_eq!(
            id.id(),
            "/subscriptions/sub/providers/Microsoft.AppConfiguration/locations/westeurope/deletedConfigurationStores/store1"
        );
        assert_eq!(DeletedConfigurationStoreId::parse(&id.id()).unwrap(), id);
        assert!(id.to_string().contains("Location Name: \"westeurope\""));
    }

    #[test]
    fn parser_exposes_user_values() {
        let parser = Parser::new(SubscriptionId::segments());
        let result = parser.parse("/subscriptions/abc", false).unwrap();
        assert_eq!(result.get("subscriptionId"), Some("abc"));
        assert_eq!(
            parser.example(),
            "/subscriptions/12345678-1234-9876-4563-123456789012"
        );
    }
}
