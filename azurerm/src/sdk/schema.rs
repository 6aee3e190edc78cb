//! Resource schemas
//!
//! A schema lists a resource's attributes with their types, whether the
//! user must, may or cannot set them, and the validators run against
//! configured values.

use std::collections::HashMap;
use std::fmt;

use super::types::{Diagnostics, Dynamic};
use crate::validate::Validator;

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number,
    Bool,
    List(Box<AttributeType>),
    Map(Box<AttributeType>),
    /// A nested block with a fixed set of typed fields.
    Object(HashMap<String, AttributeType>),
}

impl AttributeType {
    /// True when `value` is null or has this type.
    pub fn accepts(&self, value: &Dynamic) -> bool {
        match (self, value) {
            (_, Dynamic::Null) => true,
            (AttributeType::String, Dynamic::String(_)) => true,
            (AttributeType::Number, Dynamic::Number(_)) => true,
            (AttributeType::Bool, Dynamic::Bool(_)) => true,
            (AttributeType::List(elem), Dynamic::List(items)) => {
                items.iter().all(|item| elem.accepts(item))
            }
            (AttributeType::Map(elem), Dynamic::Map(entries)) => {
                entries.values().all(|item| elem.accepts(item))
            }
            (AttributeType::Object(fields), Dynamic::Map(entries)) => {
                entries.iter().all(|(name, item)| {
                    fields.get(name).map_or(false, |field| field.accepts(item))
                })
            }
            _ => false,
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeType::String => f.write_str("string"),
            AttributeType::Number => f.write_str("number"),
            AttributeType::Bool => f.write_str("bool"),
            AttributeType::List(elem) => write!(f, "list of {}", elem),
            AttributeType::Map(elem) => write!(f, "map of {}", elem),
            AttributeType::Object(_) => f.write_str("object"),
        }
    }
}

pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    /// Changing the value replaces the resource.
    pub force_new: bool,
    pub sensitive: bool,
    pub default: Option<Dynamic>,
    pub validators: Vec<Box<dyn Validator>>,
}

impl Attribute {
    /// Set by the provider only, never by configuration.
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("force_new", &self.force_new)
            .field("sensitive", &self.sensitive)
            .field("default", &self.default)
            .field(
                "validators",
                &format!("{} validators", self.validators.len()),
            )
            .finish()
    }
}

pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, r#type: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                force_new: false,
                sensitive: false,
                default: None,
                validators: vec![],
            },
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.attribute.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Dynamic>) -> Self {
        self.attribute.default = Some(value.into());
        self
    }

    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.attribute.validators.push(Box::new(validator));
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

#[derive(Debug, Default)]
pub struct Schema {
    pub version: i64,
    pub description: String,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Checks a configuration against the schema: unknown and mistyped
    /// attributes, missing required ones, values set on computed-only
    /// attributes, then each attribute's validators.
    pub fn validate(&self, config: &HashMap<String, Dynamic>) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();

        for name in config.keys() {
            if name != "id" && self.attribute(name).is_none() {
                diagnostics.add_attribute_error(
                    name,
                    "Unsupported argument",
                    Some(format!("An argument named {:?} is not expected here.", name)),
                );
            }
        }

        for attribute in &self.attributes {
            let value = config.get(&attribute.name).unwrap_or(&Dynamic::Null);

            if value.is_null() {
                if attribute.required {
                    diagnostics.add_attribute_error(
                        &attribute.name,
                        "Missing required argument",
                        Some(format!(
                            "The argument {:?} is required, but no definition was found.",
                            attribute.name
                        )),
                    );
                }
                continue;
            }

            if attribute.is_computed_only() {
                diagnostics.add_attribute_error(
                    &attribute.name,
                    "Invalid argument",
                    Some(format!(
                        "{:?} is computed and cannot be set in configuration.",
                        attribute.name
                    )),
                );
                continue;
            }

            if !attribute.r#type.accepts(value) {
                diagnostics.add_attribute_error(
                    &attribute.name,
                    "Incorrect attribute value type",
                    Some(format!(
                        "{:?} must be a {}, got {}",
                        attribute.name,
                        attribute.r#type,
                        value.type_name()
                    )),
                );
                continue;
            }

            for validator in &attribute.validators {
                validator.validate(value, &attribute.name, &mut diagnostics);
            }
        }

        diagnostics
    }

    /// Fills unset optional attributes with their defaults.
    pub fn apply_defaults(&self, values: &mut HashMap<String, Dynamic>) {
        for attribute in &self.attributes {
            if let Some(default) = &attribute.default {
                let unset = values.get(&attribute.name).map_or(true, Dynamic::is_null);
                if unset {
                    values.insert(attribute.name.clone(), default.clone());
                }
            }
        }
    }
}

pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            schema: Schema::default(),
        }
    }

    pub fn version(mut self, version: i64) -> Self {
        self.schema.version = version;
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.schema.description = desc.to_string();
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.schema.attributes.push(attr);
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}
