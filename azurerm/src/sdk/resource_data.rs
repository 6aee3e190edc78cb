//! Per-operation resource state

use std::collections::HashMap;

use super::types::Dynamic;

/// The id and attribute values of one resource instance.
///
/// During create and update the values are the planned configuration;
/// `prior` holds the state from before the operation, if any, so resources
/// can ask which attributes changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceData {
    id: Option<String>,
    values: HashMap<String, Dynamic>,
    prior: Option<HashMap<String, Dynamic>>,
}

impl ResourceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: HashMap<String, Dynamic>) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    /// Builds data from a JSON object, as used by tests and importers.
    pub fn from_json(value: serde_json::Value) -> Self {
        match Dynamic::from(value) {
            Dynamic::Map(values) => Self::from_values(values),
            _ => Self::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Records the state before this operation; changes are measured
    /// against it.
    pub fn with_prior_state(mut self, prior: HashMap<String, Dynamic>) -> Self {
        self.prior = Some(prior);
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Marks the resource as gone.
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    pub fn values(&self) -> &HashMap<String, Dynamic> {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut HashMap<String, Dynamic> {
        &mut self.values
    }

    /// The value of `name`, or `None` when it is unset or null.
    pub fn get(&self, name: &str) -> Option<&Dynamic> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    pub fn get_string(&self, name: &str) -> Option<String> {
        self.get(name)
            .and_then(Dynamic::as_string)
            .map(str::to_string)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Dynamic::as_bool)
    }

    pub fn get_number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Dynamic::as_number)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get_number(name).map(|n| n as i64)
    }

    /// String entries of a map attribute; non-string entries are skipped.
    /// Unset maps read as empty.
    pub fn get_string_map(&self, name: &str) -> HashMap<String, String> {
        self.get(name)
            .and_then(Dynamic::as_map)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|(k, v)| v.as_string().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get_string_list(&self, name: &str) -> Vec<String> {
        self.get(name)
            .and_then(Dynamic::as_list)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_string().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn set(&mut self, name: &str, value: Dynamic) {
        self.values.insert(name.to_string(), value);
    }

    pub fn set_string(&mut self, name: &str, value: impl Into<String>) {
        self.set(name, Dynamic::String(value.into()));
    }

    /// Sets the string, or null when `value` is `None`.
    pub fn set_optional_string(&mut self, name: &str, value: Option<&str>) {
        match value {
            Some(v) => self.set_string(name, v),
            None => self.set(name, Dynamic::Null),
        }
    }

    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.set(name, Dynamic::Bool(value));
    }

    pub fn set_number(&mut self, name: &str, value: f64) {
        self.set(name, Dynamic::Number(value));
    }

    pub fn set_string_map(&mut self, name: &str, value: &HashMap<String, String>) {
        let entries = value
            .iter()
            .map(|(k, v)| (k.clone(), Dynamic::String(v.clone())))
            .collect();
        self.set(name, Dynamic::Map(entries));
    }

    pub fn set_string_list(&mut self, name: &str, value: &[String]) {
        let items = value.iter().cloned().map(Dynamic::String).collect();
        self.set(name, Dynamic::List(items));
    }

    /// True when `name` differs from the prior state. Without a prior state
    /// every attribute counts as changed.
    pub fn has_change(&self, name: &str) -> bool {
        match &self.prior {
            Some(prior) => {
                let before = prior.get(name).unwrap_or(&Dynamic::Null);
                let after = self.values.get(name).unwrap_or(&Dynamic::Null);
                before != after
            }
            None => true,
        }
    }

    /// The prior value of `name`, if one was recorded.
    pub fn get_prior(&self, name: &str) -> Option<&Dynamic> {
        self.prior
            .as_ref()
            .and_then(|prior| prior.get(name))
            .filter(|v| !v.is_null())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn typed_getters_read_values() {
        let data = ResourceData::from_json(json!({
            "name": "rg1",
            "enabled": true,
            "retention": 7,
            "zones": ["1", "2"],
            "tags": {"env": "prod", "count": 3},
            "empty": null
        }));

        assert_eq!(data.get_string("name").as_deref(), Some("rg1"));
        assert_eq!(data.get_bool("enabled"), Some(true));
        assert_eq!(data.get_i64("retention"), Some(7));
        assert_eq!(data.get_string_list("zones"), vec!["1", "2"]);
        assert_eq!(data.get_string_map("tags").len(), 1);
        assert!(data.get("empty").is_none());
        assert!(data.get_string_map("missing").is_empty());
    }

    #[test]
    fn id_lifecycle() {
        let mut data = ResourceData::new();
        assert!(data.id().is_none());

        data.set_id("/subscriptions/sub/resourceGroups/rg1");
        assert_eq!(data.id(), Some("/subscriptions/sub/resourceGroups/rg1"));

        data.clear_id();
        assert!(data.id().is_none());

        data.set_id("");
        assert!(data.id().is_none());
    }

    #[test]
    fn has_change_compares_against_prior_state() {
        let prior = ResourceData::from_json(json!({"sku": "standard", "tags": {"a": "1"}}));
        let mut data = ResourceData::from_json(json!({"sku": "standard", "tags": {"a": "2"}}))
            .with_prior_state(prior.values().clone());

        assert!(!data.has_change("sku"));
        assert!(data.has_change("tags"));
        assert!(!data.has_change("unset"));

        data.set_optional_string("sku", None);
        assert!(data.has_change("sku"));
        assert_eq!(
            data.get_prior("sku").and_then(Dynamic::as_string),
            Some("standard")
        );
    }

    #[test]
    fn without_prior_state_everything_changed() {
        let data = ResourceData::from_json(json!({"sku": "standard"}));
        assert!(data.has_change("sku"));
    }
}
