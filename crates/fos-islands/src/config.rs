//! Injector configuration
//!
//! Options can be built in code or read from an untyped JSON object:
//!
//! ```json
//! {
//!   "components": {
//!     "Greeter": {
//!       "props": { "firstName": { "type": "String", "required": true } },
//!       "template": "<span>Hello {{ firstName }}</span>"
//!     }
//!   },
//!   "replaceRoot": true,
//!   "componentPrefix": "v-comp",
//!   "propPrefix": "v:"
//! }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ConfigError;
use crate::reconcile::Placement;
use crate::schema::{ComponentDefinition, PropSchema};

/// Namespace put in front of both prefixes
pub const DATA_NAMESPACE: &str = "data-";

pub const DEFAULT_COMPONENT_PREFIX: &str = "v-comp";
pub const DEFAULT_PROP_PREFIX: &str = "v:";

/// Injector options
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Known components, keyed by name
    pub components: BTreeMap<String, ComponentDefinition>,
    /// Replace the host element (`true`) or append into it
    pub replace_root: bool,
    /// Marker attribute is `data-` + this
    pub component_prefix: String,
    /// Prop attributes contain `data-` + this
    pub prop_prefix: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            components: BTreeMap::new(),
            replace_root: true,
            component_prefix: DEFAULT_COMPONENT_PREFIX.to_string(),
            prop_prefix: DEFAULT_PROP_PREFIX.to_string(),
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component under its own name
    pub fn component(mut self, definition: ComponentDefinition) -> Self {
        self.components.insert(definition.name().to_string(), definition);
        self
    }

    pub fn replace_root(mut self, replace: bool) -> Self {
        self.replace_root = replace;
        self
    }

    pub fn component_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.component_prefix = prefix.into();
        self
    }

    pub fn prop_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prop_prefix = prefix.into();
        self
    }

    pub fn placement(&self) -> Placement {
        if self.replace_root {
            Placement::Replace
        } else {
            Placement::Append
        }
    }

    /// Full attribute names derived from the prefixes
    pub fn attribute_names(&self) -> AttributeNames {
        AttributeNames::new(&self.component_prefix, &self.prop_prefix)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.component_prefix.is_empty() {
            return Err(ConfigError::EmptyPrefix { option: "componentPrefix" });
        }
        if self.prop_prefix.is_empty() {
            return Err(ConfigError::EmptyPrefix { option: "propPrefix" });
        }
        let AttributeNames { marker, prop } = self.attribute_names();
        if marker.contains(&prop) {
            return Err(ConfigError::OverlappingPrefixes { marker, prop });
        }
        Ok(())
    }

    /// Read options from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(json).map_err(|e| ConfigError::Invalid {
            problems: vec![format!("The configuration is not valid JSON: {}.", e)],
        })?;
        Self::from_json(&value)
    }

    /// Read options from an untyped JSON value.
    ///
    /// Every problem found is reported at once.
    pub fn from_json(value: &Value) -> Result<Self, ConfigError> {
        let Some(object) = value.as_object() else {
            return Err(ConfigError::Invalid {
                problems: vec!["The configuration must be of type: object.".to_string()],
            });
        };

        let mut problems = Vec::new();
        let mut options = Options::default();

        match object.get("components").filter(|v| !v.is_null()) {
            None => problems.push(required("components")),
            Some(Value::Object(entries)) => {
                for (name, entry) in entries {
                    match component_from_json(name, entry) {
                        Ok(definition) => {
                            options.components.insert(name.clone(), definition);
                        }
                        Err(problem) => problems.push(problem),
                    }
                }
            }
            Some(_) => problems.push(wrong_type("components", "object")),
        }

        match object.get("replaceRoot").filter(|v| !v.is_null()) {
            None => {}
            Some(Value::Bool(b)) => options.replace_root = *b,
            Some(_) => problems.push(wrong_type("replaceRoot", "boolean")),
        }

        for (key, slot) in [
            ("componentPrefix", &mut options.component_prefix),
            ("propPrefix", &mut options.prop_prefix),
        ] {
            match object.get(key).filter(|v| !v.is_null()) {
                None => {}
                Some(Value::String(s)) => *slot = s.clone(),
                Some(_) => problems.push(wrong_type(key, "string")),
            }
        }

        if problems.is_empty() {
            Ok(options)
        } else {
            Err(ConfigError::Invalid { problems })
        }
    }
}

/// Shape of one component entry in a JSON configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ComponentEntry {
    #[serde(default)]
    props: PropSchema,
    #[serde(default)]
    template: String,
}

fn component_from_json(name: &str, entry: &Value) -> Result<ComponentDefinition, String> {
    if !entry.is_object() {
        return Err(format!("The [options.components.{}] entry must be of type: object.", name));
    }
    let entry = ComponentEntry::deserialize(entry)
        .map_err(|e| format!("The [options.components.{}] entry is invalid: {}.", name, e))?;
    Ok(ComponentDefinition::from_parts(name.to_string(), entry.props, entry.template))
}

fn required(key: &str) -> String {
    format!("The [options.{}] option is required.", key)
}

fn wrong_type(key: &str, ty: &str) -> String {
    format!("The [options.{}] option must be of type: {}.", key, ty)
}

/// Attribute names in effect for one injector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeNames {
    /// Marker attribute, e.g. `data-v-comp`
    pub marker: String,
    /// Prop prefix, e.g. `data-v:`
    pub prop: String,
}

impl AttributeNames {
    pub fn new(component_prefix: &str, prop_prefix: &str) -> Self {
        Self {
            marker: format!("{}{}", DATA_NAMESPACE, component_prefix),
            prop: format!("{}{}", DATA_NAMESPACE, prop_prefix),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PropType;
    use serde_json::json;

    fn problems(result: Result<Options, ConfigError>) -> Vec<String> {
        match result {
            Err(ConfigError::Invalid { problems }) => problems,
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert!(options.replace_root);
        assert_eq!(options.placement(), Placement::Replace);
        assert_eq!(
            options.attribute_names(),
            AttributeNames { marker: "data-v-comp".into(), prop: "data-v:".into() }
        );
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let options = Options::new()
            .component(ComponentDefinition::new("Greeter"))
            .replace_root(false)
            .component_prefix("island")
            .prop_prefix("p-");

        assert!(options.components.contains_key("Greeter"));
        assert_eq!(options.placement(), Placement::Append);
        assert_eq!(options.attribute_names().marker, "data-island");
        assert_eq!(options.attribute_names().prop, "data-p-");
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let err = Options::new().prop_prefix("").validate().unwrap_err();
        assert!(matches!(err, ConfigError::EmptyPrefix { option: "propPrefix" }));

        let err = Options::new().component_prefix("").validate().unwrap_err();
        assert!(matches!(err, ConfigError::EmptyPrefix { option: "componentPrefix" }));
    }

    #[test]
    fn test_marker_containing_prop_prefix_rejected() {
        let err = Options::new().component_prefix("v:comp").validate().unwrap_err();
        assert!(matches!(
            &err,
            ConfigError::OverlappingPrefixes { marker, prop } if marker == "data-v:comp" && prop == "data-v:"
        ));
        assert_eq!(
            err.to_string(),
            "The marker attribute `data-v:comp` contains the prop prefix `data-v:` and would be read as a prop."
        );

        let err = Options::new().component_prefix("x").prop_prefix("x").validate().unwrap_err();
        assert!(matches!(err, ConfigError::OverlappingPrefixes { .. }));

        // the other way round the marker is still matched by its full name
        assert!(Options::new().component_prefix("v").prop_prefix("v-").validate().is_ok());
        assert!(Options::new().component_prefix("island").prop_prefix("p-").validate().is_ok());
    }

    #[test]
    fn test_from_json() {
        let options = Options::from_json(&json!({
            "components": {
                "HelloCounter": {
                    "props": { "nb": { "type": "Number", "default": 0 } },
                    "template": "<div>{{ nb }}</div>"
                }
            },
            "replaceRoot": false,
            "propPrefix": "p:"
        })).unwrap();

        let counter = &options.components["HelloCounter"];
        assert_eq!(counter.name(), "HelloCounter");
        assert_eq!(counter.prop_type("nb"), Some(PropType::Number));
        assert_eq!(counter.template_source(), "<div>{{ nb }}</div>");
        assert!(!options.replace_root);
        assert_eq!(options.component_prefix, "v-comp");
        assert_eq!(options.prop_prefix, "p:");
    }

    #[test]
    fn test_from_json_reports_every_problem() {
        let found = problems(Options::from_json(&json!({
            "replaceRoot": "yes",
            "componentPrefix": 1,
            "propPrefix": []
        })));

        assert_eq!(found, vec![
            "The [options.components] option is required.",
            "The [options.replaceRoot] option must be of type: boolean.",
            "The [options.componentPrefix] option must be of type: string.",
            "The [options.propPrefix] option must be of type: string.",
        ]);
    }

    #[test]
    fn test_from_json_bad_components() {
        let found = problems(Options::from_json(&json!({ "components": [] })));
        assert_eq!(found, vec!["The [options.components] option must be of type: object."]);

        let found = problems(Options::from_json(&json!({
            "components": {
                "A": "nope",
                "B": { "props": { "x": { "type": "Date" } } }
            }
        })));
        assert_eq!(found.len(), 2);
        assert!(found[0].starts_with("The [options.components.A] entry must be of type: object"));
        assert!(found[1].starts_with("The [options.components.B] entry is invalid"));
    }

    #[test]
    fn test_from_json_not_an_object() {
        assert_eq!(problems(Options::from_json(&json!(null))).len(), 1);
        assert_eq!(problems(Options::from_json_str("{ nope")).len(), 1);
    }

    #[test]
    fn test_error_display() {
        let err = Options::from_json(&json!({})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "This is not a valid configuration object: The [options.components] option is required."
        );
    }
}
