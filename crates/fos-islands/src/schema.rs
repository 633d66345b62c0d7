//! Component definitions and their declared props

use std::collections::BTreeMap;

use serde::Deserialize;

/// Field name -> value mapping used for raw and typed props
pub type PropMap<V> = BTreeMap<String, V>;

/// Declared type of a prop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum PropType {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl PropType {
    /// Object- and list-shaped types are parsed as JSON
    pub fn is_structured(self) -> bool {
        matches!(self, PropType::Object | PropType::Array)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PropType::String => "String",
            PropType::Number => "Number",
            PropType::Boolean => "Boolean",
            PropType::Object => "Object",
            PropType::Array => "Array",
        }
    }
}

impl std::fmt::Display for PropType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared prop
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PropDecl {
    #[serde(rename = "type")]
    pub ty: PropType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
}

impl PropDecl {
    pub fn new(ty: PropType) -> Self {
        Self { ty, required: false, default: None }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: serde_json::Value) -> Self {
        self.default = Some(value);
        self
    }
}

/// Declared props of a component, keyed by camel-case field name
pub type PropSchema = BTreeMap<String, PropDecl>;

/// A named component: its prop schema plus the markup a runtime renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDefinition {
    name: String,
    props: PropSchema,
    template: String,
}

impl ComponentDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            props: PropSchema::new(),
            template: String::new(),
        }
    }

    /// Declare a prop
    pub fn prop(mut self, field: impl Into<String>, decl: PropDecl) -> Self {
        self.props.insert(field.into(), decl);
        self
    }

    /// Set the template markup
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn props(&self) -> &PropSchema {
        &self.props
    }

    pub fn template_source(&self) -> &str {
        &self.template
    }

    /// Declared type of a field, if the schema knows it
    pub fn prop_type(&self, field: &str) -> Option<PropType> {
        self.props.get(field).map(|decl| decl.ty)
    }

    pub(crate) fn from_parts(name: String, props: PropSchema, template: String) -> Self {
        Self { name, props, template }
    }
}
