//! Error taxonomy
//!
//! - [`ConfigError`]: fatal, `Injector::initialize` does nothing
//! - [`BindingError`]: one element skipped, the scan goes on
//! - [`CoercionError`]: malformed structured prop, contained per binding
//! - [`RuntimeError`]: the component runtime could not render

use fos_dom::{DomError, NodeId};

/// Invalid configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("This is not a valid configuration object: {}", problems.join(" "))]
    Invalid { problems: Vec<String> },

    #[error("The [options.{option}] option must not be empty.")]
    EmptyPrefix { option: &'static str },

    #[error("The marker attribute `{marker}` contains the prop prefix `{prop}` and would be read as a prop.")]
    OverlappingPrefixes { marker: String, prop: String },

    #[error("Invalid component definition `{name}`: {source}")]
    InvalidComponent {
        name: String,
        #[source]
        source: RuntimeError,
    },
}

/// A host element that could not be bound
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    #[error("No component name specified on {host}.")]
    EmptyName { host: NodeId },

    #[error("No component found with name: {name}.")]
    UnknownComponent { name: String, host: NodeId },

    #[error("Cannot coerce props of `{name}` on {host}: {source}")]
    Coercion {
        name: String,
        host: NodeId,
        #[source]
        source: CoercionError,
    },

    #[error("Cannot render `{name}` on {host}: {source}")]
    Runtime {
        name: String,
        host: NodeId,
        #[source]
        source: RuntimeError,
    },

    #[error("Cannot place `{name}` on {host}: {source}")]
    Dom {
        name: String,
        host: NodeId,
        #[source]
        source: DomError,
    },
}

impl BindingError {
    /// The host element this error is about
    pub fn host(&self) -> NodeId {
        match self {
            BindingError::EmptyName { host }
            | BindingError::UnknownComponent { host, .. }
            | BindingError::Coercion { host, .. }
            | BindingError::Runtime { host, .. }
            | BindingError::Dom { host, .. } => *host,
        }
    }
}

/// A raw prop value that does not fit its declared type
#[derive(Debug, thiserror::Error)]
pub enum CoercionError {
    #[error("Prop `{field}` is declared {expected} but its value is not valid JSON: {source}")]
    InvalidJson {
        field: String,
        expected: crate::schema::PropType,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure inside the component runtime
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("Component `{name}` has an empty template.")]
    EmptyTemplate { name: String },

    #[error("Component `{name}` must render exactly one root element, found {found}.")]
    RootCount { name: String, found: usize },

    #[error("Component `{name}` has an unclosed interpolation at byte {offset}.")]
    UnclosedInterpolation { name: String, offset: usize },

    #[error("Component `{name}` declares an invalid default for `{field}`: {reason}")]
    InvalidDefault {
        name: String,
        field: String,
        reason: String,
    },
}
