//! fOS Islands
//!
//! Turns marked elements of a plain HTML document into live component
//! islands. A host element names its component in a marker attribute and
//! carries the component's props as prefixed attributes:
//!
//! ```html
//! <div data-v-comp="Greeter" data-v:first-name="Jacky" data-v:last-name="Chan"></div>
//! ```
//!
//! The [`Injector`] renders the component in place of (or inside) the host
//! and re-renders it whenever one of the host's attributes changes.
//!
//! # Example
//! ```rust,ignore
//! use fos_islands::{ComponentDefinition, Injector, Options, PropDecl, PropType, TemplateRuntime};
//!
//! let mut document = fos_html::parse(html);
//! let greeter = ComponentDefinition::new("Greeter")
//!     .prop("firstName", PropDecl::new(PropType::String).required())
//!     .template("<span>Hello, {{ firstName }}!</span>");
//!
//! let mut injector = Injector::initialize(&mut document, TemplateRuntime::new(), Options::new().component(greeter))?;
//! // ... attributes change ...
//! injector.process_mutations(&mut document);
//! ```

pub mod binding;
pub mod codec;
pub mod coerce;
pub mod config;
pub mod controller;
pub mod error;
pub mod reconcile;
pub mod runtime;
pub mod schema;

pub use binding::{Binding, BindingId, BindingState};
pub use coerce::PropValue;
pub use config::{AttributeNames, Options};
pub use controller::{Injector, ScanReport};
pub use error::{BindingError, CoercionError, ConfigError, RuntimeError};
pub use reconcile::Placement;
pub use runtime::{ComponentInstance, ComponentRuntime, InstanceId, TemplateRuntime};
pub use schema::{ComponentDefinition, PropDecl, PropMap, PropSchema, PropType};

// Re-export the substrate crates
pub use fos_dom as dom;
pub use fos_html as html;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
