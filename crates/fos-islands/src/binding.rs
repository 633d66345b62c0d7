//! Binding records
//!
//! One [`Binding`] links one host element to one component instance. The
//! document owns the host node; the binding only remembers which node it
//! is and what was rendered for it.

use fos_dom::{NodeId, ObserverId};

use crate::coerce::PropValue;
use crate::reconcile::Placement;
use crate::runtime::ComponentInstance;
use crate::schema::PropMap;

/// Unique binding handle within one injector, never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(pub(crate) u64);

impl BindingId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for BindingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "binding-{}", self.0)
    }
}

/// Lifecycle of a binding
///
/// ```text
/// Unbound --bind--> Bound --observe--> Watching <--re-render--+
///                                         |                   |
///                                         +-------------------+
///                                         |
///                                  host detached
///                                         v
///                                     Abandoned
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindingState {
    #[default]
    Unbound,
    Bound,
    Watching,
    Abandoned,
}

/// Runtime record for one host element
#[derive(Debug, Clone)]
pub struct Binding {
    id: BindingId,
    name: String,
    host: NodeId,
    placement: Placement,
    raw_props: PropMap<String>,
    typed_props: PropMap<PropValue>,
    instance: Option<ComponentInstance>,
    observer: Option<ObserverId>,
    state: BindingState,
    renders: u64,
}

impl Binding {
    pub(crate) fn new(id: BindingId, name: &str, host: NodeId, placement: Placement) -> Self {
        Self {
            id,
            name: name.to_string(),
            host,
            placement,
            raw_props: PropMap::new(),
            typed_props: PropMap::new(),
            instance: None,
            observer: None,
            state: BindingState::Unbound,
            renders: 0,
        }
    }

    pub fn id(&self) -> BindingId {
        self.id
    }

    /// Component name, as written in the marker attribute
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current host node (the rendered root after a Replace mount)
    pub fn host(&self) -> NodeId {
        self.host
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn raw_props(&self) -> &PropMap<String> {
        &self.raw_props
    }

    pub fn typed_props(&self) -> &PropMap<PropValue> {
        &self.typed_props
    }

    /// The live instance, if the binding has rendered
    pub fn instance(&self) -> Option<&ComponentInstance> {
        self.instance.as_ref()
    }

    pub fn observer(&self) -> Option<ObserverId> {
        self.observer
    }

    pub fn state(&self) -> BindingState {
        self.state
    }

    /// Completed render cycles, first mount included
    pub fn renders(&self) -> u64 {
        self.renders
    }

    /// Whether mutation records are still dispatched to this binding
    pub fn is_live(&self) -> bool {
        self.state == BindingState::Watching
    }

    /// Record a successful render. The previous instance is dropped here.
    pub(crate) fn commit(
        &mut self,
        host: NodeId,
        raw_props: PropMap<String>,
        typed_props: PropMap<PropValue>,
        instance: ComponentInstance,
    ) {
        self.host = host;
        self.raw_props = raw_props;
        self.typed_props = typed_props;
        self.instance = Some(instance);
        self.renders += 1;
        if self.state == BindingState::Unbound {
            self.state = BindingState::Bound;
        }
    }

    pub(crate) fn watch(&mut self, observer: ObserverId) {
        debug_assert!(self.observer.is_none(), "one observer per binding");
        self.observer = Some(observer);
        self.state = BindingState::Watching;
    }

    /// Mark abandoned and hand back the observer to disconnect
    pub(crate) fn abandon(&mut self) -> Option<ObserverId> {
        self.state = BindingState::Abandoned;
        self.observer.take()
    }
}
