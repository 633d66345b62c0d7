//! Binding controller
//!
//! [`Injector`] finds host elements, binds each one to a component instance
//! and keeps the instance in sync with the host's attributes.
//!
//! Mutation records are not delivered on their own: the embedder calls
//! [`Injector::process_mutations`] whenever it would run a microtask
//! checkpoint.

use std::collections::BTreeMap;

use fos_dom::{Document, DomResult, DomTree, MutationObserverInit, NodeId};

use crate::binding::{Binding, BindingId, BindingState};
use crate::codec;
use crate::coerce::{self, PropValue};
use crate::config::{AttributeNames, Options};
use crate::error::{BindingError, ConfigError};
use crate::reconcile::{self, Pass, Placement};
use crate::runtime::{ComponentInstance, ComponentRuntime, TemplateRuntime};
use crate::schema::{ComponentDefinition, PropMap};

/// Outcome of a scan
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Bindings created (after `discover`) or mounted (after a full scan)
    pub bindings: Vec<BindingId>,
    /// Elements left untouched, with the reason
    pub skipped: Vec<BindingError>,
}

impl ScanReport {
    /// Nothing was skipped
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Binds marked elements of a document to components
pub struct Injector<R: ComponentRuntime = TemplateRuntime> {
    runtime: R,
    options: Options,
    names: AttributeNames,
    placement: Placement,
    /// Ordered by creation, which is also dispatch order
    bindings: BTreeMap<BindingId, Binding>,
    next_id: u64,
    last_scan: ScanReport,
}

impl<R: ComponentRuntime> Injector<R> {
    /// Validate `options`, then bind every marked element of `document`.
    ///
    /// Nothing is bound when the configuration is invalid.
    pub fn initialize(document: &mut Document, runtime: R, options: Options) -> Result<Self, ConfigError> {
        Self::check_config(&runtime, &options).inspect_err(|err| {
            tracing::error!("[fos-islands] {}", err);
        })?;

        let names = options.attribute_names();
        let placement = options.placement();
        let mut injector = Self {
            runtime,
            options,
            names,
            placement,
            bindings: BTreeMap::new(),
            next_id: 0,
            last_scan: ScanReport::default(),
        };
        injector.scan(document);
        Ok(injector)
    }

    fn check_config(runtime: &R, options: &Options) -> Result<(), ConfigError> {
        options.validate()?;
        for definition in options.components.values() {
            runtime.check(definition).map_err(|source| ConfigError::InvalidComponent {
                name: definition.name().to_string(),
                source,
            })?;
        }
        Ok(())
    }

    /// Discover and bind the whole document, replacing `last_scan`
    fn scan(&mut self, document: &mut Document) -> &ScanReport {
        let discovered = self.discover(document);
        let mut report = ScanReport {
            bindings: Vec::with_capacity(discovered.bindings.len()),
            skipped: discovered.skipped,
        };

        for id in discovered.bindings {
            match self.bind(document, id) {
                Ok(()) => report.bindings.push(id),
                Err(err) => report.skipped.push(err),
            }
        }

        tracing::info!(
            "[fos-islands] Bound {} element(s), skipped {}",
            report.bindings.len(),
            report.skipped.len()
        );
        self.last_scan = report;
        &self.last_scan
    }

    /// Create an `Unbound` binding for every marked element, in document
    /// order. Elements that are already the host of a binding are left out.
    pub fn discover(&mut self, document: &Document) -> ScanReport {
        let tree = document.tree();
        let mut report = ScanReport::default();

        for host in tree.elements_with_attribute(tree.root(), &self.names.marker) {
            let already_bound = self.bindings.values()
                .any(|b| b.host() == host && b.state() != BindingState::Abandoned);
            if already_bound {
                continue;
            }

            let name = tree.get_attribute(host, &self.names.marker).unwrap_or_default();
            if name.is_empty() {
                let err = BindingError::EmptyName { host };
                tracing::error!("[fos-islands] {}", err);
                report.skipped.push(err);
                continue;
            }
            if !self.options.components.contains_key(name) {
                let err = BindingError::UnknownComponent { name: name.to_string(), host };
                tracing::error!("[fos-islands] {}", err);
                report.skipped.push(err);
                continue;
            }

            let id = BindingId(self.next_id);
            self.next_id += 1;
            self.bindings.insert(id, Binding::new(id, name, host, self.placement));
            tracing::debug!("[fos-islands] Discovered `{}` on {} as {}", name, host, id);
            report.bindings.push(id);
        }

        report
    }

    /// Mount an `Unbound` binding and start watching its host.
    ///
    /// On failure the binding is dropped and the element is left as it was.
    /// Unknown ids and bindings past `Unbound` are ignored.
    pub fn bind(&mut self, document: &mut Document, id: BindingId) -> Result<(), BindingError> {
        let result = self.mount(document.tree_mut(), id);
        if let Err(err) = &result {
            tracing::error!("[fos-islands] {}", err);
            self.bindings.remove(&id);
        }
        result
    }

    fn mount(&mut self, tree: &mut DomTree, id: BindingId) -> Result<(), BindingError> {
        let Some(binding) = self.bindings.get_mut(&id) else {
            return Ok(());
        };
        if binding.state() != BindingState::Unbound {
            return Ok(());
        }

        let name = binding.name().to_string();
        let host = binding.host();
        // An outer binding rendered over this host before it was reached
        if tree.get(host).is_none() {
            binding.abandon();
            tracing::debug!("[fos-islands] Host {} of {} is gone, abandoning", host, id);
            return Ok(());
        }
        let definition = self.options.components.get(&name).ok_or_else(|| {
            BindingError::UnknownComponent { name: name.clone(), host }
        })?;

        let (raw, typed, instance) = render(&mut self.runtime, definition, &self.names.prop, self.placement, tree, host)?;
        let host = place(tree, host, instance.root, self.placement, Pass::FirstMount, &name, &self.names)?;

        binding.commit(host, raw, typed, instance);
        binding.watch(tree.observe(host, MutationObserverInit::attributes()));
        tracing::debug!("[fos-islands] Mounted `{}` for {} on {}", name, id, host);
        Ok(())
    }

    /// Drain pending mutation records and re-render the affected bindings.
    ///
    /// Every record causes one re-render. Returns the number of re-renders
    /// that completed.
    pub fn process_mutations(&mut self, document: &mut Document) -> usize {
        let live: Vec<BindingId> = self.bindings.values()
            .filter(|b| b.is_live())
            .map(Binding::id)
            .collect();

        live.into_iter()
            .map(|id| self.dispatch(document.tree_mut(), id))
            .sum()
    }

    fn dispatch(&mut self, tree: &mut DomTree, id: BindingId) -> usize {
        let Some(observer) = self.bindings.get(&id).and_then(Binding::observer) else {
            return 0;
        };

        let mut rerenders = 0;
        for record in tree.take_records(observer) {
            let Some(host) = self.bindings.get(&id).map(Binding::host) else {
                break;
            };
            if !tree.is_connected(host) {
                self.abandon(tree, id);
                break;
            }

            tracing::debug!(
                "[fos-islands] `{}` changed on {}, re-rendering {}",
                record.attribute_name,
                record.target,
                id
            );
            match self.rerender(tree, id) {
                Ok(()) => rerenders += 1,
                Err(err) => tracing::error!("[fos-islands] {}", err),
            }

            // Records caused by our own pass are not external changes.
            tree.take_records(observer);
        }
        rerenders
    }

    /// Full remount for one binding. The previous instance and DOM stay in
    /// place when anything fails.
    fn rerender(&mut self, tree: &mut DomTree, id: BindingId) -> Result<(), BindingError> {
        let Some(binding) = self.bindings.get_mut(&id) else {
            return Ok(());
        };
        let name = binding.name().to_string();
        let host = binding.host();
        let definition = self.options.components.get(&name).ok_or_else(|| {
            BindingError::UnknownComponent { name: name.clone(), host }
        })?;

        let (raw, typed, mut instance) = render(&mut self.runtime, definition, &self.names.prop, self.placement, tree, host)?;
        let host = place(tree, host, instance.root, self.placement, Pass::Rerender, &name, &self.names)?;

        // Replace moved the content into the host; the rendered shell is gone.
        if self.placement == Placement::Replace {
            instance.root = host;
        }
        binding.commit(host, raw, typed, instance);
        Ok(())
    }

    fn abandon(&mut self, tree: &mut DomTree, id: BindingId) {
        if let Some(binding) = self.bindings.get_mut(&id) {
            if let Some(observer) = binding.abandon() {
                tree.observers_mut().disconnect(observer);
            }
            tracing::debug!("[fos-islands] Host {} of {} is detached, abandoning", binding.host(), id);
        }
    }

    /// Dispose every binding, then discover and bind the document again.
    ///
    /// The rendered output converges; binding ids are not kept.
    pub fn rescan(&mut self, document: &mut Document) -> &ScanReport {
        let ids: Vec<BindingId> = self.bindings.keys().copied().collect();
        for id in ids {
            self.dispose(document, id);
        }
        self.scan(document)
    }

    /// Stop watching a binding and forget it.
    ///
    /// Append bindings also take their rendered output out of the host and
    /// free it. Replace output stays where it is.
    pub fn dispose(&mut self, document: &mut Document, id: BindingId) -> Option<Binding> {
        let binding = self.bindings.remove(&id)?;
        let tree = document.tree_mut();

        if let Some(observer) = binding.observer() {
            tree.observers_mut().disconnect(observer);
        }
        if binding.placement() == Placement::Append {
            if let Some(root) = binding.instance().map(|i| i.root) {
                if tree.parent(root) == Some(binding.host()) {
                    // Dropping a known child of the host cannot fail
                    let _ = tree.drop_subtree(root);
                }
            }
        }

        tracing::debug!("[fos-islands] Disposed {}", id);
        Some(binding)
    }

    /// Abandon bindings whose host left the document, then drop every
    /// abandoned binding. Returns how many were dropped.
    pub fn prune(&mut self, document: &mut Document) -> usize {
        let tree = document.tree_mut();
        let detached: Vec<BindingId> = self.bindings.values()
            .filter(|b| b.state() != BindingState::Abandoned && !tree.is_connected(b.host()))
            .map(Binding::id)
            .collect();
        for id in detached {
            self.abandon(tree, id);
        }

        let before = self.bindings.len();
        self.bindings.retain(|_, b| b.state() != BindingState::Abandoned);
        before - self.bindings.len()
    }

    /// Write a prop back to the host as its attribute.
    ///
    /// The re-render happens on the next [`Injector::process_mutations`].
    /// Returns `false` if there is no such binding.
    pub fn set_prop(&self, document: &mut Document, id: BindingId, field: &str, value: &str) -> DomResult<bool> {
        let Some(binding) = self.bindings.get(&id) else {
            return Ok(false);
        };
        let attribute = codec::field_to_attribute(&self.names.prop, field);
        document.tree_mut().set_attribute(binding.host(), &attribute, value)?;
        Ok(true)
    }

    pub fn binding(&self, id: BindingId) -> Option<&Binding> {
        self.bindings.get(&id)
    }

    /// All bindings in creation order
    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.values()
    }

    /// Binding whose current host is `host`
    pub fn binding_for_host(&self, host: NodeId) -> Option<&Binding> {
        self.bindings.values().find(|b| b.host() == host)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Report of the last full scan (`initialize` or `rescan`)
    pub fn last_scan(&self) -> &ScanReport {
        &self.last_scan
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn attribute_names(&self) -> &AttributeNames {
        &self.names
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }
}

/// Tag of the element the rendered root ends up under
fn render_context(tree: &DomTree, host: NodeId, placement: Placement) -> String {
    let parent = match placement {
        Placement::Replace => tree.parent(host),
        Placement::Append => Some(host),
    };
    parent
        .and_then(|p| tree.tag_name(p))
        .unwrap_or("body")
        .to_string()
}

/// Extract, coerce and instantiate for one host
fn render<R: ComponentRuntime>(
    runtime: &mut R,
    definition: &ComponentDefinition,
    prop_prefix: &str,
    placement: Placement,
    tree: &mut DomTree,
    host: NodeId,
) -> Result<(PropMap<String>, PropMap<PropValue>, ComponentInstance), BindingError> {
    let name = definition.name();
    let raw = codec::extract_managed_attributes(prop_prefix, tree, host);
    let typed = coerce::coerce(&raw, definition).map_err(|source| BindingError::Coercion {
        name: name.to_string(),
        host,
        source,
    })?;
    let context = render_context(tree, host, placement);
    let instance = runtime.instantiate(definition, &typed, &context, tree).map_err(|source| BindingError::Runtime {
        name: name.to_string(),
        host,
        source,
    })?;
    Ok((raw, typed, instance))
}

/// Reconcile a rendered root; the root is freed again if it cannot be placed
fn place(
    tree: &mut DomTree,
    host: NodeId,
    rendered: NodeId,
    placement: Placement,
    pass: Pass,
    name: &str,
    names: &AttributeNames,
) -> Result<NodeId, BindingError> {
    reconcile::place(tree, host, rendered, placement, pass, name, names).map_err(|source| {
        if tree.parent(rendered).is_none() {
            let _ = tree.drop_subtree(rendered);
        }
        BindingError::Dom { name: name.to_string(), host, source }
    })
}

impl<R: ComponentRuntime> std::fmt::Debug for Injector<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injector")
            .field("names", &self.names)
            .field("placement", &self.placement)
            .field("bindings", &self.bindings.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeError;
    use crate::schema::{PropDecl, PropType};

    fn greeter() -> ComponentDefinition {
        ComponentDefinition::new("Greeter")
            .prop("firstName", PropDecl::new(PropType::String).required())
            .prop("lastName", PropDecl::new(PropType::String).required())
            .template("<span class=\"greeter\">Hello, {{ firstName }} {{ lastName }}!</span>")
    }

    fn page(body: &str) -> Document {
        fos_html::parse(&format!("<html><body>{}</body></html>", body))
    }

    fn injector(document: &mut Document, options: Options) -> Injector {
        Injector::initialize(document, TemplateRuntime::new(), options.component(greeter())).unwrap()
    }

    #[test]
    fn test_initialize_binds_marked_elements() {
        let mut doc = page(
            r#"<div data-v-comp="Greeter" data-v:first-name="Jacky" data-v:last-name="Chan"></div>"#,
        );
        let injector = injector(&mut doc, Options::new());

        assert_eq!(injector.len(), 1);
        assert!(injector.last_scan().is_clean());
        let binding = injector.bindings().next().unwrap();
        assert_eq!(binding.state(), BindingState::Watching);
        assert_eq!(binding.renders(), 1);
        assert_eq!(binding.typed_props()["firstName"], PropValue::String("Jacky".into()));
        assert_eq!(doc.tree().text_content(binding.host()), "Hello, Jacky Chan!");
    }

    #[test]
    fn test_discover_skips_bad_markers() {
        let mut doc = page(r#"<div data-v-comp=""></div><div data-v-comp="Nope"></div>"#);
        let injector = injector(&mut doc, Options::new());

        assert!(injector.is_empty());
        let skipped = &injector.last_scan().skipped;
        assert_eq!(skipped.len(), 2);
        assert!(matches!(skipped[0], BindingError::EmptyName { .. }));
        assert!(matches!(&skipped[1], BindingError::UnknownComponent { name, .. } if name == "Nope"));
    }

    #[test]
    fn test_discover_ignores_bound_hosts() {
        let mut doc = page(r#"<div data-v-comp="Greeter"></div>"#);
        let mut injector = injector(&mut doc, Options::new());

        let report = injector.discover(&doc);
        assert!(report.bindings.is_empty());
        assert_eq!(injector.len(), 1);
    }

    #[test]
    fn test_case_sensitive_name() {
        let mut doc = page(r#"<div data-v-comp="greeter"></div>"#);
        let injector = injector(&mut doc, Options::new());
        assert!(injector.is_empty());
        assert_eq!(injector.last_scan().skipped.len(), 1);
    }

    #[test]
    fn test_invalid_config_binds_nothing() {
        let mut doc = page(r#"<div data-v-comp="Greeter"></div>"#);
        let before = doc.tree().outer_html(doc.body());

        let broken = ComponentDefinition::new("Broken").template("<p></p><p></p>");
        let err = Injector::initialize(
            &mut doc,
            TemplateRuntime::new(),
            Options::new().component(greeter()).component(broken),
        ).unwrap_err();

        assert!(matches!(err, ConfigError::InvalidComponent { ref name, source: RuntimeError::RootCount { .. } } if name == "Broken"));
        assert_eq!(doc.tree().outer_html(doc.body()), before);
    }

    #[test]
    fn test_set_prop_rerenders() {
        let mut doc = page(r#"<div data-v-comp="Greeter" data-v:first-name="Jacky" data-v:last-name="Chan"></div>"#);
        let mut injector = injector(&mut doc, Options::new());
        let id = injector.bindings().next().unwrap().id();

        assert!(injector.set_prop(&mut doc, id, "firstName", "Chuck").unwrap());
        assert_eq!(injector.process_mutations(&mut doc), 1);

        let binding = injector.binding(id).unwrap();
        assert_eq!(binding.raw_props()["firstName"], "Chuck");
        assert_eq!(doc.tree().text_content(binding.host()), "Hello, Chuck Chan!");
        assert_eq!(binding.renders(), 2);

        assert!(!injector.set_prop(&mut doc, BindingId(99), "firstName", "x").unwrap());
    }

    #[test]
    fn test_no_records_no_rerender() {
        let mut doc = page(r#"<div data-v-comp="Greeter"></div>"#);
        let mut injector = injector(&mut doc, Options::new());
        assert_eq!(injector.process_mutations(&mut doc), 0);
    }

    #[test]
    fn test_dispose_stops_watching() {
        let mut doc = page(r#"<div data-v-comp="Greeter" data-v:first-name="A"></div>"#);
        let mut injector = injector(&mut doc, Options::new());
        let id = injector.bindings().next().unwrap().id();
        let host = injector.binding(id).unwrap().host();

        let disposed = injector.dispose(&mut doc, id).unwrap();
        assert_eq!(disposed.id(), id);
        assert!(injector.is_empty());

        doc.tree_mut().set_attribute(host, "data-v:first-name", "B").unwrap();
        assert_eq!(injector.process_mutations(&mut doc), 0);
        assert!(doc.tree().text_content(host).contains("A"));
    }

    #[test]
    fn test_binding_ids_are_not_reused() {
        let mut doc = page(r#"<div data-v-comp="Greeter"></div>"#);
        let mut injector = injector(&mut doc, Options::new());
        let first = injector.bindings().next().unwrap().id();

        injector.rescan(&mut doc);
        let second = injector.bindings().next().unwrap().id();
        assert!(second > first);
    }
}
