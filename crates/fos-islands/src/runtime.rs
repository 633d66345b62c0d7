//! Component runtime seam
//!
//! The binder never renders anything itself. It hands a definition and typed
//! props to a [`ComponentRuntime`] and gets back a detached root node living
//! in the document's tree. The runtime is told the tag of the element the
//! root will end up in, so markup such as table rows parses the way it would
//! in place. [`TemplateRuntime`] is the built-in runtime:
//! `{{ field }}` interpolation over the definition's template markup.

use fos_dom::{DomTree, NodeId};
use fos_html::HtmlParser;

use crate::coerce::PropValue;
use crate::error::RuntimeError;
use crate::schema::{ComponentDefinition, PropMap};

/// Identifies one rendered instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u64);

/// A rendered component instance
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentInstance {
    pub id: InstanceId,
    /// Detached root element, ready to be placed
    pub root: NodeId,
    /// Props the instance was created with, defaults applied
    pub props: PropMap<PropValue>,
}

/// Creates and renders component instances
pub trait ComponentRuntime {
    /// Validate a definition before any element is bound
    fn check(&self, _definition: &ComponentDefinition) -> Result<(), RuntimeError> {
        Ok(())
    }

    /// Create an instance with `props` and render it into `tree`.
    ///
    /// `context` is the tag name of the element the root will be placed
    /// under.
    fn instantiate(
        &mut self,
        definition: &ComponentDefinition,
        props: &PropMap<PropValue>,
        context: &str,
        tree: &mut DomTree,
    ) -> Result<ComponentInstance, RuntimeError>;
}

impl<R: ComponentRuntime + ?Sized> ComponentRuntime for Box<R> {
    fn check(&self, definition: &ComponentDefinition) -> Result<(), RuntimeError> {
        (**self).check(definition)
    }

    fn instantiate(
        &mut self,
        definition: &ComponentDefinition,
        props: &PropMap<PropValue>,
        context: &str,
        tree: &mut DomTree,
    ) -> Result<ComponentInstance, RuntimeError> {
        (**self).instantiate(definition, props, context, tree)
    }
}

/// Template-based runtime
#[derive(Debug, Default)]
pub struct TemplateRuntime {
    parser: HtmlParser,
    instances: u64,
}

impl TemplateRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of instances created so far
    pub fn instances_created(&self) -> u64 {
        self.instances
    }

    /// Declared props with defaults applied; absent required props are
    /// reported (when `warn` is set) and left out.
    fn resolve_props(
        &self,
        definition: &ComponentDefinition,
        props: &PropMap<PropValue>,
        warn: bool,
    ) -> Result<PropMap<PropValue>, RuntimeError> {
        let mut resolved = PropMap::new();
        for (field, decl) in definition.props() {
            if let Some(value) = props.get(field) {
                resolved.insert(field.clone(), value.clone());
            } else if let Some(default) = &decl.default {
                let value = PropValue::from_json(decl.ty, default).map_err(|reason| {
                    RuntimeError::InvalidDefault {
                        name: definition.name().to_string(),
                        field: field.clone(),
                        reason,
                    }
                })?;
                resolved.insert(field.clone(), value);
            } else if decl.required && warn {
                tracing::warn!(
                    "[fos-islands] Missing required prop: \"{}\" in `{}`",
                    field,
                    definition.name()
                );
            }
        }
        Ok(resolved)
    }

    fn render(
        &self,
        definition: &ComponentDefinition,
        props: &PropMap<PropValue>,
        context: &str,
        tree: &mut DomTree,
    ) -> Result<NodeId, RuntimeError> {
        if definition.template_source().trim().is_empty() {
            return Err(RuntimeError::EmptyTemplate {
                name: definition.name().to_string(),
            });
        }
        let markup = interpolate(definition, props)?;
        let nodes = self.parser.parse_fragment_in(&markup, context, tree);

        // Comments and indentation around the root do not count
        let (roots, extra): (Vec<NodeId>, Vec<NodeId>) = nodes.into_iter().partition(|&id| {
            tree.get(id).is_some_and(|n| {
                !n.is_comment() && n.as_text().is_none_or(|t| !t.trim().is_empty())
            })
        });
        for id in extra {
            let _ = tree.drop_subtree(id);
        }

        match roots.as_slice() {
            [root] if tree.element(*root).is_some() => Ok(*root),
            _ => {
                let found = roots.len();
                for id in roots {
                    let _ = tree.drop_subtree(id);
                }
                Err(RuntimeError::RootCount {
                    name: definition.name().to_string(),
                    found,
                })
            }
        }
    }
}

impl ComponentRuntime for TemplateRuntime {
    fn check(&self, definition: &ComponentDefinition) -> Result<(), RuntimeError> {
        let defaults = self.resolve_props(definition, &PropMap::new(), false)?;
        let mut scratch = DomTree::new();
        // `template` accepts any root, rows and cells included
        self.render(definition, &defaults, "template", &mut scratch).map(|_| ())
    }

    fn instantiate(
        &mut self,
        definition: &ComponentDefinition,
        props: &PropMap<PropValue>,
        context: &str,
        tree: &mut DomTree,
    ) -> Result<ComponentInstance, RuntimeError> {
        let props = self.resolve_props(definition, props, true)?;
        let root = self.render(definition, &props, context, tree)?;

        self.instances += 1;
        Ok(ComponentInstance {
            id: InstanceId(self.instances),
            root,
            props,
        })
    }
}

/// Replace every `{{ field }}` with the escaped prop value (empty if absent)
fn interpolate(definition: &ComponentDefinition, props: &PropMap<PropValue>) -> Result<String, RuntimeError> {
    let template = definition.template_source();
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            return Err(RuntimeError::UnclosedInterpolation {
                name: definition.name().to_string(),
                offset: offset + start,
            });
        };
        if let Some(value) = props.get(after[..end].trim()) {
            escape_into(&value.to_string(), &mut out);
        }
        let consumed = start + 2 + end + 2;
        offset += consumed;
        rest = &rest[consumed..];
    }
    out.push_str(rest);
    Ok(out)
}

fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{PropDecl, PropType};

    fn hello_world() -> ComponentDefinition {
        ComponentDefinition::new("HelloWorld")
            .prop("firstName", PropDecl::new(PropType::String).required())
            .prop("lastName", PropDecl::new(PropType::String).required())
            .template(
                r#"<span class="test" id="example-hello"><h3>[HelloWorld]</h3><span>Hello, <b>{{ firstName }} {{lastName}}</b>!</span></span>"#,
            )
    }

    fn props(pairs: &[(&str, PropValue)]) -> PropMap<PropValue> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_instantiate_renders_detached_root() {
        let mut runtime = TemplateRuntime::new();
        let mut tree = DomTree::new();
        let instance = runtime.instantiate(
            &hello_world(),
            &props(&[
                ("firstName", PropValue::String("Jacky".into())),
                ("lastName", PropValue::String("Chan".into())),
            ]),
            "div",
            &mut tree,
        ).unwrap();

        assert!(tree.parent(instance.root).is_none());
        assert_eq!(tree.element_id(instance.root), Some("example-hello"));
        assert!(tree.text_content(instance.root).contains("Hello, Jacky Chan!"));
        assert_eq!(instance.id, InstanceId(1));
    }

    #[test]
    fn test_defaults_apply() {
        let counter = ComponentDefinition::new("HelloCounter")
            .prop("nb", PropDecl::new(PropType::Number).with_default(serde_json::json!(0)))
            .template("<div>Counter: <b>{{ nb }}</b></div>");
        let mut runtime = TemplateRuntime::new();
        let mut tree = DomTree::new();

        let instance = runtime.instantiate(&counter, &PropMap::new(), "body", &mut tree).unwrap();
        assert_eq!(instance.props["nb"], PropValue::Number(0.0));
        assert_eq!(tree.text_content(instance.root), "Counter: 0");
    }

    #[test]
    fn test_values_are_escaped() {
        let def = ComponentDefinition::new("Echo")
            .prop("text", PropDecl::new(PropType::String))
            .template("<p title=\"{{ text }}\">{{ text }}</p>");
        let mut runtime = TemplateRuntime::new();
        let mut tree = DomTree::new();

        let instance = runtime.instantiate(
            &def,
            &props(&[("text", PropValue::String("<b>\"hi\"</b>".into()))]),
            "body",
            &mut tree,
        ).unwrap();
        assert_eq!(tree.get_attribute(instance.root, "title"), Some("<b>\"hi\"</b>"));
        assert!(tree.element_children(instance.root).is_empty());
    }

    #[test]
    fn test_check_rejects_bad_templates() {
        let runtime = TemplateRuntime::new();

        let empty = ComponentDefinition::new("Empty");
        assert!(matches!(runtime.check(&empty), Err(RuntimeError::EmptyTemplate { .. })));

        let two_roots = ComponentDefinition::new("Two").template("<p>a</p><p>b</p>");
        assert!(matches!(
            runtime.check(&two_roots),
            Err(RuntimeError::RootCount { found: 2, .. })
        ));

        let text_root = ComponentDefinition::new("Text").template("just text");
        assert!(matches!(runtime.check(&text_root), Err(RuntimeError::RootCount { found: 1, .. })));

        let unclosed = ComponentDefinition::new("Open").template("<p>{{ a </p>");
        assert!(matches!(
            runtime.check(&unclosed),
            Err(RuntimeError::UnclosedInterpolation { offset: 3, .. })
        ));

        let bad_default = ComponentDefinition::new("Bad")
            .prop("nb", PropDecl::new(PropType::Number).with_default(serde_json::json!("x")))
            .template("<p></p>");
        assert!(matches!(runtime.check(&bad_default), Err(RuntimeError::InvalidDefault { .. })));

        assert!(runtime.check(&hello_world()).is_ok());
    }

    #[test]
    fn test_comments_around_root_are_ignored() {
        let def = ComponentDefinition::new("C").template("<!-- c --><div>x</div>");
        assert!(TemplateRuntime::new().check(&def).is_ok());
    }

    #[test]
    fn test_whitespace_between_elements_renders() {
        let def = ComponentDefinition::new("Name")
            .prop("firstName", PropDecl::new(PropType::String))
            .prop("lastName", PropDecl::new(PropType::String))
            .template("\n  <span><b>{{ firstName }}</b> <b>{{ lastName }}</b></span>\n");
        let mut runtime = TemplateRuntime::new();
        let mut tree = DomTree::new();

        let instance = runtime.instantiate(
            &def,
            &props(&[
                ("firstName", PropValue::String("Jacky".into())),
                ("lastName", PropValue::String("Chan".into())),
            ]),
            "body",
            &mut tree,
        ).unwrap();
        assert_eq!(tree.text_content(instance.root), "Jacky Chan");
        // the indentation around the root is not left behind
        assert_eq!(tree.len(), 7);
    }

    #[test]
    fn test_row_template_renders_in_table_context() {
        let row = ComponentDefinition::new("Row")
            .prop("x", PropDecl::new(PropType::Number))
            .template("<tr><td>{{ x }}</td></tr>");
        let mut runtime = TemplateRuntime::new();
        let mut tree = DomTree::new();
        assert!(runtime.check(&row).is_ok());

        let instance = runtime
            .instantiate(&row, &props(&[("x", PropValue::Number(1.0))]), "tbody", &mut tree)
            .unwrap();
        assert_eq!(tree.outer_html(instance.root), "<tr><td>1</td></tr>");

        // outside a table the row collapses and nothing is left in the arena
        let before = tree.len();
        assert!(matches!(
            runtime.instantiate(&row, &PropMap::new(), "div", &mut tree),
            Err(RuntimeError::RootCount { found: 0, .. })
        ));
        assert_eq!(tree.len(), before);
    }
}
