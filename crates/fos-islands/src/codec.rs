//! Attribute codec
//!
//! Maps prefixed element attributes to component field names and back.
//! `data-v:first-name` carries the field `firstName` when the prop prefix is
//! `data-v:`.
//!
//! An attribute is managed when its name *contains* the prefix anywhere,
//! and the field name is whatever follows the first occurrence.

use fos_dom::{DomTree, NodeId};

use crate::schema::PropMap;

/// Raw props of `element`: camel-case field name -> attribute value.
///
/// An empty prefix matches nothing.
pub fn extract_managed_attributes(prop_prefix: &str, tree: &DomTree, element: NodeId) -> PropMap<String> {
    tree.attributes(element)
        .iter()
        .filter_map(|attr| {
            let key = raw_key(prop_prefix, &attr.name)?;
            Some((to_camel_case(key), attr.value.clone()))
        })
        .collect()
}

/// Managed attributes of `element`, verbatim name/value pairs in order
pub fn managed_attributes(prop_prefix: &str, tree: &DomTree, element: NodeId) -> Vec<(String, String)> {
    tree.attributes(element)
        .iter()
        .filter(|attr| raw_key(prop_prefix, &attr.name).is_some())
        .map(|attr| (attr.name.clone(), attr.value.clone()))
        .collect()
}

/// The part of `attribute` after the first occurrence of `prop_prefix`
pub fn raw_key<'a>(prop_prefix: &str, attribute: &'a str) -> Option<&'a str> {
    if prop_prefix.is_empty() {
        return None;
    }
    let start = attribute.find(prop_prefix)?;
    Some(&attribute[start + prop_prefix.len()..])
}

/// Attribute name carrying `field`, e.g. `firstName` -> `data-v:first-name`
pub fn field_to_attribute(prop_prefix: &str, field: &str) -> String {
    format!("{}{}", prop_prefix, to_kebab_case(field))
}

/// Convert kebab-case to camelCase.
///
/// A hyphen followed by an ASCII letter is dropped and the letter
/// upper-cased. Every other character is kept as written.
pub fn to_camel_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match chars.peek() {
            Some(next) if c == '-' && next.is_ascii_alphabetic() => {
                result.push(next.to_ascii_uppercase());
                chars.next();
            }
            _ => result.push(c),
        }
    }

    result
}

/// Convert camelCase to kebab-case
pub fn to_kebab_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);

    for c in s.chars() {
        if c.is_ascii_uppercase() {
            result.push('-');
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }

    result
}
