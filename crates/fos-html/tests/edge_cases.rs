//! Edge case tests for fos-html
//!
//! Malformed markup, attribute spellings used by island hosts, fragments.

use fos_html::{DomTree, HtmlParser};

// ============================================================================
// EMPTY AND MINIMAL INPUT
// ============================================================================

#[test]
fn test_parse_only_whitespace() {
    let doc = HtmlParser::new().parse("   \t\n\r\n   ");
    // html5ever always synthesizes html/head/body
    assert!(doc.body().is_valid());
    assert_eq!(doc.tree().inner_html(doc.body()), "");
}

#[test]
fn test_parse_only_doctype() {
    let doc = HtmlParser::new().parse("<!DOCTYPE html>");
    let first = doc.tree().first_child(doc.tree().root()).unwrap();
    assert_eq!(doc.tree().outer_html(first), "<!DOCTYPE html>");
}

#[test]
fn test_empty_fragment() {
    let mut tree = DomTree::new();
    assert!(HtmlParser::new().parse_fragment("", &mut tree).is_empty());
}

// ============================================================================
// MALFORMED HTML
// ============================================================================

#[test]
fn test_parse_unclosed_tags() {
    let doc = HtmlParser::new().parse("<div><p><span>text");
    assert_eq!(
        doc.tree().inner_html(doc.body()),
        "<div><p><span>text</span></p></div>"
    );
}

#[test]
fn test_fragment_text_root_survives() {
    let mut tree = DomTree::new();
    let nodes = HtmlParser::new().parse_fragment("hello <b>world</b>", &mut tree);
    assert_eq!(nodes.len(), 2);
    assert!(tree.get(nodes[0]).unwrap().is_text());
}

#[test]
fn test_whitespace_between_elements_is_kept() {
    let mut tree = DomTree::new();
    let nodes = HtmlParser::new().parse_fragment(
        "<span><b>{{ firstName }}</b> <b>{{ lastName }}</b></span>",
        &mut tree,
    );
    assert_eq!(tree.text_content(nodes[0]), "{{ firstName }} {{ lastName }}");

    let doc = HtmlParser::new().parse("<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>");
    let ul = doc.tree().element_children(doc.body())[0];
    assert_eq!(doc.tree().child_ids(ul).len(), 5);
    assert_eq!(doc.tree().element_children(ul).len(), 2);
}

// ============================================================================
// ATTRIBUTES
// ============================================================================

#[test]
fn test_attribute_names_are_lowercased() {
    let doc = HtmlParser::new().parse(r#"<div DATA-V-COMP="HelloWorld" Data-V:First-Name="Ann"></div>"#);
    let hosts = doc.query_attribute_all("data-v-comp");
    assert_eq!(hosts.len(), 1);
    // values keep their case
    assert_eq!(doc.tree().get_attribute(hosts[0], "data-v-comp"), Some("HelloWorld"));
    assert_eq!(doc.tree().get_attribute(hosts[0], "data-v:first-name"), Some("Ann"));
}

#[test]
fn test_json_attribute_value_roundtrips() {
    let doc = HtmlParser::new().parse(r#"<div data-v:items='[1, {"a": "b"}]'></div>"#);
    let div = doc.query_attribute_all("data-v:items")[0];
    assert_eq!(doc.tree().get_attribute(div, "data-v:items"), Some(r#"[1, {"a": "b"}]"#));
}

#[test]
fn test_empty_attribute_value() {
    let doc = HtmlParser::new().parse("<div data-v-comp></div>");
    let div = doc.query_attribute_all("data-v-comp")[0];
    assert_eq!(doc.tree().get_attribute(div, "data-v-comp"), Some(""));
}

#[test]
fn test_hosts_in_document_order() {
    let doc = HtmlParser::new().parse(
        r#"<section data-v-comp="A"><div data-v-comp="B"></div></section><p data-v-comp="C"></p>"#,
    );
    let names: Vec<_> = doc.query_attribute_all("data-v-comp")
        .into_iter()
        .filter_map(|id| doc.tree().get_attribute(id, "data-v-comp"))
        .collect();
    assert_eq!(names, ["A", "B", "C"]);
}

#[test]
fn test_many_siblings() {
    let html: String = (0..500).map(|i| format!("<p id=\"p{i}\">{i}</p>")).collect();
    let doc = HtmlParser::new().parse(&html);
    assert_eq!(doc.tree().element_children(doc.body()).len(), 500);
    assert!(doc.get_element_by_id("p499").is_some());
}
