//! Comprehensive tests for fos-html
//!
//! Whole pages and component templates as the island binder sees them.

use fos_html::{DomTree, HtmlParser};

#[test]
fn test_parse_minimal_html() {
    let doc = HtmlParser::new().parse("");
    assert!(doc.body().is_valid());
    assert!(doc.head().is_valid());
    assert_eq!(doc.tree().tag_name(doc.document_element()), Some("html"));
}

#[test]
fn test_parse_text_only() {
    let doc = HtmlParser::new().parse("Hello World");
    assert_eq!(doc.tree().text_content(doc.body()), "Hello World");
}

#[test]
fn test_parse_void_elements() {
    let html = r#"<br><hr><img src="test.png"><input type="text">"#;
    let doc = HtmlParser::new().parse(html);
    assert_eq!(
        doc.tree().inner_html(doc.body()),
        r#"<br /><hr /><img src="test.png" /><input type="text" />"#
    );
}

#[test]
fn test_parse_page_with_hosts() {
    let html = r#"
        <html>
            <head>
                <title>Islands</title>
                <meta charset="utf-8">
            </head>
            <body>
                <div id="container">
                    <h1>Welcome</h1>
                    <div data-v-comp="HelloWorld" data-v:first-name="Jacky" data-v:last-name="Chan"></div>
                    <ul>
                        <li data-v-comp="HelloCounter" data-v:nb="1"></li>
                        <li data-v-comp="HelloCounter" data-v:nb="2"></li>
                    </ul>
                </div>
            </body>
        </html>
    "#;

    let doc = HtmlParser::new().parse(html);
    assert_eq!(doc.title(), "Islands");

    let hosts = doc.query_attribute_all("data-v-comp");
    let names: Vec<_> = hosts.iter()
        .map(|&h| doc.tree().get_attribute(h, "data-v-comp").unwrap())
        .collect();
    assert_eq!(names, ["HelloWorld", "HelloCounter", "HelloCounter"]);
    assert_eq!(doc.tree().get_attribute(hosts[2], "data-v:nb"), Some("2"));
}

#[test]
fn test_parse_malformed_html() {
    let html = r#"
        <div>
            <p>Unclosed paragraph
            <span>Unclosed span
        </div>
        <p>Another paragraph without closing
    "#;

    let doc = HtmlParser::new().parse(html);
    let body_children = doc.tree().element_children(doc.body());
    assert_eq!(body_children.len(), 2);
    assert_eq!(doc.tree().tag_name(body_children[1]), Some("p"));
}

#[test]
fn test_parse_script_and_style_are_raw() {
    let html = r#"<html><head><script>if (a < b) { x = "<div>"; }</script></head><body></body></html>"#;

    let doc = HtmlParser::new().parse(html);
    let script = doc.tree().element_children(doc.head())[0];
    assert!(doc.tree().element_children(script).is_empty());
    assert_eq!(doc.tree().text_content(script), r#"if (a < b) { x = "<div>"; }"#);
    assert_eq!(
        doc.tree().outer_html(script),
        r#"<script>if (a < b) { x = "<div>"; }</script>"#
    );
}

#[test]
fn test_parse_entities() {
    let html = r#"<p title="&quot;q&quot;">&lt;tag&gt; &amp; &#169;</p>"#;
    let doc = HtmlParser::new().parse(html);
    let p = doc.tree().element_children(doc.body())[0];

    assert_eq!(doc.tree().get_attribute(p, "title"), Some("\"q\""));
    assert_eq!(doc.tree().text_content(p), "<tag> & \u{a9}");
    assert_eq!(doc.tree().inner_html(p), "&lt;tag&gt; &amp; \u{a9}");
}

#[test]
fn test_parse_unicode() {
    let html = "<p data-v:name=\"\u{4e16}\u{754c}\">\u{d1}o\u{f1}o \u{1f680}</p>";
    let doc = HtmlParser::new().parse(html);
    let p = doc.tree().element_children(doc.body())[0];

    assert_eq!(doc.tree().get_attribute(p, "data-v:name"), Some("\u{4e16}\u{754c}"));
    assert_eq!(doc.tree().text_content(p), "\u{d1}o\u{f1}o \u{1f680}");
}

#[test]
fn test_parse_comments_are_kept() {
    let html = "<div><!-- marker --><p>Content</p></div>";
    let doc = HtmlParser::new().parse(html);
    assert_eq!(
        doc.tree().inner_html(doc.body()),
        "<div><!-- marker --><p>Content</p></div>"
    );
}

#[test]
fn test_parse_large_document() {
    let mut html = String::from("<html><body>");
    for i in 0..1000 {
        html.push_str(&format!(
            r#"<div id="div-{}" data-v-comp="HelloCounter" data-v:nb="{}"></div>"#,
            i, i
        ));
    }
    html.push_str("</body></html>");

    let doc = HtmlParser::new().parse(&html);
    let hosts = doc.query_attribute_all("data-v-comp");

    assert_eq!(hosts.len(), 1000);
    assert_eq!(doc.get_element_by_id("div-999"), Some(hosts[999]));
}

#[test]
fn test_fragment_template_roots() {
    let mut tree = DomTree::new();
    let nodes = HtmlParser::new().parse_fragment(
        r#"<span class="test" id="example-hello"><h3>[HelloWorld]</h3><span>Hello, <b>Jacky Chan</b>!</span></span>"#,
        &mut tree,
    );

    assert_eq!(nodes.len(), 1);
    let root = nodes[0];
    assert!(tree.parent(root).is_none());
    assert_eq!(tree.element_id(root), Some("example-hello"));
    assert_eq!(tree.text_content(root), "[HelloWorld]Hello, Jacky Chan!");
}

#[test]
fn test_fragment_table_row_context() {
    let parser = HtmlParser::new();
    let mut tree = DomTree::new();

    // A row template parsed where the row will live keeps its markup
    let nodes = parser.parse_fragment_in("<tr><td>{{ x }}</td></tr>", "tbody", &mut tree);
    assert_eq!(nodes.len(), 1);
    assert_eq!(tree.tag_name(nodes[0]), Some("tr"));
    assert_eq!(tree.text_content(nodes[0]), "{{ x }}");

    let cells = parser.parse_fragment_in("<td>a</td><td>b</td>", "tr", &mut tree);
    assert_eq!(cells.len(), 2);
    assert!(cells.iter().all(|&c| tree.tag_name(c) == Some("td")));

    // In body context the same markup collapses to its text
    let nodes = parser.parse_fragment("<tr><td>Cell</td></tr>", &mut tree);
    assert_eq!(nodes.len(), 1);
    assert!(tree.get(nodes[0]).unwrap().is_text());
}

#[test]
fn test_parse_forms() {
    let html = r#"
        <form action="/submit" method="post">
            <input type="text" id="name" name="name" required>
            <select name="country">
                <option value="us">USA</option>
                <option value="uk" selected>UK</option>
            </select>
            <button type="submit">Submit</button>
        </form>
    "#;

    let doc = HtmlParser::new().parse(html);
    let input = doc.get_element_by_id("name").unwrap();
    assert!(doc.tree().has_attribute(input, "required"));
    assert_eq!(doc.tree().get_attribute(input, "required"), Some(""));
    assert_eq!(doc.tree().outer_html(input), r#"<input type="text" id="name" name="name" required />"#);
}
