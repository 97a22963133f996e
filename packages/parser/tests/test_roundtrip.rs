use trellis_parser::{parse, print, regenerate};
use trellis_tree::{ComponentInfo, ElementNode};

fn assert_roundtrip(source: &str) {
    let doc = parse(source).unwrap_or_else(|e| panic!("parse failed: {}", e));
    assert_eq!(regenerate(&doc.tree, source), source);
}

#[test]
fn test_single_element_with_text() {
    assert_roundtrip("<h1>Hello world</h1>");
}

#[test]
fn test_three_level_nesting() {
    assert_roundtrip(
        r#"<div className="outer">
  <section>
    <p>Deep text</p>
  </section>
</div>
"#,
    );
}

#[test]
fn test_class_style_and_attributes_together() {
    assert_roundtrip(
        r#"<a className="link  underline" style={{ color: "blue", fontSize: 14 }} href="/docs" target="_blank" data-id={42}>Docs</a>"#,
    );
}

#[test]
fn test_full_page_with_imports_and_comments() {
    assert_roundtrip(
        r#"import { Card, CardHeader } from "@/components/ui/card";
import * as Icons from "lucide-react";

// Landing hero
<Card className="p-4">
  <CardHeader>
    <Icons.Star size={16} />   Featured
  </CardHeader>
  {items.map((item) => <p key={item.id}>{item.name}</p>)}
</Card>

<footer>done</footer>
"#,
    );
}

#[test]
fn test_regenerated_edit_reparses_to_same_tree_shape() {
    let source = "<ul>\n  <li>One</li>\n  <li>Two</li>\n</ul>";
    let mut doc = parse(source).unwrap();
    let second = doc.tree.root().children[0].children[1].id.clone();
    doc.tree.find_mut(&second).unwrap().text_content = Some("Zwei".to_string());

    let output = regenerate(&doc.tree, source);
    assert_eq!(output, "<ul>\n  <li>One</li>\n  <li>Zwei</li>\n</ul>");

    let reparsed = parse(&output).unwrap();
    assert_eq!(reparsed.tree.count_nodes(), doc.tree.count_nodes());
}

#[test]
fn test_moved_node_is_reprinted() {
    let source = "<div>\n  <p>a</p>\n</div>\n<aside>\n  <span>b</span>\n</aside>";
    let mut doc = parse(source).unwrap();

    doc.tree.edit(|root| {
        let mut moved = root.children[0].children.remove(0);
        moved.clear_origin();
        root.children[1].children.push(moved);
    });

    assert_eq!(
        regenerate(&doc.tree, source),
        "<div></div>\n<aside>\n  <span>b</span>\n  <p>a</p>\n</aside>"
    );
}

#[test]
fn test_new_component_gets_import() {
    let source = "import { Button } from \"@/ui\";\n\n<div>\n  <Button>Go</Button>\n</div>\n";
    let mut doc = parse(source).unwrap();
    let id = doc.tree.fresh_id();

    doc.tree.edit(|root| {
        root.children[0].children.push(
            ElementNode::new(id, "Badge")
                .with_text("New")
                .with_component(ComponentInfo::named("@/ui/badge", "Badge")),
        );
    });

    assert_eq!(
        regenerate(&doc.tree, source),
        "import { Button } from \"@/ui\";\nimport { Badge } from \"@/ui/badge\";\n\n<div>\n  <Button>Go</Button>\n  <Badge>New</Badge>\n</div>\n"
    );
}

#[test]
fn test_print_then_parse_preserves_fields() {
    let source = r#"<button className="btn" style={{ color: "red", padding: 8 }} disabled type="button">Save</button>"#;
    let doc = parse(source).unwrap();
    let printed = print(&doc.tree);
    let reparsed = parse(&printed).unwrap();

    let before = &doc.tree.root().children[0];
    let after = &reparsed.tree.root().children[0];
    assert_eq!(before.class_name, after.class_name);
    assert_eq!(before.style, after.style);
    assert_eq!(before.attributes, after.attributes);
    assert_eq!(before.text_content, after.text_content);
}

#[test]
fn test_class_edit_replaces_expression_class_name() {
    let source = r#"<div className={cn("a", b)}>x</div>"#;
    let mut doc = parse(source).unwrap();
    let id = doc.tree.root().children[0].id.clone();
    doc.tree.find_mut(&id).unwrap().class_name = "p-8".to_string();

    let output = regenerate(&doc.tree, source);
    assert_eq!(output, r#"<div className="p-8">x</div>"#);

    let reparsed = parse(&output).unwrap();
    let div = &reparsed.tree.root().children[0];
    assert_eq!(div.class_name, "p-8");
    assert!(div.attributes.is_empty());
}

#[test]
fn test_style_edit_replaces_style_expression() {
    let source = "<div style={styles.card}>x</div>";
    let mut doc = parse(source).unwrap();
    let id = doc.tree.root().children[0].id.clone();
    assert_eq!(doc.tree.root().children[0].attributes["style"], "{styles.card}");

    doc.tree
        .find_mut(&id)
        .unwrap()
        .style
        .insert("color".to_string(), "red".to_string());

    let output = regenerate(&doc.tree, source);
    assert_eq!(output, r#"<div style={{ color: "red" }}>x</div>"#);
    assert_eq!(output.matches("style=").count(), 1);
}

#[test]
fn test_numeric_looking_style_string_stays_quoted() {
    let source = r#"<div className="a" style={{ width: "100", zIndex: 2 }}>x</div>"#;
    assert_roundtrip(source);

    let mut doc = parse(source).unwrap();
    let id = doc.tree.root().children[0].id.clone();
    doc.tree.find_mut(&id).unwrap().class_name = "b".to_string();

    let output = regenerate(&doc.tree, source);
    assert_eq!(output, r#"<div className="b" style={{ width: "100", zIndex: 2 }}>x</div>"#);
}

#[test]
fn test_trailing_text_after_last_element_is_kept() {
    let source = "<main>\n  <p>Hi</p>\n</main>\n\nexport default Page;\n";
    assert_roundtrip(source);

    let mut doc = parse(source).unwrap();
    let p = doc.tree.root().children[0].children[0].id.clone();
    doc.tree.find_mut(&p).unwrap().text_content = Some("Bye".to_string());
    assert_eq!(
        regenerate(&doc.tree, source),
        "<main>\n  <p>Bye</p>\n</main>\n\nexport default Page;\n"
    );
}

#[test]
fn test_text_between_top_level_elements_is_rejected() {
    assert!(parse("<a></a>\nstray words\n<b></b>").is_err());
}
