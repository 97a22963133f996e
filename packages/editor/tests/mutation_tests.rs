//! Mutation scenarios against parsed markup, checked both on the tree and
//! on the regenerated source.

use trellis_editor::{DispatchOutcome, Document, DropPosition, DropZones, ElementTree};
use trellis_parser::parse;
use trellis_tree::ROOT_ID;

const SCENARIO: &str = r#"<div className="card">
  <p>Two</p>
</div>
<div>Three</div>"#;

/// (div1, p2, div3)
fn scenario_ids(tree: &ElementTree) -> (String, String, String) {
    let root = tree.root();
    (
        root.children[0].id.clone(),
        root.children[0].children[0].id.clone(),
        root.children[1].id.clone(),
    )
}

fn types(tree: &ElementTree, id: &str) -> Vec<String> {
    tree.find(id)
        .map(|node| node.children.iter().map(|c| c.node_type.clone()).collect())
        .unwrap_or_default()
}

#[test]
fn test_move_after_promotes_to_root_level() {
    let mut doc = Document::load(SCENARIO);
    let (div1, p2, div3) = scenario_ids(doc.tree().unwrap());

    let outcome = doc.move_element(&p2, &div3, DropPosition::After).unwrap();
    assert!(outcome.is_applied());

    let tree = doc.tree().unwrap();
    let top: Vec<&str> = tree.root().children.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(top, vec![div1.as_str(), div3.as_str(), p2.as_str()]);
    assert!(tree.find(&div1).unwrap().children.is_empty());

    // The regenerated source has the same shape
    let reparsed = parse(&doc.save()).unwrap();
    assert_eq!(types(&reparsed.tree, ROOT_ID), vec!["div", "div", "p"]);
    let first = &reparsed.tree.root().children[0];
    assert!(first.children.is_empty());
    assert_eq!(first.class_name, "card");
    assert_eq!(reparsed.tree.root().children[2].text_content.as_deref(), Some("Two"));
}

#[test]
fn test_delete_root_is_noop() {
    let mut doc = Document::load(SCENARIO);
    let before = doc.tree().unwrap().clone();

    let outcome = doc.delete_element(ROOT_ID).unwrap();
    assert!(matches!(outcome, DispatchOutcome::Rejected(_)));
    assert_eq!(doc.tree().unwrap(), &before);
    assert_eq!(doc.save(), SCENARIO);
}

#[test]
fn test_move_into_own_descendant_is_rejected() {
    let mut doc = Document::load(SCENARIO);
    let (div1, p2, _) = scenario_ids(doc.tree().unwrap());
    let before = doc.tree().unwrap().clone();

    let outcome = doc.move_element(&div1, &p2, DropPosition::Inside).unwrap();
    assert!(matches!(outcome, DispatchOutcome::Rejected(_)));
    assert_eq!(doc.tree().unwrap(), &before);
}

#[test]
fn test_unknown_ids_are_noops() {
    let mut doc = Document::load(SCENARIO);
    let before = doc.tree().unwrap().clone();

    for outcome in [
        doc.delete_element("stale").unwrap(),
        doc.duplicate_element("stale").unwrap(),
        doc.add_element("stale", "p", None, None, None).unwrap(),
        doc.move_element("stale", ROOT_ID, DropPosition::Root).unwrap(),
    ] {
        assert!(!outcome.is_applied());
    }
    assert_eq!(doc.tree().unwrap(), &before);
}

#[test]
fn test_duplicate_regenerates_both_copies() {
    let mut doc = Document::load(SCENARIO);
    let (div1, _, _) = scenario_ids(doc.tree().unwrap());

    doc.duplicate_element(&div1).unwrap();
    let reparsed = parse(&doc.save()).unwrap();
    let top = &reparsed.tree.root().children;
    assert_eq!(top.len(), 3);
    assert_eq!(top[0].class_name, "card");
    assert_eq!(top[1].class_name, "card");
    assert_eq!(top[1].children[0].text_content.as_deref(), Some("Two"));
}

#[test]
fn test_added_heading_is_printed_with_defaults() {
    let mut doc = Document::load(SCENARIO);
    let (_, _, div3) = scenario_ids(doc.tree().unwrap());

    doc.add_element(&div3, "h2", None, None, None).unwrap();
    let saved = doc.save();
    assert!(saved.contains("Heading 2"));

    let reparsed = parse(&saved).unwrap();
    let div = &reparsed.tree.root().children[1];
    assert!(div.children.iter().any(|c| c.node_type == "h2"));
}

#[test]
fn test_added_component_gets_import() {
    let mut doc = Document::load(SCENARIO);
    doc.add_element(ROOT_ID, "Star", None, None, None).unwrap();

    let saved = doc.save();
    assert!(saved.contains(r#"import { Star } from "lucide-react";"#));
    let reparsed = parse(&saved).unwrap();
    let star = reparsed.tree.root().children.last().unwrap();
    assert_eq!(
        star.component_info.as_ref().map(|i| i.package_name.as_str()),
        Some("lucide-react")
    );
}

#[test]
fn test_drop_inference_drives_move() {
    let mut doc = Document::load(SCENARIO);
    let (_, p2, div3) = scenario_ids(doc.tree().unwrap());
    let zones = DropZones::default();

    // Pointer in the top quarter of div3's box
    let position = zones.infer(120.0, 10.0, 300.0, 100.0);
    assert_eq!(position, DropPosition::Before);
    doc.move_element(&p2, &div3, position).unwrap();

    let tree = doc.tree().unwrap();
    assert_eq!(tree.index_in_parent(&p2), Some(1));
    assert_eq!(tree.index_in_parent(&div3), Some(2));
}

#[test]
fn test_edits_kept_through_patched_save() {
    let mut doc = Document::load(SCENARIO);
    let (div1, _, _) = scenario_ids(doc.tree().unwrap());

    let mut node = doc.tree().unwrap().find(&div1).unwrap().clone();
    node.class_name = "card shadow".to_string();
    node.style.insert("opacity".to_string(), "0.5".to_string());
    doc.update_element(node).unwrap();

    let saved = doc.save();
    assert!(saved.contains("<p>Two</p>"));
    assert!(saved.ends_with("<div>Three</div>"));

    let reparsed = parse(&saved).unwrap();
    let div = &reparsed.tree.root().children[0];
    assert_eq!(div.class_name, "card shadow");
    assert_eq!(div.style["opacity"], "0.5");
}
