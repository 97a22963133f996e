//! Integration tests for the editor crate: load, edit, render, save.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use trellis_editor::{
    Document, DropPosition, EditField, EditKey, PendingEdit, PendingEdits, VirtualDomDocument,
};
use trellis_evaluator::{ComponentCache, ComponentResolver, Environment, VNode};
use trellis_tree::{AnimationConfig, AnimationKind, AnimationTrigger, ROOT_ID};

const PAGE: &str = r#"import { Button } from "@/components/ui";
import * as Icons from "lucide-react";

<section className="hero">
  <h1>Launch</h1>
  <Button variant="primary">Start</Button>
  <Icons.Star size={20} />
</section>
"#;

fn resolver() -> ComponentResolver {
    ComponentResolver::with_cache(Environment::standard(), Arc::new(ComponentCache::new()))
}

fn section_id(doc: &Document) -> String {
    doc.tree().unwrap().root().children[0].id.clone()
}

fn child_id(doc: &Document, index: usize) -> String {
    doc.tree().unwrap().root().children[0].children[index].id.clone()
}

fn count(vdom: &VirtualDomDocument, pred: fn(&VNode) -> bool) -> usize {
    vdom.count(pred)
}

#[test]
fn test_document_lifecycle() {
    let saved = Rc::new(RefCell::new(None));
    let sink = saved.clone();
    let mut doc = Document::load(PAGE).on_save(move |text| *sink.borrow_mut() = Some(text.to_string()));

    assert!(doc.is_structured());
    assert_eq!(doc.version, 0);

    // Untouched documents save byte-for-byte
    assert_eq!(doc.save(), PAGE);
    assert_eq!(saved.borrow().as_deref(), Some(PAGE));
}

#[test]
fn test_render_then_resolve_fallback() {
    let mut doc = Document::load(PAGE);
    let resolver = resolver();

    let first = doc.render(&resolver);
    assert_eq!(count(&first, |n| matches!(n, VNode::Loading { .. })), 1);
    assert_eq!(doc.pending_compiles(), 1);

    let report = doc.run_idle(&resolver, Duration::from_secs(5));
    assert_eq!(report.ready().len(), 1);

    let second = doc.render(&resolver);
    assert_eq!(count(&second, |n| matches!(n, VNode::Loading { .. })), 0);
    let icon_id = child_id(&doc, 2);
    assert!(second.find_by_node_id(&icon_id).is_some());
}

#[test]
fn test_pending_edits_commit_after_quiescence() {
    let mut doc = Document::load(PAGE);
    let heading = child_id(&doc, 0);
    let mut edits = PendingEdits::default();
    let start = Instant::now();

    let key = EditKey::new(heading.clone(), EditField::Text);
    for (i, draft) in ["L", "La", "Lau", "Launch now"].iter().enumerate() {
        edits.stage(key.clone(), *draft, start + Duration::from_millis(50 * i as u64));
    }
    assert!(edits.due(start + Duration::from_millis(200)).is_empty());
    assert_eq!(doc.tree().unwrap().find(&heading).unwrap().text_content.as_deref(), Some("Launch"));

    let ready = edits.due(start + Duration::from_millis(500));
    assert_eq!(doc.commit_edits(ready).unwrap(), 1);
    assert!(doc.save().contains("<h1>Launch now</h1>"));
}

#[test]
fn test_blur_flushes_immediately() {
    let mut doc = Document::load(PAGE);
    let section = section_id(&doc);
    let mut edits = PendingEdits::default();
    let key = EditKey::new(section.clone(), EditField::Style("paddingTop".to_string()));

    edits.stage(key.clone(), "24px", Instant::now());
    let flushed = edits.flush_field(&key).into_iter().collect();
    doc.commit_edits(flushed).unwrap();

    let node = doc.tree().unwrap().find(&section).unwrap();
    assert_eq!(node.style["paddingTop"], "24px");
}

#[test]
fn test_structural_edits_then_undo_all() {
    let mut doc = Document::load(PAGE);
    let section = section_id(&doc);
    let button = child_id(&doc, 1);

    doc.add_element(&section, "p", Some(1), None, None).unwrap();
    doc.move_element(&button, &section, DropPosition::After).unwrap();
    doc.duplicate_element(&button).unwrap();
    assert_eq!(doc.tree().unwrap().root().children.len(), 3);

    while doc.undo().unwrap() {}
    assert_eq!(doc.save(), PAGE);
}

#[test]
fn test_opaque_document_renders_raw_text() {
    let broken = "<div className=\"x\"><span></div>";
    let mut doc = Document::load(broken);
    assert!(!doc.is_structured());
    assert!(!doc.on_element_click(ROOT_ID));
    assert!(doc.ancestor_path(ROOT_ID).is_empty());

    let vdom = doc.render(&resolver());
    assert_eq!(vdom.nodes, vec![VNode::text(broken)]);
    assert_eq!(doc.save(), broken);
}

#[test]
fn test_reload_drops_stale_selection() {
    let mut doc = Document::load(PAGE);
    let heading = child_id(&doc, 0);
    assert!(doc.on_element_click(&heading));

    doc.reload("<main></main>");
    assert_eq!(doc.selected(), None);
    assert!(!doc.history().can_undo());
}

#[test]
fn test_animation_replay_changes_remount_key() {
    let mut doc = Document::load(PAGE);
    let heading = child_id(&doc, 0);

    let mut node = doc.tree().unwrap().find(&heading).unwrap().clone();
    let mut config = AnimationConfig::new(AnimationKind::Fade, AnimationTrigger::Load);
    config.enable();
    node.animations = Some(config);
    doc.update_element(node).unwrap();

    assert_eq!(doc.replay_animation(&heading), Some(1));
    let vdom = doc.render(&resolver());
    match vdom.find_by_node_id(&heading) {
        Some(VNode::Element { animation, remount_key, .. }) => {
            assert!(animation.is_some());
            assert_eq!(*remount_key, 1);
        }
        other => panic!("unexpected {:?}", other),
    }

    // The animation survives a save and reparse
    let saved = doc.save();
    let reparsed = Document::load(saved);
    let h1 = &reparsed.tree().unwrap().root().children[0].children[0];
    assert!(h1.animations.as_ref().map(|a| a.enabled).unwrap_or(false));
}

#[test]
fn test_class_edit_over_expression_class_name() {
    let mut doc = Document::load(r#"<div className={cn("a", b)}>x</div>"#);
    let div = doc.tree().unwrap().root().children[0].id.clone();

    let edit = PendingEdit {
        key: EditKey::new(div.clone(), EditField::ClassName),
        value: "p-8".to_string(),
    };
    assert_eq!(doc.commit_edits(vec![edit]).unwrap(), 1);
    assert!(doc.tree().unwrap().find(&div).unwrap().attributes.is_empty());

    let saved = doc.save();
    assert_eq!(saved, r#"<div className="p-8">x</div>"#);
    let reparsed = Document::load(saved);
    assert_eq!(reparsed.tree().unwrap().root().children[0].class_name, "p-8");
}

#[test]
fn test_style_edit_over_style_expression() {
    let mut doc = Document::load("<div style={styles.card}>x</div>");
    let div = doc.tree().unwrap().root().children[0].id.clone();

    let edit = PendingEdit {
        key: EditKey::new(div, EditField::Style("color".to_string())),
        value: "red".to_string(),
    };
    doc.commit_edits(vec![edit]).unwrap();
    assert_eq!(doc.save(), r#"<div style={{ color: "red" }}>x</div>"#);
}
