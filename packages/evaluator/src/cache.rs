//! Process-wide memo of compiled component plans.
//!
//! Keyed by a SHA-256 digest of the node's identity and render-relevant
//! fields, so a changed node simply misses and compiles again. Entries are
//! never evicted.

use crate::compiler::{CompileError, RenderPlan};
use indexmap::IndexMap;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use trellis_tree::{ComponentInfo, ElementNode};

pub type CacheEntry = Result<Arc<RenderPlan>, CompileError>;

static GLOBAL_CACHE: OnceLock<Arc<ComponentCache>> = OnceLock::new();

#[derive(Debug, Default)]
pub struct ComponentCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ComponentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by every resolver in the process
    pub fn global() -> Arc<ComponentCache> {
        GLOBAL_CACHE
            .get_or_init(|| Arc::new(ComponentCache::new()))
            .clone()
    }

    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        self.lock().get(key).cloned()
    }

    pub fn insert(&self, key: String, entry: CacheEntry) {
        self.lock().insert(key, entry);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    // Entries are inserted whole, so a poisoned map is still consistent
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyFields<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    node_type: &'a str,
    class_name: &'a str,
    style: &'a IndexMap<String, String>,
    attributes: &'a IndexMap<String, String>,
    component_info: &'a Option<ComponentInfo>,
    text_content: &'a Option<String>,
}

/// Hex SHA-256 of `(id, type, className, style, attributes, componentInfo, textContent)`
pub fn cache_key(node: &ElementNode) -> String {
    let fields = KeyFields {
        id: &node.id,
        node_type: &node.node_type,
        class_name: &node.class_name,
        style: &node.style,
        attributes: &node.attributes,
        component_info: &node.component_info,
        text_content: &node.text_content,
    };
    // Serializing borrowed strings and maps cannot fail
    let bytes = serde_json::to_vec(&fields).unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::PlanNode;

    #[test]
    fn test_key_tracks_render_fields_only() {
        let node = ElementNode::new("a", "Icons.Star").with_attr("size", "{16}");
        let key = cache_key(&node);
        assert_eq!(key.len(), 64);
        assert_eq!(key, cache_key(&node.clone()));

        let with_child = node.clone().with_child(ElementNode::new("b", "span"));
        assert_eq!(key, cache_key(&with_child));

        let restyled = node.clone().with_class("text-red-500");
        assert_ne!(key, cache_key(&restyled));
    }

    #[test]
    fn test_insert_and_get() {
        let cache = ComponentCache::new();
        let plan = Arc::new(RenderPlan {
            root: PlanNode::Text("x".to_string()),
        });
        cache.insert("k".to_string(), Ok(plan.clone()));
        cache.insert("e".to_string(), Err(CompileError::EmptySnippet));

        assert_eq!(cache.len(), 2);
        assert!(matches!(cache.get("k"), Some(Ok(p)) if *p == *plan));
        assert!(matches!(cache.get("e"), Some(Err(CompileError::EmptySnippet))));
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn test_global_is_shared() {
        let a = ComponentCache::global();
        let b = ComponentCache::global();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
