//! Style descriptors: which class tokens each rendered component family relies on.
//!
//! The host turns these into real stylesheets; nothing here touches a
//! global style registry.

use crate::catalog::{ComponentDescriptor, ComponentFamily};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleDescriptor {
    pub family: ComponentFamily,
    pub class_tokens: Vec<String>,
}

/// Accumulates descriptors while a tree renders, one per family, tokens deduplicated
#[derive(Debug, Default)]
pub struct StyleCollector {
    families: IndexMap<ComponentFamily, Vec<String>>,
}

impl StyleCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, descriptor: &ComponentDescriptor) {
        let tokens = self.families.entry(descriptor.family).or_default();
        for token in &descriptor.class_tokens {
            if !tokens.contains(token) {
                tokens.push(token.clone());
            }
        }
    }

    pub fn finish(self) -> Vec<StyleDescriptor> {
        self.families
            .into_iter()
            .map(|(family, class_tokens)| StyleDescriptor {
                family,
                class_tokens,
            })
            .collect()
    }
}
