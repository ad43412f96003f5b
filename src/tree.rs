//! Styled Node Tree
//!
//! The render input: a rooted tree of nodes, each optionally carrying a
//! style block with a raw `fontFamily` declaration.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyledNode {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<NodeStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Resource locator for image nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default)]
    pub children: Vec<StyledNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Everything else the engine understands, passed through untouched
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

impl StyledNode {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.style
            .get_or_insert_with(NodeStyle::default)
            .font_family = Some(family.into());
        self
    }

    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    pub fn with_child(mut self, child: StyledNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn font_family(&self) -> Option<&str> {
        self.style.as_ref()?.font_family.as_deref()
    }

    /// Visit nodes in pre-order without recursion
    pub fn walk(&self, mut visit: impl FnMut(&StyledNode)) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            visit(node);
            stack.extend(node.children.iter().rev());
        }
    }

    /// Mutable pre-order walk without recursion
    pub fn walk_mut(&mut self, mut visit: impl FnMut(&mut StyledNode)) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            visit(&mut *node);
            stack.extend(node.children.iter_mut().rev());
        }
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(|_| count += 1);
        count
    }

    /// Distinct image locators in document order
    pub fn image_sources(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut sources = vec![];
        self.walk(|node| {
            if let Some(src) = node.src.as_deref().filter(|s| !s.is_empty()) {
                if seen.insert(src.to_string()) {
                    sources.push(src.to_string());
                }
            }
        });
        sources
    }
}
