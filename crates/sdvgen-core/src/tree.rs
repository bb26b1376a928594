//! Owned labeled tree and the queries the model builder runs against it.
//!
//! The builder never touches XML directly. Any hierarchical source that can be
//! turned into a [`TreeNode`] (ARXML today) can feed it.

use crate::error::{ModelError, ModelResult};
use serde::Serialize;

/// A labeled node with optional text and ordered children
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TreeNode {
    pub tag: String,
    pub text: Option<String>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Leaf node carrying text
    pub fn leaf(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: Some(text.into()),
            children: Vec::new(),
        }
    }

    /// Append a child, builder style
    pub fn with_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// First node with `tag` in pre-order, including `self`.
    pub fn find_first(&self, tag: &str) -> Option<&TreeNode> {
        if self.tag == tag {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_first(tag))
    }

    /// Every node with `tag` in pre-order, including `self`.
    pub fn find_all(&self, tag: &str) -> Vec<&TreeNode> {
        let mut found = Vec::new();
        self.collect(tag, &mut found);
        found
    }

    fn collect<'a>(&'a self, tag: &str, found: &mut Vec<&'a TreeNode>) {
        if self.tag == tag {
            found.push(self);
        }
        for child in &self.children {
            child.collect(tag, found);
        }
    }

    /// Nodes with `tag` whose direct `SHORT-NAME` child equals `name`.
    pub fn find_named(&self, tag: &str, name: &str) -> Vec<&TreeNode> {
        self.find_all(tag)
            .into_iter()
            .filter(|node| node.short_name() == Some(name))
            .collect()
    }

    /// Direct child with `tag`
    pub fn child(&self, tag: &str) -> Option<&TreeNode> {
        self.children.iter().find(|child| child.tag == tag)
    }

    pub fn short_name(&self) -> Option<&str> {
        self.child("SHORT-NAME").and_then(TreeNode::text)
    }

    /// Text of the first descendant with `tag`
    pub fn first_text(&self, tag: &str) -> Option<&str> {
        self.find_first(tag).and_then(TreeNode::text)
    }
}

/// Last `/`-separated segment of an ARXML reference path
pub fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Whether any `/`-separated segment of `path` is exactly `name`
pub fn has_segment(path: &str, name: &str) -> bool {
    path.split('/').any(|segment| segment == name)
}

/// Parse XML text into an owned tree.
///
/// Namespace prefixes are dropped from tags, text is trimmed, and
/// whitespace-only text becomes `None`.
pub fn parse_xml(input: &str) -> ModelResult<TreeNode> {
    let document = roxmltree::Document::parse(input)
        .map_err(|e| ModelError::MalformedDocument(e.to_string()))?;
    Ok(convert(document.root_element()))
}

fn convert(node: roxmltree::Node<'_, '_>) -> TreeNode {
    let text = node
        .text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string);
    TreeNode {
        tag: node.tag_name().name().to_string(),
        text,
        children: node
            .children()
            .filter(roxmltree::Node::is_element)
            .map(convert)
            .collect(),
    }
}
