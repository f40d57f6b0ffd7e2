//! Object metadata compiler
//!
//! S3 user metadata is flat, so nested values are encoded in the key with `-` as the
//! path delimiter: `requester-exid` becomes `{"requester": {"exid": ...}}`.

use crate::error::MetadataError;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Path delimiter inside metadata keys
pub const DELIMITER: char = '-';

/// One node of the compiled tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetadataNode {
    Leaf(String),
    Branch(BTreeMap<String, MetadataNode>),
}

impl MetadataNode {
    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            MetadataNode::Leaf(value) => Some(value),
            MetadataNode::Branch(_) => None,
        }
    }

    pub fn as_branch(&self) -> Option<&BTreeMap<String, MetadataNode>> {
        match self {
            MetadataNode::Branch(children) => Some(children),
            MetadataNode::Leaf(_) => None,
        }
    }
}

/// Nested metadata, serialized as a plain JSON object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CompiledMetadata(BTreeMap<String, MetadataNode>);

impl CompiledMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node at `path`, walking branches from the root.
    pub fn get(&self, path: &[&str]) -> Option<&MetadataNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.0.get(*first)?;
        for segment in rest {
            node = node.as_branch()?.get(*segment)?;
        }
        Some(node)
    }

    /// String value at `path`, if the path ends on a leaf.
    pub fn leaf(&self, path: &[&str]) -> Option<&str> {
        self.get(path).and_then(MetadataNode::as_leaf)
    }

    /// Drop a top-level entry, returning it.
    pub fn remove(&mut self, key: &str) -> Option<MetadataNode> {
        self.0.remove(key)
    }

    /// Top-level entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetadataNode)> {
        self.0.iter()
    }
}

/// Compile raw metadata into a fresh tree.
pub fn compile(raw: &HashMap<String, String>) -> Result<CompiledMetadata, MetadataError> {
    let mut compiled = CompiledMetadata::new();
    compile_into(&mut compiled, raw)?;
    Ok(compiled)
}

/// Compile raw metadata on top of an existing tree.
///
/// Keys are applied in sorted order. A key whose full path already holds a value replaces
/// it; a key that would turn a value into a mapping (or a mapping into a value) fails.
pub fn compile_into(
    acc: &mut CompiledMetadata,
    raw: &HashMap<String, String>,
) -> Result<(), MetadataError> {
    let mut entries: Vec<(&String, &String)> = raw.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    for (key, value) in entries {
        insert(&mut acc.0, key, value)?;
    }
    Ok(())
}

fn insert(
    root: &mut BTreeMap<String, MetadataNode>,
    key: &str,
    value: &str,
) -> Result<(), MetadataError> {
    let segments: Vec<&str> = key.split(DELIMITER).collect();
    let Some((last, parents)) = segments.split_last() else {
        return Ok(());
    };

    let mut node = root;
    for (depth, segment) in parents.iter().enumerate() {
        let child = node
            .entry((*segment).to_string())
            .or_insert_with(|| MetadataNode::Branch(BTreeMap::new()));
        node = match child {
            MetadataNode::Branch(children) => children,
            MetadataNode::Leaf(_) => return Err(conflict(key, &segments[..=depth])),
        };
    }

    if let Some(MetadataNode::Branch(_)) = node.get(*last) {
        return Err(conflict(key, &segments));
    }
    node.insert((*last).to_string(), MetadataNode::Leaf(value.to_string()));
    Ok(())
}

fn conflict(key: &str, path: &[&str]) -> MetadataError {
    MetadataError::PathConflict {
        key: key.to_string(),
        path: path.join("."),
    }
}
