//! Decoded tree elements.
//!
//! A [`Node`] is built bottom-up through a [`NodeBuilder`]: the builder
//! remembers where its bytes start, collects children in the order their
//! decoders run and is turned into an immutable node once its subtree is
//! complete. A child is moved into exactly one parent, so the result is
//! always a tree.
//!
//! The only mutation after construction is the crate-internal rewrite of
//! names and descriptions during the link pass, addressed by [`NodePath`].

use std::{fmt, ops::Range};

/// One element of the decoded tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name:        String,
    description: String,
    span:        Range<usize>,
    children:    Vec<Node>,
}

impl Node {
    /// Create a childless node covering `span`.
    pub fn leaf(name: impl Into<String>, description: impl Into<String>, span: Range<usize>) -> Self {
        Self { name: name.into(), description: description.into(), span, children: Vec::new() }
    }

    /// Human-readable name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-text description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Byte range this node was decoded from
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Children in buffer order
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child at `index`, if present
    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    /// First direct child with the given name
    pub fn find(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Node addressed by `path`, relative to this node
    pub fn at_path(&self, path: &NodePath) -> Option<&Node> {
        path.0.iter().try_fold(self, |node, &i| node.children.get(i))
    }

    /// Depth-first, pre-order traversal including this node
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    pub(crate) fn at_path_mut(&mut self, path: &NodePath) -> Option<&mut Node> {
        path.0.iter().try_fold(self, |node, &i| node.children.get_mut(i))
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub(crate) fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub(crate) fn append_description(&mut self, suffix: &str) {
        self.description.push_str(suffix);
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}: {}", self.name, self.description)
        }
    }
}

/// Pre-order iterator returned by [`Node::walk`]
#[derive(Debug)]
pub struct Walk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// A node under construction
#[derive(Debug)]
pub struct NodeBuilder {
    name:        String,
    description: String,
    start:       usize,
    children:    Vec<Node>,
}

impl NodeBuilder {
    /// Begin a node whose bytes start at `start`.
    pub fn new(name: impl Into<String>, start: usize) -> Self {
        Self { name: name.into(), description: String::new(), start, children: Vec::new() }
    }

    /// Offset of the first byte of this node
    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of children pushed so far; also the index the next child
    /// will occupy.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// True if no child was pushed yet
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Rename the node.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Replace the description; the last write wins.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Append a child.
    pub fn push(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Drop children pushed after the first `len`.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.children.truncate(len);
    }

    /// Freeze the node; its bytes end at `end`.
    pub fn finish(self, end: usize) -> Node {
        Node { name: self.name, description: self.description, span: self.start..end, children: self.children }
    }
}

/// Address of a node as child indices from the root
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The root itself
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path of this node's `index`-th child
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Child indices from the root
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Index of the top-level record this path lies in
    pub fn record(&self) -> Option<usize> {
        self.0.first().copied()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{}", index)?;
        }
        Ok(())
    }
}
