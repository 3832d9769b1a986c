//! Decode engine shared by every grammar.
//!
//! A [`Decoder`] owns the read head, the registry and the options of one
//! decode call. Grammar rules use its field helpers, which read one
//! primitive, push a leaf for it and hand the value back, so that every
//! consumed byte ends up inside exactly one node span.

use std::fmt;

use binscope_error::{Error, ErrorKind, Result};
use binscope_format::Cursor;

use crate::{
    node::{Node, NodeBuilder, NodePath},
    options::DecodeOptions,
    registry::{Entity, Registry, SpaceKey},
};

/// Bytes shown in the description of an opaque blob
const BLOB_PREVIEW_LEN: usize = 16;

/// A saved read position, see [`Decoder::checkpoint`]
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint<'a>(Cursor<'a>);

/// Decode state for one buffer
#[derive(Debug)]
pub struct Decoder<'a> {
    cursor:   Cursor<'a>,
    registry: Registry,
    options:  DecodeOptions,
    depth:    usize,
}

impl<'a> Decoder<'a> {
    /// Create a decoder positioned at the start of `bytes`.
    pub fn new(bytes: &'a [u8], options: DecodeOptions) -> Self {
        Self { cursor: Cursor::new(bytes), registry: Registry::new(), options, depth: 0 }
    }

    /// Current absolute offset
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Unread bytes
    pub fn remaining(&self) -> usize {
        self.cursor.remaining()
    }

    /// True once the buffer is exhausted
    pub fn at_end(&self) -> bool {
        self.cursor.at_end()
    }

    /// Options of this decode call
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Direct access to the read head for reads that do not become nodes.
    pub fn cursor(&mut self) -> &mut Cursor<'a> {
        &mut self.cursor
    }

    /// Register an entity for the link pass.
    pub fn record(&mut self, key: SpaceKey, entity: Entity) {
        self.registry.record(key, entity);
    }

    /// Allocate a fresh registry scope.
    pub fn new_scope(&mut self) -> u32 {
        self.registry.new_scope()
    }

    /// Hand the populated registry over to the link pass.
    pub fn into_registry(self) -> Registry {
        self.registry
    }

    /// Begin a node at the current position.
    pub fn begin(&self, name: impl Into<String>) -> NodeBuilder {
        NodeBuilder::new(name, self.position())
    }

    /// Close a node at the current position.
    pub fn finish(&self, node: NodeBuilder) -> Node {
        node.finish(self.position())
    }

    /// Leaf spanning from `start` to the current position
    pub fn leaf_from(&self, name: &str, description: impl Into<String>, start: usize) -> Node {
        Node::leaf(name, description, start..self.position())
    }

    /// Save the read position.
    pub fn checkpoint(&self) -> Checkpoint<'a> {
        Checkpoint(self.cursor)
    }

    /// Rewind to a saved read position.
    pub fn restore(&mut self, checkpoint: Checkpoint<'a>) {
        self.cursor = checkpoint.0;
    }

    fn field<T: fmt::Display>(
        &mut self,
        node: &mut NodeBuilder,
        name: &str,
        read: impl FnOnce(&mut Cursor<'a>) -> Result<T>,
    ) -> Result<T> {
        let start = self.position();
        let value = read(&mut self.cursor)?;
        node.push(self.leaf_from(name, value.to_string(), start));
        Ok(value)
    }

    /// Read a byte as a field of `node`.
    pub fn u8_field(&mut self, node: &mut NodeBuilder, name: &str) -> Result<u8> {
        self.field(node, name, Cursor::read_u8)
    }

    /// Read a var-uint as a field of `node`.
    pub fn u32_field(&mut self, node: &mut NodeBuilder, name: &str) -> Result<u32> {
        self.field(node, name, Cursor::read_var_u32)
    }

    /// Read a 32-bit var-signed as a field of `node`.
    pub fn i32_field(&mut self, node: &mut NodeBuilder, name: &str) -> Result<i32> {
        self.field(node, name, Cursor::read_var_i32)
    }

    /// Read a 64-bit var-signed as a field of `node`.
    pub fn i64_field(&mut self, node: &mut NodeBuilder, name: &str) -> Result<i64> {
        self.field(node, name, Cursor::read_var_i64)
    }

    /// Read a little-endian integer `width` bytes wide as a field of `node`.
    pub fn fixed_field(&mut self, node: &mut NodeBuilder, name: &str, width: usize) -> Result<u64> {
        self.field(node, name, |cursor| cursor.read_fixed(width))
    }

    /// Read an IEEE 754 single as a field of `node`.
    pub fn f32_field(&mut self, node: &mut NodeBuilder, name: &str) -> Result<f32> {
        self.field(node, name, Cursor::read_f32)
    }

    /// Read an IEEE 754 double as a field of `node`.
    pub fn f64_field(&mut self, node: &mut NodeBuilder, name: &str) -> Result<f64> {
        self.field(node, name, Cursor::read_f64)
    }

    /// Read a length-prefixed UTF-8 name as a field of `node`.
    pub fn name_field(&mut self, node: &mut NodeBuilder, name: &str) -> Result<&'a str> {
        self.field(node, name, Cursor::read_name)
    }

    /// Read `len` raw bytes as a field of `node`; the description previews
    /// the leading bytes in hex.
    pub fn bytes_field(&mut self, node: &mut NodeBuilder, name: &str, len: usize) -> Result<&'a [u8]> {
        let start = self.position();
        let bytes = self.cursor.read_bytes(len)?;
        node.push(self.leaf_from(name, blob_preview(bytes), start));
        Ok(bytes)
    }

    /// Read a var-uint count followed by that many elements.
    ///
    /// `at` is the path the returned vector node will occupy; `element`
    /// receives the element's index and its path.
    pub fn vector<F>(&mut self, label: &str, at: &NodePath, element: F) -> Result<Node>
    where
        F: FnMut(&mut Self, usize, &NodePath) -> Result<Node>,
    {
        let start = self.position();
        let count = self.cursor.read_var_u32()?;
        self.vector_of(label, start, u64::from(count), at, element)
    }

    /// Decode `count` elements whose count was already read starting at
    /// `start`.
    pub fn vector_of<F>(
        &mut self,
        label: &str,
        start: usize,
        count: u64,
        at: &NodePath,
        mut element: F,
    ) -> Result<Node>
    where
        F: FnMut(&mut Self, usize, &NodePath) -> Result<Node>,
    {
        let limit = self.options.max_vector_len;
        if count > limit {
            return Err(Error::new(ErrorKind::VectorTooLong { count, limit }, start));
        }
        let mut vector = NodeBuilder::new(label, start);
        vector.set_description(count.to_string());
        for index in 0..count as usize {
            let node = element(self, index, &at.child(index))?;
            vector.push(node);
        }
        Ok(self.finish(vector))
    }

    /// Check that exactly `declared` bytes were consumed since `start`.
    pub fn reconcile(&self, declared: u64, start: usize) -> Result<()> {
        let actual = (self.position() - start) as u64;
        if actual != declared {
            return Err(Error::new(ErrorKind::SizeMismatch { declared, actual }, self.position()));
        }
        Ok(())
    }

    /// Run `rule` with reads confined to the bytes before `end`.
    ///
    /// A read that would cross `end` fails the rule with `SizeMismatch`:
    /// the declared size is `end` minus the current position and the actual
    /// size is how far the rule tried to read. Under-reads are left to
    /// [`Decoder::reconcile`].
    pub fn bounded<T>(&mut self, end: usize, rule: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let start = self.position();
        let outer = self.cursor;
        self.cursor = outer.limited(end);
        let result = rule(self);
        let reached = self.position();
        self.cursor = outer;
        self.cursor.seek(reached)?;

        result.map_err(|error| match error.kind() {
            ErrorKind::UnexpectedEof { needed, .. } => {
                let declared = end.saturating_sub(start) as u64;
                let actual = (error.offset() + needed).saturating_sub(start) as u64;
                Error::new(ErrorKind::SizeMismatch { declared, actual }, error.offset())
            },
            _ => error,
        })
    }

    /// Enter a nested record.
    pub fn enter(&mut self) -> Result<()> {
        let limit = self.options.max_nesting_depth;
        if self.depth >= limit {
            return Err(Error::new(ErrorKind::NestingTooDeep { limit }, self.position()));
        }
        self.depth += 1;
        Ok(())
    }

    /// Leave a nested record.
    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// Hex preview of an opaque byte run
pub fn blob_preview(bytes: &[u8]) -> String {
    if bytes.len() > BLOB_PREVIEW_LEN {
        format!("{}...", hex::encode(&bytes[..BLOB_PREVIEW_LEN]))
    } else {
        hex::encode(bytes)
    }
}
