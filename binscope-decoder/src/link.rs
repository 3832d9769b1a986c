//! Cross-reference pass.
//!
//! Runs after every record is structurally decoded. Containers walk their
//! records once per [`LinkStage`]; a stage only reads the completed
//! registry and rewrites names and descriptions of nodes, never the shape
//! of the tree.

use log::debug;

use crate::{
    node::NodePath,
    options::ReferencePolicy,
    registry::{Entity, Registry, Space, SpaceKey},
};

/// Ordered stages of the link pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStage {
    /// Each record labels and describes its own nodes
    Label,
    /// Records append information onto nodes owned by other records
    Enrich,
}

impl LinkStage {
    /// Stages in execution order
    pub const ALL: [LinkStage; 2] = [LinkStage::Label, LinkStage::Enrich];
}

/// A reference the link pass could not resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedReference {
    /// Space the reference points into
    pub space: Space,
    /// Referenced index
    pub index: u64,
    /// Number of entities the space actually holds
    pub len:   usize,
    /// Node carrying the reference
    pub at:    NodePath,
}

/// Read-only registry access plus the list of skipped references
#[derive(Debug)]
pub struct LinkContext<'r> {
    registry: &'r Registry,
    policy:   ReferencePolicy,
    skipped:  Vec<SkippedReference>,
}

impl<'r> LinkContext<'r> {
    /// Create a context over a completed registry.
    pub fn new(registry: &'r Registry, policy: ReferencePolicy) -> Self {
        Self { registry, policy, skipped: Vec::new() }
    }

    /// The completed registry
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Resolve `index` in the space named by `key` for the node at `from`.
    ///
    /// Out-of-range indices are handled per the reference policy.
    pub fn resolve(&mut self, key: SpaceKey, index: u64, from: &NodePath) -> Option<&'r Entity> {
        let registry = self.registry;
        match registry.get(key, index) {
            Some(entity) => Some(entity),
            None => match self.policy {
                ReferencePolicy::SkipOnOutOfRange => {
                    let len = registry.len_of(key);
                    debug!("Skipping {:?} reference {} at {}: space holds {}", key.space, index, from, len);
                    self.skipped.push(SkippedReference { space: key.space, index, len, at: from.clone() });
                    None
                },
            },
        }
    }

    /// References skipped so far
    pub fn skipped(&self) -> &[SkippedReference] {
        &self.skipped
    }

    /// Consume the context, keeping the skipped references.
    pub fn into_skipped(self) -> Vec<SkippedReference> {
        self.skipped
    }
}
