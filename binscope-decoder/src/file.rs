//! Two-phase container decoding.
//!
//! Phase 1 decodes every top-level record in stream order and fills the
//! registry. Phase 2 hands the frozen registry to the container's link
//! step, once per [`LinkStage`], to annotate the tree.

use binscope_error::Result;

use crate::{
    decoder::Decoder,
    detect::Format,
    link::{LinkContext, LinkStage, SkippedReference},
    node::{Node, NodeBuilder},
    options::DecodeOptions,
    registry::Registry,
};

/// A top-level container grammar
pub trait Container {
    /// Format this grammar decodes
    const FORMAT: Format;
    /// Name of the root node
    const ROOT_NAME: &'static str;

    /// Per-record information the link step needs
    type Record;

    /// Phase 1: decode the whole buffer into children of `root`.
    fn decode_records(d: &mut Decoder<'_>, root: &mut NodeBuilder) -> Result<Vec<Self::Record>>;

    /// Phase 2: annotate `root` for one stage.
    fn link(stage: LinkStage, records: &[Self::Record], root: &mut Node, ctx: &mut LinkContext<'_>);
}

/// Result of a successful decode
#[derive(Debug, Clone)]
pub struct DecodedFile {
    format:   Format,
    root:     Node,
    registry: Registry,
    skipped:  Vec<SkippedReference>,
}

impl DecodedFile {
    /// Format the buffer was decoded as
    pub fn format(&self) -> Format {
        self.format
    }

    /// Root of the annotated tree
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Take the tree, dropping everything else.
    pub fn into_root(self) -> Node {
        self.root
    }

    /// Index spaces built during decoding
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Cross-references the link pass left unresolved
    pub fn skipped(&self) -> &[SkippedReference] {
        &self.skipped
    }
}

/// Run both phases of container `C` over `bytes`.
pub fn decode_container<C: Container>(bytes: &[u8], options: &DecodeOptions) -> Result<DecodedFile> {
    let mut d = Decoder::new(bytes, options.clone());
    let mut root = NodeBuilder::new(C::ROOT_NAME, 0);
    let records = C::decode_records(&mut d, &mut root)?;
    let mut root = d.finish(root);
    let registry = d.into_registry();

    let mut ctx = LinkContext::new(&registry, options.reference_policy);
    for stage in LinkStage::ALL {
        C::link(stage, &records, &mut root, &mut ctx);
    }
    let skipped = ctx.into_skipped();

    Ok(DecodedFile { format: C::FORMAT, root, registry, skipped })
}
