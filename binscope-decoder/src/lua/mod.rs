//! Lua 5.3 binary chunk grammar.
//!
//! A chunk is a header, the upvalue count of the main closure and the main
//! function prototype. Nothing is size-prefixed: records nest, and the
//! header decides the width of every integer field that follows.

mod function;
mod header;
mod link;
mod opcodes;

use binscope_error::{Error, ErrorKind, Result};

pub use self::{
    function::Prototype,
    header::ChunkLayout,
    opcodes::{Instruction, OpMode, Opcode},
};
use crate::{
    decoder::Decoder,
    detect::Format,
    file::Container,
    link::{LinkContext, LinkStage},
    node::{Node, NodeBuilder, NodePath},
};

/// The Lua binary chunk container
#[derive(Debug, Clone, Copy)]
pub struct LuaChunk;

impl Container for LuaChunk {
    const FORMAT: Format = Format::LuaChunk;
    const ROOT_NAME: &'static str = "binary chunk";

    type Record = Prototype;

    fn decode_records(d: &mut Decoder<'_>, root: &mut NodeBuilder) -> Result<Vec<Prototype>> {
        let layout = header::decode_header(d, root)?;
        d.u8_field(root, "size_upvalues")?;

        let at = NodePath::root().child(root.len());
        let mut prototypes = Vec::new();
        let (main, _) = function::decode_function(d, &layout, "main", &at, &mut prototypes)?;
        root.push(main);

        if !d.at_end() {
            return Err(Error::new(ErrorKind::TrailingBytes { remaining: d.remaining() }, d.position()));
        }
        Ok(prototypes)
    }

    fn link(stage: LinkStage, records: &[Prototype], root: &mut Node, ctx: &mut LinkContext<'_>) {
        link::link_chunk(stage, records, root, ctx);
    }
}

#[cfg(test)]
mod tests {
    use binscope_format::binary::{LUAC_DATA, LUA_SIGNATURE};

    use super::*;
    use crate::options::DecodeOptions;

    /// Prototype with no code and `children` empty nested prototypes
    fn empty_proto(children: u32) -> Vec<u8> {
        let mut bytes = vec![0x00];
        bytes.extend_from_slice(&[0; 8]);
        bytes.extend_from_slice(&[0, 1, 2]);
        bytes.extend_from_slice(&[0; 12]);
        bytes.extend_from_slice(&children.to_le_bytes());
        for _ in 0..children {
            bytes.extend(empty_proto(0));
        }
        bytes.extend_from_slice(&[0; 12]);
        bytes
    }

    #[test]
    fn test_records_are_prototypes_parent_first() {
        let mut bytes = LUA_SIGNATURE.to_vec();
        bytes.extend_from_slice(&[0x53, 0x00]);
        bytes.extend_from_slice(&LUAC_DATA);
        bytes.extend_from_slice(&[4, 8, 4, 8, 8]);
        bytes.extend_from_slice(&0x5678i64.to_le_bytes());
        bytes.extend_from_slice(&370.5f64.to_le_bytes());
        bytes.push(0);
        bytes.extend(empty_proto(2));

        let mut d = Decoder::new(&bytes, DecodeOptions::default());
        let mut root = d.begin("binary chunk");
        let records = LuaChunk::decode_records(&mut d, &mut root).unwrap();
        let root = d.finish(root);

        let names: Vec<_> = records.iter().map(|p| root.at_path(&p.path).unwrap().name()).collect();
        assert_eq!(names, ["main", "proto#0", "proto#1"]);
        assert_eq!(records[0].path, NodePath::root().child(2));
        assert_ne!(records[1].scope, records[0].scope);
        assert_ne!(records[2].scope, records[1].scope);
    }
}
