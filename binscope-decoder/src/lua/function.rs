//! Function prototypes.
//!
//! A prototype nests its child prototypes directly, so decoding recurses and
//! is bounded by the configured nesting depth. Every prototype gets its own
//! registry scope for its instructions, constants, upvalues, child
//! prototypes and debug information.

use binscope_error::{Error, Result};
use binscope_format::binary::{
    LUA_LONG_SIZE_MARKER, LUA_TBOOLEAN, LUA_TLNGSTR, LUA_TNIL, LUA_TNUMFLT, LUA_TNUMINT, LUA_TSHRSTR,
};

use super::{
    header::{read_integer, read_number, ChunkLayout},
    opcodes::{Instruction, Opcode},
};
use crate::{
    decoder::Decoder,
    dispatch::{dispatch, TagTable},
    node::{Node, NodeBuilder, NodePath},
    registry::{Entity, Space, SpaceKey},
};

/// Constant tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConstantTag {
    Nil,
    Boolean,
    Float,
    Integer,
    ShortString,
    LongString,
}

impl TagTable for ConstantTag {
    fn from_tag(tag: u32) -> Option<Self> {
        match u8::try_from(tag).ok()? {
            LUA_TNIL => Some(Self::Nil),
            LUA_TBOOLEAN => Some(Self::Boolean),
            LUA_TNUMFLT => Some(Self::Float),
            LUA_TNUMINT => Some(Self::Integer),
            LUA_TSHRSTR => Some(Self::ShortString),
            LUA_TLNGSTR => Some(Self::LongString),
            _ => None,
        }
    }
}

impl ConstantTag {
    fn name(self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Boolean => "boolean",
            Self::Float => "number",
            Self::Integer => "integer",
            Self::ShortString => "short string",
            Self::LongString => "long string",
        }
    }
}

/// Read a string: a size byte (`0xFF` announces a `size_t` size), then
/// size - 1 bytes. Size 0 is the null string.
fn lua_string(d: &mut Decoder<'_>, layout: &ChunkLayout, node: &mut NodeBuilder, name: &str) -> Result<Option<String>> {
    let start = d.position();
    let mut size = u64::from(d.cursor().read_u8()?);
    if size == u64::from(LUA_LONG_SIZE_MARKER) {
        size = d.cursor().read_fixed(layout.size_t_size)?;
    }
    let Some(len) = size.checked_sub(1) else {
        node.push(d.leaf_from(name, "", start));
        return Ok(None);
    };
    let len = usize::try_from(len).map_err(|_| Error::invalid_value(start, "string size", size))?;
    let bytes = d.cursor().read_bytes(len)?;
    let text = String::from_utf8_lossy(bytes).into_owned();
    node.push(d.leaf_from(name, text.as_str(), start));
    Ok(Some(text))
}

/// Read a C `int` count prefix and decode that many elements.
fn counted<'a, F>(d: &mut Decoder<'a>, layout: &ChunkLayout, label: &str, at: &NodePath, element: F) -> Result<Node>
where
    F: FnMut(&mut Decoder<'a>, usize, &NodePath) -> Result<Node>,
{
    let start = d.position();
    let count = d.cursor().read_fixed(layout.int_size)?;
    d.vector_of(label, start, count, at, element)
}

fn instruction(d: &mut Decoder<'_>, scope: u32, pc: usize, path: &NodePath) -> Result<Node> {
    let start = d.position();
    let word = d.cursor().read_u32_le()?;
    let opcode: Opcode = dispatch(Instruction::opcode_bits(word), start)?;
    let ins = Instruction::new(word, opcode);
    d.record(
        SpaceKey::scoped(scope, Space::Instructions),
        Entity::local(path.clone()).with_value(u64::from(word)).with_kind(opcode.number()),
    );
    Ok(Node::leaf(format!("[{}] {}", pc + 1, opcode.name()), ins.to_string(), start..d.position()))
}

fn constant(d: &mut Decoder<'_>, layout: &ChunkLayout, scope: u32, path: &NodePath) -> Result<Node> {
    let mut node = d.begin("constant");
    let tag_offset = d.position();
    let tag = d.cursor().read_u8()?;
    let kind: ConstantTag = dispatch(u32::from(tag), tag_offset)?;
    node.push(d.leaf_from("t", kind.name(), tag_offset));

    let start = d.position();
    let text = match kind {
        ConstantTag::Nil => "nil".to_string(),
        ConstantTag::Boolean => {
            let value = d.cursor().read_u8()? != 0;
            node.push(d.leaf_from("k", value.to_string(), start));
            value.to_string()
        },
        ConstantTag::Float => {
            let value = read_number(d, layout)?;
            node.push(d.leaf_from("k", value.to_string(), start));
            value.to_string()
        },
        ConstantTag::Integer => {
            let value = read_integer(d, layout)?;
            node.push(d.leaf_from("k", value.to_string(), start));
            value.to_string()
        },
        ConstantTag::ShortString | ConstantTag::LongString => {
            let value = lua_string(d, layout, &mut node, "k")?;
            value.map_or_else(|| "nil".to_string(), |s| format!("{:?}", s))
        },
    };
    node.set_description(text.as_str());
    d.record(SpaceKey::scoped(scope, Space::Constants), Entity::local(path.clone()).with_text(text));
    Ok(d.finish(node))
}

fn upvalue(d: &mut Decoder<'_>, scope: u32, path: &NodePath) -> Result<Node> {
    let mut node = d.begin("upvalue");
    let instack = d.u8_field(&mut node, "instack")?;
    let idx = d.u8_field(&mut node, "idx")?;
    node.set_description(format!("instack={}, idx={}", instack, idx));
    d.record(SpaceKey::scoped(scope, Space::Upvalues), Entity::local(path.clone()));
    Ok(d.finish(node))
}

fn debug_info(d: &mut Decoder<'_>, layout: &ChunkLayout, scope: u32, at: &NodePath) -> Result<Node> {
    let mut node = d.begin("debug");

    let vector = counted(d, layout, "lineInfo", &at.child(node.len()), |d, pc, path| {
        let start = d.position();
        let line = d.cursor().read_fixed(layout.int_size)?;
        d.record(SpaceKey::scoped(scope, Space::LineInfo), Entity::local(path.clone()).with_value(line));
        Ok(d.leaf_from(&format!("[{}]", pc + 1), line.to_string(), start))
    })?;
    node.push(vector);

    let vector = counted(d, layout, "locVars", &at.child(node.len()), |d, _, _| {
        let mut var = d.begin("locVar");
        let name = lua_string(d, layout, &mut var, "varName")?;
        let start_pc = d.fixed_field(&mut var, "startPc", layout.int_size)?;
        let end_pc = d.fixed_field(&mut var, "endPc", layout.int_size)?;
        var.set_description(format!("{} [{}, {})", name.unwrap_or_default(), start_pc, end_pc));
        Ok(d.finish(var))
    })?;
    node.push(vector);

    let vector = counted(d, layout, "upvalueNames", &at.child(node.len()), |d, _, path| {
        let mut holder = d.begin("upvalueName");
        let name = lua_string(d, layout, &mut holder, "name")?;
        let mut entity = Entity::local(path.clone());
        if let Some(name) = &name {
            holder.set_description(name.as_str());
            entity = entity.with_text(name.as_str());
        }
        d.record(SpaceKey::scoped(scope, Space::UpvalueNames), entity);
        Ok(d.finish(holder))
    })?;
    node.push(vector);

    Ok(d.finish(node))
}

/// A decoded prototype and the registry scope holding its entities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prototype {
    /// Path of the prototype node
    pub path:  NodePath,
    /// Registry scope of its instructions, constants and upvalues
    pub scope: u32,
}

/// Decode a prototype named `name` that will occupy `path`; returns its
/// node and registry scope.
///
/// The prototype and every nested one are appended to `prototypes`, parents
/// before their children.
pub fn decode_function(
    d: &mut Decoder<'_>,
    layout: &ChunkLayout,
    name: &str,
    path: &NodePath,
    prototypes: &mut Vec<Prototype>,
) -> Result<(Node, u32)> {
    d.enter()?;
    let scope = d.new_scope();
    prototypes.push(Prototype { path: path.clone(), scope });
    let mut node = d.begin(name);

    let source = lua_string(d, layout, &mut node, "source")?;
    let line_defined = d.fixed_field(&mut node, "lineDefined", layout.int_size)?;
    let last_line_defined = d.fixed_field(&mut node, "lastLineDefined", layout.int_size)?;
    d.u8_field(&mut node, "numParams")?;
    d.u8_field(&mut node, "isVararg")?;
    d.u8_field(&mut node, "maxStackSize")?;

    let code = counted(d, layout, "code", &path.child(node.len()), |d, pc, path| instruction(d, scope, pc, path))?;
    node.push(code);
    let constants =
        counted(d, layout, "constants", &path.child(node.len()), |d, _, path| constant(d, layout, scope, path))?;
    node.push(constants);
    let upvalues = counted(d, layout, "upvalues", &path.child(node.len()), |d, _, path| upvalue(d, scope, path))?;
    node.push(upvalues);
    let protos = counted(d, layout, "protos", &path.child(node.len()), |d, i, path| {
        let (child, child_scope) = decode_function(d, layout, &format!("proto#{}", i), path, prototypes)?;
        d.record(
            SpaceKey::scoped(scope, Space::NestedPrototypes),
            Entity::local(path.clone()).with_value(u64::from(child_scope)),
        );
        Ok(child)
    })?;
    node.push(protos);
    node.push(debug_info(d, layout, scope, &path.child(node.len()))?);

    node.set_description(format!(
        "<{}:{},{}>",
        source.as_deref().unwrap_or("?"),
        line_defined,
        last_line_defined
    ));
    d.leave();
    Ok((d.finish(node), scope))
}
