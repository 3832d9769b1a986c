//! Decode rules for the non-custom WebAssembly sections.
//!
//! Rules that declare referenceable entities register them while decoding:
//! imports fill the imported part of their kind's index space, the
//! function, table, memory and global sections fill the local part.

use binscope_error::{Error, Result};
use binscope_format::binary::{
    ELEM_KIND_FUNCREF, EXTERNAL_FUNCTION, EXTERNAL_GLOBAL, EXTERNAL_MEMORY, EXTERNAL_TABLE,
};

use super::types::{const_expr, func_type, global_type, limits, ref_type, table_type, value_type};
use crate::{
    decoder::Decoder,
    dispatch::{dispatch, TagTable},
    node::{Node, NodeBuilder, NodePath},
    registry::{Entity, Space, SpaceKey},
};

/// Position of the index field inside an export node
pub(super) const EXPORT_INDEX_CHILD: usize = 2;

/// External kinds of import and export descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ExternalKind {
    Function,
    Table,
    Memory,
    Global,
}

impl TagTable for ExternalKind {
    fn from_tag(tag: u32) -> Option<Self> {
        match u8::try_from(tag).ok()? {
            EXTERNAL_FUNCTION => Some(Self::Function),
            EXTERNAL_TABLE => Some(Self::Table),
            EXTERNAL_MEMORY => Some(Self::Memory),
            EXTERNAL_GLOBAL => Some(Self::Global),
            _ => None,
        }
    }
}

impl ExternalKind {
    pub(super) fn from_byte(byte: u8) -> Option<Self> {
        Self::from_tag(u32::from(byte))
    }

    pub(super) fn byte(self) -> u8 {
        match self {
            Self::Function => EXTERNAL_FUNCTION,
            Self::Table => EXTERNAL_TABLE,
            Self::Memory => EXTERNAL_MEMORY,
            Self::Global => EXTERNAL_GLOBAL,
        }
    }

    /// Index space entities of this kind live in
    pub(super) fn space(self) -> Space {
        match self {
            Self::Function => Space::Functions,
            Self::Table => Space::Tables,
            Self::Memory => Space::Memories,
            Self::Global => Space::Globals,
        }
    }

    /// Label prefix of entities of this kind
    pub(super) fn prefix(self) -> &'static str {
        match self {
            Self::Function => "func",
            Self::Table => "table",
            Self::Memory => "memory",
            Self::Global => "global",
        }
    }
}

pub(super) fn decode_type_section(d: &mut Decoder<'_>, record: &mut NodeBuilder, at: &NodePath) -> Result<()> {
    let vector = d.vector("types", &at.child(record.len()), |d, _, path| {
        let node = func_type(d, path)?;
        d.record(SpaceKey::module(Space::Types), Entity::local(path.clone()));
        Ok(node)
    })?;
    record.push(vector);
    Ok(())
}

fn import(d: &mut Decoder<'_>, path: &NodePath) -> Result<Node> {
    let mut node = d.begin("import");
    let module = d.name_field(&mut node, "module")?;
    let field = d.name_field(&mut node, "name")?;
    node.set_description(format!("{}.{}", module, field));

    let tag_offset = d.position();
    let tag = d.u8_field(&mut node, "kind")?;
    let kind: ExternalKind = dispatch(u32::from(tag), tag_offset)?;
    let mut entity = Entity::imported(path.clone()).with_kind(kind.byte());
    match kind {
        ExternalKind::Function => {
            let typeidx = d.u32_field(&mut node, "typeidx")?;
            entity = entity.with_value(u64::from(typeidx));
        },
        ExternalKind::Table => node.push(table_type(d, "table")?),
        ExternalKind::Memory => node.push(limits(d, "memory")?),
        ExternalKind::Global => node.push(global_type(d, "global")?),
    }

    d.record(SpaceKey::module(Space::Imports), Entity::local(path.clone()).with_kind(kind.byte()));
    d.record(SpaceKey::module(kind.space()), entity);
    Ok(d.finish(node))
}

pub(super) fn decode_import_section(d: &mut Decoder<'_>, record: &mut NodeBuilder, at: &NodePath) -> Result<()> {
    let vector = d.vector("imports", &at.child(record.len()), |d, _, path| import(d, path))?;
    record.push(vector);
    Ok(())
}

pub(super) fn decode_function_section(d: &mut Decoder<'_>, record: &mut NodeBuilder, at: &NodePath) -> Result<()> {
    let vector = d.vector("functions", &at.child(record.len()), |d, _, path| {
        let start = d.position();
        let typeidx = d.cursor().read_var_u32()?;
        d.record(SpaceKey::module(Space::Functions), Entity::local(path.clone()).with_value(u64::from(typeidx)));
        Ok(d.leaf_from("typeidx", typeidx.to_string(), start))
    })?;
    record.push(vector);
    Ok(())
}

pub(super) fn decode_table_section(d: &mut Decoder<'_>, record: &mut NodeBuilder, at: &NodePath) -> Result<()> {
    let vector = d.vector("tables", &at.child(record.len()), |d, _, path| {
        let node = table_type(d, "table")?;
        d.record(SpaceKey::module(Space::Tables), Entity::local(path.clone()));
        Ok(node)
    })?;
    record.push(vector);
    Ok(())
}

pub(super) fn decode_memory_section(d: &mut Decoder<'_>, record: &mut NodeBuilder, at: &NodePath) -> Result<()> {
    let vector = d.vector("memories", &at.child(record.len()), |d, _, path| {
        let node = limits(d, "memory")?;
        d.record(SpaceKey::module(Space::Memories), Entity::local(path.clone()));
        Ok(node)
    })?;
    record.push(vector);
    Ok(())
}

pub(super) fn decode_global_section(d: &mut Decoder<'_>, record: &mut NodeBuilder, at: &NodePath) -> Result<()> {
    let vector = d.vector("globals", &at.child(record.len()), |d, _, path| {
        let mut node = d.begin("global");
        let ty = global_type(d, "globaltype")?;
        node.set_description(ty.description().to_string());
        node.push(ty);
        node.push(const_expr(d, "init")?);
        d.record(SpaceKey::module(Space::Globals), Entity::local(path.clone()));
        Ok(d.finish(node))
    })?;
    record.push(vector);
    Ok(())
}

pub(super) fn decode_export_section(d: &mut Decoder<'_>, record: &mut NodeBuilder, at: &NodePath) -> Result<()> {
    let vector = d.vector("exports", &at.child(record.len()), |d, _, path| {
        let mut node = d.begin("export");
        let name = d.name_field(&mut node, "name")?;
        let tag_offset = d.position();
        let tag = d.u8_field(&mut node, "kind")?;
        let kind: ExternalKind = dispatch(u32::from(tag), tag_offset)?;
        let index = d.u32_field(&mut node, "index")?;
        node.set_description(name);
        d.record(
            SpaceKey::module(Space::Exports),
            Entity::local(path.clone()).with_kind(kind.byte()).with_value(u64::from(index)).with_text(name),
        );
        Ok(d.finish(node))
    })?;
    record.push(vector);
    Ok(())
}

pub(super) fn decode_start_section(d: &mut Decoder<'_>, record: &mut NodeBuilder, at: &NodePath) -> Result<()> {
    let path = at.child(record.len());
    let funcidx = d.u32_field(record, "funcidx")?;
    d.record(SpaceKey::module(Space::Start), Entity::local(path).with_value(u64::from(funcidx)));
    Ok(())
}

fn funcidx_vector(d: &mut Decoder<'_>, node: &mut NodeBuilder, at: &NodePath) -> Result<()> {
    let vector = d.vector("init", &at.child(node.len()), |d, _, _| {
        let start = d.position();
        let funcidx = d.cursor().read_var_u32()?;
        Ok(d.leaf_from("funcidx", funcidx.to_string(), start))
    })?;
    node.push(vector);
    Ok(())
}

fn expr_vector(d: &mut Decoder<'_>, node: &mut NodeBuilder, at: &NodePath) -> Result<()> {
    let vector = d.vector("init", &at.child(node.len()), |d, _, _| const_expr(d, "expr"))?;
    node.push(vector);
    Ok(())
}

fn elem_kind(d: &mut Decoder<'_>, node: &mut NodeBuilder) -> Result<()> {
    let start = d.position();
    let kind = d.cursor().read_u8()?;
    if kind != ELEM_KIND_FUNCREF {
        return Err(Error::invalid_value(start, "element kind", u64::from(kind)));
    }
    node.push(d.leaf_from("elemkind", "funcref", start));
    Ok(())
}

fn element(d: &mut Decoder<'_>, path: &NodePath) -> Result<Node> {
    let mut node = d.begin("elem");
    let start = d.position();
    let flags = d.u32_field(&mut node, "flags")?;
    let mode = match flags {
        0 => {
            node.push(const_expr(d, "offset")?);
            funcidx_vector(d, &mut node, path)?;
            "active"
        },
        1 | 3 => {
            elem_kind(d, &mut node)?;
            funcidx_vector(d, &mut node, path)?;
            if flags == 1 { "passive" } else { "declarative" }
        },
        2 => {
            d.u32_field(&mut node, "tableidx")?;
            node.push(const_expr(d, "offset")?);
            elem_kind(d, &mut node)?;
            funcidx_vector(d, &mut node, path)?;
            "active"
        },
        4 => {
            node.push(const_expr(d, "offset")?);
            expr_vector(d, &mut node, path)?;
            "active"
        },
        5 | 7 => {
            node.push(ref_type(d, "reftype")?.0);
            expr_vector(d, &mut node, path)?;
            if flags == 5 { "passive" } else { "declarative" }
        },
        6 => {
            d.u32_field(&mut node, "tableidx")?;
            node.push(const_expr(d, "offset")?);
            node.push(ref_type(d, "reftype")?.0);
            expr_vector(d, &mut node, path)?;
            "active"
        },
        _ => return Err(Error::invalid_value(start, "element segment flags", u64::from(flags))),
    };
    node.set_description(mode);
    Ok(d.finish(node))
}

pub(super) fn decode_element_section(d: &mut Decoder<'_>, record: &mut NodeBuilder, at: &NodePath) -> Result<()> {
    let vector = d.vector("elements", &at.child(record.len()), |d, _, path| element(d, path))?;
    record.push(vector);
    Ok(())
}

/// A function body: its own size prefix, the local declarations and the
/// instruction bytes, kept opaque.
fn code(d: &mut Decoder<'_>, path: &NodePath) -> Result<Node> {
    let mut node = d.begin("code");
    let size = d.u32_field(&mut node, "size")?;
    d.cursor().ensure(size as usize)?;
    let p0 = d.position();
    let end = p0 + size as usize;

    d.bounded(end, |d| {
        let locals = d.vector("locals", &path.child(node.len()), |d, _, _| {
            let mut local = d.begin("local");
            let count = d.u32_field(&mut local, "n")?;
            let (valtype, ty) = value_type(d, "type")?;
            local.push(valtype);
            local.set_description(format!("{} x {}", count, ty));
            Ok(d.finish(local))
        })?;
        node.push(locals);

        let body = end - d.position();
        if body > 0 {
            d.bytes_field(&mut node, "expr", body)?;
        }
        Ok(())
    })?;
    d.reconcile(u64::from(size), p0)?;

    d.record(SpaceKey::module(Space::Codes), Entity::local(path.clone()));
    Ok(d.finish(node))
}

pub(super) fn decode_code_section(d: &mut Decoder<'_>, record: &mut NodeBuilder, at: &NodePath) -> Result<()> {
    let vector = d.vector("codes", &at.child(record.len()), |d, _, path| code(d, path))?;
    record.push(vector);
    Ok(())
}

fn data(d: &mut Decoder<'_>) -> Result<Node> {
    let mut node = d.begin("data");
    let start = d.position();
    let flags = d.u32_field(&mut node, "flags")?;
    let mode = match flags {
        0 => {
            node.push(const_expr(d, "offset")?);
            "active"
        },
        1 => "passive",
        2 => {
            d.u32_field(&mut node, "memidx")?;
            node.push(const_expr(d, "offset")?);
            "active"
        },
        _ => return Err(Error::invalid_value(start, "data segment flags", u64::from(flags))),
    };
    let len = d.u32_field(&mut node, "size")?;
    d.bytes_field(&mut node, "init", len as usize)?;
    node.set_description(format!("{}, {} bytes", mode, len));
    Ok(d.finish(node))
}

pub(super) fn decode_data_section(d: &mut Decoder<'_>, record: &mut NodeBuilder, at: &NodePath) -> Result<()> {
    let vector = d.vector("datas", &at.child(record.len()), |d, _, _| data(d))?;
    record.push(vector);
    Ok(())
}

pub(super) fn decode_data_count_section(d: &mut Decoder<'_>, record: &mut NodeBuilder) -> Result<()> {
    d.u32_field(record, "count")?;
    Ok(())
}
