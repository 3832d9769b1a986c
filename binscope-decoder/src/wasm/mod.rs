//! WebAssembly module grammar.
//!
//! A module is the `\0asm` magic, a version word and a stream of
//! size-prefixed sections. Section ids select the decode rule through
//! [`SectionKind`]; id 0 is the custom section, whose payload is further
//! dispatched on its name.

mod custom;
mod link;
mod sections;
mod types;

use binscope_error::{Error, ErrorKind, Result};
use binscope_format::binary::{WASM_MAGIC, WASM_VERSION};

use crate::{
    decoder::{blob_preview, Decoder},
    detect::Format,
    dispatch::{decode_sized_records, SizedGrammar, SizedRecord, TagTable},
    file::Container,
    link::{LinkContext, LinkStage},
    node::{Node, NodeBuilder, NodePath},
};

/// Section kinds by id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// id 0
    Custom,
    /// id 1
    Type,
    /// id 2
    Import,
    /// id 3
    Function,
    /// id 4
    Table,
    /// id 5
    Memory,
    /// id 6
    Global,
    /// id 7
    Export,
    /// id 8
    Start,
    /// id 9
    Element,
    /// id 10
    Code,
    /// id 11
    Data,
    /// id 12
    DataCount,
}

impl TagTable for SectionKind {
    fn from_tag(tag: u32) -> Option<Self> {
        let kind = match tag {
            0 => Self::Custom,
            1 => Self::Type,
            2 => Self::Import,
            3 => Self::Function,
            4 => Self::Table,
            5 => Self::Memory,
            6 => Self::Global,
            7 => Self::Export,
            8 => Self::Start,
            9 => Self::Element,
            10 => Self::Code,
            11 => Self::Data,
            12 => Self::DataCount,
            _ => return None,
        };
        Some(kind)
    }
}

impl SectionKind {
    /// Node name of a section of this kind; custom sections append their
    /// own name.
    pub fn title(self) -> &'static str {
        match self {
            Self::Custom => "custom section",
            Self::Type => "type section",
            Self::Import => "import section",
            Self::Function => "function section",
            Self::Table => "table section",
            Self::Memory => "memory section",
            Self::Global => "global section",
            Self::Export => "export section",
            Self::Start => "start section",
            Self::Element => "element section",
            Self::Code => "code section",
            Self::Data => "data section",
            Self::DataCount => "data count section",
        }
    }
}

/// The WebAssembly module container
#[derive(Debug, Clone, Copy)]
pub struct WasmModule;

impl SizedGrammar for WasmModule {
    type Kind = SectionKind;

    fn decode_payload(
        d: &mut Decoder<'_>,
        kind: SectionKind,
        record: &mut NodeBuilder,
        at: &NodePath,
        payload_end: usize,
    ) -> Result<()> {
        record.set_name(kind.title());
        match kind {
            SectionKind::Custom => custom::decode_custom_section(d, record, at, payload_end),
            SectionKind::Type => sections::decode_type_section(d, record, at),
            SectionKind::Import => sections::decode_import_section(d, record, at),
            SectionKind::Function => sections::decode_function_section(d, record, at),
            SectionKind::Table => sections::decode_table_section(d, record, at),
            SectionKind::Memory => sections::decode_memory_section(d, record, at),
            SectionKind::Global => sections::decode_global_section(d, record, at),
            SectionKind::Export => sections::decode_export_section(d, record, at),
            SectionKind::Start => sections::decode_start_section(d, record, at),
            SectionKind::Element => sections::decode_element_section(d, record, at),
            SectionKind::Code => sections::decode_code_section(d, record, at),
            SectionKind::Data => sections::decode_data_section(d, record, at),
            SectionKind::DataCount => sections::decode_data_count_section(d, record),
        }
    }
}

impl Container for WasmModule {
    const FORMAT: Format = Format::Wasm;
    const ROOT_NAME: &'static str = "wasm module";

    type Record = SizedRecord<SectionKind>;

    fn decode_records(d: &mut Decoder<'_>, root: &mut NodeBuilder) -> Result<Vec<Self::Record>> {
        decode_preamble(d, root)?;
        decode_sized_records::<Self>(d, root)
    }

    fn link(stage: LinkStage, records: &[Self::Record], root: &mut Node, ctx: &mut LinkContext<'_>) {
        link::link_module(stage, records, root, ctx);
    }
}

fn decode_preamble(d: &mut Decoder<'_>, root: &mut NodeBuilder) -> Result<()> {
    let start = d.position();
    let magic = d.cursor().read_bytes(WASM_MAGIC.len())?;
    if magic != WASM_MAGIC {
        return Err(Error::new(ErrorKind::InvalidMagic, start));
    }
    root.push(d.leaf_from("magic", blob_preview(magic), start));

    let start = d.position();
    let version = d.cursor().read_u32_le()?;
    if version != u32::from_le_bytes(WASM_VERSION) {
        return Err(Error::invalid_value(start, "version", u64::from(version)));
    }
    root.push(d.leaf_from("version", version.to_string(), start));
    Ok(())
}
