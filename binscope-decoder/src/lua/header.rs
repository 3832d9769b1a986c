//! Binary chunk header.
//!
//! The header fixes the integer widths every later field is read with, so
//! it is decoded into a [`ChunkLayout`] that the prototype decoder carries.

use binscope_error::{Error, ErrorKind, Result};
use binscope_format::binary::{LUAC_DATA, LUAC_FORMAT, LUAC_INT, LUAC_NUM, LUAC_VERSION, LUA_SIGNATURE};

use crate::{
    decoder::{blob_preview, Decoder},
    node::NodeBuilder,
};

/// Instruction width this decoder understands
const INSTRUCTION_SIZE: usize = 4;

/// Field widths declared by a chunk header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLayout {
    /// Width of a C `int`
    pub int_size:         usize,
    /// Width of a C `size_t`
    pub size_t_size:      usize,
    /// Width of an instruction
    pub instruction_size: usize,
    /// Width of a `lua_Integer`
    pub integer_size:     usize,
    /// Width of a `lua_Number`
    pub number_size:      usize,
}

impl Default for ChunkLayout {
    fn default() -> Self {
        Self { int_size: 4, size_t_size: 8, instruction_size: 4, integer_size: 8, number_size: 8 }
    }
}

fn size_field(d: &mut Decoder<'_>, header: &mut NodeBuilder, name: &str, what: &'static str) -> Result<usize> {
    let start = d.position();
    let size = d.u8_field(header, name)?;
    if !(1..=8).contains(&size) {
        return Err(Error::invalid_value(start, what, u64::from(size)));
    }
    Ok(usize::from(size))
}

/// Read a `lua_Number` of the declared width.
pub fn read_number(d: &mut Decoder<'_>, layout: &ChunkLayout) -> Result<f64> {
    if layout.number_size == 4 {
        d.cursor().read_f32().map(f64::from)
    } else {
        d.cursor().read_f64()
    }
}

/// Read a `lua_Integer` of the declared width, sign-extended.
pub fn read_integer(d: &mut Decoder<'_>, layout: &ChunkLayout) -> Result<i64> {
    let raw = d.cursor().read_fixed(layout.integer_size)?;
    let shift = 64 - 8 * layout.integer_size as u32;
    Ok(((raw << shift) as i64) >> shift)
}

/// Decode the header into a node pushed onto `root`.
pub fn decode_header(d: &mut Decoder<'_>, root: &mut NodeBuilder) -> Result<ChunkLayout> {
    let mut header = d.begin("header");

    let start = d.position();
    let signature = d.cursor().read_bytes(LUA_SIGNATURE.len())?;
    if signature != LUA_SIGNATURE {
        return Err(Error::new(ErrorKind::InvalidMagic, start));
    }
    header.push(d.leaf_from("signature", blob_preview(signature), start));

    let start = d.position();
    let version = d.u8_field(&mut header, "version")?;
    if version != LUAC_VERSION {
        return Err(Error::invalid_value(start, "chunk version", u64::from(version)));
    }
    let start = d.position();
    let format = d.u8_field(&mut header, "format")?;
    if format != LUAC_FORMAT {
        return Err(Error::invalid_value(start, "chunk format", u64::from(format)));
    }

    let start = d.position();
    let data = d.bytes_field(&mut header, "luacData", LUAC_DATA.len())?;
    if data != LUAC_DATA {
        return Err(Error::new(ErrorKind::InvalidMagic, start));
    }

    let sizes_at = d.position();
    let layout = ChunkLayout {
        int_size:         size_field(d, &mut header, "cintSize", "int size")?,
        size_t_size:      size_field(d, &mut header, "sizetSize", "size_t size")?,
        instruction_size: size_field(d, &mut header, "instructionSize", "instruction size")?,
        integer_size:     size_field(d, &mut header, "luaIntegerSize", "lua_Integer size")?,
        number_size:      size_field(d, &mut header, "luaNumberSize", "lua_Number size")?,
    };
    if layout.instruction_size != INSTRUCTION_SIZE {
        return Err(Error::invalid_value(sizes_at + 2, "instruction size", layout.instruction_size as u64));
    }
    if layout.number_size != 4 && layout.number_size != 8 {
        return Err(Error::invalid_value(sizes_at + 4, "lua_Number size", layout.number_size as u64));
    }

    let start = d.position();
    let luac_int = read_integer(d, &layout)?;
    if luac_int != LUAC_INT {
        return Err(Error::invalid_value(start, "LUAC_INT", luac_int as u64));
    }
    header.push(d.leaf_from("luacInt", format!("0x{:x}", luac_int), start));

    let start = d.position();
    let luac_num = read_number(d, &layout)?;
    if luac_num.to_bits() != LUAC_NUM.to_bits() {
        return Err(Error::invalid_value(start, "LUAC_NUM", luac_num.to_bits()));
    }
    header.push(d.leaf_from("luacNum", luac_num.to_string(), start));

    header.set_description(format!("Lua {}.{}", version >> 4, version & 0x0F));
    root.push(d.finish(header));
    Ok(layout)
}
