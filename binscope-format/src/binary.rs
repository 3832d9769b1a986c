//! Wire constants for the supported container formats.
//!
//! Magic numbers, record tags and leaf enumeration bytes of the
//! WebAssembly-module container and the Lua 5.3 binary chunk container.

// WebAssembly module

/// Magic bytes for WebAssembly modules: \0asm
pub const WASM_MAGIC: [u8; 4] = [0x00, 0x61, 0x73, 0x6D];

/// WebAssembly binary format version
pub const WASM_VERSION: [u8; 4] = [0x01, 0x00, 0x00, 0x00];

// Section IDs
/// Custom section id
pub const CUSTOM_SECTION_ID: u8 = 0x00;
/// Type section id
pub const TYPE_SECTION_ID: u8 = 0x01;
/// Import section id
pub const IMPORT_SECTION_ID: u8 = 0x02;
/// Function section id
pub const FUNCTION_SECTION_ID: u8 = 0x03;
/// Table section id
pub const TABLE_SECTION_ID: u8 = 0x04;
/// Memory section id
pub const MEMORY_SECTION_ID: u8 = 0x05;
/// Global section id
pub const GLOBAL_SECTION_ID: u8 = 0x06;
/// Export section id
pub const EXPORT_SECTION_ID: u8 = 0x07;
/// Start section id
pub const START_SECTION_ID: u8 = 0x08;
/// Element section id
pub const ELEMENT_SECTION_ID: u8 = 0x09;
/// Code section id
pub const CODE_SECTION_ID: u8 = 0x0A;
/// Data section id
pub const DATA_SECTION_ID: u8 = 0x0B;
/// Data count section id
pub const DATA_COUNT_SECTION_ID: u8 = 0x0C;

// Value types
/// `i32` value type
pub const I32_TYPE: u8 = 0x7F;
/// `i64` value type
pub const I64_TYPE: u8 = 0x7E;
/// `f32` value type
pub const F32_TYPE: u8 = 0x7D;
/// `f64` value type
pub const F64_TYPE: u8 = 0x7C;
/// `v128` value type
pub const V128_TYPE: u8 = 0x7B;
/// `funcref` reference type
pub const FUNCREF_TYPE: u8 = 0x70;
/// `externref` reference type
pub const EXTERNREF_TYPE: u8 = 0x6F;

/// Function type form byte
pub const FUNC_TYPE_FORM: u8 = 0x60;

// External kinds shared by import and export descriptors
/// Function import or export
pub const EXTERNAL_FUNCTION: u8 = 0x00;
/// Table import or export
pub const EXTERNAL_TABLE: u8 = 0x01;
/// Memory import or export
pub const EXTERNAL_MEMORY: u8 = 0x02;
/// Global import or export
pub const EXTERNAL_GLOBAL: u8 = 0x03;

// Limits flags
/// Limits with a minimum only
pub const LIMITS_MIN: u8 = 0x00;
/// Limits with a minimum and a maximum
pub const LIMITS_MIN_MAX: u8 = 0x01;

// Constant expression opcodes
/// `end`
pub const END: u8 = 0x0B;
/// `global.get`
pub const GLOBAL_GET: u8 = 0x23;
/// `i32.const`
pub const I32_CONST: u8 = 0x41;
/// `i64.const`
pub const I64_CONST: u8 = 0x42;
/// `f32.const`
pub const F32_CONST: u8 = 0x43;
/// `f64.const`
pub const F64_CONST: u8 = 0x44;
/// `ref.null`
pub const REF_NULL: u8 = 0xD0;
/// `ref.func`
pub const REF_FUNC: u8 = 0xD2;

/// Element kind byte for `funcref` in legacy element segments
pub const ELEM_KIND_FUNCREF: u8 = 0x00;

// Name section subsections
/// Module name subsection
pub const NAME_MODULE: u8 = 0;
/// Function names subsection
pub const NAME_FUNCTION: u8 = 1;
/// Local names subsection
pub const NAME_LOCAL: u8 = 2;

// Lua 5.3 binary chunk

/// Escape-prefixed signature of a binary chunk: "\x1bLua"
pub const LUA_SIGNATURE: [u8; 4] = [0x1B, b'L', b'u', b'a'];

/// Chunk format version (major * 16 + minor)
pub const LUAC_VERSION: u8 = 0x53;

/// Official chunk format
pub const LUAC_FORMAT: u8 = 0;

/// Conversion-detection bytes following the format byte
pub const LUAC_DATA: [u8; 6] = [0x19, 0x93, b'\r', b'\n', 0x1A, b'\n'];

/// Integer used to check `lua_Integer` endianness and width
pub const LUAC_INT: i64 = 0x5678;

/// Float used to check `lua_Number` format
pub const LUAC_NUM: f64 = 370.5;

// Constant tags
/// `nil` constant
pub const LUA_TNIL: u8 = 0x00;
/// Boolean constant
pub const LUA_TBOOLEAN: u8 = 0x01;
/// Float constant
pub const LUA_TNUMFLT: u8 = 0x03;
/// Integer constant
pub const LUA_TNUMINT: u8 = 0x13;
/// Short string constant
pub const LUA_TSHRSTR: u8 = 0x04;
/// Long string constant
pub const LUA_TLNGSTR: u8 = 0x14;

/// Short-string size byte announcing a following `size_t` length
pub const LUA_LONG_SIZE_MARKER: u8 = 0xFF;
