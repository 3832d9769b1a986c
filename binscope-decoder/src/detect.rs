//! Container format detection by signature.

use std::fmt;

use binscope_format::binary::{LUA_SIGNATURE, WASM_MAGIC};

/// Supported container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// WebAssembly binary module
    Wasm,
    /// Lua 5.3 precompiled chunk
    LuaChunk,
}

impl Format {
    /// Every supported format
    pub const ALL: [Format; 2] = [Format::Wasm, Format::LuaChunk];

    /// Short human-readable name
    pub fn name(self) -> &'static str {
        match self {
            Format::Wasm => "wasm",
            Format::LuaChunk => "luac",
        }
    }

    /// Signature every buffer of this format starts with
    pub fn signature(self) -> &'static [u8] {
        match self {
            Format::Wasm => &WASM_MAGIC,
            Format::LuaChunk => &LUA_SIGNATURE,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Detect the format of `bytes` from its signature.
pub fn detect_format(bytes: &[u8]) -> Option<Format> {
    Format::ALL.into_iter().find(|format| bytes.starts_with(format.signature()))
}

/// True if `bytes` is a strict prefix of some format's signature, that is
/// a buffer cut off before its signature was complete.
pub(crate) fn is_truncated_signature(bytes: &[u8]) -> bool {
    Format::ALL
        .into_iter()
        .any(|format| bytes.len() < format.signature().len() && format.signature().starts_with(bytes))
}
