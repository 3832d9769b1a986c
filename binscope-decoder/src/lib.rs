// Binscope - binscope-decoder
// Module: Container Decoder
//
// Copyright (c) 2025 The Binscope Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![forbid(unsafe_code)] // Rule 2

//! Tag-dispatched binary container decoder
//!
//! Turns a byte buffer into a tree of [`Node`]s, each with a name, a
//! description and the byte range it was decoded from.
//!
//! Decoding runs in two phases. Phase 1 walks the records in stream order:
//! a tag selects the decode rule, size-prefixed records are reconciled
//! against their declared length and entities that other records refer to
//! are appended to a [`Registry`] of index spaces. Phase 2 runs once the
//! whole buffer is decoded and uses the registry to label index space
//! members and to annotate nodes decoded earlier with information that only
//! appears later, such as function names or export names.
//!
//! Decoding is all-or-nothing: the first error aborts the decode and is
//! returned with the byte offset it was detected at. Out-of-range
//! cross-references are not errors; they are left unannotated and listed in
//! [`DecodedFile::skipped`].
//!
//! # Formats
//!
//! - [`wasm::WasmModule`]: WebAssembly modules, size-prefixed sections
//! - [`lua::LuaChunk`]: Lua 5.3 binary chunks, nested records
//!
//! # Example
//!
//! ```
//! use binscope_decoder::{decode, Format};
//!
//! let file = decode(b"\0asm\x01\0\0\0").unwrap();
//! assert_eq!(file.format(), Format::Wasm);
//! assert_eq!(file.root().children().len(), 2);
//! ```

#![warn(clippy::missing_panics_doc)]

pub mod decoder;
pub mod detect;
pub mod dispatch;
pub mod file;
pub mod link;
pub mod lua;
pub mod node;
pub mod options;
pub mod registry;
pub mod wasm;

pub use binscope_error::{codes, Error, ErrorCategory, ErrorKind, Result};
pub use detect::{detect_format, Format};
pub use file::{decode_container, Container, DecodedFile};
pub use link::{LinkStage, SkippedReference};
pub use node::{Node, NodePath};
pub use options::{DecodeOptions, PayloadPolicy, ReferencePolicy};
pub use registry::{Entity, IndexSpace, Origin, Registry, Space, SpaceKey};

/// Detect the format of `bytes` and decode it with default options.
pub fn decode(bytes: &[u8]) -> Result<DecodedFile> {
    decode_with(bytes, &DecodeOptions::default())
}

/// Detect the format of `bytes` and decode it with `options`.
pub fn decode_with(bytes: &[u8], options: &DecodeOptions) -> Result<DecodedFile> {
    match detect_format(bytes) {
        Some(format) => decode_as(bytes, format, options),
        None if detect::is_truncated_signature(bytes) => {
            Err(Error::unexpected_eof(0, Format::Wasm.signature().len(), bytes.len()))
        },
        None => Err(Error::new(ErrorKind::InvalidMagic, 0)),
    }
}

/// Decode `bytes` as `format`, skipping detection.
pub fn decode_as(bytes: &[u8], format: Format, options: &DecodeOptions) -> Result<DecodedFile> {
    log::debug!("Decoding {} bytes as {}", bytes.len(), format);
    match format {
        Format::Wasm => decode_container::<wasm::WasmModule>(bytes, options),
        Format::LuaChunk => decode_container::<lua::LuaChunk>(bytes, options),
    }
}
