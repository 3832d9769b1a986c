// Binscope - binscope-error
// Module: Binscope Error Codes
//
// Copyright (c) 2025 The Binscope Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Error codes for binscope

// Parse error codes (1000-1099)
/// Read past the end of the buffer
pub const UNEXPECTED_EOF: u16 = 1000;
/// Variable-length integer exceeds its encoded width
pub const VARINT_OVERFLOW: u16 = 1001;
/// Length-prefixed name is not valid UTF-8
pub const MALFORMED_TEXT: u16 = 1002;
/// Record tag outside the fixed known set
pub const UNKNOWN_RECORD_TAG: u16 = 1003;
/// Container magic number mismatch
pub const INVALID_MAGIC: u16 = 1004;
/// Enumeration byte outside its allowed set
pub const INVALID_VALUE: u16 = 1005;

// Validation error codes (2000-2099)
/// Declared and consumed record sizes disagree
pub const SIZE_MISMATCH: u16 = 2000;
/// Unconsumed bytes after the final record
pub const TRAILING_BYTES: u16 = 2001;

// Resource error codes (3000-3099)
/// Nested records exceed the configured depth
pub const NESTING_TOO_DEEP: u16 = 3000;
/// Vector count exceeds the configured length limit
pub const VECTOR_TOO_LONG: u16 = 3001;
