// Binscope - binscope-format
// Module: Binary Primitives
//
// Copyright (c) 2025 The Binscope Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![forbid(unsafe_code)] // Rule 2

//! Binary primitives for binscope
//!
//! This crate holds everything below the node tree: a bounded read head
//! over an immutable buffer ([`Cursor`]), the LEB128 variable-length integer
//! codec ([`leb128`]) and the wire constants of the supported container
//! formats ([`binary`]).
//!
//! It never allocates while reading, so it works in `no_std` environments;
//! the LEB128 writers need `alloc`.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

pub mod binary;
pub mod cursor;
pub mod leb128;

pub use binscope_error::{Error, ErrorKind, Result};
pub use cursor::Cursor;
