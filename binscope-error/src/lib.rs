// Binscope - binscope-error
// Module: Binscope Error Handling
//
// Copyright (c) 2025 The Binscope Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Binscope error handling library
//!
//! Every failure the decoder can report is a value of [`Error`]: an
//! [`ErrorKind`] classifying what went wrong plus the byte offset at which
//! the decoder noticed it.
//!
//! # Error Categories
//!
//! ## Parse Errors (1000-1099)
//! - Reads past the end of the buffer
//! - Variable-length integers wider than their target type
//! - Names that are not UTF-8
//! - Record tags outside the known set
//! - Out-of-range enumeration bytes and bad magic numbers
//!
//! ## Validation Errors (2000-2099)
//! - Declared record size disagreeing with consumed bytes
//! - Bytes left over after the last record
//!
//! ## Resource Errors (3000-3099)
//! - Nesting depth and vector length limits
//!
//! # Usage
//!
//! ```
//! use binscope_error::{codes, Error, ErrorCategory, ErrorKind};
//!
//! let error = Error::new(ErrorKind::UnknownRecordTag { tag: 0x2a }, 17);
//! assert_eq!(error.category(), ErrorCategory::Parse);
//! assert_eq!(error.code(), codes::UNKNOWN_RECORD_TAG);
//! assert_eq!(error.offset(), 17);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)] // Rule 2
#![warn(clippy::pedantic)]
#![deny(missing_docs)]

/// Error codes for binscope
pub mod codes;
/// Error and error kind types
pub mod errors;

pub use errors::{Error, ErrorCategory, ErrorKind};

/// A specialized `Result` type for binscope operations.
pub type Result<T> = core::result::Result<T, Error>;
