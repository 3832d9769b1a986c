// Binscope - binscope-error
// Module: Binscope Error Types
//
// Copyright (c) 2025 The Binscope Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Error, kind and category types shared by every binscope crate.

use core::fmt;

use crate::codes;

/// `Error` categories for binscope operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCategory {
    /// The bytes do not follow the grammar
    Parse      = 1,
    /// The bytes parse but contradict themselves
    Validation = 2,
    /// A configured decode limit was exceeded
    Resource   = 3,
}

/// Classification of a decode failure.
///
/// Kinds carry only plain data so that the crate stays usable without an
/// allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A read needed more bytes than the buffer holds
    UnexpectedEof {
        /// Bytes the read required
        needed:    usize,
        /// Bytes left in the buffer
        available: usize,
    },
    /// A variable-length integer used more continuation bytes than its
    /// target width allows
    VarintOverflow {
        /// Maximum encoded length for the target width
        max_bytes: usize,
    },
    /// A length-prefixed name is not valid UTF-8
    MalformedText,
    /// A record tag has no rule in the dispatch table
    UnknownRecordTag {
        /// The offending tag value
        tag: u32,
    },
    /// A size-prefixed record consumed a different number of bytes than it
    /// declared
    SizeMismatch {
        /// Declared payload length
        declared: u64,
        /// Bytes the payload rule actually consumed
        actual:   u64,
    },
    /// The container does not start with the expected signature
    InvalidMagic,
    /// A leaf enumeration byte is outside its allowed set
    InvalidValue {
        /// What was being decoded
        what:  &'static str,
        /// The raw value found
        value: u64,
    },
    /// Bytes remain after the container's final record
    TrailingBytes {
        /// Number of unconsumed bytes
        remaining: usize,
    },
    /// Nested records exceed the configured depth
    NestingTooDeep {
        /// Configured limit
        limit: usize,
    },
    /// A vector declares more elements than the configured limit
    VectorTooLong {
        /// Declared element count
        count: u64,
        /// Configured limit
        limit: u64,
    },
}

impl ErrorKind {
    /// Category this kind belongs to
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::UnexpectedEof { .. }
            | Self::VarintOverflow { .. }
            | Self::MalformedText
            | Self::UnknownRecordTag { .. }
            | Self::InvalidMagic
            | Self::InvalidValue { .. } => ErrorCategory::Parse,
            Self::SizeMismatch { .. } | Self::TrailingBytes { .. } => ErrorCategory::Validation,
            Self::NestingTooDeep { .. } | Self::VectorTooLong { .. } => ErrorCategory::Resource,
        }
    }

    /// Numeric code from [`crate::codes`]
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::UnexpectedEof { .. } => codes::UNEXPECTED_EOF,
            Self::VarintOverflow { .. } => codes::VARINT_OVERFLOW,
            Self::MalformedText => codes::MALFORMED_TEXT,
            Self::UnknownRecordTag { .. } => codes::UNKNOWN_RECORD_TAG,
            Self::SizeMismatch { .. } => codes::SIZE_MISMATCH,
            Self::InvalidMagic => codes::INVALID_MAGIC,
            Self::InvalidValue { .. } => codes::INVALID_VALUE,
            Self::TrailingBytes { .. } => codes::TRAILING_BYTES,
            Self::NestingTooDeep { .. } => codes::NESTING_TOO_DEEP,
            Self::VectorTooLong { .. } => codes::VECTOR_TOO_LONG,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof { needed, available } => write!(
                f,
                "Unexpected end of data: needed {} bytes, only {} available",
                needed, available
            ),
            Self::VarintOverflow { max_bytes } => {
                write!(f, "LEB128 integer longer than {} bytes", max_bytes)
            },
            Self::MalformedText => write!(f, "Name is not valid UTF-8"),
            Self::UnknownRecordTag { tag } => write!(f, "Unknown record tag: 0x{:02x}", tag),
            Self::SizeMismatch { declared, actual } => write!(
                f,
                "Record size mismatch: declared {} bytes, consumed {}",
                declared, actual
            ),
            Self::InvalidMagic => write!(f, "Invalid container magic"),
            Self::InvalidValue { what, value } => {
                write!(f, "Invalid {}: 0x{:02x}", what, value)
            },
            Self::TrailingBytes { remaining } => {
                write!(f, "{} trailing bytes after final record", remaining)
            },
            Self::NestingTooDeep { limit } => {
                write!(f, "Records nested deeper than {}", limit)
            },
            Self::VectorTooLong { count, limit } => {
                write!(f, "Vector of {} elements exceeds limit {}", count, limit)
            },
        }
    }
}

/// Binscope `Error` type
///
/// A decode failure: what went wrong and where. Decoding is all-or-nothing,
/// so the error is the only thing a failed decode returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Error {
    kind:   ErrorKind,
    offset: usize,
}

impl Error {
    /// Create a new error at the given byte offset.
    #[must_use]
    pub const fn new(kind: ErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    /// Create an `UnexpectedEof` error
    #[must_use]
    pub const fn unexpected_eof(offset: usize, needed: usize, available: usize) -> Self {
        Self::new(ErrorKind::UnexpectedEof { needed, available }, offset)
    }

    /// Create an `UnknownRecordTag` error
    #[must_use]
    pub const fn unknown_tag(offset: usize, tag: u32) -> Self {
        Self::new(ErrorKind::UnknownRecordTag { tag }, offset)
    }

    /// Create an `InvalidValue` error
    #[must_use]
    pub const fn invalid_value(offset: usize, what: &'static str, value: u64) -> Self {
        Self::new(ErrorKind::InvalidValue { what, value }, offset)
    }

    /// What went wrong
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Byte offset at which the failure was detected
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Error category
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Error code
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.kind.code()
    }

    /// Check if this is a parse error
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        self.category() == ErrorCategory::Parse
    }

    /// Check if this is a validation error
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        self.category() == ErrorCategory::Validation
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}][E{:04}] {} at offset 0x{:x}", self.category(), self.code(), self.kind, self.offset)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
