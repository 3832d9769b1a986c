//! Decode configuration.

/// How structured payloads of extension records are treated when their
/// sub-grammar fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadPolicy {
    /// Fall back to an opaque byte blob for the rest of the record
    #[default]
    Lenient,
    /// Propagate the sub-grammar failure
    Strict,
}

/// How the link pass treats cross-references that point outside their
/// index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum ReferencePolicy {
    /// Leave the referring node unannotated and report the reference in
    /// [`crate::DecodedFile::skipped`]
    #[default]
    SkipOnOutOfRange,
}

/// Default nesting limit for recursive records
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 200;

/// Default limit for a single vector's declared element count
pub const DEFAULT_MAX_VECTOR_LEN: u64 = 1 << 24;

/// Options for a single decode call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Extension payload handling
    pub payload_policy:    PayloadPolicy,
    /// Out-of-range cross-reference handling
    pub reference_policy:  ReferencePolicy,
    /// Maximum depth of nested records
    pub max_nesting_depth: usize,
    /// Maximum declared element count of any vector
    pub max_vector_len:    u64,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            payload_policy:    PayloadPolicy::default(),
            reference_policy:  ReferencePolicy::default(),
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            max_vector_len:    DEFAULT_MAX_VECTOR_LEN,
        }
    }
}

impl DecodeOptions {
    /// Options that reject malformed extension payloads
    #[must_use]
    pub fn strict() -> Self {
        Self::default().with_payload_policy(PayloadPolicy::Strict)
    }

    /// Set the extension payload policy.
    #[must_use]
    pub fn with_payload_policy(mut self, policy: PayloadPolicy) -> Self {
        self.payload_policy = policy;
        self
    }

    /// Set the nesting limit.
    #[must_use]
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Set the vector length limit.
    #[must_use]
    pub fn with_max_vector_len(mut self, len: u64) -> Self {
        self.max_vector_len = len;
        self
    }
}
