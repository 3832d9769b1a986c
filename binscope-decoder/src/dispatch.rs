//! Tagged-record dispatch.
//!
//! Each grammar describes its record kinds as a closed enum implementing
//! [`TagTable`]. Looking a tag up either yields a kind, whose rule is then
//! selected by an exhaustive `match`, or fails with `UnknownRecordTag`.
//!
//! [`decode_sized_records`] drives the top-level loop for containers whose
//! records carry a size prefix.

use std::fmt;

use binscope_error::{Error, Result};
use log::debug;

use crate::{
    decoder::Decoder,
    node::{NodeBuilder, NodePath},
};

/// Fixed tag to record-kind table
pub trait TagTable: Sized + Copy + fmt::Debug {
    /// Kind selected by `tag`, if the tag is known
    fn from_tag(tag: u32) -> Option<Self>;
}

/// Look `tag`, read at `offset`, up in the table of `K`.
pub fn dispatch<K: TagTable>(tag: u32, offset: usize) -> Result<K> {
    K::from_tag(tag).ok_or(Error::unknown_tag(offset, tag))
}

/// A grammar of size-prefixed top-level records
pub trait SizedGrammar {
    /// Record kinds of this grammar
    type Kind: TagTable;

    /// Decode the payload of one record into `record`.
    ///
    /// `at` is the path the record node will occupy. The payload ends at
    /// `payload_end`; the caller reconciles the consumed length afterwards.
    fn decode_payload(
        d: &mut Decoder<'_>,
        kind: Self::Kind,
        record: &mut NodeBuilder,
        at: &NodePath,
        payload_end: usize,
    ) -> Result<()>;
}

/// A decoded top-level record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizedRecord<K> {
    /// Record kind
    pub kind: K,
    /// Path of the record node
    pub path: NodePath,
}

/// Decode tag, size and payload records until the buffer is exhausted,
/// pushing one node per record onto `root`.
pub fn decode_sized_records<G: SizedGrammar>(
    d: &mut Decoder<'_>,
    root: &mut NodeBuilder,
) -> Result<Vec<SizedRecord<G::Kind>>> {
    let mut records = Vec::new();
    while !d.at_end() {
        let at = NodePath::root().child(root.len());
        let tag_offset = d.position();
        let mut record = d.begin("record");
        let tag = d.u8_field(&mut record, "id")?;
        let kind: G::Kind = dispatch(u32::from(tag), tag_offset)?;
        let size = d.u32_field(&mut record, "size")?;
        d.cursor().ensure(size as usize)?;
        let p0 = d.position();
        debug!("Record {:?} (id {}) at offset {}, {} bytes", kind, tag, tag_offset, size);

        let payload_end = p0 + size as usize;
        d.bounded(payload_end, |d| G::decode_payload(d, kind, &mut record, &at, payload_end))?;
        d.reconcile(u64::from(size), p0)?;

        root.push(d.finish(record));
        records.push(SizedRecord { kind, path: at });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use binscope_error::ErrorKind;

    use super::*;
    use crate::options::DecodeOptions;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Kind {
        Byte,
        Pair,
    }

    impl TagTable for Kind {
        fn from_tag(tag: u32) -> Option<Self> {
            match tag {
                1 => Some(Self::Byte),
                2 => Some(Self::Pair),
                _ => None,
            }
        }
    }

    struct Toy;

    impl SizedGrammar for Toy {
        type Kind = Kind;

        fn decode_payload(
            d: &mut Decoder<'_>,
            kind: Kind,
            record: &mut NodeBuilder,
            _at: &NodePath,
            _payload_end: usize,
        ) -> Result<()> {
            record.set_name(format!("{:?}", kind));
            d.u8_field(record, "a")?;
            if kind == Kind::Pair {
                d.u8_field(record, "b")?;
            }
            Ok(())
        }
    }

    fn run(bytes: &[u8]) -> Result<(Vec<SizedRecord<Kind>>, crate::node::Node)> {
        let mut d = Decoder::new(bytes, DecodeOptions::default());
        let mut root = d.begin("root");
        let records = decode_sized_records::<Toy>(&mut d, &mut root)?;
        Ok((records, d.finish(root)))
    }

    #[test]
    fn test_records_in_stream_order() {
        let (records, root) = run(&[1, 1, 9, 2, 2, 7, 8]).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].kind, Kind::Pair);
        assert_eq!(records[1].path, NodePath::root().child(1));
        assert_eq!(root.child(1).unwrap().name(), "Pair");
        assert_eq!(root.child(1).unwrap().span(), 3..7);
    }

    #[test]
    fn test_unknown_tag() {
        let error = run(&[1, 1, 9, 5, 0]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UnknownRecordTag { tag: 5 });
        assert_eq!(error.offset(), 3);
    }

    #[test]
    fn test_under_read_is_size_mismatch() {
        let error = run(&[1, 2, 9, 9]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::SizeMismatch { declared: 2, actual: 1 });
    }

    #[test]
    fn test_over_read_does_not_reach_next_record() {
        // Pair declared with 1 byte, followed by a valid Byte record
        let error = run(&[2, 1, 7, 1, 1, 9]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::SizeMismatch { declared: 1, actual: 2 });
        assert_eq!(error.offset(), 3);
    }

    #[test]
    fn test_size_past_end_is_eof() {
        let error = run(&[2, 2, 7]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UnexpectedEof { needed: 2, available: 1 });
    }
}
