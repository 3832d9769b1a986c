//! Property tests for the LEB128 codec and the cursor built on it

use binscope_format::{
    leb128::{
        read_leb128_i32, read_leb128_i64, read_leb128_u32, read_leb128_u64, write_leb128_i32,
        write_leb128_i64, write_leb128_u32, write_leb128_u64,
    },
    Cursor, ErrorKind,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn u32_decodes_what_was_encoded(value: u32) {
        let encoded = write_leb128_u32(value);
        prop_assert!(encoded.len() <= 5);
        prop_assert_eq!(read_leb128_u32(&encoded, 0).unwrap(), (value, encoded.len()));
    }

    #[test]
    fn u64_decodes_what_was_encoded(value: u64) {
        let encoded = write_leb128_u64(value);
        prop_assert_eq!(read_leb128_u64(&encoded, 0).unwrap(), (value, encoded.len()));
    }

    #[test]
    fn i32_decodes_what_was_encoded(value: i32) {
        let encoded = write_leb128_i32(value);
        prop_assert_eq!(read_leb128_i32(&encoded, 0).unwrap(), (value, encoded.len()));
    }

    #[test]
    fn i64_decodes_what_was_encoded(value: i64) {
        let encoded = write_leb128_i64(value);
        prop_assert_eq!(read_leb128_i64(&encoded, 0).unwrap(), (value, encoded.len()));
    }

    #[test]
    fn truncated_encoding_is_eof(value in 128u32..=u32::MAX) {
        let encoded = write_leb128_u32(value);
        let cut = &encoded[..encoded.len() - 1];
        let error = read_leb128_u32(cut, 0).unwrap_err();
        let is_eof = matches!(error.kind(), ErrorKind::UnexpectedEof { .. });
        prop_assert!(is_eof);
    }

    #[test]
    fn cursor_position_tracks_consumed_bytes(values in proptest::collection::vec(any::<u32>(), 0..32)) {
        let mut buffer = Vec::new();
        for value in &values {
            buffer.extend_from_slice(&write_leb128_u32(*value));
        }
        let mut cursor = Cursor::new(&buffer);
        for value in &values {
            prop_assert_eq!(cursor.read_var_u32().unwrap(), *value);
        }
        prop_assert!(cursor.at_end());
        prop_assert_eq!(cursor.position(), buffer.len());
    }
}

#[test]
fn boundary_values_round_trip() {
    for value in [0u32, 127, 128, u32::MAX] {
        let encoded = write_leb128_u32(value);
        let mut cursor = Cursor::new(&encoded);
        assert_eq!(cursor.read_var_u32().unwrap(), value);
        assert_eq!(cursor.remaining(), 0);
    }
}

#[test]
fn overlong_encoding_is_rejected() {
    let overlong = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01];
    let mut cursor = Cursor::new(&overlong);
    let error = cursor.read_var_u64().unwrap_err();
    assert_eq!(error.kind(), ErrorKind::VarintOverflow { max_bytes: 10 });
    assert_eq!(cursor.position(), 0);
}
