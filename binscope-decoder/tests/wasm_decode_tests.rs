//! Structural decoding of WebAssembly modules

mod common;

use binscope_decoder::{decode, decode_as, DecodeOptions, ErrorKind, Format, Node};
use common::{linked_module, vector, ModuleBuilder};

fn decode_wasm(bytes: &[u8]) -> binscope_decoder::Result<binscope_decoder::DecodedFile> {
    decode_as(bytes, Format::Wasm, &DecodeOptions::default())
}

fn spans_are_nested(node: &Node) -> bool {
    node.children().iter().all(|child| {
        child.span().start >= node.span().start && child.span().end <= node.span().end && spans_are_nested(child)
    })
}

#[test]
fn decoding_is_deterministic() {
    let bytes = linked_module();
    let first = decode(&bytes).unwrap();
    let second = decode(&bytes).unwrap();
    assert_eq!(first.root(), second.root());
    assert_eq!(first.skipped(), second.skipped());
}

#[test]
fn record_spans_cover_the_buffer() {
    let bytes = linked_module();
    let file = decode(&bytes).unwrap();
    let root = file.root();
    assert_eq!(root.span(), 0..bytes.len());
    assert!(spans_are_nested(root));

    // Top-level children tile the buffer with no gaps.
    let mut offset = 0;
    for child in root.children() {
        assert_eq!(child.span().start, offset, "gap before {}", child.name());
        offset = child.span().end;
    }
    assert_eq!(offset, bytes.len());
}

#[test]
fn sections_are_named_by_kind() {
    let file = decode(&linked_module()).unwrap();
    let names: Vec<_> = file.root().children().iter().map(Node::name).collect();
    assert_eq!(
        names,
        [
            "magic",
            "version",
            "type section",
            "import section",
            "function section",
            "export section",
            "code section",
            "custom section: name",
        ]
    );
}

#[test]
fn under_read_payload_is_size_mismatch() {
    // function section declaring 3 bytes whose rule consumes 2
    let mut bytes = ModuleBuilder::new().build();
    bytes.extend_from_slice(&[0x03, 0x03, 0x01, 0x00, 0xFF]);
    let error = decode_wasm(&bytes).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::SizeMismatch { declared: 3, actual: 2 });
}

#[test]
fn over_read_payload_is_size_mismatch() {
    // type section declaring 2 bytes around a 4-byte function type
    let mut bytes = ModuleBuilder::new().build();
    bytes.extend_from_slice(&[0x01, 0x02, 0x01, 0x60, 0x00, 0x00]);
    let error = decode_wasm(&bytes).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::SizeMismatch { declared: 2, actual: 3 });
    assert_eq!(error.offset(), 12);
}

#[test]
fn over_read_stops_before_next_section() {
    // truncated function type in the type section, then a function section
    let mut bytes = ModuleBuilder::new().build();
    bytes.extend_from_slice(&[0x01, 0x02, 0x01, 0x60]);
    bytes.extend_from_slice(&[0x03, 0x02, 0x01, 0x00]);
    let error = decode_wasm(&bytes).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::SizeMismatch { declared: 2, actual: 3 });
    assert_eq!(error.offset(), 12);

    // same record as the last one in the buffer
    let error = decode_wasm(&bytes[..12]).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::SizeMismatch { declared: 2, actual: 3 });
}

#[test]
fn over_read_code_body_is_size_mismatch() {
    // body declares 1 byte but its locals vector needs more
    let bytes = ModuleBuilder::new().section(0x0A, &[0x01, 0x01, 0x01, 0x01, 0x7F, 0x0B]).build();
    let error = decode_wasm(&bytes).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::SizeMismatch { declared: 1, actual: 2 });
    assert_eq!(error.offset(), 13);
}

#[test]
fn truncated_module_is_eof() {
    let bytes = linked_module();
    for cut in [1, bytes.len()] {
        let error = decode_wasm(&bytes[..bytes.len() - cut]).unwrap_err();
        assert!(
            matches!(error.kind(), ErrorKind::UnexpectedEof { .. }),
            "cutting {} bytes gave {}",
            cut,
            error
        );
    }
    let error = decode(&bytes[..0]).unwrap_err();
    assert!(matches!(error.kind(), ErrorKind::UnexpectedEof { .. }));
}

#[test]
fn unknown_section_id_is_reported() {
    let bytes = ModuleBuilder::new().section(0x20, &[]).build();
    let error = decode_wasm(&bytes).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::UnknownRecordTag { tag: 0x20 });
    assert_eq!(error.offset(), 8);
}

#[test]
fn unknown_custom_sections_are_kept_opaque() {
    let payload = [0xDE, 0xAD, 0xBE, 0xEF];
    let bytes = ModuleBuilder::new().custom("producers", &payload).build();
    let file = decode_wasm(&bytes).unwrap();
    let section = file.root().find("custom section: producers").unwrap();
    let contents = section.find("contents").unwrap();
    assert_eq!(contents.description(), hex::encode(payload));
    assert_eq!(contents.span(), bytes.len() - payload.len()..bytes.len());
}

#[test]
fn oversized_vector_is_rejected_before_decoding() {
    let bytes = ModuleBuilder::new().section(0x03, &vector(&[vec![0x00], vec![0x00], vec![0x00]])).build();
    let options = DecodeOptions::default().with_max_vector_len(2);
    let error = decode_as(&bytes, Format::Wasm, &options).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::VectorTooLong { count: 3, limit: 2 });
}

#[test]
fn module_built_from_text() {
    let bytes = wat::parse_str(
        r#"
        (module
          (memory 1 2)
          (global $g (mut i32) (i32.const 7))
          (func $add (export "add") (param i32 i32) (result i32)
            local.get 0
            local.get 1
            i32.add)
          (start $init)
          (func $init))
        "#,
    )
    .unwrap();
    let file = decode(&bytes).unwrap();
    let root = file.root();

    let types = root.find("type section").unwrap().find("types").unwrap();
    assert_eq!(types.child(0).unwrap().name(), "#0");
    assert_eq!(types.child(0).unwrap().description(), "(i32,i32)->(i32)");

    let memory = root.find("memory section").unwrap().find("memories").unwrap().child(0).unwrap();
    assert_eq!(memory.name(), "memory#0");
    assert_eq!(memory.description(), "min=1,max=2");

    let global = root.find("global section").unwrap().find("globals").unwrap().child(0).unwrap();
    assert_eq!(global.name(), "global#0");
    assert_eq!(global.find("init").unwrap().description(), "i32.const 7");

    let start = root.find("start section").unwrap().find("funcidx").unwrap();
    assert_eq!(start.description(), "func#1");

    let codes = root.find("code section").unwrap().find("codes").unwrap();
    assert_eq!(codes.child(0).unwrap().name(), "func#0");
    assert_eq!(codes.child(0).unwrap().description(), "add");
    assert_eq!(codes.child(1).unwrap().name(), "func#1");

    let functions = root.find("function section").unwrap().find("functions").unwrap();
    assert!(functions.child(0).unwrap().description().contains("name=add"));
    assert!(functions.child(1).unwrap().description().contains("name=init"));
    assert!(file.skipped().is_empty());
}
