//! Lua 5.3 binary chunks

mod common;

use binscope_decoder::{decode, decode_with, DecodeOptions, ErrorKind, Format, Node, Space};
use common::{abc, abx, chunk, hello_proto, k_integer, Proto, OP_CLOSURE, OP_RETURN};

const MAIN: usize = 2;
const CODE: usize = 6;
const CONSTANTS: usize = 7;
const UPVALUES: usize = 8;
const PROTOS: usize = 9;

fn main_function(root: &Node) -> &Node {
    root.child(MAIN).unwrap()
}

#[test]
fn hello_chunk_layout() {
    let bytes = chunk(&hello_proto());
    let file = decode(&bytes).unwrap();
    assert_eq!(file.format(), Format::LuaChunk);

    let root = file.root();
    assert_eq!(root.name(), "binary chunk");
    assert_eq!(root.span(), 0..bytes.len());
    let names: Vec<_> = root.children().iter().map(Node::name).collect();
    assert_eq!(names, ["header", "size_upvalues", "main"]);
    assert_eq!(root.child(0).unwrap().description(), "Lua 5.3");

    let main = main_function(root);
    assert_eq!(main.description(), "<@hello.lua:0,0>");
    assert_eq!(main.child(CODE).unwrap().name(), "code");
    assert_eq!(main.child(CODE).unwrap().description(), "4");
    assert_eq!(main.child(CONSTANTS).unwrap().child(1).unwrap().description(), "\"hi\"");
}

#[test]
fn instructions_are_annotated() {
    let file = decode(&chunk(&hello_proto())).unwrap();
    let code = main_function(file.root()).child(CODE).unwrap();

    let gettabup = code.child(0).unwrap();
    assert_eq!(gettabup.name(), "[1] GETTABUP");
    assert_eq!(gettabup.description(), "0 0 256, upvalue=_ENV, line=1");

    let loadk = code.child(1).unwrap();
    assert_eq!(loadk.name(), "[2] LOADK");
    assert_eq!(loadk.description(), "1 1, k=\"hi\", line=1");

    let call = code.child(2).unwrap();
    assert_eq!(call.name(), "[3] CALL");
    assert_eq!(call.description(), "0 2 1, line=1");
    assert!(file.skipped().is_empty());
}

#[test]
fn upvalues_carry_debug_names() {
    let file = decode(&chunk(&hello_proto())).unwrap();
    let upvalue = main_function(file.root()).child(UPVALUES).unwrap().child(0).unwrap();
    assert_eq!(upvalue.description(), "instack=1, idx=0, name=_ENV");
}

#[test]
fn stripped_chunk_has_no_line_annotations() {
    let mut main = hello_proto();
    main.lines.clear();
    main.upvalue_names.clear();
    let file = decode(&chunk(&main)).unwrap();
    let main_node = main_function(file.root());

    let gettabup = main_node.child(CODE).unwrap().child(0).unwrap();
    assert_eq!(gettabup.description(), "0 0 256, upvalue=#0");
    let upvalue = main_node.child(UPVALUES).unwrap().child(0).unwrap();
    assert_eq!(upvalue.description(), "instack=1, idx=0");
    assert!(file.skipped().is_empty());
}

#[test]
fn closures_resolve_nested_prototypes() {
    let child = Proto { code: vec![abc(OP_RETURN, 0, 1, 0)], ..Proto::default() };
    let main = Proto {
        source: Some("=closures"),
        code: vec![abx(OP_CLOSURE, 0, 0), abx(OP_CLOSURE, 1, 1), abc(OP_RETURN, 0, 1, 0)],
        protos: vec![child],
        ..Proto::default()
    };
    let file = decode(&chunk(&main)).unwrap();
    let main_node = main_function(file.root());

    let nested = main_node.child(PROTOS).unwrap().child(0).unwrap();
    assert_eq!(nested.name(), "proto#0");
    assert_eq!(nested.description(), "<?:0,0>");

    let code = main_node.child(CODE).unwrap();
    assert_eq!(code.child(0).unwrap().description(), "0 0, proto#0");
    assert_eq!(code.child(1).unwrap().description(), "1 1");

    assert_eq!(file.skipped().len(), 1);
    let skipped = &file.skipped()[0];
    assert_eq!(skipped.space, Space::NestedPrototypes);
    assert_eq!(skipped.index, 1);
    assert_eq!(skipped.len, 1);
    assert_eq!(file.root().at_path(&skipped.at).unwrap().name(), "[2] CLOSURE");
}

#[test]
fn prototype_scopes_are_separate() {
    // The nested LOADK refers to its own constant table, not the parent's.
    let child = Proto {
        code: vec![abx(1, 0, 0), abc(OP_RETURN, 0, 1, 0)],
        constants: vec![k_integer(-7)],
        ..Proto::default()
    };
    let mut main = hello_proto();
    main.protos.push(child);
    let file = decode(&chunk(&main)).unwrap();

    let nested = main_function(file.root()).child(PROTOS).unwrap().child(0).unwrap();
    assert_eq!(nested.child(CODE).unwrap().child(0).unwrap().description(), "0 0, k=-7");
    assert_eq!(nested.child(CONSTANTS).unwrap().child(0).unwrap().description(), "-7");
}

#[test]
fn nesting_limit_is_enforced() {
    let main = Proto { protos: vec![Proto::default()], ..Proto::default() };
    let bytes = chunk(&main);
    assert!(decode(&bytes).is_ok());

    let options = DecodeOptions::default().with_max_nesting_depth(1);
    let error = decode_with(&bytes, &options).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NestingTooDeep { limit: 1 });
}

#[test]
fn unknown_constant_tag_is_reported() {
    let main = Proto { constants: vec![vec![0x07]], ..Proto::default() };
    let error = decode(&chunk(&main)).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::UnknownRecordTag { tag: 0x07 });
}

#[test]
fn unknown_opcode_is_reported() {
    let main = Proto { code: vec![50], ..Proto::default() };
    let bytes = chunk(&main);
    let error = decode(&bytes).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::UnknownRecordTag { tag: 50 });
    assert_eq!(&bytes[error.offset()..error.offset() + 4], &50u32.to_le_bytes());
}

#[test]
fn trailing_bytes_are_rejected() {
    let mut bytes = chunk(&hello_proto());
    bytes.push(0x00);
    let error = decode(&bytes).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::TrailingBytes { remaining: 1 });
    assert_eq!(error.offset(), bytes.len() - 1);
}

#[test]
fn truncated_chunk_is_eof() {
    let bytes = chunk(&hello_proto());
    for len in [bytes.len() - 1, 20, 2] {
        let error = decode(&bytes[..len]).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::UnexpectedEof { .. }), "{} bytes gave {}", len, error);
    }
}
