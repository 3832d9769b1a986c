//! Byte builders shared by the integration tests
#![allow(dead_code)]

use binscope_format::{
    binary::{LUAC_DATA, LUA_SIGNATURE, WASM_MAGIC, WASM_VERSION},
    leb128::write_leb128_u32,
};

// WebAssembly

/// Length-prefixed UTF-8 name
pub fn name(text: &str) -> Vec<u8> {
    let mut bytes = write_leb128_u32(text.len() as u32);
    bytes.extend_from_slice(text.as_bytes());
    bytes
}

/// Count-prefixed vector of pre-encoded elements
pub fn vector(items: &[Vec<u8>]) -> Vec<u8> {
    let mut bytes = write_leb128_u32(items.len() as u32);
    for item in items {
        bytes.extend_from_slice(item);
    }
    bytes
}

/// Function import `module.field` with signature `typeidx`
pub fn func_import(module: &str, field: &str, typeidx: u32) -> Vec<u8> {
    let mut bytes = name(module);
    bytes.extend(name(field));
    bytes.push(0x00);
    bytes.extend(write_leb128_u32(typeidx));
    bytes
}

/// Export of kind `kind` at `index`
pub fn export(field: &str, kind: u8, index: u32) -> Vec<u8> {
    let mut bytes = name(field);
    bytes.push(kind);
    bytes.extend(write_leb128_u32(index));
    bytes
}

/// Function body with no locals and an empty expression
pub fn empty_body() -> Vec<u8> {
    vec![0x02, 0x00, 0x0B]
}

/// `name` custom payload holding one function-name subsection
pub fn function_names(names: &[(u32, &str)]) -> Vec<u8> {
    let entries: Vec<Vec<u8>> = names
        .iter()
        .map(|(idx, text)| {
            let mut entry = write_leb128_u32(*idx);
            entry.extend(name(text));
            entry
        })
        .collect();
    let subsection = vector(&entries);
    let mut bytes = vec![0x01];
    bytes.extend(write_leb128_u32(subsection.len() as u32));
    bytes.extend(subsection);
    bytes
}

/// Module assembled section by section
pub struct ModuleBuilder {
    bytes: Vec<u8>,
}

impl ModuleBuilder {
    pub fn new() -> Self {
        let mut bytes = WASM_MAGIC.to_vec();
        bytes.extend_from_slice(&WASM_VERSION);
        Self { bytes }
    }

    pub fn section(mut self, id: u8, payload: &[u8]) -> Self {
        self.bytes.push(id);
        self.bytes.extend(write_leb128_u32(payload.len() as u32));
        self.bytes.extend_from_slice(payload);
        self
    }

    pub fn custom(self, section_name: &str, payload: &[u8]) -> Self {
        let mut body = name(section_name);
        body.extend_from_slice(payload);
        self.section(0x00, &body)
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// Two imported functions, one declared function exported as `run`, its
/// body, and a name table mapping 2 to `foo` and 99 to `bar`.
pub fn linked_module() -> Vec<u8> {
    ModuleBuilder::new()
        .section(0x01, &vector(&[vec![0x60, 0x00, 0x00]]))
        .section(0x02, &vector(&[func_import("env", "a", 0), func_import("env", "b", 0)]))
        .section(0x03, &vector(&[vec![0x00]]))
        .section(0x07, &vector(&[export("run", 0x00, 2)]))
        .section(0x0A, &vector(&[empty_body()]))
        .custom("name", &function_names(&[(2, "foo"), (99, "bar")]))
        .build()
}

// Lua 5.3 chunks

pub const OP_MOVE: u32 = 0;
pub const OP_LOADK: u32 = 1;
pub const OP_GETTABUP: u32 = 6;
pub const OP_CALL: u32 = 36;
pub const OP_RETURN: u32 = 38;
pub const OP_CLOSURE: u32 = 44;

pub fn abc(op: u32, a: u32, b: u32, c: u32) -> u32 {
    op | (a << 6) | (c << 14) | (b << 23)
}

pub fn abx(op: u32, a: u32, bx: u32) -> u32 {
    op | (a << 6) | (bx << 14)
}

/// Standard 64-bit chunk header
pub fn lua_header() -> Vec<u8> {
    let mut bytes = LUA_SIGNATURE.to_vec();
    bytes.extend_from_slice(&[0x53, 0x00]);
    bytes.extend_from_slice(&LUAC_DATA);
    bytes.extend_from_slice(&[4, 8, 4, 8, 8]);
    bytes.extend_from_slice(&0x5678i64.to_le_bytes());
    bytes.extend_from_slice(&370.5f64.to_le_bytes());
    bytes
}

fn int(value: u32) -> Vec<u8> {
    value.to_le_bytes().to_vec()
}

/// Short string, or the null string for `None`
pub fn lua_str(text: Option<&str>) -> Vec<u8> {
    match text {
        None => vec![0x00],
        Some(text) => {
            let mut bytes = vec![(text.len() + 1) as u8];
            bytes.extend_from_slice(text.as_bytes());
            bytes
        },
    }
}

pub fn k_string(text: &str) -> Vec<u8> {
    let mut bytes = vec![0x04];
    bytes.extend(lua_str(Some(text)));
    bytes
}

pub fn k_integer(value: i64) -> Vec<u8> {
    let mut bytes = vec![0x13];
    bytes.extend_from_slice(&value.to_le_bytes());
    bytes
}

/// A function prototype to encode
#[derive(Default)]
pub struct Proto {
    pub source:        Option<&'static str>,
    pub code:          Vec<u32>,
    pub constants:     Vec<Vec<u8>>,
    pub upvalues:      Vec<(u8, u8)>,
    pub protos:        Vec<Proto>,
    pub lines:         Vec<u32>,
    pub upvalue_names: Vec<&'static str>,
}

impl Proto {
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = lua_str(self.source);
        bytes.extend(int(0)); // lineDefined
        bytes.extend(int(0)); // lastLineDefined
        bytes.extend_from_slice(&[0, 1, 2]);
        bytes.extend(int(self.code.len() as u32));
        for word in &self.code {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        bytes.extend(int(self.constants.len() as u32));
        for constant in &self.constants {
            bytes.extend_from_slice(constant);
        }
        bytes.extend(int(self.upvalues.len() as u32));
        for (instack, idx) in &self.upvalues {
            bytes.extend_from_slice(&[*instack, *idx]);
        }
        bytes.extend(int(self.protos.len() as u32));
        for proto in &self.protos {
            bytes.extend(proto.encode());
        }
        bytes.extend(int(self.lines.len() as u32));
        for line in &self.lines {
            bytes.extend(int(*line));
        }
        bytes.extend(int(0)); // locvars
        bytes.extend(int(self.upvalue_names.len() as u32));
        for upvalue in &self.upvalue_names {
            bytes.extend(lua_str(Some(upvalue)));
        }
        bytes
    }
}

/// Chunk with `main` as its main function
pub fn chunk(main: &Proto) -> Vec<u8> {
    let mut bytes = lua_header();
    bytes.push(main.upvalues.len() as u8);
    bytes.extend(main.encode());
    bytes
}

/// `print("hi")` as compiled by luac 5.3
pub fn hello_proto() -> Proto {
    Proto {
        source: Some("@hello.lua"),
        code: vec![
            abc(OP_GETTABUP, 0, 0, 0x100),
            abx(OP_LOADK, 1, 1),
            abc(OP_CALL, 0, 2, 1),
            abc(OP_RETURN, 0, 1, 0),
        ],
        constants: vec![k_string("print"), k_string("hi")],
        upvalues: vec![(1, 0)],
        lines: vec![1, 1, 1, 1],
        upvalue_names: vec!["_ENV"],
        ..Proto::default()
    }
}
