//! Leaf decoders for WebAssembly types and constant expressions.

use binscope_error::{Error, Result};
use binscope_format::binary::{
    END, EXTERNREF_TYPE, F32_CONST, F32_TYPE, F64_CONST, F64_TYPE, FUNCREF_TYPE, FUNC_TYPE_FORM,
    GLOBAL_GET, I32_CONST, I32_TYPE, I64_CONST, I64_TYPE, LIMITS_MIN, LIMITS_MIN_MAX, REF_FUNC,
    REF_NULL, V128_TYPE,
};

use crate::{
    decoder::Decoder,
    node::{Node, NodePath},
};

fn value_type_name(byte: u8) -> Option<&'static str> {
    match byte {
        I32_TYPE => Some("i32"),
        I64_TYPE => Some("i64"),
        F32_TYPE => Some("f32"),
        F64_TYPE => Some("f64"),
        V128_TYPE => Some("v128"),
        FUNCREF_TYPE => Some("funcref"),
        EXTERNREF_TYPE => Some("externref"),
        _ => None,
    }
}

/// Decode a value type byte into a leaf called `name`.
pub fn value_type(d: &mut Decoder<'_>, name: &str) -> Result<(Node, &'static str)> {
    let start = d.position();
    let byte = d.cursor().read_u8()?;
    let ty = value_type_name(byte).ok_or(Error::invalid_value(start, "value type", u64::from(byte)))?;
    Ok((d.leaf_from(name, ty, start), ty))
}

/// Decode a reference type byte into a leaf called `name`.
pub fn ref_type(d: &mut Decoder<'_>, name: &str) -> Result<(Node, &'static str)> {
    let start = d.position();
    let byte = d.cursor().read_u8()?;
    let ty = match byte {
        FUNCREF_TYPE => "funcref",
        EXTERNREF_TYPE => "externref",
        _ => return Err(Error::invalid_value(start, "reference type", u64::from(byte))),
    };
    Ok((d.leaf_from(name, ty, start), ty))
}

/// Decode a function type: the `0x60` form byte, parameter types and
/// result types. `at` is the path the returned node will occupy.
pub fn func_type(d: &mut Decoder<'_>, at: &NodePath) -> Result<Node> {
    let mut node = d.begin("functype");
    let start = d.position();
    let form = d.cursor().read_u8()?;
    if form != FUNC_TYPE_FORM {
        return Err(Error::invalid_value(start, "function type form", u64::from(form)));
    }
    node.push(d.leaf_from("form", format!("0x{:02x}", form), start));

    let mut params = Vec::new();
    let vector = d.vector("params", &at.child(node.len()), |d, _, _| {
        let (leaf, ty) = value_type(d, "param")?;
        params.push(ty);
        Ok(leaf)
    })?;
    node.push(vector);

    let mut results = Vec::new();
    let vector = d.vector("results", &at.child(node.len()), |d, _, _| {
        let (leaf, ty) = value_type(d, "result")?;
        results.push(ty);
        Ok(leaf)
    })?;
    node.push(vector);

    node.set_description(format!("({})->({})", params.join(","), results.join(",")));
    Ok(d.finish(node))
}

/// Decode limits: a flag byte, a minimum and an optional maximum.
pub fn limits(d: &mut Decoder<'_>, name: &str) -> Result<Node> {
    let mut node = d.begin(name);
    let start = d.position();
    let flags = d.u8_field(&mut node, "flags")?;
    let description = match flags {
        LIMITS_MIN => format!("min={}", d.u32_field(&mut node, "min")?),
        LIMITS_MIN_MAX => {
            let min = d.u32_field(&mut node, "min")?;
            let max = d.u32_field(&mut node, "max")?;
            format!("min={},max={}", min, max)
        },
        _ => return Err(Error::invalid_value(start, "limits flags", u64::from(flags))),
    };
    node.set_description(description);
    Ok(d.finish(node))
}

/// Decode a table type: element reference type followed by limits.
pub fn table_type(d: &mut Decoder<'_>, name: &str) -> Result<Node> {
    let mut node = d.begin(name);
    let (elem, ty) = ref_type(d, "elemtype")?;
    node.push(elem);
    let limits = limits(d, "limits")?;
    node.set_description(format!("{} {}", ty, limits.description()));
    node.push(limits);
    Ok(d.finish(node))
}

/// Decode a global type: value type followed by a mutability byte.
pub fn global_type(d: &mut Decoder<'_>, name: &str) -> Result<Node> {
    let mut node = d.begin(name);
    let (valtype, ty) = value_type(d, "valtype")?;
    node.push(valtype);
    let start = d.position();
    let mutability = d.cursor().read_u8()?;
    let label = match mutability {
        0 => "const",
        1 => "var",
        _ => return Err(Error::invalid_value(start, "mutability", u64::from(mutability))),
    };
    node.push(d.leaf_from("mut", label, start));
    node.set_description(format!("{} {}", ty, label));
    Ok(d.finish(node))
}

/// Decode a constant expression up to and including its `end` opcode.
pub fn const_expr(d: &mut Decoder<'_>, name: &str) -> Result<Node> {
    let mut node = d.begin(name);
    let mut text = Vec::new();
    loop {
        let start = d.position();
        let opcode = d.cursor().read_u8()?;
        let (mnemonic, immediate) = match opcode {
            END => {
                node.push(d.leaf_from("end", "", start));
                break;
            },
            I32_CONST => ("i32.const", d.cursor().read_var_i32()?.to_string()),
            I64_CONST => ("i64.const", d.cursor().read_var_i64()?.to_string()),
            F32_CONST => ("f32.const", d.cursor().read_f32()?.to_string()),
            F64_CONST => ("f64.const", d.cursor().read_f64()?.to_string()),
            GLOBAL_GET => ("global.get", d.cursor().read_var_u32()?.to_string()),
            REF_FUNC => ("ref.func", d.cursor().read_var_u32()?.to_string()),
            REF_NULL => {
                let at = d.position();
                let byte = d.cursor().read_u8()?;
                match byte {
                    FUNCREF_TYPE => ("ref.null", "func".to_string()),
                    EXTERNREF_TYPE => ("ref.null", "extern".to_string()),
                    _ => return Err(Error::invalid_value(at, "reference type", u64::from(byte))),
                }
            },
            _ => return Err(Error::unknown_tag(start, u32::from(opcode))),
        };
        text.push(format!("{} {}", mnemonic, immediate));
        node.push(d.leaf_from(mnemonic, immediate, start));
    }
    node.set_description(text.join("; "));
    Ok(d.finish(node))
}
