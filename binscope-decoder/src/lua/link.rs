//! Cross-reference annotation of a decoded chunk.
//!
//! Works one prototype scope at a time. The label stage names upvalues from
//! the debug information; the enrich stage resolves instruction operands
//! against the constants, upvalues and child prototypes of the same
//! prototype and appends the source line.

use super::{
    function::Prototype,
    opcodes::{Instruction, Opcode},
};
use crate::{
    dispatch::TagTable,
    link::{LinkContext, LinkStage},
    node::{Node, NodePath},
    registry::{Space, SpaceKey},
};

pub(super) fn link_chunk(stage: LinkStage, prototypes: &[Prototype], root: &mut Node, ctx: &mut LinkContext<'_>) {
    for prototype in prototypes {
        match stage {
            LinkStage::Label => label_upvalues(prototype.scope, root, ctx),
            LinkStage::Enrich => annotate_instructions(prototype.scope, root, ctx),
        }
    }
}

fn upvalue_name<'r>(ctx: &LinkContext<'r>, scope: u32, index: u64) -> Option<&'r str> {
    ctx.registry().get(SpaceKey::scoped(scope, Space::UpvalueNames), index)?.text.as_deref()
}

fn label_upvalues(scope: u32, root: &mut Node, ctx: &LinkContext<'_>) {
    for (i, upvalue) in ctx.registry().entities(SpaceKey::scoped(scope, Space::Upvalues)).enumerate() {
        let Some(name) = upvalue_name(ctx, scope, i as u64) else {
            continue;
        };
        if let Some(node) = root.at_path_mut(&upvalue.path) {
            node.append_description(&format!(", name={}", name));
        }
    }
}

fn upvalue_note(ctx: &mut LinkContext<'_>, scope: u32, index: u32, from: &NodePath) -> Option<String> {
    ctx.resolve(SpaceKey::scoped(scope, Space::Upvalues), u64::from(index), from)?;
    let name = upvalue_name(ctx, scope, u64::from(index)).map_or_else(|| format!("#{}", index), str::to_string);
    Some(format!(", upvalue={}", name))
}

fn operand_note(ctx: &mut LinkContext<'_>, scope: u32, ins: Instruction, from: &NodePath) -> Option<String> {
    match ins.opcode() {
        Opcode::LOADK => {
            let constant = ctx.resolve(SpaceKey::scoped(scope, Space::Constants), u64::from(ins.bx()), from)?;
            Some(format!(", k={}", constant.text.as_deref().unwrap_or_default()))
        },
        Opcode::GETUPVAL | Opcode::SETUPVAL | Opcode::GETTABUP => upvalue_note(ctx, scope, ins.b(), from),
        Opcode::SETTABUP => upvalue_note(ctx, scope, ins.a(), from),
        Opcode::CLOSURE => {
            ctx.resolve(SpaceKey::scoped(scope, Space::NestedPrototypes), u64::from(ins.bx()), from)?;
            Some(format!(", proto#{}", ins.bx()))
        },
        _ => None,
    }
}

fn annotate_instructions(scope: u32, root: &mut Node, ctx: &mut LinkContext<'_>) {
    let registry = ctx.registry();
    for (pc, entity) in registry.entities(SpaceKey::scoped(scope, Space::Instructions)).enumerate() {
        let (Some(word), Some(opcode)) = (entity.value, entity.kind.and_then(|op| Opcode::from_tag(u32::from(op))))
        else {
            continue;
        };
        let ins = Instruction::new(word as u32, opcode);

        let mut notes = operand_note(ctx, scope, ins, &entity.path).unwrap_or_default();
        // Stripped chunks carry no line info; that is not a dangling reference.
        if let Some(line) = registry.get(SpaceKey::scoped(scope, Space::LineInfo), pc as u64).and_then(|e| e.value) {
            notes.push_str(&format!(", line={}", line));
        }
        if let Some(node) = root.at_path_mut(&entity.path) {
            node.append_description(&notes);
        }
    }
}
