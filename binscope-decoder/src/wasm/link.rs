//! Cross-reference annotation of a decoded module.
//!
//! The label stage numbers the members of every index space (imported
//! entries first) and resolves signature, export and start references. The
//! enrich stage appends function names from the name table and copies
//! function export names onto the matching code bodies.

use super::{
    sections::{ExternalKind, EXPORT_INDEX_CHILD},
    SectionKind,
};
use crate::{
    dispatch::SizedRecord,
    link::{LinkContext, LinkStage},
    node::{Node, NodePath},
    registry::{Entity, Origin, Space, SpaceKey},
};

pub(super) fn link_module(
    stage: LinkStage,
    records: &[SizedRecord<SectionKind>],
    root: &mut Node,
    ctx: &mut LinkContext<'_>,
) {
    for record in records {
        let Some(index) = record.path.record() else {
            continue;
        };
        match (stage, record.kind) {
            (LinkStage::Label, SectionKind::Type) => label_types(index, root, ctx),
            (LinkStage::Label, SectionKind::Import) => label_imports(index, root, ctx),
            (LinkStage::Label, SectionKind::Function) => label_functions(index, root, ctx),
            (LinkStage::Label, SectionKind::Table) => label_locals(ExternalKind::Table, index, root, ctx),
            (LinkStage::Label, SectionKind::Memory) => label_locals(ExternalKind::Memory, index, root, ctx),
            (LinkStage::Label, SectionKind::Global) => label_locals(ExternalKind::Global, index, root, ctx),
            (LinkStage::Label, SectionKind::Export) => label_exports(index, root, ctx),
            (LinkStage::Label, SectionKind::Start) => label_start(index, root, ctx),
            (LinkStage::Label, SectionKind::Code) => label_codes(index, root, ctx),
            (LinkStage::Enrich, SectionKind::Custom) => apply_names(index, root, ctx),
            (LinkStage::Enrich, SectionKind::Code) => copy_export_descriptions(index, root, ctx),
            _ => {},
        }
    }
}

fn in_record(entity: &Entity, record: usize) -> bool {
    entity.path.record() == Some(record)
}

fn rename(root: &mut Node, path: &NodePath, name: String) {
    if let Some(node) = root.at_path_mut(path) {
        node.set_name(name);
    }
}

fn describe(root: &mut Node, path: &NodePath, description: String) {
    if let Some(node) = root.at_path_mut(path) {
        node.set_description(description);
    }
}

fn label_types(record: usize, root: &mut Node, ctx: &LinkContext<'_>) {
    for (i, ty) in ctx.registry().entities(SpaceKey::module(Space::Types)).enumerate() {
        if in_record(ty, record) {
            rename(root, &ty.path, format!("#{}", i));
        }
    }
}

fn label_imports(record: usize, root: &mut Node, ctx: &LinkContext<'_>) {
    let kinds = [ExternalKind::Function, ExternalKind::Table, ExternalKind::Memory, ExternalKind::Global];
    for kind in kinds {
        let Some(space) = ctx.registry().space(SpaceKey::module(kind.space())) else {
            continue;
        };
        for (i, entity) in space.imported().iter().enumerate() {
            if in_record(entity, record) {
                rename(root, &entity.path, format!("{}#{}", kind.prefix(), i));
            }
        }
    }
}

fn label_functions(record: usize, root: &mut Node, ctx: &mut LinkContext<'_>) {
    let Some(functions) = ctx.registry().space(SpaceKey::module(Space::Functions)) else {
        return;
    };
    let first = functions.imported_len();
    for (j, function) in functions.local().iter().enumerate() {
        if !in_record(function, record) {
            continue;
        }
        rename(root, &function.path, format!("func#{}", first + j));
        if let Some(typeidx) = function.value {
            if ctx.resolve(SpaceKey::module(Space::Types), typeidx, &function.path).is_some() {
                describe(root, &function.path, format!("sig={}", typeidx));
            }
        }
    }
}

fn label_locals(kind: ExternalKind, record: usize, root: &mut Node, ctx: &LinkContext<'_>) {
    let Some(space) = ctx.registry().space(SpaceKey::module(kind.space())) else {
        return;
    };
    let first = space.imported_len();
    for (j, entity) in space.local().iter().enumerate() {
        if in_record(entity, record) {
            rename(root, &entity.path, format!("{}#{}", kind.prefix(), first + j));
        }
    }
}

fn label_exports(record: usize, root: &mut Node, ctx: &mut LinkContext<'_>) {
    for export in ctx.registry().entities(SpaceKey::module(Space::Exports)) {
        if !in_record(export, record) {
            continue;
        }
        let (Some(kind), Some(target)) = (export.kind.and_then(ExternalKind::from_byte), export.value) else {
            continue;
        };
        let at = export.path.child(EXPORT_INDEX_CHILD);
        if ctx.resolve(SpaceKey::module(kind.space()), target, &at).is_some() {
            describe(root, &at, format!("{}#{}", kind.prefix(), target));
        }
    }
}

fn label_start(record: usize, root: &mut Node, ctx: &mut LinkContext<'_>) {
    for start in ctx.registry().entities(SpaceKey::module(Space::Start)) {
        let Some(target) = start.value.filter(|_| in_record(start, record)) else {
            continue;
        };
        if ctx.resolve(SpaceKey::module(Space::Functions), target, &start.path).is_some() {
            describe(root, &start.path, format!("func#{}", target));
        }
    }
}

fn label_codes(record: usize, root: &mut Node, ctx: &LinkContext<'_>) {
    let first = ctx.registry().space(SpaceKey::module(Space::Functions)).map_or(0, |space| space.imported_len());
    for (j, code) in ctx.registry().entities(SpaceKey::module(Space::Codes)).enumerate() {
        if in_record(code, record) {
            rename(root, &code.path, format!("func#{}", first + j));
        }
    }
}

fn apply_names(record: usize, root: &mut Node, ctx: &mut LinkContext<'_>) {
    for name in ctx.registry().entities(SpaceKey::module(Space::FunctionNames)) {
        let (Some(idx), Some(text)) = (name.value, name.text.as_deref()) else {
            continue;
        };
        if !in_record(name, record) {
            continue;
        }
        if let Some(function) = ctx.resolve(SpaceKey::module(Space::Functions), idx, &name.path) {
            if let Some(node) = root.at_path_mut(&function.path) {
                node.append_description(&format!(", name={}", text));
            }
        }
    }
}

fn copy_export_descriptions(record: usize, root: &mut Node, ctx: &LinkContext<'_>) {
    let registry = ctx.registry();
    let Some(functions) = registry.space(SpaceKey::module(Space::Functions)) else {
        return;
    };
    let codes: Vec<_> = registry.entities(SpaceKey::module(Space::Codes)).collect();

    for export in registry.entities(SpaceKey::module(Space::Exports)) {
        if export.kind.and_then(ExternalKind::from_byte) != Some(ExternalKind::Function) {
            continue;
        }
        // Only declared functions have a body; imports and dangling targets do not.
        let Some(target) = export.value else {
            continue;
        };
        if functions.get(target).map(|function| function.origin) != Some(Origin::Local) {
            continue;
        }
        let local = target as usize - functions.imported_len();
        let Some(code) = codes.get(local).filter(|code| in_record(code, record)) else {
            continue;
        };
        let Some(description) = root.at_path(&export.path).map(|node| node.description().to_string()) else {
            continue;
        };
        describe(root, &code.path, description);
    }
}
