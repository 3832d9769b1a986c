//! Index space registry.
//!
//! Record rules append entities while the tree is decoded; the link pass
//! reads them back once every record is in. An [`IndexSpace`] keeps imported
//! and locally declared entities apart and always yields imported ones
//! first, so the canonical index of an entity is derived from the two
//! sequences instead of being stored.

use std::collections::BTreeMap;

use crate::node::NodePath;

/// Kind of entity an index space numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Space {
    /// Function signatures
    Types,
    /// Import entries in declaration order
    Imports,
    /// Functions, imported then declared
    Functions,
    /// Tables, imported then declared
    Tables,
    /// Memories, imported then declared
    Memories,
    /// Globals, imported then declared
    Globals,
    /// Export entries
    Exports,
    /// Start function reference
    Start,
    /// Function bodies
    Codes,
    /// (function index, name) associations of a name table
    FunctionNames,
    /// Instructions of one prototype
    Instructions,
    /// Constants of one prototype
    Constants,
    /// Upvalue descriptors of one prototype
    Upvalues,
    /// Nested prototypes of one prototype
    NestedPrototypes,
    /// Debug line per instruction
    LineInfo,
    /// Debug names of upvalues
    UpvalueNames,
}

/// Where an entity came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Declared by an import record
    Imported,
    /// Declared by the container itself
    Local,
}

/// Scope of the entities of a whole container
pub const MODULE_SCOPE: u32 = 0;

/// Identifies one index space: the kind of entity plus the scope that owns
/// it (the container, or one nested record such as a function prototype).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpaceKey {
    /// Owning scope
    pub scope: u32,
    /// Entity kind
    pub space: Space,
}

impl SpaceKey {
    /// Key of a container-wide space
    pub const fn module(space: Space) -> Self {
        Self { scope: MODULE_SCOPE, space }
    }

    /// Key of a space owned by `scope`
    pub const fn scoped(scope: u32, space: Space) -> Self {
        Self { scope, space }
    }
}

/// One registered entity
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Node this entity was decoded into
    pub path:   NodePath,
    /// Import or local declaration
    pub origin: Origin,
    /// Scalar payload, usually a reference into another space
    pub value:  Option<u64>,
    /// Sub-kind tag, such as an external kind
    pub kind:   Option<u8>,
    /// Text payload, such as a name
    pub text:   Option<String>,
}

impl Entity {
    /// A locally declared entity
    pub fn local(path: NodePath) -> Self {
        Self { path, origin: Origin::Local, value: None, kind: None, text: None }
    }

    /// An imported entity
    pub fn imported(path: NodePath) -> Self {
        Self { origin: Origin::Imported, ..Self::local(path) }
    }

    /// Attach a scalar payload.
    #[must_use]
    pub fn with_value(mut self, value: u64) -> Self {
        self.value = Some(value);
        self
    }

    /// Attach a sub-kind tag.
    #[must_use]
    pub fn with_kind(mut self, kind: u8) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Attach a text payload.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Ordered entities of one kind
#[derive(Debug, Clone, Default)]
pub struct IndexSpace {
    imported: Vec<Entity>,
    local:    Vec<Entity>,
}

impl IndexSpace {
    fn push(&mut self, entity: Entity) {
        match entity.origin {
            Origin::Imported => self.imported.push(entity),
            Origin::Local => self.local.push(entity),
        }
    }

    /// Total number of entities
    pub fn len(&self) -> usize {
        self.imported.len() + self.local.len()
    }

    /// True if nothing was registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of imported entities; the first local index
    pub fn imported_len(&self) -> usize {
        self.imported.len()
    }

    /// Imported entities in import order
    pub fn imported(&self) -> &[Entity] {
        &self.imported
    }

    /// Local entities in declaration order
    pub fn local(&self) -> &[Entity] {
        &self.local
    }

    /// Entity at canonical `index`
    pub fn get(&self, index: u64) -> Option<&Entity> {
        let index = usize::try_from(index).ok()?;
        match index.checked_sub(self.imported.len()) {
            None => self.imported.get(index),
            Some(local) => self.local.get(local),
        }
    }

    /// All entities in canonical order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.imported.iter().chain(self.local.iter())
    }
}

/// Index spaces of one decode call
#[derive(Debug, Clone, Default)]
pub struct Registry {
    spaces:     BTreeMap<SpaceKey, IndexSpace>,
    last_scope: u32,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entity to the space named by `key`.
    pub(crate) fn record(&mut self, key: SpaceKey, entity: Entity) {
        self.spaces.entry(key).or_default().push(entity);
    }

    /// Allocate a fresh scope for a nested record.
    pub(crate) fn new_scope(&mut self) -> u32 {
        self.last_scope += 1;
        self.last_scope
    }

    /// The space named by `key`, if anything was registered into it
    pub fn space(&self, key: SpaceKey) -> Option<&IndexSpace> {
        self.spaces.get(&key)
    }

    /// Number of entities in the space named by `key`
    pub fn len_of(&self, key: SpaceKey) -> usize {
        self.space(key).map_or(0, IndexSpace::len)
    }

    /// Entity at canonical `index` of the space named by `key`
    pub fn get(&self, key: SpaceKey, index: u64) -> Option<&Entity> {
        self.space(key)?.get(index)
    }

    /// Entities of the space named by `key` in canonical order
    pub fn entities(&self, key: SpaceKey) -> impl Iterator<Item = &Entity> {
        self.space(key).into_iter().flat_map(IndexSpace::iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(i: usize) -> NodePath {
        NodePath::root().child(i)
    }

    #[test]
    fn test_imports_come_first_regardless_of_registration_order() {
        let mut registry = Registry::new();
        let key = SpaceKey::module(Space::Functions);
        registry.record(key, Entity::local(path(10)).with_value(0));
        registry.record(key, Entity::imported(path(1)));
        registry.record(key, Entity::imported(path(2)));

        let space = registry.space(key).unwrap();
        assert_eq!(space.len(), 3);
        assert_eq!(space.imported_len(), 2);
        let order: Vec<_> = space.iter().map(|e| e.path.clone()).collect();
        assert_eq!(order, vec![path(1), path(2), path(10)]);
        assert_eq!(space.get(2).unwrap().value, Some(0));
        assert!(space.get(3).is_none());
        assert!(space.get(u64::MAX).is_none());
    }

    #[test]
    fn test_scopes_are_separate() {
        let mut registry = Registry::new();
        let a = registry.new_scope();
        let b = registry.new_scope();
        assert_ne!(a, b);
        assert_ne!(a, MODULE_SCOPE);
        registry.record(SpaceKey::scoped(a, Space::Constants), Entity::local(path(0)).with_text("1"));
        assert_eq!(registry.len_of(SpaceKey::scoped(a, Space::Constants)), 1);
        assert_eq!(registry.len_of(SpaceKey::scoped(b, Space::Constants)), 0);
        assert_eq!(registry.entities(SpaceKey::scoped(b, Space::Constants)).count(), 0);
    }
}
