//! Static type descriptions walked by the mapping builder

use std::any::{type_name, Any, TypeId};
use std::fmt;

use crate::columns::Columns;
use crate::mapper::{MapContext, RowMapper};

/// Type-erased entry point of a record's own [`MapValues`](crate::MapValues)
/// implementation.
pub type CustomMapperFn = fn(&MapContext, &Columns) -> RowMapper<Box<dyn Any + Send>>;

/// A capability a record type can advertise, identified by the trait it
/// stands for.
///
/// Records declaring a capability listed in the mapper's scannable types are
/// treated as a single opaque value instead of being split into fields.
///
/// ```ignore
/// let scanner = Capability::of::<dyn rowscan::Scanner>();
/// ```
#[derive(Clone, Copy)]
pub struct Capability {
    id: TypeId,
    name: &'static str,
}

impl Capability {
    /// The capability represented by the (trait object) type `C`.
    pub fn of<C: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: type_name::<C>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this capability names a trait object rather than a concrete type.
    ///
    /// Best effort: it reads the `type_name` prefix, whose format std does
    /// not guarantee. Used only to reject obvious misconfiguration.
    pub fn is_trait_object(&self) -> bool {
        self.name.starts_with("dyn ")
    }
}

impl PartialEq for Capability {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Capability {}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Capability").field(&self.name).finish()
    }
}

/// The shape of a mappable type.
#[derive(Clone, Debug)]
pub enum Shape {
    /// A scalar value assigned from one column
    Leaf(LeafShape),
    /// A type with named fields
    Record(RecordShape),
    /// `Option<T>` or `Box<T>`
    Pointer(PointerShape),
}

impl Shape {
    pub fn type_id(&self) -> TypeId {
        match self {
            Shape::Leaf(leaf) => leaf.type_id,
            Shape::Record(record) => record.type_id,
            Shape::Pointer(pointer) => pointer.type_id,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Shape::Leaf(leaf) => leaf.type_name,
            Shape::Record(record) => record.type_name,
            Shape::Pointer(pointer) => pointer.type_name,
        }
    }

    /// Strip every pointer level, returning the pointee shape.
    pub fn pointee(self) -> Shape {
        let mut shape = self;
        while let Shape::Pointer(pointer) = shape {
            shape = (pointer.target)();
        }
        shape
    }
}

#[derive(Clone, Debug)]
pub struct LeafShape {
    pub type_id: TypeId,
    pub type_name: &'static str,
}

impl LeafShape {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PointerShape {
    pub type_id: TypeId,
    pub type_name: &'static str,
    /// `Option` can be left empty, `Box` always holds a value
    pub nullable: bool,
    pub target: fn() -> Shape,
}

/// Description of a record type, normally emitted by `#[derive(Record)]`.
#[derive(Clone)]
pub struct RecordShape {
    pub type_id: TypeId,
    pub type_name: &'static str,
    /// Public fields in declaration order.
    pub fields: Vec<FieldShape>,
    pub capabilities: Vec<Capability>,
    /// Set when the record maps itself through `MapValues`.
    pub custom: Option<CustomMapperFn>,
}

impl RecordShape {
    pub fn implements(&self, capability: &Capability) -> bool {
        self.capabilities.contains(capability)
    }
}

impl fmt::Debug for RecordShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordShape")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .field("capabilities", &self.capabilities)
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

/// One public field of a record.
#[derive(Clone)]
pub struct FieldShape {
    /// Position among all fields of the struct, used by `RecordSlot::field`.
    pub index: usize,
    pub ident: &'static str,
    /// `(key, value)` pairs from the field's `#[tag(...)]` attribute.
    pub tags: &'static [(&'static str, &'static str)],
    /// Flattened into the parent's name scope.
    pub embedded: bool,
    pub shape: fn() -> Shape,
}

impl FieldShape {
    pub fn tag(&self, key: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, value)| *value)
    }
}

impl fmt::Debug for FieldShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldShape")
            .field("index", &self.index)
            .field("ident", &self.ident)
            .field("tags", &self.tags)
            .field("embedded", &self.embedded)
            .finish()
    }
}
