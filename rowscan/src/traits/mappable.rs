//! Field access surface used by the mapping engine

use std::any::{type_name, Any};

use crate::columns::Columns;
use crate::error::{Error, Result};
use crate::mapper::{MapContext, RowMapper};
use crate::shape::{PointerShape, Shape};
use crate::traits::FromValue;
use crate::value::Value;

/// A type the mapping engine can describe and write into.
///
/// Implemented by `#[derive(Record)]` for records, by [`impl_leaf!`] for
/// scalar types, and by `Option<T>` / `Box<T>` for pointers.
pub trait Mappable: 'static {
    /// Describe the type. Called while building mappings, never per row.
    fn shape() -> Shape;

    /// Borrow this value as a writable slot.
    fn slot(&mut self) -> Slot<'_>;
}

/// A writable location inside a destination value.
pub enum Slot<'a> {
    Value(&'a mut dyn ValueSlot),
    Record(&'a mut dyn RecordSlot),
    Pointer(&'a mut dyn PointerSlot),
}

/// A scalar leaf.
pub trait ValueSlot {
    /// Coerce `value` into the slot's type and store it.
    fn assign(&mut self, value: Value) -> Result<()>;
}

impl<T: FromValue> ValueSlot for T {
    fn assign(&mut self, value: Value) -> Result<()> {
        *self = T::from_value(value)?;
        Ok(())
    }
}

/// A record with indexable fields.
pub trait RecordSlot {
    /// The field at declaration index `index`, if it is public.
    fn field(&mut self, index: usize) -> Option<Slot<'_>>;

    /// Accept a whole column value when the record is mapped as an opaque leaf.
    fn scan(&mut self, value: Value) -> Result<()>;

    /// Replace the record with the output of a custom mapper, which is
    /// either the record itself or a `Box` of it.
    fn set_any(&mut self, value: Box<dyn Any + Send>) -> Result<()>;
}

/// An indirection that may need allocating before it can be written through.
pub trait PointerSlot {
    fn is_set(&self) -> bool;

    /// Whether the pointer may be left unset.
    fn nullable(&self) -> bool;

    /// Allocate a default pointee if none is present.
    fn init(&mut self);

    fn clear(&mut self);

    fn target(&mut self) -> Option<Slot<'_>>;
}

/// A value-acceptance capability for opaque record types.
///
/// Records marked `#[scan(scanner)]` implement this trait and are filled from
/// a single column instead of field by field.
pub trait Scanner {
    fn scan(&mut self, value: Value) -> Result<()>;
}

/// Output types accepted from [`MapValues`]: the record itself or a box of it.
pub trait MapOutput<R>: Send + 'static {}

impl<R: Send + 'static> MapOutput<R> for R {}

impl<R: Send + 'static> MapOutput<R> for Box<R> {}

/// A record that maps rows itself.
///
/// Records marked `#[scan(map_values)]` are never decomposed into fields;
/// every mapper asked for the record (or a pointer to it) delegates here.
pub trait MapValues: Sized + 'static {
    type Output: MapOutput<Self>;

    fn map_values(ctx: &MapContext, columns: &Columns) -> RowMapper<Self::Output>;
}

/// Move a custom mapper's output into `dest`. Used by `#[derive(Record)]`.
#[doc(hidden)]
pub fn replace_from_any<R: 'static>(dest: &mut R, value: Box<dyn Any + Send>) -> Result<()> {
    let value = match value.downcast::<R>() {
        Ok(record) => {
            *dest = *record;
            return Ok(());
        }
        Err(value) => value,
    };

    match value.downcast::<Box<R>>() {
        Ok(record) => {
            *dest = **record;
            Ok(())
        }
        Err(_) => Err(Error::TypeConversion {
            expected: type_name::<R>(),
            actual: "unrelated custom mapper output".to_string(),
        }),
    }
}

/// Register types implementing [`FromValue`] as mapping leaves.
///
/// ```ignore
/// impl FromValue for Status { /* ... */ }
/// rowscan::impl_leaf!(Status);
/// ```
#[macro_export]
macro_rules! impl_leaf {
    ($($ty:ty),+ $(,)?) => {
        $(impl $crate::Mappable for $ty {
            fn shape() -> $crate::Shape {
                $crate::Shape::Leaf($crate::LeafShape::of::<Self>())
            }

            fn slot(&mut self) -> $crate::Slot<'_> {
                $crate::Slot::Value(self)
            }
        })+
    };
}

impl_leaf!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    String,
    Vec<u8>,
    chrono::NaiveDate,
    chrono::NaiveDateTime,
    chrono::NaiveTime,
    rust_decimal::Decimal,
    serde_json::Value,
    Value,
);

impl<T: Mappable + Default> Mappable for Option<T> {
    fn shape() -> Shape {
        Shape::Pointer(PointerShape {
            type_id: std::any::TypeId::of::<Self>(),
            type_name: type_name::<Self>(),
            nullable: true,
            target: T::shape,
        })
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::Pointer(self)
    }
}

impl<T: Mappable + Default> PointerSlot for Option<T> {
    fn is_set(&self) -> bool {
        self.is_some()
    }

    fn nullable(&self) -> bool {
        true
    }

    fn init(&mut self) {
        if self.is_none() {
            *self = Some(T::default());
        }
    }

    fn clear(&mut self) {
        *self = None;
    }

    fn target(&mut self) -> Option<Slot<'_>> {
        self.as_mut().map(Mappable::slot)
    }
}

impl<T: Mappable + Default> Mappable for Box<T> {
    fn shape() -> Shape {
        Shape::Pointer(PointerShape {
            type_id: std::any::TypeId::of::<Self>(),
            type_name: type_name::<Self>(),
            nullable: false,
            target: T::shape,
        })
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::Pointer(self)
    }
}

impl<T: Mappable + Default> PointerSlot for Box<T> {
    fn is_set(&self) -> bool {
        true
    }

    fn nullable(&self) -> bool {
        false
    }

    fn init(&mut self) {}

    fn clear(&mut self) {
        **self = T::default();
    }

    fn target(&mut self) -> Option<Slot<'_>> {
        Some((**self).slot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_pointer_lifecycle() {
        let mut ptr: Option<i64> = None;
        assert!(!ptr.is_set());
        ptr.init();
        assert_eq!(ptr, Some(0));
        match ptr.target() {
            Some(Slot::Value(slot)) => slot.assign(Value::I64(5)).unwrap(),
            _ => panic!("expected a value slot"),
        }
        assert_eq!(ptr, Some(5));
        ptr.clear();
        assert_eq!(ptr, None);
    }

    #[test]
    fn test_pointer_shapes() {
        match <Option<Box<String>> as Mappable>::shape() {
            Shape::Pointer(pointer) => {
                assert!(pointer.nullable);
                assert!(matches!((pointer.target)(), Shape::Pointer(ref p) if !p.nullable));
            }
            other => panic!("unexpected shape {:?}", other),
        }
        assert!(matches!(
            <Option<Box<String>> as Mappable>::shape().pointee(),
            Shape::Leaf(_)
        ));
    }

    #[test]
    fn test_replace_from_any_accepts_boxed_output() {
        let mut dest = String::new();
        replace_from_any(&mut dest, Box::new(Box::new("boxed".to_string()))).unwrap();
        assert_eq!(dest, "boxed");
        replace_from_any(&mut dest, Box::new("plain".to_string())).unwrap();
        assert_eq!(dest, "plain");
        assert!(replace_from_any(&mut dest, Box::new(1u8)).is_err());
    }
}
