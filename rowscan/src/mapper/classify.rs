//! Destination type classification

use std::any::Any;

use super::materialize::root;
use super::{MapContext, RowMapper};
use crate::columns::Columns;
use crate::error::{MappingError, Result};
use crate::shape::{CustomMapperFn, RecordShape, Shape};
use crate::traits::{MapOutput, MapValues, Mappable, Row};

/// How rows are turned into a destination type.
pub(crate) enum Destination {
    /// The record maps itself.
    Custom(CustomMapperFn),
    /// Walk the record's fields.
    Fields(RecordShape),
}

/// Classify `T`, which must be a record or a pointer to one.
pub(crate) fn classify<T: Mappable>() -> std::result::Result<Destination, MappingError> {
    let record = match T::shape() {
        Shape::Record(record) => record,
        Shape::Pointer(pointer) => match (pointer.target)() {
            Shape::Record(record) => record,
            _ => return Err(not_a_record(pointer.type_name)),
        },
        Shape::Leaf(leaf) => return Err(not_a_record(leaf.type_name)),
    };

    if let Some(custom) = record.custom {
        return Ok(Destination::Custom(custom));
    }
    Ok(Destination::Fields(record))
}

fn not_a_record(type_name: &str) -> MappingError {
    MappingError::InvalidDestinationType(format!(
        "type {:?} is not a record or pointer to a record",
        type_name
    ))
}

/// Run a record's own mapper and return exactly `T`.
///
/// When the mapper yields the record but `T` is a pointer to it, or the
/// other way round, the output is moved into a fresh `T`.
pub(crate) fn adapt_custom<T>(
    custom: CustomMapperFn,
    ctx: &MapContext,
    columns: &Columns,
) -> RowMapper<T>
where
    T: Mappable + Default + Send,
{
    let inner = custom(ctx, columns);
    Box::new(move |row: &dyn Row| {
        let output = inner(row)?;
        match output.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(output) => {
                let mut dest = T::default();
                root(dest.slot())?.set_any(output)?;
                Ok(dest)
            }
        }
    })
}

/// Type-erased entry point to `R::map_values`. Used by `#[derive(Record)]`.
#[doc(hidden)]
pub fn erase_map_values<R>(ctx: &MapContext, columns: &Columns) -> RowMapper<Box<dyn Any + Send>>
where
    R: MapValues,
    R::Output: MapOutput<R>,
{
    let inner = R::map_values(ctx, columns);
    Box::new(move |row: &dyn Row| -> Result<Box<dyn Any + Send>> {
        let output: Box<dyn Any + Send> = Box::new(inner(row)?);
        Ok(output)
    })
}
