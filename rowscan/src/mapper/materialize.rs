//! Per-row materialization

use std::marker::PhantomData;

use super::mapping::{FieldLocator, Mapping};
use crate::error::{Error, Result};
use crate::traits::{Mappable, PointerSlot, RecordSlot, Row, Slot};
use crate::value::Value;

/// Fills fresh `T` instances from rows using a filtered mapping.
pub(crate) struct Materializer<T> {
    mapping: Mapping,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Mappable + Default> Materializer<T> {
    pub(crate) fn new(mapping: Mapping) -> Self {
        Self {
            mapping,
            _marker: PhantomData,
        }
    }

    pub(crate) fn materialize(&self, row: &dyn Row) -> Result<T> {
        let mut out = T::default();
        for (column, locator) in self.mapping.iter() {
            apply(&mut out, column, locator, row)?;
        }
        Ok(out)
    }
}

fn apply<T: Mappable>(
    out: &mut T,
    column: &str,
    locator: &FieldLocator,
    row: &dyn Row,
) -> Result<()> {
    for path in &locator.init {
        let slot = navigate(root(out.slot())?, path)?;
        allocate(slot)?;
    }

    let value = row.get_value(column)?;
    let is_null = value.is_null();
    let slot = navigate(root(out.slot())?, &locator.position)?;
    store(slot, value).map_err(|err| match err {
        Error::TypeConversion { .. } if is_null => Error::UnexpectedNull(column.to_string()),
        other => other,
    })
}

/// The record at the root, allocating it if the destination is a pointer.
pub(crate) fn root(slot: Slot<'_>) -> Result<&mut dyn RecordSlot> {
    match slot {
        Slot::Record(record) => Ok(record),
        Slot::Pointer(pointer) => {
            pointer.init();
            match pointer.target() {
                Some(target) => root(target),
                None => Err(unset_pointer()),
            }
        }
        Slot::Value(_) => Err(Error::RowDecode(
            "destination root is not a record".to_string(),
        )),
    }
}

fn navigate<'a>(record: &'a mut dyn RecordSlot, path: &[usize]) -> Result<Slot<'a>> {
    let Some((&last, parents)) = path.split_last() else {
        return Ok(Slot::Record(record));
    };

    let mut record = record;
    for &index in parents {
        let slot = record.field(index).ok_or_else(|| missing_field(index))?;
        record = match deref(slot)? {
            Slot::Record(inner) => inner,
            _ => {
                return Err(Error::RowDecode(format!(
                    "field {} on the locator path is not a record",
                    index
                )))
            }
        };
    }

    record.field(last).ok_or_else(|| missing_field(last))
}

/// Follow set pointers. Reaching an unset one means the pointer chain was
/// not initialised.
fn deref(slot: Slot<'_>) -> Result<Slot<'_>> {
    match slot {
        Slot::Pointer(pointer) => match pointer.target() {
            Some(target) => deref(target),
            None => Err(unset_pointer()),
        },
        other => Ok(other),
    }
}

/// Allocate every pointer level at `slot` that is still unset.
fn allocate(slot: Slot<'_>) -> Result<()> {
    let Slot::Pointer(pointer) = slot else {
        return Err(Error::RowDecode(
            "pointer chain entry is not a pointer".to_string(),
        ));
    };

    init(pointer)
}

fn init(pointer: &mut dyn PointerSlot) -> Result<()> {
    if !pointer.is_set() {
        pointer.init();
    }
    match pointer.target() {
        Some(Slot::Pointer(inner)) => init(inner),
        Some(_) => Ok(()),
        None => Err(unset_pointer()),
    }
}

fn store(slot: Slot<'_>, value: Value) -> Result<()> {
    match slot {
        Slot::Value(leaf) => leaf.assign(value),
        Slot::Record(record) => record.scan(value),
        Slot::Pointer(pointer) => {
            if value.is_null() && pointer.nullable() {
                pointer.clear();
                return Ok(());
            }
            pointer.init();
            match pointer.target() {
                Some(target) => store(target, value),
                None => Err(unset_pointer()),
            }
        }
    }
}

fn missing_field(index: usize) -> Error {
    Error::RowDecode(format!("no public field at index {}", index))
}

fn unset_pointer() -> Error {
    Error::RowDecode("pointer on the locator path is not initialised".to_string())
}
