//! Row accessor traits

use crate::error::{Error, Result};
use crate::value::Value;
use std::collections::HashMap;

/// A result row that can be queried by column name.
///
/// This is the only point where raw row data enters the mapping engine.
/// Drivers implement it once per row type; errors returned from
/// [`get_value`](Row::get_value) are propagated unchanged by the mappers.
pub trait Row {
    /// Get a value from the row by column name as a dynamic Value.
    ///
    /// Returns an error if the column doesn't exist.
    fn get_value(&self, column: &str) -> Result<Value>;
}

/// Extension trait for typed access to row values.
pub trait RowExt: Row {
    /// Get a value from the row coerced into `T`.
    fn get<T: crate::FromValue>(&self, column: &str) -> Result<T> {
        let value = self.get_value(column)?;
        T::from_value(value)
    }
}

impl<R: Row + ?Sized> RowExt for R {}

impl<R: Row + ?Sized> Row for &R {
    fn get_value(&self, column: &str) -> Result<Value> {
        (**self).get_value(column)
    }
}

/// An in-memory row, handy for adapters that decode everything up front.
impl Row for HashMap<String, Value> {
    fn get_value(&self, column: &str) -> Result<Value> {
        self.get(column)
            .cloned()
            .ok_or_else(|| Error::ColumnNotFound(column.to_string()))
    }
}
