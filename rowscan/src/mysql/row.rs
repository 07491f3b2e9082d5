//! MySQL row accessor

use crate::columns::Columns;
use crate::error::{Error, Result};
use crate::traits::Row;
use crate::value::Value;
use mysql_async::Row as MySqlAsyncRow;
use std::collections::HashMap;

use super::types::from_mysql_value;

/// A fetched MySQL row decoded into [`Value`]s.
pub struct MySqlRow {
    columns: Columns,
    /// Column values indexed by column name
    values: HashMap<String, Value>,
}

impl MySqlRow {
    /// Create a new MySqlRow from a mysql_async Row.
    pub fn from_mysql_row(row: MySqlAsyncRow) -> Result<Self> {
        let columns = row.columns_ref();
        let mut decoded = Vec::with_capacity(columns.len());

        for (i, column) in columns.iter().enumerate() {
            let column_name = column.name_str().to_string();
            let mysql_value = row
                .as_ref(i)
                .ok_or_else(|| Error::ColumnNotFound(column_name.clone()))?
                .clone();
            decoded.push((column_name, from_mysql_value(mysql_value)?));
        }

        Ok(Self::from_values(decoded))
    }

    /// Build a row from decoded `(column, value)` pairs in select order.
    ///
    /// A repeated column name keeps its first value, matching [`Columns`].
    pub fn from_values<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let mut names = Vec::new();
        let mut values = HashMap::new();
        for (name, value) in pairs {
            let name = name.into();
            values.entry(name.clone()).or_insert(value);
            names.push(name);
        }

        Self {
            columns: Columns::new(names),
            values,
        }
    }

    /// The result's column names, in select order.
    pub fn columns(&self) -> &Columns {
        &self.columns
    }
}

impl Row for MySqlRow {
    fn get_value(&self, column: &str) -> Result<Value> {
        self.values
            .get(column)
            .cloned()
            .ok_or_else(|| Error::ColumnNotFound(column.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_column_keeps_first_value() {
        let row = MySqlRow::from_values([("id", Value::I64(1)), ("id", Value::I64(2))]);
        assert_eq!(row.columns().len(), 1);
        assert_eq!(row.columns().ordinal("id"), Some(0));
        assert_eq!(row.get_value("id").unwrap(), Value::I64(1));
    }

    #[test]
    fn test_missing_column() {
        let row = MySqlRow::from_values([("id", Value::I64(1))]);
        assert!(matches!(row.get_value("name"), Err(Error::ColumnNotFound(c)) if c == "name"));
    }
}
