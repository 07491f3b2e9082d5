//! MySQL row adapter
//!
//! Bridges rows fetched with `mysql_async` to the mappers. Issuing queries
//! stays with the caller.

mod row;
mod types;

pub use row::MySqlRow;
pub use types::from_mysql_value;

use crate::error::Result;
use crate::mapper::{MapContext, Mapper};
use mysql_async::Row as MySqlAsyncRow;

/// Map every fetched row onto `T`.
///
/// The column set is taken from the first row, so `mapper` runs its
/// per-query phase once.
///
/// # Example
///
/// ```ignore
/// let rows: Vec<mysql_async::Row> = conn.query("SELECT id, name FROM users").await?;
/// let users: Vec<User> = rowscan::mysql::scan_all(&MapContext::new(), &mapper, rows)?;
/// ```
pub fn scan_all<T>(
    ctx: &MapContext,
    mapper: &Mapper<T>,
    rows: Vec<MySqlAsyncRow>,
) -> Result<Vec<T>> {
    let rows = rows
        .into_iter()
        .map(MySqlRow::from_mysql_row)
        .collect::<Result<Vec<_>>>()?;
    map_rows(ctx, mapper, &rows)
}

/// Map the first fetched row onto `T`, if there is one.
pub fn scan_one<T>(
    ctx: &MapContext,
    mapper: &Mapper<T>,
    rows: Vec<MySqlAsyncRow>,
) -> Result<Option<T>> {
    let row = rows
        .into_iter()
        .next()
        .map(MySqlRow::from_mysql_row)
        .transpose()?;
    map_first(ctx, mapper, row.as_ref())
}

/// Map already decoded rows. The first error stops the scan.
pub fn map_rows<T>(
    ctx: &MapContext,
    mapper: &Mapper<T>,
    rows: &[MySqlRow],
) -> Result<Vec<T>> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };

    let map_row = mapper(ctx, first.columns());
    rows.iter().map(|row| map_row(row)).collect()
}

fn map_first<T>(
    ctx: &MapContext,
    mapper: &Mapper<T>,
    row: Option<&MySqlRow>,
) -> Result<Option<T>> {
    match row {
        Some(row) => {
            let map_row = mapper(ctx, row.columns());
            map_row(row).map(Some)
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::Columns;
    use crate::mapper::{MapperMod, StructMapper};
    use crate::{Error, Row, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Default, PartialEq, crate::Record)]
    struct User {
        pub id: i64,
        pub name: String,
    }

    fn user_row(id: Value, name: &str) -> MySqlRow {
        MySqlRow::from_values([("id", id), ("name", Value::from(name))])
    }

    /// The default mapper for `User`, counting per-query preparations.
    fn counting_mapper(prepared: Arc<AtomicUsize>) -> Mapper<User> {
        let inner = StructMapper::default().into_mapper::<User>();
        Box::new(move |ctx: &MapContext, columns: &Columns| {
            prepared.fetch_add(1, Ordering::SeqCst);
            inner(ctx, columns)
        })
    }

    #[test]
    fn test_map_rows_prepares_once() {
        let prepared = Arc::new(AtomicUsize::new(0));
        let mapper = counting_mapper(prepared.clone());
        let rows = vec![
            user_row(Value::I64(1), "a"),
            user_row(Value::I64(2), "b"),
            user_row(Value::I64(3), "c"),
        ];

        let users = map_rows(&MapContext::new(), &mapper, &rows).unwrap();
        assert_eq!(users.iter().map(|u| u.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(users[1].name, "b");
        assert_eq!(prepared.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_input() {
        let prepared = Arc::new(AtomicUsize::new(0));
        let mapper = counting_mapper(prepared.clone());

        assert!(map_rows(&MapContext::new(), &mapper, &[]).unwrap().is_empty());
        assert!(map_first(&MapContext::new(), &mapper, None).unwrap().is_none());
        assert!(scan_all(&MapContext::new(), &mapper, Vec::new()).unwrap().is_empty());
        assert!(scan_one(&MapContext::new(), &mapper, Vec::new()).unwrap().is_none());
        assert_eq!(prepared.load(Ordering::SeqCst), 0);
    }

    #[derive(Clone, Default)]
    struct RowCounter(Arc<AtomicUsize>);

    impl MapperMod for RowCounter {
        fn before_row(&self, _row: &dyn Row) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_row_error_stops_scan() {
        let mapper = StructMapper::default().into_mapper::<User>();
        let counter = RowCounter::default();
        let ctx = MapContext::new().mapper_mod(counter.clone());
        let rows = vec![
            user_row(Value::I64(1), "a"),
            user_row(Value::from("two"), "b"),
            user_row(Value::I64(3), "c"),
        ];

        let err = map_rows(&ctx, &mapper, &rows).unwrap_err();
        assert!(matches!(err, Error::TypeConversion { expected: "i64", .. }));
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_map_first() {
        let mapper = StructMapper::default().into_mapper::<User>();
        let row = user_row(Value::I64(9), "z");

        let user = map_first(&MapContext::new(), &mapper, Some(&row)).unwrap();
        assert_eq!(
            user,
            Some(User {
                id: 9,
                name: "z".to_string()
            })
        );
    }
}
