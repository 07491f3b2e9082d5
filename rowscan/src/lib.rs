//! rowscan - map result rows onto Rust structs
//!
//! The query layer supplies the column names of a result and a [`Row`]
//! accessor per row; rowscan works out, once per query, which column lands
//! in which field and then fills a fresh value for every row.
//!
//! # Features
//!
//! - **Derive Macro**: `#[derive(Record)]` describes a struct to the mapper
//! - **Nested Structs**: named nested fields map to `parent.child` columns,
//!   `#[scan(embed)]` fields flatten into the parent
//! - **Lazy Pointers**: `Option<T>` / `Box<T>` fields are allocated only when
//!   a column below them is present
//! - **Custom Mapping**: `Scanner` for single-column types, `MapValues` for
//!   records that map rows themselves
//!
//! # Example
//!
//! ```ignore
//! use rowscan::{Columns, MapContext, Record};
//!
//! #[derive(Debug, Default, Record)]
//! pub struct User {
//!     #[tag(db = "id")]
//!     pub id: i64,
//!     pub name: String,
//!     pub address: Option<Address>,
//! }
//!
//! #[derive(Debug, Default, Record)]
//! pub struct Address {
//!     pub city: String,
//! }
//!
//! let columns = Columns::new(["id", "name", "address.city"]);
//! let map_row = rowscan::struct_mapper::<User>(&MapContext::new(), &columns);
//! let user = map_row(&row)?;
//! ```

// Lets `#[derive(Record)]` refer to `::rowscan` from inside this crate.
extern crate self as rowscan;

pub mod columns;
pub mod error;
pub mod mapper;
#[cfg(feature = "mysql")]
pub mod mysql;
pub mod shape;
pub mod traits;
pub mod value;

pub use rowscan_derive::Record;

pub use columns::Columns;
pub use error::{Error, MappingError, Result};
pub use mapper::{
    custom_struct_mapper, error_mapper, struct_mapper, FieldLocator, MapContext, Mapper,
    MapperMod, MapperSettings, Mapping, MappingOption, RowMapper, StructMapper,
};
#[cfg(feature = "mysql")]
pub use mysql::MySqlRow;
pub use shape::{Capability, FieldShape, LeafShape, PointerShape, RecordShape, Shape};
pub use traits::{
    FromValue, MapValues, Mappable, PointerSlot, RecordSlot, Row, RowExt, Scanner, Slot,
    ValueSlot,
};
pub use value::Value;
