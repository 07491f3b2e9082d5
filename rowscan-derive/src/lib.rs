//! Derive macros for the rowscan row mapping engine
//!
//! This crate provides `#[derive(Record)]`, which describes a struct to the
//! mapper and gives it indexed field access. It is re-exported from the
//! `rowscan` crate, so users typically don't need to depend on it directly.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod record;

/// Derive macro describing a struct to the row mapper.
///
/// Only `pub` fields take part in mapping. The struct must also implement
/// `Default`, which provides the starting value of every row.
///
/// # Field attributes
///
/// - `#[tag(db = "column", json = "other")]` - Tag values keyed by tag name. The
///   mapper reads the tag named by its struct tag key (`db` by default); the
///   value `"-"` skips the field
/// - `#[scan(embed)]` - Flatten a nested record into the parent's names
/// - `#[scan(skip)]` - Leave the field out of the description entirely
///
/// # Container attributes
///
/// - `#[scan(scanner)]` - The type implements `rowscan::Scanner` and is filled
///   from a single column
/// - `#[scan(capability(path::ToTrait, ...))]` - Advertise extra capabilities
///   that can be configured as scannable
/// - `#[scan(map_values)]` - The type implements `rowscan::MapValues` and maps
///   rows itself
///
/// # Example
///
/// ```ignore
/// use rowscan::Record;
///
/// #[derive(Default, Record)]
/// pub struct User {
///     #[tag(db = "user_id")]
///     pub id: i64,
///     pub name: String,
///     #[scan(embed)]
///     pub audit: Audit,
///     pub manager: Option<Box<User>>,
/// }
/// ```
#[proc_macro_derive(Record, attributes(scan, tag))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::derive_record_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
