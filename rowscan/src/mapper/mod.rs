//! Two-phase row mappers
//!
//! A [`Mapper`] is called once per query with the result's [`Columns`] and
//! returns a [`RowMapper`], which is then called once per row. All type
//! inspection and column matching happens in the first phase.

mod classify;
mod filter;
mod mapping;
mod materialize;
mod naming;
mod options;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

pub use classify::erase_map_values;
pub use filter::filter_columns;
pub use mapping::{FieldLocator, Mapping};
pub use naming::{snake_case_field, NameMapperFunc};
pub use options::{
    with_allow_unknown_columns, with_column_separator, with_field_name_mapper, with_max_depth,
    with_scannable_types, with_struct_tag_key, MapperSettings, MappingOption, StructMapper,
    StructMapperBuilder, DEFAULT_COLUMN_SEPARATOR, DEFAULT_MAX_DEPTH, DEFAULT_STRUCT_TAG_KEY,
};

use crate::columns::Columns;
use crate::error::{MappingError, Result};
use crate::shape::Shape;
use crate::traits::{Mappable, Row};
use classify::{adapt_custom, classify, Destination};
use materialize::Materializer;

/// Second phase: turns one row into a `T`.
pub type RowMapper<T> = Box<dyn Fn(&dyn Row) -> Result<T> + Send + Sync>;

/// First phase: prepares a [`RowMapper`] for one result.
pub type Mapper<T> = Box<dyn Fn(&MapContext, &Columns) -> RowMapper<T> + Send + Sync>;

/// Hooks run around every row a mapper produces.
pub trait MapperMod: Send + Sync {
    /// Called before the row is materialized.
    fn before_row(&self, _row: &dyn Row) -> Result<()> {
        Ok(())
    }

    /// Called with the materialized value.
    fn after_row(&self, _row: &dyn Row, _value: &dyn Any) -> Result<()> {
        Ok(())
    }
}

/// Per-query settings passed next to the column set.
#[derive(Clone, Default)]
pub struct MapContext {
    /// Only columns starting with this prefix are mapped, with the prefix
    /// stripped before lookup.
    pub struct_tag_prefix: Option<String>,
    /// Allow unknown columns for this query regardless of the mapper setting.
    pub allow_unknown_columns: bool,
    pub mapper_mods: Vec<Arc<dyn MapperMod>>,
}

impl MapContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn struct_tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.struct_tag_prefix = Some(prefix.into());
        self
    }

    pub fn allow_unknown_columns(mut self, allow: bool) -> Self {
        self.allow_unknown_columns = allow;
        self
    }

    pub fn mapper_mod(mut self, hook: impl MapperMod + 'static) -> Self {
        self.mapper_mods.push(Arc::new(hook));
        self
    }
}

impl fmt::Debug for MapContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapContext")
            .field("struct_tag_prefix", &self.struct_tag_prefix)
            .field("allow_unknown_columns", &self.allow_unknown_columns)
            .field("mapper_mods", &self.mapper_mods.len())
            .finish()
    }
}

/// Map rows onto `T` with the default [`StructMapper`].
///
/// # Example
///
/// ```ignore
/// #[derive(Default, Record)]
/// pub struct User {
///     pub id: i64,
///     pub name: String,
/// }
///
/// let map_row = rowscan::struct_mapper::<User>(&MapContext::new(), &columns);
/// for row in &rows {
///     let user = map_row(row)?;
/// }
/// ```
pub fn struct_mapper<T>(ctx: &MapContext, columns: &Columns) -> RowMapper<T>
where
    T: Mappable + Default + Send,
{
    StructMapper::default().row_mapper(ctx, columns)
}

/// A [`Mapper`] for `T` using the given options.
///
/// Option errors do not surface here; the returned mapper yields them for
/// every row instead.
pub fn custom_struct_mapper<T, I>(options: I) -> Mapper<T>
where
    T: Mappable + Default + Send,
    I: IntoIterator<Item = MappingOption>,
{
    match StructMapper::new(options) {
        Ok(mapper) => mapper.into_mapper(),
        Err(err) => Box::new(move |_: &MapContext, _: &Columns| error_mapper(err.clone())),
    }
}

/// A row mapper that fails every row with `err`.
pub fn error_mapper<T: 'static>(err: MappingError) -> RowMapper<T> {
    Box::new(move |_: &dyn Row| Err(err.clone().into()))
}

impl StructMapper {
    /// Prepare a row mapper for `T` against one result's columns.
    pub fn row_mapper<T>(&self, ctx: &MapContext, columns: &Columns) -> RowMapper<T>
    where
        T: Mappable + Default + Send,
    {
        let inner = match self.prepare::<T>(ctx, columns) {
            Ok(inner) => inner,
            Err(err) => return error_mapper(err),
        };

        if ctx.mapper_mods.is_empty() {
            return inner;
        }
        let mods = ctx.mapper_mods.clone();
        Box::new(move |row: &dyn Row| {
            for hook in &mods {
                hook.before_row(row)?;
            }
            let value = inner(row)?;
            for hook in &mods {
                hook.after_row(row, &value)?;
            }
            Ok(value)
        })
    }

    /// Turn this configuration into a reusable [`Mapper`].
    pub fn into_mapper<T>(self) -> Mapper<T>
    where
        T: Mappable + Default + Send,
    {
        Box::new(move |ctx: &MapContext, columns: &Columns| self.row_mapper(ctx, columns))
    }

    fn prepare<T>(
        &self,
        ctx: &MapContext,
        columns: &Columns,
    ) -> std::result::Result<RowMapper<T>, MappingError>
    where
        T: Mappable + Default + Send,
    {
        let record = match classify::<T>()? {
            Destination::Custom(custom) => return Ok(adapt_custom(custom, ctx, columns)),
            Destination::Fields(record) => record,
        };

        let mapping = self.get_mapping(&Shape::Record(record))?;
        let filtered = filter_columns(ctx, columns, &mapping, self.allow_unknown_columns)?;
        debug!(
            destination = std::any::type_name::<T>(),
            columns = filtered.len(),
            "prepared row mapper"
        );

        let materializer = Materializer::<T>::new(filtered);
        Ok(Box::new(move |row: &dyn Row| materializer.materialize(row)))
    }
}
