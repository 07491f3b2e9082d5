//! Struct mapper configuration

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use super::naming::{snake_case_field, NameMapperFunc};
use crate::error::MappingError;
use crate::shape::Capability;
use crate::traits::Scanner;

/// Default struct tag key
pub const DEFAULT_STRUCT_TAG_KEY: &str = "db";

/// Default separator between nested name segments
pub const DEFAULT_COLUMN_SEPARATOR: &str = ".";

/// Default number of times a type may be re-entered along one branch
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Configuration of the struct mapper.
///
/// Immutable once built. Use [`StructMapper::default`] for the standard
/// settings, or [`StructMapper::new`] / [`StructMapper::builder`] to apply
/// options on top of them.
#[derive(Clone)]
pub struct StructMapper {
    pub(crate) struct_tag_key: String,
    pub(crate) column_separator: String,
    pub(crate) field_mapper: NameMapperFunc,
    pub(crate) scannable_types: Vec<Capability>,
    pub(crate) allow_unknown_columns: bool,
    pub(crate) max_depth: usize,
}

impl Default for StructMapper {
    fn default() -> Self {
        Self {
            struct_tag_key: DEFAULT_STRUCT_TAG_KEY.to_string(),
            column_separator: DEFAULT_COLUMN_SEPARATOR.to_string(),
            field_mapper: Arc::new(snake_case_field),
            scannable_types: vec![Capability::of::<dyn Scanner>()],
            allow_unknown_columns: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl fmt::Debug for StructMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructMapper")
            .field("struct_tag_key", &self.struct_tag_key)
            .field("column_separator", &self.column_separator)
            .field("scannable_types", &self.scannable_types)
            .field("allow_unknown_columns", &self.allow_unknown_columns)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

impl StructMapper {
    /// Apply `options` in order on top of the defaults.
    ///
    /// The first failing option aborts construction.
    pub fn new<I>(options: I) -> Result<Self, MappingError>
    where
        I: IntoIterator<Item = MappingOption>,
    {
        let mut mapper = Self::default();
        for option in options {
            option(&mut mapper)?;
        }
        Ok(mapper)
    }

    /// Create a builder for configuring the mapper.
    pub fn builder() -> StructMapperBuilder {
        StructMapperBuilder::default()
    }

    pub fn struct_tag_key(&self) -> &str {
        &self.struct_tag_key
    }

    pub fn column_separator(&self) -> &str {
        &self.column_separator
    }

    pub fn allow_unknown_columns(&self) -> bool {
        self.allow_unknown_columns
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

/// A configuration mutator applied by [`StructMapper::new`].
pub type MappingOption = Box<dyn FnOnce(&mut StructMapper) -> Result<(), MappingError> + Send>;

/// Use a custom struct tag key. The default tag key is `db`.
pub fn with_struct_tag_key(key: impl Into<String>) -> MappingOption {
    let key = key.into();
    Box::new(move |mapper| {
        if key.is_empty() {
            return Err(MappingError::Configuration(
                "struct tag key must not be empty".to_string(),
            ));
        }
        mapper.struct_tag_key = key;
        Ok(())
    })
}

/// Separator placed between nested name segments. The default is `.`.
pub fn with_column_separator(separator: impl Into<String>) -> MappingOption {
    let separator = separator.into();
    Box::new(move |mapper| {
        mapper.column_separator = separator;
        Ok(())
    })
}

/// Function mapping field identifiers to column names. Explicit tag values
/// are used unchanged. The default maps to snake_case.
pub fn with_field_name_mapper<F>(mapper_fn: F) -> MappingOption
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    Box::new(move |mapper| {
        mapper.field_mapper = Arc::new(mapper_fn);
        Ok(())
    })
}

/// Capabilities marking record types that the row accessor fills as a whole.
///
/// Records advertising one of them are mapped to a single column instead of
/// being split into fields. Each capability must name a trait object,
/// e.g. `Capability::of::<dyn Scanner>()`. The list is appended to the
/// default `[Scanner]`.
pub fn with_scannable_types<I>(capabilities: I) -> MappingOption
where
    I: IntoIterator<Item = Capability>,
{
    let capabilities: Vec<Capability> = capabilities.into_iter().collect();
    Box::new(move |mapper| {
        for capability in capabilities {
            if !capability.is_trait_object() {
                return Err(MappingError::Configuration(format!(
                    "scannable type must be a trait object, got {}",
                    capability.name()
                )));
            }
            mapper.scannable_types.push(capability);
        }
        Ok(())
    })
}

/// Ignore result columns that have no destination field.
/// By default an unknown column is an error.
pub fn with_allow_unknown_columns(allow: bool) -> MappingOption {
    Box::new(move |mapper| {
        mapper.allow_unknown_columns = allow;
        Ok(())
    })
}

/// How many times the same type may be entered along one branch before
/// the builder stops descending. The default is 3.
pub fn with_max_depth(depth: usize) -> MappingOption {
    Box::new(move |mapper| {
        mapper.max_depth = depth;
        Ok(())
    })
}

/// Fluent builder collecting [`MappingOption`]s.
#[derive(Default)]
pub struct StructMapperBuilder {
    options: Vec<MappingOption>,
}

impl StructMapperBuilder {
    pub fn struct_tag_key(mut self, key: impl Into<String>) -> Self {
        self.options.push(with_struct_tag_key(key));
        self
    }

    pub fn column_separator(mut self, separator: impl Into<String>) -> Self {
        self.options.push(with_column_separator(separator));
        self
    }

    pub fn field_name_mapper<F>(mut self, mapper_fn: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.options.push(with_field_name_mapper(mapper_fn));
        self
    }

    pub fn scannable_types<I>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = Capability>,
    {
        self.options.push(with_scannable_types(capabilities));
        self
    }

    pub fn allow_unknown_columns(mut self, allow: bool) -> Self {
        self.options.push(with_allow_unknown_columns(allow));
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.options.push(with_max_depth(depth));
        self
    }

    /// Add an arbitrary option.
    pub fn option(mut self, option: MappingOption) -> Self {
        self.options.push(option);
        self
    }

    /// Options collected so far, in order.
    pub fn into_options(self) -> Vec<MappingOption> {
        self.options
    }

    pub fn build(self) -> Result<StructMapper, MappingError> {
        StructMapper::new(self.options)
    }
}

/// Declarative mapper settings, e.g. a section of an application config file.
///
/// Unset fields keep the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapperSettings {
    pub struct_tag_key: Option<String>,
    pub column_separator: Option<String>,
    pub allow_unknown_columns: Option<bool>,
    pub max_depth: Option<usize>,
}

impl MapperSettings {
    /// Convert into options, in field order.
    pub fn into_options(self) -> Vec<MappingOption> {
        let mut builder = StructMapper::builder();
        if let Some(key) = self.struct_tag_key {
            builder = builder.struct_tag_key(key);
        }
        if let Some(separator) = self.column_separator {
            builder = builder.column_separator(separator);
        }
        if let Some(allow) = self.allow_unknown_columns {
            builder = builder.allow_unknown_columns(allow);
        }
        if let Some(depth) = self.max_depth {
            builder = builder.max_depth(depth);
        }
        builder.into_options()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Custom {}

    #[test]
    fn test_defaults() {
        let mapper = StructMapper::default();
        assert_eq!(mapper.struct_tag_key(), "db");
        assert_eq!(mapper.column_separator(), ".");
        assert!(!mapper.allow_unknown_columns());
        assert_eq!(mapper.max_depth(), 3);
        assert_eq!(mapper.scannable_types, vec![Capability::of::<dyn Scanner>()]);
    }

    #[test]
    fn test_options_apply_in_order() {
        let mapper = StructMapper::new(vec![
            with_column_separator("__"),
            with_column_separator("_"),
            with_max_depth(1),
        ])
        .unwrap();
        assert_eq!(mapper.column_separator(), "_");
        assert_eq!(mapper.max_depth(), 1);
    }

    #[test]
    fn test_first_error_short_circuits() {
        let err = StructMapper::builder()
            .struct_tag_key("")
            .scannable_types([Capability::of::<String>()])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            MappingError::Configuration("struct tag key must not be empty".to_string())
        );
    }

    #[test]
    fn test_scannable_types_must_be_trait_objects() {
        let err = StructMapper::builder()
            .scannable_types([Capability::of::<String>()])
            .build()
            .unwrap_err();
        assert!(matches!(err, MappingError::Configuration(msg) if msg.contains("trait object")));

        let mapper = StructMapper::builder()
            .scannable_types([Capability::of::<dyn Custom>()])
            .build()
            .unwrap();
        assert_eq!(mapper.scannable_types.len(), 2);
    }

    #[test]
    fn test_settings_from_json() {
        let settings: MapperSettings =
            serde_json::from_str(r#"{"struct_tag_key": "col", "max_depth": 5}"#).unwrap();
        let mapper = StructMapper::new(settings.into_options()).unwrap();
        assert_eq!(mapper.struct_tag_key(), "col");
        assert_eq!(mapper.max_depth(), 5);
        assert_eq!(mapper.column_separator(), ".");

        assert!(serde_json::from_str::<MapperSettings>(r#"{"bogus": 1}"#).is_err());
    }
}
