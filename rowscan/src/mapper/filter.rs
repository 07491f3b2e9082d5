//! Matching a mapping against the columns of a result

use tracing::trace;

use super::mapping::Mapping;
use super::MapContext;
use crate::columns::Columns;
use crate::error::MappingError;

/// Keep only the mapping entries for columns present in `columns`.
///
/// With a struct tag prefix set on `ctx`, columns without the prefix are
/// skipped and the prefix is stripped before lookup. Entries are keyed by the
/// original column name. An unknown column fails the whole filter unless
/// `allow_unknown` or the context override allows it.
pub fn filter_columns(
    ctx: &MapContext,
    columns: &Columns,
    mapping: &Mapping,
    allow_unknown: bool,
) -> Result<Mapping, MappingError> {
    let allow_unknown = allow_unknown || ctx.allow_unknown_columns;
    let prefix = ctx.struct_tag_prefix.as_deref().unwrap_or("");

    let mut filtered = Vec::with_capacity(columns.len());
    for name in columns.iter() {
        let key = match name.strip_prefix(prefix) {
            Some(key) => key,
            None => {
                trace!(column = name, prefix, "column outside struct tag prefix");
                continue;
            }
        };

        match mapping.get(key) {
            Some(locator) => filtered.push((name.to_string(), locator.clone())),
            None if allow_unknown => trace!(column = name, "skipping unknown column"),
            None => return Err(MappingError::NoDestinationForColumn(name.to_string())),
        }
    }

    Ok(filtered.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::FieldLocator;

    fn locator(index: usize) -> FieldLocator {
        FieldLocator {
            position: vec![index],
            ..Default::default()
        }
    }

    fn mapping() -> Mapping {
        [
            ("id".to_string(), locator(0)),
            ("name".to_string(), locator(1)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_unknown_column_fails() {
        let columns = Columns::new(["id", "name", "extra"]);
        let err = filter_columns(&MapContext::default(), &columns, &mapping(), false).unwrap_err();
        assert_eq!(err, MappingError::NoDestinationForColumn("extra".to_string()));
    }

    #[test]
    fn test_unknown_column_allowed() {
        let columns = Columns::new(["id", "name", "extra"]);
        let filtered = filter_columns(&MapContext::default(), &columns, &mapping(), true).unwrap();
        assert_eq!(filtered, mapping());

        let ctx = MapContext::new().allow_unknown_columns(true);
        let filtered = filter_columns(&ctx, &columns, &mapping(), false).unwrap();
        assert_eq!(filtered, mapping());
    }

    #[test]
    fn test_prefix_restricts_and_keeps_original_names() {
        let columns = Columns::new(["u.id", "u.name", "p.id"]);
        let ctx = MapContext::new().struct_tag_prefix("u.");
        let filtered = filter_columns(&ctx, &columns, &mapping(), false).unwrap();
        assert_eq!(filtered.columns(), vec!["u.id", "u.name"]);
        assert_eq!(filtered.get("u.name"), Some(&locator(1)));
    }

    #[test]
    fn test_only_present_columns_are_kept() {
        let columns = Columns::new(["name"]);
        let filtered = filter_columns(&MapContext::default(), &columns, &mapping(), false).unwrap();
        assert_eq!(filtered.len(), 1);
        assert!(filtered.contains("name"));
    }
}
