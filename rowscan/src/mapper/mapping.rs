//! Column mapping construction

use std::any::TypeId;
use std::collections::hash_map::{self, HashMap};

use tracing::debug;

use super::options::StructMapper;
use crate::error::MappingError;
use crate::shape::{RecordShape, Shape};

/// Where a column's value lives inside a record instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldLocator {
    /// Field indices from the root record to the leaf.
    pub position: Vec<usize>,
    /// Pointer fields that must be allocated before the leaf is reachable,
    /// outermost first.
    pub init: Vec<Vec<usize>>,
    /// The leaf itself is held through a pointer.
    pub is_pointer: bool,
}

/// Column name to [`FieldLocator`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    entries: HashMap<String, FieldLocator>,
}

impl Mapping {
    pub fn get(&self, column: &str) -> Option<&FieldLocator> {
        self.entries.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.entries.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, FieldLocator> {
        self.entries.iter()
    }

    /// Column names, sorted.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        columns.sort_unstable();
        columns
    }

    pub(crate) fn insert(&mut self, column: String, locator: FieldLocator) {
        // Last write wins.
        if let Some(previous) = self.entries.insert(column.clone(), locator) {
            debug!(
                column = %column,
                previous = ?previous.position,
                "column mapped more than once, keeping the later field"
            );
        }
    }
}

impl FromIterator<(String, FieldLocator)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (String, FieldLocator)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Times each type has been entered on the current branch.
type Visited = HashMap<TypeId, usize>;

impl StructMapper {
    /// Build the column mapping of a record shape.
    pub fn get_mapping(&self, shape: &Shape) -> Result<Mapping, MappingError> {
        let record = match shape.clone().pointee() {
            Shape::Record(record) => record,
            other => {
                return Err(MappingError::InvalidDestinationType(format!(
                    "{} is not a record",
                    other.type_name()
                )))
            }
        };

        let mut mapping = Mapping::default();
        self.set_mappings(
            &Shape::Record(record.clone()),
            "",
            Visited::new(),
            &mut mapping,
            &[],
            &[],
        );

        debug!(
            record = record.type_name,
            columns = mapping.len(),
            "built column mapping"
        );
        Ok(mapping)
    }

    fn set_mappings(
        &self,
        shape: &Shape,
        prefix: &str,
        mut visited: Visited,
        mapping: &mut Mapping,
        inits: &[Vec<usize>],
        position: &[usize],
    ) {
        let count = visited.entry(shape.type_id()).or_insert(0);
        if *count > self.max_depth {
            return;
        }
        *count += 1;

        let is_pointer = matches!(shape, Shape::Pointer(_));
        let leaf = |mapping: &mut Mapping| {
            // A pointer to an opaque record is assigned through, not walked.
            let chain = if is_pointer {
                &inits[..inits.len().saturating_sub(1)]
            } else {
                inits
            };
            mapping.insert(
                prefix.to_string(),
                FieldLocator {
                    position: position.to_vec(),
                    init: chain.to_vec(),
                    is_pointer,
                },
            );
        };

        let record: RecordShape = match shape.clone().pointee() {
            Shape::Record(record) => record,
            _ => return leaf(mapping),
        };

        if self
            .scannable_types
            .iter()
            .any(|capability| record.implements(capability))
        {
            return leaf(mapping);
        }

        let mut has_mappable = false;
        for field in &record.fields {
            let tag = field.tag(&self.struct_tag_key);
            if tag == Some("-") {
                continue;
            }
            has_mappable = true;

            let key = if field.embedded {
                prefix.to_string()
            } else {
                // Explicit tags are column names as written.
                let name = match tag {
                    Some(tag) if !tag.is_empty() => tag.to_string(),
                    _ => (self.field_mapper)(field.ident),
                };
                if prefix.is_empty() {
                    name
                } else {
                    format!("{}{}{}", prefix, self.column_separator, name)
                }
            };

            let mut current = position.to_vec();
            current.push(field.index);

            let field_shape = (field.shape)();
            let is_pointer = matches!(field_shape, Shape::Pointer(_));
            match field_shape.clone().pointee() {
                Shape::Record(_) => {
                    let mut child_inits = inits.to_vec();
                    if is_pointer {
                        child_inits.push(current.clone());
                    }
                    self.set_mappings(
                        &field_shape,
                        &key,
                        visited.clone(),
                        mapping,
                        &child_inits,
                        &current,
                    );
                }
                _ => mapping.insert(
                    key,
                    FieldLocator {
                        position: current,
                        init: inits.to_vec(),
                        is_pointer,
                    },
                ),
            }
        }

        // Records without fields (e.g. wrappers with private state) are
        // filled from a single column.
        if !has_mappable {
            leaf(mapping);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mappable;

    #[derive(Debug, Default, crate::Record)]
    struct User {
        #[tag(db = "id")]
        pub id: i64,
        pub display_name: String,
        #[tag(db = "-")]
        pub secret: String,
        pub address: Address,
        pub manager: Option<Box<User>>,
        #[allow(dead_code)]
        internal: u8,
    }

    #[derive(Debug, Default, crate::Record)]
    struct Address {
        pub city: String,
        #[tag(db = "zip", json = "postcode")]
        pub zip_code: Option<String>,
    }

    #[test]
    fn test_nested_and_pointer_locators() {
        let mapper = StructMapper::default();
        let mapping = mapper.get_mapping(&User::shape()).unwrap();

        assert_eq!(
            mapping.get("id"),
            Some(&FieldLocator {
                position: vec![0],
                init: vec![],
                is_pointer: false,
            })
        );
        assert_eq!(mapping.get("address.city").unwrap().position, vec![3, 0]);
        assert!(mapping.get("address.zip").unwrap().is_pointer);
        assert!(!mapping.contains("secret"));
        assert!(!mapping.contains("internal"));

        let manager_city = mapping.get("manager.address.city").unwrap();
        assert_eq!(manager_city.position, vec![4, 3, 0]);
        assert_eq!(manager_city.init, vec![vec![4]]);
        assert!(!manager_city.is_pointer);
    }

    #[test]
    fn test_tag_key_is_configurable() {
        let mapper = StructMapper::builder()
            .struct_tag_key("json")
            .build()
            .unwrap();
        let mapping = mapper.get_mapping(&Address::shape()).unwrap();
        assert_eq!(mapping.columns(), vec!["city", "postcode"]);
    }

    #[test]
    fn test_leaf_shape_is_rejected() {
        let err = StructMapper::default()
            .get_mapping(&<i64 as Mappable>::shape())
            .unwrap_err();
        assert!(matches!(err, MappingError::InvalidDestinationType(_)));
    }
}
