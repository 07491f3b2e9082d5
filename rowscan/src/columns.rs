//! Column set of a result

use std::collections::HashMap;

/// The column names of one query result, with their ordinals.
///
/// Supplied by the query layer and only read by the mappers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Columns {
    names: Vec<String>,
    ordinals: HashMap<String, usize>,
}

impl Columns {
    /// Build a column set from names in result order.
    ///
    /// A repeated name keeps its first ordinal.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut columns = Self::default();
        for name in names {
            let name = name.into();
            if columns.ordinals.contains_key(&name) {
                continue;
            }
            columns.ordinals.insert(name.clone(), columns.names.len());
            columns.names.push(name);
        }
        columns
    }

    /// Column names in result order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn ordinal(&self, name: &str) -> Option<usize> {
        self.ordinals.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ordinals.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Columns {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_follow_result_order() {
        let columns = Columns::new(["id", "name", "id"]);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns.ordinal("id"), Some(0));
        assert_eq!(columns.ordinal("name"), Some(1));
        assert_eq!(columns.ordinal("missing"), None);
        assert_eq!(columns.iter().collect::<Vec<_>>(), ["id", "name"]);
    }
}
