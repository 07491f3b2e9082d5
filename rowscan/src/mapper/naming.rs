//! Field name to column name mapping

use std::sync::Arc;

use heck::ToSnakeCase;

/// Maps a field identifier to a column name.
pub type NameMapperFunc = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Default name mapper: `UserID` -> `user_id`, `HTTPStatus` -> `http_status`.
pub fn snake_case_field(name: &str) -> String {
    name.to_snake_case()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case_acronyms() {
        assert_eq!(snake_case_field("UserID"), "user_id");
        assert_eq!(snake_case_field("HTTPStatus"), "http_status");
        assert_eq!(snake_case_field("APIKey"), "api_key");
        assert_eq!(snake_case_field("ID"), "id");
    }

    #[test]
    fn test_snake_case_is_stable_on_rust_idents() {
        assert_eq!(snake_case_field("created_at"), "created_at");
        assert_eq!(snake_case_field("name"), "name");
    }
}
