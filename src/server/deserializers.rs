use serde::{Deserialize, Deserializer};

use super::pagination::first_page;

// `?page=abc` falls back to the first page instead of rejecting the request
pub fn deserialize_page<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or_else(first_page))
}

#[cfg(test)]
mod tests {
    use crate::server::pagination::PageQuery;

    fn parse(query: &str) -> PageQuery {
        let uri: axum::http::Uri = format!("/questions?{query}").parse().unwrap();
        axum::extract::Query::<PageQuery>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn missing_page_defaults_to_first() {
        assert_eq!(parse("").page, 1);
        assert_eq!(parse("other=2").page, 1);
    }

    #[test]
    fn numeric_page_is_kept() {
        assert_eq!(parse("page=3").page, 3);
        assert_eq!(parse("page=-2").page, -2);
    }

    #[test]
    fn garbage_page_is_coerced() {
        assert_eq!(parse("page=abc").page, 1);
        assert_eq!(parse("page=").page, 1);
    }
}
