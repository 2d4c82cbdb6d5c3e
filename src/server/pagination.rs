use serde::Deserialize;

use super::deserializers::deserialize_page;

pub const QUESTIONS_PER_PAGE: usize = 10;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page", deserialize_with = "deserialize_page")]
    pub page: i64,
}

pub(crate) fn first_page() -> i64 {
    1
}

/// Returns the `page`-th slice of `QUESTIONS_PER_PAGE` items (1-indexed).
///
/// Pages before the first or past the end are empty rather than an error.
pub fn paginate<T>(page: i64, items: Vec<T>) -> Vec<T> {
    let start = usize::try_from(page.saturating_sub(1))
        .ok()
        .and_then(|p| p.checked_mul(QUESTIONS_PER_PAGE));
    match start {
        Some(start) => items
            .into_iter()
            .skip(start)
            .take(QUESTIONS_PER_PAGE)
            .collect(),
        None => Vec::new(),
    }
}
