use serde::{Deserialize, Serialize};

/// Page-number pagination envelope. `next` and `previous` are page numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Paginated<T> {
    pub count: u64,
    pub next: Option<u64>,
    pub previous: Option<u64>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    #[must_use]
    pub fn new(page: u64, page_size: u64, count: u64, results: Vec<T>) -> Self {
        let next = (page.saturating_mul(page_size) < count).then_some(page + 1);
        let previous = (page > 1).then(|| page - 1);

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

/// Page 1 always exists, even when empty.
#[must_use]
pub const fn page_exists(page: u64, page_size: u64, count: u64) -> bool {
    page == 1 || (page - 1).saturating_mul(page_size) < count
}

/// Parses a `page` query value. Missing means page 1.
pub fn parse_page(raw: Option<&str>) -> Result<u64, String> {
    match raw {
        None => Ok(1),
        Some(value) => match value.trim().parse::<u64>() {
            Ok(page) if page >= 1 => Ok(page),
            _ => Err(format!("Invalid page: '{value}'")),
        },
    }
}
