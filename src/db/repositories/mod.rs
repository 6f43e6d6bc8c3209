pub mod ingredient;
pub mod recipe;
pub mod recipe_lists;
pub mod shopping_list;
pub mod subscription;
pub mod tag;
pub mod user;

/// Whether 1-based `page` starts inside `total` rows. An offset that
/// overflows `u64` counts as past the end, so the paginator never sees it.
pub(crate) fn page_in_range(page: u64, page_size: u64, total: u64) -> bool {
    page.checked_sub(1)
        .and_then(|p| p.checked_mul(page_size))
        .is_some_and(|offset| offset < total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_in_range() {
        assert!(page_in_range(1, 6, 1));
        assert!(page_in_range(2, 6, 7));
        assert!(!page_in_range(1, 6, 0));
        assert!(!page_in_range(2, 6, 6));
        assert!(!page_in_range(0, 6, 10));
        assert!(!page_in_range(u64::MAX, 6, 10));
    }
}
