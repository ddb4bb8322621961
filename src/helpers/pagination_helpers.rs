//! Pure pagination math used by [`crate::models::pagination::Paginator`].

/// Maximum number of page buttons shown at once.
pub const VISIBLE_WINDOW: usize = 5;

/// Number of pages for `item_count` items; an empty list still has one page.
pub fn total_pages(item_count: usize, page_size: usize) -> usize {
    item_count.div_ceil(page_size.max(1)).max(1)
}

/// Start/end indices of a 1-based page. Out-of-range pages give an empty range.
pub fn page_bounds(item_count: usize, page_size: usize, page: usize) -> (usize, usize) {
    if page == 0 {
        return (0, 0);
    }

    let page_size = page_size.max(1);
    let start = (page - 1).saturating_mul(page_size).min(item_count);
    let end = start.saturating_add(page_size).min(item_count);
    (start, end)
}

/// Page numbers to display around `current_page`, at most [`VISIBLE_WINDOW`] wide.
pub fn visible_window(current_page: usize, total_pages: usize) -> Vec<usize> {
    let total_pages = total_pages.max(1);
    let start = current_page.saturating_sub(2).max(1).min(total_pages);
    let end = (start + VISIBLE_WINDOW - 1).min(total_pages);
    (start..=end).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(23, 10), 3);
    }

    #[test]
    fn test_last_page_length() {
        for n in 1..60 {
            for p in 1..12 {
                let last = total_pages(n, p);
                let (start, end) = page_bounds(n, p, last);
                let expected = if n % p == 0 { p } else { n % p };
                assert_eq!(end - start, expected, "n={n} p={p}");
            }
        }
        assert_eq!(page_bounds(0, 10, 1), (0, 0));
    }

    #[test]
    fn test_out_of_range_pages_are_empty() {
        assert_eq!(page_bounds(23, 10, 0), (0, 0));
        assert_eq!(page_bounds(23, 10, 4), (23, 23));
        assert_eq!(page_bounds(23, 10, usize::MAX), (23, 23));
    }

    #[test]
    fn test_visible_window_shapes() {
        assert_eq!(visible_window(1, 3), vec![1, 2, 3]);
        assert_eq!(visible_window(1, 1), vec![1]);
        assert_eq!(visible_window(1, 10), vec![1, 2, 3, 4, 5]);
        assert_eq!(visible_window(6, 10), vec![4, 5, 6, 7, 8]);
        assert_eq!(visible_window(10, 10), vec![8, 9, 10]);
    }

    #[test]
    fn test_visible_window_bounds() {
        for total in 1..30 {
            for current in 0..total + 5 {
                let window = visible_window(current, total);
                assert!(!window.is_empty());
                assert!(window.len() <= VISIBLE_WINDOW);
                assert!(window.iter().all(|page| (1..=total).contains(page)));
                assert!(window.windows(2).all(|pair| pair[1] == pair[0] + 1));
            }
        }
    }
}
