//! Page slicing for listing results.

/// One page of a result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually served.
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Cuts page `page` of size `page_size` out of `items`.
///
/// Page numbers start at 1; 0 is served as page 1. A page size of 0 is
/// served as 1. A page beyond the end is empty but still reports the totals.
///
/// # Examples
///
/// ```
/// use daybook::query::paginate;
///
/// let page = paginate(vec![1, 2, 3, 4, 5], 2, 2);
/// assert_eq!(page.items, vec![3, 4]);
/// assert_eq!(page.total_pages, 3);
///
/// let first = paginate(vec![1, 2, 3], 0, 2);
/// assert_eq!(first.page, 1);
/// assert_eq!(first.items, vec![1, 2]);
/// ```
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size);

    let start = (page - 1).saturating_mul(page_size);
    let items = items.into_iter().skip(start).take(page_size).collect();

    Page {
        items,
        page,
        page_size,
        total_items,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_reassemble_the_list() {
        for total in 0..25usize {
            for page_size in 1..8usize {
                let list: Vec<usize> = (0..total).collect();
                let first = paginate(list.clone(), 1, page_size);
                assert_eq!(first.total_pages, (total + page_size - 1) / page_size);

                let mut rebuilt = Vec::new();
                for page in 1..=first.total_pages {
                    let p = paginate(list.clone(), page, page_size);
                    assert!(p.items.len() <= page_size);
                    assert!(!p.items.is_empty());
                    rebuilt.extend(p.items);
                }
                assert_eq!(rebuilt, list);
            }
        }
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let page = paginate(vec!['a', 'b', 'c'], 5, 2);
        assert!(page.items.is_empty());
        assert_eq!(page.page, 5);
        assert_eq!(page.total_items, 3);
        assert_eq!(page.total_pages, 2);
        assert!(!page.has_next());
    }

    #[test]
    fn test_navigation_flags() {
        let page = paginate((0..10).collect::<Vec<_>>(), 2, 3);
        assert_eq!(page.items, vec![3, 4, 5]);
        assert!(page.has_previous());
        assert!(page.has_next());

        let page = paginate((0..10).collect::<Vec<_>>(), 1, 3);
        assert!(!page.has_previous());
    }

    #[test]
    fn test_zero_page_size_is_one() {
        let page = paginate(vec![1, 2, 3], 2, 0);
        assert_eq!(page.page_size, 1);
        assert_eq!(page.items, vec![2]);
        assert_eq!(page.total_pages, 3);
    }
}
