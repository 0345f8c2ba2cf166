//! List Pipeline
//!
//! filter → sort → paginate over an in-memory slice. Nothing is cached: every
//! call re-derives the page from the full list.

use std::cmp::Ordering;

/// A conjunction of predicates; an empty criteria set matches everything
pub trait Criteria<T> {
    fn matches(&self, item: &T) -> bool;
}

/// A comparator selected by the user
pub trait SortOrder<T> {
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

/// Matches every item
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFilter;

impl<T> Criteria<T> for NoFilter {
    fn matches(&self, _item: &T) -> bool {
        true
    }
}

/// Keeps the incoming order
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsorted;

impl<T> SortOrder<T> for Unsorted {
    fn compare(&self, _a: &T, _b: &T) -> Ordering {
        Ordering::Equal
    }
}

/// One page of a filtered, sorted list
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based, already clamped into `1..=total_pages`
    pub index: usize,
    pub total_pages: usize,
    /// Count after filtering
    pub total_items: usize,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// `max(1, ceil(count / page_size))`
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

/// Page 0 reads as 1; anything past the end reads as the last page
pub fn clamp_page(index: usize, total_pages: usize) -> usize {
    index.clamp(1, total_pages.max(1))
}

pub fn filter_sorted<T, C, S>(items: &[T], criteria: &C, order: &S) -> Vec<T>
where
    T: Clone,
    C: Criteria<T>,
    S: SortOrder<T>,
{
    let mut kept: Vec<T> = items.iter().filter(|item| criteria.matches(item)).cloned().collect();
    // sort_by is stable, so ties keep their fetch order
    kept.sort_by(|a, b| order.compare(a, b));
    kept
}

pub fn paginate<T, C, S>(items: &[T], criteria: &C, order: &S, page_index: usize, page_size: usize) -> Page<T>
where
    T: Clone,
    C: Criteria<T>,
    S: SortOrder<T>,
{
    let page_size = page_size.max(1);
    let kept = filter_sorted(items, criteria, order);
    let total_items = kept.len();
    let total_pages = total_pages(total_items, page_size);
    let index = clamp_page(page_index, total_pages);
    let items = kept.into_iter().skip((index - 1) * page_size).take(page_size).collect();

    Page {
        items,
        index,
        total_pages,
        total_items,
    }
}

// ========================
// Page strip
// ========================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page(usize),
    Ellipsis,
}

/// Target of the `‹` button; `None` on the first page
pub fn prev_page(current: usize) -> Option<usize> {
    (current > 1).then(|| current - 1)
}

/// Target of the `›` button; `None` on the last page
pub fn next_page(current: usize, total: usize) -> Option<usize> {
    (current < total).then(|| current + 1)
}

/// `1 … c-1 c c+1 … n`
pub fn page_strip(current: usize, total: usize) -> Vec<PageLink> {
    let total = total.max(1);
    let current = clamp_page(current, total);
    let start = current.saturating_sub(1).max(1);
    let end = (current + 1).min(total);

    let mut links = vec![PageLink::Page(1)];
    if start > 2 {
        links.push(PageLink::Ellipsis);
    }
    links.extend((start..=end).filter(|p| *p != 1 && *p != total).map(PageLink::Page));
    if end + 1 < total {
        links.push(PageLink::Ellipsis);
    }
    if total > 1 {
        links.push(PageLink::Page(total));
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    struct Even;

    impl Criteria<u32> for Even {
        fn matches(&self, item: &u32) -> bool {
            item % 2 == 0
        }
    }

    struct Descending;

    impl SortOrder<u32> for Descending {
        fn compare(&self, a: &u32, b: &u32) -> Ordering {
            b.cmp(a)
        }
    }

    #[test]
    fn test_first_page_of_23() {
        let items: Vec<u32> = (0..23).collect();
        let page = paginate(&items, &NoFilter, &Unsorted, 1, 9);
        assert_eq!(page.items.len(), 9);
        assert_eq!(page.total_pages, 3);
        assert_eq!(prev_page(page.index), None);
        assert_eq!(next_page(page.index, page.total_pages), Some(2));
    }

    #[test]
    fn test_last_page_is_partial() {
        let items: Vec<u32> = (0..23).collect();
        let page = paginate(&items, &NoFilter, &Unsorted, 3, 9);
        assert_eq!(page.items, (18..23).collect::<Vec<_>>());
        assert_eq!(prev_page(page.index), Some(2));
        assert_eq!(next_page(page.index, page.total_pages), None);
    }

    #[test]
    fn test_page_index_clamped() {
        let items: Vec<u32> = (0..23).collect();
        assert_eq!(paginate(&items, &NoFilter, &Unsorted, 0, 9).index, 1);
        assert_eq!(paginate(&items, &NoFilter, &Unsorted, 40, 9).index, 3);
        assert_eq!(paginate::<u32, _, _>(&[], &NoFilter, &Unsorted, 5, 9).index, 1);
    }

    #[test]
    fn test_filter_then_sort() {
        let items: Vec<u32> = vec![3, 8, 1, 4, 6];
        let page = paginate(&items, &Even, &Descending, 1, 2);
        assert_eq!(page.items, vec![8, 6]);
        assert_eq!(page.total_items, 3);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_page_strip_shapes() {
        use PageLink::*;
        assert_eq!(page_strip(1, 1), vec![Page(1)]);
        assert_eq!(page_strip(1, 3), vec![Page(1), Page(2), Page(3)]);
        assert_eq!(page_strip(5, 10), vec![Page(1), Ellipsis, Page(4), Page(5), Page(6), Ellipsis, Page(10)]);
        assert_eq!(page_strip(1, 10), vec![Page(1), Page(2), Ellipsis, Page(10)]);
        assert_eq!(page_strip(10, 10), vec![Page(1), Ellipsis, Page(9), Page(10)]);
    }

    proptest! {
        #[test]
        fn prop_total_pages_formula(count in 0usize..10_000, size in 1usize..100) {
            let expected = std::cmp::max(1, (count + size - 1) / size);
            prop_assert_eq!(total_pages(count, size), expected);
        }

        #[test]
        fn prop_page_never_exceeds_size(len in 0usize..200, size in 1usize..30, index in 0usize..50) {
            let items: Vec<usize> = (0..len).collect();
            let page = paginate(&items, &NoFilter, &Unsorted, index, size);
            prop_assert!(page.items.len() <= size);
            prop_assert!(page.index >= 1 && page.index <= page.total_pages);
        }

        #[test]
        fn prop_strip_contains_current(total in 1usize..60, current in 1usize..60) {
            let current = current.min(total);
            prop_assert!(page_strip(current, total).contains(&PageLink::Page(current)));
        }
    }
}
