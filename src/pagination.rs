//! Pagination over an ordered, fully materialized collection
//!
//! A [`Pagination`] is built per request from the already filtered and
//! sorted article list. It never validates the requested page: an
//! out-of-range page simply yields no items, and the caller decides whether
//! that is a "not found".

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// How many page numbers to show around the edges and the current page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageWindow {
    /// Always show this many pages at the start
    pub left_edge: usize,
    /// Pages shown before the current one
    pub left_current: usize,
    /// Pages shown after the current one
    pub right_current: usize,
    /// Always show this many pages at the end
    pub right_edge: usize,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            left_edge: 2,
            left_current: 2,
            right_current: 5,
            right_edge: 2,
        }
    }
}

/// One window of an ordered collection
#[derive(Debug, Clone)]
pub struct Pagination<T> {
    all_items: Vec<T>,
    page: i64,
    per_page: NonZeroUsize,
}

impl<T> Pagination<T> {
    /// Materialize `items` and select the 1-based `page`
    pub fn new<I>(items: I, page: i64, per_page: NonZeroUsize) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self {
            all_items: items.into_iter().collect(),
            page,
            per_page,
        }
    }

    /// The requested page number, as given
    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn per_page(&self) -> usize {
        self.per_page.get()
    }

    /// Number of items across all pages
    pub fn total(&self) -> usize {
        self.all_items.len()
    }

    /// Items on the requested page; empty when the page is out of range
    pub fn items(&self) -> &[T] {
        if self.page < 1 {
            return &[];
        }

        let per_page = self.per_page.get();
        let lower = usize::try_from(self.page - 1)
            .ok()
            .and_then(|p| p.checked_mul(per_page));

        match lower {
            Some(lower) if lower < self.all_items.len() => {
                let upper = lower.saturating_add(per_page).min(self.all_items.len());
                &self.all_items[lower..upper]
            }
            _ => &[],
        }
    }

    /// Total number of pages (0 for an empty collection)
    pub fn pages(&self) -> usize {
        self.all_items.len().div_ceil(self.per_page.get())
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages() as i64
    }

    /// Page numbers for a pager, with `None` standing in for elided runs
    ///
    /// ```ignore
    /// // 10 pages, current page 5, one page either side:
    /// // [1, 2, None, 4, 5, 6, None, 9, 10]
    /// ```
    pub fn iter_pages(&self, window: PageWindow) -> IterPages {
        IterPages {
            pages: self.pages() as i64,
            current: self.page,
            window,
            next: 1,
            last: 0,
            pending: None,
        }
    }
}

/// Lazy page-number iterator returned by [`Pagination::iter_pages`]
#[derive(Debug, Clone)]
pub struct IterPages {
    pages: i64,
    current: i64,
    window: PageWindow,
    next: i64,
    last: i64,
    pending: Option<usize>,
}

impl IterPages {
    fn includes(&self, i: i64) -> bool {
        let w = &self.window;
        let left_edge = clamp_i64(w.left_edge);
        let right_edge = clamp_i64(w.right_edge);
        let left_current = clamp_i64(w.left_current);
        let right_current = clamp_i64(w.right_current);

        i <= left_edge
            || i > self.pages.saturating_sub(right_edge)
            || (self.current.saturating_sub(left_current).saturating_sub(1) < i
                && i <= self.current.saturating_add(right_current))
    }
}

fn clamp_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl Iterator for IterPages {
    type Item = Option<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        // A number held back while its gap marker went out first
        if let Some(page) = self.pending.take() {
            return Some(Some(page));
        }

        while self.next <= self.pages {
            let i = self.next;
            self.next += 1;

            if !self.includes(i) {
                continue;
            }

            let gap = self.last + 1 != i;
            self.last = i;
            if gap {
                self.pending = Some(i as usize);
                return Some(None);
            }
            return Some(Some(i as usize));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn per_page(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn letters() -> Vec<char> {
        "ABCDEFGHIJKLMNOPQRS".chars().collect()
    }

    #[test]
    fn test_page_count_is_ceiling() {
        for n in 0..50usize {
            for pp in 1..8usize {
                let p = Pagination::new(0..n, 1, per_page(pp));
                assert_eq!(p.pages(), (n + pp - 1) / pp, "n={} per_page={}", n, pp);
            }
        }
        assert_eq!(Pagination::new(0..20, 1, per_page(2)).pages(), 10);
        assert_eq!(Pagination::new(0..0, 1, per_page(3)).pages(), 0);
    }

    #[test]
    fn test_middle_page() {
        let p = Pagination::new(letters(), 5, per_page(2));
        assert_eq!(p.items(), &['I', 'J']);
        assert_eq!(p.pages(), 10);
        assert!(p.has_prev());
        assert!(p.has_next());
    }

    #[test]
    fn test_iter_pages_narrow_window() {
        let p = Pagination::new(letters(), 5, per_page(2));
        let window = PageWindow {
            left_current: 1,
            right_current: 1,
            ..Default::default()
        };
        let pages: Vec<_> = p.iter_pages(window).collect();
        assert_eq!(
            pages,
            vec![
                Some(1),
                Some(2),
                None,
                Some(4),
                Some(5),
                Some(6),
                None,
                Some(9),
                Some(10)
            ]
        );
    }

    #[test]
    fn test_iter_pages_default_window() {
        let p = Pagination::new(0..100, 10, per_page(5));
        let pages: Vec<_> = p.iter_pages(PageWindow::default()).collect();
        assert_eq!(
            pages,
            vec![
                Some(1),
                Some(2),
                None,
                Some(8),
                Some(9),
                Some(10),
                Some(11),
                Some(12),
                Some(13),
                Some(14),
                Some(15),
                None,
                Some(19),
                Some(20)
            ]
        );
    }

    #[test]
    fn test_iter_pages_small_collection_has_no_gaps() {
        let p = Pagination::new(0..6, 1, per_page(2));
        let pages: Vec<_> = p.iter_pages(PageWindow::default()).collect();
        assert_eq!(pages, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_iter_pages_huge_window_shows_everything() {
        let p = Pagination::new(letters(), 5, per_page(2));
        for window in [
            PageWindow {
                left_edge: usize::MAX,
                ..Default::default()
            },
            PageWindow {
                right_edge: usize::MAX,
                ..Default::default()
            },
            PageWindow {
                left_edge: 0,
                left_current: usize::MAX,
                right_current: usize::MAX,
                right_edge: 0,
            },
        ] {
            let pages: Vec<_> = p.iter_pages(window).collect();
            assert_eq!(pages, (1..=10).map(Some).collect::<Vec<_>>(), "{:?}", window);
        }
    }

    #[test]
    fn test_iter_pages_is_restartable() {
        let p = Pagination::new(letters(), 5, per_page(2));
        let iter = p.iter_pages(PageWindow::default());
        let first: Vec<_> = iter.clone().collect();
        let second: Vec<_> = iter.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_first_page_has_no_prev() {
        let p = Pagination::new(letters(), 1, per_page(4));
        assert!(!p.has_prev());
        assert!(p.has_next());
        assert_eq!(p.items(), &['A', 'B', 'C', 'D']);
    }

    #[test]
    fn test_last_page_holds_remainder() {
        let p = Pagination::new(letters(), 10, per_page(2));
        assert_eq!(p.items(), &['S']);
        assert!(p.has_prev());
        assert!(!p.has_next());

        let p = Pagination::new(letters(), 4, per_page(5));
        assert_eq!(p.items().len(), 19 % 5);
    }

    #[test]
    fn test_out_of_range_pages_are_empty() {
        for page in [-3, -1, 0, 11, 12, i64::MAX, i64::MIN] {
            let p = Pagination::new(letters(), page, per_page(2));
            assert!(p.items().is_empty(), "page {} should be empty", page);
        }
    }

    #[test]
    fn test_empty_collection() {
        let p = Pagination::new(Vec::<u8>::new(), 1, per_page(10));
        assert_eq!(p.pages(), 0);
        assert!(p.items().is_empty());
        assert!(!p.has_prev());
        assert!(!p.has_next());
        assert_eq!(p.iter_pages(PageWindow::default()).count(), 0);
    }

    #[test]
    fn test_repeated_reads_are_identical() {
        let p = Pagination::new(letters(), 3, per_page(3));
        let items = p.items().to_vec();
        for _ in 0..3 {
            assert_eq!(p.items(), items.as_slice());
            assert_eq!(p.pages(), 7);
            assert!(p.has_prev());
            assert!(p.has_next());
        }
    }

    #[test]
    fn test_materializes_one_shot_iterators() {
        let source = letters().into_iter().filter(|c| *c != 'A');
        let p = Pagination::new(source, 1, per_page(2));
        assert_eq!(p.items(), &['B', 'C']);
        assert_eq!(p.items(), &['B', 'C']);
        assert_eq!(p.total(), 18);
    }

    #[test]
    fn test_no_consecutive_gaps() {
        for n in [0usize, 1, 7, 19, 40] {
            for pp in [1usize, 3, 10] {
                let pagination = Pagination::new(0..n, 1, per_page(pp));
                let pages = pagination.pages() as i64;
                for page in -1..=pages + 1 {
                    let p = Pagination::new(0..n, page, per_page(pp));
                    for le in 0..3 {
                        for lc in 0..3 {
                            for rc in 0..3 {
                                for re in 0..3 {
                                    let window = PageWindow {
                                        left_edge: le,
                                        left_current: lc,
                                        right_current: rc,
                                        right_edge: re,
                                    };
                                    let markers: Vec<_> = p.iter_pages(window).collect();
                                    assert!(
                                        markers.windows(2).all(|w| w[0].is_some() || w[1].is_some()),
                                        "consecutive gaps in {:?}",
                                        markers
                                    );
                                    let numbers: Vec<_> = markers.iter().flatten().collect();
                                    assert!(numbers.windows(2).all(|w| w[0] < w[1]));
                                    assert!(markers.first().map_or(true, |m| m.is_some() || le == 0));
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
