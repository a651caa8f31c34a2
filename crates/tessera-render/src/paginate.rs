//! Splitting a collection into fixed-size windows.
//!
//! A [`Paginator`] describes the whole split; each [`Pager`] is one window
//! of it. Windows are produced lazily with [`Pager::next`]. The first window
//! always exists, even for an empty collection.

use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::error::RenderError;

/// Window layout for `total_items` split into runs of `per_page`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paginator {
    total_items: usize,
    per_page: usize,
    page: PathBuf,
}

impl Paginator {
    /// Create a paginator for the page at `page`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidWindowSize`] if `per_page` is zero.
    pub fn new(
        total_items: usize,
        per_page: usize,
        page: impl Into<PathBuf>,
    ) -> Result<Self, RenderError> {
        if per_page == 0 {
            return Err(RenderError::InvalidWindowSize);
        }
        Ok(Self {
            total_items,
            per_page,
            page: page.into(),
        })
    }

    /// The first window.
    pub fn first(&self) -> Pager {
        Pager {
            number: 1,
            offset: 0,
            per_page: self.per_page,
            total_items: self.total_items,
            page: self.page.clone(),
        }
    }

    /// Every window, in order.
    pub fn windows(&self) -> impl Iterator<Item = Pager> {
        std::iter::successors(Some(self.first()), Pager::next)
    }

    /// Number of windows (at least one).
    pub fn window_count(&self) -> usize {
        self.total_items.div_ceil(self.per_page).max(1)
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }
}

/// One window of a [`Paginator`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pager {
    number: usize,
    offset: usize,
    per_page: usize,
    total_items: usize,
    page: PathBuf,
}

impl Pager {
    /// 1-based window number.
    pub fn number(&self) -> usize {
        self.number
    }

    /// Index of the first item in this window.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// Source path of the page this window belongs to.
    pub fn page(&self) -> &Path {
        &self.page
    }

    /// Item indices covered by this window.
    pub fn range(&self) -> Range<usize> {
        let end = (self.offset + self.per_page).min(self.total_items);
        self.offset.min(end)..end
    }

    /// Number of items in this window.
    pub fn len(&self) -> usize {
        self.range().len()
    }

    pub fn is_empty(&self) -> bool {
        self.range().is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.offset + self.per_page < self.total_items
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn next_number(&self) -> Option<usize> {
        self.has_next().then_some(self.number + 1)
    }

    pub fn previous_number(&self) -> Option<usize> {
        self.has_previous().then(|| self.number - 1)
    }

    /// The following window, if any items remain.
    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        self.has_next().then(|| Self {
            number: self.number + 1,
            offset: self.offset + self.per_page,
            per_page: self.per_page,
            total_items: self.total_items,
            page: self.page.clone(),
        })
    }

    /// This window's share of `items`.
    ///
    /// Items past the end of `items` are ignored, so a slice shorter than
    /// `total_items` yields a shorter (possibly empty) window.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let range = self.range();
        let end = range.end.min(items.len());
        &items[range.start.min(end)..end]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_ten_items_by_three() {
        let paginator = Paginator::new(10, 3, "blog/index.md").unwrap();

        let windows: Vec<_> = paginator.windows().collect();

        assert_eq!(windows.len(), 4);
        assert_eq!(paginator.window_count(), 4);
        assert_eq!(
            windows.iter().map(Pager::range).collect::<Vec<_>>(),
            vec![0..3, 3..6, 6..9, 9..10]
        );
        assert_eq!(
            windows.iter().map(Pager::has_next).collect::<Vec<_>>(),
            vec![true, true, true, false]
        );
        assert_eq!(
            windows.iter().map(Pager::number).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_window() {
        let paginator = Paginator::new(6, 3, "index.md").unwrap();

        assert_eq!(paginator.windows().count(), 2);
        assert_eq!(paginator.window_count(), 2);
    }

    #[test]
    fn test_empty_collection_has_one_empty_window() {
        let paginator = Paginator::new(0, 5, "index.md").unwrap();
        let first = paginator.first();

        assert!(first.is_empty());
        assert!(!first.has_next());
        assert_eq!(first.range(), 0..0);
        assert_eq!(paginator.window_count(), 1);
    }

    #[test]
    fn test_zero_window_size_is_rejected() {
        let err = Paginator::new(10, 0, "index.md").unwrap_err();

        assert!(matches!(err, RenderError::InvalidWindowSize));
    }

    #[test]
    fn test_neighbour_numbers() {
        let first = Paginator::new(5, 2, "index.md").unwrap().first();
        let second = first.next().unwrap();
        let last = second.next().unwrap();

        assert_eq!(first.previous_number(), None);
        assert_eq!(first.next_number(), Some(2));
        assert_eq!(second.previous_number(), Some(1));
        assert_eq!(second.next_number(), Some(3));
        assert_eq!(last.next_number(), None);
        assert!(last.next().is_none());
        assert_eq!(last.len(), 1);
    }

    #[test]
    fn test_slice_selects_window_items() {
        let items = ["a", "b", "c", "d", "e"];
        let second = Paginator::new(items.len(), 2, "index.md")
            .unwrap()
            .first()
            .next()
            .unwrap();

        assert_eq!(second.slice(&items), &["c", "d"]);
    }

    #[test]
    fn test_slice_tolerates_short_input() {
        let pager = Paginator::new(10, 4, "index.md").unwrap().first();
        let items = [1, 2];

        assert_eq!(pager.slice(&items), &[1, 2]);
        assert_eq!(pager.next().unwrap().slice(&items), &[] as &[i32]);
    }

    #[test]
    fn test_pager_remembers_page() {
        let pager = Paginator::new(1, 1, "blog/index.md").unwrap().first();

        assert_eq!(pager.page(), Path::new("blog/index.md"));
    }
}
