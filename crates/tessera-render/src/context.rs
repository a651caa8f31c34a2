//! Per-render evaluation context.
//!
//! A [`RenderContext`] is what filters and template helpers see: the page
//! being rendered, the current content slot, the rendering stack and the
//! pagination state. It is cheap to clone; everything except the content
//! slot is shared.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tessera_store::{Page, ResourceStore};

use crate::error::RenderError;
use crate::filters::FilterRegistry;
use crate::paginate::{Pager, Paginator};
use crate::partial::{PartialRef, PartialResolver};
use crate::stack::RenderStack;

/// Evaluation context for one window of one page.
#[derive(Clone)]
pub struct RenderContext {
    shared: Arc<Shared>,
    stack: RenderStack,
    content: Option<Arc<str>>,
}

struct Shared {
    store: Arc<dyn ResourceStore>,
    filters: Arc<FilterRegistry>,
    page: Page,
    pagination: Pagination,
}

impl RenderContext {
    pub(crate) fn new(
        store: Arc<dyn ResourceStore>,
        filters: Arc<FilterRegistry>,
        page: Page,
        pagination: Pagination,
        stack: RenderStack,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                store,
                filters,
                page,
                pagination,
            }),
            stack,
            content: None,
        }
    }

    /// Output of the previous composition step, if any.
    ///
    /// Empty while the page body itself is being filtered; inside a layout
    /// it holds everything the layout wraps.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Page being rendered, as it was when this window started.
    ///
    /// The page's cursor is not updated when the first window starts
    /// paginating; use [`RenderContext::window_number`] for the live value.
    pub fn page(&self) -> &Page {
        &self.shared.page
    }

    /// Number of the window being rendered, or `None` if the page doesn't
    /// paginate.
    pub fn window_number(&self) -> Option<usize> {
        self.pager().map(|pager| pager.number())
    }

    pub fn stack(&self) -> &RenderStack {
        &self.stack
    }

    pub fn store(&self) -> &dyn ResourceStore {
        self.shared.store.as_ref()
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.shared.filters
    }

    /// Copy of this context with `content` in the content slot.
    #[must_use]
    pub fn with_content(&self, content: impl Into<Arc<str>>) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            stack: self.stack.clone(),
            content: Some(content.into()),
        }
    }

    /// Render a partial through its own filter chain.
    ///
    /// Names are looked up in the page's directory first, then anywhere.
    ///
    /// # Errors
    ///
    /// Fails if the partial can't be found, is already being rendered, or
    /// one of its filters fails.
    pub fn render_partial(&self, partial: impl Into<PartialRef>) -> Result<String, RenderError> {
        let partial =
            PartialResolver::new(self.store()).resolve_ref(partial.into(), self.page().dir())?;
        self.render_body(&partial.path, &partial.meta.filters)
    }

    /// Enter `path` on the stack, then read and filter its body.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::RenderingLoopDetected`] if `path` is already
    /// being rendered, plus any read or filter error.
    pub fn render_body(&self, path: &Path, filters: &[String]) -> Result<String, RenderError> {
        let _guard = self.stack.enter(path)?;
        self.filter_body(path, filters)
    }

    /// Read and filter the body at `path`. The caller holds its stack entry.
    pub(crate) fn filter_body(&self, path: &Path, filters: &[String]) -> Result<String, RenderError> {
        let body = self.store().read(path)?;
        self.filters().process(self, path, filters, &body)
    }

    /// Current pagination window, created on first use.
    ///
    /// Only the first call on a page fixes the window size; later calls
    /// (including those from later windows) reuse the same pager.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidWindowSize`] if the pager has to be
    /// created and `per_page` is zero.
    pub fn paginate_window(&self, total_items: usize, per_page: usize) -> Result<Pager, RenderError> {
        self.shared.pagination.get_or_init(|| {
            let paginator = Paginator::new(total_items, per_page, &self.page().path)?;
            tracing::debug!(
                page = %self.page().path.display(),
                total_items,
                per_page,
                windows = paginator.window_count(),
                "Paginating"
            );
            Ok(paginator.first())
        })
    }

    /// The items of `items` that belong to the current window.
    ///
    /// # Errors
    ///
    /// See [`RenderContext::paginate_window`].
    pub fn paginate<'a, T>(&self, items: &'a [T], per_page: usize) -> Result<&'a [T], RenderError> {
        let pager = self.paginate_window(items.len(), per_page)?;
        Ok(pager.slice(items))
    }

    /// Current pagination window, if the page paginates.
    pub fn pager(&self) -> Option<Pager> {
        self.shared.pagination.current()
    }
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("page", &self.shared.page.path)
            .field("stack", &self.stack.snapshot())
            .field("content", &self.content.as_ref().map(|c| c.len()))
            .finish_non_exhaustive()
    }
}

/// Pagination state for one page, shared by every window's context.
#[derive(Clone, Debug, Default)]
pub struct Pagination {
    current: Arc<Mutex<Option<Pager>>>,
}

impl Pagination {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Window currently being rendered.
    pub fn current(&self) -> Option<Pager> {
        self.lock().clone()
    }

    pub fn is_active(&self) -> bool {
        self.lock().is_some()
    }

    pub(crate) fn get_or_init(
        &self,
        init: impl FnOnce() -> Result<Pager, RenderError>,
    ) -> Result<Pager, RenderError> {
        let mut current = self.lock();
        if let Some(pager) = current.as_ref() {
            return Ok(pager.clone());
        }
        let pager = init()?;
        *current = Some(pager.clone());
        Ok(pager)
    }

    /// Move to the next window, or clear the state if there is none.
    pub(crate) fn advance(&self) -> Option<Pager> {
        let mut current = self.lock();
        let next = current.as_ref().and_then(Pager::next);
        current.clone_from(&next);
        next
    }

    fn lock(&self) -> MutexGuard<'_, Option<Pager>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tessera_store::{MemoryStore, Partial};

    use super::*;

    fn context(store: MemoryStore, page: Page) -> RenderContext {
        RenderContext::new(
            Arc::new(store),
            Arc::new(FilterRegistry::new()),
            page,
            Pagination::new(),
            RenderStack::new(),
        )
    }

    #[test]
    fn test_with_content_shares_page_and_stack() {
        let cx = context(MemoryStore::new(), Page::new("index.md"));
        let inner = cx.with_content("<p>hi</p>");

        assert_eq!(cx.content(), None);
        assert_eq!(inner.content(), Some("<p>hi</p>"));
        assert_eq!(inner.page().path, cx.page().path);

        let _guard = cx.stack().enter(Path::new("index.md")).unwrap();
        assert_eq!(inner.stack().len(), 1);
    }

    #[test]
    fn test_render_partial_reads_body_and_leaves_stack_clean() {
        let store = MemoryStore::new().with_partial(Partial::new("_nav.html"), "<nav/>");
        let cx = context(store, Page::new("index.md"));

        assert_eq!(cx.render_partial("nav").unwrap(), "<nav/>");
        assert!(cx.stack().is_empty());
    }

    #[test]
    fn test_render_partial_inside_itself_is_a_loop() {
        let partial = Partial::new("_nav.html");
        let store = MemoryStore::new().with_partial(partial.clone(), "<nav/>");
        let cx = context(store, Page::new("index.md"));

        let _outer = cx.stack().enter(&partial.path).unwrap();
        let err = cx.render_partial(partial).unwrap_err();

        assert!(err.is_loop_detected());
        assert_eq!(cx.stack().len(), 1);
    }

    #[test]
    fn test_render_missing_partial() {
        let cx = context(MemoryStore::new(), Page::new("index.md"));

        let err = cx.render_partial("missing").unwrap_err();

        assert!(matches!(err, RenderError::PartialNotFound(_)));
        assert!(cx.stack().is_empty());
    }

    #[test]
    fn test_paginate_memoizes_first_window_size() {
        let cx = context(MemoryStore::new(), Page::new("index.md"));
        let items: Vec<u32> = (0..10).collect();

        assert_eq!(cx.window_number(), None);
        assert_eq!(cx.paginate(&items, 3).unwrap(), &[0, 1, 2]);
        assert_eq!(cx.window_number(), Some(1));
        // A different size on a later call is ignored.
        assert_eq!(cx.paginate(&items, 5).unwrap(), &[0, 1, 2]);
        assert_eq!(cx.pager().unwrap().per_page(), 3);
    }

    #[test]
    fn test_paginate_rejects_zero_window() {
        let cx = context(MemoryStore::new(), Page::new("index.md"));

        let err = cx.paginate(&[1, 2, 3], 0).unwrap_err();

        assert!(matches!(err, RenderError::InvalidWindowSize));
        assert!(cx.pager().is_none());
    }

    #[test]
    fn test_pagination_advance_walks_then_clears() {
        let pagination = Pagination::new();
        pagination
            .get_or_init(|| Ok(Paginator::new(5, 2, "index.md")?.first()))
            .unwrap();

        assert_eq!(pagination.advance().map(|p| p.number()), Some(2));
        assert_eq!(pagination.advance().map(|p| p.number()), Some(3));
        assert_eq!(pagination.advance(), None);
        assert!(!pagination.is_active());
    }

    #[test]
    fn test_advance_without_pager_is_none() {
        assert_eq!(Pagination::new().advance(), None);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_context_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RenderContext>();
    }
}
