//! Page renderer.
//!
//! A [`Renderer`] owns one page for the duration of its render, across every
//! pagination window. Each window is composed by [`Renderer::layout_page`]:
//! the page body goes through the page's filters, then each layout in turn
//! wraps the result until a resource without a layout is reached.

use std::path::PathBuf;
use std::sync::Arc;

use tessera_store::{OutputSink, Page, Resource, ResourceStore};

use crate::context::{Pagination, RenderContext};
use crate::error::RenderError;
use crate::filters::FilterRegistry;
use crate::paginate::Pager;
use crate::stack::{GuardChain, RenderStack};

/// Files written for one page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageReport {
    /// Source path of the page.
    pub source: PathBuf,
    /// Output paths written, one per window, in order.
    pub destinations: Vec<PathBuf>,
}

/// Renders a single page into its layouts.
pub struct Renderer {
    page: Page,
    store: Arc<dyn ResourceStore>,
    filters: Arc<FilterRegistry>,
    pagination: Pagination,
}

impl Renderer {
    /// Create a renderer for `resource`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidResourceKind`] unless `resource` is a
    /// page.
    pub fn new(
        resource: impl Into<Resource>,
        store: Arc<dyn ResourceStore>,
        filters: Arc<FilterRegistry>,
    ) -> Result<Self, RenderError> {
        let page = match resource.into() {
            Resource::Page(page) => page,
            other => {
                return Err(RenderError::InvalidResourceKind {
                    kind: other.kind(),
                    path: other.path().to_path_buf(),
                });
            }
        };

        Ok(Self {
            page,
            store,
            filters,
            pagination: Pagination::new(),
        })
    }

    /// The page, with its pagination cursor for the current window.
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Current pagination window, if the page has started paginating.
    pub fn pager(&self) -> Option<Pager> {
        self.pagination.current()
    }

    /// Filter the page body without applying any layout.
    ///
    /// # Errors
    ///
    /// Returns any read, filter or loop error raised while rendering.
    pub fn render_page(&self) -> Result<String, RenderError> {
        let stack = RenderStack::new();
        let result = self
            .context(&stack)
            .render_body(&self.page.path, &self.page.meta.filters);
        stack.ensure_empty(&self.page.path)?;
        result
    }

    /// Filter the page and wrap it in its chain of layouts.
    ///
    /// A layout name that doesn't resolve ends the chain; what has been
    /// composed so far is returned.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::RenderingLoopDetected`] if the layout chain (or
    /// a partial inside it) loops, [`RenderError::StackCorrupted`] if the
    /// stack isn't empty afterwards, and any read or filter error.
    pub fn layout_page(&self) -> Result<String, RenderError> {
        let stack = RenderStack::new();
        let result = self.compose(&stack);
        stack.ensure_empty(&self.page.path)?;
        result
    }

    fn compose(&self, stack: &RenderStack) -> Result<String, RenderError> {
        let cx = self.context(stack);
        let mut held = GuardChain::default();

        held.push(stack.enter(&self.page.path)?);
        let mut content = cx.filter_body(&self.page.path, &self.page.meta.filters)?;

        let mut next = self.page.meta.layout.clone();
        while let Some(name) = next {
            let Some(layout) = self.store.find_layout(&name) else {
                tracing::warn!(
                    page = %self.page.path.display(),
                    layout = %name,
                    "Layout not found, stopping layout chain"
                );
                break;
            };
            tracing::debug!(
                page = %self.page.path.display(),
                layout = %layout.path.display(),
                "Applying layout"
            );

            held.push(stack.enter(&layout.path)?);
            content = cx
                .with_content(content)
                .filter_body(&layout.path, &layout.meta.filters)?;
            next = layout.meta.layout;
        }

        Ok(content)
    }

    /// Advance to the next pagination window.
    ///
    /// Returns `false` when the page doesn't paginate or the last window has
    /// been rendered; the cursor is cleared in that case.
    pub fn next_page(&mut self) -> bool {
        match self.pagination.advance() {
            Some(pager) => {
                tracing::debug!(
                    page = %self.page.path.display(),
                    number = pager.number(),
                    "Advancing to next window"
                );
                self.page.number = Some(pager.number());
                true
            }
            None => {
                self.page.number = None;
                false
            }
        }
    }

    /// Render every window of the page and write each one to its destination.
    ///
    /// # Errors
    ///
    /// Stops at the first window that fails to render or write. Windows
    /// already written stay written.
    pub fn write(mut self, sink: &dyn OutputSink) -> Result<PageReport, RenderError> {
        let mut destinations = Vec::new();
        loop {
            let output = self.layout_page()?;
            self.page.number = self.pagination.current().map(|pager| pager.number());
            let destination = self.page.current_destination();
            sink.write(&destination, &output)?;
            tracing::info!(
                page = %self.page.path.display(),
                destination = %destination.display(),
                "Wrote page"
            );
            destinations.push(destination);

            if !self.next_page() {
                break;
            }
        }

        Ok(PageReport {
            source: self.page.path,
            destinations,
        })
    }

    fn context(&self, stack: &RenderStack) -> RenderContext {
        RenderContext::new(
            Arc::clone(&self.store),
            Arc::clone(&self.filters),
            self.page.clone(),
            self.pagination.clone(),
            stack.clone(),
        )
    }
}

/// Render `resource` and write every window through `sink`.
///
/// # Errors
///
/// See [`Renderer::new`] and [`Renderer::write`].
pub fn write(
    resource: impl Into<Resource>,
    store: Arc<dyn ResourceStore>,
    filters: Arc<FilterRegistry>,
    sink: &dyn OutputSink,
) -> Result<PageReport, RenderError> {
    Renderer::new(resource, store, filters)?.write(sink)
}
