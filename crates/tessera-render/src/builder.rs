//! Whole-site build driver.

use std::path::PathBuf;
use std::sync::Arc;

use tessera_store::{OutputSink, ResourceStore};

use crate::error::RenderError;
use crate::filters::FilterRegistry;
use crate::renderer::{PageReport, Renderer};

/// A page that failed to render or write.
#[derive(Debug)]
pub struct PageFailure {
    /// Source path of the page.
    pub path: PathBuf,
    pub error: RenderError,
}

/// Outcome of a site build.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Pages that rendered, in build order.
    pub pages: Vec<PageReport>,
    /// Pages that failed, in build order.
    pub failures: Vec<PageFailure>,
    /// Whether the build stopped early on a failure.
    pub aborted: bool,
}

impl BuildReport {
    /// Total number of files written.
    pub fn files_written(&self) -> usize {
        self.pages.iter().map(|p| p.destinations.len()).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Renders every page of a store.
///
/// By default a failing page is logged and recorded, and the build moves on
/// to the next page.
pub struct SiteBuilder {
    store: Arc<dyn ResourceStore>,
    filters: Arc<FilterRegistry>,
    fail_fast: bool,
}

impl SiteBuilder {
    /// Create a builder with the built-in filters.
    #[must_use]
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self {
            store,
            filters: Arc::new(FilterRegistry::with_builtins()),
            fail_fast: false,
        }
    }

    #[must_use]
    pub fn with_filters(mut self, filters: FilterRegistry) -> Self {
        self.filters = Arc::new(filters);
        self
    }

    /// Stop at the first failing page.
    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Render every page in store order and write it through `sink`.
    pub fn build(&self, sink: &dyn OutputSink) -> BuildReport {
        let mut report = BuildReport::default();

        for page in self.store.pages() {
            let path = page.path.clone();
            let result = Renderer::new(page, Arc::clone(&self.store), Arc::clone(&self.filters))
                .and_then(|renderer| renderer.write(sink));

            match result {
                Ok(page_report) => report.pages.push(page_report),
                Err(error) => {
                    tracing::error!(page = %path.display(), error = %error, "Failed to render page");
                    report.failures.push(PageFailure { path, error });
                    if self.fail_fast {
                        report.aborted = true;
                        break;
                    }
                }
            }
        }

        tracing::debug!(
            pages = report.pages.len(),
            files = report.files_written(),
            failures = report.failures.len(),
            "Build finished"
        );
        report
    }
}
