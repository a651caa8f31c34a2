//! In-memory store and sink for testing.
//!
//! Provides [`MemoryStore`] and [`MemorySink`] so rendering can be exercised
//! without touching the filesystem.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{StoreError, StoreErrorKind};
use crate::resource::{Layout, Page, Partial};
use crate::store::{OutputSink, ResourceStore};

const BACKEND: &str = "Memory";

/// In-memory resource store.
///
/// Resources keep insertion order, which is the order lookups search in.
///
/// # Example
///
/// ```ignore
/// use tessera_store::{Layout, MemoryStore, Page};
///
/// let store = MemoryStore::new()
///     .with_page(Page::new("index.md").with_layout("default"), "Hello")
///     .with_layout(Layout::new("layouts/default.html"), "<main>{{ content }}</main>");
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    pages: RwLock<Vec<Page>>,
    layouts: RwLock<Vec<Layout>>,
    partials: RwLock<Vec<Partial>>,
    bodies: RwLock<HashMap<PathBuf, String>>,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page and its body.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(self, page: Page, body: impl Into<String>) -> Self {
        self.insert_body(&page.path, body);
        self.pages.write().unwrap().push(page);
        self
    }

    /// Add a layout and its body.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_layout(self, layout: Layout, body: impl Into<String>) -> Self {
        self.insert_body(&layout.path, body);
        self.layouts.write().unwrap().push(layout);
        self
    }

    /// Add a partial and its body.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_partial(self, partial: Partial, body: impl Into<String>) -> Self {
        self.insert_body(&partial.path, body);
        self.partials.write().unwrap().push(partial);
        self
    }

    /// Replace the body stored for a path.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_body(&self, path: impl AsRef<Path>, body: impl Into<String>) {
        self.insert_body(path.as_ref(), body);
    }

    fn insert_body(&self, path: &Path, body: impl Into<String>) {
        self.bodies
            .write()
            .unwrap()
            .insert(path.to_path_buf(), body.into());
    }
}

impl ResourceStore for MemoryStore {
    fn pages(&self) -> Vec<Page> {
        self.pages.read().unwrap().clone()
    }

    fn find_layout(&self, name: &str) -> Option<Layout> {
        self.layouts
            .read()
            .unwrap()
            .iter()
            .find(|l| l.name == name)
            .cloned()
    }

    fn find_partial(&self, name: &str, in_directory: Option<&Path>) -> Option<Partial> {
        self.partials
            .read()
            .unwrap()
            .iter()
            .find(|p| p.name == name && in_directory.is_none_or(|dir| p.dir() == dir))
            .cloned()
    }

    fn read(&self, path: &Path) -> Result<String, StoreError> {
        self.bodies
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| {
                StoreError::new(StoreErrorKind::NotFound)
                    .with_path(path)
                    .with_backend(BACKEND)
            })
    }
}

/// Records writes in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    writes: RwLock<Vec<(PathBuf, String)>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write, in order, including overwrites of the same path.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn writes(&self) -> Vec<(PathBuf, String)> {
        self.writes.read().unwrap().clone()
    }

    /// Latest content written to `path`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.writes
            .read()
            .unwrap()
            .iter()
            .rev()
            .find(|(p, _)| p == path.as_ref())
            .map(|(_, content)| content.clone())
    }

    /// Number of writes performed.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn len(&self) -> usize {
        self.writes.read().unwrap().len()
    }

    /// Whether nothing has been written.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn is_empty(&self) -> bool {
        self.writes.read().unwrap().is_empty()
    }
}

impl OutputSink for MemorySink {
    fn write(&self, path: &Path, content: &str) -> Result<(), StoreError> {
        self.writes
            .write()
            .unwrap()
            .push((path.to_path_buf(), content.to_owned()));
        Ok(())
    }
}
