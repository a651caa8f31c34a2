//! Store and sink traits.

use std::path::Path;

use crate::error::StoreError;
use crate::resource::{Layout, Page, Partial};

/// Lookup and read access to site resources.
///
/// Lookups return at most one canonical match. When several resources
/// qualify, the first in store order wins.
pub trait ResourceStore: Send + Sync {
    /// All pages, in store order.
    fn pages(&self) -> Vec<Page>;

    /// Find a layout by name.
    fn find_layout(&self, name: &str) -> Option<Layout>;

    /// Find a partial by name (including its leading underscore).
    ///
    /// With `in_directory`, only partials located directly in that directory
    /// qualify. Without it, the whole store is searched.
    fn find_partial(&self, name: &str, in_directory: Option<&Path>) -> Option<Partial>;

    /// Read the raw body of a resource, without front matter.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the resource doesn't exist or can't be read.
    fn read(&self, path: &Path) -> Result<String, StoreError>;
}

/// Destination for rendered output.
pub trait OutputSink: Send + Sync {
    /// Write `content` to `path`, creating or truncating it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the output can't be written.
    fn write(&self, path: &Path, content: &str) -> Result<(), StoreError>;
}
