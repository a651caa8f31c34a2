//! Resource model: pages, layouts and partials.
//!
//! All paths are relative to the store root and are used as identity. A
//! layout's or partial's *name* is its file name up to the first `.` (so
//! `_sidebar.html` is named `_sidebar` and `default.html.j2` is `default`).
//! Page destinations only swap the final extension, so `release-1.2.md`
//! is written to `release-1.2.html`.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;

/// Default output extension for pages.
pub(crate) const DEFAULT_EXTENSION: &str = "html";

/// Metadata shared by every resource variant.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceMeta {
    /// Display title.
    pub title: Option<String>,
    /// Filter names, applied in declaration order.
    pub filters: Vec<String>,
    /// Name of the layout this resource is composed into.
    pub layout: Option<String>,
    /// Free-form values exposed to templates.
    pub vars: HashMap<String, Value>,
}

/// Which variant a [`Resource`] is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    Page,
    Layout,
    Partial,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Page => "page",
            Self::Layout => "layout",
            Self::Partial => "partial",
        })
    }
}

/// A content resource with a destination.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    /// Source path (identity).
    pub path: PathBuf,
    /// Output path of the first (or only) window.
    pub destination: PathBuf,
    /// Pagination cursor; `None` when the page is not being paginated.
    pub number: Option<usize>,
    /// Page metadata.
    pub meta: ResourceMeta,
}

impl Page {
    /// Create a page whose destination is `path` with an `.html` extension.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let destination = replace_extension(&path, DEFAULT_EXTENSION);
        Self {
            path,
            destination,
            number: None,
            meta: ResourceMeta::default(),
        }
    }

    /// Set the layout name.
    #[must_use]
    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.meta.layout = Some(layout.into());
        self
    }

    /// Set the filter chain.
    #[must_use]
    pub fn with_filters<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta.filters = filters.into_iter().map(Into::into).collect();
        self
    }

    /// Override the output path.
    #[must_use]
    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = destination.into();
        self
    }

    /// Set the display title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.meta.title = Some(title.into());
        self
    }

    /// Add a template variable.
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.vars.insert(key.into(), value);
        self
    }

    /// Directory containing the page source (empty for root pages).
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }

    /// Output path for the current pagination window.
    pub fn current_destination(&self) -> PathBuf {
        self.destination_for(self.number)
    }

    /// Output path for a given window number.
    ///
    /// Window 1 (and "not paginated") maps to [`Page::destination`]; window
    /// `n > 1` appends `n` to the file stem: `blog/index.html` becomes
    /// `blog/index2.html`.
    pub fn destination_for(&self, number: Option<usize>) -> PathBuf {
        match number {
            Some(n) if n > 1 => numbered(&self.destination, n),
            _ => self.destination.clone(),
        }
    }
}

/// A wrapping template that may itself be wrapped by another layout.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    /// Source path (identity).
    pub path: PathBuf,
    /// Lookup name.
    pub name: String,
    /// Layout metadata.
    pub meta: ResourceMeta,
}

impl Layout {
    /// Create a layout named after its file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = resource_name(&path);
        Self {
            path,
            name,
            meta: ResourceMeta::default(),
        }
    }

    /// Set the outer layout name.
    #[must_use]
    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.meta.layout = Some(layout.into());
        self
    }

    /// Set the filter chain.
    #[must_use]
    pub fn with_filters<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta.filters = filters.into_iter().map(Into::into).collect();
        self
    }
}

/// A named, reusable fragment with no destination and no layout.
#[derive(Clone, Debug, PartialEq)]
pub struct Partial {
    /// Source path (identity).
    pub path: PathBuf,
    /// Lookup name, including the leading underscore.
    pub name: String,
    /// Partial metadata. `layout` is always `None`.
    pub meta: ResourceMeta,
}

impl Partial {
    /// Create a partial named after its file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = resource_name(&path);
        Self {
            path,
            name,
            meta: ResourceMeta::default(),
        }
    }

    /// Set the filter chain.
    #[must_use]
    pub fn with_filters<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta.filters = filters.into_iter().map(Into::into).collect();
        self
    }

    /// Directory containing the partial.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }
}

/// Any resource known to the store.
#[derive(Clone, Debug, PartialEq)]
pub enum Resource {
    Page(Page),
    Layout(Layout),
    Partial(Partial),
}

impl Resource {
    /// Source path (identity).
    pub fn path(&self) -> &Path {
        match self {
            Self::Page(p) => &p.path,
            Self::Layout(l) => &l.path,
            Self::Partial(p) => &p.path,
        }
    }

    /// Resource metadata.
    pub fn meta(&self) -> &ResourceMeta {
        match self {
            Self::Page(p) => &p.meta,
            Self::Layout(l) => &l.meta,
            Self::Partial(p) => &p.meta,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Page(_) => ResourceKind::Page,
            Self::Layout(_) => ResourceKind::Layout,
            Self::Partial(_) => ResourceKind::Partial,
        }
    }
}

impl From<Page> for Resource {
    fn from(page: Page) -> Self {
        Self::Page(page)
    }
}

impl From<Layout> for Resource {
    fn from(layout: Layout) -> Self {
        Self::Layout(layout)
    }
}

impl From<Partial> for Resource {
    fn from(partial: Partial) -> Self {
        Self::Partial(partial)
    }
}

/// File name up to the first `.`.
pub(crate) fn resource_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match file_name.split_once('.') {
        Some((stem, _)) => stem.to_owned(),
        None => file_name,
    }
}

/// Replace the final extension of the file name with `extension`.
pub(crate) fn replace_extension(path: &Path, extension: &str) -> PathBuf {
    path.with_extension(extension)
}

/// Insert `n` between the file stem and the final extension.
fn numbered(destination: &Path, n: usize) -> PathBuf {
    let stem = destination
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match destination.extension() {
        Some(ext) => format!("{stem}{n}.{}", ext.to_string_lossy()),
        None => format!("{stem}{n}"),
    };
    destination.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_resource_name_strips_all_extensions() {
        assert_eq!(resource_name(Path::new("layouts/default.html.j2")), "default");
        assert_eq!(resource_name(Path::new("blog/_sidebar.html")), "_sidebar");
        assert_eq!(resource_name(Path::new("README")), "README");
    }

    #[test]
    fn test_page_default_destination() {
        let page = Page::new("blog/index.md");

        assert_eq!(page.destination, PathBuf::from("blog/index.html"));
        assert_eq!(page.dir(), Path::new("blog"));
    }

    #[test]
    fn test_root_page_dir_is_empty() {
        assert_eq!(Page::new("index.md").dir(), Path::new(""));
    }

    #[test]
    fn test_destination_for_first_window_is_unchanged() {
        let page = Page::new("blog/index.md");

        assert_eq!(page.destination_for(None), PathBuf::from("blog/index.html"));
        assert_eq!(page.destination_for(Some(1)), PathBuf::from("blog/index.html"));
    }

    #[test]
    fn test_destination_for_later_windows_is_numbered() {
        let page = Page::new("blog/index.md");

        assert_eq!(page.destination_for(Some(2)), PathBuf::from("blog/index2.html"));
        assert_eq!(page.destination_for(Some(12)), PathBuf::from("blog/index12.html"));
    }

    #[test]
    fn test_dotted_page_names_keep_distinct_destinations() {
        let first = Page::new("notes/release-1.2.md");
        let second = Page::new("notes/release-1.3.md");

        assert_eq!(first.destination, PathBuf::from("notes/release-1.2.html"));
        assert_ne!(first.destination, second.destination);
        assert_eq!(
            first.destination_for(Some(2)),
            PathBuf::from("notes/release-1.22.html")
        );
    }

    #[test]
    fn test_numbered_destination_without_extension() {
        let page = Page::new("feed.md").with_destination("feed");

        assert_eq!(page.destination_for(Some(3)), PathBuf::from("feed3"));
    }

    #[test]
    fn test_current_destination_follows_cursor() {
        let mut page = Page::new("archive.md");
        page.number = Some(3);

        assert_eq!(page.current_destination(), PathBuf::from("archive3.html"));
    }

    #[test]
    fn test_resource_kind_and_path() {
        let resource = Resource::from(Layout::new("layouts/default.html"));

        assert_eq!(resource.kind(), ResourceKind::Layout);
        assert_eq!(resource.path(), Path::new("layouts/default.html"));
        assert_eq!(resource.kind().to_string(), "layout");
    }

    #[test]
    fn test_partial_name_keeps_underscore() {
        let partial = Partial::new("blog/_nav.html");

        assert_eq!(partial.name, "_nav");
        assert_eq!(partial.dir(), Path::new("blog"));
    }
}
