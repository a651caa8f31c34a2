//! Filesystem store and sink.
//!
//! [`FsStore`] walks a content directory once and indexes every resource it
//! finds. Bodies are read lazily from disk on [`ResourceStore::read`].
//!
//! Classification rules:
//! - file names starting with `_` are partials (anywhere)
//! - other files under the layouts directory are layouts
//! - everything else under the content directory is a page
//!
//! Hidden entries (leading `.`) are skipped.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use glob::Pattern;

use crate::error::{StoreError, StoreErrorKind};
use crate::front_matter::{FrontMatter, extract};
use crate::resource::{
    DEFAULT_EXTENSION, Layout, Page, Partial, ResourceMeta, replace_extension, resource_name,
};
use crate::store::{OutputSink, ResourceStore};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Options for [`FsStore::scan`].
#[derive(Clone, Debug)]
pub struct ScanOptions {
    /// Root of the page tree.
    pub content_dir: PathBuf,
    /// Directory holding layouts. May live inside `content_dir`.
    pub layouts_dir: PathBuf,
    /// Patterns (relative to the content root) for files to ignore.
    pub exclude: Vec<Pattern>,
    /// Layout applied to pages whose front matter has no `layout` key.
    pub default_layout: Option<String>,
    /// Filters applied to resources whose front matter has no `filters` key.
    pub default_filters: Vec<String>,
}

impl ScanOptions {
    /// Create options with no excludes, no default layout and no default filters.
    #[must_use]
    pub fn new(content_dir: PathBuf, layouts_dir: PathBuf) -> Self {
        Self {
            content_dir,
            layouts_dir,
            exclude: Vec::new(),
            default_layout: None,
            default_filters: Vec::new(),
        }
    }

    /// Compile and set exclude patterns.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreErrorKind::InvalidPath`] error for a malformed pattern.
    pub fn with_exclude(mut self, patterns: &[String]) -> Result<Self, StoreError> {
        self.exclude = patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| {
                    StoreError::new(StoreErrorKind::InvalidPath)
                        .with_message(format!("invalid exclude pattern '{p}'"))
                        .with_source(e)
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    /// Set the default layout.
    #[must_use]
    pub fn with_default_layout(mut self, layout: Option<String>) -> Self {
        self.default_layout = layout;
        self
    }

    /// Set the default filter chain.
    #[must_use]
    pub fn with_default_filters(mut self, filters: Vec<String>) -> Self {
        self.default_filters = filters;
        self
    }

    fn is_excluded(&self, relative: &Path) -> bool {
        self.exclude.iter().any(|p| p.matches_path(relative))
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Content,
    Layouts,
}

/// Filesystem-backed resource store.
pub struct FsStore {
    /// Resource path -> file on disk.
    files: HashMap<PathBuf, PathBuf>,
    pages: Vec<Page>,
    layouts: Vec<Layout>,
    partials: Vec<Partial>,
}

impl FsStore {
    /// Walk the content and layout directories and index every resource.
    ///
    /// Missing directories yield an empty index. Files with malformed front
    /// matter are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a directory exists but can't be listed.
    pub fn scan(options: &ScanOptions) -> Result<Self, StoreError> {
        let mut store = Self {
            files: HashMap::new(),
            pages: Vec::new(),
            layouts: Vec::new(),
            partials: Vec::new(),
        };

        if options.content_dir.is_dir() {
            store.scan_directory(options, &options.content_dir, Path::new(""), Section::Content)?;
        }
        if options.layouts_dir.is_dir() {
            let prefix = options
                .layouts_dir
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_default();
            store.scan_directory(options, &options.layouts_dir, &prefix, Section::Layouts)?;
        }

        tracing::debug!(
            pages = store.pages.len(),
            layouts = store.layouts.len(),
            partials = store.partials.len(),
            "Content scan completed"
        );
        Ok(store)
    }

    fn scan_directory(
        &mut self,
        options: &ScanOptions,
        dir: &Path,
        prefix: &Path,
        section: Section,
    ) -> Result<(), StoreError> {
        let entries = fs::read_dir(dir).map_err(|e| {
            StoreError::io(e, Some(dir.to_path_buf())).with_backend(BACKEND)
        })?;

        let mut entries: Vec<_> = entries.filter_map(Result::ok).collect();
        entries.sort_by_key(fs::DirEntry::file_name);

        for entry in entries {
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if name.starts_with('.') {
                continue;
            }

            let path = entry.path();
            let relative = prefix.join(&file_name);
            let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());

            if is_dir {
                if section == Section::Content && path == options.layouts_dir {
                    continue;
                }
                self.scan_directory(options, &path, &relative, section)?;
            } else if options.is_excluded(&relative) {
                tracing::debug!(path = %relative.display(), "Excluded");
            } else {
                self.index_file(options, path, relative, section);
            }
        }
        Ok(())
    }

    fn index_file(&mut self, options: &ScanOptions, file: PathBuf, relative: PathBuf, section: Section) {
        let front_matter = match read_front_matter(&file) {
            Ok(fm) => fm,
            Err(e) => {
                tracing::warn!(path = %relative.display(), error = %e, "Failed to read resource, skipping");
                return;
            }
        };

        let filters = front_matter
            .filters
            .clone()
            .unwrap_or_else(|| options.default_filters.clone());

        if resource_name(&relative).starts_with('_') {
            let mut partial = Partial::new(relative.clone());
            partial.meta = ResourceMeta {
                title: front_matter.title,
                filters,
                layout: None,
                vars: front_matter.vars,
            };
            self.partials.push(partial);
        } else if section == Section::Layouts {
            let mut layout = Layout::new(relative.clone());
            layout.meta = ResourceMeta {
                title: front_matter.title,
                filters,
                layout: front_matter.layout.flatten(),
                vars: front_matter.vars,
            };
            self.layouts.push(layout);
        } else {
            let layout = match front_matter.layout {
                Some(explicit) => explicit,
                None => options.default_layout.clone(),
            };
            let destination = match &front_matter.destination {
                Some(dest) => PathBuf::from(dest),
                None => replace_extension(
                    &relative,
                    front_matter.extension.as_deref().unwrap_or(DEFAULT_EXTENSION),
                ),
            };
            let mut page = Page::new(relative.clone()).with_destination(destination);
            page.meta = ResourceMeta {
                title: front_matter.title,
                filters,
                layout,
                vars: front_matter.vars,
            };
            self.pages.push(page);
        }

        self.files.insert(relative, file);
    }
}

fn read_front_matter(file: &Path) -> Result<FrontMatter, StoreError> {
    let text = fs::read_to_string(file)
        .map_err(|e| StoreError::io(e, Some(file.to_path_buf())).with_backend(BACKEND))?;
    let (front_matter, _) = extract(&text).map_err(|e| e.with_path(file).with_backend(BACKEND))?;
    Ok(front_matter)
}

impl ResourceStore for FsStore {
    fn pages(&self) -> Vec<Page> {
        self.pages.clone()
    }

    fn find_layout(&self, name: &str) -> Option<Layout> {
        self.layouts.iter().find(|l| l.name == name).cloned()
    }

    fn find_partial(&self, name: &str, in_directory: Option<&Path>) -> Option<Partial> {
        self.partials
            .iter()
            .find(|p| p.name == name && in_directory.is_none_or(|dir| p.dir() == dir))
            .cloned()
    }

    fn read(&self, path: &Path) -> Result<String, StoreError> {
        let file = self
            .files
            .get(path)
            .ok_or_else(|| StoreError::not_found(path).with_backend(BACKEND))?;
        let text = fs::read_to_string(file)
            .map_err(|e| StoreError::io(e, Some(path.to_path_buf())).with_backend(BACKEND))?;
        let (_, body) = extract(&text).map_err(|e| e.with_path(path).with_backend(BACKEND))?;
        Ok(body.to_owned())
    }
}

/// Writes output files under a root directory.
pub struct FsSink {
    output_dir: PathBuf,
}

impl FsSink {
    #[must_use]
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Root directory for output files.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl OutputSink for FsSink {
    fn write(&self, path: &Path, content: &str) -> Result<(), StoreError> {
        if path.is_absolute() {
            return Err(StoreError::new(StoreErrorKind::InvalidPath)
                .with_message("destination must be relative")
                .with_path(path)
                .with_backend(BACKEND));
        }
        if path.components().any(|c| c == Component::ParentDir) {
            return Err(StoreError::new(StoreErrorKind::InvalidPath)
                .with_message("destination must stay inside the output directory")
                .with_path(path)
                .with_backend(BACKEND));
        }

        let target = self.output_dir.join(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::io(e, Some(parent.to_path_buf())).with_backend(BACKEND))?;
        }
        fs::write(&target, content)
            .map_err(|e| StoreError::io(e, Some(target.clone())).with_backend(BACKEND))?;

        tracing::debug!(path = %target.display(), bytes = content.len(), "Wrote output file");
        Ok(())
    }
}
