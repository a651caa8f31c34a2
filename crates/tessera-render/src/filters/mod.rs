//! Body filters.
//!
//! A filter turns one string into another. Every resource lists the filters
//! its body passes through; [`FilterRegistry::process`] runs them in order.
//!
//! Built-in filters:
//!
//! | Name       | Effect                                            |
//! |------------|---------------------------------------------------|
//! | `template` | Evaluates the body as a minijinja template        |
//! | `markdown` | Converts CommonMark (with GFM extensions) to HTML |
//! | `escape`   | Escapes HTML special characters                   |

mod markdown;
mod template;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

pub use markdown::MarkdownFilter;
pub use template::TemplateFilter;

use crate::context::{RenderContext, escape_html};
use crate::error::RenderError;

/// A string-to-string transformation applied to a resource body.
pub trait Filter: Send + Sync {
    /// Transform `input`.
    ///
    /// `cx` gives access to the page, the content slot and the template
    /// helpers.
    ///
    /// # Errors
    ///
    /// Filters fail with a [`RenderError`]; nested render failures should be
    /// propagated as-is.
    fn apply(&self, input: &str, cx: &RenderContext) -> Result<String, RenderError>;
}

impl<F> Filter for F
where
    F: Fn(&str, &RenderContext) -> Result<String, RenderError> + Send + Sync,
{
    fn apply(&self, input: &str, cx: &RenderContext) -> Result<String, RenderError> {
        self(input, cx)
    }
}

/// Named filters available to resources.
#[derive(Clone)]
pub struct FilterRegistry {
    filters: HashMap<String, Arc<dyn Filter>>,
}

impl FilterRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            filters: HashMap::new(),
        }
    }

    /// Create a registry with the built-in filters.
    #[must_use]
    pub fn with_builtins() -> Self {
        Self::new()
            .with_filter("template", TemplateFilter)
            .with_filter("markdown", MarkdownFilter::new())
            .with_filter("escape", |input: &str, _: &RenderContext| -> Result<String, RenderError> {
                Ok(escape_html(input))
            })
    }

    /// Register `filter` under `name`, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, filter: impl Filter + 'static) {
        self.filters.insert(name.into(), Arc::new(filter));
    }

    #[must_use]
    pub fn with_filter(mut self, name: impl Into<String>, filter: impl Filter + 'static) -> Self {
        self.register(name, filter);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Filter>> {
        self.filters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Run `input` through the filters named in `names`, in order.
    ///
    /// `path` is the resource whose body is being filtered, used for error
    /// reporting.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnknownFilter`] for an unregistered name, or
    /// the first error a filter returns.
    pub fn process(
        &self,
        cx: &RenderContext,
        path: &Path,
        names: &[String],
        input: &str,
    ) -> Result<String, RenderError> {
        let mut output = input.to_owned();
        for name in names {
            let filter = self.get(name).ok_or_else(|| RenderError::UnknownFilter {
                name: name.clone(),
                path: path.to_path_buf(),
            })?;
            output = filter.apply(&output, cx)?;
        }
        Ok(output)
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.filters.keys().collect();
        names.sort();
        f.debug_struct("FilterRegistry").field("filters", &names).finish()
    }
}
