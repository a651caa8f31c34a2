//! CommonMark to HTML.

use pulldown_cmark::{Options, Parser, html};

use crate::context::RenderContext;
use crate::error::RenderError;
use crate::filters::Filter;

/// Converts Markdown to HTML with pulldown-cmark.
#[derive(Clone, Copy, Debug)]
pub struct MarkdownFilter {
    gfm: bool,
}

impl MarkdownFilter {
    /// Create a filter with GitHub Flavored Markdown extensions enabled.
    #[must_use]
    pub fn new() -> Self {
        Self { gfm: true }
    }

    /// Enable or disable tables, strikethrough, task lists and GFM quirks.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    fn options(self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }
}

impl Default for MarkdownFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for MarkdownFilter {
    fn apply(&self, input: &str, _cx: &RenderContext) -> Result<String, RenderError> {
        let parser = Parser::new_ext(input, self.options());
        let mut output = String::with_capacity(input.len() * 3 / 2);
        html::push_html(&mut output, parser);
        Ok(output)
    }
}
