//! YAML front matter parsing.
//!
//! A resource file may start with a YAML block fenced by `---` lines:
//!
//! ```text
//! ---
//! title: Archive
//! layout: blog
//! filters: [markdown, template]
//! ---
//! Body text.
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

use crate::error::{StoreError, StoreErrorKind};

const FENCE: &str = "---";

/// Front matter fields as written in a resource file.
///
/// Every field is optional; defaults are applied by the store.
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    /// Display title.
    pub title: Option<String>,
    /// Layout name.
    ///
    /// `None` means the key is absent (use the default layout),
    /// `Some(None)` means `layout: ~` (no layout at all).
    #[serde(deserialize_with = "present")]
    pub layout: Option<Option<String>>,
    /// Filter names, applied in order.
    pub filters: Option<Vec<String>>,
    /// Output file extension for pages (e.g. "html", "xml").
    pub extension: Option<String>,
    /// Output path override for pages, relative to the output root.
    pub destination: Option<String>,
    /// Free-form values exposed to templates.
    pub vars: HashMap<String, serde_json::Value>,
}

/// Distinguish an explicit `null` from an absent key.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Split raw file text into its front matter block (if any) and body.
///
/// Returns `Ok((None, text))` when the text doesn't open with a fence.
///
/// # Errors
///
/// Returns a [`StoreErrorKind::Parse`] error if the opening fence is never closed.
pub fn split_front_matter(text: &str) -> Result<(Option<&str>, &str), StoreError> {
    let Some(rest) = strip_fence_line(text) else {
        return Ok((None, text));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == FENCE {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok((Some(yaml), body));
        }
        offset += line.len();
    }

    Err(StoreError::new(StoreErrorKind::Parse).with_message("unterminated front matter"))
}

fn strip_fence_line(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(FENCE)?;
    rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))
}

/// Parse a front matter block.
///
/// Empty blocks yield [`FrontMatter::default`].
pub(crate) fn parse_front_matter(yaml: &str) -> Result<FrontMatter, StoreError> {
    let trimmed = yaml.trim();
    if trimmed.is_empty() {
        return Ok(FrontMatter::default());
    }

    serde_yaml::from_str(trimmed).map_err(|e| {
        StoreError::new(StoreErrorKind::Parse)
            .with_message("invalid front matter")
            .with_source(e)
    })
}

/// Split and parse in one step, returning the front matter and the body.
pub(crate) fn extract(text: &str) -> Result<(FrontMatter, &str), StoreError> {
    match split_front_matter(text)? {
        (Some(yaml), body) => Ok((parse_front_matter(yaml)?, body)),
        (None, body) => Ok((FrontMatter::default(), body)),
    }
}
