//! Partial lookup.

use std::path::Path;

use tessera_store::{Partial, ResourceStore};

use crate::error::RenderError;

/// A partial to render: either a name to look up or an already-resolved one.
#[derive(Clone, Debug, PartialEq)]
pub enum PartialRef {
    /// Name without the leading underscore (`"sidebar"` finds `_sidebar.*`).
    Named(String),
    Resolved(Partial),
}

impl From<&str> for PartialRef {
    fn from(name: &str) -> Self {
        Self::Named(name.to_owned())
    }
}

impl From<String> for PartialRef {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<Partial> for PartialRef {
    fn from(partial: Partial) -> Self {
        Self::Resolved(partial)
    }
}

/// Resolves partial names against a store, preferring the page's directory.
pub struct PartialResolver<'a> {
    store: &'a dyn ResourceStore,
}

impl<'a> PartialResolver<'a> {
    pub fn new(store: &'a dyn ResourceStore) -> Self {
        Self { store }
    }

    /// Find `_<name>`, first in `page_dir`, then anywhere in the store.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::PartialNotFound`] if neither lookup matches.
    pub fn resolve(&self, name: &str, page_dir: &Path) -> Result<Partial, RenderError> {
        let file_name = format!("_{}", name.strip_prefix('_').unwrap_or(name));

        if let Some(partial) = self.store.find_partial(&file_name, Some(page_dir)) {
            tracing::debug!(name, path = %partial.path.display(), "Resolved local partial");
            return Ok(partial);
        }
        if let Some(partial) = self.store.find_partial(&file_name, None) {
            tracing::debug!(name, path = %partial.path.display(), "Resolved global partial");
            return Ok(partial);
        }
        Err(RenderError::PartialNotFound(name.to_owned()))
    }

    /// Turn a [`PartialRef`] into a [`Partial`], resolving names.
    pub fn resolve_ref(&self, partial: PartialRef, page_dir: &Path) -> Result<Partial, RenderError> {
        match partial {
            PartialRef::Named(name) => self.resolve(&name, page_dir),
            PartialRef::Resolved(partial) => Ok(partial),
        }
    }
}
