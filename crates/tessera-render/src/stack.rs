//! Rendering stack for cycle detection.
//!
//! Every body render (page, layout step, partial) enters its resource path
//! on the stack before evaluating and leaves it on every exit path. A path
//! that is already on the stack means the composition loops back on itself.
//!
//! One [`RenderStack`] is created per top-level render and threaded through
//! the [`RenderContext`](crate::RenderContext), so independent pages never
//! see each other's entries.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::RenderError;

/// Ordered sequence of in-flight resource paths, innermost last.
///
/// Clones share the same underlying stack.
#[derive(Clone, Debug, Default)]
pub struct RenderStack {
    entries: Arc<Mutex<Vec<PathBuf>>>,
}

impl RenderStack {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter `path`, returning a guard that leaves it when dropped.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::RenderingLoopDetected`] if `path` is already on
    /// the stack. The stack is left as it was.
    pub fn enter(&self, path: &Path) -> Result<StackGuard, RenderError> {
        let mut entries = self.lock();
        if entries.iter().any(|p| p == path) {
            return Err(RenderError::RenderingLoopDetected {
                path: path.to_path_buf(),
                stack: entries.clone(),
            });
        }
        entries.push(path.to_path_buf());
        drop(entries);

        Ok(StackGuard {
            stack: self.clone(),
            path: path.to_path_buf(),
        })
    }

    /// Innermost path currently being rendered.
    pub fn current(&self) -> Option<PathBuf> {
        self.lock().last().cloned()
    }

    /// Copy of the current entries, outermost first.
    pub fn snapshot(&self) -> Vec<PathBuf> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Fail with [`RenderError::StackCorrupted`] unless the stack is empty.
    pub(crate) fn ensure_empty(&self, page: &Path) -> Result<(), RenderError> {
        let remaining = self.snapshot();
        if remaining.is_empty() {
            return Ok(());
        }
        tracing::error!(
            page = %page.display(),
            remaining = remaining.len(),
            "Rendering stack not empty after render"
        );
        Err(RenderError::StackCorrupted {
            path: page.to_path_buf(),
            remaining,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PathBuf>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Scoped stack entry; pops its path on drop if it is still the top entry.
#[must_use = "dropping the guard leaves the stack immediately"]
#[derive(Debug)]
pub struct StackGuard {
    stack: RenderStack,
    path: PathBuf,
}

impl StackGuard {
    /// Path this guard holds on the stack.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        let mut entries = self.stack.lock();
        if entries.last() == Some(&self.path) {
            entries.pop();
        } else {
            tracing::warn!(
                path = %self.path.display(),
                top = ?entries.last(),
                "Stack guard released out of order"
            );
        }
    }
}

/// Guards held for the duration of a layout walk.
///
/// Released innermost-first so each guard finds its own path on top.
#[derive(Debug, Default)]
pub(crate) struct GuardChain {
    guards: Vec<StackGuard>,
}

impl GuardChain {
    pub(crate) fn push(&mut self, guard: StackGuard) {
        self.guards.push(guard);
    }
}

impl Drop for GuardChain {
    fn drop(&mut self) {
        while self.guards.pop().is_some() {}
    }
}
