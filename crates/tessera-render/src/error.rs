//! Render error type.

use std::path::{Path, PathBuf};

use tessera_store::{ResourceKind, StoreError};

/// Error returned when composing or writing a page fails.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The entry point was handed something other than a page.
    #[error("only page resources can be rendered, got {kind} '{}'", .path.display())]
    InvalidResourceKind {
        /// Kind of the rejected resource.
        kind: ResourceKind,
        /// Path of the rejected resource.
        path: PathBuf,
    },

    /// A resource path recurred in the active rendering stack.
    #[error(
        "rendering loop detected for '{}'\n    current rendering stack\n\t{}",
        .path.display(),
        format_stack(.stack, .path)
    )]
    RenderingLoopDetected {
        /// Path that was entered twice.
        path: PathBuf,
        /// Stack at the time of detection, outermost first.
        stack: Vec<PathBuf>,
    },

    /// Name-based partial lookup found nothing.
    #[error("could not find partial '{0}'")]
    PartialNotFound(String),

    /// The stack was not empty after a top-level render finished.
    #[error("rendering stack corrupted after '{}': {} entries left", .path.display(), .remaining.len())]
    StackCorrupted {
        /// Page whose render left the stack dirty.
        path: PathBuf,
        /// Entries still on the stack.
        remaining: Vec<PathBuf>,
    },

    /// A resource named a filter that isn't registered.
    #[error("unknown filter '{name}' on '{}'", .path.display())]
    UnknownFilter {
        /// Filter name as written in metadata.
        name: String,
        /// Resource that asked for it.
        path: PathBuf,
    },

    /// A filter reported a failure of its own.
    #[error("filter '{name}' failed: {message}")]
    Filter {
        /// Filter name.
        name: String,
        /// Failure description.
        message: String,
    },

    /// Pagination was requested with a zero window size.
    #[error("pagination window size must be greater than zero")]
    InvalidWindowSize,

    /// Template evaluation failed.
    #[error("template error in '{}': {source}", .path.display())]
    Template {
        /// Resource whose body was being evaluated.
        path: PathBuf,
        #[source]
        source: minijinja::Error,
    },

    /// Reading or writing through the store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RenderError {
    /// The innermost `RenderError` in this error's source chain.
    ///
    /// Failures raised inside nested templates (a partial rendering itself,
    /// say) surface wrapped in [`RenderError::Template`]; this digs out the
    /// structural error underneath.
    pub fn innermost(&self) -> &RenderError {
        let mut current = self;
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            if let Some(render) = err.downcast_ref::<RenderError>() {
                current = render;
            }
            source = err.source();
        }
        current
    }

    /// Whether this error, or one nested inside it, is a detected loop.
    pub fn is_loop_detected(&self) -> bool {
        matches!(self.innermost(), Self::RenderingLoopDetected { .. })
    }
}

fn format_stack(stack: &[PathBuf], path: &Path) -> String {
    stack
        .iter()
        .map(PathBuf::as_path)
        .chain(std::iter::once(path))
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join("\n\t")
}
