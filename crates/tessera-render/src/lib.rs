//! Page composition for the Tessera site generator.
//!
//! Pages are filtered, wrapped in their chain of layouts and written out,
//! one file per pagination window.
//!
//! # Architecture
//!
//! - [`Renderer`]: renders one page, across all of its windows
//! - [`RenderContext`]: what filters and templates see while rendering
//! - [`RenderStack`]: per-render stack of in-flight resources, used to
//!   detect layout and partial loops
//! - [`Paginator`] / [`Pager`]: fixed-size windows over a collection
//! - [`FilterRegistry`]: named body filters (`template`, `markdown`, ...)
//! - [`SiteBuilder`]: renders every page of a store and reports failures
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tessera_render::SiteBuilder;
//! use tessera_store::{FsSink, FsStore, ScanOptions};
//!
//! let store = FsStore::scan(&ScanOptions::new("content".into(), "content/layouts".into()))?;
//! let report = SiteBuilder::new(Arc::new(store)).build(&FsSink::new("site".into()));
//! println!("{} files written", report.files_written());
//! ```

mod builder;
mod context;
mod error;
pub mod filters;
mod paginate;
mod partial;
mod renderer;
mod stack;

pub use builder::{BuildReport, PageFailure, SiteBuilder};
pub use context::{Pagination, RenderContext, escape_html};
pub use error::RenderError;
pub use filters::{Filter, FilterRegistry};
pub use paginate::{Pager, Paginator};
pub use partial::{PartialRef, PartialResolver};
pub use renderer::{PageReport, Renderer, write};
pub use stack::{RenderStack, StackGuard};
