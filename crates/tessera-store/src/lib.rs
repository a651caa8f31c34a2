//! Resource store and output sinks for the Tessera site generator.
//!
//! This crate owns everything the renderer treats as an outside collaborator:
//!
//! - [`Resource`] and its variants [`Page`], [`Layout`] and [`Partial`]
//! - [`ResourceStore`] for looking resources up and reading their bodies
//! - [`OutputSink`] for writing rendered output
//!
//! # Backends
//!
//! - [`FsStore`] / [`FsSink`] work against a content directory on disk
//! - [`MemoryStore`] / [`MemorySink`] keep everything in memory (behind the
//!   `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use tessera_store::{FsStore, ResourceStore, ScanOptions};
//!
//! let store = FsStore::scan(&ScanOptions::new(PathBuf::from("content"), PathBuf::from("layouts")))?;
//! for page in store.pages() {
//!     println!("{} -> {}", page.path.display(), page.destination.display());
//! }
//! ```

mod error;
mod front_matter;
mod fs;
#[cfg(feature = "mock")]
mod mock;
mod resource;
mod store;

pub use error::{StoreError, StoreErrorKind};
pub use front_matter::{FrontMatter, split_front_matter};
pub use fs::{FsSink, FsStore, ScanOptions};
#[cfg(feature = "mock")]
pub use mock::{MemorySink, MemoryStore};
pub use resource::{Layout, Page, Partial, Resource, ResourceKind, ResourceMeta};
pub use store::{OutputSink, ResourceStore};
