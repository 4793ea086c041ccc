//! Host-agnostic lazy image loading.
//!
//! Images marked as pending in the page markup are handed to a
//! [`VisibilityWatcher`]. When one of them nears the viewport the loader
//! starts an off-screen probe for its deferred resource and, once the probe
//! succeeds, commits the resource onto the visible element.
//!
//! # Architecture
//!
//! - [`Host`] - the environment seam (document queries, visibility observer,
//!   probe fetches, task scheduling)
//! - [`ImageElement`] - a handle to one image node in the host document
//! - [`VisibilityWatcher`] - the set of images still waiting to become visible
//! - [`LazyImageLoader`] - initializer, commit procedure and fallback path
//!
//! The browser implementation of [`Host`] lives in `lazypix-platform-web`;
//! `lazypix-testing` provides a simulated one.
//!
//! # Example
//!
//! ```rust,ignore
//! let loader = LazyImageLoader::install(host, LoaderSettings::default());
//! // ... later, for debugging
//! log::info!("{:?}", loader.stats());
//! ```

mod element;
mod error;
mod geometry;
mod host;
mod loader;
mod settings;
mod stats;
mod watcher;

pub use element::*;
pub use error::*;
pub use geometry::*;
pub use host::*;
pub use loader::*;
pub use settings::*;
pub use stats::*;
pub use watcher::*;
