//! Testing utilities and harness for LazyPix
//!
//! [`TestHost`] simulates a document: image markup with layout bounds, a
//! scrollable viewport, an intersection observer that applies the same
//! margin and threshold rules as browsers, probes completed by hand, and an
//! explicit task queue standing in for the event loop.

mod test_host;
mod test_image;

pub use test_host::*;
pub use test_image::*;

pub mod prelude {
    pub use crate::{ImageMarkup, TestHost, TestImage, TestObserver};
    pub use lazypix_core::{
        ImageElement, LazyImageLoader, LoadMode, LoaderSettings, LoaderStats, ProbeError,
        ProbeRequest, ReadyState, Rect, VisibilityEntry,
    };
}
