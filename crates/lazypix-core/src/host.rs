//! The environment seam.
//!
//! A [`Host`] is everything the loader needs from the page: document queries,
//! a visibility observer, off-screen probes and task scheduling. The loader
//! never touches the environment any other way.

use crate::{HostError, ImageElement, ProbeResult, RootMargin};

/// Document loading phase, as reported by `document.readyState`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    /// Parses the `document.readyState` string. Unknown values are treated
    /// as still loading so initialization waits for `DOMContentLoaded`.
    pub fn parse(value: &str) -> Self {
        match value {
            "interactive" => ReadyState::Interactive,
            "complete" => ReadyState::Complete,
            _ => ReadyState::Loading,
        }
    }

    /// True once the document has been parsed and can be queried.
    pub fn is_ready(self) -> bool {
        matches!(self, ReadyState::Interactive | ReadyState::Complete)
    }
}

/// One visibility change reported by the host's observer.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibilityEntry<E> {
    pub target: E,
    pub is_intersecting: bool,
}

/// Callback receiving a batch of visibility entries.
pub type EntriesCallback<E> = Box<dyn FnMut(Vec<VisibilityEntry<E>>)>;

/// Request for an off-screen fetch of an image resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeRequest {
    pub src: String,
    pub srcset: Option<String>,
}

/// One-shot continuation invoked when a probe finishes.
pub type ProbeCallback = Box<dyn FnOnce(ProbeResult)>;

/// A deferred unit of work run on the host's event loop.
pub type Task = Box<dyn FnOnce()>;

/// Host-side observer tracking which targets are near the viewport.
pub trait VisibilityObserver<E> {
    fn observe(&self, target: &E);

    fn unobserve(&self, target: &E);
}

/// The environment the loader runs in.
pub trait Host: 'static {
    type Image: ImageElement;
    type Observer: VisibilityObserver<Self::Image>;

    fn ready_state(&self) -> ReadyState;

    /// All elements matching `selector`, in document order.
    fn query_pending(&self, selector: &str) -> Vec<Self::Image>;

    /// Whether a viewport-intersection observer exists in this environment.
    fn supports_visibility_observer(&self) -> bool;

    /// Creates an observer that reports batches of entries to `on_entries`.
    fn create_observer(
        &self,
        root_margin: &RootMargin,
        threshold: f32,
        on_entries: EntriesCallback<Self::Image>,
    ) -> Result<Self::Observer, HostError>;

    /// Starts fetching and decoding a resource off-screen.
    ///
    /// `complete` is called at most once, asynchronously. It may never be
    /// called if the fetch stalls.
    fn start_probe(&self, request: ProbeRequest, complete: ProbeCallback);

    /// Runs `task` on a later turn of the event loop.
    fn schedule(&self, task: Task);

    /// Runs `task` once the document has been parsed.
    fn on_content_loaded(&self, task: Task);
}
