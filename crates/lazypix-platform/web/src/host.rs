use std::cell::Cell;
use std::rc::Rc;

use js_sys::{Function, Reflect};
use lazypix_core::{
    EntriesCallback, Host, HostError, ProbeCallback, ProbeRequest, ReadyState, RootMargin, Task,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlImageElement, Window};

use crate::dom::{describe, DomImage};
use crate::observer::DomObserver;
use crate::probe;

/// The browser page as seen by the loader.
pub struct WebHost {
    window: Window,
    document: Document,
}

impl WebHost {
    pub fn new() -> Result<Self, HostError> {
        let window = web_sys::window().ok_or(HostError::NoWindow)?;
        let document = window.document().ok_or(HostError::NoDocument)?;
        Ok(Self { window, document })
    }
}

impl Host for WebHost {
    type Image = DomImage;
    type Observer = DomObserver;

    fn ready_state(&self) -> ReadyState {
        ReadyState::parse(&self.document.ready_state())
    }

    fn query_pending(&self, selector: &str) -> Vec<DomImage> {
        let nodes = match self.document.query_selector_all(selector) {
            Ok(nodes) => nodes,
            Err(err) => {
                log::warn!("Invalid selector {selector:?}: {}", describe(&err));
                return Vec::new();
            }
        };
        (0..nodes.length())
            .filter_map(|index| nodes.item(index))
            .filter_map(|node| node.dyn_into::<HtmlImageElement>().ok())
            .map(DomImage::new)
            .collect()
    }

    fn supports_visibility_observer(&self) -> bool {
        Reflect::has(&self.window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
    }

    fn create_observer(
        &self,
        root_margin: &RootMargin,
        threshold: f32,
        on_entries: EntriesCallback<DomImage>,
    ) -> Result<DomObserver, HostError> {
        DomObserver::new(root_margin, threshold, on_entries)
    }

    fn start_probe(&self, request: ProbeRequest, complete: ProbeCallback) {
        probe::start(request, complete);
    }

    fn schedule(&self, task: Task) {
        run_later(task, "setTimeout", |callback| {
            self.window
                .set_timeout_with_callback_and_timeout_and_arguments_0(callback, 0)
                .map(drop)
        });
    }

    fn on_content_loaded(&self, task: Task) {
        run_later(task, "DOMContentLoaded listener", |callback| {
            self.document
                .add_event_listener_with_callback("DOMContentLoaded", callback)
        });
    }
}

/// Hands `task` to a JS scheduling API, running it right away if the API
/// refuses the callback.
fn run_later(
    task: Task,
    what: &str,
    register: impl FnOnce(&Function) -> Result<(), JsValue>,
) {
    let slot = Rc::new(Cell::new(Some(task)));
    let pending = Rc::clone(&slot);
    let callback = Closure::once_into_js(move || {
        if let Some(task) = pending.take() {
            task();
        }
    });
    if let Err(err) = register(callback.unchecked_ref()) {
        log::warn!("{what} failed ({}), running now", describe(&err));
        if let Some(task) = slot.take() {
            task();
        }
    }
}
