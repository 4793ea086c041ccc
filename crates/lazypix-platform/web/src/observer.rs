use js_sys::Array;
use lazypix_core::{EntriesCallback, HostError, RootMargin, VisibilityEntry, VisibilityObserver};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlImageElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
};

use crate::dom::{describe, DomImage};

/// `IntersectionObserver` reporting to the loader.
///
/// Owns the JS callback, so the callback lives exactly as long as the
/// observer.
pub struct DomObserver {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl DomObserver {
    pub(crate) fn new(
        root_margin: &RootMargin,
        threshold: f32,
        mut on_entries: EntriesCallback<DomImage>,
    ) -> Result<Self, HostError> {
        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, _observer: IntersectionObserver| {
                let batch: Vec<_> = entries
                    .iter()
                    .filter_map(|value| value.dyn_into::<IntersectionObserverEntry>().ok())
                    .filter_map(to_entry)
                    .collect();
                on_entries(batch);
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_root_margin(&root_margin.to_string());
        init.set_threshold(&JsValue::from_f64(f64::from(threshold)));

        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
                .map_err(|err| HostError::Observer(describe(&err)))?;

        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

fn to_entry(entry: IntersectionObserverEntry) -> Option<VisibilityEntry<DomImage>> {
    // Custom selectors may match non-image elements; those cannot be probed.
    let target = entry.target().dyn_into::<HtmlImageElement>().ok()?;
    Some(VisibilityEntry {
        target: DomImage::new(target),
        is_intersecting: entry.is_intersecting(),
    })
}

impl VisibilityObserver<DomImage> for DomObserver {
    fn observe(&self, target: &DomImage) {
        self.observer.observe(target.element());
    }

    fn unobserve(&self, target: &DomImage) {
        self.observer.unobserve(target.element());
    }
}
