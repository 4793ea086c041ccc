use lazypix_core::{ProbeCallback, ProbeError, ProbeRequest};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlImageElement};

use crate::dom::describe;

/// Fetches and decodes `request` in a detached `Image`.
///
/// A single one-shot handler serves both `load` and `error`; whichever fires
/// first consumes it.
pub(crate) fn start(request: ProbeRequest, complete: ProbeCallback) {
    let probe = match HtmlImageElement::new() {
        Ok(probe) => probe,
        Err(err) => {
            log::debug!("Cannot create probe image: {}", describe(&err));
            complete(Err(ProbeError::Fetch { src: request.src }));
            return;
        }
    };

    let src = request.src.clone();
    let handler = Closure::once_into_js(move |event: Event| {
        let result = if event.type_() == "load" {
            Ok(())
        } else {
            Err(ProbeError::Fetch { src })
        };
        complete(result);
    });
    probe.set_onload(Some(handler.unchecked_ref()));
    probe.set_onerror(Some(handler.unchecked_ref()));

    if let Some(srcset) = &request.srcset {
        probe.set_srcset(srcset);
    }
    probe.set_src(&request.src);
}
