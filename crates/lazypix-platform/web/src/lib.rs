//! Web platform adapter for LazyPix.
//!
//! Implements [`Host`](lazypix_core::Host) on top of `web-sys`: DOM image
//! handles, `IntersectionObserver`, off-screen `Image` probes and the
//! document ready signal. [`install`] creates the page's single loader.

mod dom;
mod host;
mod observer;
mod probe;

use std::cell::RefCell;
use std::rc::Rc;

use lazypix_core::{HostError, LazyImageLoader, LoadMode, LoaderSettings, LoaderStats};
use wasm_bindgen::JsValue;

pub use dom::DomImage;
pub use host::WebHost;
pub use observer::DomObserver;

thread_local! {
    /// The page's loader. Lives until the page is torn down.
    static LOADER: RefCell<Option<Rc<LazyImageLoader<WebHost>>>> = const { RefCell::new(None) };
}

/// Installs the loader with default settings.
///
/// Calling this again after a successful install does nothing.
pub fn install() -> Result<(), JsValue> {
    install_with(LoaderSettings::default())
}

/// Installs the loader with custom settings. Later calls are ignored.
pub fn install_with(settings: LoaderSettings) -> Result<(), JsValue> {
    LOADER.with(|slot| {
        if slot.borrow().is_some() {
            log::debug!("LazyPix already installed");
            return Ok(());
        }
        let Some(host) = page_host(WebHost::new())
            .map_err(|err| JsValue::from_str(&err.to_string()))?
        else {
            return Ok(());
        };
        let loader = LazyImageLoader::install(host, settings);
        *slot.borrow_mut() = Some(loader);
        log::info!("LazyPix installed");
        Ok(())
    })
}

/// Outside a document (workers, server-side runs) there is nothing to load,
/// which is not an error.
fn page_host<H>(host: Result<H, HostError>) -> Result<Option<H>, HostError> {
    match host {
        Ok(host) => Ok(Some(host)),
        Err(err @ (HostError::NoWindow | HostError::NoDocument)) => {
            log::debug!("{err}; not installing LazyPix");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// The installed loader's mode, if it has initialized.
pub fn mode() -> Option<LoadMode> {
    LOADER.with(|slot| slot.borrow().as_ref().and_then(|loader| loader.mode()))
}

/// The installed loader's counters.
pub fn stats() -> Option<LoaderStats> {
    LOADER.with(|slot| slot.borrow().as_ref().map(|loader| loader.stats()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_window_or_document_skips_install() {
        assert_eq!(page_host::<()>(Err(HostError::NoWindow)), Ok(None));
        assert_eq!(page_host::<()>(Err(HostError::NoDocument)), Ok(None));
        assert_eq!(page_host(Ok(7)), Ok(Some(7)));
    }

    #[test]
    fn other_host_errors_still_surface() {
        let err = HostError::Dom("denied".into());
        assert_eq!(page_host::<()>(Err(err.clone())), Err(err));
    }
}
