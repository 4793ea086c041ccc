use lazypix_core::{HostError, ImageElement};
use wasm_bindgen::JsValue;
use web_sys::HtmlImageElement;

/// An `<img>` element in the page.
#[derive(Clone, Debug, PartialEq)]
pub struct DomImage {
    element: HtmlImageElement,
}

impl DomImage {
    pub fn new(element: HtmlImageElement) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &HtmlImageElement {
        &self.element
    }
}

impl ImageElement for DomImage {
    fn has_class(&self, class: &str) -> bool {
        self.element.class_list().contains(class)
    }

    fn add_class(&self, class: &str) {
        if let Err(err) = self.element.class_list().add_1(class) {
            log::trace!("add class {class}: {}", describe(&err));
        }
    }

    fn remove_class(&self, class: &str) {
        if let Err(err) = self.element.class_list().remove_1(class) {
            log::trace!("remove class {class}: {}", describe(&err));
        }
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.element.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        if let Err(err) = self.element.set_attribute(name, value) {
            log::trace!("set {name}: {}", describe(&err));
        }
    }

    fn remove_attribute(&self, name: &str) -> Result<(), HostError> {
        self.element
            .remove_attribute(name)
            .map_err(|err| HostError::Dom(describe(&err)))
    }

    fn set_src(&self, src: &str) {
        self.element.set_src(src);
    }

    fn set_srcset(&self, srcset: &str) {
        self.element.set_srcset(srcset);
    }
}

/// Best-effort text for a thrown JS value.
pub(crate) fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
