//! Image elements and the deferred state they carry.

use crate::{HostError, LoaderSettings};

/// Handle to an image node in the host document.
///
/// Handles are cheap to clone and compare by node identity. All mutation goes
/// through `&self`, matching how DOM handles behave.
pub trait ImageElement: Clone + PartialEq + 'static {
    fn has_class(&self, class: &str) -> bool;

    fn add_class(&self, class: &str);

    fn remove_class(&self, class: &str);

    fn attribute(&self, name: &str) -> Option<String>;

    fn set_attribute(&self, name: &str, value: &str);

    /// Removes an attribute. Callers treat failures as non-fatal.
    fn remove_attribute(&self, name: &str) -> Result<(), HostError>;

    /// Assigns the active resource, starting the element's own fetch.
    fn set_src(&self, src: &str);

    /// Assigns the active variant set.
    fn set_srcset(&self, srcset: &str);
}

/// Snapshot of the deferred state stored on a pending image.
///
/// Each locator is independently present or absent. Empty attribute values
/// count as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PendingImage {
    /// Deferred primary locator.
    pub src: Option<String>,
    /// Deferred variant-set locator (`srcset` syntax).
    pub srcset: Option<String>,
    /// Whether the one-shot processed flag is already set.
    pub processed: bool,
}

impl PendingImage {
    pub fn read<E: ImageElement>(element: &E, settings: &LoaderSettings) -> Self {
        Self {
            src: non_empty(element.attribute(&settings.src_attribute)),
            srcset: non_empty(element.attribute(&settings.srcset_attribute)),
            processed: non_empty(element.attribute(&settings.processed_attribute)).is_some(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}
