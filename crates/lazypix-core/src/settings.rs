//! Loader configuration.

use crate::{RootMargin, SettingsError, VisibilityCriteria};

/// Configuration for a [`LazyImageLoader`](crate::LazyImageLoader).
///
/// The defaults match the markup contract: `img.lazy` elements carrying
/// `data-src`/`data-srcset`, a 200px vertical root margin and a 1% threshold.
///
/// # Example
///
/// ```
/// use lazypix_core::LoaderSettings;
///
/// let settings = LoaderSettings::default()
///     .with_root_margin("400px 0px")
///     .and_then(|settings| settings.with_threshold(0.1))
///     .unwrap();
/// assert_eq!(settings.threshold, 0.1);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LoaderSettings {
    /// CSS selector for pending images.
    pub selector: String,
    /// Class marking an image as pending (placeholder shown).
    pub pending_class: String,
    /// Class added once the real resource is committed.
    pub loaded_class: String,
    /// Attribute holding the deferred primary locator.
    pub src_attribute: String,
    /// Attribute holding the deferred variant-set locator.
    pub srcset_attribute: String,
    /// Attribute set once an image has been processed.
    pub processed_attribute: String,
    pub root_margin: RootMargin,
    /// Fraction of an image's area that must be inside the expanded viewport.
    pub threshold: f32,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            selector: "img.lazy".into(),
            pending_class: "lazy".into(),
            loaded_class: "lazy-loaded".into(),
            src_attribute: "data-src".into(),
            srcset_attribute: "data-srcset".into(),
            processed_attribute: "data-lazy-processed".into(),
            root_margin: RootMargin::default(),
            threshold: 0.01,
        }
    }
}

impl LoaderSettings {
    /// Set the root margin from the CSS shorthand (`"200px 0px"`).
    pub fn with_root_margin(mut self, css: &str) -> Result<Self, SettingsError> {
        self.root_margin = RootMargin::parse(css)?;
        Ok(self)
    }

    /// Set the visible-area threshold, which must lie in `0.0..=1.0`.
    pub fn with_threshold(mut self, threshold: f32) -> Result<Self, SettingsError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(SettingsError::Threshold(threshold));
        }
        self.threshold = threshold;
        Ok(self)
    }

    /// Set the pending and loaded class names.
    pub fn with_classes(
        mut self,
        pending: impl Into<String>,
        loaded: impl Into<String>,
    ) -> Result<Self, SettingsError> {
        self.pending_class = non_empty(pending.into(), "pending class")?;
        self.loaded_class = non_empty(loaded.into(), "loaded class")?;
        Ok(self)
    }

    /// Set the attributes carrying the deferred locators and processed flag.
    pub fn with_attributes(
        mut self,
        src: impl Into<String>,
        srcset: impl Into<String>,
        processed: impl Into<String>,
    ) -> Result<Self, SettingsError> {
        self.src_attribute = non_empty(src.into(), "src attribute")?;
        self.srcset_attribute = non_empty(srcset.into(), "srcset attribute")?;
        self.processed_attribute = non_empty(processed.into(), "processed attribute")?;
        Ok(self)
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Result<Self, SettingsError> {
        self.selector = non_empty(selector.into(), "selector")?;
        Ok(self)
    }

    pub fn visibility_criteria(&self) -> VisibilityCriteria {
        VisibilityCriteria {
            root_margin: self.root_margin,
            threshold: self.threshold,
        }
    }
}

fn non_empty(value: String, what: &'static str) -> Result<String, SettingsError> {
    if value.trim().is_empty() {
        Err(SettingsError::EmptyName(what))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MarginLength;

    #[test]
    fn defaults_match_markup_contract() {
        let settings = LoaderSettings::default();
        assert_eq!(settings.selector, "img.lazy");
        assert_eq!(settings.pending_class, "lazy");
        assert_eq!(settings.loaded_class, "lazy-loaded");
        assert_eq!(settings.src_attribute, "data-src");
        assert_eq!(settings.srcset_attribute, "data-srcset");
        assert_eq!(settings.root_margin.top, MarginLength::Px(200.0));
        assert_eq!(settings.root_margin.left, MarginLength::Px(0.0));
        assert_eq!(settings.threshold, 0.01);
    }

    #[test]
    fn threshold_out_of_range_is_rejected() {
        assert_eq!(
            LoaderSettings::default().with_threshold(1.5),
            Err(SettingsError::Threshold(1.5))
        );
        assert!(LoaderSettings::default().with_threshold(f32::NAN).is_err());
        assert!(LoaderSettings::default().with_threshold(0.0).is_ok());
    }

    #[test]
    fn bad_root_margin_is_rejected() {
        assert!(matches!(
            LoaderSettings::default().with_root_margin("200 0"),
            Err(SettingsError::RootMargin(_))
        ));
        assert_eq!(
            LoaderSettings::default().with_root_margin("NaNpx 0px"),
            Err(SettingsError::RootMargin("NaNpx 0px".to_string()))
        );
    }

    #[test]
    fn empty_names_are_rejected() {
        assert_eq!(
            LoaderSettings::default().with_classes("", "done"),
            Err(SettingsError::EmptyName("pending class"))
        );
        assert_eq!(
            LoaderSettings::default().with_selector("  "),
            Err(SettingsError::EmptyName("selector"))
        );
    }
}
