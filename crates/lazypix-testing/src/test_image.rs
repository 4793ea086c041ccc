use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use lazypix_core::{HostError, ImageElement, Rect};

/// Markup for one element added to a [`TestHost`](crate::TestHost).
#[derive(Clone, Debug)]
pub struct ImageMarkup {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    src: Option<String>,
    bounds: Rect,
}

impl ImageMarkup {
    /// An `<img class="lazy">` below any realistic viewport.
    pub fn lazy() -> Self {
        Self::plain().class("lazy")
    }

    /// An `<img>` without classes.
    pub fn plain() -> Self {
        Self {
            tag: "img".into(),
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            src: None,
            bounds: Rect::new(0.0, 10_000.0, 300.0, 200.0),
        }
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn data_src(self, src: impl Into<String>) -> Self {
        self.attribute("data-src", src)
    }

    pub fn data_srcset(self, srcset: impl Into<String>) -> Self {
        self.attribute("data-srcset", srcset)
    }

    /// Initial active resource, e.g. a low-resolution placeholder.
    pub fn src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    /// Places a 300x200 image with its top edge at `y`.
    pub fn at(self, y: f32) -> Self {
        self.bounds(Rect::new(0.0, y, 300.0, 200.0))
    }

    pub fn bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }
}

#[derive(Debug)]
struct ImageState {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    src: Option<String>,
    srcset: Option<String>,
    bounds: Rect,
    attributes_locked: bool,
    src_assignments: usize,
}

/// Handle to a simulated image element.
///
/// Clones share the same node; equality is node identity.
#[derive(Clone)]
pub struct TestImage {
    state: Rc<RefCell<ImageState>>,
}

impl TestImage {
    pub(crate) fn from_markup(markup: ImageMarkup) -> Self {
        Self {
            state: Rc::new(RefCell::new(ImageState {
                tag: markup.tag,
                classes: markup.classes,
                attributes: markup.attributes,
                src: markup.src,
                srcset: None,
                bounds: markup.bounds,
                attributes_locked: false,
                src_assignments: 0,
            })),
        }
    }

    pub fn classes(&self) -> Vec<String> {
        self.state.borrow().classes.clone()
    }

    /// The active resource.
    pub fn src(&self) -> Option<String> {
        self.state.borrow().src.clone()
    }

    /// The active variant set.
    pub fn srcset(&self) -> Option<String> {
        self.state.borrow().srcset.clone()
    }

    /// How many times the active resource was assigned.
    pub fn src_assignments(&self) -> usize {
        self.state.borrow().src_assignments
    }

    pub fn bounds(&self) -> Rect {
        self.state.borrow().bounds
    }

    pub fn set_bounds(&self, bounds: Rect) {
        self.state.borrow_mut().bounds = bounds;
    }

    /// Makes every later attribute removal fail.
    pub fn lock_attributes(&self) {
        self.state.borrow_mut().attributes_locked = true;
    }

    /// Matches simple `tag`, `.class` and `tag.class.class` selectors.
    pub fn matches(&self, selector: &str) -> bool {
        let state = self.state.borrow();
        let mut parts = selector.trim().split('.');
        let tag = parts.next().unwrap_or_default();
        if !tag.is_empty() && !tag.eq_ignore_ascii_case(&state.tag) {
            return false;
        }
        parts.all(|class| !class.is_empty() && state.classes.iter().any(|have| have == class))
    }
}

impl PartialEq for TestImage {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for TestImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("TestImage")
            .field("classes", &state.classes)
            .field("attributes", &state.attributes)
            .field("src", &state.src)
            .field("srcset", &state.srcset)
            .finish()
    }
}

impl ImageElement for TestImage {
    fn has_class(&self, class: &str) -> bool {
        self.state.borrow().classes.iter().any(|have| have == class)
    }

    fn add_class(&self, class: &str) {
        if !self.has_class(class) {
            self.state.borrow_mut().classes.push(class.to_string());
        }
    }

    fn remove_class(&self, class: &str) {
        self.state.borrow_mut().classes.retain(|have| have != class);
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.state.borrow().attributes.get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.state
            .borrow_mut()
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn remove_attribute(&self, name: &str) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        if state.attributes_locked {
            return Err(HostError::Dom(format!("{name} is locked")));
        }
        state.attributes.remove(name);
        Ok(())
    }

    fn set_src(&self, src: &str) {
        let mut state = self.state.borrow_mut();
        state.src = Some(src.to_string());
        state.src_assignments += 1;
    }

    fn set_srcset(&self, srcset: &str) {
        self.state.borrow_mut().srcset = Some(srcset.to_string());
    }
}
