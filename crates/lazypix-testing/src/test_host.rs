use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use lazypix_core::{
    EntriesCallback, Host, HostError, LazyImageLoader, LoaderSettings, ProbeCallback, ProbeError,
    ProbeRequest, ProbeResult, ReadyState, Rect, RootMargin, Task, VisibilityCriteria,
    VisibilityEntry, VisibilityObserver,
};

use crate::{ImageMarkup, TestImage};

struct PendingProbe {
    request: ProbeRequest,
    complete: ProbeCallback,
}

struct HostState {
    ready_state: ReadyState,
    supports_observer: bool,
    observer_error: Option<String>,
    viewport: Rect,
    images: Vec<TestImage>,
    tasks: VecDeque<Task>,
    content_loaded: Vec<Task>,
    probes: Vec<PendingProbe>,
    probe_history: Vec<ProbeRequest>,
    observers: Vec<TestObserver>,
}

/// Simulated document implementing [`Host`].
///
/// Nothing happens on its own: tasks, visibility batches and probe
/// completions are all driven by the test.
#[derive(Clone)]
pub struct TestHost {
    state: Rc<RefCell<HostState>>,
}

impl TestHost {
    /// A fully parsed document with an 800x600 viewport and observer support.
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(HostState {
                ready_state: ReadyState::Complete,
                supports_observer: true,
                observer_error: None,
                viewport: Rect::new(0.0, 0.0, 800.0, 600.0),
                images: Vec::new(),
                tasks: VecDeque::new(),
                content_loaded: Vec::new(),
                probes: Vec::new(),
                probe_history: Vec::new(),
                observers: Vec::new(),
            })),
        }
    }

    pub fn with_ready_state(self, ready_state: ReadyState) -> Self {
        self.state.borrow_mut().ready_state = ready_state;
        self
    }

    /// Simulates an environment without an intersection observer.
    pub fn without_visibility_observer(self) -> Self {
        self.state.borrow_mut().supports_observer = false;
        self
    }

    /// Advertises observer support but fails to construct one.
    pub fn with_failing_observer(self, message: impl Into<String>) -> Self {
        self.state.borrow_mut().observer_error = Some(message.into());
        self
    }

    pub fn with_viewport(self, width: f32, height: f32) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.viewport.width = width;
            state.viewport.height = height;
        }
        self
    }

    /// Appends an element to the document.
    pub fn add_image(&self, markup: ImageMarkup) -> TestImage {
        let image = TestImage::from_markup(markup);
        self.state.borrow_mut().images.push(image.clone());
        image
    }

    /// Installs a loader and runs whatever it scheduled.
    pub fn install(&self, settings: LoaderSettings) -> Rc<LazyImageLoader<TestHost>> {
        let loader = LazyImageLoader::install(self.clone(), settings);
        self.run_pending_tasks();
        loader
    }

    pub fn viewport(&self) -> Rect {
        self.state.borrow().viewport
    }

    /// Scrolls the viewport so its top edge sits at `y`.
    pub fn scroll_to(&self, y: f32) {
        self.state.borrow_mut().viewport.y = y;
    }

    /// Runs queued tasks, including any they queue, until none remain.
    pub fn run_pending_tasks(&self) -> usize {
        let mut ran = 0;
        loop {
            let task = self.state.borrow_mut().tasks.pop_front();
            let Some(task) = task else {
                return ran;
            };
            task();
            ran += 1;
        }
    }

    pub fn pending_task_count(&self) -> usize {
        self.state.borrow().tasks.len()
    }

    /// Marks the document interactive and runs content-loaded listeners.
    pub fn fire_content_loaded(&self) -> usize {
        let listeners = {
            let mut state = self.state.borrow_mut();
            state.ready_state = ReadyState::Interactive;
            std::mem::take(&mut state.content_loaded)
        };
        let count = listeners.len();
        for listener in listeners {
            listener();
        }
        count
    }

    pub fn observers(&self) -> Vec<TestObserver> {
        self.state.borrow().observers.clone()
    }

    /// Lets every observer report targets whose visibility changed since
    /// their last report. Returns the number of entries delivered.
    pub fn deliver_visibility(&self) -> usize {
        let viewport = self.viewport();
        self.observers()
            .iter()
            .map(|observer| observer.deliver_changes(&viewport))
            .sum()
    }

    /// Hands `entries` to every observer's callback verbatim, bypassing
    /// geometry. Used to simulate duplicate or stale deliveries.
    pub fn deliver_entries(&self, entries: Vec<VisibilityEntry<TestImage>>) {
        for observer in self.observers() {
            observer.deliver(entries.clone());
        }
    }

    /// Probes started and not yet completed.
    pub fn pending_probes(&self) -> Vec<ProbeRequest> {
        self.state
            .borrow()
            .probes
            .iter()
            .map(|probe| probe.request.clone())
            .collect()
    }

    /// Every probe ever started, in order.
    pub fn probe_history(&self) -> Vec<ProbeRequest> {
        self.state.borrow().probe_history.clone()
    }

    /// Completes the oldest pending probe for `src`.
    ///
    /// Returns `false` if no such probe is pending.
    pub fn complete_probe(&self, src: &str, result: ProbeResult) -> bool {
        let probe = {
            let mut state = self.state.borrow_mut();
            let Some(index) = state.probes.iter().position(|probe| probe.request.src == src)
            else {
                return false;
            };
            state.probes.remove(index)
        };
        (probe.complete)(result);
        true
    }

    pub fn succeed_probe(&self, src: &str) -> bool {
        self.complete_probe(src, Ok(()))
    }

    pub fn fail_probe(&self, src: &str) -> bool {
        self.complete_probe(
            src,
            Err(ProbeError::Fetch {
                src: src.to_string(),
            }),
        )
    }
}

impl Default for TestHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for TestHost {
    type Image = TestImage;
    type Observer = TestObserver;

    fn ready_state(&self) -> ReadyState {
        self.state.borrow().ready_state
    }

    fn query_pending(&self, selector: &str) -> Vec<TestImage> {
        self.state
            .borrow()
            .images
            .iter()
            .filter(|image| image.matches(selector))
            .cloned()
            .collect()
    }

    fn supports_visibility_observer(&self) -> bool {
        self.state.borrow().supports_observer
    }

    fn create_observer(
        &self,
        root_margin: &RootMargin,
        threshold: f32,
        on_entries: EntriesCallback<TestImage>,
    ) -> Result<TestObserver, HostError> {
        let mut state = self.state.borrow_mut();
        if let Some(message) = &state.observer_error {
            return Err(HostError::Observer(message.clone()));
        }
        let observer = TestObserver::new(
            VisibilityCriteria {
                root_margin: *root_margin,
                threshold,
            },
            on_entries,
        );
        state.observers.push(observer.clone());
        Ok(observer)
    }

    fn start_probe(&self, request: ProbeRequest, complete: ProbeCallback) {
        log::trace!("Probe started for {}", request.src);
        let mut state = self.state.borrow_mut();
        state.probe_history.push(request.clone());
        state.probes.push(PendingProbe { request, complete });
    }

    fn schedule(&self, task: Task) {
        self.state.borrow_mut().tasks.push_back(task);
    }

    fn on_content_loaded(&self, task: Task) {
        self.state.borrow_mut().content_loaded.push(task);
    }
}

struct ObserverState {
    criteria: VisibilityCriteria,
    callback: RefCell<EntriesCallback<TestImage>>,
    /// Observed targets with the intersection state last reported for them.
    targets: RefCell<Vec<(TestImage, Option<bool>)>>,
}

/// Simulated intersection observer.
///
/// Like a browser observer it reports each newly observed target once and
/// afterwards only reports targets whose intersecting state flipped.
#[derive(Clone)]
pub struct TestObserver {
    state: Rc<ObserverState>,
}

impl TestObserver {
    fn new(criteria: VisibilityCriteria, callback: EntriesCallback<TestImage>) -> Self {
        Self {
            state: Rc::new(ObserverState {
                criteria,
                callback: RefCell::new(callback),
                targets: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn criteria(&self) -> VisibilityCriteria {
        self.state.criteria
    }

    /// Targets currently observed.
    pub fn observed(&self) -> Vec<TestImage> {
        self.state
            .targets
            .borrow()
            .iter()
            .map(|(image, _)| image.clone())
            .collect()
    }

    fn deliver_changes(&self, viewport: &Rect) -> usize {
        let entries: Vec<_> = self
            .state
            .targets
            .borrow_mut()
            .iter_mut()
            .filter_map(|(image, last)| {
                let visibility = self.state.criteria.evaluate(viewport, &image.bounds());
                if *last == Some(visibility.is_intersecting) {
                    return None;
                }
                *last = Some(visibility.is_intersecting);
                Some(VisibilityEntry {
                    target: image.clone(),
                    is_intersecting: visibility.is_intersecting,
                })
            })
            .collect();
        let count = entries.len();
        if count > 0 {
            self.deliver(entries);
        }
        count
    }

    fn deliver(&self, entries: Vec<VisibilityEntry<TestImage>>) {
        log::trace!("Delivering {} visibility entries", entries.len());
        let mut callback = self.state.callback.borrow_mut();
        (&mut *callback)(entries);
    }
}

impl VisibilityObserver<TestImage> for TestObserver {
    fn observe(&self, target: &TestImage) {
        let mut targets = self.state.targets.borrow_mut();
        if !targets.iter().any(|(image, _)| image == target) {
            targets.push((target.clone(), None));
        }
    }

    fn unobserve(&self, target: &TestImage) {
        self.state
            .targets
            .borrow_mut()
            .retain(|(image, _)| image != target);
    }
}
