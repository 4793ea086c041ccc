//! The lazy image loader: initializer, commit procedure and fallback path.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::{
    Host, HostError, ImageElement, LoaderSettings, LoaderStats, PendingImage, ProbeRequest,
    ProbeResult, VisibilityEntry, VisibilityWatcher,
};

/// How pending images are being loaded. Chosen once at initialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadMode {
    /// The document had no pending images; nothing was set up.
    Idle,
    /// Images are committed as they approach the viewport.
    Observed,
    /// No visibility observer: every image was loaded on the spot.
    Immediate,
}

type Watcher<H> = VisibilityWatcher<<H as Host>::Image, <H as Host>::Observer>;

/// Defers image fetches until images approach the viewport.
///
/// One loader exists per page. It is shared through an `Rc` because the
/// host's callbacks (ready signal, observer batches, probe completions) need
/// to reach it long after [`install`](Self::install) returns.
pub struct LazyImageLoader<H: Host> {
    host: H,
    settings: LoaderSettings,
    mode: Cell<Option<LoadMode>>,
    watcher: RefCell<Option<Rc<Watcher<H>>>>,
    stats: Cell<LoaderStats>,
}

impl<H: Host> LazyImageLoader<H> {
    /// Creates a loader without scheduling its initialization.
    pub fn new(host: H, settings: LoaderSettings) -> Rc<Self> {
        Rc::new(Self {
            host,
            settings,
            mode: Cell::new(None),
            watcher: RefCell::new(None),
            stats: Cell::new(LoaderStats::default()),
        })
    }

    /// Creates a loader and schedules [`initialize`](Self::initialize).
    ///
    /// If the document is already interactive or complete, initialization
    /// runs on the next task; otherwise it waits for the content-loaded
    /// signal. Keep the returned handle: observer batches reach the loader
    /// through a weak reference.
    pub fn install(host: H, settings: LoaderSettings) -> Rc<Self> {
        let loader = Self::new(host, settings);
        let ready_state = loader.host.ready_state();
        let task = {
            let loader = Rc::clone(&loader);
            Box::new(move || loader.initialize())
        };
        if ready_state.is_ready() {
            log::debug!("Document is {ready_state:?}, initializing on next task");
            loader.host.schedule(task);
        } else {
            log::debug!("Document still loading, waiting for content loaded");
            loader.host.on_content_loaded(task);
        }
        loader
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn settings(&self) -> &LoaderSettings {
        &self.settings
    }

    /// The selected load mode, or `None` before initialization.
    pub fn mode(&self) -> Option<LoadMode> {
        self.mode.get()
    }

    pub fn stats(&self) -> LoaderStats {
        self.stats.get()
    }

    /// Number of images still waiting to become visible.
    pub fn watched_count(&self) -> usize {
        self.watcher
            .borrow()
            .as_ref()
            .map_or(0, |watcher| watcher.watched_count())
    }

    /// Scans the document and selects the load mode. Runs at most once.
    pub fn initialize(self: &Rc<Self>) {
        if self.mode.get().is_some() {
            return;
        }

        let images = self.host.query_pending(&self.settings.selector);
        if images.is_empty() {
            log::debug!("No images match {:?}", self.settings.selector);
            self.mode.set(Some(LoadMode::Idle));
            return;
        }

        if self.host.supports_visibility_observer() {
            match self.start_watching(&images) {
                Ok(()) => {
                    log::info!("Watching {} lazy images", images.len());
                    return;
                }
                Err(err) => {
                    log::warn!("{err}; loading images immediately");
                }
            }
        }

        self.load_immediately(&images);
    }

    fn start_watching(self: &Rc<Self>, images: &[H::Image]) -> Result<(), HostError> {
        let weak = Rc::downgrade(self);
        let observer = self.host.create_observer(
            &self.settings.root_margin,
            self.settings.threshold,
            Box::new(move |entries: Vec<VisibilityEntry<H::Image>>| {
                if let Some(loader) = weak.upgrade() {
                    loader.handle_entries(entries);
                }
            }),
        )?;

        let watcher = Rc::new(VisibilityWatcher::new(observer));
        // Installed before observing so batches delivered during `watch` land.
        *self.watcher.borrow_mut() = Some(Rc::clone(&watcher));
        self.mode.set(Some(LoadMode::Observed));

        for image in images {
            watcher.watch(image.clone());
        }
        let observed = watcher.watched_count();
        self.update_stats(|stats| stats.observed += observed);
        Ok(())
    }

    /// Handles a batch of visibility entries from the host's observer.
    ///
    /// Every intersecting target is committed once and then released from
    /// the watcher.
    pub fn handle_entries(self: &Rc<Self>, entries: Vec<VisibilityEntry<H::Image>>) {
        let Some(watcher) = self.watcher.borrow().clone() else {
            log::debug!("Dropping {} entries delivered without a watcher", entries.len());
            return;
        };
        watcher.dispatch(entries, |image| self.commit(image));
    }

    /// Commits the deferred resource of one image.
    ///
    /// Guarded by the processed flag: repeated calls for the same image do
    /// nothing after the first.
    pub fn commit(self: &Rc<Self>, image: &H::Image) {
        let pending = PendingImage::read(image, &self.settings);
        if pending.processed {
            log::debug!("Skipping already processed image");
            self.update_stats(|stats| stats.duplicates_skipped += 1);
            return;
        }
        image.set_attribute(&self.settings.processed_attribute, "1");
        self.update_stats(|stats| stats.committed += 1);

        let Some(src) = pending.src else {
            self.mark_loaded(image);
            self.update_stats(|stats| stats.loaded += 1);
            return;
        };

        let request = ProbeRequest {
            src,
            srcset: pending.srcset,
        };
        log::debug!("Probing {}", request.src);
        self.update_stats(|stats| stats.in_flight += 1);

        let loader = Rc::clone(self);
        let target = image.clone();
        let committed = request.clone();
        self.host.start_probe(
            request,
            Box::new(move |result| loader.finish_probe(&target, &committed, result)),
        );
    }

    fn finish_probe(&self, image: &H::Image, request: &ProbeRequest, result: ProbeResult) {
        self.update_stats(|stats| stats.in_flight = stats.in_flight.saturating_sub(1));
        match result {
            Ok(()) => {
                if let Some(srcset) = &request.srcset {
                    image.set_srcset(srcset);
                }
                image.set_src(&request.src);
                self.mark_loaded(image);
                self.clear_deferred(image);
                self.update_stats(|stats| stats.loaded += 1);
                log::debug!("Loaded {}", request.src);
            }
            Err(err) => {
                log::debug!("{err}");
                image.remove_class(&self.settings.pending_class);
                self.update_stats(|stats| stats.failed += 1);
            }
        }
    }

    /// Immediate path: assigns every primary locator on the spot.
    fn load_immediately(&self, images: &[H::Image]) {
        for image in images {
            match PendingImage::read(image, &self.settings).src {
                Some(src) => image.set_src(&src),
                None => image.add_class(&self.settings.loaded_class),
            }
            image.remove_class(&self.settings.pending_class);
        }
        self.mode.set(Some(LoadMode::Immediate));
        self.update_stats(|stats| stats.immediate += images.len());
        log::info!("No visibility observer, loaded {} images immediately", images.len());
    }

    fn mark_loaded(&self, image: &H::Image) {
        image.add_class(&self.settings.loaded_class);
        image.remove_class(&self.settings.pending_class);
    }

    fn clear_deferred(&self, image: &H::Image) {
        for name in [&self.settings.src_attribute, &self.settings.srcset_attribute] {
            if let Err(err) = image.remove_attribute(name) {
                log::trace!("Ignoring failure to remove {name}: {err}");
            }
        }
    }

    fn update_stats(&self, update: impl FnOnce(&mut LoaderStats)) {
        let mut stats = self.stats.get();
        update(&mut stats);
        self.stats.set(stats);
    }
}
