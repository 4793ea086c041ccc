/// Counters describing what the loader has done so far.
///
/// Used for testing and debugging; nothing in the loader reads them back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoaderStats {
    /// Images handed to the visibility watcher.
    pub observed: usize,

    /// Commit procedures that passed the processed-flag guard.
    pub committed: usize,

    /// Images whose real resource was committed, including those with
    /// nothing to fetch.
    pub loaded: usize,

    /// Probes that reported a fetch or decode failure.
    pub failed: usize,

    /// Probes started and not yet finished.
    pub in_flight: usize,

    /// Commit attempts rejected because the image was already processed.
    pub duplicates_skipped: usize,

    /// Images handled by the immediate-load fallback.
    pub immediate: usize,
}
