//! Error types shared by the loader and its hosts.

/// Errors raised while building [`LoaderSettings`](crate::LoaderSettings).
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("Invalid root margin {0:?}: expected 1 to 4 lengths in px or %")]
    RootMargin(String),

    #[error("Threshold {0} outside 0.0..=1.0")]
    Threshold(f32),

    #[error("Empty {0} name")]
    EmptyName(&'static str),
}

/// Errors reported by a [`Host`](crate::Host) implementation.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("No window available")]
    NoWindow,

    #[error("No document available")]
    NoDocument,

    #[error("DOM operation failed: {0}")]
    Dom(String),

    #[error("Visibility observer unavailable: {0}")]
    Observer(String),
}

/// Failure of an off-screen probe.
///
/// This never leaves the loader: it only decides that the element drops its
/// pending class without being marked as loaded.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("Failed to fetch or decode {src}")]
    Fetch { src: String },
}

/// Outcome handed to a probe's completion callback.
pub type ProbeResult = Result<(), ProbeError>;
