//! Viewport geometry.
//!
//! Browsers compute intersections themselves; this module mirrors their rules
//! so the margin and threshold settings can be reasoned about (and simulated)
//! without a browser.

use std::fmt;
use std::str::FromStr;

use crate::SettingsError;

/// Axis-aligned rectangle in CSS pixels, `y` growing downwards.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Returns the overlapping region, or `None` when the rectangles are apart.
    ///
    /// Rectangles that only share an edge overlap in a zero-sized region,
    /// which still counts as an intersection.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    /// Grows the rectangle outwards by the given insets (negative shrinks it).
    pub fn outset(&self, top: f32, right: f32, bottom: f32, left: f32) -> Rect {
        Rect::new(
            self.x - left,
            self.y - top,
            self.width + left + right,
            self.height + top + bottom,
        )
    }
}

/// One component of a root margin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarginLength {
    Px(f32),
    /// Percentage of the root's width (left/right) or height (top/bottom).
    Percent(f32),
}

impl MarginLength {
    pub fn resolve(self, basis: f32) -> f32 {
        match self {
            MarginLength::Px(px) => px,
            MarginLength::Percent(percent) => basis * percent / 100.0,
        }
    }

    fn parse(token: &str) -> Option<Self> {
        if let Some(value) = token.strip_suffix("px") {
            return finite(value).map(MarginLength::Px);
        }
        if let Some(value) = token.strip_suffix('%') {
            return finite(value).map(MarginLength::Percent);
        }
        // Unitless lengths are only valid for zero.
        match token.parse::<f32>() {
            Ok(value) if value == 0.0 => Some(MarginLength::Px(0.0)),
            _ => None,
        }
    }
}

fn finite(value: &str) -> Option<f32> {
    value.parse::<f32>().ok().filter(|value| value.is_finite())
}

impl fmt::Display for MarginLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarginLength::Px(px) => write!(f, "{px}px"),
            MarginLength::Percent(percent) => write!(f, "{percent}%"),
        }
    }
}

/// Expansion applied to the viewport before intersections are computed.
///
/// Parsed from the CSS margin shorthand, e.g. `"200px 0px"` for 200px above
/// and below and nothing to the sides.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootMargin {
    pub top: MarginLength,
    pub right: MarginLength,
    pub bottom: MarginLength,
    pub left: MarginLength,
}

impl RootMargin {
    pub const ZERO: RootMargin = RootMargin::uniform(MarginLength::Px(0.0));

    pub const fn uniform(length: MarginLength) -> Self {
        Self {
            top: length,
            right: length,
            bottom: length,
            left: length,
        }
    }

    /// Vertical margin above and below, horizontal margin on both sides.
    pub const fn symmetric(vertical: MarginLength, horizontal: MarginLength) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn parse(css: &str) -> Result<Self, SettingsError> {
        let invalid = || SettingsError::RootMargin(css.to_string());
        let lengths = css
            .split_whitespace()
            .map(|token| MarginLength::parse(token).ok_or_else(invalid))
            .collect::<Result<Vec<_>, _>>()?;

        match lengths[..] {
            [all] => Ok(Self::uniform(all)),
            [vertical, horizontal] => Ok(Self::symmetric(vertical, horizontal)),
            [top, horizontal, bottom] => Ok(Self {
                top,
                right: horizontal,
                bottom,
                left: horizontal,
            }),
            [top, right, bottom, left] => Ok(Self {
                top,
                right,
                bottom,
                left,
            }),
            _ => Err(invalid()),
        }
    }

    /// The root rectangle grown by this margin.
    pub fn expand(&self, root: &Rect) -> Rect {
        root.outset(
            self.top.resolve(root.height),
            self.right.resolve(root.width),
            self.bottom.resolve(root.height),
            self.left.resolve(root.width),
        )
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::symmetric(MarginLength::Px(200.0), MarginLength::Px(0.0))
    }
}

impl FromStr for RootMargin {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

/// Fraction of `target`'s area inside `root`, or `None` if they do not touch.
///
/// A zero-area target touching the root is reported as fully visible.
pub fn intersection_ratio(root: &Rect, target: &Rect) -> Option<f32> {
    let overlap = root.intersect(target)?;
    let area = target.area();
    if area <= 0.0 {
        return Some(1.0);
    }
    Some((overlap.area() / area).min(1.0))
}

/// Result of checking one target against the expanded viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Visibility {
    pub is_intersecting: bool,
    pub ratio: f32,
}

/// Margin and threshold deciding when a target counts as visible.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityCriteria {
    pub root_margin: RootMargin,
    pub threshold: f32,
}

impl VisibilityCriteria {
    pub fn evaluate(&self, viewport: &Rect, target: &Rect) -> Visibility {
        let root = self.root_margin.expand(viewport);
        match intersection_ratio(&root, target) {
            Some(ratio) => Visibility {
                is_intersecting: ratio >= self.threshold,
                ratio,
            },
            None => Visibility {
                is_intersecting: false,
                ratio: 0.0,
            },
        }
    }
}

impl Default for VisibilityCriteria {
    fn default() -> Self {
        Self {
            root_margin: RootMargin::default(),
            threshold: 0.01,
        }
    }
}
