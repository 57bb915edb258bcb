//! Viewport geometry: rectangles, root margins and intersection tests.
//!
//! Mirrors the intersection-observer model: a root rectangle (the viewport)
//! is grown or shrunk by a CSS-style margin, and an element counts as visible
//! once the fraction of its area inside that rectangle reaches a threshold.

use std::fmt;
use std::str::FromStr;

use crate::error::RevealError;

/// Axis-aligned rectangle in CSS pixels, y growing downwards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width (never negative for well-formed rects).
    pub width: f32,
    /// Height (never negative for well-formed rects).
    pub height: f32,
}

impl Rect {
    /// Create a rect from its top-left corner and size.
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Area, zero for degenerate rects.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Intersection with `other`.
    ///
    /// Edge-adjacent rects intersect with zero area, matching how the browser
    /// reports an element that touches the root boundary.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    /// Grow each edge outward by the given amounts (negative values shrink).
    pub fn inflate(&self, edges: Edges) -> Rect {
        Rect::new(
            self.x - edges.left,
            self.y - edges.top,
            (self.width + edges.left + edges.right).max(0.0),
            (self.height + edges.top + edges.bottom).max(0.0),
        )
    }
}

/// Resolved per-edge pixel amounts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Edges {
    /// Top edge, pixels.
    pub top: f32,
    /// Right edge, pixels.
    pub right: f32,
    /// Bottom edge, pixels.
    pub bottom: f32,
    /// Left edge, pixels.
    pub left: f32,
}

/// One margin component: absolute pixels or a percentage of the root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    /// Absolute pixels.
    Px(f32),
    /// Percentage of the root's width (left/right) or height (top/bottom).
    Percent(f32),
}

impl Length {
    fn resolve(self, basis: f32) -> f32 {
        match self {
            Length::Px(px) => px,
            Length::Percent(pct) => basis * pct / 100.0,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(px) => write!(f, "{px}px"),
            Length::Percent(pct) => write!(f, "{pct}%"),
        }
    }
}

impl FromStr for Length {
    type Err = RevealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || RevealError::RootMargin(s.to_owned());
        let (number, unit) = if let Some(n) = s.strip_suffix("px") {
            (n, Some(true))
        } else if let Some(n) = s.strip_suffix('%') {
            (n, Some(false))
        } else {
            (s, None)
        };
        let value: f32 = number.parse().map_err(|_| bad())?;
        if !value.is_finite() {
            return Err(bad());
        }
        match unit {
            Some(true) => Ok(Length::Px(value)),
            Some(false) => Ok(Length::Percent(value)),
            // Unitless is only valid for zero, as in CSS.
            None if value == 0.0 => Ok(Length::Px(0.0)),
            None => Err(bad()),
        }
    }
}

/// CSS margin shorthand applied to the viewport before intersection tests.
///
/// Accepts one to four space-separated lengths (`"100px"`,
/// `"0px 0px -50px 0px"`, `"10%"`), expanded in the usual
/// top/right/bottom/left order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMargin {
    /// Top margin.
    pub top: Length,
    /// Right margin.
    pub right: Length,
    /// Bottom margin.
    pub bottom: Length,
    /// Left margin.
    pub left: Length,
}

impl RootMargin {
    /// No margin.
    pub const ZERO: RootMargin = RootMargin::uniform(Length::Px(0.0));

    /// The same length on every edge.
    pub const fn uniform(length: Length) -> Self {
        Self {
            top: length,
            right: length,
            bottom: length,
            left: length,
        }
    }

    /// Pixel amounts for each edge against a root of the given size.
    pub fn resolve(&self, root: &Rect) -> Edges {
        Edges {
            top: self.top.resolve(root.height),
            right: self.right.resolve(root.width),
            bottom: self.bottom.resolve(root.height),
            left: self.left.resolve(root.width),
        }
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        RootMargin::uniform(Length::Px(100.0))
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.top == self.right
            && self.right == self.bottom
            && self.bottom == self.left
        {
            return write!(f, "{}", self.top);
        }
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

impl FromStr for RootMargin {
    type Err = RevealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<Length>, _>>()
            .map_err(|_| RevealError::RootMargin(s.to_owned()))?;

        let [top, right, bottom, left] = match parts.as_slice() {
            [all] => [*all; 4],
            [vertical, horizontal] => {
                [*vertical, *horizontal, *vertical, *horizontal]
            }
            [top, horizontal, bottom] => [*top, *horizontal, *bottom, *horizontal],
            [top, right, bottom, left] => [*top, *right, *bottom, *left],
            _ => return Err(RevealError::RootMargin(s.to_owned())),
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}

impl serde::Serialize for RootMargin {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for RootMargin {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Fraction of `element`'s area inside `root` grown by `margin`.
///
/// A zero-area element reports 1.0 when it lies within the grown root and
/// 0.0 otherwise.
pub fn intersection_ratio(element: &Rect, root: &Rect, margin: &RootMargin) -> f32 {
    let bounds = root.inflate(margin.resolve(root));
    let Some(overlap) = element.intersection(&bounds) else {
        return 0.0;
    };
    let area = element.area();
    if area <= 0.0 {
        return 1.0;
    }
    (overlap.area() / area).min(1.0)
}

/// Whether `element` meets `threshold` against `root` grown by `margin`.
///
/// A threshold of zero accepts any overlap, including edge contact.
pub fn is_intersecting(element: &Rect, root: &Rect, margin: &RootMargin, threshold: f32) -> bool {
    let bounds = root.inflate(margin.resolve(root));
    if element.intersection(&bounds).is_none() {
        return false;
    }
    intersection_ratio(element, root, margin) >= threshold
}
