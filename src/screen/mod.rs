//! Screen geometry module
//!
//! Handles:
//! - Screen dimensions and the root window
//! - Screen edge detection for pointer wrapping
//! - Rectangles used to build the overlay frame

mod edge_detector;

pub use edge_detector::{EdgeDetectResult, EdgeDetector, EdgeDetectorConfig, EdgeMask};

/// Screen edge identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ScreenEdge {
    Left = 0,
    Right = 1,
    Top = 2,
    Bottom = 3,
}

impl ScreenEdge {
    pub const ALL: [ScreenEdge; 4] = [
        ScreenEdge::Left,
        ScreenEdge::Right,
        ScreenEdge::Top,
        ScreenEdge::Bottom,
    ];

    /// Get the opposite edge (where a wrapped pointer re-appears)
    pub fn opposite(self) -> ScreenEdge {
        match self {
            ScreenEdge::Left => ScreenEdge::Right,
            ScreenEdge::Right => ScreenEdge::Left,
            ScreenEdge::Top => ScreenEdge::Bottom,
            ScreenEdge::Bottom => ScreenEdge::Top,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScreenEdge::Left => "left",
            ScreenEdge::Right => "right",
            ScreenEdge::Top => "top",
            ScreenEdge::Bottom => "bottom",
        }
    }
}

impl std::fmt::Display for ScreenEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A position in root window coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Shrink by `margin` pixels on every side
    pub fn inset(&self, margin: u32) -> Rect {
        Rect {
            x: self.x + margin as i32,
            y: self.y + margin as i32,
            width: self.width.saturating_sub(margin * 2),
            height: self.height.saturating_sub(margin * 2),
        }
    }
}

/// Screen information, captured once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen {
    /// Root window of the screen
    pub root: u32,
    /// Screen width in pixels
    pub width: u32,
    /// Screen height in pixels
    pub height: u32,
}

impl Screen {
    pub fn new(root: u32, width: u32, height: u32) -> Self {
        Self {
            root,
            width,
            height,
        }
    }

    /// The whole screen as a rectangle at the origin
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }
}
