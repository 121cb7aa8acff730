//! Screen edge detection
//!
//! Classifies a pointer position that touched the overlay frame and computes
//! where the pointer should re-appear on the opposite edge.

use super::{Point, ScreenEdge};

/// Configuration for edge detection
#[derive(Debug, Clone)]
pub struct EdgeDetectorConfig {
    /// Edges that are enabled for wrapping
    pub enabled_edges: EdgeMask,
}

impl Default for EdgeDetectorConfig {
    fn default() -> Self {
        Self {
            enabled_edges: EdgeMask::all(),
        }
    }
}

/// Bitmask for enabled edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeMask(u8);

impl EdgeMask {
    pub const NONE: EdgeMask = EdgeMask(0);
    pub const LEFT: EdgeMask = EdgeMask(1 << 0);
    pub const RIGHT: EdgeMask = EdgeMask(1 << 1);
    pub const TOP: EdgeMask = EdgeMask(1 << 2);
    pub const BOTTOM: EdgeMask = EdgeMask(1 << 3);

    pub fn all() -> Self {
        Self(0b1111)
    }

    fn bit(edge: ScreenEdge) -> u8 {
        match edge {
            ScreenEdge::Left => Self::LEFT.0,
            ScreenEdge::Right => Self::RIGHT.0,
            ScreenEdge::Top => Self::TOP.0,
            ScreenEdge::Bottom => Self::BOTTOM.0,
        }
    }

    pub fn is_enabled(&self, edge: ScreenEdge) -> bool {
        (self.0 & Self::bit(edge)) != 0
    }

    pub fn enable(&mut self, edge: ScreenEdge) {
        self.0 |= Self::bit(edge);
    }

    pub fn disable(&mut self, edge: ScreenEdge) {
        self.0 &= !Self::bit(edge);
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl Default for EdgeMask {
    fn default() -> Self {
        Self::all()
    }
}

/// Result of edge detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDetectResult {
    /// Position is not on an enabled edge
    NotAtEdge,
    /// Pointer crossed `edge` and should be moved to `target`
    Wrap { edge: ScreenEdge, target: Point },
}

/// Maps edge hits to the mirrored position on the opposite edge.
///
/// Holds no per-event state: every position is classified against the screen
/// geometry alone. Edges are tested left, top, right, bottom and the first
/// enabled match wins, so the corner (0, 0) always wraps horizontally.
#[derive(Debug, Clone)]
pub struct EdgeDetector {
    config: EdgeDetectorConfig,
    screen_width: u32,
    screen_height: u32,
}

impl EdgeDetector {
    /// Create a new edge detector
    pub fn new(config: EdgeDetectorConfig, screen_width: u32, screen_height: u32) -> Self {
        Self {
            config,
            screen_width,
            screen_height,
        }
    }

    /// Furthest addressable pixel on each axis
    fn far_edges(&self) -> (i32, i32) {
        (
            self.screen_width.saturating_sub(1) as i32,
            self.screen_height.saturating_sub(1) as i32,
        )
    }

    /// Which enabled edge, if any, a position lies on
    pub fn edge_at(&self, x: i32, y: i32) -> Option<ScreenEdge> {
        let (far_x, far_y) = self.far_edges();
        let enabled = &self.config.enabled_edges;

        [
            (ScreenEdge::Left, x == 0),
            (ScreenEdge::Top, y == 0),
            (ScreenEdge::Right, x == far_x),
            (ScreenEdge::Bottom, y == far_y),
        ]
        .into_iter()
        .find(|&(edge, hit)| hit && enabled.is_enabled(edge))
        .map(|(edge, _)| edge)
    }

    /// Check a pointer position and compute the wrap target
    pub fn check(&self, x: i32, y: i32) -> EdgeDetectResult {
        let Some(edge) = self.edge_at(x, y) else {
            return EdgeDetectResult::NotAtEdge;
        };
        let (far_x, far_y) = self.far_edges();

        let target = match edge {
            ScreenEdge::Left => Point::new(far_x, y),
            ScreenEdge::Top => Point::new(x, far_y),
            ScreenEdge::Right => Point::new(0, y),
            ScreenEdge::Bottom => Point::new(x, 0),
        };

        EdgeDetectResult::Wrap { edge, target }
    }

    pub fn enabled_edges(&self) -> EdgeMask {
        self.config.enabled_edges
    }
}
