//! Display request and event types
//!
//! Backend-independent values passed to and returned from a
//! [`DisplayBackend`](super::DisplayBackend).

use crate::screen::{Point, Rect};

/// Server-side window identifier
pub type WindowId = u32;

/// Window class requested at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowClass {
    /// No visual representation, receives input only
    InputOnly,
    /// Regular window painted with a solid white background
    InputOutput,
}

/// Parameters for creating a top-level child of the root window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSpec {
    pub parent: WindowId,
    pub geometry: Rect,
    pub class: WindowClass,
}

/// How a shape mask combines with the window's current region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeOp {
    /// Replace the region
    Set,
    /// Remove the mask from the region
    Subtract,
}

/// Which region of a window a shape mask applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// Area that receives pointer input
    Input,
    /// Area that is drawn on screen
    Bounding,
}

/// A single shape-mask operation: `op` the `rect` into region `kind`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeStep {
    pub op: ShapeOp,
    pub kind: ShapeKind,
    pub rect: Rect,
}

/// The pointer entered the overlay's input region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEntry {
    /// Window that received the event
    pub window: WindowId,
    /// Entry position relative to that window
    pub position: Point,
}

/// Events delivered by the display server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    PointerEntry(PointerEntry),
    /// A request failed asynchronously on the server
    ProtocolError(String),
    /// Any other event kind; ignored
    Other,
}
