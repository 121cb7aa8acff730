//! Display trait definitions
//!
//! Defines the requests the overlay and the warp dispatcher need from a
//! display server connection.

use std::os::unix::io::BorrowedFd;

use thiserror::Error;

use super::events::{DisplayEvent, ShapeStep, WindowId, WindowSpec};
use crate::screen::{Point, Screen};

/// Errors that can occur while talking to the display server
#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("Failed to connect to display: {0}")]
    Connect(#[from] x11rb::errors::ConnectError),

    #[error("Display connection failed: {0}")]
    Connection(#[from] x11rb::errors::ConnectionError),

    #[error("Request failed: {0}")]
    Reply(#[from] x11rb::errors::ReplyError),

    #[error("Resource allocation failed: {0}")]
    Allocation(#[from] x11rb::errors::ReplyOrIdError),

    #[error("Required extension missing: {0}")]
    MissingExtension(&'static str),

    #[error("No screen {0} on this display")]
    NoScreen(usize),

    #[error("Coordinate out of range: {0}")]
    OutOfRange(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DisplayResult<T> = Result<T, DisplayError>;

/// A connection to a display server.
///
/// Requests are buffered until [`flush`](DisplayBackend::flush). Methods that
/// need a round trip (window creation, atom interning, shape masks) wait for
/// the server to confirm so that failures surface as errors.
pub trait DisplayBackend {
    /// The screen this connection operates on
    fn screen(&self) -> Screen;

    /// File descriptor that becomes readable when events are pending
    fn event_fd(&self) -> BorrowedFd<'_>;

    /// Create an unmapped window that selects pointer-enter events only
    fn create_window(&self, spec: &WindowSpec) -> DisplayResult<WindowId>;

    /// Set a property to a list of atoms, interned by name
    fn set_atom_property(&self, window: WindowId, property: &str, atoms: &[&str])
        -> DisplayResult<()>;

    /// Set a property to a single 32-bit cardinal
    fn set_cardinal_property(&self, window: WindowId, property: &str, value: u32)
        -> DisplayResult<()>;

    /// Set a text property of the given encoding type (e.g. `STRING`)
    fn set_text_property(
        &self,
        window: WindowId,
        property: &str,
        encoding: &str,
        value: &str,
    ) -> DisplayResult<()>;

    /// Stack the window above all of its siblings
    fn raise_window(&self, window: WindowId) -> DisplayResult<()>;

    /// Apply one shape-mask operation to the window
    fn apply_shape(&self, window: WindowId, step: &ShapeStep) -> DisplayResult<()>;

    fn map_window(&self, window: WindowId) -> DisplayResult<()>;

    fn unmap_window(&self, window: WindowId) -> DisplayResult<()>;

    /// Move the pointer to an absolute position on the root window
    fn warp_pointer(&self, target: Point) -> DisplayResult<()>;

    /// Send all buffered requests to the server
    fn flush(&self) -> DisplayResult<()>;

    /// Return the next queued event without blocking
    fn poll_event(&self) -> DisplayResult<Option<DisplayEvent>>;
}
