//! Display module - Connection to the windowing server
//!
//! This module provides abstractions for:
//! - Creating and shaping the overlay window
//! - Setting window-manager hint properties
//! - Warping the pointer and receiving pointer-entry events

mod events;
mod traits;
mod x11;

#[cfg(test)]
pub mod mock;

// Re-export common types
pub use events::*;
pub use traits::*;

pub use x11::X11Backend;
