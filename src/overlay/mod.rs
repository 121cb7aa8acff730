//! Overlay window management
//!
//! Builds the full-screen window that only reacts to the pointer along its
//! outermost pixels. The window is tagged as an always-on-top dock on every
//! desktop so window managers leave it alone.

use tracing::{debug, info, warn};

use crate::display::{
    DisplayBackend, DisplayResult, ShapeKind, ShapeOp, ShapeStep, WindowClass, WindowId,
    WindowSpec,
};
use crate::screen::{Rect, Screen};

/// Width of the input-sensitive frame in pixels
pub const FRAME_WIDTH: u32 = 1;

/// `_NET_WM_DESKTOP` value meaning "all desktops"
pub const ALL_DESKTOPS: u32 = 0xFFFF_FFFF;

/// Default window name, visible to tools like `xprop` and `wmctrl`
pub const DEFAULT_NAME: &str = "xwrap";

const NET_WM_WINDOW_TYPE: &str = "_NET_WM_WINDOW_TYPE";
const NET_WM_WINDOW_TYPE_DOCK: &str = "_NET_WM_WINDOW_TYPE_DOCK";
const NET_WM_STATE: &str = "_NET_WM_STATE";
const NET_WM_STATE_ABOVE: &str = "_NET_WM_STATE_ABOVE";
const NET_WM_DESKTOP: &str = "_NET_WM_DESKTOP";
const NET_WM_NAME: &str = "_NET_WM_NAME";
const WM_NAME: &str = "WM_NAME";

/// Settings for creating the overlay
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    /// Window name
    pub name: String,
    /// Paint the frame white so it can be seen
    pub visible: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            visible: false,
        }
    }
}

/// Shape steps that reduce a window covering `bounds` to a hollow frame.
///
/// Sets the region to the whole window, then cuts out the interior. When the
/// window is too small to have an interior only the first step is returned.
pub fn frame_shape(bounds: Rect, kind: ShapeKind) -> Vec<ShapeStep> {
    let mut steps = vec![ShapeStep {
        op: ShapeOp::Set,
        kind,
        rect: bounds,
    }];

    let interior = bounds.inset(FRAME_WIDTH);
    if !interior.is_empty() {
        steps.push(ShapeStep {
            op: ShapeOp::Subtract,
            kind,
            rect: interior,
        });
    }

    steps
}

/// The overlay window owned by this process
#[derive(Debug)]
pub struct Overlay {
    window: WindowId,
    screen: Screen,
    visible: bool,
    mapped: bool,
}

impl Overlay {
    /// Create, shape and map the overlay.
    ///
    /// Window creation and shaping failures are returned; hint failures are
    /// only logged.
    pub fn create<B: DisplayBackend>(backend: &B, config: &OverlayConfig) -> DisplayResult<Self> {
        let screen = backend.screen();
        let class = if config.visible {
            WindowClass::InputOutput
        } else {
            WindowClass::InputOnly
        };

        let window = backend.create_window(&WindowSpec {
            parent: screen.root,
            geometry: screen.bounds(),
            class,
        })?;

        let mut overlay = Self {
            window,
            screen,
            visible: config.visible,
            mapped: false,
        };

        overlay.apply_hints(backend, &config.name);
        overlay.apply_input_shape(backend)?;

        backend.map_window(window)?;
        backend.flush()?;
        overlay.mapped = true;

        info!(
            "Overlay {:#x} covering {}x{} mapped",
            window, screen.width, screen.height
        );

        Ok(overlay)
    }

    /// Tag the window for the window manager. Failures are cosmetic.
    pub fn apply_hints<B: DisplayBackend>(&self, backend: &B, name: &str) {
        let window = self.window;
        let results = [
            (
                NET_WM_WINDOW_TYPE,
                backend.set_atom_property(window, NET_WM_WINDOW_TYPE, &[NET_WM_WINDOW_TYPE_DOCK]),
            ),
            (
                NET_WM_STATE,
                backend.set_atom_property(window, NET_WM_STATE, &[NET_WM_STATE_ABOVE]),
            ),
            (
                NET_WM_DESKTOP,
                backend.set_cardinal_property(window, NET_WM_DESKTOP, ALL_DESKTOPS),
            ),
            ("stack mode", backend.raise_window(window)),
            (
                WM_NAME,
                backend.set_text_property(window, WM_NAME, "STRING", name),
            ),
            (
                NET_WM_NAME,
                backend.set_text_property(window, NET_WM_NAME, "UTF8_STRING", name),
            ),
        ];

        for (hint, result) in results {
            if let Err(e) = result {
                warn!("Failed to set {} on overlay: {}", hint, e);
            }
        }
    }

    /// Restrict input to the outer frame. With `visible`, the drawn area is
    /// restricted the same way.
    pub fn apply_input_shape<B: DisplayBackend>(&self, backend: &B) -> DisplayResult<()> {
        let bounds = self.screen.bounds();

        let mut steps = frame_shape(bounds, ShapeKind::Input);
        if self.visible {
            steps.extend(frame_shape(bounds, ShapeKind::Bounding));
        }

        for step in &steps {
            backend.apply_shape(self.window, step)?;
        }
        debug!("Applied {} shape operations to overlay", steps.len());

        Ok(())
    }

    /// Unmap the window. Only the first call has any effect.
    pub fn teardown<B: DisplayBackend>(&mut self, backend: &B) -> DisplayResult<()> {
        if !self.mapped {
            return Ok(());
        }
        self.mapped = false;

        backend.unmap_window(self.window)?;
        backend.flush()?;
        debug!("Overlay {:#x} unmapped", self.window);
        Ok(())
    }

    #[cfg(test)]
    pub fn window(&self) -> WindowId {
        self.window
    }

    #[cfg(test)]
    pub fn is_mapped(&self) -> bool {
        self.mapped
    }
}
