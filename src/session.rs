//! A running wrap session
//!
//! Owns the display connection, the overlay window and the dispatcher for the
//! lifetime of the process. Dropping the session tears the overlay down and
//! closes the connection.

use tracing::{debug, info, warn};

use crate::display::{DisplayBackend, DisplayResult};
use crate::overlay::{Overlay, OverlayConfig};
use crate::screen::{EdgeDetector, EdgeDetectorConfig};
use crate::shutdown::ShutdownSignal;
use crate::wrap::{self, WarpDispatcher};

pub struct Session<B: DisplayBackend> {
    backend: B,
    overlay: Overlay,
    dispatcher: WarpDispatcher,
}

impl<B: DisplayBackend> Session<B> {
    /// Build the overlay on `backend`'s screen and prepare the dispatcher
    pub fn start(
        backend: B,
        overlay_config: &OverlayConfig,
        edge_config: EdgeDetectorConfig,
    ) -> DisplayResult<Self> {
        let screen = backend.screen();
        info!(
            "Screen: {}x{}, root window {:#x}",
            screen.width, screen.height, screen.root
        );

        let overlay = Overlay::create(&backend, overlay_config)?;
        let detector = EdgeDetector::new(edge_config, screen.width, screen.height);
        if detector.enabled_edges().is_empty() {
            warn!("All edges are disabled; the pointer will never wrap");
        }

        Ok(Self {
            backend,
            overlay,
            dispatcher: WarpDispatcher::new(detector),
        })
    }

    /// Run the event loop, then tear down whichever way it ended
    pub async fn run<F>(&mut self, shutdown: F) -> DisplayResult<ShutdownSignal>
    where
        F: std::future::Future<Output = ShutdownSignal>,
    {
        let result = wrap::run(&self.backend, &self.dispatcher, shutdown).await;
        self.teardown();
        result
    }

    /// Unmap the overlay. Safe to call any number of times.
    pub fn teardown(&mut self) {
        // The connection may already be gone; nothing left to undo then.
        if let Err(e) = self.overlay.teardown(&self.backend) {
            debug!("Overlay teardown failed: {}", e);
        }
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[cfg(test)]
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }
}

impl<B: DisplayBackend> Drop for Session<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}
