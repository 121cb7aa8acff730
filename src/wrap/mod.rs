//! Pointer wrapping
//!
//! Turns pointer-entry events on the overlay frame into pointer warps and
//! drives the event loop until shutdown.

use std::future::Future;

use tokio::io::unix::AsyncFd;
use tokio::io::Interest;
use tracing::{debug, trace, warn};

use crate::display::{DisplayBackend, DisplayEvent, DisplayResult, PointerEntry};
use crate::screen::{EdgeDetectResult, EdgeDetector, Point};
use crate::shutdown::ShutdownSignal;

/// Warps the pointer to the opposite edge whenever it enters the frame
#[derive(Debug, Clone)]
pub struct WarpDispatcher {
    detector: EdgeDetector,
}

impl WarpDispatcher {
    pub fn new(detector: EdgeDetector) -> Self {
        Self { detector }
    }

    /// Handle one event. Returns the warp target, if a warp was issued.
    pub fn dispatch<B: DisplayBackend>(
        &self,
        backend: &B,
        event: &DisplayEvent,
    ) -> DisplayResult<Option<Point>> {
        match event {
            DisplayEvent::PointerEntry(entry) => self.on_entry(backend, entry),
            DisplayEvent::ProtocolError(message) => {
                warn!("X11 error: {}", message);
                Ok(None)
            }
            DisplayEvent::Other => Ok(None),
        }
    }

    fn on_entry<B: DisplayBackend>(
        &self,
        backend: &B,
        entry: &PointerEntry,
    ) -> DisplayResult<Option<Point>> {
        let PointerEntry { window, position } = *entry;
        debug!("Entry: {}, {} on {:#x}", position.x, position.y, window);

        match self.detector.check(position.x, position.y) {
            EdgeDetectResult::Wrap { edge, target } => {
                backend.warp_pointer(target)?;
                backend.flush()?;
                debug!(
                    "Warp: ({}, {}) to ({}, {}), {} edge to {} edge",
                    position.x,
                    position.y,
                    target.x,
                    target.y,
                    edge,
                    edge.opposite()
                );
                Ok(Some(target))
            }
            EdgeDetectResult::NotAtEdge => {
                trace!("Entry ({}, {}) is not on an edge", position.x, position.y);
                Ok(None)
            }
        }
    }

    /// Handle every event already queued on the connection
    pub fn drain<B: DisplayBackend>(&self, backend: &B) -> DisplayResult<usize> {
        let mut handled = 0;
        while let Some(event) = backend.poll_event()? {
            self.dispatch(backend, &event)?;
            handled += 1;
        }
        Ok(handled)
    }
}

/// Process events until `shutdown` resolves or the connection fails.
///
/// Queued events are always handled to completion before the loop waits
/// again, so a shutdown never interrupts a warp.
pub async fn run<B, F>(
    backend: &B,
    dispatcher: &WarpDispatcher,
    shutdown: F,
) -> DisplayResult<ShutdownSignal>
where
    B: DisplayBackend,
    F: Future<Output = ShutdownSignal>,
{
    let events = AsyncFd::with_interest(backend.event_fd(), Interest::READABLE)?;
    tokio::pin!(shutdown);

    loop {
        dispatcher.drain(backend)?;

        tokio::select! {
            biased;

            signal = &mut shutdown => {
                debug!("Event loop stopping on {}", signal);
                return Ok(signal);
            }
            ready = events.readable() => {
                ready?.clear_ready();
            }
        }
    }
}
