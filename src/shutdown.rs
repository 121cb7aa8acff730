//! Shutdown signals
//!
//! SIGINT, SIGTERM and SIGHUP all request the same orderly teardown.
//!
//! The handlers need a runtime, which only exists after the overlay is up
//! and the process has detached. [`block`] holds the signals pending from
//! window creation until [`Signals::register`] is ready for them.

use std::fmt;

use nix::sys::signal::{self as sig, SigSet};
use tokio::signal::unix::{signal, Signal, SignalKind};

fn shutdown_set() -> SigSet {
    let mut set = SigSet::empty();
    set.add(sig::Signal::SIGINT);
    set.add(sig::Signal::SIGTERM);
    set.add(sig::Signal::SIGHUP);
    set
}

/// Block the shutdown signals on the calling thread, leaving them pending
pub fn block() -> nix::Result<()> {
    shutdown_set().thread_block()
}

/// The signal that requested shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
    Hangup,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShutdownSignal::Interrupt => "SIGINT",
            ShutdownSignal::Terminate => "SIGTERM",
            ShutdownSignal::Hangup => "SIGHUP",
        })
    }
}

/// Registered handlers for the shutdown signals
pub struct Signals {
    interrupt: Signal,
    terminate: Signal,
    hangup: Signal,
}

impl Signals {
    /// Install the handlers and unblock the signals, delivering any that
    /// arrived while blocked. Must be called inside a tokio runtime.
    pub fn register() -> std::io::Result<Self> {
        let signals = Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
        };
        shutdown_set().thread_unblock()?;
        Ok(signals)
    }

    /// Wait for the first of the shutdown signals
    pub async fn recv(&mut self) -> ShutdownSignal {
        tokio::select! {
            _ = self.interrupt.recv() => ShutdownSignal::Interrupt,
            _ = self.terminate.recv() => ShutdownSignal::Terminate,
            _ = self.hangup.recv() => ShutdownSignal::Hangup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_names() {
        assert_eq!(ShutdownSignal::Interrupt.to_string(), "SIGINT");
        assert_eq!(ShutdownSignal::Hangup.to_string(), "SIGHUP");
    }

    #[test]
    fn test_hangup_is_delivered() {
        tokio_test::block_on(async {
            let mut signals = Signals::register().unwrap();
            sig::raise(sig::Signal::SIGHUP).unwrap();
            assert_eq!(signals.recv().await, ShutdownSignal::Hangup);
        });
    }

    #[test]
    fn test_signal_before_register_is_not_lost() {
        block().unwrap();
        sig::raise(sig::Signal::SIGTERM).unwrap();

        // Still blocked, so the signal is held rather than killing the test.
        let mask = SigSet::thread_get_mask().unwrap();
        assert!(mask.contains(sig::Signal::SIGTERM));

        tokio_test::block_on(async {
            let mut signals = Signals::register().unwrap();
            assert_eq!(signals.recv().await, ShutdownSignal::Terminate);
        });
    }
}
