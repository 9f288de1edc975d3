use std::fmt;
use std::io::Write;
use std::time::Duration;

use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::warn;

/// Which termination signal ended the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownSignal::Interrupt => write!(f, "SIGINT"),
            ShutdownSignal::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Hard upper bound on process lifetime. Runs on its own OS thread and never
/// touches any service state: its only action is terminating the whole
/// process, so no synchronization with the dispatch loop is needed. If the
/// graceful signal path wins the race, process exit tears this thread down
/// with everything else.
pub fn arm_watchdog(timeout: Duration) {
    std::thread::spawn(move || {
        std::thread::sleep(timeout);
        warn!(timeout_secs = timeout.as_secs(), "watchdog expired, forcing exit");
        println!("Mock player timeout reached, exiting");
        let _ = std::io::stdout().flush();
        // Forced exit: no cleanup beyond what already hit stdout.
        std::process::exit(0);
    });
}

/// Graceful-shutdown half of the lifetime guard.
///
/// [`install`](Self::install) replaces the default signal dispositions the
/// moment it is called, so SIGINT/SIGTERM landing while the bus connection is
/// still being set up already take the graceful path instead of killing the
/// process. tokio buffers signals received before [`recv`](Self::recv) is
/// awaited.
pub struct ShutdownListener {
    interrupt: Signal,
    terminate: Signal,
}

impl ShutdownListener {
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// Resolves on the first of SIGINT/SIGTERM, including any that arrived
    /// since [`install`](Self::install).
    pub async fn recv(&mut self) -> ShutdownSignal {
        tokio::select! {
            _ = self.interrupt.recv() => ShutdownSignal::Interrupt,
            _ = self.terminate.recv() => ShutdownSignal::Terminate,
        }
    }
}
