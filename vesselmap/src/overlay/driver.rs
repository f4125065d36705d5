//! Async driver: one task owns the overlay, handles feed it.
//!
//! ```text
//! OverlayHandle ─┐
//! OverlayHandle ─┼─► mpsc (unbounded) ─► driver task ─► VesselOverlay::process()
//! OverlayHandle ─┘                        │
//!                                         └─ drains everything already queued
//!                                            before each batch (latest wins)
//! ```
//!
//! The task runs until [`OverlayDriver::shutdown`] or until every handle,
//! including the driver's own, is dropped. On exit it detaches the overlay.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{OverlayError, OverlayEvent, ProcessOutcome, VesselOverlay};
use crate::map::MapBackend;

type FlushReply = oneshot::Sender<Result<Option<ProcessOutcome>, OverlayError>>;

enum Command {
    Event(OverlayEvent),
    Flush(FlushReply),
    Shutdown,
}

/// Cloneable sender side of a running [`OverlayDriver`].
#[derive(Debug, Clone)]
pub struct OverlayHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl OverlayHandle {
    /// Queue a trigger. Fails only once the driver has stopped.
    pub fn send(&self, event: OverlayEvent) -> Result<(), OverlayError> {
        self.tx
            .send(Command::Event(event))
            .map_err(|_| OverlayError::DriverClosed)
    }

    /// Wait until every trigger sent before this call has been applied.
    ///
    /// Returns the outcome of the most recent batch, or its error if it
    /// failed.
    pub async fn flush(&self) -> Result<Option<ProcessOutcome>, OverlayError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Flush(reply))
            .map_err(|_| OverlayError::DriverClosed)?;
        rx.await.map_err(|_| OverlayError::DriverClosed)?
    }

    /// Whether the driver task is still accepting commands.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Event(event) => f.debug_tuple("Event").field(event).finish(),
            Command::Flush(_) => f.write_str("Flush"),
            Command::Shutdown => f.write_str("Shutdown"),
        }
    }
}

/// A spawned task owning one [`VesselOverlay`].
pub struct OverlayDriver<M: MapBackend> {
    handle: OverlayHandle,
    task: JoinHandle<(VesselOverlay<M>, Result<(), OverlayError>)>,
}

impl<M> OverlayDriver<M>
where
    M: MapBackend + Send + 'static,
{
    /// Move an attached overlay into a new task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(overlay: VesselOverlay<M>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(overlay, rx));
        Self {
            handle: OverlayHandle { tx },
            task,
        }
    }

    /// A new handle to this driver.
    pub fn handle(&self) -> OverlayHandle {
        self.handle.clone()
    }

    /// Queue a trigger through the driver's own handle.
    pub fn send(&self, event: OverlayEvent) -> Result<(), OverlayError> {
        self.handle.send(event)
    }

    /// Wait for queued triggers to be applied.
    pub async fn flush(&self) -> Result<Option<ProcessOutcome>, OverlayError> {
        self.handle.flush().await
    }

    /// Apply what is queued, detach, and hand the overlay back.
    pub async fn shutdown(self) -> Result<VesselOverlay<M>, OverlayError> {
        // A closed channel means the task is already on its way out.
        let _ = self.handle.tx.send(Command::Shutdown);
        let (overlay, detached) = self
            .task
            .await
            .map_err(|e| OverlayError::DriverFailed(e.to_string()))?;
        detached?;
        Ok(overlay)
    }
}

async fn run<M: MapBackend>(
    mut overlay: VesselOverlay<M>,
    mut rx: mpsc::UnboundedReceiver<Command>,
) -> (VesselOverlay<M>, Result<(), OverlayError>) {
    debug!("Overlay driver started");

    // The latest batch result; an error stays visible until a later batch runs.
    let mut last: Result<Option<ProcessOutcome>, OverlayError> = Ok(None);
    let mut stopping = false;

    while let Some(first) = rx.recv().await {
        let mut waiters = Vec::new();
        let mut next = Some(first);
        while let Some(command) = next {
            match command {
                Command::Event(event) => overlay.submit(event),
                Command::Flush(reply) => waiters.push(reply),
                Command::Shutdown => stopping = true,
            }
            next = rx.try_recv().ok();
        }

        match overlay.process() {
            Ok(Some(outcome)) => last = Ok(Some(outcome)),
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Overlay batch failed");
                last = Err(e);
            }
        }

        for reply in waiters {
            // The waiter may have given up; nothing to do then.
            let _ = reply.send(last.clone());
        }

        if stopping {
            break;
        }
    }

    let detached = overlay.detach();
    if let Err(e) = &detached {
        warn!(error = %e, "Overlay detach failed");
    }
    debug!(revision = overlay.revision(), "Overlay driver stopped");
    (overlay, detached)
}
