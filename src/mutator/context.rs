//! Cancellation context passed to mutators.

use tokio::sync::watch;

/// Carries the cancellation signal of one mutation run.
///
/// Cheap to clone; every clone observes the same signal. Mutators check it
/// before fetching a source document and race it against the fetch itself.
#[derive(Debug, Clone)]
pub struct MutationContext {
    cancel: watch::Receiver<bool>,
}

/// Triggers cancellation of the contexts it created.
///
/// Dropping the handle does not cancel.
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl MutationContext {
    /// Create a cancellable context and its handle.
    pub fn new() -> (Self, CancelHandle) {
        let (sender, cancel) = watch::channel(false);
        (
            Self {
                cancel,
            },
            CancelHandle {
                sender,
            },
        )
    }

    /// A context that is never cancelled.
    pub fn background() -> Self {
        let (_, cancel) = watch::channel(false);
        Self {
            cancel,
        }
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Completes once cancellation is requested; never for a background context.
    pub async fn cancelled(&self) {
        let mut cancel = self.cancel.clone();
        loop {
            if *cancel.borrow_and_update() {
                return;
            }
            if cancel.changed().await.is_err() {
                // Handle dropped without cancelling
                std::future::pending::<()>().await;
            }
        }
    }
}

impl Default for MutationContext {
    fn default() -> Self {
        Self::background()
    }
}

impl CancelHandle {
    /// Request cancellation.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    /// Another context observing this handle.
    pub fn context(&self) -> MutationContext {
        MutationContext {
            cancel: self.sender.subscribe(),
        }
    }
}
