//! Progress channel between a generation worker and its caller
//!
//! A run emits any number of [`ProgressMessage::Progress`] markers followed
//! by exactly one terminal message. The terminal methods on
//! [`ProgressSender`] take `self`, so nothing can be sent after them.
//!
//! The channel is bounded. Stage markers never block the worker: when the
//! buffer is nearly full they are dropped, and one slot is always left for
//! the terminal message.

use ledgerlens_domain::DocumentId;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Default wait used by callers polling for progress
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Messages buffered between the worker and a slow caller
pub const PROGRESS_CAPACITY: usize = 64;

/// One message from a generation run
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMessage {
    /// Stage marker
    Progress {
        /// Completion estimate in `[0, 1]`
        fraction: f32,
        /// Stage description
        text: String,
    },

    /// Terminal failure with a user-facing reason
    Error(String),

    /// Terminal success
    Complete {
        /// Path of the rendered graph artifact
        artifact_path: PathBuf,
        /// Status line
        text: String,
        /// Document that was processed
        document: DocumentId,
    },
}

impl ProgressMessage {
    /// True for the error and complete variants
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProgressMessage::Progress { .. })
    }
}

/// Result of polling the receiver
#[derive(Debug, Clone, PartialEq)]
pub enum PollResult {
    /// A message arrived
    Message(ProgressMessage),
    /// Nothing arrived within the wait; the run is still working
    Pending,
    /// The sender is gone and every message has been received
    Closed,
}

/// Create a connected sender/receiver pair
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::channel(PROGRESS_CAPACITY);
    (ProgressSender { tx }, ProgressReceiver { rx })
}

/// Sending half, owned by the worker
#[derive(Debug)]
pub struct ProgressSender {
    tx: mpsc::Sender<ProgressMessage>,
}

impl ProgressSender {
    fn finish(self, message: ProgressMessage) {
        // Stages leave a slot free, so this only fails once the receiver is gone
        if self.tx.try_send(message).is_err() {
            debug!("Progress receiver dropped");
        }
    }

    /// Report a stage
    pub fn progress(&self, fraction: f32, text: impl Into<String>) {
        send_stage(&self.tx, stage(fraction, text));
    }

    /// A cloneable handle that can report stages but never finish the run
    pub fn stages(&self) -> StageSender {
        StageSender {
            tx: self.tx.clone(),
        }
    }

    /// Finish with an error
    pub fn error(self, text: impl Into<String>) {
        self.finish(ProgressMessage::Error(text.into()));
    }

    /// Finish successfully
    pub fn complete(self, artifact_path: PathBuf, text: impl Into<String>, document: DocumentId) {
        self.finish(ProgressMessage::Complete {
            artifact_path,
            text: text.into(),
            document,
        });
    }
}

/// Stage-only sending half, for code that runs inside the worker
#[derive(Debug, Clone)]
pub struct StageSender {
    tx: mpsc::Sender<ProgressMessage>,
}

impl StageSender {
    /// Report a stage
    pub fn progress(&self, fraction: f32, text: impl Into<String>) {
        send_stage(&self.tx, stage(fraction, text));
    }
}

fn send_stage(tx: &mpsc::Sender<ProgressMessage>, message: ProgressMessage) {
    if tx.is_closed() {
        debug!("Progress receiver dropped");
    } else if tx.capacity() > 1 {
        let _ = tx.try_send(message);
    } else {
        debug!("Progress buffer full, stage marker dropped");
    }
}

fn stage(fraction: f32, text: impl Into<String>) -> ProgressMessage {
    ProgressMessage::Progress {
        fraction: fraction.clamp(0.0, 1.0),
        text: text.into(),
    }
}

/// Receiving half, owned by the caller
#[derive(Debug)]
pub struct ProgressReceiver {
    rx: mpsc::Receiver<ProgressMessage>,
}

impl ProgressReceiver {
    /// Wait up to `wait` for the next message
    pub async fn poll(&mut self, wait: Duration) -> PollResult {
        match tokio::time::timeout(wait, self.rx.recv()).await {
            Ok(Some(message)) => PollResult::Message(message),
            Ok(None) => PollResult::Closed,
            Err(_) => PollResult::Pending,
        }
    }

    /// Wait for the next message, or `None` once the channel is closed
    pub async fn recv(&mut self) -> Option<ProgressMessage> {
        self.rx.recv().await
    }

    /// Drain until the terminal message, calling `on_progress` for each stage.
    ///
    /// Returns `None` if the worker vanished without a terminal message.
    pub async fn wait_for_terminal<F>(&mut self, on_progress: F) -> Option<ProgressMessage>
    where
        F: FnMut(f32, &str),
    {
        self.wait_with_heartbeat(on_progress, || {}).await
    }

    /// Like [`wait_for_terminal`](Self::wait_for_terminal), also calling
    /// `on_pending` after every [`POLL_INTERVAL`] that brought nothing.
    pub async fn wait_with_heartbeat<F, P>(
        &mut self,
        mut on_progress: F,
        mut on_pending: P,
    ) -> Option<ProgressMessage>
    where
        F: FnMut(f32, &str),
        P: FnMut(),
    {
        loop {
            match self.poll(POLL_INTERVAL).await {
                PollResult::Message(ProgressMessage::Progress { fraction, text }) => {
                    on_progress(fraction, &text)
                }
                PollResult::Message(terminal) => return Some(terminal),
                PollResult::Pending => on_pending(),
                PollResult::Closed => return None,
            }
        }
    }
}
