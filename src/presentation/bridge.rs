// PresentationBridge - serial queue in front of the presentation thread
//
// All display state lives on one thread. Everything else (enrichment workers,
// the account registry, the controller) talks to it by queueing closures:
// - dispatch() from any thread, never blocks on the presentation thread
// - closures run one at a time, in the order they were queued
// - shutdown() drains the queue, joins the thread and hands back the state

use anyhow::{Context, Result, anyhow};
use std::thread::JoinHandle;
use tokio::sync::{mpsc, oneshot};

type Job<T> = Box<dyn FnOnce(&mut T) + Send>;

enum Message<T> {
    Run(Job<T>),
    Shutdown,
}

/// Runs work without handing out the state it runs against.
///
/// Implemented by [`PresentationHandle`] so components like the account
/// listener registry can marshal callbacks onto the presentation thread
/// without knowing what that thread owns.
pub trait SerialExecutor: Send + Sync {
    fn execute(&self, job: Box<dyn FnOnce() + Send>);
}

/// Owns the presentation thread and its state `T`.
///
/// # Example
/// ```ignore
/// let bridge = PresentationBridge::spawn(ModsView::new(inventory))?;
/// let handle = bridge.handle();
///
/// // From a worker
/// handle.dispatch(move |view| view.apply_update(update));
///
/// let view = bridge.shutdown()?;
/// ```
pub struct PresentationBridge<T: Send + 'static> {
    tx: mpsc::UnboundedSender<Message<T>>,
    thread: Option<JoinHandle<T>>,
}

impl<T: Send + 'static> PresentationBridge<T> {
    /// Start the presentation thread with `state` as its initial state.
    ///
    /// The queue is unbounded: enrichment results must never be dropped, and
    /// one pass produces at most one message per mod file.
    pub fn spawn(state: T) -> Result<Self> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Message<T>>();

        let thread = std::thread::Builder::new()
            .name("presentation".to_string())
            .spawn(move || {
                tracing::debug!("Presentation thread started");
                let mut state = state;

                while let Some(message) = rx.blocking_recv() {
                    match message {
                        Message::Run(job) => job(&mut state),
                        Message::Shutdown => break,
                    }
                }

                tracing::debug!("Presentation thread terminated");
                state
            })
            .context("Failed to spawn presentation thread")?;

        Ok(Self {
            tx,
            thread: Some(thread),
        })
    }

    /// Queue `job` to run on the presentation thread.
    pub fn dispatch<F>(&self, job: F)
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        send(&self.tx, job);
    }

    /// Cloneable handle for other threads and tasks
    pub fn handle(&self) -> PresentationHandle<T> {
        PresentationHandle { tx: self.tx.clone() }
    }

    /// Run everything queued so far, stop the thread and return its state.
    ///
    /// Jobs dispatched through outstanding handles after this point are
    /// dropped with a warning.
    pub fn shutdown(mut self) -> Result<T> {
        // A closed channel means the thread is already gone; join reports why
        let _ = self.tx.send(Message::Shutdown);

        let thread = self
            .thread
            .take()
            .ok_or_else(|| anyhow!("Presentation thread already joined"))?;

        thread
            .join()
            .map_err(|_| anyhow!("Presentation thread panicked"))
    }
}

impl<T: Send + 'static> Drop for PresentationBridge<T> {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.tx.send(Message::Shutdown);
            if thread.join().is_err() {
                tracing::error!("Presentation thread panicked during shutdown");
            }
        }
    }
}

/// Lightweight, cloneable sender side of a [`PresentationBridge`].
pub struct PresentationHandle<T> {
    tx: mpsc::UnboundedSender<Message<T>>,
}

// Manual Clone implementation to avoid requiring T: Clone
impl<T> Clone for PresentationHandle<T> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<T: Send + 'static> PresentationHandle<T> {
    /// See [`PresentationBridge::dispatch`].
    pub fn dispatch<F>(&self, job: F)
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        send(&self.tx, job);
    }

    /// Run `f` on the presentation thread and wait for its result.
    ///
    /// Returns `None` if the thread stopped before running it.
    pub async fn query<R, F>(&self, f: F) -> Option<R>
    where
        R: Send + 'static,
        F: FnOnce(&T) -> R + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.dispatch(move |state| {
            let _ = reply_tx.send(f(state));
        });
        reply_rx.await.ok()
    }

    /// Whether the presentation thread is still accepting work
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

impl<T: Send + 'static> SerialExecutor for PresentationHandle<T> {
    fn execute(&self, job: Box<dyn FnOnce() + Send>) {
        self.dispatch(move |_| job());
    }
}

fn send<T, F>(tx: &mpsc::UnboundedSender<Message<T>>, job: F)
where
    F: FnOnce(&mut T) + Send + 'static,
{
    if tx.send(Message::Run(Box::new(job))).is_err() {
        tracing::warn!("Failed to dispatch to presentation thread - it has stopped");
    }
}
