//! Trailing-edge call coalescing
//!
//! A [`Debouncer`] collects calls and runs its handler once the calls have
//! been quiet for a full window, with the arguments of the last call. Bursts
//! of keystrokes therefore cost one stats transaction and one repaint per
//! window instead of one per key.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Coalesces calls within a sliding time window
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn the coalescing task. Must be called inside a tokio runtime.
    ///
    /// When the debouncer is dropped, a pending value is still delivered.
    pub fn new<F, Fut>(window: Duration, mut handler: F) -> Self
    where
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();

        let task = tokio::spawn(async move {
            while let Some(first) = rx.recv().await {
                let mut latest = first;
                let mut closed = false;

                loop {
                    match tokio::time::timeout(window, rx.recv()).await {
                        Ok(Some(next)) => latest = next,
                        Ok(None) => {
                            closed = true;
                            break;
                        }
                        Err(_) => break,
                    }
                }

                handler(latest).await;
                if closed {
                    break;
                }
            }
        });

        Self { tx, task }
    }

    /// Schedule the handler with `value`, replacing any pending value
    pub fn call(&self, value: T) {
        if self.tx.send(value).is_err() {
            tracing::debug!("Debouncer task has stopped, dropping call");
        }
    }

    /// Stop accepting calls and wait for the pending value (if any) to be handled
    pub async fn shutdown(self) {
        let Self { tx, task } = self;
        drop(tx);
        if let Err(e) = task.await {
            tracing::warn!(error = %e, "Debounced handler task failed");
        }
    }
}
