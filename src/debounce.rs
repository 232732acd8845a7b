//! Debounced search input.
//! Each `on_input` restarts a quiet-period timer; only the value that survives
//! a full quiet period is delivered on the receiver.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Quiet period used for the links search box.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

pub struct Debouncer<T> {
    delay: Duration,
    tx: mpsc::UnboundedSender<T>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Must be called from within a tokio runtime.
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            delay,
            tx,
            pending: None,
        };
        (debouncer, rx)
    }

    pub fn on_input(&mut self, value: T) {
        self.cancel();
        let tx = self.tx.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means nobody is rendering anymore.
            let _ = tx.send(value);
        }));
    }

    /// Drops the pending value, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{Instant, timeout};

    #[tokio::test(start_paused = true)]
    async fn test_only_last_value_is_delivered() {
        let (mut debouncer, mut rx) = Debouncer::new(SEARCH_DEBOUNCE);
        let start = Instant::now();

        debouncer.on_input("g".to_string());
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.on_input("gi".to_string());
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.on_input("git".to_string());

        assert_eq!(rx.recv().await.as_deref(), Some("git"));
        assert!(start.elapsed() >= Duration::from_millis(500));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_before_quiet_period() {
        let (mut debouncer, mut rx) = Debouncer::new(SEARCH_DEBOUNCE);
        debouncer.on_input("hub");

        let early = timeout(Duration::from_millis(299), rx.recv()).await;
        assert!(early.is_err());
        assert!(debouncer.is_pending());

        assert_eq!(rx.recv().await, Some("hub"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_value() {
        let (mut debouncer, mut rx) = Debouncer::new(SEARCH_DEBOUNCE);
        debouncer.on_input(1);
        debouncer.cancel();
        assert!(!debouncer.is_pending());

        let result = timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_windows_each_deliver() {
        let (mut debouncer, mut rx) = Debouncer::new(SEARCH_DEBOUNCE);
        debouncer.on_input("a");
        assert_eq!(rx.recv().await, Some("a"));
        debouncer.on_input("b");
        assert_eq!(rx.recv().await, Some("b"));
    }
}
