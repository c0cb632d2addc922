//! Cooperative cancellation for strategy loops
//!
//! The orchestrator owns a `broadcast::Sender<()>` and hands every loop a
//! subscribed receiver wrapped in [`ShutdownSignal`]. Loops route each
//! suspension point (sleeps and gateway calls) through [`ShutdownSignal::guard`]
//! so a broadcast stops them at the next await.

use std::future::Future;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

/// Receiving end of the session shutdown broadcast
///
/// Once observed, the request is latched. A closed or lagged channel counts
/// as a request.
#[derive(Debug)]
pub struct ShutdownSignal {
    rx: broadcast::Receiver<()>,
    requested: bool,
    /// Sender kept alive by [`ShutdownSignal::never`]
    _keepalive: Option<broadcast::Sender<()>>,
}

impl ShutdownSignal {
    pub fn new(rx: broadcast::Receiver<()>) -> Self {
        Self {
            rx,
            requested: false,
            _keepalive: None,
        }
    }

    /// A signal nobody can fire, for loops run outside an orchestrator
    pub fn never() -> Self {
        let (tx, rx) = broadcast::channel(1);
        Self {
            rx,
            requested: false,
            _keepalive: Some(tx),
        }
    }

    /// Non-blocking check
    pub fn is_requested(&mut self) -> bool {
        if !self.requested {
            match self.rx.try_recv() {
                Err(TryRecvError::Empty) => {}
                Ok(()) | Err(TryRecvError::Closed) | Err(TryRecvError::Lagged(_)) => {
                    self.requested = true;
                }
            }
        }
        self.requested
    }

    /// Drive `fut` to completion unless shutdown is requested first
    pub async fn guard<F: Future>(&mut self, fut: F) -> Option<F::Output> {
        if self.is_requested() {
            return None;
        }
        let out = tokio::select! {
            biased;
            _ = self.rx.recv() => None,
            out = fut => Some(out),
        };
        if out.is_none() {
            self.requested = true;
        }
        out
    }

    /// Sleep for `duration`; false if interrupted by shutdown
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        self.guard(tokio::time::sleep(duration)).await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_never_fires() {
        let mut signal = ShutdownSignal::never();
        assert!(signal.sleep(Duration::from_secs(60)).await);
        assert!(!signal.is_requested());
    }

    #[tokio::test(start_paused = true)]
    async fn test_broadcast_interrupts_sleep() {
        let (tx, _) = broadcast::channel(4);
        let mut signal = ShutdownSignal::new(tx.subscribe());

        let sender = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            tx.send(()).ok();
            tx
        });

        let started = tokio::time::Instant::now();
        assert!(!signal.sleep(Duration::from_secs(60)).await);
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(signal.is_requested());

        // Latched: later guards short-circuit
        assert_eq!(signal.guard(async { 7 }).await, None);
        sender.await.unwrap();
    }

    #[tokio::test]
    async fn test_dropped_sender_counts_as_shutdown() {
        let (tx, rx) = broadcast::channel::<()>(1);
        let mut signal = ShutdownSignal::new(rx);
        assert!(!signal.is_requested());

        drop(tx);
        assert!(signal.is_requested());
    }
}
