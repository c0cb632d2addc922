use parking_lot::Mutex;
use std::sync::Arc;

/// Session-wide count of orders placed by strategy loops
///
/// Clones share the same count. Increments are serialized by a mutex and the
/// value never decreases.
#[derive(Debug, Clone, Default)]
pub struct TradeCounter {
    count: Arc<Mutex<u64>>,
}

impl TradeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one trade and return the new total
    pub fn increment(&self) -> u64 {
        let mut count = self.count.lock();
        *count += 1;
        *count
    }

    pub fn get(&self) -> u64 {
        *self.count.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_count() {
        let counter = TradeCounter::new();
        let other = counter.clone();

        assert_eq!(counter.increment(), 1);
        assert_eq!(other.increment(), 2);
        assert_eq!(counter.get(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments() {
        const TASKS: u64 = 8;
        const PER_TASK: u64 = 1_000;

        let counter = TradeCounter::new();
        let handles: Vec<_> = (0..TASKS)
            .map(|_| {
                let counter = counter.clone();
                tokio::spawn(async move {
                    for _ in 0..PER_TASK {
                        counter.increment();
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(counter.get(), TASKS * PER_TASK);
    }
}
