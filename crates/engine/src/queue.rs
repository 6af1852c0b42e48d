//! Ordered work list for the dispatch loop

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Notify;

/// FIFO queue with a jump-ahead lane for retries
///
/// Any number of producers, one consumer. [`RequestQueue::dequeue`] suspends
/// until work arrives or the poll interval elapses.
pub struct RequestQueue<T> {
    items: Mutex<VecDeque<T>>,
    available: Notify,
}

impl<T> RequestQueue<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            available: Notify::new(),
        }
    }

    /// Normal submission
    pub fn enqueue_back(&self, item: T) {
        self.items.lock().push_back(item);
        self.available.notify_one();
    }

    /// Retry: goes ahead of everything already waiting
    pub fn enqueue_front(&self, item: T) {
        self.items.lock().push_front(item);
        self.available.notify_one();
    }

    pub fn try_dequeue(&self) -> Option<T> {
        self.items.lock().pop_front()
    }

    /// Next item, waiting at most `poll` for one to show up
    pub async fn dequeue(&self, poll: Duration) -> Option<T> {
        if let Some(item) = self.try_dequeue() {
            return Some(item);
        }
        let _ = tokio::time::timeout(poll, self.available.notified()).await;
        self.try_dequeue()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Remove and return everything still queued
    pub fn drain(&self) -> Vec<T> {
        self.items.lock().drain(..).collect()
    }

    pub fn snapshot(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.lock().iter().cloned().collect()
    }
}

impl<T> Default for RequestQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const POLL: Duration = Duration::from_millis(250);

    #[test]
    fn test_fifo_with_front_lane() {
        let queue = RequestQueue::new();
        queue.enqueue_back(1);
        queue.enqueue_back(2);
        queue.enqueue_front(0);

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.snapshot(), vec![0, 1, 2]);
        assert_eq!(queue.try_dequeue(), Some(0));
        assert_eq!(queue.drain(), vec![1, 2]);
        assert!(queue.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dequeue_polls_empty_queue() {
        let queue: RequestQueue<u32> = RequestQueue::new();
        let start = tokio::time::Instant::now();
        assert_eq!(queue.dequeue(POLL).await, None);
        assert!(start.elapsed() >= POLL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dequeue_wakes_on_enqueue() {
        let queue = Arc::new(RequestQueue::new());
        let consumer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.dequeue(Duration::from_secs(60)).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        queue.enqueue_back("work");

        assert_eq!(consumer.await.unwrap(), Some("work"));
    }
}
