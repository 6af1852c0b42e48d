//! Single-permit lock tying the dispatch loop to the reply it is waiting for

use relay_core::CorrelationToken;
use std::time::Duration;
use tokio::sync::watch;

/// Binary permit "one request is awaiting its callback"
///
/// The permit is held by the token of the request in flight. The dispatch
/// loop acquires it before invoking the venue; the callback router releases
/// it when the reply arrives; the loop expires it when the reply never comes.
pub struct CorrelationLock {
    holder: watch::Sender<Option<CorrelationToken>>,
}

impl CorrelationLock {
    pub fn new() -> Self {
        let (holder, _) = watch::channel(None);
        Self { holder }
    }

    /// Token currently holding the permit
    pub fn holder(&self) -> Option<CorrelationToken> {
        *self.holder.borrow()
    }

    pub fn is_held(&self) -> bool {
        self.holder().is_some()
    }

    /// Wait up to `timeout` for the permit to be free, then take it for `token`.
    ///
    /// # Panics
    ///
    /// Panics if `token` already holds the permit. A request acquiring twice
    /// means its previous dispatch was never released or expired.
    pub async fn try_acquire(&self, token: CorrelationToken, timeout: Duration) -> bool {
        if self.holder() == Some(token) {
            panic!("correlation permit acquired twice by {token}");
        }

        let mut rx = self.holder.subscribe();
        let acquire = async {
            loop {
                if rx.wait_for(Option::is_none).await.is_err() {
                    return false;
                }
                let taken = self.holder.send_if_modified(|holder| {
                    if holder.is_none() {
                        *holder = Some(token);
                        true
                    } else {
                        false
                    }
                });
                if taken {
                    return true;
                }
            }
        };

        tokio::time::timeout(timeout, acquire)
            .await
            .unwrap_or(false)
    }

    /// Release the permit held by `token`.
    ///
    /// Returns `false`, leaving the permit untouched, when `token` is not the holder.
    pub fn release(&self, token: CorrelationToken) -> bool {
        let released = self.clear_if_held(token);
        if !released {
            log::warn!(
                "Ignoring release by {token}: permit held by {:?}",
                self.holder().map(|t| t.to_string())
            );
        }
        released
    }

    /// Forcibly clear the permit after `token` timed out
    pub fn expire(&self, token: CorrelationToken) -> bool {
        let expired = self.clear_if_held(token);
        if expired {
            log::warn!("Correlation permit of {token} expired");
        }
        expired
    }

    /// Wait up to `timeout` for `token` to stop holding the permit
    pub async fn wait_released(&self, token: CorrelationToken, timeout: Duration) -> bool {
        let mut rx = self.holder.subscribe();
        match tokio::time::timeout(timeout, rx.wait_for(|holder| *holder != Some(token))).await {
            Ok(Ok(_)) => true,
            _ => false,
        }
    }

    fn clear_if_held(&self, token: CorrelationToken) -> bool {
        self.holder.send_if_modified(|holder| {
            if *holder == Some(token) {
                *holder = None;
                true
            } else {
                false
            }
        })
    }
}

impl Default for CorrelationLock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const WAIT: Duration = Duration::from_secs(30);

    #[tokio::test(start_paused = true)]
    async fn test_acquire_and_release() {
        let lock = CorrelationLock::new();
        let token = CorrelationToken::new();

        assert!(lock.try_acquire(token, WAIT).await);
        assert_eq!(lock.holder(), Some(token));
        assert!(lock.release(token));
        assert!(!lock.is_held());
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_times_out_while_held() {
        let lock = CorrelationLock::new();
        let first = CorrelationToken::new();
        let second = CorrelationToken::new();

        assert!(lock.try_acquire(first, WAIT).await);
        assert!(!lock.try_acquire(second, Duration::from_secs(1)).await);
        assert_eq!(lock.holder(), Some(first));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmatched_release_is_noop() {
        let lock = CorrelationLock::new();
        let holder = CorrelationToken::new();
        let stranger = CorrelationToken::new();

        assert!(!lock.release(stranger));

        assert!(lock.try_acquire(holder, WAIT).await);
        assert!(!lock.release(stranger));
        assert_eq!(lock.holder(), Some(holder));

        assert!(lock.release(holder));
        assert!(!lock.release(holder));
    }

    #[tokio::test(start_paused = true)]
    #[should_panic(expected = "acquired twice")]
    async fn test_double_acquire_panics() {
        let lock = CorrelationLock::new();
        let token = CorrelationToken::new();
        assert!(lock.try_acquire(token, WAIT).await);
        lock.try_acquire(token, WAIT).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_released_sees_release_from_other_task() {
        let lock = Arc::new(CorrelationLock::new());
        let token = CorrelationToken::new();
        assert!(lock.try_acquire(token, WAIT).await);

        let releaser = {
            let lock = lock.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(2)).await;
                lock.release(token)
            })
        };

        assert!(lock.wait_released(token, WAIT).await);
        assert!(releaser.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_released_times_out_then_expire() {
        let lock = CorrelationLock::new();
        let token = CorrelationToken::new();
        assert!(lock.try_acquire(token, WAIT).await);

        let start = tokio::time::Instant::now();
        assert!(!lock.wait_released(token, WAIT).await);
        assert!(start.elapsed() >= WAIT);

        assert!(lock.expire(token));
        assert!(!lock.is_held());
        assert!(lock.try_acquire(CorrelationToken::new(), WAIT).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiting_acquirer_gets_permit_after_release() {
        let lock = Arc::new(CorrelationLock::new());
        let first = CorrelationToken::new();
        let second = CorrelationToken::new();
        assert!(lock.try_acquire(first, WAIT).await);

        let waiter = {
            let lock = lock.clone();
            tokio::spawn(async move { lock.try_acquire(second, WAIT).await })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(lock.release(first));

        assert!(waiter.await.unwrap());
        assert_eq!(lock.holder(), Some(second));
    }
}
