use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Auto-clear timer for a transient banner.
///
/// Arming replaces any pending timer: the previous task is aborted and its
/// generation retired, so a stale timer that already woke up cannot clear a
/// newer message. Callers check [`BannerTimer::is_current`] under the same
/// lock that guards the banner text.
#[derive(Debug, Default)]
pub(crate) struct BannerTimer {
    pending: Mutex<Option<JoinHandle<()>>>,
    generation: AtomicU64,
}

impl BannerTimer {
    /// Schedule `clear` after `after`; a zero duration only retires the
    /// previous timer and keeps the banner until something else clears it.
    pub(crate) fn arm<F>(&self, after: Duration, clear: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut pending = self.pending.lock().expect("banner timer mutex poisoned");
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        if !after.is_zero() {
            *pending = Some(tokio::spawn(async move {
                tokio::time::sleep(after).await;
                clear(generation);
            }));
        }
        generation
    }

    pub(crate) fn disarm(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut pending = self.pending.lock().expect("banner timer mutex poisoned");
        if let Some(previous) = pending.take() {
            previous.abort();
        }
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn rearming_cancels_the_previous_timer() {
        let timer = Arc::new(BannerTimer::default());
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = fired.clone();
        let first = timer.arm(Duration::from_millis(100), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let counter = fired.clone();
        let probe = timer.clone();
        let second = timer.arm(Duration::from_millis(100), move |generation| {
            if probe.is_current(generation) {
                counter.fetch_add(10, Ordering::SeqCst);
            }
        });
        assert!(!timer.is_current(first));
        assert!(timer.is_current(second));

        tokio::time::sleep(Duration::from_millis(75)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn disarm_retires_pending_generation() {
        let timer = BannerTimer::default();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let generation = timer.arm(Duration::from_millis(10), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        timer.disarm();
        assert!(!timer.is_current(generation));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
