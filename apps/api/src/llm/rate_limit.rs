//! Requests-per-minute ceiling shared by every LLM call of one crew run.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct Window {
    started: Instant,
    used: u32,
}

/// Fixed one-minute window limiter.
///
/// Once `max_rpm` calls have been admitted in the current window, the next
/// caller sleeps until the window ends and a fresh one starts.
#[derive(Debug)]
pub struct RpmLimiter {
    max_rpm: Option<u32>,
    window: Mutex<Window>,
}

impl RpmLimiter {
    /// `None` or `Some(0)` disables the limit.
    pub fn new(max_rpm: Option<u32>) -> Self {
        Self {
            max_rpm: max_rpm.filter(|rpm| *rpm > 0),
            window: Mutex::new(Window {
                started: Instant::now(),
                used: 0,
            }),
        }
    }

    pub fn max_rpm(&self) -> Option<u32> {
        self.max_rpm
    }

    /// Wait until a request may be sent. Returns how long the caller waited.
    pub async fn acquire(&self) -> Duration {
        let Some(max_rpm) = self.max_rpm else {
            return Duration::ZERO;
        };

        // Holding the lock across the sleep keeps waiters in arrival order.
        let mut window = self.window.lock().await;
        let now = Instant::now();
        if now.duration_since(window.started) >= WINDOW {
            window.started = now;
            window.used = 0;
        }

        let mut waited = Duration::ZERO;
        if window.used >= max_rpm {
            let resume_at = window.started + WINDOW;
            waited = resume_at.saturating_duration_since(now);
            tracing::info!(
                max_rpm,
                wait_secs = waited.as_secs(),
                "Max RPM reached, waiting for next minute to start"
            );
            tokio::time::sleep_until(resume_at).await;
            window.started = Instant::now();
            window.used = 0;
        }

        window.used += 1;
        waited
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn unlimited_never_waits() {
        let limiter = RpmLimiter::new(None);
        for _ in 0..100 {
            assert_eq!(limiter.acquire().await, Duration::ZERO);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn zero_means_unlimited() {
        let limiter = RpmLimiter::new(Some(0));
        assert_eq!(limiter.max_rpm(), None);
        assert_eq!(limiter.acquire().await, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn blocks_once_budget_is_spent() {
        let limiter = RpmLimiter::new(Some(2));
        let start = Instant::now();

        assert_eq!(limiter.acquire().await, Duration::ZERO);
        assert_eq!(limiter.acquire().await, Duration::ZERO);
        let waited = limiter.acquire().await;

        assert_eq!(waited, WINDOW);
        assert!(Instant::now().duration_since(start) >= WINDOW);
    }

    #[tokio::test(start_paused = true)]
    async fn window_resets_after_a_minute() {
        let limiter = RpmLimiter::new(Some(1));

        limiter.acquire().await;
        tokio::time::advance(Duration::from_secs(61)).await;

        assert_eq!(limiter.acquire().await, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn partial_window_waits_only_the_remainder() {
        let limiter = RpmLimiter::new(Some(1));

        limiter.acquire().await;
        tokio::time::advance(Duration::from_secs(45)).await;

        assert_eq!(limiter.acquire().await, Duration::from_secs(15));
    }
}
