//! Scoped wall-clock deadlines.
//!
//! A [`Deadline`] is created per conversion attempt and passed explicitly
//! to the work it bounds. There is no shared timer state between calls.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

/// Returned when bounded work does not finish before its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline of {}s exceeded", budget.as_secs_f64())]
pub struct DeadlineExceeded {
    /// The budget that was exceeded.
    pub budget: Duration,
}

/// A single-shot deadline starting at construction.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    expires_at: Instant,
    budget: Duration,
}

impl Deadline {
    /// Start a deadline that expires `budget` from now.
    pub fn after(budget: Duration) -> Self {
        let started = Instant::now();
        Self {
            started,
            expires_at: started + budget,
            budget,
        }
    }

    /// Start a deadline of `seconds` whole seconds.
    pub fn after_secs(seconds: u64) -> Self {
        Self::after(Duration::from_secs(seconds))
    }

    /// The total budget.
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Time spent since the deadline started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time left before expiry; zero once expired.
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// Whether the deadline has passed.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Drive `fut` to completion or until the deadline passes.
    ///
    /// On expiry `fut` is dropped, which cancels it at its next await point.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, DeadlineExceeded> {
        tokio::time::timeout_at(self.expires_at, fut)
            .await
            .map_err(|_| DeadlineExceeded {
                budget: self.budget,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_expires_after_budget() {
        let deadline = Deadline::after_secs(30);
        assert!(!deadline.is_expired());
        assert_eq!(deadline.remaining(), Duration::from_secs(30));

        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(deadline.is_expired());
        assert_eq!(deadline.remaining(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_times_out_slow_future() {
        let deadline = Deadline::after_secs(30);
        let result = deadline
            .run(tokio::time::sleep(Duration::from_secs(60)))
            .await;
        assert_eq!(
            result,
            Err(DeadlineExceeded {
                budget: Duration::from_secs(30)
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_returns_fast_output() {
        let deadline = Deadline::after_secs(30);
        let value = deadline
            .run(async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                42
            })
            .await
            .expect("within budget");
        assert_eq!(value, 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadlines_are_independent() {
        let first = Deadline::after_secs(10);
        tokio::time::advance(Duration::from_secs(8)).await;
        let second = Deadline::after_secs(10);
        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(first.is_expired());
        assert!(!second.is_expired());
    }
}
