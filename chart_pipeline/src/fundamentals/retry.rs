use std::{future, num::NonZeroU32, time::Duration};

use tokio::{sync::watch, time::Instant};

/// How often and how patiently a transient snapshot failure is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Wait between a failed attempt and the next one.
    pub backoff: Duration,
    /// `None` retries until cancelled.
    pub max_attempts: Option<NonZeroU32>,
}

impl RetryPolicy {
    pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(10);
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

    /// True once `attempts` requests have been made and no more are allowed.
    pub fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max.get())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff: Self::DEFAULT_BACKOFF,
            max_attempts: NonZeroU32::new(Self::DEFAULT_MAX_ATTEMPTS),
        }
    }
}

/// Caller-side stop condition for a fetch: a deadline, an external signal,
/// both or neither.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    deadline: Option<Instant>,
    signal: Option<watch::Receiver<bool>>,
}

/// Trips the [`Cancellation`] it was created with.
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

impl Cancellation {
    /// Never cancels.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            signal: None,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A signal-driven cancellation and the handle that trips it.
    pub fn pair() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        let cancellation = Self {
            deadline: None,
            signal: Some(rx),
        };
        (cancellation, CancelHandle(tx))
    }

    /// Adds (or tightens) a deadline.
    pub fn and_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        let expired = self.deadline.is_some_and(|d| Instant::now() >= d);
        let signalled = self.signal.as_ref().is_some_and(|rx| *rx.borrow());
        expired || signalled
    }

    /// Resolves once the deadline passes or the signal fires. Never resolves
    /// for [`Cancellation::none`] or once the handle is dropped untripped.
    pub async fn cancelled(&self) {
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => future::pending::<()>().await,
            }
        };
        let signal = async {
            let Some(rx) = &self.signal else {
                return future::pending::<()>().await;
            };
            let mut rx = rx.clone();
            let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
            if closed {
                future::pending::<()>().await;
            }
        };

        tokio::select! {
            _ = deadline => {}
            _ = signal => {}
        }
    }
}
