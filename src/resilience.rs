//! Retry and circuit-breaker decorators shared by the artifact uploader and
//! the notification sink. Both are ordinary higher-order wrappers around a
//! call site, not part of the domain model.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use backoff::ExponentialBackoffBuilder;

/// Runs `operation` under exponential backoff with jitter. `classify` turns
/// each error into a `backoff::Error`, deciding whether it's worth retrying.
pub async fn retry<T, E, F, Fut, C>(
    max_elapsed: Duration,
    initial_interval: Duration,
    mut operation: F,
    classify: C,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    C: Fn(E) -> backoff::Error<E>,
{
    let policy = ExponentialBackoffBuilder::new()
        .with_initial_interval(initial_interval)
        .with_max_elapsed_time(Some(max_elapsed))
        .build();

    backoff::future::retry(policy, || async { operation().await.map_err(&classify) }).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Closed,
    Open,
    HalfOpen,
}

struct Inner {
    state: State,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

#[derive(Debug, thiserror::Error)]
#[error("circuit is open; dependency calls are short-circuited")]
pub struct CircuitOpen;

/// Closed/open/half-open state machine, one instance per external
/// dependency (uploads, mail). Guarded by a plain `Mutex` since transitions
/// are cheap and never held across an `.await`.
pub struct CircuitBreaker {
    inner: Mutex<Inner>,
    threshold_failures: u32,
    cool_off: Duration,
}

impl CircuitBreaker {
    pub fn new(
        threshold_failures: u32,
        cool_off: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner { state: State::Closed, consecutive_failures: 0, opened_at: None }),
            threshold_failures,
            cool_off,
        })
    }

    fn before_call(&self) -> Result<(), CircuitOpen> {
        let mut inner = self.inner.lock().unwrap();
        match inner.state {
            State::Closed => Ok(()),
            State::HalfOpen => Ok(()),
            State::Open => {
                let opened_at = inner.opened_at.expect("open state always carries opened_at");
                if opened_at.elapsed() >= self.cool_off {
                    inner.state = State::HalfOpen;
                    Ok(())
                } else {
                    Err(CircuitOpen)
                }
            }
        }
    }

    fn on_success(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.state = State::Closed;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
    }

    fn on_failure(&self) {
        let mut inner = self.inner.lock().unwrap();
        match inner.state {
            State::HalfOpen => {
                inner.state = State::Open;
                inner.opened_at = Some(Instant::now());
            }
            State::Closed => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.threshold_failures {
                    inner.state = State::Open;
                    inner.opened_at = Some(Instant::now());
                }
            }
            State::Open => {}
        }
    }

    /// Wrap a single call: short-circuits while open, and otherwise records
    /// the outcome to drive the state machine.
    pub async fn call<T, E, F, Fut>(
        &self,
        operation: F,
    ) -> Result<T, CircuitCallError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        self.before_call().map_err(CircuitCallError::Open)?;
        match operation().await {
            Ok(value) => {
                self.on_success();
                Ok(value)
            }
            Err(e) => {
                self.on_failure();
                Err(CircuitCallError::Inner(e))
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CircuitCallError<E> {
    #[error(transparent)]
    Open(#[from] CircuitOpen),
    #[error(transparent)]
    Inner(E),
}
