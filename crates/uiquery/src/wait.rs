//! Bounded polling for eventually-consistent UI state.
//!
//! Every wait blocks the calling thread. Timing is measured on an elapsed-time
//! clock, so a slow predicate cannot extend the timeout and a fast one still
//! sleeps `poll_interval` between attempts. The last sleep is shortened to end
//! on the timeout boundary, after which the predicate runs one final time.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

/// Polls `producer` until it yields `Some`, or `timeout` elapses.
///
/// Errors from `producer` propagate immediately and are not retried.
pub fn wait_for_some<T, E, F>(
    mut producer: F,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<Option<T>, E>
where
    F: FnMut() -> Result<Option<T>, E>,
{
    let start = Instant::now();
    let mut attempts: u32 = 0;
    loop {
        attempts += 1;
        if let Some(found) = producer()? {
            trace!("Wait satisfied after {} attempt(s) in {:?}", attempts, start.elapsed());
            return Ok(Some(found));
        }
        let elapsed = start.elapsed();
        if elapsed >= timeout {
            debug!(
                "Wait timed out after {:?} ({} attempt(s), timeout {:?})",
                elapsed, attempts, timeout
            );
            return Ok(None);
        }
        thread::sleep(poll_interval.min(timeout - elapsed));
    }
}

/// Polls a fallible predicate; its first error propagates
pub fn try_wait_until<E, F>(mut predicate: F, timeout: Duration, poll_interval: Duration) -> Result<bool, E>
where
    F: FnMut() -> Result<bool, E>,
{
    wait_for_some(
        || predicate().map(|ok| ok.then_some(())),
        timeout,
        poll_interval,
    )
    .map(|found| found.is_some())
}

/// Returns true as soon as `predicate` holds, false once `timeout` elapses
pub fn wait_until<F>(mut predicate: F, timeout: Duration, poll_interval: Duration) -> bool
where
    F: FnMut() -> bool,
{
    let result: Result<bool, std::convert::Infallible> =
        try_wait_until(|| Ok(predicate()), timeout, poll_interval);
    match result {
        Ok(satisfied) => satisfied,
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLL: Duration = Duration::from_millis(20);

    #[test]
    fn test_immediate_success_does_not_sleep() {
        let start = Instant::now();
        assert!(wait_until(|| true, Duration::from_secs(5), Duration::from_secs(5)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_becomes_true_after_250ms() {
        let start = Instant::now();
        let ok = wait_until(
            || start.elapsed() >= Duration::from_millis(250),
            Duration::from_secs(1),
            POLL,
        );
        assert!(ok);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_never_true_fails_at_timeout_boundary() {
        let timeout = Duration::from_millis(300);
        let start = Instant::now();
        assert!(!wait_until(|| false, timeout, POLL));
        let elapsed = start.elapsed();
        assert!(elapsed >= timeout, "returned early: {elapsed:?}");
        // one poll interval of slack plus scheduler jitter
        assert!(elapsed < timeout + POLL + Duration::from_millis(200), "{elapsed:?}");
    }

    #[test]
    fn test_poll_interval_spaces_attempts() {
        let mut attempts = 0;
        wait_until(
            || {
                attempts += 1;
                false
            },
            Duration::from_millis(200),
            Duration::from_millis(50),
        );
        // ~5 attempts at 50ms spacing, never a busy loop
        assert!(attempts <= 7, "attempts = {attempts}");
        assert!(attempts >= 2);
    }

    #[test]
    fn test_predicate_error_propagates() {
        let mut calls = 0;
        let result: Result<bool, String> = try_wait_until(
            || {
                calls += 1;
                if calls == 2 {
                    Err("boom".to_string())
                } else {
                    Ok(false)
                }
            },
            Duration::from_secs(1),
            Duration::from_millis(5),
        );
        assert_eq!(result, Err("boom".to_string()));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_wait_for_some_returns_value() {
        let mut n = 0;
        let found: Result<Option<i32>, ()> = wait_for_some(
            || {
                n += 1;
                Ok((n >= 3).then_some(n))
            },
            Duration::from_secs(1),
            Duration::from_millis(1),
        );
        assert_eq!(found, Ok(Some(3)));
    }
}
