use anyhow::Result;
use log::{debug, error, warn};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::PollingPolicy;
use crate::core::types::TaskOutcome;

/// What a single status check observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Pending,
    Done,
}

/// Suspension used between polls. Swapped out in tests.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

/// Repeats a status check on a fixed interval until it reports `Done`,
/// the attempt budget runs out, or the check errors.
///
/// The check may re-issue the triggering call and read its response as the
/// status, or issue a dedicated read-only status query; the executor does
/// not care which.
pub struct PollingExecutor<'a> {
    sleeper: &'a dyn Sleeper,
}

impl<'a> PollingExecutor<'a> {
    pub fn new(sleeper: &'a dyn Sleeper) -> Self {
        Self { sleeper }
    }

    /// Each attempt sleeps `policy.interval` and then checks, so a task that
    /// finishes on attempt `k` costs exactly `k` sleeps and `k` checks.
    ///
    /// Returns:
    /// - `Completed` on the first `Done`
    /// - `TimedOut` after `policy.max_attempts` pending checks
    /// - `Failed` as soon as the check errors; remaining attempts are skipped
    pub fn run_until_done<F>(&self, operation: &str, policy: &PollingPolicy, mut check: F) -> TaskOutcome
    where
        F: FnMut() -> Result<PollStatus>,
    {
        let started = Instant::now();

        for attempt in 1..=policy.max_attempts {
            self.sleeper.sleep(policy.interval);
            debug!(
                "[polling] {} status check attempt {}/{}",
                operation, attempt, policy.max_attempts
            );

            match check() {
                Ok(PollStatus::Done) => {
                    debug!(
                        "[polling] {} finished after {}ms (attempt {})",
                        operation,
                        started.elapsed().as_millis(),
                        attempt
                    );
                    return TaskOutcome::Completed;
                }
                Ok(PollStatus::Pending) => {
                    debug!(
                        "[polling] {} not finished yet, next check in {}ms",
                        operation,
                        policy.interval.as_millis()
                    );
                }
                Err(e) => {
                    warn!(
                        "[polling] {} status check failed on attempt {}: {:#}",
                        operation, attempt, e
                    );
                    return TaskOutcome::Failed(format!("{e:#}"));
                }
            }
        }

        error!(
            "[polling] {} timed out after {} attempts ({}ms)",
            operation,
            policy.max_attempts,
            started.elapsed().as_millis()
        );
        TaskOutcome::TimedOut
    }
}
