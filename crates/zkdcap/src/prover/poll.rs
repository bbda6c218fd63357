// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Matter Labs

//! Fixed interval polling of remote jobs

use crate::prover::error::{ProverError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Default number of failed status fetches a poll loop tolerates
pub const DEFAULT_MAX_FAILURES: usize = 3;

/// Outcome of one state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll<T> {
    /// Not terminal yet, poll again on the next tick
    Pending,
    /// Terminal success
    Ready(T),
}

/// A remote job observed through its status
#[async_trait]
pub trait StatusMachine: Send {
    /// Status as reported by the service
    type Status: Send;
    /// Value produced on terminal success
    type Output: Send;

    /// Fetch the current status of the job
    async fn fetch(&mut self) -> Result<Self::Status>;

    /// Apply a fetched status, an error is a terminal failure
    fn advance(&mut self, status: Self::Status) -> Result<Poll<Self::Output>>;
}

/// Failed fetch budget of a whole poll loop
///
/// Successful fetches do not replenish it.
#[derive(Debug, Clone)]
pub struct RetryBudget {
    failures: usize,
    max_failures: usize,
}

impl RetryBudget {
    /// Create a budget that surfaces the `max_failures`th failure
    pub fn new(max_failures: usize) -> Self {
        Self {
            failures: 0,
            max_failures,
        }
    }

    /// Record a failed fetch, returning the error once the budget is exhausted
    pub fn spend(&mut self, error: ProverError) -> Result<()> {
        self.failures += 1;
        if self.failures >= self.max_failures {
            return Err(error);
        }
        warn!(
            failures = self.failures,
            max_failures = self.max_failures,
            "status fetch failed, retrying: {error}"
        );
        Ok(())
    }

    /// Failed fetches recorded so far
    pub fn failures(&self) -> usize {
        self.failures
    }
}

/// Drives a [`StatusMachine`] on a fixed interval until it reaches a terminal state
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    interval: Duration,
    max_failures: usize,
}

impl Poller {
    /// Create a poller with the default failure budget
    pub fn new(interval: Duration) -> Self {
        Self {
            // tokio intervals reject a zero period
            interval: interval.max(Duration::from_millis(1)),
            max_failures: DEFAULT_MAX_FAILURES,
        }
    }

    /// Set the number of failed fetches after which polling gives up
    pub fn with_max_failures(mut self, max_failures: usize) -> Self {
        self.max_failures = max_failures.max(1);
        self
    }

    /// The tick interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll until the machine is ready, fails terminally, exhausts the
    /// failure budget or `token` is cancelled.
    ///
    /// The first fetch happens one interval after the call.
    pub async fn run<M: StatusMachine>(
        &self,
        token: &CancellationToken,
        machine: &mut M,
    ) -> Result<M::Output> {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut budget = RetryBudget::new(self.max_failures);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => return Err(ProverError::Cancelled),
                _ = ticker.tick() => {}
            }

            let fetched = tokio::select! {
                biased;
                _ = token.cancelled() => return Err(ProverError::Cancelled),
                fetched = machine.fetch() => fetched,
            };

            match fetched {
                Ok(status) => {
                    if let Poll::Ready(output) = machine.advance(status)? {
                        return Ok(output);
                    }
                }
                Err(error) => budget.spend(error)?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Debug, Clone, PartialEq)]
    enum Step {
        Claimed,
        Fulfilled,
        Unclaimed,
        FetchError,
    }

    struct Scripted {
        steps: VecDeque<Step>,
        fetches: usize,
        claimed_logged: bool,
    }

    impl Scripted {
        fn new(steps: impl IntoIterator<Item = Step>) -> Self {
            Self {
                steps: steps.into_iter().collect(),
                fetches: 0,
                claimed_logged: false,
            }
        }
    }

    #[async_trait]
    impl StatusMachine for Scripted {
        type Status = Step;
        type Output = &'static str;

        async fn fetch(&mut self) -> Result<Step> {
            self.fetches += 1;
            match self.steps.pop_front() {
                Some(Step::FetchError) => Err(ProverError::Http {
                    status_code: 503,
                    message: format!("fetch {}", self.fetches),
                }),
                Some(step) => Ok(step),
                None => Ok(Step::Claimed),
            }
        }

        fn advance(&mut self, status: Step) -> Result<Poll<&'static str>> {
            match status {
                Step::Claimed => {
                    self.claimed_logged = true;
                    Ok(Poll::Pending)
                }
                Step::Fulfilled => Ok(Poll::Ready("proof")),
                Step::Unclaimed => Err(ProverError::Unclaimed {
                    reason: "UNSUPPORTED".into(),
                    description: "nope".into(),
                }),
                Step::FetchError => unreachable!(),
            }
        }
    }

    fn poller() -> Poller {
        Poller::new(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn claimed_then_fulfilled() {
        let mut machine = Scripted::new([
            Step::Claimed,
            Step::Claimed,
            Step::Claimed,
            Step::Fulfilled,
        ]);
        let out = poller()
            .run(&CancellationToken::new(), &mut machine)
            .await
            .unwrap();
        assert_eq!(out, "proof");
        assert_eq!(machine.fetches, 4);
        assert!(machine.claimed_logged);
    }

    #[tokio::test]
    async fn third_failure_is_surfaced() {
        let mut machine = Scripted::new([Step::FetchError, Step::FetchError, Step::FetchError]);
        let err = poller()
            .run(&CancellationToken::new(), &mut machine)
            .await
            .unwrap_err();
        assert!(matches!(err, ProverError::Http { status_code: 503, ref message } if message == "fetch 3"));
        assert_eq!(machine.fetches, 3);
    }

    #[tokio::test]
    async fn budget_is_not_replenished() {
        let mut machine = Scripted::new([
            Step::FetchError,
            Step::Claimed,
            Step::Claimed,
            Step::FetchError,
            Step::Claimed,
            Step::FetchError,
            Step::Fulfilled,
        ]);
        let err = poller()
            .run(&CancellationToken::new(), &mut machine)
            .await
            .unwrap_err();
        assert!(matches!(err, ProverError::Http { .. }));
        assert_eq!(machine.fetches, 6);
    }

    #[tokio::test]
    async fn two_failures_are_tolerated() {
        let mut machine = Scripted::new([Step::FetchError, Step::FetchError, Step::Fulfilled]);
        let out = poller()
            .run(&CancellationToken::new(), &mut machine)
            .await
            .unwrap();
        assert_eq!(out, "proof");
    }

    #[tokio::test]
    async fn terminal_failure_stops_polling() {
        let mut machine = Scripted::new([Step::Claimed, Step::Unclaimed, Step::Fulfilled]);
        let err = poller()
            .run(&CancellationToken::new(), &mut machine)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "proof unclaimed: [UNSUPPORTED] nope");
        assert_eq!(machine.fetches, 2);
    }

    #[tokio::test]
    async fn cancellation_is_observed() {
        let token = CancellationToken::new();
        let mut machine = Scripted::new([]);
        let poller = Poller::new(Duration::from_millis(5));
        let cancel = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });
        let err = poller.run(&token, &mut machine).await.unwrap_err();
        assert!(matches!(err, ProverError::Cancelled));
    }

    #[tokio::test]
    async fn cancelled_before_first_tick() {
        let token = CancellationToken::new();
        token.cancel();
        let mut machine = Scripted::new([Step::Fulfilled]);
        let err = Poller::new(Duration::from_secs(3600))
            .run(&token, &mut machine)
            .await
            .unwrap_err();
        assert!(matches!(err, ProverError::Cancelled));
        assert_eq!(machine.fetches, 0);
    }

    #[test]
    fn budget_counts() {
        let mut budget = RetryBudget::new(3);
        assert!(budget.spend(ProverError::Cancelled).is_ok());
        assert!(budget.spend(ProverError::Cancelled).is_ok());
        assert!(budget.spend(ProverError::Cancelled).is_err());
        assert_eq!(budget.failures(), 3);
    }
}
