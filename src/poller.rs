// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Last-operation polling with exponential backoff.

use std::future::{pending, Future};
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, instrument};

use crate::constants::poll::{INITIAL_DELAY_MS, MAX_DELAY_SECS};
use crate::error::{BrokerCliError, Result};
use crate::types::{Operation, OperationState};

/// Doubling delay between two last-operation calls, capped at [`MAX_DELAY_SECS`]
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    max: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            current: Duration::from_millis(INITIAL_DELAY_MS),
            max: Duration::from_secs(MAX_DELAY_SECS),
        }
    }
}

impl Backoff {
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Double the delay and return the new value
    pub fn advance(&mut self) -> Duration {
        self.current = (self.current * 2).min(self.max);
        self.current
    }
}

#[derive(Debug, Clone, Default)]
pub struct PollOptions {
    /// Print a `.` to stderr before every call
    pub show_progress: bool,
    /// Give up once this much time has passed
    pub timeout: Option<Duration>,
}

/// Call `last_operation` until it reports a state other than "in progress" and return that
/// operation. A `failed` operation is returned as a value, not an error.
///
/// The first error returned by `last_operation` ends polling and is propagated as is.
pub async fn wait_on_operation<F, Fut>(last_operation: F, options: &PollOptions) -> Result<Operation>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Operation>>,
{
    wait_on_operation_until(last_operation, options, pending()).await
}

/// Like [`wait_on_operation`], but stop with [`BrokerCliError::PollCancelled`] as soon as
/// `cancel` completes.
#[instrument(skip_all, fields(timeout = ?options.timeout))]
pub async fn wait_on_operation_until<F, Fut, C>(
    last_operation: F,
    options: &PollOptions,
    cancel: C,
) -> Result<Operation>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Operation>>,
    C: Future<Output = ()>,
{
    let timeout = options.timeout;
    let deadline = async move {
        match timeout {
            Some(t) => sleep(t).await,
            None => pending::<()>().await,
        }
    };

    tokio::select! {
        result = poll_until_terminal(last_operation, options.show_progress) => result,
        () = deadline => Err(BrokerCliError::PollTimeout(timeout.unwrap_or_default())),
        () = cancel => Err(BrokerCliError::PollCancelled),
    }
}

async fn poll_until_terminal<F, Fut>(mut last_operation: F, show_progress: bool) -> Result<Operation>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Operation>>,
{
    let mut backoff = Backoff::default();
    let mut operation = Operation {
        state: OperationState::InProgress,
        description: String::new(),
    };

    while !operation.state.is_terminal() {
        if show_progress {
            eprint!(".");
        }
        sleep(backoff.current()).await;

        operation = last_operation().await?;
        debug!(state = %operation.state, delay = ?backoff.current(), "Polled last operation");
        backoff.advance();
    }

    if show_progress {
        eprintln!();
    }
    Ok(operation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::BrokerError;
    use tokio::time::Instant;

    fn op(state: OperationState) -> Operation {
        Operation {
            state,
            description: String::new(),
        }
    }

    #[test]
    fn test_backoff_sequence() {
        let mut backoff = Backoff::default();
        assert_eq!(backoff.current(), Duration::from_millis(100));

        let mut previous = backoff.current();
        for _ in 0..20 {
            let next = backoff.advance();
            assert!(next >= previous);
            assert!(next <= Duration::from_secs(6));
            previous = next;
        }
        assert_eq!(previous, Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_terminal() {
        for in_progress_calls in [0usize, 1, 3, 7] {
            let mut calls = 0;
            let result = wait_on_operation(
                || {
                    calls += 1;
                    let state = if calls > in_progress_calls {
                        OperationState::Succeeded
                    } else {
                        OperationState::InProgress
                    };
                    async move { Ok(op(state)) }
                },
                &PollOptions::default(),
            )
            .await
            .unwrap();

            assert_eq!(result.state, OperationState::Succeeded);
            assert_eq!(calls, in_progress_calls + 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleeps_before_every_call() {
        let start = Instant::now();
        let mut calls = 0;

        wait_on_operation(
            || {
                calls += 1;
                let state = if calls == 4 {
                    OperationState::Succeeded
                } else {
                    OperationState::InProgress
                };
                async move { Ok(op(state)) }
            },
            &PollOptions::default(),
        )
        .await
        .unwrap();

        // 100 + 200 + 400 + 800 ms
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1500));
        assert!(elapsed < Duration::from_millis(1600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_state_is_returned() {
        let result = wait_on_operation(
            || async {
                Ok(Operation {
                    state: OperationState::Failed,
                    description: "quota exceeded".to_string(),
                })
            },
            &PollOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(result.state, OperationState::Failed);
        assert_eq!(result.description, "quota exceeded");
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_aborts_on_first_call() {
        let mut calls = 0;

        let err = wait_on_operation(
            || {
                calls += 1;
                async {
                    Err::<Operation, _>(BrokerCliError::from(BrokerError::from_response(
                        500,
                        b"boom",
                        "request was not successful",
                    )))
                }
            },
            &PollOptions::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, BrokerCliError::Broker(_)));
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let options = PollOptions {
            timeout: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        let err = wait_on_operation(|| async { Ok(op(OperationState::InProgress)) }, &options)
            .await
            .unwrap_err();

        assert!(matches!(err, BrokerCliError::PollTimeout(t) if t == Duration::from_secs(30)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let mut calls = 0;

        let err = wait_on_operation_until(
            || {
                calls += 1;
                async { Ok(op(OperationState::InProgress)) }
            },
            &PollOptions::default(),
            sleep(Duration::from_millis(250)),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, BrokerCliError::PollCancelled));
        // Calls at 100 ms and 300 ms; cancelled in between
        assert_eq!(calls, 1);
    }
}
