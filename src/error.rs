// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::adapter::failure::BrokerError;
use crate::transport::TransportError;

#[derive(Error, Debug)]
pub enum BrokerCliError {
    #[error("error executing request: {0}")]
    Transport(#[from] TransportError),

    #[error("error creating request: {0}")]
    Request(#[from] http::Error),

    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Broker(#[from] BrokerError),

    #[error("error marshalling the request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("error unmarshalling response body: {body}\nerror: {source}")]
    Decode {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("request shouldn't be handled asynchronously: {0}")]
    UnexpectedAsync(String),

    #[error("invalid broker URL: {0}")]
    InvalidBrokerUrl(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("operation did not finish within {0:?}")]
    PollTimeout(Duration),

    #[error("operation polling was cancelled")]
    PollCancelled,

    #[error("{resource} was not deleted, operation ended in state {state}: {description}")]
    DeleteFailed {
        resource: String,
        state: String,
        description: String,
    },

    #[error("failed {resource}: operation ended in state {state}: {description}")]
    OperationFailed {
        resource: String,
        state: String,
        description: String,
    },

    #[error("stopped broker cleanup as per user request")]
    CleanupCancelled,

    #[error("failed to cleanup service instances in broker: {0}")]
    Cleanup(CleanupFailures),

    #[error("invalid JSON object for --{flag}: {source}")]
    InvalidJsonArgument {
        flag: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Per-instance errors collected during a broker cleanup, keyed by instance ID
#[derive(Debug, Default)]
pub struct CleanupFailures(pub BTreeMap<String, BrokerCliError>);

impl CleanupFailures {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, instance_id: &str) -> Option<&BrokerCliError> {
        self.0.get(instance_id)
    }
}

impl fmt::Display for CleanupFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (instance_id, err)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "instance {}: {}", instance_id, err)?;
        }
        Ok(())
    }
}

pub type Result<T> = std::result::Result<T, BrokerCliError>;
