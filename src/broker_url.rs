// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resolution of the broker base URL from either `--server` or `--project` and `--broker`.

use url::Url;

use crate::error::{BrokerCliError, Result};

/// Build the URL of a broker registered in the Service Broker registry
pub fn construct_broker_url(host: &str, project: &str, broker: &str) -> String {
    format!("{}/v1beta1/projects/{}/brokers/{}", host, project, broker)
}

/// Addressing flags of a broker command
#[derive(Debug, Clone, Default)]
pub struct BrokerUrlArgs {
    pub server: Option<String>,
    pub host: String,
    pub project: Option<String>,
    pub broker: Option<String>,
}

/// A resolved broker address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerTarget {
    pub url: String,
    pub project: String,
    pub broker: String,
}

impl BrokerUrlArgs {
    /// Resolve the broker URL. Exactly one of `server` or the `project`/`broker` pair must be set.
    pub fn resolve(&self) -> Result<BrokerTarget> {
        let server = non_empty(&self.server);
        let project = non_empty(&self.project);
        let broker = non_empty(&self.broker);

        match (server, project, broker) {
            (Some(server), None, None) => parse_server_url(server),
            (None, Some(project), Some(broker)) => Ok(BrokerTarget {
                url: construct_broker_url(&self.host, project, broker),
                project: project.to_string(),
                broker: broker.to_string(),
            }),
            (Some(_), _, _) => Err(self.invalid("needs to be specified, not both")),
            (None, _, _) => Err(self.invalid("must be specified")),
        }
    }

    fn invalid(&self, reason: &str) -> BrokerCliError {
        BrokerCliError::InvalidBrokerUrl(format!(
            "either the value of --server(= {:?}) or the values of --project(= {:?}) and --broker(= {:?}) {}",
            self.server.as_deref().unwrap_or_default(),
            self.project.as_deref().unwrap_or_default(),
            self.broker.as_deref().unwrap_or_default(),
            reason
        ))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Validate `{host}/v1beta1/projects/{project}/brokers/{broker}` and extract project and broker
fn parse_server_url(server: &str) -> Result<BrokerTarget> {
    let url = Url::parse(server)?;
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    match segments.as_slice() {
        ["v1beta1", "projects", project, "brokers", broker] => Ok(BrokerTarget {
            url: server.trim_end_matches('/').to_string(),
            project: project.to_string(),
            broker: broker.to_string(),
        }),
        _ => Err(BrokerCliError::InvalidBrokerUrl(format!(
            "{:?} does not match {{host}}/v1beta1/projects/{{project}}/brokers/{{broker}}",
            server
        ))),
    }
}
