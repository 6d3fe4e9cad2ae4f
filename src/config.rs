// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{ensure, Context, Result};
use std::env;
use std::path::PathBuf;
use url::Url;

use crate::constants::{DEFAULT_API_VERSION, DEFAULT_HOST};

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Service Broker registry host that broker URLs are built from
    pub host: String,
    /// Value of the `X-Broker-API-Version` header
    pub api_version: String,
    /// Service account key file; application default credentials are used when unset
    pub credentials: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup("BROKER_CLI_HOST")
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let api_version = lookup("BROKER_CLI_API_VERSION")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
        let credentials = lookup("BROKER_CLI_CREDENTIALS")
            .filter(|c| !c.is_empty())
            .map(PathBuf::from);

        Config {
            host,
            api_version,
            credentials,
        }
        .validated()
    }

    /// Apply command-line overrides on top of the environment
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        api_version: Option<String>,
        credentials: Option<PathBuf>,
    ) -> Result<Self> {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(api_version) = api_version {
            self.api_version = api_version;
        }
        if credentials.is_some() {
            self.credentials = credentials;
        }
        self.validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.host = self.host.trim_end_matches('/').to_string();
        Url::parse(&self.host).with_context(|| format!("invalid broker registry host {:?}", self.host))?;
        ensure!(!self.api_version.is_empty(), "API version must not be empty");
        Ok(self)
    }
}
