// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! HTTP transport abstraction used by the adapter.

pub mod http_client;

use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};
use thiserror::Error;

pub use http_client::ReqwestTransport;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("{method} {uri}: {message}")]
    Request {
        method: String,
        uri: String,
        message: String,
    },

    #[error("error reading response body: {0}")]
    Body(String),

    #[error("error obtaining credentials: {0}")]
    Credentials(String),
}

/// Executes a single HTTP request and hands back the status and the fully read body.
///
/// Implementations carry authentication; the adapter never sees credentials.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>, TransportError>;
}
