// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Production transport backed by a `reqwest` client with bearer credentials.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::AUTHORIZATION;
use http::{HeaderValue, Request, Response};
use tracing::{debug, instrument};

use super::{Transport, TransportError};
use crate::auth::TokenSource;

pub struct ReqwestTransport {
    client: reqwest::Client,
    tokens: Arc<dyn TokenSource>,
}

impl ReqwestTransport {
    /// Transport that authenticates every request with a token from `tokens`
    pub fn new(client: reqwest::Client, tokens: Arc<dyn TokenSource>) -> Self {
        Self { client, tokens }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method(), uri = %request.uri()))]
    async fn execute(&self, mut request: Request<Bytes>) -> Result<Response<Bytes>, TransportError> {
        let method = request.method().to_string();
        let uri = request.uri().to_string();
        let request_error = |message: String| TransportError::Request {
            method: method.clone(),
            uri: uri.clone(),
            message,
        };

        let token = self
            .tokens
            .token()
            .await
            .map_err(|e| TransportError::Credentials(e.to_string()))?;
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| TransportError::Credentials(e.to_string()))?;
        request.headers_mut().insert(AUTHORIZATION, value);

        let request = reqwest::Request::try_from(request).map_err(|e| request_error(e.to_string()))?;
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| request_error(e.to_string()))?;

        let status = response.status();
        debug!("Broker responded with {}", status);

        let mut builder = Response::builder().status(status);
        if let Some(headers) = builder.headers_mut() {
            headers.extend(response.headers().clone());
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        builder.body(body).map_err(|e| request_error(e.to_string()))
    }
}
