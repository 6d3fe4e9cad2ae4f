// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking broker HTTP responses.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Request, Response};

use crate::adapter::HttpAdapter;
use crate::transport::{Transport, TransportError};

#[derive(Clone, Debug)]
enum MockResponse {
    Reply(u16, String),
    Fail(String),
}

/// A request as seen by the mock transport
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// A mock transport that replays predefined responses keyed on method and exact path.
///
/// Responses registered for the same route are returned in order; the last one keeps being
/// returned once the others are used up. Every request is recorded.
#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<HashMap<(String, String), VecDeque<MockResponse>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a response for requests with the given method and path
    pub fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.push(method, path, MockResponse::Reply(status, body.to_string()));
        self
    }

    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, status, body)
    }

    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    /// Fail requests to the given route with a transport error
    pub fn fail(self, method: &str, path: &str) -> Self {
        self.push(method, path, MockResponse::Fail("connection refused".to_string()));
        self
    }

    /// Build an adapter on top of this mock, keeping a handle for inspecting requests
    pub fn adapter(&self) -> HttpAdapter {
        HttpAdapter::new(self.clone())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// `METHOD path` of every recorded request, in order
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }

    fn push(&self, method: &str, path: &str, response: MockResponse) {
        self.responses
            .lock()
            .unwrap()
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back(response);
    }

    fn next_response(&self, method: &str, path: &str) -> Option<MockResponse> {
        let mut responses = self.responses.lock().unwrap();
        let queue = responses.get_mut(&(method.to_string(), path.to_string()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>, TransportError> {
        let method = request.method().to_string();
        let path = request.uri().path().to_string();

        self.requests.lock().unwrap().push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            query: request.uri().query().map(str::to_string),
            headers: request.headers().clone(),
            body: request.body().clone(),
        });

        match self.next_response(&method, &path) {
            Some(MockResponse::Reply(status, body)) => Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Bytes::from(body))
                .unwrap()),
            Some(MockResponse::Fail(message)) => Err(TransportError::Request {
                method,
                uri: request.uri().to_string(),
                message,
            }),
            None => Ok(Response::builder()
                .status(404)
                .body(Bytes::from_static(br#"{"description":"not found"}"#))
                .unwrap()),
        }
    }
}

/// JSON body of a last-operation response
pub fn operation_json(state: &str, description: &str) -> String {
    serde_json::json!({ "state": state, "description": description }).to_string()
}

/// JSON body of a Google API error envelope
pub fn gcp_error_json(code: u16, message: &str) -> String {
    serde_json::json!({
        "error": {
            "code": code,
            "message": message,
            "status": "FAILED_PRECONDITION"
        }
    })
    .to_string()
}
