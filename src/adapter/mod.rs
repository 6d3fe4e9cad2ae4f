// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

pub mod failure;
pub mod http;
pub mod params;

pub use failure::{BrokerError, FailureDetail, FailureKind, GcpError};
pub use http::HttpAdapter;
pub use params::*;
