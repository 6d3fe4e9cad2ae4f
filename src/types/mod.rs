// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Open Service Broker data model: registry records, catalog entries, wire payloads and
//! asynchronous operations.

pub mod broker;
pub mod catalog;
pub mod operation;
pub mod payloads;

pub use broker::{Binding, Broker, Instance};
pub use catalog::{DashboardClient, Plan, Schemas, Service};
pub use operation::{Operation, OperationState, OperationType};

/// Free-form JSON object, reserved for provider-defined payloads
pub type JsonObject = serde_json::Map<String, serde_json::Value>;
