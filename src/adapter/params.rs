// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Inputs and outputs of the adapter calls.

use serde::{Deserialize, Serialize};

use crate::types::{Binding, Broker, Instance, JsonObject, OperationType, Service};

#[derive(Clone, Debug, Default)]
pub struct CreateBrokerParams {
    /// Registry host, e.g. `https://servicebroker.googleapis.com`
    pub host: String,
    pub project: String,
    pub name: String,
    pub title: String,
}

#[derive(Clone, Debug, Default)]
pub struct DeleteBrokerParams {
    pub broker_url: String,
}

#[derive(Clone, Debug, Default)]
pub struct ListBrokersParams {
    pub host: String,
    pub project: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ListBrokersResult {
    #[serde(default)]
    pub brokers: Vec<Broker>,
}

#[derive(Clone, Debug, Default)]
pub struct ListInstancesParams {
    /// Broker URL
    pub server: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ListInstancesResult {
    #[serde(default)]
    pub instances: Vec<Instance>,
}

#[derive(Clone, Debug, Default)]
pub struct ListBindingsParams {
    pub server: String,
    pub instance_id: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ListBindingsResult {
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

#[derive(Clone, Debug, Default)]
pub struct GetCatalogParams {
    pub server: String,
    /// Value of the `X-Broker-API-Version` header
    pub api_version: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GetCatalogResult {
    pub services: Vec<Service>,
}

/// Parameters used to provision a service instance
#[derive(Clone, Debug, Default)]
pub struct CreateInstanceParams {
    pub server: String,
    pub api_version: String,
    /// Whether the client accepts asynchronous provisioning. A broker that only supports the
    /// other mode rejects the request with 422.
    pub accepts_incomplete: bool,
    /// OSB recommends a GUID
    pub instance_id: String,
    pub service_id: String,
    pub plan_id: String,
    /// Platform-specific context, sent for OSB 2.12 and later
    pub context: Option<JsonObject>,
    /// CF-specific
    pub organization_guid: String,
    /// CF-specific
    pub space_guid: String,
    pub parameters: Option<JsonObject>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CreateInstanceResult {
    /// Whether the broker is provisioning the instance asynchronously
    pub is_async: bool,
    pub dashboard_url: Option<String>,
    /// Broker-supplied identifier of the asynchronous operation, absent for synchronous results
    pub operation_id: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct DeleteInstanceParams {
    pub server: String,
    pub api_version: String,
    pub accepts_incomplete: bool,
    pub instance_id: String,
    pub service_id: String,
    pub plan_id: String,
}

#[derive(Clone, Debug, Default)]
pub struct UpdateInstanceParams {
    pub server: String,
    pub api_version: String,
    pub accepts_incomplete: bool,
    pub instance_id: String,
    pub service_id: String,
    /// New plan, empty to keep the current one
    pub plan_id: String,
    pub context: Option<JsonObject>,
    pub parameters: Option<JsonObject>,
    pub previous_service_id: String,
    pub previous_plan_id: String,
    pub previous_organization_id: String,
    pub previous_space_id: String,
}

#[derive(Clone, Debug, Default)]
pub struct CreateBindingParams {
    pub server: String,
    pub api_version: String,
    pub accepts_incomplete: bool,
    pub instance_id: String,
    pub binding_id: String,
    pub service_id: String,
    pub plan_id: String,
    pub context: Option<JsonObject>,
    pub app_guid: String,
    /// CF-specific
    pub bind_resource: Option<JsonObject>,
    pub parameters: Option<JsonObject>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CreateBindingResult {
    pub is_async: bool,
    /// Free-form credentials for accessing the bound instance
    pub credentials: Option<JsonObject>,
    pub syslog_drain_url: Option<String>,
    pub route_service_url: Option<String>,
    pub volume_mounts: Vec<serde_json::Value>,
    pub operation_id: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct DeleteBindingParams {
    pub server: String,
    pub api_version: String,
    pub accepts_incomplete: bool,
    pub instance_id: String,
    pub binding_id: String,
    pub service_id: String,
    pub plan_id: String,
}

/// Outcome of an update, deprovision or unbind request
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AsyncOutcome {
    pub is_async: bool,
    pub operation_id: Option<String>,
}

pub type DeleteInstanceResult = AsyncOutcome;
pub type UpdateInstanceResult = AsyncOutcome;
pub type DeleteBindingResult = AsyncOutcome;

/// Common parameters of a last-operation poll. Service, plan and operation must echo the values
/// of the request that started the operation.
#[derive(Clone, Debug, Default)]
pub struct LastOperationParams {
    pub api_version: String,
    pub service_id: String,
    pub plan_id: String,
    pub operation_id: String,
    pub operation_type: OperationType,
}

#[derive(Clone, Debug, Default)]
pub struct InstanceLastOperationParams {
    pub server: String,
    pub instance_id: String,
    pub last_operation: LastOperationParams,
}

#[derive(Clone, Debug, Default)]
pub struct BindingLastOperationParams {
    pub server: String,
    pub instance_id: String,
    pub binding_id: String,
    pub last_operation: LastOperationParams,
}
