// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Request and response bodies of the OSB v2 instance and binding endpoints.

use serde::{Deserialize, Serialize};

use super::catalog::Service;
use super::JsonObject;

fn is_empty(s: &str) -> bool {
    s.is_empty()
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct CatalogResponseBody {
    #[serde(default)]
    pub services: Vec<Service>,
}

/// Body of `PUT /v2/service_instances/{id}`
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ProvisionRequestBody {
    pub service_id: String,
    pub plan_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<JsonObject>,
    /// CF-specific, superseded by `context`
    #[serde(default, skip_serializing_if = "is_empty")]
    pub organization_guid: String,
    /// CF-specific, superseded by `context`
    #[serde(default, skip_serializing_if = "is_empty")]
    pub space_guid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<JsonObject>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ProvisionResponseBody {
    #[serde(default, skip_serializing_if = "is_empty")]
    pub dashboard_url: String,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub operation: String,
}

/// Body of `PATCH /v2/service_instances/{id}`
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct UpdateInstanceRequestBody {
    pub service_id: String,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub plan_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<JsonObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<JsonObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_values: Option<PreviousValues>,
}

/// Information about a service instance prior to an update
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PreviousValues {
    /// Deprecated, the service of an instance is immutable
    #[serde(default, skip_serializing_if = "is_empty")]
    pub service_id: String,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub plan_id: String,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub organization_id: String,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub space_id: String,
}

/// Response body of an update, deprovision or unbind request
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct OperationIdResponseBody {
    #[serde(default, skip_serializing_if = "is_empty")]
    pub operation: String,
}

/// Body of `PUT /v2/service_instances/{iid}/service_bindings/{bid}`
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct BindRequestBody {
    pub service_id: String,
    pub plan_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<JsonObject>,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub app_guid: String,
    /// CF-specific platform resources associated with the binding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_resource: Option<JsonObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<JsonObject>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct BindResponseBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<JsonObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syslog_drain_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_service_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "is_empty")]
    pub operation: String,
}
