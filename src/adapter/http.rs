// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Open Service Broker calls over HTTP.

use std::sync::Arc;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Method, Request, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use super::failure::BrokerError;
use super::params::*;
use crate::constants::{query, API_VERSION_HEADER, DEFAULT_API_VERSION};
use crate::error::{BrokerCliError, Result};
use crate::transport::Transport;
use crate::types::payloads::{
    BindRequestBody, BindResponseBody, CatalogResponseBody, OperationIdResponseBody,
    PreviousValues, ProvisionRequestBody, ProvisionResponseBody, UpdateInstanceRequestBody,
};
use crate::types::{Broker, Operation, OperationState, OperationType};

const MALFORMED_REQUEST: &str = "request was malformed or missing mandatory data";
const NOT_SUCCESSFUL: &str = "request was not successful";
const ASYNC_REQUIRED: &str = "the broker only supports asynchronous requests";
const SYNC_REQUIRED: &str = "the broker only supports synchronous requests";

/// Stateless client for the broker registry (`v1beta1`) and OSB (`v2`) endpoints.
///
/// Every call is a self-contained request/response cycle, so one adapter can be shared freely.
#[derive(Clone)]
pub struct HttpAdapter {
    transport: Arc<dyn Transport>,
}

impl HttpAdapter {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Register a broker named `projects/{project}/brokers/{name}`
    pub async fn create_broker(&self, params: &CreateBrokerParams) -> Result<Broker> {
        let url = format!("{}/v1beta1/projects/{}/brokers", params.host, params.project);
        let broker = Broker {
            name: Broker::resource_name(&params.project, &params.name),
            title: params.title.clone(),
            ..Default::default()
        };

        let body = self.do_request(Method::POST, &url, Some(encode(&broker)?)).await?;
        decode(&body)
    }

    pub async fn delete_broker(&self, params: &DeleteBrokerParams) -> Result<()> {
        self.do_request(Method::DELETE, &params.broker_url, None).await?;
        Ok(())
    }

    pub async fn list_brokers(&self, params: &ListBrokersParams) -> Result<ListBrokersResult> {
        let url = format!("{}/v1beta1/projects/{}/brokers", params.host, params.project);
        let body = self.do_request(Method::GET, &url, None).await?;
        decode_or_default(&body)
    }

    pub async fn list_instances(&self, params: &ListInstancesParams) -> Result<ListInstancesResult> {
        let url = format!("{}/instances", params.server);
        let body = self.do_request(Method::GET, &url, None).await?;
        decode_or_default(&body)
    }

    pub async fn list_bindings(&self, params: &ListBindingsParams) -> Result<ListBindingsResult> {
        let url = format!("{}/instances/{}/bindings", params.server, params.instance_id);
        let body = self.do_request(Method::GET, &url, None).await?;
        decode_or_default(&body)
    }

    pub async fn get_catalog(&self, params: &GetCatalogParams) -> Result<GetCatalogResult> {
        let url = osb_url(&format!("{}/v2/catalog", params.server), &[])?;

        let (status, body) = self
            .do_osb_request(Method::GET, url, &params.api_version, None)
            .await?;
        if status != StatusCode::OK {
            return Err(failure(status, &body, "error fetching catalog"));
        }

        let catalog: CatalogResponseBody = decode(&body)?;
        Ok(GetCatalogResult {
            services: catalog.services,
        })
    }

    /// Provision a service instance
    pub async fn create_instance(&self, params: &CreateInstanceParams) -> Result<CreateInstanceResult> {
        let url = osb_url(
            &format!("{}/v2/service_instances/{}", params.server, params.instance_id),
            &[(query::ACCEPTS_INCOMPLETE, bool_param(params.accepts_incomplete))],
        )?;
        let request_body = ProvisionRequestBody {
            service_id: params.service_id.clone(),
            plan_id: params.plan_id.clone(),
            context: params.context.clone(),
            organization_guid: params.organization_guid.clone(),
            space_guid: params.space_guid.clone(),
            parameters: params.parameters.clone(),
        };

        let (status, body) = self
            .do_osb_request(Method::PUT, url, &params.api_version, Some(encode(&request_body)?))
            .await?;

        match status {
            StatusCode::ACCEPTED => {
                // Provisioning continues asynchronously
                ensure_async_accepted(params.accepts_incomplete, &body)?;
                let response: ProvisionResponseBody = decode_or_default(&body)?;
                Ok(CreateInstanceResult {
                    is_async: true,
                    dashboard_url: non_empty(response.dashboard_url),
                    operation_id: non_empty(response.operation),
                })
            }
            // Identical instance already exists, or it was provisioned synchronously
            s if s.is_success() => {
                let response: ProvisionResponseBody = decode_or_default(&body)?;
                Ok(CreateInstanceResult {
                    is_async: false,
                    dashboard_url: non_empty(response.dashboard_url),
                    operation_id: None,
                })
            }
            StatusCode::BAD_REQUEST => Err(failure(status, &body, MALFORMED_REQUEST)),
            StatusCode::CONFLICT => Err(failure(
                status,
                &body,
                "instance with the same id but different attributes already exists",
            )),
            StatusCode::UNPROCESSABLE_ENTITY => Err(failure(
                status,
                &body,
                mode_rejected(params.accepts_incomplete),
            )),
            _ => Err(failure(status, &body, NOT_SUCCESSFUL)),
        }
    }

    /// Deprovision a service instance. An instance that is already gone counts as deleted.
    pub async fn delete_instance(&self, params: &DeleteInstanceParams) -> Result<DeleteInstanceResult> {
        let url = osb_url(
            &format!("{}/v2/service_instances/{}", params.server, params.instance_id),
            &[
                (query::ACCEPTS_INCOMPLETE, bool_param(params.accepts_incomplete)),
                (query::PLAN_ID, &params.plan_id),
                (query::SERVICE_ID, &params.service_id),
            ],
        )?;

        let (status, body) = self
            .do_osb_request(Method::DELETE, url, &params.api_version, None)
            .await?;

        delete_outcome(status, &body, params.accepts_incomplete)
    }

    pub async fn update_instance(&self, params: &UpdateInstanceParams) -> Result<UpdateInstanceResult> {
        let url = osb_url(
            &format!("{}/v2/service_instances/{}", params.server, params.instance_id),
            &[(query::ACCEPTS_INCOMPLETE, bool_param(params.accepts_incomplete))],
        )?;
        let request_body = UpdateInstanceRequestBody {
            service_id: params.service_id.clone(),
            plan_id: params.plan_id.clone(),
            context: params.context.clone(),
            parameters: params.parameters.clone(),
            previous_values: Some(PreviousValues {
                service_id: params.previous_service_id.clone(),
                plan_id: params.previous_plan_id.clone(),
                organization_id: params.previous_organization_id.clone(),
                space_id: params.previous_space_id.clone(),
            }),
        };

        let (status, body) = self
            .do_osb_request(Method::PATCH, url, &params.api_version, Some(encode(&request_body)?))
            .await?;

        match status {
            StatusCode::ACCEPTED => {
                ensure_async_accepted(params.accepts_incomplete, &body)?;
                let response: OperationIdResponseBody = decode_or_default(&body)?;
                Ok(AsyncOutcome {
                    is_async: true,
                    operation_id: non_empty(response.operation),
                })
            }
            // Requested changes have been applied
            s if s.is_success() => {
                decode_or_default::<OperationIdResponseBody>(&body)?;
                Ok(AsyncOutcome::default())
            }
            StatusCode::BAD_REQUEST => Err(failure(status, &body, MALFORMED_REQUEST)),
            StatusCode::UNPROCESSABLE_ENTITY => Err(failure(
                status,
                &body,
                mode_rejected(params.accepts_incomplete),
            )),
            _ => Err(failure(status, &body, NOT_SUCCESSFUL)),
        }
    }

    pub async fn instance_last_operation(&self, params: &InstanceLastOperationParams) -> Result<Operation> {
        let url = format!(
            "{}/v2/service_instances/{}/last_operation",
            params.server, params.instance_id
        );
        self.last_operation("instance", &url, &params.last_operation)
            .await
    }

    /// Bind to a service instance
    pub async fn create_binding(&self, params: &CreateBindingParams) -> Result<CreateBindingResult> {
        let url = osb_url(
            &format!(
                "{}/v2/service_instances/{}/service_bindings/{}",
                params.server, params.instance_id, params.binding_id
            ),
            &[(query::ACCEPTS_INCOMPLETE, bool_param(params.accepts_incomplete))],
        )?;
        let request_body = BindRequestBody {
            service_id: params.service_id.clone(),
            plan_id: params.plan_id.clone(),
            context: params.context.clone(),
            app_guid: params.app_guid.clone(),
            bind_resource: params.bind_resource.clone(),
            parameters: params.parameters.clone(),
        };

        let (status, body) = self
            .do_osb_request(Method::PUT, url, &params.api_version, Some(encode(&request_body)?))
            .await?;

        let binding_result = |body: &[u8], is_async: bool| -> Result<CreateBindingResult> {
            let response: BindResponseBody = decode_or_default(body)?;
            Ok(CreateBindingResult {
                is_async,
                credentials: response.credentials,
                syslog_drain_url: response.syslog_drain_url,
                route_service_url: response.route_service_url,
                volume_mounts: response.volume_mounts,
                operation_id: if is_async {
                    non_empty(response.operation)
                } else {
                    None
                },
            })
        };

        match status {
            StatusCode::ACCEPTED => {
                ensure_async_accepted(params.accepts_incomplete, &body)?;
                binding_result(&body, true)
            }
            // Identical binding already exists, or it was created synchronously
            s if s.is_success() => binding_result(&body, false),
            StatusCode::BAD_REQUEST => Err(failure(status, &body, MALFORMED_REQUEST)),
            StatusCode::CONFLICT => Err(failure(
                status,
                &body,
                "binding with the same id but different attributes already exists",
            )),
            StatusCode::UNPROCESSABLE_ENTITY => Err(failure(
                status,
                &body,
                mode_rejected(params.accepts_incomplete),
            )),
            _ => Err(failure(status, &body, NOT_SUCCESSFUL)),
        }
    }

    /// Unbind from a service instance. A binding that is already gone counts as deleted.
    pub async fn delete_binding(&self, params: &DeleteBindingParams) -> Result<DeleteBindingResult> {
        let url = osb_url(
            &format!(
                "{}/v2/service_instances/{}/service_bindings/{}",
                params.server, params.instance_id, params.binding_id
            ),
            &[
                (query::ACCEPTS_INCOMPLETE, bool_param(params.accepts_incomplete)),
                (query::PLAN_ID, &params.plan_id),
                (query::SERVICE_ID, &params.service_id),
            ],
        )?;

        let (status, body) = self
            .do_osb_request(Method::DELETE, url, &params.api_version, None)
            .await?;

        delete_outcome(status, &body, params.accepts_incomplete)
    }

    pub async fn binding_last_operation(&self, params: &BindingLastOperationParams) -> Result<Operation> {
        let url = format!(
            "{}/v2/service_instances/{}/service_bindings/{}/last_operation",
            params.server, params.instance_id, params.binding_id
        );
        self.last_operation("binding", &url, &params.last_operation)
            .await
    }

    async fn last_operation(
        &self,
        resource: &str,
        url: &str,
        params: &LastOperationParams,
    ) -> Result<Operation> {
        let pairs: Vec<(&str, &str)> = [
            (query::OPERATION, params.operation_id.as_str()),
            (query::PLAN_ID, params.plan_id.as_str()),
            (query::SERVICE_ID, params.service_id.as_str()),
        ]
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .collect();
        let url = osb_url(url, &pairs)?;

        let (status, body) = self
            .do_osb_request(Method::GET, url, &params.api_version, None)
            .await?;

        match status {
            StatusCode::OK => decode(&body),
            StatusCode::BAD_REQUEST => Err(failure(status, &body, MALFORMED_REQUEST)),
            // Gone after a delete means the delete finished
            StatusCode::GONE if params.operation_type == OperationType::Delete => Ok(Operation {
                state: OperationState::Succeeded,
                description: format!("The {} doesn't exist.", resource),
            }),
            StatusCode::GONE => Err(failure(status, &body, format!("{} doesn't exist", resource))),
            _ => Err(failure(status, &body, NOT_SUCCESSFUL)),
        }
    }

    /// Perform a registry request and return the body of a 2xx response
    async fn do_request(&self, method: Method, url: &str, body: Option<Bytes>) -> Result<Bytes> {
        let url = Url::parse(url)?;
        let request = build_request(method, &url, DEFAULT_API_VERSION, body)?;
        let response = self.transport.execute(request).await?;

        let status = response.status();
        let body = response.into_body();
        if !status.is_success() {
            return Err(failure(status, &body, NOT_SUCCESSFUL));
        }
        Ok(body)
    }

    /// Perform an OSB request and return the status and body, whatever the status
    async fn do_osb_request(
        &self,
        method: Method,
        url: Url,
        api_version: &str,
        body: Option<Bytes>,
    ) -> Result<(StatusCode, Bytes)> {
        let request = build_request(method, &url, api_version, body)?;
        let response = self.transport.execute(request).await?;
        let status = response.status();
        Ok((status, response.into_body()))
    }
}

fn build_request(method: Method, url: &Url, api_version: &str, body: Option<Bytes>) -> Result<Request<Bytes>> {
    let mut builder = Request::builder()
        .method(method)
        .uri(url.as_str())
        .header(API_VERSION_HEADER, api_version);
    if body.is_some() {
        builder = builder.header(CONTENT_TYPE, "application/json");
    }
    Ok(builder.body(body.unwrap_or_default())?)
}

/// Parse `base` and append the query pairs in the given order
fn osb_url(base: &str, pairs: &[(&str, &str)]) -> Result<Url> {
    let mut url = Url::parse(base)?;
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs.iter().copied());
    }
    Ok(url)
}

fn delete_outcome(status: StatusCode, body: &[u8], accepts_incomplete: bool) -> Result<AsyncOutcome> {
    match status {
        StatusCode::ACCEPTED => {
            ensure_async_accepted(accepts_incomplete, body)?;
            let response: OperationIdResponseBody = decode_or_default(body)?;
            Ok(AsyncOutcome {
                is_async: true,
                operation_id: non_empty(response.operation),
            })
        }
        // Deleted synchronously, or it didn't exist
        StatusCode::GONE => Ok(AsyncOutcome::default()),
        s if s.is_success() => Ok(AsyncOutcome::default()),
        StatusCode::BAD_REQUEST => Err(failure(status, body, MALFORMED_REQUEST)),
        StatusCode::UNPROCESSABLE_ENTITY => {
            Err(failure(status, body, mode_rejected(accepts_incomplete)))
        }
        _ => Err(failure(status, body, NOT_SUCCESSFUL)),
    }
}

fn ensure_async_accepted(accepts_incomplete: bool, body: &[u8]) -> Result<()> {
    if accepts_incomplete {
        Ok(())
    } else {
        Err(BrokerCliError::UnexpectedAsync(
            String::from_utf8_lossy(body).into_owned(),
        ))
    }
}

fn mode_rejected(accepts_incomplete: bool) -> &'static str {
    if accepts_incomplete {
        SYNC_REQUIRED
    } else {
        ASYNC_REQUIRED
    }
}

fn failure(status: StatusCode, body: &[u8], description: impl Into<String>) -> BrokerCliError {
    BrokerError::from_response(status.as_u16(), body, description).into()
}

fn bool_param(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn non_empty(value: String) -> Option<String> {
    Some(value).filter(|v| !v.is_empty())
}

fn encode<T: Serialize>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(BrokerCliError::Encode)
}

/// Decode a JSON body, keeping the raw text in the error
pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|source| BrokerCliError::Decode {
        body: String::from_utf8_lossy(body).into_owned(),
        source,
    })
}

/// Like [`decode`], but an empty body yields the default value
fn decode_or_default<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    decode(body)
}
