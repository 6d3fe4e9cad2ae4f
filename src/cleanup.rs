// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Removal of every binding and instance registered in a broker.

use std::future::Future;

use tracing::{debug, info, instrument, warn};

use crate::adapter::{
    BindingLastOperationParams, DeleteBindingParams, DeleteInstanceParams, HttpAdapter,
    InstanceLastOperationParams, LastOperationParams, ListBindingsParams, ListInstancesParams,
};
use crate::error::{BrokerCliError, CleanupFailures, Result};
use crate::poller::{wait_on_operation, PollOptions};
use crate::types::{Binding, Instance, Operation, OperationType};

/// An instance together with the bindings that must be removed before it
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceWithBindings {
    pub instance: Instance,
    pub bindings: Vec<Binding>,
}

#[derive(Debug, Clone, Default)]
pub struct CleanupOptions {
    pub api_version: String,
    /// Skip the confirmation prompt
    pub force: bool,
    pub poll: PollOptions,
}

pub async fn list_instances_with_bindings(
    adapter: &HttpAdapter,
    broker_url: &str,
) -> Result<Vec<InstanceWithBindings>> {
    let instances = adapter
        .list_instances(&ListInstancesParams {
            server: broker_url.to_string(),
        })
        .await?
        .instances;

    let mut result = Vec::with_capacity(instances.len());
    for instance in instances {
        let bindings = adapter
            .list_bindings(&ListBindingsParams {
                server: broker_url.to_string(),
                instance_id: instance.id.clone(),
            })
            .await?
            .bindings;
        result.push(InstanceWithBindings { instance, bindings });
    }
    Ok(result)
}

/// Delete a binding, waiting for the broker to finish if it deletes asynchronously
#[instrument(skip(adapter, api_version, poll, instance), fields(instance = %instance.id))]
pub async fn delete_binding_and_wait(
    adapter: &HttpAdapter,
    broker_url: &str,
    api_version: &str,
    instance: &Instance,
    binding_id: &str,
    poll: &PollOptions,
) -> Result<()> {
    info!("Deleting binding");
    let result = adapter
        .delete_binding(&DeleteBindingParams {
            server: broker_url.to_string(),
            api_version: api_version.to_string(),
            accepts_incomplete: true,
            instance_id: instance.id.clone(),
            binding_id: binding_id.to_string(),
            service_id: instance.service_id.clone(),
            plan_id: instance.plan_id.clone(),
        })
        .await?;

    if !result.is_async {
        debug!("Binding deleted synchronously");
        return Ok(());
    }

    let params = BindingLastOperationParams {
        server: broker_url.to_string(),
        instance_id: instance.id.clone(),
        binding_id: binding_id.to_string(),
        last_operation: delete_operation(api_version, instance, result.operation_id),
    };
    let operation = wait_on_operation(|| adapter.binding_last_operation(&params), poll).await?;
    ensure_deleted(format!("binding {:?} to instance {:?}", binding_id, instance.id), operation)
}

/// Delete an instance, waiting for the broker to finish if it deletes asynchronously
#[instrument(skip(adapter, api_version, poll, instance), fields(instance = %instance.id))]
pub async fn delete_instance_and_wait(
    adapter: &HttpAdapter,
    broker_url: &str,
    api_version: &str,
    instance: &Instance,
    poll: &PollOptions,
) -> Result<()> {
    info!("Deleting instance");
    let result = adapter
        .delete_instance(&DeleteInstanceParams {
            server: broker_url.to_string(),
            api_version: api_version.to_string(),
            accepts_incomplete: true,
            instance_id: instance.id.clone(),
            service_id: instance.service_id.clone(),
            plan_id: instance.plan_id.clone(),
        })
        .await?;

    if !result.is_async {
        debug!("Instance deleted synchronously");
        return Ok(());
    }

    let params = InstanceLastOperationParams {
        server: broker_url.to_string(),
        instance_id: instance.id.clone(),
        last_operation: delete_operation(api_version, instance, result.operation_id),
    };
    let operation = wait_on_operation(|| adapter.instance_last_operation(&params), poll).await?;
    ensure_deleted(format!("instance {:?}", instance.id), operation)
}

/// Delete every binding and instance of the broker at `broker_url`.
///
/// Unless `options.force` is set, `confirm` is handed the instances about to be deleted and
/// cleanup stops with [`BrokerCliError::CleanupCancelled`] when it returns false. Bindings of an
/// instance are deleted before the instance itself; an instance whose bindings could not all be
/// deleted is left in place. Failures are collected per instance and reported together.
#[instrument(skip(adapter, options, confirm))]
pub async fn cleanup_broker<F, Fut>(
    adapter: &HttpAdapter,
    broker_url: &str,
    options: &CleanupOptions,
    confirm: F,
) -> Result<()>
where
    F: FnOnce(Vec<InstanceWithBindings>) -> Fut,
    Fut: Future<Output = bool>,
{
    let instances = list_instances_with_bindings(adapter, broker_url).await?;
    if instances.is_empty() {
        info!("There are no service instances associated with the broker");
        return Ok(());
    }

    if !options.force && !confirm(instances.clone()).await {
        return Err(BrokerCliError::CleanupCancelled);
    }

    let mut failures = CleanupFailures::default();
    for entry in &instances {
        let instance = &entry.instance;

        for binding in &entry.bindings {
            if let Err(e) = delete_binding_and_wait(
                adapter,
                broker_url,
                &options.api_version,
                instance,
                &binding.id,
                &options.poll,
            )
            .await
            {
                warn!(instance = %instance.id, binding = %binding.id, "Failed to delete binding: {}", e);
                failures.0.insert(instance.id.clone(), e);
                break;
            }
        }

        if failures.get(&instance.id).is_some() {
            continue;
        }

        if let Err(e) =
            delete_instance_and_wait(adapter, broker_url, &options.api_version, instance, &options.poll)
                .await
        {
            warn!(instance = %instance.id, "Failed to delete instance: {}", e);
            failures.0.insert(instance.id.clone(), e);
        }
    }

    if failures.is_empty() {
        info!("Deleted {} service instances", instances.len());
        return Ok(());
    }

    if let Ok(remaining) = list_instances_with_bindings(adapter, broker_url).await {
        for entry in &remaining {
            warn!(
                instance = %entry.instance.id,
                bindings = entry.bindings.len(),
                "Service instance is yet to be cleaned up"
            );
        }
    }
    Err(BrokerCliError::Cleanup(failures))
}

fn delete_operation(api_version: &str, instance: &Instance, operation_id: Option<String>) -> LastOperationParams {
    LastOperationParams {
        api_version: api_version.to_string(),
        service_id: instance.service_id.clone(),
        plan_id: instance.plan_id.clone(),
        operation_id: operation_id.unwrap_or_default(),
        operation_type: OperationType::Delete,
    }
}

fn ensure_deleted(resource: String, operation: Operation) -> Result<()> {
    if operation.succeeded() {
        debug!("Deleted {}", resource);
        return Ok(());
    }
    Err(BrokerCliError::DeleteFailed {
        resource,
        state: operation.state.to_string(),
        description: operation.description,
    })
}
