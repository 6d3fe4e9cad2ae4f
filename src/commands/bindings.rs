// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use clap::{Args, Subcommand};
use tracing::info;

use super::{
    action, ensure_succeeded, parse_json_object, wait_interruptible, AsyncFlags, BrokerUrlFlags,
    Context,
};
use crate::adapter::{
    BindingLastOperationParams, CreateBindingParams, DeleteBindingParams, LastOperationParams,
};
use crate::error::Result;
use crate::types::{Operation, OperationType};

#[derive(Subcommand, Debug)]
pub enum BindingsCommand {
    /// Create a service binding
    Create(CreateArgs),
    /// Delete a service binding
    Delete(DeleteArgs),
    /// Poll the operation for the service binding
    Poll(PollArgs),
}

/// The binding a command acts on
#[derive(Args, Debug, Clone)]
pub struct BindingRef {
    #[command(flatten)]
    pub target: BrokerUrlFlags,
    /// Service instance ID
    #[arg(short, long)]
    pub instance: String,
    /// Service binding ID
    #[arg(short = 'd', long)]
    pub binding: String,
    /// Service ID
    #[arg(short = 'r', long, default_value = "")]
    pub service: String,
    /// Plan ID
    #[arg(short = 'l', long, default_value = "")]
    pub plan: String,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub binding: BindingRef,
    #[command(flatten)]
    pub flags: AsyncFlags,
    /// Platform context, as a JSON object
    #[arg(short = 't', long)]
    pub context: Option<String>,
    /// Resource the binding is for, as a JSON object
    #[arg(short = 'e', long)]
    pub bind_resource: Option<String>,
    /// GUID of the application the binding is for
    #[arg(short = 'g', long = "app", default_value = "")]
    pub app_guid: String,
    /// Parameters for the binding, as a JSON object
    #[arg(short = 'm', long)]
    pub parameters: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub binding: BindingRef,
    #[command(flatten)]
    pub flags: AsyncFlags,
}

#[derive(Args, Debug)]
pub struct PollArgs {
    #[command(flatten)]
    pub binding: BindingRef,
    /// Operation ID returned by the broker
    #[arg(short, long, default_value = "")]
    pub operation: String,
}

pub async fn run(ctx: &Context, command: BindingsCommand) -> Result<()> {
    match command {
        BindingsCommand::Create(args) => create(ctx, &args).await,
        BindingsCommand::Delete(args) => delete(ctx, &args).await,
        BindingsCommand::Poll(args) => poll(ctx, &args).await,
    }
}

async fn create(ctx: &Context, args: &CreateArgs) -> Result<()> {
    let binding = &args.binding;
    let server = binding.target.resolve(&ctx.host)?.url;
    let params = CreateBindingParams {
        server: server.clone(),
        api_version: ctx.api_version.clone(),
        accepts_incomplete: args.flags.asynchronous,
        instance_id: binding.instance.clone(),
        binding_id: binding.binding.clone(),
        service_id: binding.service.clone(),
        plan_id: binding.plan.clone(),
        context: parse_json_object("context", args.context.as_deref())?,
        app_guid: args.app_guid.clone(),
        bind_resource: parse_json_object("bind-resource", args.bind_resource.as_deref())?,
        parameters: parse_json_object("parameters", args.parameters.as_deref())?,
    };

    let result = ctx.adapter.create_binding(&params).await?;
    if !result.is_async {
        println!("Successfully created the binding {}: {:?}", binding.binding, result);
        return Ok(());
    }
    if !args.flags.wait {
        println!("Successfully started the operation to create the binding {}: {:?}", binding.binding, result);
        return Ok(());
    }

    let operation_id = result.operation_id.unwrap_or_default();
    let op = wait_for_binding(ctx, &server, binding, &operation_id, OperationType::Create, args.flags.timeout).await?;
    println!(
        "Created the binding {} asynchronously (operation {:?}): {}",
        binding.binding, operation_id, op
    );
    Ok(())
}

async fn delete(ctx: &Context, args: &DeleteArgs) -> Result<()> {
    let binding = &args.binding;
    let server = binding.target.resolve(&ctx.host)?.url;
    let params = DeleteBindingParams {
        server: server.clone(),
        api_version: ctx.api_version.clone(),
        accepts_incomplete: args.flags.asynchronous,
        instance_id: binding.instance.clone(),
        binding_id: binding.binding.clone(),
        service_id: binding.service.clone(),
        plan_id: binding.plan.clone(),
    };

    let result = ctx.adapter.delete_binding(&params).await?;
    if !result.is_async {
        println!("Successfully deleted the binding {}", binding.binding);
        return Ok(());
    }
    if !args.flags.wait {
        println!("Successfully started the operation to delete the binding {}: {:?}", binding.binding, result);
        return Ok(());
    }

    let operation_id = result.operation_id.unwrap_or_default();
    let op = wait_for_binding(ctx, &server, binding, &operation_id, OperationType::Delete, args.flags.timeout).await?;
    println!(
        "Deleted the binding {} asynchronously (operation {:?}): {}",
        binding.binding, operation_id, op
    );
    Ok(())
}

async fn poll(ctx: &Context, args: &PollArgs) -> Result<()> {
    let binding = &args.binding;
    let server = binding.target.resolve(&ctx.host)?.url;
    let params = last_operation_params(ctx, &server, binding, &args.operation, OperationType::Unknown);

    let op = ctx.adapter.binding_last_operation(&params).await?;
    println!(
        "Successfully polled the operation {:?} for binding {} to instance {} in broker {}: {}",
        args.operation, binding.binding, binding.instance, server, op
    );
    Ok(())
}

async fn wait_for_binding(
    ctx: &Context,
    server: &str,
    binding: &BindingRef,
    operation_id: &str,
    operation_type: OperationType,
    timeout: Option<u64>,
) -> Result<Operation> {
    info!(binding = %binding.binding, operation = operation_id, "Waiting for operation to finish");
    let params = last_operation_params(ctx, server, binding, operation_id, operation_type);
    let op = wait_interruptible(
        || ctx.adapter.binding_last_operation(&params),
        &ctx.poll_options(timeout),
    )
    .await?;
    ensure_succeeded(
        format!(
            "{} binding {:?} to instance {:?}",
            action(operation_type),
            binding.binding,
            binding.instance
        ),
        op,
    )
}

fn last_operation_params(
    ctx: &Context,
    server: &str,
    binding: &BindingRef,
    operation_id: &str,
    operation_type: OperationType,
) -> BindingLastOperationParams {
    BindingLastOperationParams {
        server: server.to_string(),
        instance_id: binding.instance.clone(),
        binding_id: binding.binding.clone(),
        last_operation: LastOperationParams {
            api_version: ctx.api_version.clone(),
            service_id: binding.service.clone(),
            plan_id: binding.plan.clone(),
            operation_id: operation_id.to_string(),
            operation_type,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BrokerCliError;
    use crate::test_utils::{operation_json, MockTransport};

    const SERVER: &str = "https://broker.example.com/v1beta1/projects/p/brokers/b";
    const BINDING_PATH: &str = "/v1beta1/projects/p/brokers/b/v2/service_instances/i1/service_bindings/b1";

    fn context(mock: &MockTransport) -> Context {
        Context {
            adapter: mock.adapter(),
            host: "https://registry.example.com".to_string(),
            api_version: "2.13".to_string(),
            show_progress: false,
        }
    }

    fn binding_ref() -> BindingRef {
        BindingRef {
            target: BrokerUrlFlags {
                server: Some(SERVER.to_string()),
                ..Default::default()
            },
            instance: "i1".to_string(),
            binding: "b1".to_string(),
            service: "svc".to_string(),
            plan: "plan".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_sends_bind_resource() {
        let mock = MockTransport::new().on_put(BINDING_PATH, 201, r#"{"credentials":{"user":"u"}}"#);
        let args = CreateArgs {
            binding: binding_ref(),
            flags: AsyncFlags::default(),
            context: None,
            bind_resource: Some(r#"{"app_guid":"app"}"#.to_string()),
            app_guid: "app".to_string(),
            parameters: None,
        };

        create(&context(&mock), &args).await.unwrap();

        let body = mock.requests()[0].body_json();
        assert_eq!(body["bind_resource"]["app_guid"], "app");
        assert_eq!(body["app_guid"], "app");
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_and_wait_until_gone() {
        let mock = MockTransport::new()
            .on_delete(BINDING_PATH, 202, r#"{"operation":"op-d"}"#)
            .on_get(&format!("{}/last_operation", BINDING_PATH), 410, "{}");
        let args = DeleteArgs {
            binding: binding_ref(),
            flags: AsyncFlags {
                asynchronous: true,
                wait: true,
                timeout: Some(10),
            },
        };

        delete(&context(&mock), &args).await.unwrap();

        assert_eq!(mock.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_and_wait_reports_failed_operation() {
        let mock = MockTransport::new()
            .on_delete(BINDING_PATH, 202, r#"{"operation":"op-d"}"#)
            .on_get(
                &format!("{}/last_operation", BINDING_PATH),
                200,
                &operation_json("failed", "binding is in use"),
            );
        let args = DeleteArgs {
            binding: binding_ref(),
            flags: AsyncFlags {
                asynchronous: true,
                wait: true,
                timeout: Some(10),
            },
        };

        let err = delete(&context(&mock), &args).await.unwrap_err();

        match err {
            BrokerCliError::OperationFailed {
                resource,
                state,
                description,
            } => {
                assert_eq!(resource, "deleting binding \"b1\" to instance \"i1\"");
                assert_eq!(state, "failed");
                assert_eq!(description, "binding is in use");
            }
            other => panic!("expected a failed operation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_poll_gone_is_an_error() {
        let mock = MockTransport::new().on_get(&format!("{}/last_operation", BINDING_PATH), 410, "{}");
        let args = PollArgs {
            binding: binding_ref(),
            operation: String::new(),
        };

        let err = poll(&context(&mock), &args).await.unwrap_err();

        match err {
            BrokerCliError::Broker(e) => assert_eq!(e.description, "binding doesn't exist"),
            other => panic!("expected a broker error, got {:?}", other),
        }
    }
}
