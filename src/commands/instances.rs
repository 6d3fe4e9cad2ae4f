// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use clap::{Args, Subcommand};
use tracing::info;

use super::{
    action, ensure_succeeded, parse_json_object, wait_interruptible, AsyncFlags, BrokerUrlFlags,
    Context,
};
use crate::adapter::{
    CreateInstanceParams, DeleteInstanceParams, InstanceLastOperationParams, LastOperationParams,
    UpdateInstanceParams,
};
use crate::cleanup::{list_instances_with_bindings, InstanceWithBindings};
use crate::error::Result;
use crate::types::{Operation, OperationType};

#[derive(Subcommand, Debug)]
pub enum InstancesCommand {
    /// Create a service instance
    Create(CreateArgs),
    /// List service instances in a broker
    List {
        #[command(flatten)]
        target: BrokerUrlFlags,
    },
    /// Delete a service instance
    Delete(DeleteArgs),
    /// Update a service instance
    Update(UpdateArgs),
    /// Poll the operation for the service instance
    Poll(PollArgs),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub target: BrokerUrlFlags,
    #[command(flatten)]
    pub flags: AsyncFlags,
    /// Service instance ID
    #[arg(short, long)]
    pub instance: String,
    /// Service ID
    #[arg(short = 'r', long)]
    pub service: String,
    /// Plan ID
    #[arg(short = 'l', long)]
    pub plan: String,
    /// CF organization GUID
    #[arg(long, default_value = "")]
    pub organization: String,
    /// CF space GUID
    #[arg(long, default_value = "")]
    pub space: String,
    /// Parameters for the instance, as a JSON object
    #[arg(short = 'm', long)]
    pub parameters: Option<String>,
    /// Platform context, as a JSON object
    #[arg(short = 't', long)]
    pub context: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub target: BrokerUrlFlags,
    #[command(flatten)]
    pub flags: AsyncFlags,
    #[arg(short, long)]
    pub instance: String,
    #[arg(short = 'r', long, default_value = "")]
    pub service: String,
    #[arg(short = 'l', long, default_value = "")]
    pub plan: String,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub target: BrokerUrlFlags,
    #[command(flatten)]
    pub flags: AsyncFlags,
    #[arg(short, long)]
    pub instance: String,
    #[arg(short = 'r', long)]
    pub service: String,
    /// New plan ID, keeps the current plan when not given
    #[arg(short = 'l', long, default_value = "")]
    pub plan: String,
    #[arg(short = 'm', long)]
    pub parameters: Option<String>,
    #[arg(short = 't', long)]
    pub context: Option<String>,
    /// Service ID before the update
    #[arg(long, default_value = "")]
    pub old_service: String,
    /// Plan ID before the update
    #[arg(long, default_value = "")]
    pub old_plan: String,
    /// Organization GUID before the update
    #[arg(long, default_value = "")]
    pub old_organization: String,
    /// Space GUID before the update
    #[arg(long, default_value = "")]
    pub old_space: String,
}

#[derive(Args, Debug)]
pub struct PollArgs {
    #[command(flatten)]
    pub target: BrokerUrlFlags,
    #[arg(short, long)]
    pub instance: String,
    #[arg(short = 'r', long, default_value = "")]
    pub service: String,
    #[arg(short = 'l', long, default_value = "")]
    pub plan: String,
    /// Operation ID returned by the broker
    #[arg(short, long, default_value = "")]
    pub operation: String,
}

pub async fn run(ctx: &Context, command: InstancesCommand) -> Result<()> {
    match command {
        InstancesCommand::Create(args) => create(ctx, &args).await,
        InstancesCommand::List { target } => list(ctx, &target).await,
        InstancesCommand::Delete(args) => delete(ctx, &args).await,
        InstancesCommand::Update(args) => update(ctx, &args).await,
        InstancesCommand::Poll(args) => poll(ctx, &args).await,
    }
}

async fn create(ctx: &Context, args: &CreateArgs) -> Result<()> {
    let target = args.target.resolve(&ctx.host)?;
    let params = CreateInstanceParams {
        server: target.url.clone(),
        api_version: ctx.api_version.clone(),
        accepts_incomplete: args.flags.asynchronous,
        instance_id: args.instance.clone(),
        service_id: args.service.clone(),
        plan_id: args.plan.clone(),
        context: parse_json_object("context", args.context.as_deref())?,
        organization_guid: args.organization.clone(),
        space_guid: args.space.clone(),
        parameters: parse_json_object("parameters", args.parameters.as_deref())?,
    };

    let result = ctx.adapter.create_instance(&params).await?;
    if !result.is_async {
        println!("Successfully created the instance {}: {:?}", args.instance, result);
        return Ok(());
    }
    if !args.flags.wait {
        println!("Successfully started the operation to create instance {}: {:?}", args.instance, result);
        return Ok(());
    }

    let operation_id = result.operation_id.unwrap_or_default();
    let op = wait_for_instance(
        ctx,
        &target.url,
        &args.instance,
        &args.service,
        &args.plan,
        &operation_id,
        OperationType::Create,
        args.flags.timeout,
    )
    .await?;
    println!(
        "Created the instance {} asynchronously (operation {:?}): {}",
        args.instance, operation_id, op
    );
    Ok(())
}

async fn list(ctx: &Context, target: &BrokerUrlFlags) -> Result<()> {
    let target = target.resolve(&ctx.host)?;
    let instances = list_instances_with_bindings(&ctx.adapter, &target.url).await?;
    if instances.is_empty() {
        println!(
            "Broker {:?} in project {:?} has no associated instances",
            target.broker, target.project
        );
        return Ok(());
    }

    println!(
        "Successfully listed service instances in broker {:?} within project {:?}!!\n",
        target.broker, target.project
    );
    print_instances(&instances);
    Ok(())
}

pub fn print_instances(instances: &[InstanceWithBindings]) {
    for (index, entry) in instances.iter().enumerate() {
        println!("{}. Instance ID: {}", index + 1, entry.instance.id);
        println!(
            "   Service ID: {}, Plan ID: {}",
            entry.instance.service_id, entry.instance.plan_id
        );
        println!("   Number of bindings: {}\n", entry.bindings.len());
    }
}

async fn delete(ctx: &Context, args: &DeleteArgs) -> Result<()> {
    let target = args.target.resolve(&ctx.host)?;
    let params = DeleteInstanceParams {
        server: target.url.clone(),
        api_version: ctx.api_version.clone(),
        accepts_incomplete: args.flags.asynchronous,
        instance_id: args.instance.clone(),
        service_id: args.service.clone(),
        plan_id: args.plan.clone(),
    };

    let result = ctx.adapter.delete_instance(&params).await?;
    if !result.is_async {
        println!("Successfully deleted the instance {}", args.instance);
        return Ok(());
    }
    if !args.flags.wait {
        println!("Successfully started the operation to delete instance {}: {:?}", args.instance, result);
        return Ok(());
    }

    let operation_id = result.operation_id.unwrap_or_default();
    let op = wait_for_instance(
        ctx,
        &target.url,
        &args.instance,
        &args.service,
        &args.plan,
        &operation_id,
        OperationType::Delete,
        args.flags.timeout,
    )
    .await?;
    println!(
        "Deleted the instance {} asynchronously (operation {:?}): {}",
        args.instance, operation_id, op
    );
    Ok(())
}

async fn update(ctx: &Context, args: &UpdateArgs) -> Result<()> {
    let target = args.target.resolve(&ctx.host)?;
    let params = UpdateInstanceParams {
        server: target.url.clone(),
        api_version: ctx.api_version.clone(),
        accepts_incomplete: args.flags.asynchronous,
        instance_id: args.instance.clone(),
        service_id: args.service.clone(),
        plan_id: args.plan.clone(),
        context: parse_json_object("context", args.context.as_deref())?,
        parameters: parse_json_object("parameters", args.parameters.as_deref())?,
        previous_service_id: args.old_service.clone(),
        previous_plan_id: args.old_plan.clone(),
        previous_organization_id: args.old_organization.clone(),
        previous_space_id: args.old_space.clone(),
    };

    let result = ctx.adapter.update_instance(&params).await?;
    if !result.is_async {
        println!("Successfully updated the instance {}", args.instance);
        return Ok(());
    }
    if !args.flags.wait {
        println!("Successfully started the operation to update instance {}: {:?}", args.instance, result);
        return Ok(());
    }

    let operation_id = result.operation_id.unwrap_or_default();
    let op = wait_for_instance(
        ctx,
        &target.url,
        &args.instance,
        &args.service,
        &args.plan,
        &operation_id,
        OperationType::Update,
        args.flags.timeout,
    )
    .await?;
    println!(
        "Updated the instance {} asynchronously (operation {:?}): {}",
        args.instance, operation_id, op
    );
    Ok(())
}

async fn poll(ctx: &Context, args: &PollArgs) -> Result<()> {
    let target = args.target.resolve(&ctx.host)?;
    let params = InstanceLastOperationParams {
        server: target.url.clone(),
        instance_id: args.instance.clone(),
        last_operation: LastOperationParams {
            api_version: ctx.api_version.clone(),
            service_id: args.service.clone(),
            plan_id: args.plan.clone(),
            operation_id: args.operation.clone(),
            operation_type: OperationType::Unknown,
        },
    };

    let op = ctx.adapter.instance_last_operation(&params).await?;
    println!(
        "Successfully polled the operation {:?} for instance {} in broker {}: {}",
        args.operation, args.instance, target.url, op
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn wait_for_instance(
    ctx: &Context,
    server: &str,
    instance_id: &str,
    service_id: &str,
    plan_id: &str,
    operation_id: &str,
    operation_type: OperationType,
    timeout: Option<u64>,
) -> Result<Operation> {
    info!(instance = instance_id, operation = operation_id, "Waiting for operation to finish");
    let params = InstanceLastOperationParams {
        server: server.to_string(),
        instance_id: instance_id.to_string(),
        last_operation: LastOperationParams {
            api_version: ctx.api_version.clone(),
            service_id: service_id.to_string(),
            plan_id: plan_id.to_string(),
            operation_id: operation_id.to_string(),
            operation_type,
        },
    };
    let op = wait_interruptible(
        || ctx.adapter.instance_last_operation(&params),
        &ctx.poll_options(timeout),
    )
    .await?;
    ensure_succeeded(format!("{} instance {:?}", action(operation_type), instance_id), op)
}
