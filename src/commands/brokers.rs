// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use std::io::{self, BufRead};

use clap::{Args, Subcommand};
use tracing::{error, warn};

use super::instances::print_instances;
use super::Context;
use crate::adapter::{CreateBrokerParams, DeleteBrokerParams, ListBrokersParams};
use crate::broker_url::construct_broker_url;
use crate::cleanup::{cleanup_broker, CleanupOptions, InstanceWithBindings};
use crate::error::Result;
use crate::types::Broker;

#[derive(Subcommand, Debug)]
pub enum BrokersCommand {
    /// Create a service broker
    Create {
        #[command(flatten)]
        broker: BrokerName,
        /// Title of the broker, defaults to its name
        #[arg(short, long)]
        title: Option<String>,
    },
    /// Delete a service broker
    Delete {
        #[command(flatten)]
        broker: BrokerName,
        /// Delete all service instances and bindings before deleting the broker
        #[arg(long)]
        cleanup: bool,
        /// Do not ask for confirmation before the cleanup
        #[arg(short, long)]
        force: bool,
    },
    /// Delete all service instances and bindings within a broker
    Cleanup {
        #[command(flatten)]
        broker: BrokerName,
        /// Do not ask for confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// List service brokers in a project
    List {
        /// The GCP project to use
        #[arg(short, long)]
        project: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct BrokerName {
    /// The GCP project to use
    #[arg(short, long)]
    pub project: String,
    /// Name of the broker
    #[arg(short, long)]
    pub broker: String,
}

pub async fn run(ctx: &Context, command: BrokersCommand) -> Result<()> {
    match command {
        BrokersCommand::Create { broker, title } => create(ctx, &broker, title).await,
        BrokersCommand::Delete {
            broker,
            cleanup,
            force,
        } => {
            if cleanup {
                clean(ctx, &broker, force).await?;
            }
            delete(ctx, &broker).await
        }
        BrokersCommand::Cleanup { broker, force } => {
            clean(ctx, &broker, force).await?;
            println!(
                "Successfully cleaned up broker {:?} in project {:?}!!",
                broker.broker, broker.project
            );
            Ok(())
        }
        BrokersCommand::List { project } => list(ctx, &project).await,
    }
}

async fn create(ctx: &Context, name: &BrokerName, title: Option<String>) -> Result<()> {
    let params = CreateBrokerParams {
        host: ctx.host.clone(),
        project: name.project.clone(),
        name: name.broker.clone(),
        title: title.unwrap_or_else(|| name.broker.clone()),
    };

    let broker = ctx.adapter.create_broker(&params).await?;
    println!(
        "Successfully created broker {:?} in project {:?}!!",
        name.broker, name.project
    );
    print_broker_details(&broker);
    Ok(())
}

async fn delete(ctx: &Context, name: &BrokerName) -> Result<()> {
    let params = DeleteBrokerParams {
        broker_url: construct_broker_url(&ctx.host, &name.project, &name.broker),
    };

    ctx.adapter.delete_broker(&params).await?;
    println!(
        "Successfully deleted broker {:?} in project {:?}!!",
        name.broker, name.project
    );
    Ok(())
}

async fn clean(ctx: &Context, name: &BrokerName, force: bool) -> Result<()> {
    let broker_url = construct_broker_url(&ctx.host, &name.project, &name.broker);
    let options = CleanupOptions {
        api_version: ctx.api_version.clone(),
        force,
        poll: ctx.poll_options(None),
    };

    let prompt_url = broker_url.clone();
    cleanup_broker(&ctx.adapter, &broker_url, &options, |instances| async move {
        tokio::task::spawn_blocking(move || confirm_cleanup(&prompt_url, &instances, io::stdin().lock()))
            .await
            .unwrap_or_else(|e| {
                warn!("Confirmation prompt failed: {}", e);
                false
            })
    })
    .await
    .inspect_err(|e| error!("Failed to cleanup broker {:?}: {}", broker_url, e))
}

async fn list(ctx: &Context, project: &str) -> Result<()> {
    let params = ListBrokersParams {
        host: ctx.host.clone(),
        project: project.to_string(),
    };

    let result = ctx.adapter.list_brokers(&params).await?;
    if result.brokers.is_empty() {
        println!("Project {:?} has no associated brokers", project);
        return Ok(());
    }

    println!("Successfully listed brokers in project {:?}!!\n", project);
    for (index, broker) in result.brokers.iter().enumerate() {
        println!("{}. {} ({})", index + 1, broker.short_name(), broker.name);
        print_broker_details(broker);
        println!();
    }
    Ok(())
}

fn print_broker_details(broker: &Broker) {
    if !broker.title.is_empty() {
        println!("   Title: {}", broker.title);
    }
    println!("   URL: {}", broker.url.as_deref().unwrap_or("<none>"));
    println!(
        "   Create time: {}",
        broker.create_time.as_deref().unwrap_or("<none>")
    );
}

/// Show what is about to be deleted and read the answer from `input`. Only `y` or `Y` confirms.
fn confirm_cleanup(broker_url: &str, instances: &[InstanceWithBindings], mut input: impl BufRead) -> bool {
    println!(
        "The following service instances in broker {:?} will be deleted",
        broker_url
    );
    print_instances(instances);
    println!("Enter y/Y to continue or anything else to quit");

    let mut response = String::new();
    if input.read_line(&mut response).is_err() {
        return false;
    }
    matches!(response.trim(), "y" | "Y")
}
