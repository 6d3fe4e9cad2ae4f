// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use super::{BrokerUrlFlags, Context};
use crate::adapter::GetCatalogParams;
use crate::error::Result;
use crate::types::Service;

pub async fn run(ctx: &Context, target: &BrokerUrlFlags) -> Result<()> {
    let target = target.resolve(&ctx.host)?;
    let params = GetCatalogParams {
        server: target.url.clone(),
        api_version: ctx.api_version.clone(),
    };

    let catalog = ctx.adapter.get_catalog(&params).await?;
    if catalog.services.is_empty() {
        println!(
            "Broker {:?} in project {:?} has no associated services",
            target.broker, target.project
        );
        return Ok(());
    }

    println!(
        "Successfully fetched service catalog for broker {:?} within project {:?}!!\n",
        target.broker, target.project
    );
    println!("Services:");
    for (index, service) in catalog.services.iter().enumerate() {
        print_service(index + 1, service);
    }
    Ok(())
}

fn print_service(number: usize, service: &Service) {
    println!("{}. {} ({})", number, service.name, service.id);
    println!("   Description: {}", service.description);
    println!("   Plans:");
    for (index, plan) in service.plans.iter().enumerate() {
        println!("   {}. {} ({})", index + 1, plan.name, plan.id);
        println!("      Description: {}", plan.description);
        println!("      Free: {}", plan.is_free());
        println!("      Bindable: {}\n", service.is_plan_bindable(plan));
    }
    println!();
}
