// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};

use super::JsonObject;

/// A service offered in a broker's catalog
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Service {
    pub name: String,
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Permissions a user has to grant the service in order to provision it
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    /// Default for the `bindable` property of the service's plans
    #[serde(default)]
    pub bindable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_client: Option<DashboardClient>,
    /// True iff the service supports up/downgrade of some plans
    #[serde(default)]
    pub plan_updateable: bool,
    #[serde(default)]
    pub plans: Vec<Plan>,
}

impl Service {
    /// Whether a plan of this service can be bound to, falling back to the service default
    pub fn is_plan_bindable(&self, plan: &Plan) -> bool {
        plan.bindable.unwrap_or(self.bindable)
    }

    pub fn find_plan(&self, plan_id: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.id == plan_id)
    }
}

/// A plan of a catalog service
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Plan {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bindable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemas: Option<Schemas>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonObject>,
}

impl Plan {
    /// Plans are free unless the broker says otherwise
    pub fn is_free(&self) -> bool {
        self.free.unwrap_or(true)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Schemas {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_instance: Option<ServiceInstanceSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_binding: Option<ServiceBindingSchema>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ServiceInstanceSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<JsonObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<JsonObject>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ServiceBindingSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<JsonObject>,
}

/// OAuth client used by a service dashboard
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DashboardClient {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_service(bindable: bool, plan_bindable: Option<bool>) -> Service {
        Service {
            name: "pubsub".to_string(),
            id: "svc".to_string(),
            bindable,
            plans: vec![Plan {
                id: "plan".to_string(),
                name: "pubsub-plan".to_string(),
                bindable: plan_bindable,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_plan_bindable_falls_back_to_service() {
        let service = make_service(true, None);
        let plan = service.find_plan("plan").unwrap();
        assert!(service.is_plan_bindable(plan));
    }

    #[test]
    fn test_plan_bindable_overrides_service() {
        let service = make_service(true, Some(false));
        let plan = service.find_plan("plan").unwrap();
        assert!(!service.is_plan_bindable(plan));
    }

    #[test]
    fn test_plan_free_defaults_to_true() {
        let plan = Plan::default();
        assert!(plan.is_free());

        let paid = Plan {
            free: Some(false),
            ..Default::default()
        };
        assert!(!paid.is_free());
    }

    #[test]
    fn test_service_tolerates_missing_optional_fields() {
        let service: Service =
            serde_json::from_str(r#"{"name":"n","id":"i","plans":[{"id":"p","name":"pn"}]}"#)
                .unwrap();

        assert!(service.tags.is_empty());
        assert!(!service.plan_updateable);
        assert!(service.dashboard_client.is_none());
        assert_eq!(service.plans[0].description, "");
    }
}
