// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};

/// A service broker registered in a project.
///
/// `url` and `create_time` are assigned by the registry and are never sent on creation.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Broker {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
}

impl Broker {
    /// Resource name of a broker in the registry
    pub fn resource_name(project: &str, name: &str) -> String {
        format!("projects/{}/brokers/{}", project, name)
    }

    /// Short broker name, the last segment of the resource name
    pub fn short_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// A service instance as reported by the broker's instance listing
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Instance {
    #[serde(rename = "instance_id")]
    pub id: String,
    #[serde(default)]
    pub service_id: String,
    #[serde(default)]
    pub plan_id: String,
    #[serde(rename = "createTime", default)]
    pub create_time: String,
}

/// A service binding as reported by the broker's binding listing
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Binding {
    #[serde(rename = "binding_id")]
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_name() {
        assert_eq!(
            Broker::resource_name("my-project", "my-broker"),
            "projects/my-project/brokers/my-broker"
        );
    }

    #[test]
    fn test_short_name() {
        let broker = Broker {
            name: "projects/p/brokers/b".to_string(),
            ..Default::default()
        };
        assert_eq!(broker.short_name(), "b");
    }

    #[test]
    fn test_broker_omits_server_assigned_fields() {
        let broker = Broker {
            name: "projects/p/brokers/b".to_string(),
            title: "B".to_string(),
            url: None,
            create_time: None,
        };

        let json = serde_json::to_value(&broker).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"name": "projects/p/brokers/b", "title": "B"})
        );
    }

    #[test]
    fn test_instance_wire_names() {
        let instance: Instance = serde_json::from_str(
            r#"{"instance_id":"i1","service_id":"s1","plan_id":"p1","createTime":"2018-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(instance.id, "i1");
        assert_eq!(instance.service_id, "s1");
        assert_eq!(instance.plan_id, "p1");
        assert_eq!(instance.create_time, "2018-01-01T00:00:00Z");
    }
}
