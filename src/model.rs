// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A subscription as listed by the subscriptions API.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Subscription identifier (GUID).
    #[serde(rename = "subscriptionId")]
    pub id: String,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub tenant_id: Option<String>,
}

impl Subscription {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            state: None,
            tenant_id: None,
        }
    }

    /// Display name, falling back to the id.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }
}

/// Type string the management groups API uses for subscription children.
pub const SUBSCRIPTION_CHILD_TYPE: &str = "/subscriptions";

/// A node below a management group. Either a nested group or a subscription.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ManagementGroupChild {
    pub id: String,

    #[serde(rename = "type", default)]
    pub child_type: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub children: Vec<ManagementGroupChild>,
}

impl ManagementGroupChild {
    pub fn is_subscription(&self) -> bool {
        self.child_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(SUBSCRIPTION_CHILD_TYPE))
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ManagementGroup {
    /// Either a bare name or a fully qualified resource path.
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub children: Vec<ManagementGroupChild>,
}

impl ManagementGroup {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            display_name: None,
            children: vec![],
        }
    }

    pub fn with_children(mut self, children: Vec<ManagementGroupChild>) -> Self {
        self.children = children;
        self
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PolicyAssignment {
    #[serde(default)]
    pub id: Option<String>,

    pub name: String,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub scope: Option<String>,

    /// Scopes excluded from the assignment. `null` and absent both mean none.
    #[serde(default, deserialize_with = "deserialize_not_scopes")]
    pub not_scopes: Vec<String>,

    #[serde(default)]
    pub parameters: IndexMap<String, ParameterValue>,
}

impl PolicyAssignment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_not_scopes<I, S>(mut self, not_scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.not_scopes = not_scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Display name, falling back to the assignment name.
    pub fn title(&self) -> &str {
        match self.display_name.as_deref() {
            Some(d) if !d.is_empty() => d,
            _ => &self.name,
        }
    }
}

fn deserialize_not_scopes<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Value of a policy assignment parameter.
///
/// The assignments API returns parameters either wrapped as `{ "value": ... }`
/// or as bare values. Every JSON value maps onto exactly one variant.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum ParameterValue {
    /// String, number, bool or null.
    Scalar(serde_json::Value),
    /// Array or object.
    Collection(serde_json::Value),
    /// The `{ "value": ... }` wrapper.
    Named(Box<ParameterValue>),
}

impl ParameterValue {
    /// The underlying value with all `Named` wrappers removed.
    pub fn resolved(&self) -> &ParameterValue {
        let mut v = self;
        while let ParameterValue::Named(inner) = v {
            v = inner;
        }
        v
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.resolved(), ParameterValue::Collection(_))
    }

    /// JSON form of the resolved value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ParameterValue::Scalar(v) | ParameterValue::Collection(v) => v.clone(),
            ParameterValue::Named(inner) => inner.to_json(),
        }
    }
}

impl From<serde_json::Value> for ParameterValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(mut map) if map.len() == 1 && map.contains_key("value") => {
                match map.remove("value") {
                    Some(inner) => ParameterValue::Named(Box::new(inner.into())),
                    None => ParameterValue::Collection(serde_json::Value::Object(map)),
                }
            }
            v @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
                ParameterValue::Collection(v)
            }
            v => ParameterValue::Scalar(v),
        }
    }
}

impl From<ParameterValue> for serde_json::Value {
    fn from(value: ParameterValue) -> Self {
        match value {
            ParameterValue::Scalar(v) | ParameterValue::Collection(v) => v,
            ParameterValue::Named(inner) => {
                let mut map = serde_json::Map::new();
                map.insert("value".to_string(), (*inner).into());
                serde_json::Value::Object(map)
            }
        }
    }
}
