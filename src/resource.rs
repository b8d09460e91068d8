//! Typed schema of the `consul_acl` resource.
//!
//! Raw attribute objects are validated once into [`AclConfig`]; everything
//! downstream works with typed values only.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::providers::consul::{ACL_TYPES, AclEntry, AclType};

pub const RESOURCE_TYPE: &str = "consul_acl";

#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("expected type to be one of [client management], got '{value}'")]
    InvalidType { value: String },

    #[error("unsupported attribute '{name}'")]
    UnknownAttribute { name: String },

    #[error("attribute '{name}' must be a string")]
    NotAString { name: String },

    #[error("resource configuration must be an object")]
    Malformed,
}

/// Desired configuration of one ACL, as written by the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AclConfig {
    pub acl_id: Option<String>,
    pub name: Option<String>,
    pub acl_type: AclType,
    pub rules: Option<String>,
}

impl AclConfig {
    /// Validates a raw attribute object such as `{"name": "web", "type": "client"}`.
    ///
    /// Empty strings and nulls count as unset.
    pub fn from_value(value: serde_json::Value) -> Result<Self, SchemaError> {
        let serde_json::Value::Object(attributes) = value else {
            return Err(SchemaError::Malformed);
        };

        let mut config = AclConfig::default();

        for (name, value) in attributes {
            let value = match value {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) if s.is_empty() => None,
                serde_json::Value::String(s) => Some(s),
                _ => return Err(SchemaError::NotAString { name }),
            };

            match name.as_str() {
                "acl_id" => config.acl_id = value,
                "name" => config.name = value,
                "rules" => config.rules = value,
                "type" => {
                    if let Some(value) = value {
                        config.acl_type = value.parse()?;
                    }
                }
                _ => return Err(SchemaError::UnknownAttribute { name }),
            }
        }

        Ok(config)
    }

    /// Payload for `/v1/acl/create`: only attributes that were set.
    pub fn to_entry(&self) -> AclEntry {
        AclEntry {
            id: self.acl_id.clone().unwrap_or_default(),
            name: self.name.clone().unwrap_or_default(),
            acl_type: self.acl_type,
            rules: self.rules.clone().unwrap_or_default(),
            ..Default::default()
        }
    }
}

/// Confirmed remote state of an ACL after a refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AclState {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub acl_type: AclType,
    pub rules: String,
}

impl AclState {
    pub fn from_entry(id: &str, entry: AclEntry) -> Self {
        Self {
            id: id.to_string(),
            name: entry.name,
            acl_type: entry.acl_type,
            rules: entry.rules,
        }
    }

    /// Configuration that would reproduce this state unchanged.
    pub fn to_config(&self) -> AclConfig {
        AclConfig {
            acl_id: None,
            name: Some(self.name.clone()).filter(|s| !s.is_empty()),
            acl_type: self.acl_type,
            rules: Some(self.rules.clone()).filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AclChange {
    Name { old: String, new: String },
    Type { old: AclType, new: AclType },
    Rules { old: String, new: String },
}

impl AclChange {
    pub fn attribute(&self) -> &'static str {
        match self {
            AclChange::Name { .. } => "name",
            AclChange::Type { .. } => "type",
            AclChange::Rules { .. } => "rules",
        }
    }

    fn apply_to(&self, entry: &mut AclEntry) {
        match self {
            AclChange::Name { new, .. } => entry.name = new.clone(),
            AclChange::Type { new, .. } => entry.acl_type = *new,
            AclChange::Rules { new, .. } => entry.rules = new.clone(),
        }
    }
}

impl fmt::Display for AclChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AclChange::Name { old, new } => write!(f, "name: {:?} -> {:?}", old, new),
            AclChange::Type { old, new } => write!(f, "type: {} -> {}", old, new),
            AclChange::Rules { old, new } => write!(
                f,
                "rules: {} lines -> {} lines",
                old.lines().count(),
                new.lines().count()
            ),
        }
    }
}

/// Field-level deltas between a refreshed state and a desired configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AclChanges(Vec<AclChange>);

impl AclChanges {
    pub fn between(prior: &AclState, desired: &AclConfig) -> Self {
        let mut changes = Vec::new();

        let name = desired.name.clone().unwrap_or_default();
        if prior.name != name {
            changes.push(AclChange::Name {
                old: prior.name.clone(),
                new: name,
            });
        }

        if prior.acl_type != desired.acl_type {
            changes.push(AclChange::Type {
                old: prior.acl_type,
                new: desired.acl_type,
            });
        }

        let rules = desired.rules.clone().unwrap_or_default();
        if prior.rules != rules {
            changes.push(AclChange::Rules {
                old: prior.rules.clone(),
                new: rules,
            });
        }

        Self(changes)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AclChange> {
        self.0.iter()
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.0.iter().any(|c| c.attribute() == attribute)
    }

    /// Overlays the changed fields onto an entry fetched from Consul.
    pub fn apply_to(&self, entry: &mut AclEntry) {
        for change in &self.0 {
            change.apply_to(entry);
        }
    }
}

impl From<Vec<AclChange>> for AclChanges {
    fn from(changes: Vec<AclChange>) -> Self {
        Self(changes)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSchema {
    pub name: &'static str,
    pub kind: &'static str,
    pub optional: bool,
    pub default: Option<&'static str>,
    pub allowed: &'static [&'static str],
}

pub fn schema() -> Vec<AttributeSchema> {
    vec![
        AttributeSchema {
            name: "acl_id",
            kind: "string",
            optional: true,
            default: None,
            allowed: &[],
        },
        AttributeSchema {
            name: "name",
            kind: "string",
            optional: true,
            default: None,
            allowed: &[],
        },
        AttributeSchema {
            name: "type",
            kind: "string",
            optional: true,
            default: Some("client"),
            allowed: ACL_TYPES,
        },
        AttributeSchema {
            name: "rules",
            kind: "string",
            optional: true,
            default: None,
            allowed: &[],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state(name: &str, acl_type: AclType, rules: &str) -> AclState {
        AclState {
            id: "acl-1".to_string(),
            name: name.to_string(),
            acl_type,
            rules: rules.to_string(),
        }
    }

    #[test]
    fn test_from_value_defaults_type_to_client() {
        let config = AclConfig::from_value(json!({"name": "web"})).unwrap();
        assert_eq!(config.name.as_deref(), Some("web"));
        assert_eq!(config.acl_type, AclType::Client);
        assert!(config.acl_id.is_none());
        assert!(config.rules.is_none());
    }

    #[test]
    fn test_from_value_all_attributes() {
        let config = AclConfig::from_value(json!({
            "acl_id": "fixed-id",
            "name": "ops",
            "type": "management",
            "rules": "key \"\" { policy = \"write\" }"
        }))
        .unwrap();
        assert_eq!(config.acl_id.as_deref(), Some("fixed-id"));
        assert_eq!(config.acl_type, AclType::Management);
        assert!(config.rules.unwrap().contains("write"));
    }

    #[test]
    fn test_from_value_rejects_invalid_type() {
        let err = AclConfig::from_value(json!({"type": "admin"})).unwrap_err();
        assert_eq!(
            err,
            SchemaError::InvalidType {
                value: "admin".to_string()
            }
        );
        assert!(err.to_string().contains("got 'admin'"));
    }

    #[test]
    fn test_from_value_rejects_unknown_attribute() {
        let err = AclConfig::from_value(json!({"policy": "read"})).unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownAttribute {
                name: "policy".to_string()
            }
        );
    }

    #[test]
    fn test_from_value_rejects_non_string() {
        let err = AclConfig::from_value(json!({"name": 42})).unwrap_err();
        assert_eq!(
            err,
            SchemaError::NotAString {
                name: "name".to_string()
            }
        );
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        let err = AclConfig::from_value(json!(["name"])).unwrap_err();
        assert_eq!(err, SchemaError::Malformed);
    }

    #[test]
    fn test_from_value_empty_and_null_are_unset() {
        let config =
            AclConfig::from_value(json!({"acl_id": "", "name": null, "type": ""})).unwrap();
        assert!(config.acl_id.is_none());
        assert!(config.name.is_none());
        assert_eq!(config.acl_type, AclType::Client);
    }

    #[test]
    fn test_to_entry_sends_only_set_fields() {
        let config = AclConfig {
            name: Some("web".to_string()),
            ..Default::default()
        };
        let entry = config.to_entry();
        assert_eq!(entry.id, "");
        assert_eq!(entry.name, "web");
        assert_eq!(entry.acl_type, AclType::Client);
        assert_eq!(entry.rules, "");
    }

    #[test]
    fn test_changes_none_when_equal() {
        let prior = state("web", AclType::Client, "key \"\" {}");
        let changes = AclChanges::between(&prior, &prior.to_config());
        assert!(changes.is_empty());
    }

    #[test]
    fn test_changes_only_name() {
        let prior = state("tf-abc12", AclType::Client, "rules");
        let desired = AclConfig {
            name: Some("tf-xyz34".to_string()),
            rules: Some("rules".to_string()),
            ..Default::default()
        };
        let changes = AclChanges::between(&prior, &desired);
        assert_eq!(changes.len(), 1);
        assert!(changes.contains("name"));
        assert!(!changes.contains("type"));
        assert!(!changes.contains("rules"));
    }

    #[test]
    fn test_changes_unset_rules_clears_remote_rules() {
        let prior = state("web", AclType::Client, "key \"\" {}");
        let desired = AclConfig {
            name: Some("web".to_string()),
            ..Default::default()
        };
        let changes = AclChanges::between(&prior, &desired);
        assert_eq!(
            changes.iter().next(),
            Some(&AclChange::Rules {
                old: "key \"\" {}".to_string(),
                new: String::new()
            })
        );
    }

    #[test]
    fn test_changes_type_back_to_default() {
        let prior = state("", AclType::Management, "");
        let changes = AclChanges::between(&prior, &AclConfig::default());
        assert_eq!(changes.len(), 1);
        assert!(changes.contains("type"));
    }

    #[test]
    fn test_apply_to_overlays_changed_fields_only() {
        let mut entry = AclEntry {
            id: "acl-1".to_string(),
            name: "old".to_string(),
            acl_type: AclType::Management,
            rules: "remote rules".to_string(),
            ..Default::default()
        };
        let changes = AclChanges::from(vec![AclChange::Name {
            old: "old".to_string(),
            new: "new".to_string(),
        }]);
        changes.apply_to(&mut entry);

        assert_eq!(entry.name, "new");
        assert_eq!(entry.acl_type, AclType::Management);
        assert_eq!(entry.rules, "remote rules");
    }

    #[test]
    fn test_change_display() {
        let change = AclChange::Type {
            old: AclType::Client,
            new: AclType::Management,
        };
        assert_eq!(change.to_string(), "type: client -> management");
    }

    #[test]
    fn test_state_serialization_uses_type_key() {
        let json = serde_json::to_value(state("web", AclType::Management, "")).unwrap();
        assert_eq!(json["type"], "management");
        assert!(json.get("acl_type").is_none());
    }

    #[test]
    fn test_schema_describes_type_enum() {
        let attributes = schema();
        assert_eq!(attributes.len(), 4);
        let acl_type = attributes.iter().find(|a| a.name == "type").unwrap();
        assert_eq!(acl_type.default, Some("client"));
        assert_eq!(acl_type.allowed, &["client", "management"]);
        assert!(attributes.iter().all(|a| a.optional));
    }
}
