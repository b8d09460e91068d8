//! Terraform state parser for drift detection.
//!
//! Parses tfstate v4 files and extracts the recorded `consul_acl` instances.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::providers::consul::AclType;
use crate::resource::{AclState, RESOURCE_TYPE, SchemaError};

const SUPPORTED_VERSION: u32 = 4;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to read state file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed state file: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unsupported state version {0}, expected 4")]
    UnsupportedVersion(u32),

    #[error("{address}: missing id attribute")]
    MissingId { address: String },

    #[error("{address}: {source}")]
    InvalidAttribute {
        address: String,
        #[source]
        source: SchemaError,
    },
}

#[derive(Debug, Deserialize)]
struct RawState {
    version: u32,
    #[serde(default)]
    resources: Vec<RawResource>,
}

#[derive(Debug, Deserialize)]
struct RawResource {
    #[serde(default)]
    module: Option<String>,
    mode: String,
    #[serde(rename = "type")]
    resource_type: String,
    name: String,
    #[serde(default)]
    instances: Vec<RawInstance>,
}

#[derive(Debug, Deserialize)]
struct RawInstance {
    #[serde(default)]
    index_key: Option<serde_json::Value>,
    #[serde(default)]
    attributes: RawAclAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct RawAclAttributes {
    id: Option<String>,
    name: Option<String>,
    #[serde(rename = "type")]
    acl_type: Option<String>,
    rules: Option<String>,
}

/// One `consul_acl` instance as the state file last recorded it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedAcl {
    pub address: String,
    pub state: AclState,
}

#[derive(Debug, Default)]
pub struct TerraformState {
    pub acls: Vec<RecordedAcl>,
}

impl TerraformState {
    pub fn from_path(path: &Path) -> Result<Self, StateError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, StateError> {
        let raw: RawState = serde_json::from_str(contents)?;

        if raw.version != SUPPORTED_VERSION {
            return Err(StateError::UnsupportedVersion(raw.version));
        }

        let mut acls = Vec::new();

        for resource in raw.resources {
            if resource.mode != "managed" || resource.resource_type != RESOURCE_TYPE {
                continue;
            }

            let base = resource_address(&resource);

            for instance in resource.instances {
                let address = instance_address(&base, instance.index_key.as_ref());
                let attributes = instance.attributes;

                let id = attributes
                    .id
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| StateError::MissingId {
                        address: address.clone(),
                    })?;

                let acl_type = match attributes.acl_type.as_deref() {
                    None | Some("") => AclType::default(),
                    Some(value) => value.parse::<AclType>().map_err(|source| {
                        StateError::InvalidAttribute {
                            address: address.clone(),
                            source,
                        }
                    })?,
                };

                acls.push(RecordedAcl {
                    address,
                    state: AclState {
                        id,
                        name: attributes.name.unwrap_or_default(),
                        acl_type,
                        rules: attributes.rules.unwrap_or_default(),
                    },
                });
            }
        }

        Ok(Self { acls })
    }
}

fn resource_address(resource: &RawResource) -> String {
    match &resource.module {
        Some(module) => format!("{}.{}.{}", module, resource.resource_type, resource.name),
        None => format!("{}.{}", resource.resource_type, resource.name),
    }
}

fn instance_address(base: &str, index_key: Option<&serde_json::Value>) -> String {
    match index_key {
        Some(serde_json::Value::String(key)) => format!("{}[{:?}]", base, key),
        Some(serde_json::Value::Number(n)) => format!("{}[{}]", base, n),
        _ => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATE: &str = r#"{
        "version": 4,
        "terraform_version": "0.11.14",
        "serial": 3,
        "lineage": "4f1c3a4e",
        "resources": [
            {
                "mode": "managed",
                "type": "consul_acl",
                "name": "foo",
                "provider": "provider.consul",
                "instances": [
                    {
                        "schema_version": 0,
                        "attributes": {
                            "acl_id": null,
                            "id": "8f246b77-f3e1-ff88-5b48-8ec93abf3e05",
                            "name": "tf-abc12",
                            "rules": "key \"\" {\n  policy = \"deny\"\n}\n",
                            "type": "client"
                        }
                    }
                ]
            },
            {
                "module": "module.team",
                "mode": "managed",
                "type": "consul_acl",
                "name": "ops",
                "instances": [
                    { "index_key": 0, "attributes": { "id": "ops-0", "type": "management" } },
                    { "index_key": "blue", "attributes": { "id": "ops-blue" } }
                ]
            },
            {
                "mode": "data",
                "type": "consul_acl",
                "name": "ignored",
                "instances": [{ "attributes": { "id": "data-source" } }]
            },
            {
                "mode": "managed",
                "type": "consul_keys",
                "name": "app",
                "instances": [{ "attributes": { "id": "consul" } }]
            }
        ]
    }"#;

    #[test]
    fn test_parses_managed_consul_acl_instances_only() {
        let state = TerraformState::from_json(STATE).unwrap();
        let addresses: Vec<&str> = state.acls.iter().map(|a| a.address.as_str()).collect();
        assert_eq!(
            addresses,
            vec![
                "consul_acl.foo",
                "module.team.consul_acl.ops[0]",
                "module.team.consul_acl.ops[\"blue\"]",
            ]
        );
    }

    #[test]
    fn test_recorded_attributes() {
        let state = TerraformState::from_json(STATE).unwrap();
        let foo = &state.acls[0].state;
        assert_eq!(foo.id, "8f246b77-f3e1-ff88-5b48-8ec93abf3e05");
        assert_eq!(foo.name, "tf-abc12");
        assert_eq!(foo.acl_type, AclType::Client);
        assert!(foo.rules.contains("deny"));

        let ops = &state.acls[1].state;
        assert_eq!(ops.acl_type, AclType::Management);
        assert_eq!(ops.name, "");
        assert_eq!(state.acls[2].state.acl_type, AclType::Client);
    }

    #[test]
    fn test_rejects_old_state_version() {
        let result = TerraformState::from_json(r#"{"version": 3, "modules": []}"#);
        assert!(matches!(result, Err(StateError::UnsupportedVersion(3))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let result = TerraformState::from_json("not json");
        assert!(matches!(result, Err(StateError::Malformed(_))));
    }

    #[test]
    fn test_missing_id_is_an_error() {
        let json = r#"{"version": 4, "resources": [
            {"mode": "managed", "type": "consul_acl", "name": "foo",
             "instances": [{"attributes": {"name": "x"}}]}
        ]}"#;
        let err = TerraformState::from_json(json).unwrap_err();
        assert_eq!(err.to_string(), "consul_acl.foo: missing id attribute");
    }

    #[test]
    fn test_invalid_type_is_an_error() {
        let json = r#"{"version": 4, "resources": [
            {"mode": "managed", "type": "consul_acl", "name": "foo",
             "instances": [{"attributes": {"id": "a", "type": "root"}}]}
        ]}"#;
        let err = TerraformState::from_json(json).unwrap_err();
        assert!(matches!(err, StateError::InvalidAttribute { .. }));
        assert!(err.to_string().starts_with("consul_acl.foo:"));
    }

    #[test]
    fn test_empty_state() {
        let state = TerraformState::from_json(r#"{"version": 4}"#).unwrap();
        assert!(state.acls.is_empty());
    }
}
