use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::resource::SchemaError;

pub const ACL_TYPES: &[&str] = &["client", "management"];

/// Token type of a legacy Consul ACL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AclType {
    #[default]
    Client,
    Management,
}

impl AclType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AclType::Client => "client",
            AclType::Management => "management",
        }
    }
}

impl fmt::Display for AclType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AclType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(AclType::Client),
            "management" => Ok(AclType::Management),
            other => Err(SchemaError::InvalidType {
                value: other.to_string(),
            }),
        }
    }
}

/// ACL entry as exchanged with `/v1/acl/*`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AclEntry {
    #[serde(rename = "ID", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "Type", default)]
    pub acl_type: AclType,
    #[serde(default)]
    pub rules: String,
    #[serde(default, skip_serializing)]
    pub create_index: u64,
    #[serde(default, skip_serializing)]
    pub modify_index: u64,
}

#[derive(Debug, Deserialize)]
pub struct CreateResponse {
    #[serde(rename = "ID")]
    pub id: String,
}

/// Per-request overrides. Unset fields fall back to the client's configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub datacenter: Option<String>,
    pub token: Option<String>,
}

impl QueryOptions {
    pub fn datacenter(dc: impl Into<String>) -> Self {
        Self {
            datacenter: Some(dc.into()),
            token: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acl_type_from_str_valid() {
        assert_eq!("client".parse::<AclType>().unwrap(), AclType::Client);
        assert_eq!(
            "management".parse::<AclType>().unwrap(),
            AclType::Management
        );
    }

    #[test]
    fn test_acl_type_from_str_is_case_sensitive() {
        let err = "Management".parse::<AclType>().unwrap_err();
        assert!(matches!(err, SchemaError::InvalidType { ref value } if value == "Management"));
    }

    #[test]
    fn test_acl_type_default_is_client() {
        assert_eq!(AclType::default(), AclType::Client);
    }

    #[test]
    fn test_acl_types_match_enum() {
        for name in ACL_TYPES {
            let parsed: AclType = name.parse().unwrap();
            assert_eq!(parsed.as_str(), *name);
        }
    }

    #[test]
    fn test_acl_entry_deserialization_pascal_case() {
        let json = r#"{
            "CreateIndex": 3,
            "ModifyIndex": 7,
            "ID": "8f246b77-f3e1-ff88-5b48-8ec93abf3e05",
            "Name": "tf-abc12",
            "Type": "management",
            "Rules": "key \"\" { policy = \"read\" }"
        }"#;
        let entry: AclEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id, "8f246b77-f3e1-ff88-5b48-8ec93abf3e05");
        assert_eq!(entry.name, "tf-abc12");
        assert_eq!(entry.acl_type, AclType::Management);
        assert!(entry.rules.contains("policy"));
        assert_eq!(entry.create_index, 3);
        assert_eq!(entry.modify_index, 7);
    }

    #[test]
    fn test_acl_entry_missing_fields_default() {
        let entry: AclEntry = serde_json::from_str(r#"{"ID": "abc"}"#).unwrap();
        assert_eq!(entry.id, "abc");
        assert_eq!(entry.name, "");
        assert_eq!(entry.acl_type, AclType::Client);
        assert_eq!(entry.rules, "");
    }

    #[test]
    fn test_acl_entry_serialization_omits_empty_id_and_indexes() {
        let entry = AclEntry {
            name: "web".to_string(),
            create_index: 10,
            ..Default::default()
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("ID").is_none());
        assert!(json.get("CreateIndex").is_none());
        assert_eq!(json["Name"], "web");
        assert_eq!(json["Type"], "client");
        assert_eq!(json["Rules"], "");
    }

    #[test]
    fn test_query_options_datacenter() {
        let opts = QueryOptions::datacenter("dc1");
        assert_eq!(opts.datacenter.as_deref(), Some("dc1"));
        assert!(opts.token.is_none());
    }
}
