//! consul-acl - Consul ACL tokens as a declarative resource
//!
//! A library for managing legacy Consul ACLs through a typed create/read/update/delete
//! lifecycle, plus the pieces the `consul-acl` binary is built from.

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod providers;
pub mod resource;
pub mod terraform;

pub use config::ClientConfig;
pub use error::AppError;
pub use providers::consul::{
    AclApi, AclEntry, AclResource, AclType, ConsulClient, ConsulError, QueryOptions,
};
pub use providers::{Instance, ProviderError, ResourceHandler};
pub use resource::{AclChange, AclChanges, AclConfig, AclState, SchemaError};
pub use terraform::TerraformState;
