mod client;
mod error;
mod types;

pub use client::ConsulClient;
pub use error::ConsulError;
pub use types::{ACL_TYPES, AclEntry, AclType, CreateResponse, QueryOptions};

use async_trait::async_trait;

use super::{ProviderError, ResourceHandler};
use crate::resource::{AclChanges, AclConfig, AclState, RESOURCE_TYPE};

/// The slice of Consul's legacy ACL API the `consul_acl` resource needs.
#[async_trait]
pub trait AclApi: Send + Sync {
    async fn create(&self, entry: &AclEntry, opts: Option<&QueryOptions>)
    -> Result<String, ConsulError>;
    async fn info(&self, id: &str, opts: Option<&QueryOptions>) -> Result<AclEntry, ConsulError>;
    async fn update(&self, entry: &AclEntry, opts: Option<&QueryOptions>)
    -> Result<(), ConsulError>;
    async fn destroy(&self, id: &str, opts: Option<&QueryOptions>) -> Result<(), ConsulError>;
}

#[async_trait]
impl AclApi for ConsulClient {
    async fn create(
        &self,
        entry: &AclEntry,
        opts: Option<&QueryOptions>,
    ) -> Result<String, ConsulError> {
        self.create_acl(entry, opts).await
    }

    async fn info(&self, id: &str, opts: Option<&QueryOptions>) -> Result<AclEntry, ConsulError> {
        self.acl_info(id, opts).await
    }

    async fn update(
        &self,
        entry: &AclEntry,
        opts: Option<&QueryOptions>,
    ) -> Result<(), ConsulError> {
        self.update_acl(entry, opts).await
    }

    async fn destroy(&self, id: &str, opts: Option<&QueryOptions>) -> Result<(), ConsulError> {
        self.destroy_acl(id, opts).await
    }
}

/// Lifecycle handler for `consul_acl`.
///
/// Remote errors are returned untouched; in particular a vanished ACL makes
/// `read` fail instead of reporting the resource as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct AclResource;

impl AclResource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ResourceHandler for AclResource {
    type Client = dyn AclApi;
    type Config = AclConfig;
    type State = AclState;
    type Changes = AclChanges;

    fn type_name(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn id<'a>(&self, state: &'a AclState) -> &'a str {
        &state.id
    }

    fn diff(&self, prior: &AclState, desired: &AclConfig) -> AclChanges {
        AclChanges::between(prior, desired)
    }

    fn is_unchanged(&self, changes: &AclChanges) -> bool {
        changes.is_empty()
    }

    async fn create(
        &self,
        client: &Self::Client,
        config: &AclConfig,
    ) -> Result<AclState, ProviderError> {
        let entry = config.to_entry();
        let id = client.create(&entry, None).await?;

        tracing::info!(acl_id = %id, acl_type = %entry.acl_type, "ACL created");

        self.read(client, &id).await
    }

    async fn read(&self, client: &Self::Client, id: &str) -> Result<AclState, ProviderError> {
        let entry = client.info(id, None).await?;
        Ok(AclState::from_entry(id, entry))
    }

    async fn update(
        &self,
        client: &Self::Client,
        id: &str,
        changes: &AclChanges,
    ) -> Result<AclState, ProviderError> {
        let mut entry = client.info(id, None).await?;
        changes.apply_to(&mut entry);

        tracing::debug!(acl_id = %id, changes = changes.len(), "sending ACL update");

        client.update(&entry, None).await?;

        tracing::info!(acl_id = %id, "ACL updated");

        self.read(client, id).await
    }

    async fn delete(&self, client: &Self::Client, id: &str) -> Result<(), ProviderError> {
        client.destroy(id, None).await?;

        tracing::info!(acl_id = %id, "ACL destroyed");

        Ok(())
    }
}
