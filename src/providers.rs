pub mod consul;

use async_trait::async_trait;
use thiserror::Error;

use crate::resource::SchemaError;
use consul::ConsulError;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Consul(#[from] ConsulError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl ProviderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::Consul(e) if e.is_not_found())
    }
}

/// Local view of one managed resource: it either exists remotely or it doesn't.
#[derive(Debug, Clone, PartialEq)]
pub enum Instance<S> {
    Absent,
    Present(S),
}

impl<S> Instance<S> {
    pub fn state(&self) -> Option<&S> {
        match self {
            Instance::Present(state) => Some(state),
            Instance::Absent => None,
        }
    }

    pub fn into_state(self) -> Option<S> {
        match self {
            Instance::Present(state) => Some(state),
            Instance::Absent => None,
        }
    }
}

/// CRUD lifecycle of one resource type. The remote client is handed to every
/// call; handlers keep no connection state of their own.
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    type Client: ?Sized + Sync;
    type Config: Send + Sync;
    type State: Send + Sync;
    type Changes: Send + Sync;

    fn type_name(&self) -> &'static str;
    fn id<'a>(&self, state: &'a Self::State) -> &'a str;
    fn diff(&self, prior: &Self::State, desired: &Self::Config) -> Self::Changes;
    fn is_unchanged(&self, changes: &Self::Changes) -> bool;

    async fn create(
        &self,
        client: &Self::Client,
        config: &Self::Config,
    ) -> Result<Self::State, ProviderError>;

    async fn read(&self, client: &Self::Client, id: &str) -> Result<Self::State, ProviderError>;

    async fn update(
        &self,
        client: &Self::Client,
        id: &str,
        changes: &Self::Changes,
    ) -> Result<Self::State, ProviderError>;

    async fn delete(&self, client: &Self::Client, id: &str) -> Result<(), ProviderError>;

    /// Moves `prior` towards `desired`: `None` means the resource should not exist.
    async fn apply(
        &self,
        client: &Self::Client,
        prior: Instance<Self::State>,
        desired: Option<&Self::Config>,
    ) -> Result<Instance<Self::State>, ProviderError> {
        match (prior, desired) {
            (Instance::Absent, Some(config)) => {
                let state = self.create(client, config).await?;
                Ok(Instance::Present(state))
            }
            (Instance::Present(state), Some(config)) => {
                let changes = self.diff(&state, config);
                let id = self.id(&state);
                let refreshed = if self.is_unchanged(&changes) {
                    self.read(client, id).await?
                } else {
                    self.update(client, id, &changes).await?
                };
                Ok(Instance::Present(refreshed))
            }
            (Instance::Present(state), None) => {
                self.delete(client, self.id(&state)).await?;
                Ok(Instance::Absent)
            }
            (Instance::Absent, None) => Ok(Instance::Absent),
        }
    }
}
