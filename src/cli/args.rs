use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{ClientConfig, DEFAULT_ADDRESS, HTTP_ADDR_ENV};
use crate::providers::consul::ConsulError;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: AclCommand,
}

#[derive(clap::Args, Debug)]
pub struct ConnectionArgs {
    #[arg(long, global = true, env = "CONSUL_HTTP_ADDR", default_value = DEFAULT_ADDRESS)]
    pub address: String,

    #[arg(long, global = true, env = "CONSUL_HTTP_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long, global = true, env = "CONSUL_DATACENTER")]
    pub datacenter: Option<String>,
}

impl ConnectionArgs {
    /// Flags win over the environment; `CONSUL_TOKEN` and `CONSUL_HTTP_SSL`
    /// are still honored through [`ClientConfig::from_lookup`].
    pub fn client_config(&self) -> Result<ClientConfig, ConsulError> {
        // clap already resolved the address from the flag or CONSUL_HTTP_ADDR
        let mut config = ClientConfig::from_lookup(|key| {
            if key == HTTP_ADDR_ENV {
                None
            } else {
                std::env::var(key).ok()
            }
        })?;
        config.set_address(&self.address)?;

        let token = self
            .token
            .clone()
            .filter(|t| !t.is_empty())
            .or(config.token.take());
        let datacenter = self.datacenter.clone().or(config.datacenter.take());

        Ok(config.with_token(token).with_datacenter(datacenter))
    }
}

#[derive(Subcommand, Debug)]
pub enum AclCommand {
    /// Create an ACL and print its confirmed state
    Create(CreateArgs),
    /// Show one ACL
    Read(ReadArgs),
    /// Change name, type or rules of an existing ACL
    Update(UpdateArgs),
    /// Destroy an ACL
    Delete(DeleteArgs),
    /// List every ACL visible to the token
    List(ListArgs),
    /// Describe the consul_acl attributes
    Schema,
    /// Compare a Terraform state file against Consul
    Drift(DriftArgs),
}

#[derive(clap::Args, Debug, Default)]
pub struct AttributeArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long = "type")]
    pub acl_type: Option<String>,

    #[arg(long, conflicts_with = "rules_file")]
    pub rules: Option<String>,

    #[arg(long)]
    pub rules_file: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct CreateArgs {
    #[arg(long)]
    pub acl_id: Option<String>,

    #[command(flatten)]
    pub attributes: AttributeArgs,
}

#[derive(clap::Args, Debug)]
pub struct ReadArgs {
    pub id: String,

    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    pub id: String,

    #[command(flatten)]
    pub attributes: AttributeArgs,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct DriftArgs {
    #[arg(long, default_value = "terraform.tfstate")]
    pub state: PathBuf,
}
