use serde_json::{Map, Value};

use super::args::{AclCommand, AttributeArgs, Cli, DriftArgs};
use crate::error::AppError;
use crate::output;
use crate::providers::consul::{AclResource, ConsulClient};
use crate::providers::{Instance, ResourceHandler};
use crate::resource::{self, AclChanges, AclConfig, AclState};
use crate::terraform::TerraformState;

impl AttributeArgs {
    fn rules(&self) -> Result<Option<String>, std::io::Error> {
        match &self.rules_file {
            Some(path) => std::fs::read_to_string(path).map(Some),
            None => Ok(self.rules.clone()),
        }
    }

    /// Lays the given flags over `base` as raw attributes for the schema layer.
    fn overlay(&self, mut base: Map<String, Value>) -> Result<Value, std::io::Error> {
        if let Some(name) = &self.name {
            base.insert("name".to_string(), Value::String(name.clone()));
        }
        if let Some(acl_type) = self.acl_type.as_ref().filter(|t| !t.is_empty()) {
            base.insert("type".to_string(), Value::String(acl_type.clone()));
        }
        if let Some(rules) = self.rules()? {
            base.insert("rules".to_string(), Value::String(rules));
        }
        Ok(Value::Object(base))
    }
}

fn state_attributes(state: &AclState) -> Map<String, Value> {
    let mut attributes = Map::new();
    attributes.insert("name".to_string(), Value::String(state.name.clone()));
    attributes.insert(
        "type".to_string(),
        Value::String(state.acl_type.to_string()),
    );
    attributes.insert("rules".to_string(), Value::String(state.rules.clone()));
    attributes
}

fn print_state(state: &AclState, json: bool) -> Result<(), AppError> {
    if json {
        println!("{}", serde_json::to_string_pretty(state)?);
    } else {
        println!("{}", output::acl_table(std::slice::from_ref(state)));
    }
    Ok(())
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    let config = cli.connection.client_config()?;
    let client = ConsulClient::new(config)?;
    let handler = AclResource::new();

    tracing::debug!(api = client.api_base(), resource = handler.type_name(), "client ready");

    match cli.command {
        AclCommand::Create(args) => {
            let mut attributes = Map::new();
            if let Some(acl_id) = &args.acl_id {
                attributes.insert("acl_id".to_string(), Value::String(acl_id.clone()));
            }
            let desired = AclConfig::from_value(args.attributes.overlay(attributes)?)?;

            let instance = handler.apply(&client, Instance::Absent, Some(&desired)).await?;
            if let Some(state) = instance.into_state() {
                print_state(&state, false)?;
            }
        }
        AclCommand::Read(args) => {
            let state = handler.read(&client, &args.id).await?;
            print_state(&state, args.json)?;
        }
        AclCommand::Update(args) => {
            let prior = handler.read(&client, &args.id).await?;
            let desired =
                AclConfig::from_value(args.attributes.overlay(state_attributes(&prior))?)?;

            let changes = handler.diff(&prior, &desired);
            let root = format!("{}.{}", handler.type_name(), prior.id);
            println!("{}", output::change_tree(&root, &changes));

            if changes.is_empty() {
                tracing::info!(acl_id = %args.id, "nothing to update");
                return Ok(());
            }

            let instance = handler
                .apply(&client, Instance::Present(prior), Some(&desired))
                .await?;
            if let Some(state) = instance.into_state() {
                print_state(&state, false)?;
            }
        }
        AclCommand::Delete(args) => {
            handler.delete(&client, &args.id).await?;
            println!("Destroyed ACL {}", args.id);
        }
        AclCommand::List(args) => {
            let states: Vec<AclState> = client
                .list_acls(None)
                .await?
                .into_iter()
                .map(|entry| {
                    let id = entry.id.clone();
                    AclState::from_entry(&id, entry)
                })
                .collect();

            if args.json {
                println!("{}", serde_json::to_string_pretty(&states)?);
            } else {
                println!("{}", output::acl_table(&states));
            }
        }
        AclCommand::Schema => {
            println!("{}", output::schema_table(&resource::schema()));
        }
        AclCommand::Drift(args) => {
            let drifted = drift(&handler, &client, &args).await?;
            if drifted > 0 {
                return Err(AppError::Drift { count: drifted });
            }
        }
    }

    Ok(())
}

/// Prints recorded-vs-remote changes per instance and returns how many drifted.
pub async fn drift(
    handler: &AclResource,
    client: &ConsulClient,
    args: &DriftArgs,
) -> Result<usize, AppError> {
    let state = TerraformState::from_path(&args.state)?;
    let mut drifted = 0;

    tracing::debug!(instances = state.acls.len(), path = %args.state.display(), "state loaded");

    for recorded in &state.acls {
        let remote = match handler.read(client, &recorded.state.id).await {
            Ok(remote) => remote,
            Err(err) if err.is_not_found() => {
                tracing::warn!(
                    address = %recorded.address,
                    acl_id = %recorded.state.id,
                    "ACL missing from Consul"
                );
                println!("{}\n└── missing from Consul", recorded.address);
                drifted += 1;
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let changes = AclChanges::between(&recorded.state, &remote.to_config());
        if !changes.is_empty() {
            tracing::warn!(address = %recorded.address, changes = changes.len(), "drift detected");
            drifted += 1;
        }
        println!("{}", output::change_tree(&recorded.address, &changes));
    }

    Ok(drifted)
}
