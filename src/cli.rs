mod args;
mod commands;

pub use args::{AclCommand, AttributeArgs, Cli, ConnectionArgs, DriftArgs};
pub use commands::{drift, run};
