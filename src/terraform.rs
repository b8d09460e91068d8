pub mod state;

pub use state::{RecordedAcl, StateError, TerraformState};
