use anyhow::{Context, Result};
use colored::Colorize;
use edgeplane_reconcile::{LifecycleResponse, Reconciler, SubResource};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cli::{OutputFormat, ResourceCommands};
use crate::output::{print_response, print_success};
use crate::state::{read_json, write_json};

/// Runs one lifecycle command for resource kind `K`.
pub async fn run<K>(reconciler: &Reconciler<K>, command: &ResourceCommands, format: OutputFormat) -> Result<()>
where
    K: SubResource + Serialize + DeserializeOwned,
{
    let kind = K::KIND;
    match command {
        ResourceCommands::Create { file, out } => {
            let desired: K = read_json(file.as_deref())?;
            let response = reconciler
                .create(&desired)
                .await
                .with_context(|| format!("Failed to create {kind}"))?;
            print_success(&format!("Created {kind} {}", desired.key().to_string().cyan()));
            finish(&response, out.as_deref(), format)
        }
        ResourceCommands::Read { state } => {
            let prior: K = read_json(Some(state))?;
            print_response(&reconciler.read(&prior), format)
        }
        ResourceCommands::Update { state, file, out } => {
            let prior: K = read_json(Some(state))?;
            let desired: K = read_json(file.as_deref())?;
            let response = reconciler
                .update(&prior, &desired)
                .await
                .with_context(|| format!("Failed to update {kind} {}", prior.key()))?;
            print_success(&format!("Updated {kind} {}", desired.key().to_string().cyan()));
            finish(&response, out.as_deref(), format)
        }
        ResourceCommands::Delete { state } => {
            let prior: K = read_json(Some(state))?;
            let response = reconciler
                .delete(&prior)
                .await
                .with_context(|| format!("Failed to delete {kind} {}", prior.key()))?;
            print_success(&format!("Deleted {kind} {}", prior.key().to_string().cyan()));
            finish(&response, None, format)
        }
    }
}

fn finish<K: Serialize>(response: &LifecycleResponse<K>, out: Option<&str>, format: OutputFormat) -> Result<()> {
    if let (Some(path), Some(state)) = (out, &response.state) {
        write_json(path, state)?;
    }
    print_response(response, format)
}
