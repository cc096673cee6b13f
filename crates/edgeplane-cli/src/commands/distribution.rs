use anyhow::{Context, Result};

use edgeplane_reconcile::Provider;

use crate::cli::OutputFormat;
use crate::output::print_distribution;

pub async fn show(provider: &Provider, id: &str, format: OutputFormat) -> Result<()> {
    let current = provider
        .distribution(id)
        .await
        .with_context(|| format!("Failed to fetch distribution {id}"))?;
    print_distribution(id, &current, format)
}
