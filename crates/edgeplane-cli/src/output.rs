use colored::Colorize;
use edgeplane_reconcile::{Diagnostics, LifecycleResponse};
use edgeplane_storage::{CacheBehavior, Origin, VersionedConfig};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_success(msg: &str) {
    eprintln!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics {
        print_warning(&format!("{}: {}", diagnostic.summary, diagnostic.detail));
    }
}

/// Prints a lifecycle result: diagnostics to stderr, the result to stdout.
pub fn print_response<R: Serialize>(response: &LifecycleResponse<R>, format: OutputFormat) -> anyhow::Result<()> {
    print_diagnostics(&response.diagnostics);
    match format {
        OutputFormat::Json => print_json(response),
        OutputFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(["Field", "Value"]);
            let state = if response.state.is_some() { "present" } else { "removed" };
            builder.push_record(["state", state]);
            let version = response.version.as_ref().map(|v| v.to_string());
            builder.push_record(["version", version.as_deref().unwrap_or("-")]);
            builder.push_record(["warnings", &response.diagnostics.len().to_string()]);
            if !response.cascaded.is_empty() {
                builder.push_record(["cascaded", &response.cascaded.join(", ")]);
            }
            println!("{}", builder.build().with(Style::rounded()));
            Ok(())
        }
    }
}

pub fn print_distribution(id: &str, current: &VersionedConfig, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(&current.config),
        OutputFormat::Table => {
            println!("{}: {}", "Distribution".cyan(), id);
            println!("{}: {}", "Version".cyan(), current.version);
            println!("{}", origins_table(current.config.origins.iter()));
            println!("{}", behaviours_table(current.config.cache_behaviors.iter()));
            Ok(())
        }
    }
}

fn origins_table<'a>(origins: impl Iterator<Item = &'a Origin>) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Origin", "Domain", "Path", "Kind"]);
    let mut empty = true;
    for origin in origins {
        empty = false;
        let kind = if origin.s3_origin_config.is_some() {
            "s3"
        } else if origin.custom_origin_config.is_some() {
            "custom"
        } else {
            "-"
        };
        let path = if origin.origin_path.is_empty() { "/" } else { origin.origin_path.as_str() };
        builder.push_record([origin.id.as_str(), origin.domain_name.as_str(), path, kind]);
    }
    if empty {
        return "No origins.".to_string();
    }
    builder.build().with(Style::rounded()).to_string()
}

fn behaviours_table<'a>(behaviours: impl Iterator<Item = &'a CacheBehavior>) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Path", "Origin", "Viewer policy", "Methods", "Compress"]);
    let mut empty = true;
    for behaviour in behaviours {
        empty = false;
        let methods = behaviour
            .allowed_methods
            .methods
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        builder.push_record([
            behaviour.path_pattern.clone(),
            behaviour.target_origin_id.clone(),
            behaviour.viewer_protocol_policy.to_string(),
            methods,
            behaviour.compress.to_string(),
        ]);
    }
    if empty {
        return "No cache behaviours.".to_string();
    }
    builder.build().with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use edgeplane_storage::{DistributionConfig, ViewerProtocolPolicy};

    use super::*;

    #[test]
    fn test_tables_list_entries() {
        let config = DistributionConfig::new()
            .with_origins(vec![Origin::new("assets", "assets.example")])
            .with_cache_behaviors(vec![CacheBehavior::new(
                "assets",
                "/img/*",
                ViewerProtocolPolicy::RedirectToHttps,
                "cp",
            )]);

        let origins = origins_table(config.origins.iter());
        assert!(origins.contains("assets.example"));

        let behaviours = behaviours_table(config.cache_behaviors.iter());
        assert!(behaviours.contains("/img/*"));
        assert!(behaviours.contains("redirect-to-https"));
        assert!(behaviours.contains("HEAD,GET,OPTIONS"));
    }

    #[test]
    fn test_empty_tables() {
        let config = DistributionConfig::new();
        assert_eq!(origins_table(config.origins.iter()), "No origins.");
        assert_eq!(behaviours_table(config.cache_behaviors.iter()), "No cache behaviours.");
    }
}
