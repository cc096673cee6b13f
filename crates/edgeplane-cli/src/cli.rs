use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "edgeplane")]
#[command(about = "Manage origins and cache behaviours inside shared CDN distributions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the configuration file (defaults to ./edgeplane.toml)
    #[arg(short, long, global = true, env = "EDGEPLANE_CONFIG")]
    pub config: Option<String>,

    /// Store endpoint (overrides store.endpoint from the configuration)
    #[arg(short, long, global = true, env = "EDGEPLANE_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, Debug, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage an origin
    Origin(ResourceArgs),
    /// Manage a cache behaviour
    Behaviour(ResourceArgs),
    /// Inspect a distribution
    Distribution(DistributionArgs),
    /// Show the resolved configuration
    Config,
}

#[derive(clap::Args)]
pub struct ResourceArgs {
    #[command(subcommand)]
    pub command: ResourceCommands,
}

#[derive(Subcommand)]
pub enum ResourceCommands {
    /// Add the declared resource to its distribution
    Create {
        /// Path to the desired resource as JSON (reads from stdin if omitted)
        #[arg(long)]
        file: Option<String>,
        /// Write the resulting state to this path
        #[arg(long)]
        out: Option<String>,
    },
    /// Echo a recorded state without contacting the store
    Read {
        /// Path to the recorded state as JSON
        #[arg(long)]
        state: String,
    },
    /// Apply a changed declaration over a recorded state
    Update {
        /// Path to the recorded state as JSON
        #[arg(long)]
        state: String,
        /// Path to the desired resource as JSON (reads from stdin if omitted)
        #[arg(long)]
        file: Option<String>,
        /// Write the resulting state to this path
        #[arg(long)]
        out: Option<String>,
    },
    /// Remove a recorded resource from its distribution
    Delete {
        /// Path to the recorded state as JSON
        #[arg(long)]
        state: String,
    },
}

#[derive(clap::Args)]
pub struct DistributionArgs {
    #[command(subcommand)]
    pub command: DistributionCommands,
}

#[derive(Subcommand)]
pub enum DistributionCommands {
    /// Show a distribution's origins and cache behaviours
    Show {
        /// Distribution id
        id: String,
    },
}
