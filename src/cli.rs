//! Command-line interface definitions for the Newsfirst feed.
//!
//! Every option can also be given through an environment variable.

use clap::{Parser, Subcommand};

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Serve the JSON endpoint on the default address
/// newsfirst_feed serve
///
/// # Serve with a settings file on another port
/// newsfirst_feed --config ./newsfirst.yaml serve --bind 127.0.0.1:8080
///
/// # Write one snapshot of the sports listing with full descriptions
/// newsfirst_feed snapshot --type sports --descriptions -o ./snapshots
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML settings file
    #[arg(short, long, global = true, env = "NEWSFIRST_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP endpoint
    Serve {
        /// Address to listen on
        #[arg(short, long, env = "NEWSFIRST_BIND", default_value = "0.0.0.0:3000")]
        bind: String,
    },
    /// Scrape once and write a timestamped JSON file
    Snapshot {
        /// Source name (latest, local, sports, featured, cricket, world, business)
        #[arg(short = 't', long = "type", default_value = "latest")]
        source: String,

        /// Fetch every article page for descriptions
        #[arg(short, long)]
        descriptions: bool,

        /// Output directory for the snapshot file
        #[arg(short, long)]
        output_dir: String,
    },
}
