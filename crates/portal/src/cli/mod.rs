use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};

pub mod inspect;
pub mod provision;
pub mod status;

#[derive(Debug, Parser)]
#[command(name = "portal", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    /// Raise log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "p", name = "provision", about = "Download and unpack the gateway")]
    Provision(provision::Provision),
    #[command(alias = "st", name = "status", about = "Show whether the gateway is on disk")]
    Status(status::Status),
    #[command(alias = "i", name = "inspect", about = "List the members of a gateway archive")]
    Inspect(inspect::Inspect),
}

impl Commands {
    pub async fn run(self) -> Result<()> {
        match self {
            Self::Provision(arg) => arg.run().await,
            Self::Status(arg) => arg.run(),
            Self::Inspect(arg) => arg.run().await,
        }
    }
}

/// Flags shared by every command that needs a destination.
#[derive(Args, Clone, Debug, Default)]
pub struct ConfigArgs {
    #[arg(short, long, help = "TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "Destination directory (relative paths resolve against $PORTAL_HOME or the working directory)")]
    pub dest: Option<PathBuf>,
}
