//! Command line options for the org-mover tool
use crate::{config::OrgMoverConfig, errors::OrgMoverError, migrate::main_migrate};
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

/// org-mover - Migrate every repository from one GitHub organization to another
#[derive(Parser, Deserialize, Default, Clone, Debug)]
pub struct OrgMoverCli {
    /// The source organization
    #[arg(short, long, visible_alias = "from")]
    pub source_org: Option<String>,

    /// The destination organization
    #[arg(short, long, visible_alias = "to")]
    pub destination_org: Option<String>,

    /// Scratch directory used for the mirror clones
    #[arg(short, long)]
    pub temp_dir: Option<PathBuf>,

    /// Skip the interactive confirmation (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,

    /// Custom configuration file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Show the current config path
    #[arg(long)]
    pub show_config_path: bool,

    /// Verbose mode (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Run the org-mover tool with the provided command line options
/// # Errors
/// Error if the migration fails
pub async fn org_mover_main() -> Result<(), OrgMoverError> {
    let args = OrgMoverCli::parse();
    let mut config = OrgMoverConfig::try_new(args)?;
    if config.cli_args.show_config_path {
        println!("{}", config.config_path.display());
        return Ok(());
    }
    main_migrate(&mut config).await
}
