//! # org-mover
//!
//! Migrate every repository from one GitHub organization to another,
//! preserving commit history, branches, tags, privacy, and description.
//! The run is a one-time, resumable batch job: completed repositories are
//! recorded in an append-only ledger file, so interrupting and re-running
//! picks up where the previous run stopped.
//!
//! ## Usage
//!
//! ```txt
//! Usage: org-mover [OPTIONS]
//!
//! Options:
//!   -s, --source-org <SOURCE_ORG>            The source organization [aliases: from]
//!   -d, --destination-org <DESTINATION_ORG>  The destination organization [aliases: to]
//!   -t, --temp-dir <TEMP_DIR>                Scratch directory used for the mirror clones
//!   -y, --yes                                Skip the interactive confirmation
//!   -c, --config <CONFIG>                    Custom configuration file path
//!       --show-config-path                   Show the current config path
//!   -v, --verbose...                         Verbose mode (-v, -vv, -vvv)
//!   -h, --help                               Print help
//! ```

#![warn(clippy::all, rust_2018_idioms)]
#![deny(
    missing_docs,
    clippy::all,
    clippy::missing_docs_in_private_items,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![warn(clippy::multiple_crate_versions)]

pub(crate) mod cli;
pub(crate) mod config;
pub(crate) mod errors;
pub(crate) mod ledger;
pub(crate) mod macros;
pub(crate) mod migrate;
pub(crate) mod plan;
pub(crate) mod platform;
pub(crate) mod retry;
pub(crate) mod transfer;
pub(crate) mod utils;
pub(crate) use macros::config_password_wrap;
pub(crate) use macros::config_value;
pub(crate) use macros::config_value_wrap;

mod github;

#[cfg(test)]
pub(crate) mod testutil;

pub use cli::{org_mover_main, OrgMoverCli};
pub use config::OrgMoverConfig;
pub use errors::{OrgMoverError, TransferStep};
pub use migrate::{main_migrate, MigrationSummary};
