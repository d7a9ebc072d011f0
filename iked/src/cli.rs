use std::path::PathBuf;

use clap::Parser;

/// The cli of iked
#[derive(Debug, Parser)]
#[clap(author, version)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[clap(short, long, default_value = "/etc/iked/iked.toml")]
    pub config: PathBuf,

    /// Increase log verbosity; repeat for more (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
