//! CLI command definitions
//!
//! Defines the clap commands for the ztf CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run test scripts
    ///
    /// Scripts come from the first of: --suite, --task, a .suite file,
    /// a .result/.json report (re-runs its failures), or the given paths.
    Run {
        /// Scripts, directories, a .suite file or a previous result file
        files: Vec<PathBuf>,

        /// Run the cases of a remote suite
        #[arg(long)]
        suite: Option<String>,

        /// Run the cases of a remote task
        #[arg(long)]
        task: Option<String>,

        /// Interpreter used for every script, overriding the config
        #[arg(long, short)]
        interpreter: Option<String>,

        /// Directory holding the scripts (overrides the config's project_dir)
        #[arg(long)]
        project_dir: Option<PathBuf>,
    },

    /// Export remote cases as scripts
    #[command(alias = "co")]
    Checkout {
        /// Product id
        #[arg(long)]
        product: Option<String>,

        /// Module id (within --product)
        #[arg(long)]
        module: Option<String>,

        /// Suite id
        #[arg(long)]
        suite: Option<String>,

        /// Task id
        #[arg(long)]
        task: Option<String>,

        /// Directory the scripts are written to
        #[arg(long, short, default_value = ".")]
        dir: PathBuf,

        /// Script language, by name or extension
        #[arg(long, short, default_value = "python")]
        lang: String,

        /// Write expectations to a separate .exp file per script
        #[arg(long)]
        independent: bool,
    },

    /// Push a script's title and steps back to its remote case
    #[command(alias = "ci")]
    Commit {
        /// Script to commit
        file: PathBuf,

        /// Send without asking; otherwise only show what would be sent
        #[arg(long, short)]
        yes: bool,
    },
}
