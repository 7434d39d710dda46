//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Demand-driven reactive data binding for text templates
#[derive(Parser, Debug)]
#[command(name = "pathbind")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug output (-d, -dd, -ddd for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Bind a data file to a template and print the rendered text
    Render {
        /// Template file
        #[arg(value_hint = ValueHint::FilePath)]
        template: PathBuf,

        /// TOML data file to bind
        #[arg(short = 'D', long, value_hint = ValueHint::FilePath)]
        data: Option<PathBuf>,

        /// Assignments applied after binding, e.g. user.name=Ada
        #[arg(short, long = "set", value_name = "PATH=VALUE")]
        set: Vec<String>,

        /// Base key for references (default from config)
        #[arg(short, long)]
        base_key: Option<String>,
    },

    /// List path references discovered in a template
    Paths {
        /// Template file
        #[arg(value_hint = ValueHint::FilePath)]
        template: PathBuf,

        /// Base key for references (default from config)
        #[arg(short, long)]
        base_key: Option<String>,

        /// Show the reference forest as a tree
        #[arg(short, long)]
        tree: bool,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config file path
    Path,

    /// Print a config template
    Init,
}
