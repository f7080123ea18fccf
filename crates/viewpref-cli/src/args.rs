//! CLI argument definitions using clap
//!
//! - viewpref get/set             # Read or write one preference
//! - viewpref open                # Simulate opening an entry point
//! - viewpref switch              # Simulate a mode switch
//! - viewpref list/clear          # Admin operations
//! - viewpref config              # Configuration files

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use viewpref_core::config::DEFAULT_CONFIG_FILE;

#[derive(Parser)]
#[command(name = "viewpref")]
#[command(about = "Remember and re-apply the last used view mode per entry point")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: String,

    /// Directory of the file preference store
    #[arg(long, global = true, env = "VIEWPREF_STORE_DIR")]
    pub store_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the stored preference for an entry point
    Get {
        #[arg(long, short, env = "VIEWPREF_USER")]
        user: String,

        /// Model of the entry point
        model: String,

        /// Action of the entry point
        #[arg(long, short)]
        action: Option<String>,

        /// Most recent preference for the model, whatever the action
        #[arg(long, conflicts_with = "action")]
        latest: bool,
    },

    /// Store a preference directly
    Set {
        #[arg(long, short, env = "VIEWPREF_USER")]
        user: String,

        model: String,

        /// View mode, aliases such as `tree` are normalized
        mode: String,

        #[arg(long, short)]
        action: Option<String>,

        #[arg(long)]
        action_name: Option<String>,
    },

    /// Simulate opening an entry point and print the rewritten request
    Open {
        #[arg(long, short, env = "VIEWPREF_USER")]
        user: String,

        model: String,

        #[arg(long, short)]
        action: Option<String>,

        /// Modes the entry point offers, in their default order
        #[arg(long, value_delimiter = ',', default_value = "list,kanban,form")]
        modes: Vec<String>,

        /// Open a single record instead of the collection
        #[arg(long)]
        record: Option<String>,

        /// Extra request directive, as KEY=VALUE
        #[arg(long = "directive", value_parser = parse_directive)]
        directives: Vec<(String, String)>,

        /// The caller picked the mode explicitly
        #[arg(long)]
        skip_preference: bool,

        /// Arrived through the menu rather than a direct link
        #[arg(long)]
        menu: bool,
    },

    /// Simulate the user switching modes, then end the session
    Switch {
        #[arg(long, short, env = "VIEWPREF_USER")]
        user: String,

        model: String,

        mode: String,

        #[arg(long, short)]
        action: Option<String>,

        #[arg(long)]
        action_name: Option<String>,
    },

    /// List stored preferences
    List {
        #[arg(long, short)]
        user: Option<String>,

        #[arg(long, short)]
        model: Option<String>,

        /// Maximum number of preferences to show
        #[arg(long, short, default_value = "50")]
        limit: usize,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Clear stored preferences
    Clear {
        #[arg(long, short, env = "VIEWPREF_USER")]
        user: String,

        /// Model to clear; required unless --all is given
        #[arg(required_unless_present = "all")]
        model: Option<String>,

        #[arg(long, short)]
        action: Option<String>,

        /// Clear every preference of the user
        #[arg(long, conflicts_with_all = ["model", "action"])]
        all: bool,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Manage configuration files
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigAction {
    /// Display current configuration settings
    Show,

    /// Validate configuration file for errors
    Validate,

    /// Create a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn parse_directive(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    if key.trim().is_empty() {
        return Err(format!("empty directive key in '{}'", raw));
    }
    Ok((key.trim().to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_directive() {
        assert_eq!(
            parse_directive("view_type=kanban").unwrap(),
            ("view_type".to_string(), "kanban".to_string())
        );
        assert!(parse_directive("view_type").is_err());
        assert!(parse_directive("=kanban").is_err());
    }

    #[test]
    fn test_open_modes_are_split() {
        let cli = Cli::try_parse_from([
            "viewpref", "open", "--user", "7", "crm.lead", "--modes", "kanban,tree,form",
            "--directive", "view_type=kanban",
        ])
        .unwrap();
        match cli.command {
            Commands::Open {
                modes, directives, ..
            } => {
                assert_eq!(modes, vec!["kanban", "tree", "form"]);
                assert_eq!(directives.len(), 1);
            }
            _ => panic!("expected open"),
        }
    }

    #[test]
    fn test_clear_requires_model_or_all() {
        assert!(Cli::try_parse_from(["viewpref", "clear", "--user", "7"]).is_err());
        assert!(Cli::try_parse_from(["viewpref", "clear", "--user", "7", "--all"]).is_ok());
        assert!(
            Cli::try_parse_from(["viewpref", "clear", "--user", "7", "crm.lead", "--all"]).is_err()
        );
    }
}
