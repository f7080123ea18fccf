//! Viewpref CLI application
//!
//! Inspect and edit the last used view mode preferences kept by the file
//! store, and simulate navigations through the preference engine.
//!
//! # Installation
//!
//! ```bash
//! cargo install --path crates/viewpref-cli
//! ```
//!
//! # Examples
//!
//! ```bash
//! viewpref set --user 7 crm.lead list --action 42
//! viewpref open --user 7 crm.lead --action 42 --modes kanban,list,form
//! viewpref list --user 7
//! viewpref clear --user 7 --all --force
//! ```

mod args;
mod commands;
mod console;
mod logging;
mod router;

use clap::Parser;
use viewpref_core::error::PrefResult;

pub use args::{Cli, Commands, ConfigAction};

#[tokio::main]
async fn main() -> PrefResult<()> {
    let cli = Cli::parse();
    router::route(cli).await
}
