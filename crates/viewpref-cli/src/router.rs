//! Command routing logic for CLI

use viewpref_core::config::{Config, ConfigLoader, LoggingConfig};
use viewpref_core::error::PrefResult;

use crate::args::{Cli, Commands, ConfigAction};
use crate::{commands, logging};

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli) -> PrefResult<()> {
    // Config commands report on the file themselves, so a broken file must
    // not stop them from starting
    if let Commands::Config { action } = &cli.command {
        logging::init(&LoggingConfig::default(), cli.verbose);
        return match action {
            ConfigAction::Show => commands::config::show(&cli.config_file).await,
            ConfigAction::Validate => commands::config::validate(&cli.config_file).await,
            ConfigAction::Init { force } => commands::config::init(&cli.config_file, *force).await,
        };
    }

    let config = load_config(&cli)?;
    logging::init(&config.logging, cli.verbose);

    match cli.command {
        Commands::Get {
            user,
            model,
            action,
            latest,
        } => commands::preference::get(&config, &user, &model, action.as_deref(), latest).await,
        Commands::Set {
            user,
            model,
            mode,
            action,
            action_name,
        } => {
            commands::preference::set(
                &config,
                &user,
                &model,
                &mode,
                action.as_deref(),
                action_name.as_deref(),
            )
            .await
        }
        Commands::Open {
            user,
            model,
            action,
            modes,
            record,
            directives,
            skip_preference,
            menu,
        } => {
            let args = commands::navigate::OpenArgs {
                user,
                model,
                action,
                modes,
                record,
                directives,
                skip_preference,
                menu,
            };
            commands::navigate::open(&config, args).await
        }
        Commands::Switch {
            user,
            model,
            mode,
            action,
            action_name,
        } => commands::navigate::switch(&config, &user, &model, &mode, action, action_name).await,
        Commands::List {
            user,
            model,
            limit,
            json,
        } => commands::preference::list(&config, user, model, limit, json).await,
        Commands::Clear {
            user,
            model,
            action,
            all,
            force,
        } => commands::preference::clear(&config, &user, model, action, all, force).await,
        Commands::Config { .. } => Ok(()),
    }
}

/// Configuration file, then environment, then command line
fn load_config(cli: &Cli) -> PrefResult<Config> {
    let mut config = ConfigLoader::new().with_file(&cli.config_file).load()?;
    if let Some(dir) = &cli.store_dir {
        config.store.dir = Some(dir.clone());
    }
    Ok(config)
}
