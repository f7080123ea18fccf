//! Preference inspection and admin commands

use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use dialoguer::{Confirm, theme::ColorfulTheme};
use viewpref_core::config::Config;
use viewpref_core::error::{PrefError, PrefResult, ResultExt};
use viewpref_core::mode::ModeNormalizer;
use viewpref_core::types::{PreferenceKey, UserId};
use viewpref_store::{PreferenceAdmin, PreferenceFilter, UserPreferenceService};

use super::open_store;
use crate::console::CliConsole;

fn service(config: &Config, user: &str) -> PrefResult<UserPreferenceService> {
    let normalizer = ModeNormalizer::with_aliases(&config.engine.mode_aliases)?;
    Ok(UserPreferenceService::new(user, open_store(config)?).with_normalizer(normalizer))
}

/// Show the preference for one entry point
pub async fn get(
    config: &Config,
    user: &str,
    model: &str,
    action: Option<&str>,
    latest: bool,
) -> PrefResult<()> {
    let service = service(config, user)?;
    let view = if latest {
        service.get_last_view_for_model(model).await?
    } else {
        service.get_last_view(model, action).await?
    };

    match view {
        Some(view) => {
            println!("{}", view.view_type.bright_cyan().bold());
            let console = CliConsole::new(true);
            console.field("model", &view.model_name);
            console.field("action", view.action_id.as_deref().unwrap_or("none"));
            if let Some(name) = &view.action_name {
                console.field("action name", name);
            }
        }
        None => println!("{}", "No preference stored.".yellow()),
    }
    Ok(())
}

/// Store a preference without going through the engine
pub async fn set(
    config: &Config,
    user: &str,
    model: &str,
    mode: &str,
    action: Option<&str>,
    action_name: Option<&str>,
) -> PrefResult<()> {
    let console = CliConsole::new(true);
    let service = service(config, user)?;

    if !service.save_last_view(model, mode, action, action_name).await {
        console.error("Preference was not saved");
        return Err(PrefError::store_rejected(format!(
            "could not save '{}' for {}",
            mode, model
        )));
    }

    let key = PreferenceKey::new(user, model, action);
    console.success(&format!(
        "Saved '{}' for {}",
        service.get_last_view(model, action).await?.map(|v| v.view_type).unwrap_or_default(),
        key
    ));
    Ok(())
}

/// List stored preferences
pub async fn list(
    config: &Config,
    user: Option<String>,
    model: Option<String>,
    limit: usize,
    json: bool,
) -> PrefResult<()> {
    let store = open_store(config)?;

    let mut filter = PreferenceFilter::new().with_limit(limit);
    if let Some(user) = user {
        filter = filter.with_user(user);
    }
    if let Some(model) = model {
        filter = filter.with_model(model);
    }
    let records = store.list(&filter).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{}", "No preferences found.".yellow());
        return Ok(());
    }

    println!("\n{}", "Preferences".bold().underline());
    println!(
        "{}",
        format!("Showing {} preference(s)", records.len()).dimmed()
    );
    println!();

    for record in &records {
        let p = &record.preference;
        let action = p.action_id.as_deref().unwrap_or("none");
        let name = p
            .action_name
            .as_ref()
            .map(|n| format!(" ({})", n))
            .unwrap_or_default();
        println!(
            "  {} {}{} {} {}",
            p.user_id.as_str().bright_cyan(),
            format!("{}/{}", p.model, action).bright_white(),
            name.dimmed(),
            "→".dimmed(),
            p.mode.as_str().green().bold()
        );
        println!("    {}", format_relative_time(p.updated_at).dimmed());
    }
    println!();
    Ok(())
}

/// Clear one preference or all of a user's
pub async fn clear(
    config: &Config,
    user: &str,
    model: Option<String>,
    action: Option<String>,
    all: bool,
    force: bool,
) -> PrefResult<()> {
    let console = CliConsole::new(true);
    let store = open_store(config)?;

    let target = match (&model, all) {
        (_, true) => format!("all preferences of user {}", user),
        (Some(model), false) => format!(
            "the preference for {}/{}",
            model,
            action.as_deref().unwrap_or("none")
        ),
        (None, false) => return Err(PrefError::invalid_input("a model or --all is required")),
    };

    if !force {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Clear {}?", target))
            .default(false)
            .interact()
            .context("Reading confirmation")?;
        if !confirmed {
            println!("{}", "Cancelled.".yellow());
            return Ok(());
        }
    }

    if all {
        let removed = store.clear_user(&UserId::from(user)).await?;
        console.success(&format!("Cleared {} preference(s)", removed));
    } else if let Some(model) = model {
        let key = PreferenceKey::new(user, model, action);
        store.delete(&key).await?;
        console.success(&format!("Cleared {}", target));
    }
    Ok(())
}

fn format_relative_time(at: DateTime<Utc>) -> String {
    let elapsed = Utc::now().signed_duration_since(at);
    if elapsed.num_seconds() < 60 {
        "just now".to_string()
    } else if elapsed.num_minutes() < 60 {
        format!("{} min ago", elapsed.num_minutes())
    } else if elapsed.num_hours() < 24 {
        format!("{} h ago", elapsed.num_hours())
    } else {
        at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_relative_time() {
        assert_eq!(format_relative_time(Utc::now()), "just now");
        assert_eq!(
            format_relative_time(Utc::now() - Duration::minutes(5)),
            "5 min ago"
        );
        assert_eq!(
            format_relative_time(Utc::now() - Duration::hours(3)),
            "3 h ago"
        );
    }
}
