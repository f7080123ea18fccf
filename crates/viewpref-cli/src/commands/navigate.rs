//! Simulated navigations through the preference engine

use colored::Colorize;
use serde_json::json;
use viewpref_core::config::Config;
use viewpref_core::error::{OptionExt, PrefError, PrefResult};
use viewpref_core::hooks::{EngineBuilder, ModeSwitch, SaveOutcome, ViewPreferenceEngine};
use viewpref_core::navigation::NavigationRequest;

use super::open_store;
use crate::console::CliConsole;

pub struct OpenArgs {
    pub user: String,
    pub model: String,
    pub action: Option<String>,
    pub modes: Vec<String>,
    pub record: Option<String>,
    pub directives: Vec<(String, String)>,
    pub skip_preference: bool,
    pub menu: bool,
}

fn engine(config: &Config, user: &str) -> PrefResult<ViewPreferenceEngine> {
    EngineBuilder::new(user, open_store(config)?)
        .with_config(config.engine.clone())
        .build()
}

/// Build the request a host would send for `args`
fn build_request(engine: &ViewPreferenceEngine, args: &OpenArgs) -> NavigationRequest {
    let mut request = NavigationRequest::new(args.model.clone(), args.action.clone())
        .with_modes(args.modes.iter().map(String::as_str), engine.normalizer());
    for (key, value) in &args.directives {
        request = request.with_directive(key.clone(), value.clone());
    }
    if let Some(record) = &args.record {
        request = request.with_record(record.clone());
    }
    if args.skip_preference {
        request = request.skipping_preference();
    }
    request
}

/// Print the request as the engine would hand it to the host
pub async fn open(config: &Config, args: OpenArgs) -> PrefResult<()> {
    let engine = engine(config, &args.user)?;
    let request = build_request(&engine, &args);

    let outcome = if args.menu {
        engine.on_menu_selected(request).await
    } else {
        engine.on_entry_point_load(request).await
    };
    engine.end_session().await;

    let report = json!({
        "event": outcome.event.to_string(),
        "status": outcome.status.to_string(),
        "view_mode": outcome.request.view_mode(),
        "request": outcome.request,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Record a mode switch the way a host would, then end the session
pub async fn switch(
    config: &Config,
    user: &str,
    model: &str,
    mode: &str,
    action: Option<String>,
    action_name: Option<String>,
) -> PrefResult<()> {
    let console = CliConsole::new(true);
    let engine = engine(config, user)?;

    let mut switch = ModeSwitch::new(model, action, mode);
    if let Some(name) = action_name {
        switch = switch.with_action_name(name);
    }
    let handle = engine
        .on_mode_switch(switch)
        .context("Mode switch ignored: model and mode must not be empty")?;
    let outcome = handle.outcome().await;
    let report = engine.end_session().await;

    match outcome {
        SaveOutcome::Saved => console.success(&format!("Remembered '{}' for {}", mode, model)),
        other if report.flushed > 0 => console.warn(&format!(
            "First save attempt ended as {:?}; saved on session end",
            other
        )),
        other => {
            console.error(&format!("Mode switch was not saved: {:?}", other));
            return Err(PrefError::store_unavailable(format!(
                "could not remember '{}' for {}",
                mode, model
            )));
        }
    }
    println!(
        "{}",
        format!("session {} closed", engine.session_id()).dimmed()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.store.dir = Some(dir.path().to_path_buf());
        config
    }

    fn open_args(modes: &[&str]) -> OpenArgs {
        OpenArgs {
            user: "7".to_string(),
            model: "crm.lead".to_string(),
            action: Some("42".to_string()),
            modes: modes.iter().map(|m| m.to_string()).collect(),
            record: None,
            directives: vec![("view_type".to_string(), "kanban".to_string())],
            skip_preference: false,
            menu: false,
        }
    }

    #[tokio::test]
    async fn test_switch_then_open_reorders() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        switch(&config, "7", "crm.lead", "tree", Some("42".to_string()), None)
            .await
            .unwrap();

        let engine = engine(&config, "7").unwrap();
        let request = build_request(&engine, &open_args(&["kanban", "list", "form"]));
        let outcome = engine.on_entry_point_load(request).await;
        assert_eq!(outcome.request.view_mode(), "list,form,kanban");
        assert_eq!(
            outcome.request.directives.get("force_view_type").map(String::as_str),
            Some("list")
        );
        assert!(!outcome.request.directives.contains_key("view_type"));
    }

    #[tokio::test]
    async fn test_record_request_is_left_alone() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let engine = engine(&config, "7").unwrap();

        let mut args = open_args(&["list", "form"]);
        args.record = Some("1001".to_string());
        let request = build_request(&engine, &args);
        assert!(!request.accepts_override());
    }
}
