//! Config subcommand handlers.

use dialoguer::{Input, Select};
use fhsync_config::{Manifest, TokenStoreKind, save_manifest};
use serde_json::json;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::manifest_path(global);

    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let current = config::load_manifest(global)?;
            eprintln!("fhsync: manifest setup");
            eprintln!("   Manifest path: {}\n", path.display());

            let host: String = Input::new()
                .with_prompt("Backend host")
                .default(current.host.clone().unwrap_or_else(|| "https://".into()))
                .interact_text()
                .map_err(prompt_err)?;

            let host = non_empty(host).ok_or_else(|| CliError::Validation {
                field: "host".into(),
                reason: "host cannot be empty".into(),
            })?;

            let appid: String = Input::new()
                .with_prompt("Application id")
                .default(current.appid.clone().unwrap_or_default())
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;

            let environment: String = Input::new()
                .with_prompt("Environment (optional)")
                .default(current.environment.clone().unwrap_or_default())
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;

            let store_choices = &[
                "Data directory file (default)",
                "System keyring",
            ];
            let store_selection = Select::new()
                .with_prompt("Where to store the session token?")
                .items(store_choices)
                .default(usize::from(current.token_store == TokenStoreKind::Keyring))
                .interact()
                .map_err(prompt_err)?;

            let manifest = Manifest {
                host: Some(host),
                appid: non_empty(appid),
                environment: non_empty(environment),
                token_store: if store_selection == 1 {
                    TokenStoreKind::Keyring
                } else {
                    TokenStoreKind::File
                },
                ..current
            };

            save_manifest(&path, &manifest)?;
            eprintln!(
                "{}",
                output::success(
                    &format!("Manifest written to {}", path.display()),
                    output::should_color(global.color)
                )
            );
            Ok(())
        }

        // ── Show: resolved manifest ─────────────────────────────────
        ConfigCommand::Show => {
            let manifest = config::load_manifest(global)?;
            let value = serde_json::to_value(&manifest)?;
            let text = toml::to_string_pretty(&manifest).map_err(fhsync_config::ConfigError::from)?;
            output::print_output(&output::render(global.output, || text, &value));
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            let shown = path.display().to_string();
            let value = json!({ "path": shown });
            output::print_output(&output::render(global.output, || shown.clone(), &value));
            Ok(())
        }
    }
}
