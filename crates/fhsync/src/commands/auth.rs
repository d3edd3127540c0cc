//! `fhsync auth`: log in against a backend auth policy.

use fhsync_core::{AuthOutcome, Client};
use secrecy::SecretString;
use serde_json::json;

use crate::cli::{AuthArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Map an interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

pub async fn handle(client: &Client, args: AuthArgs, global: &GlobalOpts) -> Result<(), CliError> {
    super::ensure_session(client)?;

    let mut request = client.auth(args.policy.as_str());
    if let Some(user) = args.user {
        let password = match args.password {
            Some(password) => password,
            None => rpassword::prompt_password("Password: ").map_err(prompt_err)?,
        };
        request = request.credentials(user, SecretString::from(password));
    }

    let outcome = request.exec().await?;
    let policy = request.policy_id();
    let color = output::should_color(global.color);

    let (value, text) = match outcome {
        AuthOutcome::Authenticated { token_stored } => (
            json!({ "status": "authenticated", "policy": policy, "token_stored": token_stored }),
            output::success(&format!("Authenticated with policy {policy}"), color),
        ),
        AuthOutcome::Pending { url } => (
            json!({ "status": "pending", "policy": policy, "url": url }),
            output::notice(&format!("Continue authentication in a browser: {url}"), color),
        ),
    };

    output::print_output(&output::render(global.output, || text, &value));
    Ok(())
}
