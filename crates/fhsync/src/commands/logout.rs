//! `fhsync logout`: forget the stored session token (local only).

use fhsync_core::Client;
use serde_json::json;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub fn handle(client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    let had_token = client.session_token()?.is_some();
    client.logout()?;

    let color = output::should_color(global.color);
    let value = json!({ "logged_out": had_token });
    let text = || {
        if had_token {
            output::success("Session token cleared", color)
        } else {
            output::notice("No session token stored", color)
        }
    };
    output::print_output(&output::render(global.output, text, &value));
    Ok(())
}
