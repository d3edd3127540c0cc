//! `fhsync device`: print the persistent device identifier.

use fhsync_core::Client;
use serde_json::json;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub fn handle(client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    let device_id = client.device_id()?;
    let value = json!({ "device_id": device_id });
    output::print_output(&output::render(global.output, || device_id.clone(), &value));
    Ok(())
}
