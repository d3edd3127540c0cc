//! `fhsync init`: bootstrap the client and report the resolved session.

use std::time::Duration;

use fhsync_core::Client;
use serde_json::json;

use crate::cli::{GlobalOpts, InitArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(client: &Client, args: InitArgs, global: &GlobalOpts) -> Result<(), CliError> {
    client.init(args.uri.as_deref().unwrap_or(""))?;

    if let Some(secs) = args.wait {
        client.wait_until_online(Duration::from_secs(secs)).await?;
    }

    let config = client.config().ok_or(fhsync_core::CoreError::NotInitialized)?;
    let props = client.cloud_properties().ok_or(fhsync_core::CoreError::NotInitialized)?;
    let state = client.connectivity_state();
    let color = output::should_color(global.color);

    let value = json!({
        "host": props.host.as_str(),
        "tracking_id": props.tracking_id.to_string(),
        "device_id": config.device_id,
        "app_id": config.app_id,
        "environment": props.environment,
        "connectivity": state.to_string(),
    });

    let text = || {
        let mut rows = vec![
            ("host", props.host.to_string()),
            ("tracking id", props.tracking_id.to_string()),
            ("device id", config.device_id.clone()),
            ("app id", config.app_id.clone().unwrap_or_else(|| "-".into())),
        ];
        if let Some(ref env) = props.environment {
            rows.push(("environment", env.clone()));
        }
        rows.push(("connectivity", state.to_string()));
        format!(
            "{}\n{}",
            output::success("Client initialized", color),
            output::details(&rows, color)
        )
    };

    output::print_output(&output::render(global.output, text, &value));
    Ok(())
}
