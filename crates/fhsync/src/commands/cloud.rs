//! `fhsync cloud`: call a backend-defined path with the current session.

use std::collections::BTreeMap;
use std::str::FromStr;

use fhsync_core::{Client, HttpMethod};
use serde_json::{Map, Value, json};

use crate::cli::{CloudArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

fn parse_headers(raw: &[String]) -> Result<BTreeMap<String, String>, CliError> {
    raw.iter()
        .map(|h| {
            let (name, value) = h.split_once(':').ok_or_else(|| CliError::Validation {
                field: "header".into(),
                reason: format!("expected NAME:VALUE, got '{h}'"),
            })?;
            Ok((name.trim().to_owned(), value.trim().to_owned()))
        })
        .collect()
}

pub async fn handle(client: &Client, args: CloudArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let method = HttpMethod::from_str(&args.method).map_err(|_| CliError::Validation {
        field: "method".into(),
        reason: format!("unsupported HTTP method '{}'", args.method),
    })?;
    let headers = parse_headers(&args.headers)?;
    let body = args
        .data
        .as_deref()
        .map(serde_json::from_str::<Map<String, Value>>)
        .transpose()?;

    super::ensure_session(client)?;

    let headers = (!headers.is_empty()).then_some(headers);
    let response = client
        .perform_cloud_request(&args.path, method, headers, body)
        .await?;

    let value = json!({
        "status": response.status,
        "body": response.parsed_body().cloned().unwrap_or_else(|| Value::String(response.text.clone())),
    });
    let text = || match response.parsed_body() {
        Some(body) => output::render_json_pretty(body),
        None => response.text.clone(),
    };

    output::print_output(&output::render(global.output, text, &value));
    Ok(())
}
