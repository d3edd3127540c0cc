//! Output formatting: text, JSON, compact JSON.
//!
//! Text output is a short status line plus `key: value` details; the
//! structured formats serialize a `serde_json::Value`.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde_json::Value;

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// `✓ message`, green when color is on.
pub fn success(message: &str, color: bool) -> String {
    if color {
        format!("{} {message}", "✓".green().bold())
    } else {
        format!("✓ {message}")
    }
}

/// `! message`, yellow when color is on.
pub fn notice(message: &str, color: bool) -> String {
    if color {
        format!("{} {message}", "!".yellow().bold())
    } else {
        format!("! {message}")
    }
}

/// Aligned `key: value` lines.
pub fn details(rows: &[(&str, String)], color: bool) -> String {
    let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(key, value)| {
            let padded = format!("{key:>width$}");
            if color {
                format!("  {}  {value}", padded.dimmed())
            } else {
                format!("  {padded}  {value}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Render dispatch ──────────────────────────────────────────────────

/// Render either the text form or the structured value.
pub fn render(format: OutputFormat, text: impl FnOnce() -> String, value: &Value) -> String {
    match format {
        OutputFormat::Text => text(),
        OutputFormat::Json => render_json_pretty(value),
        OutputFormat::JsonCompact => value.to_string(),
    }
}

pub(crate) fn render_json_pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Print the rendered output to stdout.
pub fn print_output(output: &str) {
    if output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}
