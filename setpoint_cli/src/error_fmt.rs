//! Human-readable error descriptions, exit codes and structured JSON errors.

use setpoint_core::error::{ConfigError, DegenerateInput, ResetError};
use setpoint_sources::SourceError;

/// Prefix for errors raised while loading or validating configuration.
pub const CONFIG_CONTEXT: &str = "invalid configuration";
/// Prefix for errors raised while opening readings or history.
pub const SOURCE_CONTEXT: &str = "reading source";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Kind {
    Config,
    Source,
    Degenerate,
    Other,
}

fn classify(err: &eyre::Report) -> Kind {
    if err.downcast_ref::<DegenerateInput>().is_some() {
        return Kind::Degenerate;
    }
    if err.downcast_ref::<ConfigError>().is_some() || err.downcast_ref::<toml::de::Error>().is_some() {
        return Kind::Config;
    }
    if err.downcast_ref::<SourceError>().is_some() {
        return Kind::Source;
    }
    if let Some(re) = err.downcast_ref::<ResetError>() {
        return match re {
            ResetError::Config(_) => Kind::Config,
            ResetError::Degenerate(_) => Kind::Degenerate,
            ResetError::Source(_) => Kind::Source,
            ResetError::State(_) => Kind::Other,
        };
    }
    let msg = err.to_string();
    if msg.starts_with(CONFIG_CONTEXT) {
        Kind::Config
    } else if msg.starts_with(SOURCE_CONTEXT) {
        Kind::Source
    } else {
        Kind::Other
    }
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    let root = err.root_cause().to_string();
    match classify(err) {
        Kind::Config => format!(
            "What happened: Invalid configuration ({root}).\nLikely causes: Out-of-range or inconsistent values in the TOML.\nHow to fix: Edit the config file (or run `check-config`), then rerun."
        ),
        Kind::Source => format!(
            "What happened: Could not read input data ({root}).\nLikely causes: Missing file, wrong CSV headers, or a non-numeric cell.\nHow to fix: Check the path and the CSV layout, then rerun."
        ),
        Kind::Degenerate => format!(
            "What happened: The start-time model cannot use these conditions ({root}).\nLikely causes: Occupied setpoint equal to the zone or outdoor temperature, or a zero outdoor coefficient.\nHow to fix: Check the temperatures passed in, or use `--method interpolate`."
        ),
        Kind::Other => {
            let msg = err.to_string();
            let mut cause = String::new();
            if let Some(src) = err.source() {
                cause = format!(" Cause: {src}");
            }
            format!(
                "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
            )
        }
    }
}

/// Stable exit codes: 3 configuration, 4 reading source, 5 degenerate input, 1 other.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match classify(err) {
        Kind::Config => 3,
        Kind::Source => 4,
        Kind::Degenerate => 5,
        Kind::Other => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = match classify(err) {
        Kind::Config => "Config",
        Kind::Source => "Source",
        Kind::Degenerate => "DegenerateInput",
        Kind::Other => "Error",
    };
    json!({
        "reason": reason,
        "detail": err.root_cause().to_string(),
        "message": humanize(err),
    })
    .to_string()
}
