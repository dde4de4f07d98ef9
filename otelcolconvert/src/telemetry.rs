use alloy_syntax::Block;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml::Value;

use crate::convert::AlloyFile;
use crate::diag::{Diagnostics, Severity};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TelemetryConfig {
    logs: Option<LogsConfig>,
    #[serde(flatten)]
    other: IndexMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LogsConfig {
    level: Option<String>,
    encoding: Option<String>,
    #[serde(flatten)]
    other: IndexMap<String, Value>,
}

/// Converts `service::telemetry` into the Alloy `logging` block.
/// Only log level and encoding have an equivalent; everything else is
/// reported and dropped.
pub(crate) fn convert_telemetry(file: &mut AlloyFile, telemetry: Option<&Value>) -> Diagnostics {
    let mut diags = Diagnostics::new();
    let telemetry = match telemetry {
        Some(v) if !v.is_null() => v,
        _ => return diags,
    };

    let cfg: TelemetryConfig = match serde_path_to_error::deserialize(telemetry.clone()) {
        Ok(cfg) => cfg,
        Err(err) => {
            diags.add(
                Severity::Critical,
                format!("failed to decode service::telemetry: {}", err),
            );
            return diags;
        }
    };

    for key in cfg.other.keys() {
        diags.add(
            Severity::Warning,
            format!("service::telemetry::{} is not converted", key),
        );
    }

    let Some(logs) = cfg.logs else {
        return diags;
    };
    for key in logs.other.keys() {
        diags.add(
            Severity::Warning,
            format!("service::telemetry::logs::{} is not converted", key),
        );
    }

    let mut block = Block::unlabeled(["logging"]);
    if let Some(level) = &logs.level {
        match log_level(level) {
            Some((alloy_level, exact)) => {
                if !exact {
                    diags.add(
                        Severity::Warning,
                        format!(
                            "service::telemetry::logs::level {:?} has no Alloy equivalent and was converted to {:?}",
                            level, alloy_level
                        ),
                    );
                }
                block.body_mut().append_attr("level", alloy_level);
            }
            None => diags.add(
                Severity::Critical,
                format!("service::telemetry::logs::level: unrecognized level {:?}", level),
            ),
        }
    }
    if let Some(encoding) = &logs.encoding {
        match encoding.as_str() {
            "json" => block.body_mut().append_attr("format", "json"),
            "console" => block.body_mut().append_attr("format", "logfmt"),
            other => diags.add(
                Severity::Critical,
                format!("service::telemetry::logs::encoding: unrecognized encoding {:?}", other),
            ),
        }
    }

    file.body_mut().append_nonempty_block(block);
    diags
}

/// Maps a collector log level to an Alloy one. The flag is false when the
/// level had to be approximated.
fn log_level(level: &str) -> Option<(&'static str, bool)> {
    match level.to_ascii_lowercase().as_str() {
        "debug" => Some(("debug", true)),
        "info" => Some(("info", true)),
        "warn" => Some(("warn", true)),
        "error" => Some(("error", true)),
        "dpanic" | "panic" | "fatal" => Some(("error", false)),
        _ => None,
    }
}
