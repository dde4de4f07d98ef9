//! Converts OpenTelemetry Collector configuration into Alloy configuration.
//!
//! The entry point is [`convert`], which takes collector YAML and returns
//! the equivalent Alloy source together with [`Diagnostics`] describing
//! what was converted, approximated or dropped.
//!
//! ```
//! let input = br#"
//! receivers:
//!   otlp:
//!     protocols:
//!       grpc:
//! exporters:
//!   debug:
//! service:
//!   pipelines:
//!     traces:
//!       receivers: [otlp]
//!       exporters: [debug]
//! "#;
//!
//! let (output, diags) = otelcolconvert::convert(input, &[]);
//! assert!(!diags.has_critical());
//! assert!(String::from_utf8(output.unwrap())
//!     .unwrap()
//!     .contains(r#"otelcol.exporter.debug "default" { }"#));
//! ```

pub mod config;
mod convert;
pub mod converters;
pub mod diag;
mod labels;
pub mod pipeline_group;
pub mod registry;
pub mod state;
mod telemetry;

pub use convert::{append_config, convert, convert_envvars, convert_with, AlloyFile, AppendOptions};
pub use diag::{Diagnostic, Diagnostics, Severity};
pub use registry::{ComponentConverter, ConverterRegistry, Factory};
