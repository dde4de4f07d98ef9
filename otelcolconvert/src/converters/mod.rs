//! Built-in component converters.
//!
//! Each converter is a [`ComponentConverter`] constant that decodes the
//! native configuration of one collector component type and appends the
//! equivalent Alloy block.

use std::collections::BTreeMap;

use alloy_syntax::{Block, Expr};
use serde::de::{self, DeserializeOwned, Unexpected};
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

use crate::config::{ComponentId, InstanceId, Signal};
use crate::diag::{Diagnostics, Severity};
use crate::registry::ComponentConverter;
use crate::state::{AlloyBlock, AlloyExpr, Consumer, State};

mod basicauth_extension;
mod batch_processor;
mod bearertokenauth_extension;
mod debug_exporter;
mod file_storage_extension;
mod memory_limiter_processor;
mod otlp_exporter;
mod otlp_receiver;
mod otlphttp_exporter;
mod spanmetrics_connector;

pub use basicauth_extension::BASICAUTH_EXTENSION;
pub use batch_processor::BATCH_PROCESSOR;
pub use bearertokenauth_extension::BEARERTOKENAUTH_EXTENSION;
pub use debug_exporter::DEBUG_EXPORTER;
pub use file_storage_extension::FILE_STORAGE_EXTENSION;
pub use memory_limiter_processor::MEMORY_LIMITER_PROCESSOR;
pub use otlp_exporter::OTLP_EXPORTER;
pub use otlp_receiver::OTLP_RECEIVER;
pub use otlphttp_exporter::OTLPHTTP_EXPORTER;
pub use spanmetrics_connector::SPANMETRICS_CONNECTOR;

pub const DEFAULT_CONVERTERS: &[&ComponentConverter] = &[
    &OTLP_RECEIVER,
    &BATCH_PROCESSOR,
    &MEMORY_LIMITER_PROCESSOR,
    &OTLP_EXPORTER,
    &OTLPHTTP_EXPORTER,
    &DEBUG_EXPORTER,
    &BASICAUTH_EXTENSION,
    &BEARERTOKENAUTH_EXTENSION,
    &FILE_STORAGE_EXTENSION,
    &SPANMETRICS_CONNECTOR,
];

/// Decodes a native component configuration. A `null` configuration
/// decodes to the defaults.
pub(crate) fn decode_config<T>(id: &InstanceId, cfg: &Value) -> Result<T, Diagnostics>
where
    T: DeserializeOwned + Default,
{
    if cfg.is_null() {
        return Ok(T::default());
    }
    serde_path_to_error::deserialize(cfg.clone())
        .map_err(|err| Diagnostics::critical(format!("failed to decode {}: {}", id, err)))
}

/// Creates the top-level block for a component, e.g. `otelcol.processor.batch "default"`.
pub(crate) fn component_block(path: &str, state: &State) -> AlloyBlock {
    Block::new(path.split('.'), state.alloy_component_label())
}

/// Records the conversion of `id` into `block` and appends the block.
pub(crate) fn append_converted(
    state: &mut State,
    diags: &mut Diagnostics,
    id: &InstanceId,
    block: AlloyBlock,
) {
    let label = block.label.clone().unwrap_or_default();
    log::debug!("converted {} into {} {:?}", id, block.name_path(), label);
    diags.add(
        Severity::Info,
        format!("Converted {} into {} {:?}", id, block.name_path(), label),
    );
    state.append_block(block);
}

/// Adds a warning for a native setting that has no Alloy equivalent.
pub(crate) fn warn_unsupported<T>(
    diags: &mut Diagnostics,
    id: &InstanceId,
    field: &str,
    value: &Option<T>,
) {
    if value.is_some() {
        diags.add(
            Severity::Warning,
            format!("{}: the {:?} setting is not supported and was dropped", id, field),
        );
    }
}

/// Builds the `output` block routing each signal to the components that
/// consume it. Signals without consumers are left out.
pub(crate) fn output_block(state: &State, id: &InstanceId, signals: &[Signal]) -> AlloyBlock {
    let mut output = Block::unlabeled(["output"]);
    for signal in signals {
        let consumers = state.next(id, *signal);
        if !consumers.is_empty() {
            let refs = consumers.iter().map(Consumer::to_expr).collect();
            output.body_mut().append_attr(signal.as_str(), Expr::Array(refs));
        }
    }
    output
}

/// Deserializes a field that may be present with an empty value, such as
/// `grpc:` under the OTLP receiver protocols. Presence alone enables it.
pub(crate) fn present_or_default<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Some(Option::<T>::deserialize(deserializer)?.unwrap_or_default()))
}

/// Deserializes a string field that may be written as a bare number or
/// bool, e.g. `password: 123456`. The collector accepts these as strings.
pub(crate) fn weak_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(value) => scalar_string(value).map(Some),
        None => Ok(None),
    }
}

/// Like [`weak_string`] for string maps such as `headers`.
pub(crate) fn weak_string_map<'de, D>(
    deserializer: D,
) -> Result<Option<BTreeMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(map) = Option::<BTreeMap<String, Value>>::deserialize(deserializer)? else {
        return Ok(None);
    };
    map.into_iter()
        .map(|(k, v)| Ok((k, scalar_string(v)?)))
        .collect::<Result<_, D::Error>>()
        .map(Some)
}

fn scalar_string<E: de::Error>(value: Value) -> Result<String, E> {
    let unexpected = match value {
        Value::String(s) => return Ok(s),
        Value::Number(n) => return Ok(n.to_string()),
        Value::Bool(b) => return Ok(b.to_string()),
        Value::Null => Unexpected::Unit,
        Value::Sequence(_) => Unexpected::Seq,
        Value::Mapping(_) => Unexpected::Map,
        Value::Tagged(_) => Unexpected::Other("tagged value"),
    };
    Err(E::invalid_type(unexpected, &"a string"))
}

/// Formats a size in mebibytes the way Alloy size strings are written.
pub(crate) fn mib(n: u64) -> String {
    format!("{}MiB", n)
}

pub(crate) fn headers_expr(headers: &BTreeMap<String, String>) -> AlloyExpr {
    Expr::Object(
        headers
            .iter()
            .map(|(k, v)| (k.clone(), Expr::string(v)))
            .collect(),
    )
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct TlsConfig {
    pub insecure: Option<bool>,
    pub insecure_skip_verify: Option<bool>,
    pub server_name_override: Option<String>,
    pub ca_file: Option<String>,
    pub ca_pem: Option<String>,
    pub cert_file: Option<String>,
    pub cert_pem: Option<String>,
    pub key_file: Option<String>,
    pub key_pem: Option<String>,
    pub client_ca_file: Option<String>,
    pub min_version: Option<String>,
    pub max_version: Option<String>,
    pub reload_interval: Option<String>,
}

impl TlsConfig {
    pub fn to_block(&self) -> AlloyBlock {
        let mut block = Block::unlabeled(["tls"]);
        let body = block.body_mut();
        body.append_opt_attr("insecure", self.insecure);
        body.append_opt_attr("insecure_skip_verify", self.insecure_skip_verify);
        body.append_opt_attr("server_name", self.server_name_override.clone());
        body.append_opt_attr("ca_file", self.ca_file.clone());
        body.append_opt_attr("ca_pem", self.ca_pem.clone());
        body.append_opt_attr("cert_file", self.cert_file.clone());
        body.append_opt_attr("cert_pem", self.cert_pem.clone());
        body.append_opt_attr("key_file", self.key_file.clone());
        body.append_opt_attr("key_pem", self.key_pem.clone());
        body.append_opt_attr("client_ca_file", self.client_ca_file.clone());
        body.append_opt_attr("min_version", self.min_version.clone());
        body.append_opt_attr("max_version", self.max_version.clone());
        body.append_opt_attr("reload_interval", self.reload_interval.clone());
        block
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct AuthConfig {
    pub authenticator: ComponentId,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct QueueConfig {
    pub enabled: Option<bool>,
    pub num_consumers: Option<u32>,
    pub queue_size: Option<u32>,
    pub storage: Option<ComponentId>,
}

impl QueueConfig {
    pub fn to_block(&self, state: &State) -> AlloyBlock {
        let mut block = Block::unlabeled(["sending_queue"]);
        let body = block.body_mut();
        body.append_opt_attr("enabled", self.enabled);
        body.append_opt_attr("num_consumers", self.num_consumers);
        body.append_opt_attr("queue_size", self.queue_size);
        if let Some(storage) = &self.storage {
            body.append_attr("storage", state.extension_ref(storage, "handler"));
        }
        block
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RetryConfig {
    pub enabled: Option<bool>,
    pub initial_interval: Option<String>,
    pub randomization_factor: Option<f64>,
    pub multiplier: Option<f64>,
    pub max_interval: Option<String>,
    pub max_elapsed_time: Option<String>,
}

impl RetryConfig {
    pub fn to_block(&self) -> AlloyBlock {
        let mut block = Block::unlabeled(["retry_on_failure"]);
        let body = block.body_mut();
        body.append_opt_attr("enabled", self.enabled);
        body.append_opt_attr("initial_interval", self.initial_interval.clone());
        body.append_opt_attr("randomization_factor", self.randomization_factor);
        body.append_opt_attr("multiplier", self.multiplier);
        body.append_opt_attr("max_interval", self.max_interval.clone());
        body.append_opt_attr("max_elapsed_time", self.max_elapsed_time.clone());
        block
    }
}
