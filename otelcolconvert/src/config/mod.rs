//! The OpenTelemetry Collector configuration model.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

use crate::registry::ConverterRegistry;

mod component_id;
mod validate;

pub use component_id::{ComponentId, ComponentIdError, InstanceId, Kind, PipelineId, Signal};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0}")]
    Parse(String),
    #[error("'{section}' unknown type: {typ:?} for id: {id:?}")]
    UnknownType {
        section: &'static str,
        typ: String,
        id: String,
    },
    #[error("service must have at least one pipeline")]
    NoPipelines,
    #[error("pipeline {0:?} must have at least one receiver")]
    NoReceivers(String),
    #[error("pipeline {0:?} must have at least one exporter")]
    NoExporters(String),
    #[error("pipeline {pipeline:?} references {kind} {id:?} which is not configured")]
    UndefinedComponent {
        pipeline: String,
        kind: Kind,
        id: String,
    },
    #[error("pipeline {pipeline:?} references processor {id:?} multiple times")]
    DuplicateProcessor { pipeline: String, id: String },
    #[error("service::extensions: references extension {0:?} which is not configured")]
    UndefinedExtension(String),
    #[error("ambiguous id {0:?}: found both a receiver and a connector with this id")]
    AmbiguousReceiver(String),
    #[error("ambiguous id {0:?}: found both an exporter and a connector with this id")]
    AmbiguousExporter(String),
    #[error("connector {0:?} is used as an exporter but not as a receiver in any pipeline")]
    ConnectorNotReceiver(String),
    #[error("connector {0:?} is used as a receiver but not as an exporter in any pipeline")]
    ConnectorNotExporter(String),
}

/// A parsed collector configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OtelConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub receivers: IndexMap<ComponentId, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub processors: IndexMap<ComponentId, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub exporters: IndexMap<ComponentId, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub extensions: IndexMap<ComponentId, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub connectors: IndexMap<ComponentId, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub service: ServiceConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub extensions: Vec<ComponentId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pipelines: IndexMap<PipelineId, PipelineConfig>,
    /// Interpreted by the telemetry converter.
    #[serde(default)]
    pub telemetry: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub receivers: Vec<ComponentId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub processors: Vec<ComponentId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub exporters: Vec<ComponentId>,
}

impl OtelConfig {
    /// The configured components of the given kind.
    pub fn components(&self, kind: Kind) -> &IndexMap<ComponentId, Value> {
        match kind {
            Kind::Receiver => &self.receivers,
            Kind::Processor => &self.processors,
            Kind::Exporter => &self.exporters,
            Kind::Extension => &self.extensions,
            Kind::Connector => &self.connectors,
        }
    }

    pub fn is_connector(&self, id: &ComponentId) -> bool {
        self.connectors.contains_key(id)
    }

    /// The native configuration of a component. Components declared
    /// without a body read as `null`.
    pub fn component_config(&self, id: &InstanceId) -> &Value {
        static NULL: Value = Value::Null;
        self.components(id.kind())
            .get(id.component_id())
            .unwrap_or(&NULL)
    }
}

/// Parses collector YAML and checks that every component type is one the
/// registry knows how to convert.
pub fn read_config(input: &[u8], registry: &ConverterRegistry) -> Result<OtelConfig, ConfigError> {
    let is_blank = input.iter().all(|b| b.is_ascii_whitespace());
    let cfg: OtelConfig = if is_blank {
        OtelConfig::default()
    } else {
        let de = serde_yaml::Deserializer::from_slice(input);
        serde_path_to_error::deserialize(de).map_err(|err| ConfigError::Parse(err.to_string()))?
    };

    for kind in [
        Kind::Receiver,
        Kind::Processor,
        Kind::Exporter,
        Kind::Extension,
        Kind::Connector,
    ] {
        for id in cfg.components(kind).keys() {
            if !registry.has_factory(kind, id.typ()) {
                return Err(ConfigError::UnknownType {
                    section: kind.section(),
                    typ: id.typ().to_string(),
                    id: id.to_string(),
                });
            }
        }
    }

    log::debug!(
        "read otelcol config with {} pipelines",
        cfg.service.pipelines.len()
    );
    Ok(cfg)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
