use std::fmt::{Display, Formatter};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static TYPE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z][0-9a-zA-Z_]{0,62}$").unwrap());

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ComponentIdError {
    #[error("id must not be empty")]
    Empty,
    #[error("invalid component type {0:?}")]
    InvalidType(String),
    #[error("name part must be specified after '/' in the id {0:?}")]
    EmptyName(String),
    #[error("unknown signal {0:?}")]
    UnknownSignal(String),
}

/// The role a component plays in the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Receiver,
    Processor,
    Exporter,
    Extension,
    Connector,
}

impl Kind {
    /// The top-level config section components of this kind are defined in.
    pub fn section(&self) -> &'static str {
        match self {
            Kind::Receiver => "receivers",
            Kind::Processor => "processors",
            Kind::Exporter => "exporters",
            Kind::Extension => "extensions",
            Kind::Connector => "connectors",
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Kind::Receiver => "receiver",
            Kind::Processor => "processor",
            Kind::Exporter => "exporter",
            Kind::Extension => "extension",
            Kind::Connector => "connector",
        };
        f.write_str(s)
    }
}

/// Identifies a configured component: `type` or `type/name`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct ComponentId {
    typ: String,
    name: String,
}

impl ComponentId {
    pub fn new(typ: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            typ: typ.into(),
            name: name.into(),
        }
    }

    pub fn typ(&self) -> &str {
        &self.typ
    }

    /// The optional name; empty when the id has no `/name` part.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for ComponentId {
    type Err = ComponentIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ComponentIdError::Empty);
        }

        let (typ, name) = match s.split_once('/') {
            Some((typ, name)) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(ComponentIdError::EmptyName(s.to_string()));
                }
                (typ.trim(), name)
            }
            None => (s, ""),
        };

        if !TYPE_REGEX.is_match(typ) {
            return Err(ComponentIdError::InvalidType(typ.to_string()));
        }
        Ok(Self::new(typ, name))
    }
}

impl TryFrom<String> for ComponentId {
    type Error = ComponentIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Display for ComponentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.name.is_empty() {
            f.write_str(&self.typ)
        } else {
            write!(f, "{}/{}", self.typ, self.name)
        }
    }
}

/// A component id together with the kind it is instantiated as.
///
/// Connectors are instantiated as [`Kind::Connector`] even though pipelines
/// list them among receivers and exporters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId {
    kind: Kind,
    id: ComponentId,
}

impl InstanceId {
    pub fn new(kind: Kind, id: ComponentId) -> Self {
        Self { kind, id }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn component_id(&self) -> &ComponentId {
        &self.id
    }
}

impl Display for InstanceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:?}", self.kind, self.id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Signal {
    Metrics,
    Logs,
    Traces,
}

impl Signal {
    pub const ALL: [Signal; 3] = [Signal::Metrics, Signal::Logs, Signal::Traces];

    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Metrics => "metrics",
            Signal::Logs => "logs",
            Signal::Traces => "traces",
        }
    }
}

impl Display for Signal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies a pipeline: `signal` or `signal/name`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct PipelineId {
    signal: Signal,
    name: String,
}

impl PipelineId {
    pub fn new(signal: Signal, name: impl Into<String>) -> Self {
        Self {
            signal,
            name: name.into(),
        }
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for PipelineId {
    type Err = ComponentIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id: ComponentId = s.parse()?;
        let signal = match id.typ() {
            "metrics" => Signal::Metrics,
            "logs" => Signal::Logs,
            "traces" => Signal::Traces,
            other => return Err(ComponentIdError::UnknownSignal(other.to_string())),
        };
        Ok(Self::new(signal, id.name()))
    }
}

impl TryFrom<String> for PipelineId {
    type Error = ComponentIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Display for PipelineId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.signal)
        } else {
            write!(f, "{}/{}", self.signal, self.name)
        }
    }
}
