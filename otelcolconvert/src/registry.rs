use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::config::{InstanceId, Kind};
use crate::converters::DEFAULT_CONVERTERS;
use crate::diag::Diagnostics;
use crate::state::State;

/// The native collector factory a converter handles, by component type.
///
/// The factory kind decides which pipeline roles the converter serves:
/// a connector factory serves as connector, exporter and receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Factory {
    Receiver(&'static str),
    Processor(&'static str),
    Exporter(&'static str),
    Extension(&'static str),
    Connector(&'static str),
}

impl Factory {
    pub fn typ(&self) -> &'static str {
        match self {
            Factory::Receiver(t)
            | Factory::Processor(t)
            | Factory::Exporter(t)
            | Factory::Extension(t)
            | Factory::Connector(t) => t,
        }
    }

    /// The config section the factory's components are declared in.
    pub fn kind(&self) -> Kind {
        match self {
            Factory::Receiver(_) => Kind::Receiver,
            Factory::Processor(_) => Kind::Processor,
            Factory::Exporter(_) => Kind::Exporter,
            Factory::Extension(_) => Kind::Extension,
            Factory::Connector(_) => Kind::Connector,
        }
    }

    fn served_kinds(&self) -> &'static [Kind] {
        match self {
            Factory::Receiver(_) => &[Kind::Receiver],
            Factory::Processor(_) => &[Kind::Processor],
            Factory::Exporter(_) => &[Kind::Exporter],
            Factory::Extension(_) => &[Kind::Extension],
            Factory::Connector(_) => &[Kind::Connector, Kind::Exporter, Kind::Receiver],
        }
    }
}

/// Converts one collector component type into Alloy blocks.
#[derive(Debug)]
pub struct ComponentConverter {
    pub factory: Factory,

    /// The Alloy component other blocks reference to send data to this
    /// component, e.g. `otelcol.processor.batch`. Extensions use it as the
    /// path their references are built from. Empty for receivers.
    pub input_component_name: &'static str,

    /// Converts the native configuration of one instance and appends the
    /// result to the state's output.
    pub convert_and_append: fn(&mut State, &InstanceId, &serde_yaml::Value) -> Diagnostics,
}

impl PartialEq for ComponentConverter {
    fn eq(&self, other: &Self) -> bool {
        self.factory == other.factory
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ConverterKey {
    kind: Kind,
    typ: String,
}

#[derive(Debug)]
pub struct ConverterRegistry<'a> {
    /// List of registered converters, in registration order.
    converters: Vec<&'a ComponentConverter>,
    by_key: HashMap<ConverterKey, &'a ComponentConverter>,
}

static DEFAULT_REGISTRY: Lazy<ConverterRegistry<'static>> = Lazy::new(ConverterRegistry::default);

impl<'a> Default for ConverterRegistry<'a> {
    fn default() -> Self {
        Self::new(DEFAULT_CONVERTERS)
    }
}

impl<'a> ConverterRegistry<'a> {
    pub fn new(converters: &[&'a ComponentConverter]) -> Self {
        let mut registry = Self {
            converters: Vec::new(),
            by_key: HashMap::new(),
        };
        for &c in converters {
            registry.register(c);
        }
        registry
    }

    /// Builds a registry from `extra` followed by the built-in converters.
    /// Entries in `extra` take precedence.
    pub fn with_extra(extra: &[&'a ComponentConverter]) -> Self {
        let mut registry = Self::new(extra);
        for &c in DEFAULT_CONVERTERS {
            registry.register(c);
        }
        registry
    }

    /// The shared registry of built-in converters.
    pub fn default_ref() -> &'static ConverterRegistry<'static> {
        &DEFAULT_REGISTRY
    }

    /// Register a converter. Keys that are already taken keep their
    /// existing converter.
    pub fn register(&mut self, converter: &'a ComponentConverter) {
        self.converters.push(converter);
        let typ = converter.factory.typ();
        for kind in converter.factory.served_kinds() {
            let key = ConverterKey {
                kind: *kind,
                typ: typ.to_string(),
            };
            self.by_key.entry(key).or_insert(converter);
        }
    }

    pub fn lookup(&self, kind: Kind, typ: &str) -> Option<&'a ComponentConverter> {
        let key = ConverterKey {
            kind,
            typ: typ.to_string(),
        };
        self.by_key.get(&key).copied()
    }

    /// Like [`Self::lookup`] but for keys the caller already knows are
    /// registered.
    ///
    /// # Panics
    /// Panics when no converter is registered for the key.
    pub fn get(&self, kind: Kind, typ: &str) -> &'a ComponentConverter {
        match self.lookup(kind, typ) {
            Some(c) => c,
            None => panic!("no converter registered for {} {:?}", kind, typ),
        }
    }

    /// Reports whether a factory of the given native kind exists for `typ`,
    /// i.e. whether `typ` may be declared in that config section.
    pub fn has_factory(&self, kind: Kind, typ: &str) -> bool {
        self.converters
            .iter()
            .any(|c| c.factory.kind() == kind && c.factory.typ() == typ)
    }
}
