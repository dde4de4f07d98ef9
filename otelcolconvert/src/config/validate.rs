use std::collections::HashSet;

use super::{ConfigError, Kind, OtelConfig};

impl OtelConfig {
    /// Checks the structural rules the collector enforces before starting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pipelines = &self.service.pipelines;
        if pipelines.is_empty() {
            return Err(ConfigError::NoPipelines);
        }

        for id in &self.service.extensions {
            if !self.extensions.contains_key(id) {
                return Err(ConfigError::UndefinedExtension(id.to_string()));
            }
        }

        for id in self.connectors.keys() {
            if self.receivers.contains_key(id) {
                return Err(ConfigError::AmbiguousReceiver(id.to_string()));
            }
            if self.exporters.contains_key(id) {
                return Err(ConfigError::AmbiguousExporter(id.to_string()));
            }
        }

        let mut connectors_as_exporter = HashSet::new();
        let mut connectors_as_receiver = HashSet::new();

        for (pipeline_id, pipeline) in pipelines {
            let name = pipeline_id.to_string();
            if pipeline.receivers.is_empty() {
                return Err(ConfigError::NoReceivers(name));
            }
            if pipeline.exporters.is_empty() {
                return Err(ConfigError::NoExporters(name));
            }

            for id in &pipeline.receivers {
                if self.is_connector(id) {
                    connectors_as_receiver.insert(id);
                } else if !self.receivers.contains_key(id) {
                    return Err(undefined(&name, Kind::Receiver, id));
                }
            }

            let mut seen = HashSet::new();
            for id in &pipeline.processors {
                if !self.processors.contains_key(id) {
                    return Err(undefined(&name, Kind::Processor, id));
                }
                if !seen.insert(id) {
                    return Err(ConfigError::DuplicateProcessor {
                        pipeline: name,
                        id: id.to_string(),
                    });
                }
            }

            for id in &pipeline.exporters {
                if self.is_connector(id) {
                    connectors_as_exporter.insert(id);
                } else if !self.exporters.contains_key(id) {
                    return Err(undefined(&name, Kind::Exporter, id));
                }
            }
        }

        for id in self.connectors.keys() {
            let as_exporter = connectors_as_exporter.contains(id);
            let as_receiver = connectors_as_receiver.contains(id);
            if as_exporter && !as_receiver {
                return Err(ConfigError::ConnectorNotReceiver(id.to_string()));
            }
            if as_receiver && !as_exporter {
                return Err(ConfigError::ConnectorNotExporter(id.to_string()));
            }
        }

        Ok(())
    }
}

fn undefined(pipeline: &str, kind: Kind, id: &super::ComponentId) -> ConfigError {
    ConfigError::UndefinedComponent {
        pipeline: pipeline.to_string(),
        kind,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use crate::config::{read_config, ConfigError};
    use crate::registry::ConverterRegistry;

    fn validate(src: &str) -> Result<(), ConfigError> {
        read_config(src.as_bytes(), ConverterRegistry::default_ref())
            .unwrap()
            .validate()
    }

    const COMPONENTS: &str = r#"
receivers:
  otlp:
processors:
  batch:
exporters:
  debug:
connectors:
  spanmetrics:
extensions:
  basicauth:
"#;

    #[test]
    fn test_validate() {
        let tests = vec![
            (
                r#"
service:
  extensions: [basicauth]
  pipelines:
    traces:
      receivers: [otlp]
      processors: [batch]
      exporters: [debug, spanmetrics]
    metrics:
      receivers: [spanmetrics]
      exporters: [debug]
"#,
                None,
            ),
            ("service:\n", Some("service must have at least one pipeline")),
            (
                r#"
service:
  pipelines:
    traces:
      exporters: [debug]
"#,
                Some(r#"pipeline "traces" must have at least one receiver"#),
            ),
            (
                r#"
service:
  pipelines:
    traces/a:
      receivers: [otlp]
"#,
                Some(r#"pipeline "traces/a" must have at least one exporter"#),
            ),
            (
                r#"
service:
  pipelines:
    traces:
      receivers: [otlp/2]
      exporters: [debug]
"#,
                Some(r#"pipeline "traces" references receiver "otlp/2" which is not configured"#),
            ),
            (
                r#"
service:
  pipelines:
    traces:
      receivers: [otlp]
      processors: [batch, batch]
      exporters: [debug]
"#,
                Some(r#"pipeline "traces" references processor "batch" multiple times"#),
            ),
            (
                r#"
service:
  extensions: [bearertokenauth]
  pipelines:
    traces:
      receivers: [otlp]
      exporters: [debug]
"#,
                Some(r#"service::extensions: references extension "bearertokenauth" which is not configured"#),
            ),
            (
                r#"
service:
  pipelines:
    traces:
      receivers: [otlp]
      exporters: [spanmetrics]
"#,
                Some(r#"connector "spanmetrics" is used as an exporter but not as a receiver in any pipeline"#),
            ),
        ];

        for (service, want) in tests {
            let src = format!("{}{}", COMPONENTS, service);
            let got = validate(&src).err().map(|err| err.to_string());
            assert_eq!(got.as_deref(), want, "service {}", service);
        }
    }

    #[test]
    fn test_validate_ambiguous_connector() {
        let src = r#"
exporters:
  spanmetrics:
connectors:
  spanmetrics:
service:
  pipelines:
    traces:
      receivers: [spanmetrics]
      exporters: [spanmetrics]
"#;
        // "spanmetrics" is not a known exporter type, so build the config by hand.
        let cfg: Result<crate::config::OtelConfig, _> = serde_yaml::from_str(src);
        assert_matches!(cfg.unwrap().validate(), Err(ConfigError::AmbiguousExporter(_)));
    }
}
