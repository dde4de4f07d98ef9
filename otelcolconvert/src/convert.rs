use std::collections::{HashMap, HashSet};

use alloy_syntax::{Body, Expr, File};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{read_config, ComponentId, InstanceId, Kind, OtelConfig};
use crate::diag::{Diagnostics, Severity};
use crate::labels::LabelTable;
use crate::pipeline_group::{filter_duplicate_receivers, PipelineGroup};
use crate::registry::ConverterRegistry;
use crate::state::{ConvertContext, ExtensionRef, State};
use crate::telemetry::convert_telemetry;

/// An Alloy file whose extension references may still be unresolved.
pub type AlloyFile = File<ExtensionRef>;

static ENVVAR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#""\$\{(?:env:)?(?P<name>[a-zA-Z_][a-zA-Z0-9_]*)(?::-(?P<default>[^\n]*?))?\}""#,
    )
    .unwrap()
});

/// Options for [`append_config`].
#[derive(Debug, Clone, Copy)]
pub struct AppendOptions<'a> {
    pub registry: &'a ConverterRegistry<'a>,
    /// Prepended to every generated label.
    pub label_prefix: &'a str,
    /// Whether to convert `service::telemetry` into a `logging` block.
    pub convert_service_telemetry: bool,
}

impl<'a> Default for AppendOptions<'a> {
    fn default() -> Self {
        Self {
            registry: ConverterRegistry::default_ref(),
            label_prefix: "",
            convert_service_telemetry: true,
        }
    }
}

/// Converts collector YAML into Alloy source using the built-in converters.
///
/// Returns no output when any critical diagnostic was produced.
pub fn convert(input: &[u8], extra_args: &[String]) -> (Option<Vec<u8>>, Diagnostics) {
    convert_with(input, extra_args, ConverterRegistry::default_ref())
}

/// Like [`convert`], with a caller-provided registry.
pub fn convert_with(
    input: &[u8],
    extra_args: &[String],
    registry: &ConverterRegistry,
) -> (Option<Vec<u8>>, Diagnostics) {
    let mut diags = Diagnostics::new();
    if !extra_args.is_empty() {
        diags.add(
            Severity::Critical,
            format!(
                "extra arguments are not supported for the otelcol converter: {:?}",
                extra_args
            ),
        );
        return (None, diags);
    }

    let cfg = match read_config(input, registry) {
        Ok(cfg) => cfg,
        Err(err) => {
            diags.add(
                Severity::Critical,
                format!("failed to get otelcol config: {}", err),
            );
            return (None, diags);
        }
    };
    if let Err(err) = cfg.validate() {
        diags.add(
            Severity::Critical,
            format!("failed to validate config: {}", err),
        );
        return (None, diags);
    }

    let mut file = AlloyFile::new();
    let opts = AppendOptions {
        registry,
        ..Default::default()
    };
    diags.add_all(append_config(&mut file, &cfg, &opts));
    diags.add_all(validate_nodes(&file));
    if diags.has_critical() {
        return (None, diags);
    }

    let rendered = match file.render() {
        Ok(rendered) => rendered,
        Err(err) => {
            diags.add(
                Severity::Critical,
                format!("failed to render Alloy config: {}", err),
            );
            return (None, diags);
        }
    };
    if rendered.is_empty() {
        return (None, diags);
    }

    (Some(convert_envvars(&rendered).into_bytes()), diags)
}

/// A component instance to convert, in conversion order.
#[derive(Debug)]
struct PlannedComponent {
    group: Option<usize>,
    id: InstanceId,
    label: String,
}

struct Planner<'a> {
    prefix: &'a str,
    labels: LabelTable,
    seen: HashSet<(Option<usize>, InstanceId)>,
    components: Vec<PlannedComponent>,
}

impl<'a> Planner<'a> {
    fn add(&mut self, group: Option<usize>, group_name: &str, id: InstanceId) {
        let scope = match id.kind() {
            Kind::Processor => group,
            _ => None,
        };
        if !self.seen.insert((scope, id.clone())) {
            return;
        }
        let label = self
            .labels
            .allocate(self.prefix, group, group_name, &id)
            .to_string();
        self.components.push(PlannedComponent { group, id, label });
    }
}

/// Decides what gets converted, in which order and under which label.
///
/// Extensions come first, then for each group its receivers, processors,
/// exporters and connectors. Everything except processors is converted
/// once, in the first group it appears in.
fn plan(
    cfg: &OtelConfig,
    filtered: &[PipelineGroup],
    prefix: &str,
) -> (Vec<PlannedComponent>, LabelTable) {
    let mut planner = Planner {
        prefix,
        labels: LabelTable::new(),
        seen: HashSet::new(),
        components: Vec::new(),
    };

    for id in &cfg.service.extensions {
        planner.add(None, "", InstanceId::new(Kind::Extension, id.clone()));
    }

    for (idx, group) in filtered.iter().enumerate() {
        let (g, name) = (Some(idx), group.name.as_str());
        let receivers = group.receivers();
        let exporters = group.exporters();

        for id in receivers.iter().filter(|id| !cfg.is_connector(id)) {
            planner.add(g, name, InstanceId::new(Kind::Receiver, (*id).clone()));
        }
        for id in group.processors() {
            planner.add(g, name, InstanceId::new(Kind::Processor, id.clone()));
        }
        for id in exporters.iter().filter(|id| !cfg.is_connector(id)) {
            planner.add(g, name, InstanceId::new(Kind::Exporter, (*id).clone()));
        }
        for id in receivers.iter().chain(&exporters).filter(|id| cfg.is_connector(id)) {
            planner.add(g, name, InstanceId::new(Kind::Connector, (*id).clone()));
        }
    }

    (planner.components, planner.labels)
}

/// Converts `cfg` and appends the result to `file`.
///
/// Extension references are resolved only within the blocks appended by
/// this call, so several configs can be appended to the same file.
pub fn append_config(file: &mut AlloyFile, cfg: &OtelConfig, opts: &AppendOptions) -> Diagnostics {
    let mut diags = Diagnostics::new();
    if opts.convert_service_telemetry {
        diags.add_all(convert_telemetry(file, cfg.service.telemetry.as_ref()));
    }

    let groups = PipelineGroup::create_all(&cfg.service.pipelines);
    let filtered = filter_duplicate_receivers(&groups, |id| cfg.is_connector(id));
    let (components, labels) = plan(cfg, &filtered, opts.label_prefix);

    let ctx = ConvertContext {
        cfg,
        groups: &groups,
        registry: opts.registry,
        labels: &labels,
    };

    // Extension id to the path of its Alloy component, e.g.
    // `otelcol.auth.basic.creds`.
    let mut extensions: HashMap<ComponentId, String> = HashMap::new();
    let mut body = Body::default();
    for planned in &components {
        let id = &planned.id;
        let converter = opts.registry.get(id.kind(), id.component_id().typ());
        let mut state = State::new(
            ctx,
            &mut body,
            planned.group,
            id.clone(),
            planned.label.clone(),
        );
        diags.add_all((converter.convert_and_append)(
            &mut state,
            id,
            cfg.component_config(id),
        ));

        if id.kind() == Kind::Extension {
            extensions.insert(
                id.component_id().clone(),
                format!("{}.{}", converter.input_component_name, planned.label),
            );
        }
    }

    body.resolve_placeholders(|r| match extensions.get(&r.extension) {
        Some(path) => Some(Expr::raw(format!("{}.{}", path, r.attr))),
        None => {
            diags.add(
                Severity::Critical,
                format!(
                    "{} references extension {:?} which is not enabled in service::extensions",
                    r.referenced_by,
                    r.extension.to_string()
                ),
            );
            None
        }
    });
    file.body_mut().append_body(body);

    diags
}

/// Reports top-level blocks that share both name and label.
fn validate_nodes(file: &AlloyFile) -> Diagnostics {
    let mut diags = Diagnostics::new();
    let mut seen = HashSet::new();
    for block in file.body().blocks() {
        let name = block.name_path();
        if seen.insert((name.clone(), block.label.clone())) {
            continue;
        }
        let msg = match &block.label {
            Some(label) => format!("duplicate block {} {:?}", name, label),
            None => format!("duplicate block {}", name),
        };
        diags.add(Severity::Critical, msg);
    }
    diags
}

/// Rewrites string literals holding only an environment variable
/// reference into a lookup of that variable.
///
/// `"${env:NAME:-default}"` becomes `coalesce(sys.env("NAME"), "default")`.
/// The `env:` prefix and the default are optional.
pub fn convert_envvars(rendered: &str) -> String {
    ENVVAR_REGEX
        .replace_all(rendered, r#"coalesce(sys.env("${name}"), "${default}")"#)
        .into_owned()
}

#[cfg(test)]
mod tests {
    use alloy_syntax::{Block, RenderError};
    use assert_matches::assert_matches;
    use similar_asserts::assert_eq;

    use super::*;
    use crate::diag::Diagnostic;

    #[test]
    fn test_convert_envvars() {
        let tests = vec![
            (r#"endpoint = "${env:ENDPOINT}""#, r#"endpoint = coalesce(sys.env("ENDPOINT"), "")"#),
            (r#"endpoint = "${ENDPOINT}""#, r#"endpoint = coalesce(sys.env("ENDPOINT"), "")"#),
            (
                r#"endpoint = "${env:ENDPOINT:-localhost:4317}""#,
                r#"endpoint = coalesce(sys.env("ENDPOINT"), "localhost:4317")"#,
            ),
            (
                r#"list = ["${env:A:-x}", "${B:-y}"]"#,
                r#"list = [coalesce(sys.env("A"), "x"), coalesce(sys.env("B"), "y")]"#,
            ),
            // Only whole string literals are rewritten.
            (r#"url = "http://${env:HOST}:4318""#, r#"url = "http://${env:HOST}:4318""#),
            (r#"bad = "${env:1ABC}""#, r#"bad = "${env:1ABC}""#),
        ];

        for (input, want) in tests {
            assert_eq!(convert_envvars(input), want, "input {:?}", input);
        }
    }

    #[test]
    fn test_extra_args() {
        let (out, diags) = convert(b"", &["--foo".to_string()]);
        assert_matches!(out, None);
        assert_eq!(
            diags.to_string(),
            r#"(Critical) extra arguments are not supported for the otelcol converter: ["--foo"]"#
        );
    }

    #[test]
    fn test_malformed_yaml() {
        let (out, diags) = convert(b"receivers: [", &[]);
        assert_matches!(out, None);
        let diags: Vec<Diagnostic> = diags.into_iter().collect();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Critical);
        assert!(diags[0].summary.starts_with("failed to get otelcol config: "));
    }

    #[test]
    fn test_validation_failure() {
        let (out, diags) = convert(b"receivers:\n  otlp:\n", &[]);
        assert_matches!(out, None);
        assert_eq!(
            diags.to_string(),
            "(Critical) failed to validate config: service must have at least one pipeline"
        );
    }

    #[test]
    fn test_validate_nodes() {
        let mut file = AlloyFile::new();
        file.body_mut()
            .append_block(Block::new(["otelcol", "processor", "batch"], "default"));
        file.body_mut()
            .append_block(Block::new(["otelcol", "processor", "batch"], "other"));
        file.body_mut()
            .append_block(Block::new(["otelcol", "processor", "batch"], "default"));
        file.body_mut().append_block(Block::unlabeled(["logging"]));
        file.body_mut().append_block(Block::unlabeled(["logging"]));

        assert_eq!(
            validate_nodes(&file).to_string(),
            "(Critical) duplicate block otelcol.processor.batch \"default\"\n(Critical) duplicate block logging"
        );
    }

    fn parse(yaml: &str) -> OtelConfig {
        read_config(yaml.as_bytes(), ConverterRegistry::default_ref()).unwrap()
    }

    const OTLP_TO_DEBUG: &str = r#"
receivers:
  otlp:
    protocols:
      grpc:
exporters:
  debug:
service:
  pipelines:
    traces:
      receivers: [otlp]
      exporters: [debug]
"#;

    #[test]
    fn test_append_config_with_prefixes() {
        let cfg = parse(OTLP_TO_DEBUG);
        let mut file = AlloyFile::new();
        for prefix in ["a", "b"] {
            let opts = AppendOptions {
                label_prefix: prefix,
                ..Default::default()
            };
            let diags = append_config(&mut file, &cfg, &opts);
            assert!(!diags.has_critical(), "{}", diags);
        }
        assert!(validate_nodes(&file).is_empty());

        let want = r#"otelcol.receiver.otlp "a" {
	grpc { }

	output {
		traces = [otelcol.exporter.debug.a.input]
	}
}

otelcol.exporter.debug "a" { }

otelcol.receiver.otlp "b" {
	grpc { }

	output {
		traces = [otelcol.exporter.debug.b.input]
	}
}

otelcol.exporter.debug "b" { }
"#;
        assert_eq!(file.render().unwrap(), want);
    }

    #[test]
    fn test_append_config_resolves_own_extensions_only() {
        // References basicauth without enabling it.
        let missing = parse(
            r#"
extensions:
  basicauth:
    client_auth:
      username: user
receivers:
  otlp:
    protocols:
      grpc:
exporters:
  otlp:
    endpoint: first:4317
    auth:
      authenticator: basicauth
service:
  pipelines:
    traces:
      receivers: [otlp]
      exporters: [otlp]
"#,
        );
        let enabled = parse(
            r#"
extensions:
  basicauth:
    client_auth:
      username: user
receivers:
  otlp:
    protocols:
      grpc:
exporters:
  otlp:
    endpoint: second:4317
    auth:
      authenticator: basicauth
service:
  extensions: [basicauth]
  pipelines:
    traces:
      receivers: [otlp]
      exporters: [otlp]
"#,
        );

        let mut file = AlloyFile::new();
        let first = append_config(
            &mut file,
            &missing,
            &AppendOptions {
                label_prefix: "a",
                ..Default::default()
            },
        );
        assert_eq!(
            first.iter().filter(|d| d.severity == Severity::Critical).count(),
            1
        );

        let second = append_config(
            &mut file,
            &enabled,
            &AppendOptions {
                label_prefix: "b",
                ..Default::default()
            },
        );
        assert!(!second.has_critical(), "{}", second);

        // The first config's reference stays unresolved instead of picking
        // up the extension converted by the second one.
        assert_matches!(file.render(), Err(RenderError::UnresolvedPlaceholder(_)));

        let exporters: Vec<_> = file
            .body()
            .blocks()
            .filter(|b| b.name_path() == "otelcol.exporter.otlp")
            .collect();
        assert_eq!(exporters.len(), 2);
        let rendered = exporters[1].render().unwrap();
        assert!(
            rendered.contains("auth     = otelcol.auth.basic.b.handler"),
            "{}",
            rendered
        );
    }

    #[test]
    fn test_plan_order_and_labels() {
        let cfg = read_config(
            br#"
receivers:
  otlp:
    protocols:
      grpc:
processors:
  batch:
exporters:
  debug:
connectors:
  spanmetrics:
extensions:
  basicauth:
service:
  extensions: [basicauth]
  pipelines:
    traces:
      receivers: [otlp]
      processors: [batch]
      exporters: [spanmetrics]
    metrics/agent:
      receivers: [otlp, spanmetrics]
      processors: [batch]
      exporters: [debug]
"#,
            ConverterRegistry::default_ref(),
        )
        .unwrap();
        let groups = PipelineGroup::create_all(&cfg.service.pipelines);
        let filtered = filter_duplicate_receivers(&groups, |id| cfg.is_connector(id));
        let (components, _) = plan(&cfg, &filtered, "");

        let got: Vec<String> = components
            .iter()
            .map(|c| format!("{} {}", c.id, c.label))
            .collect();
        assert_eq!(
            got,
            vec![
                "extension \"basicauth\" default",
                "receiver \"otlp\" default",
                "processor \"batch\" default",
                "connector \"spanmetrics\" default",
                "processor \"batch\" agent",
                "exporter \"debug\" agent",
            ]
        );
    }
}
