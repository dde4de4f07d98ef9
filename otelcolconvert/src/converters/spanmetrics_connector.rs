use alloy_syntax::{Block, Expr};
use serde::Deserialize;

use crate::config::Signal;
use crate::converters::{
    append_converted, component_block, decode_config, output_block, weak_string,
};
use crate::diag::{Diagnostics, Severity};
use crate::registry::{ComponentConverter, Factory};
use crate::state::AlloyBlock;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SpanMetricsConfig {
    namespace: Option<String>,
    metrics_flush_interval: Option<String>,
    dimensions: Vec<Dimension>,
    exclude_dimensions: Option<Vec<String>>,
    dimensions_cache_size: Option<u32>,
    aggregation_temporality: Option<String>,
    histogram: Option<HistogramConfig>,
    exemplars: Option<ExemplarsConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Dimension {
    name: String,
    #[serde(default, deserialize_with = "weak_string")]
    default: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct HistogramConfig {
    disable: Option<bool>,
    unit: Option<String>,
    explicit: Option<ExplicitHistogram>,
    exponential: Option<ExponentialHistogram>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ExplicitHistogram {
    buckets: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ExponentialHistogram {
    max_size: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ExemplarsConfig {
    enabled: Option<bool>,
    max_per_data_point: Option<u32>,
}

pub const SPANMETRICS_CONNECTOR: ComponentConverter = ComponentConverter {
    factory: Factory::Connector("spanmetrics"),
    input_component_name: "otelcol.connector.spanmetrics",

    convert_and_append: |state, id, cfg| {
        let cfg: SpanMetricsConfig = match decode_config(id, cfg) {
            Ok(cfg) => cfg,
            Err(diags) => return diags,
        };

        let mut diags = Diagnostics::new();
        let mut block = component_block("otelcol.connector.spanmetrics", state);
        let body = block.body_mut();

        for dim in &cfg.dimensions {
            let mut dim_block = Block::unlabeled(["dimension"]);
            dim_block.body_mut().append_attr("name", dim.name.as_str());
            dim_block
                .body_mut()
                .append_opt_attr("default", dim.default.clone());
            body.append_block(dim_block);
        }

        if let Some(excluded) = cfg.exclude_dimensions {
            body.append_attr("exclude_dimensions", Expr::string_array(excluded));
        }
        body.append_opt_attr("dimensions_cache_size", cfg.dimensions_cache_size);
        if let Some(temporality) = &cfg.aggregation_temporality {
            match aggregation_temporality(temporality) {
                Some(t) => body.append_attr("aggregation_temporality", t),
                None => diags.add(
                    Severity::Error,
                    format!("{}: unknown aggregation_temporality {:?}", id, temporality),
                ),
            }
        }
        body.append_opt_attr("metrics_flush_interval", cfg.metrics_flush_interval);
        body.append_opt_attr("namespace", cfg.namespace);

        body.append_block(histogram_block(cfg.histogram.unwrap_or_default()));
        if let Some(exemplars) = cfg.exemplars {
            let mut exemplars_block = Block::unlabeled(["exemplars"]);
            exemplars_block
                .body_mut()
                .append_opt_attr("enabled", exemplars.enabled);
            exemplars_block
                .body_mut()
                .append_opt_attr("max_per_data_point", exemplars.max_per_data_point);
            body.append_block(exemplars_block);
        }
        body.append_block(output_block(state, id, &[Signal::Metrics]));

        append_converted(state, &mut diags, id, block);
        diags
    },
};

/// Maps the collector's enum names to the ones Alloy accepts.
fn aggregation_temporality(s: &str) -> Option<&'static str> {
    match s {
        "AGGREGATION_TEMPORALITY_CUMULATIVE" | "CUMULATIVE" => Some("CUMULATIVE"),
        "AGGREGATION_TEMPORALITY_DELTA" | "DELTA" => Some("DELTA"),
        _ => None,
    }
}

/// Alloy requires the histogram block, so it is always written. Without
/// any settings it selects explicit buckets with their default bounds.
fn histogram_block(cfg: HistogramConfig) -> AlloyBlock {
    let mut block = Block::unlabeled(["histogram"]);
    let body = block.body_mut();
    body.append_opt_attr("disable", cfg.disable);
    body.append_opt_attr("unit", cfg.unit);

    if let Some(exponential) = cfg.exponential {
        let mut exp_block = Block::unlabeled(["exponential"]);
        exp_block
            .body_mut()
            .append_opt_attr("max_size", exponential.max_size);
        body.append_block(exp_block);
    } else {
        let mut explicit_block = Block::unlabeled(["explicit"]);
        if let Some(buckets) = cfg.explicit.and_then(|e| e.buckets) {
            explicit_block
                .body_mut()
                .append_attr("buckets", Expr::string_array(buckets));
        }
        body.append_block(explicit_block);
    }
    block
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;
    use crate::config::Kind;
    use crate::converters::testutil::convert_one;

    const PIPELINES: &str = r#"
receivers:
  otlp:
    protocols:
      grpc:
exporters:
  otlp:
service:
  pipelines:
    traces:
      receivers: [otlp]
      exporters: [spanmetrics]
    metrics:
      receivers: [spanmetrics]
      exporters: [otlp]
"#;

    #[test]
    fn test_convert_spanmetrics() {
        let yaml = format!(
            r#"
connectors:
  spanmetrics:
    namespace: traces.span.metrics
    metrics_flush_interval: 15s
    aggregation_temporality: AGGREGATION_TEMPORALITY_DELTA
    dimensions:
      - name: http.method
        default: GET
      - name: http.status_code
    histogram:
      explicit:
        buckets: [100us, 1ms, 2ms]
{}"#,
            PIPELINES
        );
        let (got, diags) =
            convert_one(&SPANMETRICS_CONNECTOR, Kind::Connector, "spanmetrics", &yaml);

        let want = r#"otelcol.connector.spanmetrics "default" {
	dimension {
		name    = "http.method"
		default = "GET"
	}

	dimension {
		name = "http.status_code"
	}

	aggregation_temporality = "DELTA"
	metrics_flush_interval  = "15s"
	namespace               = "traces.span.metrics"

	histogram {
		explicit {
			buckets = ["100us", "1ms", "2ms"]
		}
	}

	output {
		metrics = [otelcol.exporter.otlp.default.input]
	}
}
"#;
        assert_eq!(got, want);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_convert_spanmetrics_defaults() {
        let yaml = format!("connectors:\n  spanmetrics:\n{}", PIPELINES);
        let (got, _) = convert_one(&SPANMETRICS_CONNECTOR, Kind::Connector, "spanmetrics", &yaml);

        let want = r#"otelcol.connector.spanmetrics "default" {
	histogram {
		explicit { }
	}

	output {
		metrics = [otelcol.exporter.otlp.default.input]
	}
}
"#;
        assert_eq!(got, want);
    }

    #[test]
    fn test_convert_spanmetrics_bad_temporality() {
        let yaml = format!(
            "connectors:\n  spanmetrics:\n    aggregation_temporality: SOMETIMES\n{}",
            PIPELINES
        );
        let (_, diags) = convert_one(&SPANMETRICS_CONNECTOR, Kind::Connector, "spanmetrics", &yaml);
        assert_eq!(
            diags.to_string(),
            "(Error) connector \"spanmetrics\": unknown aggregation_temporality \"SOMETIMES\""
        );
    }
}
