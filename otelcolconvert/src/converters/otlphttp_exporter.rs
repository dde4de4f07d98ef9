use std::collections::BTreeMap;

use alloy_syntax::Block;
use serde::Deserialize;
use serde_yaml::Value;

use crate::converters::{
    append_converted, component_block, decode_config, headers_expr, warn_unsupported,
    weak_string_map, AuthConfig, QueueConfig, RetryConfig, TlsConfig,
};
use crate::diag::Diagnostics;
use crate::registry::{ComponentConverter, Factory};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct OtlpHttpExporterConfig {
    traces_endpoint: Option<String>,
    metrics_endpoint: Option<String>,
    logs_endpoint: Option<String>,
    encoding: Option<String>,
    sending_queue: Option<QueueConfig>,
    retry_on_failure: Option<RetryConfig>,

    endpoint: Option<String>,
    timeout: Option<String>,
    compression: Option<String>,
    tls: Option<TlsConfig>,
    #[serde(deserialize_with = "weak_string_map")]
    headers: Option<BTreeMap<String, String>>,
    auth: Option<AuthConfig>,
    max_idle_conns: Option<u32>,
    idle_conn_timeout: Option<String>,
    read_buffer_size: Option<Value>,
    write_buffer_size: Option<Value>,
    proxy_url: Option<Value>,
}

pub const OTLPHTTP_EXPORTER: ComponentConverter = ComponentConverter {
    factory: Factory::Exporter("otlphttp"),
    input_component_name: "otelcol.exporter.otlphttp",

    convert_and_append: |state, id, cfg| {
        let cfg: OtlpHttpExporterConfig = match decode_config(id, cfg) {
            Ok(cfg) => cfg,
            Err(diags) => return diags,
        };

        let mut diags = Diagnostics::new();
        warn_unsupported(&mut diags, id, "read_buffer_size", &cfg.read_buffer_size);
        warn_unsupported(&mut diags, id, "write_buffer_size", &cfg.write_buffer_size);
        warn_unsupported(&mut diags, id, "proxy_url", &cfg.proxy_url);

        let mut client = Block::unlabeled(["client"]);
        let client_body = client.body_mut();
        client_body.append_opt_attr("endpoint", cfg.endpoint);
        client_body.append_opt_attr("timeout", cfg.timeout);
        client_body.append_opt_attr("compression", cfg.compression);
        client_body.append_opt_attr("max_idle_conns", cfg.max_idle_conns);
        client_body.append_opt_attr("idle_conn_timeout", cfg.idle_conn_timeout);
        if let Some(headers) = &cfg.headers {
            client_body.append_attr("headers", headers_expr(headers));
        }
        if let Some(auth) = &cfg.auth {
            client_body.append_attr("auth", state.extension_ref(&auth.authenticator, "handler"));
        }
        if let Some(tls) = &cfg.tls {
            client_body.append_block(tls.to_block());
        }

        let mut block = component_block("otelcol.exporter.otlphttp", state);
        let body = block.body_mut();
        body.append_opt_attr("metrics_endpoint", cfg.metrics_endpoint);
        body.append_opt_attr("logs_endpoint", cfg.logs_endpoint);
        body.append_opt_attr("traces_endpoint", cfg.traces_endpoint);
        body.append_opt_attr("encoding", cfg.encoding);
        body.append_block(client);
        if let Some(queue) = &cfg.sending_queue {
            body.append_block(queue.to_block(state));
        }
        if let Some(retry) = &cfg.retry_on_failure {
            body.append_block(retry.to_block());
        }

        append_converted(state, &mut diags, id, block);
        diags
    },
};

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;
    use crate::config::Kind;
    use crate::converters::testutil::convert_one;

    #[test]
    fn test_convert_otlphttp_exporter() {
        let (got, diags) = convert_one(
            &OTLPHTTP_EXPORTER,
            Kind::Exporter,
            "otlphttp",
            r#"
extensions:
  bearertokenauth:
    token: secret
exporters:
  otlphttp:
    endpoint: https://otlp.example.com
    traces_endpoint: https://traces.example.com/v1/traces
    encoding: json
    timeout: 30s
    auth:
      authenticator: bearertokenauth
"#,
        );

        let want = r#"otelcol.exporter.otlphttp "default" {
	traces_endpoint = "https://traces.example.com/v1/traces"
	encoding        = "json"

	client {
		endpoint = "https://otlp.example.com"
		timeout  = "30s"
		auth     = <ext:bearertokenauth.handler>
	}
}
"#;
        assert_eq!(got, want);
        assert!(diags.is_empty());
    }
}
