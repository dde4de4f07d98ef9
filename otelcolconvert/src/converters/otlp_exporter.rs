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
struct OtlpExporterConfig {
    timeout: Option<String>,
    sending_queue: Option<QueueConfig>,
    retry_on_failure: Option<RetryConfig>,

    endpoint: Option<String>,
    compression: Option<String>,
    tls: Option<TlsConfig>,
    #[serde(deserialize_with = "weak_string_map")]
    headers: Option<BTreeMap<String, String>>,
    auth: Option<AuthConfig>,
    balancer_name: Option<String>,
    authority: Option<String>,
    wait_for_ready: Option<bool>,
    keepalive: Option<Value>,
    read_buffer_size: Option<Value>,
    write_buffer_size: Option<Value>,
}

pub const OTLP_EXPORTER: ComponentConverter = ComponentConverter {
    factory: Factory::Exporter("otlp"),
    input_component_name: "otelcol.exporter.otlp",

    convert_and_append: |state, id, cfg| {
        let cfg: OtlpExporterConfig = match decode_config(id, cfg) {
            Ok(cfg) => cfg,
            Err(diags) => return diags,
        };

        let mut diags = Diagnostics::new();
        warn_unsupported(&mut diags, id, "keepalive", &cfg.keepalive);
        warn_unsupported(&mut diags, id, "read_buffer_size", &cfg.read_buffer_size);
        warn_unsupported(&mut diags, id, "write_buffer_size", &cfg.write_buffer_size);

        let mut client = Block::unlabeled(["client"]);
        let client_body = client.body_mut();
        client_body.append_opt_attr("endpoint", cfg.endpoint);
        client_body.append_opt_attr("compression", cfg.compression);
        client_body.append_opt_attr("balancer_name", cfg.balancer_name);
        client_body.append_opt_attr("authority", cfg.authority);
        client_body.append_opt_attr("wait_for_ready", cfg.wait_for_ready);
        if let Some(headers) = &cfg.headers {
            client_body.append_attr("headers", headers_expr(headers));
        }
        if let Some(auth) = &cfg.auth {
            client_body.append_attr("auth", state.extension_ref(&auth.authenticator, "handler"));
        }
        if let Some(tls) = &cfg.tls {
            client_body.append_block(tls.to_block());
        }

        let mut block = component_block("otelcol.exporter.otlp", state);
        let body = block.body_mut();
        body.append_opt_attr("timeout", cfg.timeout);
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
