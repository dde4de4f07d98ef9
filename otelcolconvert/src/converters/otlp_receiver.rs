use alloy_syntax::{Block, Expr};
use serde::Deserialize;
use serde_yaml::Value;

use crate::config::Signal;
use crate::converters::{
    append_converted, component_block, decode_config, mib, output_block, present_or_default,
    warn_unsupported, TlsConfig,
};
use crate::diag::Diagnostics;
use crate::registry::{ComponentConverter, Factory};
use crate::state::AlloyBlock;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct OtlpReceiverConfig {
    protocols: Protocols,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Protocols {
    #[serde(deserialize_with = "present_or_default")]
    grpc: Option<GrpcServerConfig>,
    #[serde(deserialize_with = "present_or_default")]
    http: Option<HttpServerConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct GrpcServerConfig {
    endpoint: Option<String>,
    transport: Option<String>,
    tls: Option<TlsConfig>,
    max_recv_msg_size_mib: Option<u64>,
    max_concurrent_streams: Option<u32>,
    read_buffer_size: Option<Value>,
    write_buffer_size: Option<Value>,
    keepalive: Option<Value>,
    include_metadata: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct HttpServerConfig {
    endpoint: Option<String>,
    tls: Option<TlsConfig>,
    cors: Option<CorsConfig>,
    include_metadata: Option<bool>,
    max_request_body_size: Option<Value>,
    traces_url_path: Option<String>,
    metrics_url_path: Option<String>,
    logs_url_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CorsConfig {
    allowed_origins: Option<Vec<String>>,
    allowed_headers: Option<Vec<String>>,
    max_age: Option<u32>,
}

pub const OTLP_RECEIVER: ComponentConverter = ComponentConverter {
    factory: Factory::Receiver("otlp"),
    input_component_name: "",

    convert_and_append: |state, id, cfg| {
        let cfg: OtlpReceiverConfig = match decode_config(id, cfg) {
            Ok(cfg) => cfg,
            Err(diags) => return diags,
        };
        let protocols = cfg.protocols;
        if protocols.grpc.is_none() && protocols.http.is_none() {
            return Diagnostics::critical(format!(
                "{}: must specify at least one protocol when using the OTLP receiver",
                id
            ));
        }

        let mut diags = Diagnostics::new();
        let mut block = component_block("otelcol.receiver.otlp", state);

        if let Some(grpc) = &protocols.grpc {
            let unsupported = [
                ("protocols::grpc::read_buffer_size", &grpc.read_buffer_size),
                ("protocols::grpc::write_buffer_size", &grpc.write_buffer_size),
                ("protocols::grpc::keepalive", &grpc.keepalive),
            ];
            for (field, value) in unsupported {
                warn_unsupported(&mut diags, id, field, value);
            }
            block.body_mut().append_block(grpc_block(grpc));
        }
        if let Some(http) = &protocols.http {
            warn_unsupported(
                &mut diags,
                id,
                "protocols::http::max_request_body_size",
                &http.max_request_body_size,
            );
            block.body_mut().append_block(http_block(http));
        }
        block.body_mut().append_block(output_block(state, id, &Signal::ALL));

        append_converted(state, &mut diags, id, block);
        diags
    },
};

fn grpc_block(cfg: &GrpcServerConfig) -> AlloyBlock {
    let mut block = Block::unlabeled(["grpc"]);
    let body = block.body_mut();
    body.append_opt_attr("endpoint", cfg.endpoint.clone());
    body.append_opt_attr("transport", cfg.transport.clone());
    body.append_opt_attr("max_recv_msg_size", cfg.max_recv_msg_size_mib.map(mib));
    body.append_opt_attr("max_concurrent_streams", cfg.max_concurrent_streams);
    body.append_opt_attr("include_metadata", cfg.include_metadata);
    if let Some(tls) = &cfg.tls {
        body.append_block(tls.to_block());
    }
    block
}

fn http_block(cfg: &HttpServerConfig) -> AlloyBlock {
    let mut block = Block::unlabeled(["http"]);
    let body = block.body_mut();
    body.append_opt_attr("endpoint", cfg.endpoint.clone());
    body.append_opt_attr("include_metadata", cfg.include_metadata);
    body.append_opt_attr("traces_url_path", cfg.traces_url_path.clone());
    body.append_opt_attr("metrics_url_path", cfg.metrics_url_path.clone());
    body.append_opt_attr("logs_url_path", cfg.logs_url_path.clone());
    if let Some(tls) = &cfg.tls {
        body.append_block(tls.to_block());
    }
    if let Some(cors) = &cfg.cors {
        let mut cors_block = Block::unlabeled(["cors"]);
        let cors_body = cors_block.body_mut();
        if let Some(origins) = &cors.allowed_origins {
            cors_body.append_attr("allowed_origins", Expr::string_array(origins.iter().cloned()));
        }
        if let Some(headers) = &cors.allowed_headers {
            cors_body.append_attr("allowed_headers", Expr::string_array(headers.iter().cloned()));
        }
        cors_body.append_opt_attr("max_age", cors.max_age);
        body.append_block(cors_block);
    }
    block
}
