use serde::Deserialize;

use crate::config::Signal;
use crate::converters::{append_converted, component_block, decode_config, output_block};
use crate::diag::Diagnostics;
use crate::registry::{ComponentConverter, Factory};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct BatchConfig {
    timeout: Option<String>,
    send_batch_size: Option<u32>,
    send_batch_max_size: Option<u32>,
    metadata_keys: Option<Vec<String>>,
    metadata_cardinality_limit: Option<u32>,
}

pub const BATCH_PROCESSOR: ComponentConverter = ComponentConverter {
    factory: Factory::Processor("batch"),
    input_component_name: "otelcol.processor.batch",

    convert_and_append: |state, id, cfg| {
        let cfg: BatchConfig = match decode_config(id, cfg) {
            Ok(cfg) => cfg,
            Err(diags) => return diags,
        };

        let mut block = component_block("otelcol.processor.batch", state);
        let body = block.body_mut();
        body.append_opt_attr("timeout", cfg.timeout);
        body.append_opt_attr("send_batch_size", cfg.send_batch_size);
        body.append_opt_attr("send_batch_max_size", cfg.send_batch_max_size);
        if let Some(keys) = cfg.metadata_keys {
            body.append_attr("metadata_keys", alloy_syntax::Expr::string_array(keys));
        }
        body.append_opt_attr("metadata_cardinality_limit", cfg.metadata_cardinality_limit);
        body.append_block(output_block(state, id, &Signal::ALL));

        let mut diags = Diagnostics::new();
        append_converted(state, &mut diags, id, block);
        diags
    },
};
