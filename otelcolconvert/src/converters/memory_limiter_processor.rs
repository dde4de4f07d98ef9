use serde::Deserialize;

use crate::config::Signal;
use crate::converters::{append_converted, component_block, decode_config, mib, output_block};
use crate::diag::Diagnostics;
use crate::registry::{ComponentConverter, Factory};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct MemoryLimiterConfig {
    check_interval: Option<String>,
    limit_mib: Option<u64>,
    spike_limit_mib: Option<u64>,
    limit_percentage: Option<u32>,
    spike_limit_percentage: Option<u32>,
}

pub const MEMORY_LIMITER_PROCESSOR: ComponentConverter = ComponentConverter {
    factory: Factory::Processor("memory_limiter"),
    input_component_name: "otelcol.processor.memory_limiter",

    convert_and_append: |state, id, cfg| {
        let cfg: MemoryLimiterConfig = match decode_config(id, cfg) {
            Ok(cfg) => cfg,
            Err(diags) => return diags,
        };

        let mut block = component_block("otelcol.processor.memory_limiter", state);
        let body = block.body_mut();
        body.append_opt_attr("check_interval", cfg.check_interval);
        body.append_opt_attr("limit", cfg.limit_mib.map(mib));
        body.append_opt_attr("spike_limit", cfg.spike_limit_mib.map(mib));
        body.append_opt_attr("limit_percentage", cfg.limit_percentage);
        body.append_opt_attr("spike_limit_percentage", cfg.spike_limit_percentage);
        body.append_block(output_block(state, id, &Signal::ALL));

        let mut diags = Diagnostics::new();
        append_converted(state, &mut diags, id, block);
        diags
    },
};
