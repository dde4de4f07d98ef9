use serde::Deserialize;

use crate::converters::{append_converted, component_block, decode_config};
use crate::diag::{Diagnostics, Severity};
use crate::registry::{ComponentConverter, Factory};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DebugConfig {
    verbosity: Option<String>,
    sampling_initial: Option<u32>,
    sampling_thereafter: Option<u32>,
    use_internal_logger: Option<bool>,
}

pub const DEBUG_EXPORTER: ComponentConverter = ComponentConverter {
    factory: Factory::Exporter("debug"),
    input_component_name: "otelcol.exporter.debug",

    convert_and_append: |state, id, cfg| {
        let cfg: DebugConfig = match decode_config(id, cfg) {
            Ok(cfg) => cfg,
            Err(diags) => return diags,
        };

        let mut diags = Diagnostics::new();
        if cfg.use_internal_logger == Some(false) {
            diags.add(
                Severity::Warning,
                format!(
                    "{}: use_internal_logger is not supported; output is always written to the Alloy logger",
                    id
                ),
            );
        }

        let mut block = component_block("otelcol.exporter.debug", state);
        let body = block.body_mut();
        body.append_opt_attr("verbosity", cfg.verbosity);
        body.append_opt_attr("sampling_initial", cfg.sampling_initial);
        body.append_opt_attr("sampling_thereafter", cfg.sampling_thereafter);

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
    fn test_convert_debug() {
        let tests = vec![
            ("exporters:\n  debug:\n", "otelcol.exporter.debug \"default\" { }\n", ""),
            (
                "exporters:\n  debug:\n    verbosity: detailed\n    sampling_initial: 5\n",
                "otelcol.exporter.debug \"default\" {\n\tverbosity        = \"detailed\"\n\tsampling_initial = 5\n}\n",
                "",
            ),
            (
                "exporters:\n  debug:\n    use_internal_logger: false\n",
                "otelcol.exporter.debug \"default\" { }\n",
                "(Warning) exporter \"debug\": use_internal_logger is not supported; output is always written to the Alloy logger",
            ),
        ];

        for (yaml, want, want_diags) in tests {
            let (got, diags) = convert_one(&DEBUG_EXPORTER, Kind::Exporter, "debug", yaml);
            assert_eq!(got, want);
            assert_eq!(diags.to_string(), want_diags);
        }
    }
}
