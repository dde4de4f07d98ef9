use serde::Deserialize;

use crate::converters::{append_converted, component_block, decode_config, weak_string};
use crate::diag::{Diagnostics, Severity};
use crate::registry::{ComponentConverter, Factory};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct BearerTokenAuthConfig {
    #[serde(deserialize_with = "weak_string")]
    scheme: Option<String>,
    #[serde(deserialize_with = "weak_string")]
    token: Option<String>,
    filename: Option<String>,
}

pub const BEARERTOKENAUTH_EXTENSION: ComponentConverter = ComponentConverter {
    factory: Factory::Extension("bearertokenauth"),
    input_component_name: "otelcol.auth.bearer",

    convert_and_append: |state, id, cfg| {
        let cfg: BearerTokenAuthConfig = match decode_config(id, cfg) {
            Ok(cfg) => cfg,
            Err(diags) => return diags,
        };

        let mut diags = Diagnostics::new();
        if let Some(filename) = &cfg.filename {
            diags.add(
                Severity::Warning,
                format!(
                    "{}: reading the token from {:?} is not supported; use local.file to read it instead",
                    id, filename
                ),
            );
        }

        let mut block = component_block("otelcol.auth.bearer", state);
        block.body_mut().append_opt_attr("token", cfg.token);
        block.body_mut().append_opt_attr("scheme", cfg.scheme);

        append_converted(state, &mut diags, id, block);
        diags
    },
};
