use serde::Deserialize;
use serde_yaml::Value;

use crate::converters::{append_converted, component_block, decode_config, weak_string};
use crate::diag::{Diagnostics, Severity};
use crate::registry::{ComponentConverter, Factory};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct BasicAuthConfig {
    client_auth: Option<ClientAuth>,
    htpasswd: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ClientAuth {
    #[serde(deserialize_with = "weak_string")]
    username: Option<String>,
    #[serde(deserialize_with = "weak_string")]
    password: Option<String>,
}

pub const BASICAUTH_EXTENSION: ComponentConverter = ComponentConverter {
    factory: Factory::Extension("basicauth"),
    input_component_name: "otelcol.auth.basic",

    convert_and_append: |state, id, cfg| {
        let cfg: BasicAuthConfig = match decode_config(id, cfg) {
            Ok(cfg) => cfg,
            Err(diags) => return diags,
        };

        let mut diags = Diagnostics::new();
        if cfg.htpasswd.is_some() {
            diags.add(
                Severity::Warning,
                format!("{}: htpasswd server authentication is not supported and was dropped", id),
            );
        }

        let mut block = component_block("otelcol.auth.basic", state);
        if let Some(client_auth) = cfg.client_auth {
            block.body_mut().append_opt_attr("username", client_auth.username);
            block.body_mut().append_opt_attr("password", client_auth.password);
        }

        append_converted(state, &mut diags, id, block);
        diags
    },
};
