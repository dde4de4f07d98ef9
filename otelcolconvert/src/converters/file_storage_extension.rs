use serde::Deserialize;
use serde_yaml::Value;

use crate::converters::{append_converted, component_block, decode_config, warn_unsupported};
use crate::diag::Diagnostics;
use crate::registry::{ComponentConverter, Factory};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileStorageConfig {
    directory: Option<String>,
    timeout: Option<String>,
    fsync: Option<bool>,
    create_directory: Option<bool>,
    directory_permissions: Option<String>,
    compaction: Option<Value>,
}

pub const FILE_STORAGE_EXTENSION: ComponentConverter = ComponentConverter {
    factory: Factory::Extension("file_storage"),
    input_component_name: "otelcol.storage.file",

    convert_and_append: |state, id, cfg| {
        let cfg: FileStorageConfig = match decode_config(id, cfg) {
            Ok(cfg) => cfg,
            Err(diags) => return diags,
        };

        let mut diags = Diagnostics::new();
        warn_unsupported(&mut diags, id, "compaction", &cfg.compaction);

        let mut block = component_block("otelcol.storage.file", state);
        let body = block.body_mut();
        body.append_opt_attr("directory", cfg.directory);
        body.append_opt_attr("timeout", cfg.timeout);
        body.append_opt_attr("fsync", cfg.fsync);
        body.append_opt_attr("create_directory", cfg.create_directory);
        body.append_opt_attr("directory_permissions", cfg.directory_permissions);

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
    fn test_convert_file_storage() {
        let (got, diags) = convert_one(
            &FILE_STORAGE_EXTENSION,
            Kind::Extension,
            "file_storage/queue",
            "extensions:\n  file_storage/queue:\n    directory: /var/lib/otelcol\n    create_directory: true\n",
        );

        let want = "otelcol.storage.file \"default\" {\n\tdirectory        = \"/var/lib/otelcol\"\n\tcreate_directory = true\n}\n";
        assert_eq!(got, want);
        assert!(diags.is_empty());
    }
}
