use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tempdir::TempDir;

use otelcolconvert::{Diagnostics, Severity};

/// A conversion test case read from a txtar archive.
///
/// The archive holds `otelcol.yaml` and, when conversion succeeds,
/// `output.alloy`. Non-info diagnostics go in `output.diags`, one per line.
pub struct TestCase {
    pub input: String,
    pub want_output: String,
    pub want_diags: String,
}

impl TestCase {
    pub fn load(path: &Path) -> TestCase {
        let ar = txtar::from_str(&fs::read_to_string(path).unwrap());
        let tmp_dir = TempDir::new("otelcolconvert").unwrap();
        ar.materialize(&tmp_dir).unwrap();

        let read = |name: &str| -> Option<String> {
            match fs::read_to_string(tmp_dir.path().join(name)) {
                Ok(data) => Some(data),
                Err(err) if err.kind() == ErrorKind::NotFound => None,
                Err(err) => panic!("{}: reading {}: {}", path.display(), name, err),
            }
        };

        TestCase {
            input: read("otelcol.yaml")
                .unwrap_or_else(|| panic!("{}: missing otelcol.yaml", path.display())),
            want_output: read("output.alloy").unwrap_or_default(),
            want_diags: read("output.diags").unwrap_or_default(),
        }
    }
}

/// Formats every diagnostic above info level, one per line.
pub fn format_diags(diags: &Diagnostics) -> String {
    diags
        .iter()
        .filter(|d| d.severity > Severity::Info)
        .map(|d| format!("{}\n", d))
        .collect()
}
