use crate::record::{Status, TestRun};
use anyhow::{Context, Result};
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_DIR: &str = "test-results/jest";
pub const DEFAULT_OUTPUT_NAME: &str = "test-report.xml";

const FALLBACK_FAILURE_MESSAGE: &str = "Test failed";

/// Where the generic test execution report ends up.
#[derive(Clone, Debug, PartialEq)]
pub struct ReporterOptions {
    pub output_dir: PathBuf,
    pub output_name: String,
}

impl Default for ReporterOptions {
    fn default() -> Self {
        ReporterOptions {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            output_name: String::from(DEFAULT_OUTPUT_NAME),
        }
    }
}

impl ReporterOptions {
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_name)
    }
}

/// Escape a string for use in an XML attribute value or text node.
pub fn escape_xml(unsafe_text: &str) -> String {
    unsafe_text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/**
Render a run in the SonarQube generic test execution format.

One `<file>` element per file grouping that holds at least one case, in input order,
wrapping one `<testCase>` per record.
*/
pub fn render(run: &TestRun) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<testExecutions version=\"1\">\n");

    for file in run.files.iter().filter(|file| !file.cases.is_empty()) {
        log::debug!("{}: {} test case(s)", file.path, file.cases.len());
        // Writing into a String cannot fail.
        let _ = writeln!(xml, "  <file path=\"{}\">", escape_xml(&file.path));

        for case in &file.cases {
            let _ = writeln!(
                xml,
                "    <testCase name=\"{}\" duration=\"{}\">",
                escape_xml(&case.name),
                case.duration_ms
            );

            match case.status {
                Status::Failed => {
                    let message = case
                        .failure_messages
                        .first()
                        .map(String::as_str)
                        .filter(|message| !message.is_empty())
                        .unwrap_or(FALLBACK_FAILURE_MESSAGE);
                    let _ = writeln!(
                        xml,
                        "      <failure message=\"{}\">{}</failure>",
                        escape_xml(message),
                        escape_xml(&case.failure_messages.join("\n"))
                    );
                }
                Status::Pending | Status::Skipped => xml.push_str("      <skipped/>\n"),
                Status::Passed => {}
            }

            xml.push_str("    </testCase>\n");
        }

        xml.push_str("  </file>\n");
    }

    xml.push_str("</testExecutions>");
    xml
}

/// Render the report and write it, replacing any previous report at the same path.
pub fn write_report(run: &TestRun, options: &ReporterOptions) -> Result<PathBuf> {
    let xml = render(run);

    fs::create_dir_all(&options.output_dir).with_context(|| {
        format!(
            "Failed to create report directory {}",
            options.output_dir.display()
        )
    })?;

    let path = options.output_path();
    replace_file(&path, xml.as_bytes())?;
    Ok(path)
}

/// Write next to the target and rename over it, so a failed write leaves the old file alone.
pub fn replace_file(path: &Path, contents: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let staging = path.with_file_name(format!(".{}.tmp", file_name));

    fs::write(&staging, contents)
        .with_context(|| format!("Failed to write {}", staging.display()))?;
    fs::rename(&staging, path).with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}
