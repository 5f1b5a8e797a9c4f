//! PDF export built on top of the FO renderer + an external FO processor.
//!
//! The event stream is rendered to XSL-FO, written to a temporary directory, and handed
//! to Apache FOP (or any processor accepting `-fo <in> -pdf <out>`).

use super::{FoFormat, FoOptions, PROCESSOR};
use crate::error::FormatError;
use crate::format::{Format, SerializedDocument};
use crate::sink::Event;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;
use which::which;

/// Environment variable overriding the processor binary.
pub const PROCESSOR_ENV: &str = "DOXA_FOP_BIN";

/// Format implementation that shells out to an FO processor to generate PDFs.
#[derive(Default)]
pub struct FoPdfFormat {
    fo: FoFormat,
}

impl FoPdfFormat {
    pub fn new(options: FoOptions) -> Self {
        Self {
            fo: FoFormat::new(options),
        }
    }
}

impl Format for FoPdfFormat {
    fn name(&self) -> &str {
        "pdf"
    }

    fn description(&self) -> &str {
        "PDF export via XSL-FO and an external FO processor"
    }

    fn file_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, _events: &[Event]) -> Result<String, FormatError> {
        Err(FormatError::NotSupported(
            "PDF serialization produces binary output".to_string(),
        ))
    }

    fn serialize_with_options(
        &self,
        events: &[Event],
        options: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        let processor = resolve_processor(options.get(PROCESSOR).map(String::as_str))?;
        let fo = self.fo.render(events, options)?;
        let pdf_bytes = render_fo_to_pdf(&fo, &processor)?;
        Ok(SerializedDocument::Binary(pdf_bytes))
    }
}

fn render_fo_to_pdf(fo: &str, processor: &Path) -> Result<Vec<u8>, FormatError> {
    let temp_dir =
        tempdir().map_err(|e| FormatError::SerializationError(format!("Temp dir error: {e}")))?;
    let fo_path = temp_dir.path().join("doxa-export.fo");
    fs::write(&fo_path, fo).map_err(|e| FormatError::SerializationError(e.to_string()))?;
    let pdf_path = temp_dir.path().join("doxa-export.pdf");

    log::debug!("running {} on {}", processor.display(), fo_path.display());
    let output = Command::new(processor)
        .arg("-fo")
        .arg(&fo_path)
        .arg("-pdf")
        .arg(&pdf_path)
        .output()
        .map_err(|e| {
            FormatError::SerializationError(format!(
                "Failed to launch FO processor ({}): {}",
                processor.display(),
                e
            ))
        })?;

    if !output.status.success() {
        return Err(FormatError::SerializationError(format!(
            "FO processor exited with status {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    fs::read(&pdf_path).map_err(|e| FormatError::SerializationError(e.to_string()))
}

fn resolve_processor(requested: Option<&str>) -> Result<PathBuf, FormatError> {
    if let Some(path) = requested.filter(|p| !p.is_empty()) {
        return which(path).map_err(|_| {
            FormatError::SerializationError(format!("FO processor '{path}' not found"))
        });
    }
    if let Some(path) = env::var_os(PROCESSOR_ENV) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    which("fop").map_err(|_| {
        FormatError::SerializationError(format!(
            "Unable to locate an FO processor. Install Apache FOP or set {PROCESSOR_ENV}."
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_serialization_is_not_supported() {
        let result = FoPdfFormat::default().serialize(&[]);
        assert!(matches!(result, Err(FormatError::NotSupported(_))));
    }

    #[test]
    fn test_missing_processor_is_reported() {
        let mut opts = HashMap::new();
        opts.insert(
            PROCESSOR.to_string(),
            "doxa-definitely-missing-fop".to_string(),
        );
        let err = FoPdfFormat::default()
            .serialize_with_options(&[], &opts)
            .unwrap_err();
        assert!(err.to_string().contains("doxa-definitely-missing-fop"));
    }
}
