// extraction_summary.json: the contract between extraction and downstream consumers

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::DocumentSummary;
use crate::error::ExtractError;
use crate::render::{AnnotationArtifact, ExtractArtifact};

/// Version of the on-disk record layout. Bump on any incompatible change.
pub const SCHEMA_VERSION: u32 = 1;

/// File name of the record inside a document's output directory.
pub const RECORD_FILE_NAME: &str = "extraction_summary.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub schema_version: u32,
    pub settings_fingerprint: String,
    pub summary: DocumentSummary,
    /// Artifacts in page order, then color class, then sequence index.
    pub extracts: Vec<ExtractArtifact>,
    /// Native PDF annotation artifacts, same ordering as `extracts`.
    #[serde(default)]
    pub annotations: Vec<AnnotationArtifact>,
}

impl ExtractionRecord {
    pub fn new(
        settings_fingerprint: String,
        summary: DocumentSummary,
        mut extracts: Vec<ExtractArtifact>,
    ) -> Self {
        extracts.sort_by_key(|a| (a.page_index, a.color_class, a.sequence_index));
        ExtractionRecord {
            schema_version: SCHEMA_VERSION,
            settings_fingerprint,
            summary,
            extracts,
            annotations: Vec::new(),
        }
    }

    pub fn with_annotations(mut self, mut annotations: Vec<AnnotationArtifact>) -> Self {
        annotations.sort_by_key(|a| (a.page_index, a.color_class, a.sequence_index));
        self.annotations = annotations;
        self
    }
}

/// Writes the record as pretty JSON to `<document_dir>/extraction_summary.json`.
pub fn write_extraction_record(
    document_dir: &Path,
    record: &ExtractionRecord,
) -> crate::error::Result<PathBuf> {
    fs::create_dir_all(document_dir)
        .map_err(|e| ExtractError::summary(format!("{}: {e}", document_dir.display())))?;

    let path = document_dir.join(RECORD_FILE_NAME);
    let json = serde_json::to_string_pretty(record)?;
    write_atomic(&path, json.as_bytes())?;

    Ok(path)
}

/// `path` の隣の一時ファイル (`<name>.tmp`) に書き込み、renameで最終パスに移動する。
///
/// 読み手は常に完全な旧ファイルか新ファイルのどちらかを見る。
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> crate::error::Result<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    fs::write(&tmp_path, contents)
        .map_err(|e| ExtractError::summary(format!("{}: {e}", tmp_path.display())))?;
    fs::rename(&tmp_path, path)
        .map_err(|e| ExtractError::summary(format!("{}: {e}", path.display())))?;
    Ok(())
}

/// Reads a record back, rejecting schema versions this build does not know.
pub fn read_extraction_record(path: &Path) -> crate::error::Result<ExtractionRecord> {
    let content = fs::read_to_string(path)
        .map_err(|e| ExtractError::summary(format!("{}: {e}", path.display())))?;

    let version: serde_json::Value = serde_json::from_str(&content)?;
    match version.get("schema_version").and_then(|v| v.as_u64()) {
        Some(v) if v == u64::from(SCHEMA_VERSION) => {}
        Some(v) => {
            return Err(ExtractError::summary(format!(
                "unsupported extraction record schema version {v} (expected {SCHEMA_VERSION})"
            )));
        }
        None => return Err(ExtractError::summary("extraction record has no schema_version")),
    }

    Ok(serde_json::from_value(version)?)
}
