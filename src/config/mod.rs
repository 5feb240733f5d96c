pub mod color;
pub mod job;
pub mod merged;
pub mod settings;

use std::path::Path;

use settings::Settings;
use tracing::debug;

use crate::error::ExtractError;

/// Name of the settings file looked up next to each job file.
pub const SETTINGS_FILE_NAME: &str = "settings.yaml";

/// ジョブファイルと同じディレクトリの settings.yaml を読み込む。
///
/// ファイルが無ければ組み込みのデフォルト設定を返す。
pub fn load_settings_for_job(job_file_path: &Path) -> crate::error::Result<Settings> {
    let dir = job_file_path.parent().ok_or_else(|| {
        ExtractError::config(format!(
            "cannot determine the directory of job file {}",
            job_file_path.display()
        ))
    })?;

    let settings_path = dir.join(SETTINGS_FILE_NAME);
    if !settings_path.exists() {
        debug!(dir = %dir.display(), "no settings.yaml, using defaults");
        return Ok(Settings::default());
    }

    debug!(path = %settings_path.display(), "loading settings");
    Settings::from_file(&settings_path)
}
