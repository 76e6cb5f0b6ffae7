//! Pre-flight checks for the OCR engine.
//!
//! Before any discovery happens the engine must be reachable through the
//! platform's path lookup (`where` on Windows, `which` elsewhere). On Windows
//! the language-data variable (`TESSDATA_PREFIX` by default) must also name a
//! readable directory.

use crate::core::config::EngineConfig;
use crate::error::PrerequisiteError;
use crate::{OcrBatchError, Result};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

pub const DEFAULT_CHECK_COMMAND: &str = "which";
pub const WINDOWS_CHECK_COMMAND: &str = "where";

/// Path-lookup command for the current platform.
pub fn lookup_command() -> &'static str {
    if cfg!(target_os = "windows") {
        WINDOWS_CHECK_COMMAND
    } else {
        DEFAULT_CHECK_COMMAND
    }
}

/// Whether the data-path variable is checked on this platform.
pub fn requires_data_path() -> bool {
    cfg!(target_os = "windows")
}

/// Locate the engine executable with the platform lookup command.
///
/// # Returns
///
/// The first path printed by the lookup command.
///
/// # Errors
///
/// Returns `PrerequisiteError::EngineMissing` if the lookup fails, prints
/// nothing, or cannot be executed at all.
pub async fn check_engine_available(engine: &EngineConfig) -> Result<PathBuf> {
    let missing = || PrerequisiteError::EngineMissing {
        command: engine.tesseract_cmd.clone(),
    };

    let output = Command::new(lookup_command())
        .arg(&engine.tesseract_cmd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await
        .map_err(|e| {
            tracing::debug!("{} could not be executed: {}", lookup_command(), e);
            missing()
        })?;

    if !output.status.success() {
        return Err(missing().into());
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| missing().into())
}

/// Validate the value of the engine's data-path variable.
///
/// `value` is the raw variable value (`None` when unset). Unset, empty and
/// unreadable are reported as different errors.
pub fn validate_data_path(var: &str, value: Option<OsString>) -> std::result::Result<PathBuf, PrerequisiteError> {
    let value = value.ok_or_else(|| PrerequisiteError::DataPathUnset { var: var.to_string() })?;

    if value.is_empty() {
        return Err(PrerequisiteError::DataPathEmpty { var: var.to_string() });
    }

    let path = PathBuf::from(value);
    if !path.is_dir() || std::fs::read_dir(&path).is_err() {
        return Err(PrerequisiteError::DataPathUnreadable {
            var: var.to_string(),
            path,
        });
    }

    Ok(path)
}

/// Run every pre-flight check for this platform.
///
/// A failed check is logged at `error` level before it is returned.
///
/// # Errors
///
/// Returns `OcrBatchError::Prerequisite` describing the first failed check.
pub async fn preflight(engine: &EngineConfig) -> Result<()> {
    check_prerequisites(engine)
        .await
        .inspect_err(OcrBatchError::log_if_batch_level)
}

async fn check_prerequisites(engine: &EngineConfig) -> Result<()> {
    let engine_path = check_engine_available(engine).await?;
    tracing::debug!(path = %engine_path.display(), "Found OCR engine");

    if requires_data_path() {
        let data_path = validate_data_path(&engine.tessdata_var, std::env::var_os(&engine.tessdata_var))
            .map_err(OcrBatchError::from)?;
        tracing::debug!(path = %data_path.display(), "{} is readable", engine.tessdata_var);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const VAR: &str = "TESSDATA_PREFIX";

    #[test]
    fn test_lookup_command_for_platform() {
        if cfg!(target_os = "windows") {
            assert_eq!(lookup_command(), WINDOWS_CHECK_COMMAND);
        } else {
            assert_eq!(lookup_command(), DEFAULT_CHECK_COMMAND);
        }
    }

    #[test]
    fn test_data_path_unset() {
        let result = validate_data_path(VAR, None);
        assert_eq!(result, Err(PrerequisiteError::DataPathUnset { var: VAR.to_string() }));
    }

    #[test]
    fn test_data_path_empty_is_distinct_from_unset() {
        let result = validate_data_path(VAR, Some(OsString::new()));
        assert_eq!(result, Err(PrerequisiteError::DataPathEmpty { var: VAR.to_string() }));
    }

    #[test]
    fn test_data_path_missing_directory() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("tessdata");

        let result = validate_data_path(VAR, Some(missing.clone().into_os_string()));
        assert_eq!(
            result,
            Err(PrerequisiteError::DataPathUnreadable {
                var: VAR.to_string(),
                path: missing,
            })
        );
    }

    #[test]
    fn test_data_path_file_is_unreadable() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("eng.traineddata");
        std::fs::write(&file, b"").unwrap();

        let result = validate_data_path(VAR, Some(file.into_os_string()));
        assert!(matches!(result, Err(PrerequisiteError::DataPathUnreadable { .. })));
    }

    #[test]
    fn test_data_path_valid() {
        let dir = tempdir().unwrap();
        let result = validate_data_path(VAR, Some(dir.path().as_os_str().to_owned()));
        assert_eq!(result.unwrap(), dir.path());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_check_engine_available_finds_shell() {
        let engine = EngineConfig {
            tesseract_cmd: "sh".to_string(),
            ..Default::default()
        };
        let path = check_engine_available(&engine).await.unwrap();
        assert!(path.ends_with("sh"));
    }

    #[tokio::test]
    async fn test_check_engine_available_missing() {
        let engine = EngineConfig {
            tesseract_cmd: "ocrbatch-missing-engine".to_string(),
            ..Default::default()
        };
        let result = check_engine_available(&engine).await;
        assert!(matches!(
            result,
            Err(OcrBatchError::Prerequisite(PrerequisiteError::EngineMissing { .. }))
        ));
    }

    #[tokio::test]
    async fn test_preflight_real_engine() {
        let result = preflight(&EngineConfig::default()).await;
        if result.is_err() {
            println!("Skipping: tesseract not installed");
            return;
        }
        assert!(result.is_ok());
    }
}
