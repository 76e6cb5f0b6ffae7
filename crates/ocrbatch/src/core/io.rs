//! File discovery and output-directory utilities.
//!
//! Discovery is a read-only traversal of the input location. A single file is
//! returned as-is. A directory is listed one level deep and split into image
//! candidates and a count of other regular files. Subdirectories and other
//! non-regular entries are skipped and not counted.

use crate::core::formats::{is_recognized, normalized_extension};
use crate::{OcrBatchError, Result};
use ahash::AHashMap;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A filesystem entry eligible for recognition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateFile {
    /// Absolute path to the file.
    pub path: PathBuf,
    /// Base name including extension, e.g. `scan-01.png`.
    pub name: String,
    /// Lower-cased extension with leading dot, if any.
    pub extension: Option<String>,
    /// Whether the path was a regular file when the candidate was built.
    pub is_file: bool,
}

impl CandidateFile {
    /// Build a candidate from a path, resolving it to an absolute path.
    ///
    /// # Errors
    ///
    /// Returns `OcrBatchError::Io` if the current directory cannot be read
    /// while making a relative path absolute.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = std::path::absolute(path.as_ref())?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = normalized_extension(&name);
        let is_file = path.is_file();

        Ok(Self {
            path,
            name,
            extension,
            is_file,
        })
    }

    /// File name with its extension removed, used as the engine's output base.
    pub fn stem(&self) -> String {
        Path::new(&self.name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }

    pub fn is_recognized(&self) -> bool {
        is_recognized(&self.name)
    }
}

/// Result of discovering an input location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Image candidates in directory-iteration order.
    pub candidates: Vec<CandidateFile>,
    /// Regular files whose extension is not supported.
    pub other_count: usize,
    /// True when the input was a single file rather than a directory.
    pub single_file: bool,
}

impl Discovery {
    /// Number of regular entries seen, images and others together.
    pub fn total(&self) -> usize {
        self.candidates.len() + self.other_count
    }
}

/// Check if a path exists.
pub fn path_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().exists()
}

/// Discover the candidate files of an input location.
///
/// # Arguments
///
/// * `input` - A single file or a directory
///
/// # Returns
///
/// For a single file: a one-element candidate list (classification is left to
/// the caller) and `other_count = 0`. For a directory: every regular entry
/// directly inside it, split by [`is_recognized`].
///
/// # Errors
///
/// Returns `OcrBatchError::NotFound` if the path does not exist.
/// Returns `OcrBatchError::Io` if the directory cannot be listed.
pub fn discover(input: impl AsRef<Path>) -> Result<Discovery> {
    let input = input.as_ref();

    if !path_exists(input) {
        return Err(OcrBatchError::NotFound {
            path: input.to_path_buf(),
        });
    }

    if input.is_file() {
        return Ok(Discovery {
            candidates: vec![CandidateFile::from_path(input)?],
            other_count: 0,
            single_file: true,
        });
    }

    if !input.is_dir() {
        return Err(OcrBatchError::validation(format!(
            "Input is neither a regular file nor a directory: {}",
            input.display()
        )));
    }

    let mut discovery = Discovery::default();
    let entries = std::fs::read_dir(input).map_err(OcrBatchError::Io)?;

    for entry in entries {
        let entry = entry.map_err(OcrBatchError::Io)?;
        let path = entry.path();

        if !path.is_file() {
            tracing::trace!(path = %path.display(), "Skipping non-regular entry");
            continue;
        }

        if is_recognized(entry.file_name()) {
            discovery.candidates.push(CandidateFile::from_path(&path)?);
        } else {
            discovery.other_count += 1;
        }
    }

    tracing::info!(
        images = discovery.candidates.len(),
        other = discovery.other_count,
        "Discovered {} image(s) and {} other file(s) in {}",
        discovery.candidates.len(),
        discovery.other_count,
        input.display()
    );

    Ok(discovery)
}

/// Base names shared by more than one candidate, sorted.
///
/// Candidates with the same stem (`a.png`, `a.jpg`) write the same
/// `<stem>.txt` in output-directory mode.
pub fn duplicate_stems(candidates: &[CandidateFile]) -> Vec<String> {
    let mut seen: AHashMap<String, usize> = AHashMap::new();
    for candidate in candidates {
        *seen.entry(candidate.stem()).or_default() += 1;
    }

    let mut duplicates: Vec<String> = seen
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(stem, _)| stem)
        .collect();
    duplicates.sort();
    duplicates
}

/// Create the output directory (and parents) if it does not exist yet.
///
/// # Errors
///
/// Returns `OcrBatchError::Validation` if the path exists but is not a directory.
/// Returns `OcrBatchError::Io` if the directory cannot be created.
pub fn ensure_output_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    if path.exists() && !path.is_dir() {
        return Err(OcrBatchError::validation(format!(
            "Output path exists and is not a directory: {}",
            path.display()
        )));
    }

    std::fs::create_dir_all(path).map_err(OcrBatchError::Io)
}
