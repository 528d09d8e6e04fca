//! Output file naming
//!
//! Compressed files are named
//! `{basename}__{profile_or_custom}_q{quality}_{unix_timestamp}{ext}`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::Quality;
use crate::error::ConfigError;

/// File name for a compressed copy of `input`
pub fn output_file_name(input: &Path, label: &str, quality: Quality, timestamp: u64) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let ext = input
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    format!("{stem}__{label}_q{quality}_{timestamp}{ext}")
}

/// Output path inside `output_dir` stamped with the current Unix time.
///
/// If that name is already taken (two runs within one second), `-1`, `-2`, ...
/// is appended to the stem until it is free.
pub fn resolve_output_path(
    input: &Path,
    output_dir: &Path,
    label: &str,
    quality: Quality,
) -> PathBuf {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    unique_path(output_dir, &output_file_name(input, label, quality, timestamp))
}

fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1..)
        .map(|n| dir.join(format!("{stem}-{n}{ext}")))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Create `dir` (and parents) if missing. Returns `true` if it was created.
pub fn prepare_output_dir(dir: &Path) -> Result<bool, ConfigError> {
    if dir.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(dir).map_err(|source| ConfigError::OutputDir {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(value: i64) -> Quality {
        Quality::new(value).unwrap()
    }

    #[test]
    fn test_file_name_pattern() {
        let name = output_file_name(Path::new("docs/sample.pdf"), "medium", q(40), 1_700_000_000);
        assert_eq!(name, "sample__medium_q40_1700000000.pdf");
    }

    #[test]
    fn test_custom_label_and_dotted_stem() {
        let name = output_file_name(Path::new("report.v2.PDF"), "custom", q(77), 5);
        assert_eq!(name, "report.v2__custom_q77_5.PDF");
    }

    #[test]
    fn test_no_extension() {
        let name = output_file_name(Path::new("/tmp/scan"), "low", q(20), 9);
        assert_eq!(name, "scan__low_q20_9");
    }

    #[test]
    fn test_collision_gets_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let taken = dir.path().join("a__low_q20_1.pdf");
        fs::write(&taken, b"x").unwrap();
        fs::write(dir.path().join("a__low_q20_1-1.pdf"), b"x").unwrap();

        let path = unique_path(dir.path(), "a__low_q20_1.pdf");
        assert_eq!(path, dir.path().join("a__low_q20_1-2.pdf"));
    }

    #[test]
    fn test_resolve_output_path_lands_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = resolve_output_path(Path::new("in.pdf"), dir.path(), "best", q(80));
        assert_eq!(path.parent(), Some(dir.path()));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("in__best_q80_"));
        assert!(name.ends_with(".pdf"));
    }

    #[test]
    fn test_prepare_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        assert!(prepare_output_dir(&nested).unwrap());
        assert!(nested.is_dir());
        assert!(!prepare_output_dir(&nested).unwrap());
    }
}
