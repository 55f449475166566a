//! File pattern resolution using glob

use crate::error::CliError;
use anyhow::{Context, Result};
use glob::glob;
use std::path::PathBuf;

/// Resolve file patterns to existing files, sorted and without duplicates
pub fn resolve_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in patterns {
        let paths = glob(pattern).map_err(|_| CliError::InvalidPattern(pattern.clone()))?;

        for path_result in paths {
            let path =
                path_result.with_context(|| format!("Error resolving pattern: {pattern}"))?;

            if path.is_file() {
                files.push(path);
            }
        }
    }

    if files.is_empty() {
        return Err(CliError::NoInputFiles(patterns.to_vec()).into());
    }

    files.sort();
    files.dedup();
    log::debug!("{} input files", files.len());

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn pattern(dir: &TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().into_owned()
    }

    #[test]
    fn test_glob_matches_files_sorted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.log"), "b").unwrap();
        fs::write(dir.path().join("a.log"), "a").unwrap();
        fs::write(dir.path().join("c.txt"), "c").unwrap();

        let files = resolve_patterns(&[pattern(&dir, "*.log")]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.log", "b.log"]);
    }

    #[test]
    fn test_overlapping_patterns_deduplicated() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.log"), "a").unwrap();

        let files =
            resolve_patterns(&[pattern(&dir, "*.log"), pattern(&dir, "a.log")]).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_directories_skipped() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested.log")).unwrap();

        let error = resolve_patterns(&[pattern(&dir, "*.log")]).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<CliError>(),
            Some(CliError::NoInputFiles(_))
        ));
    }

    #[test]
    fn test_invalid_pattern() {
        let error = resolve_patterns(&["[".to_string()]).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<CliError>(),
            Some(CliError::InvalidPattern(_))
        ));
    }
}
