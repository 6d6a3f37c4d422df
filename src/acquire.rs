//! File acquisition.
//!
//! Turns command-line paths into `(name, content)` uploads. Files named
//! explicitly are always taken; directories are walked and filtered by the
//! `[intake]` globs (case-insensitive). Type and size are not validated.

use anyhow::{bail, Context, Result};
use doc_intake_core::blob::BlobRegistry;
use doc_intake_core::models::FileUpload;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::config::IntakeConfig;

pub fn acquire_paths(
    paths: &[PathBuf],
    config: &IntakeConfig,
    blobs: &BlobRegistry,
) -> Result<Vec<FileUpload>> {
    let include_set = build_globset(&config.include_globs)?;

    let mut default_excludes = vec!["**/.git/**".to_string(), "**/.*".to_string()];
    default_excludes.extend(config.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut uploads = Vec::new();
    for root in paths {
        if root.is_file() {
            uploads.push(read_upload(root, blobs)?);
            continue;
        }
        if !root.is_dir() {
            bail!("Path does not exist: {}", root.display());
        }

        let mut found: Vec<PathBuf> = Vec::new();
        let walker = WalkDir::new(root).follow_links(config.follow_symlinks);
        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(root).unwrap_or(path);
            let rel_str = relative.to_string_lossy().to_string();

            if exclude_set.is_match(&rel_str) {
                continue;
            }
            if !include_set.is_match(&rel_str) {
                continue;
            }
            found.push(path.to_path_buf());
        }

        // Sort for deterministic ordering
        found.sort();
        debug!(root = %root.display(), files = found.len(), "directory scanned");
        for path in &found {
            uploads.push(read_upload(path, blobs)?);
        }
    }

    Ok(uploads)
}

/// Read one file into the registry.
pub fn read_upload(path: &Path, blobs: &BlobRegistry) -> Result<FileUpload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(FileUpload::new(name, blobs.register(bytes)))
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .with_context(|| format!("Invalid glob: {}", pattern))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
