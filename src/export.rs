//! Download/export of the collection.
//!
//! Writes each document's bytes to an output directory under its original
//! filename, plus a `manifest.json` describing every exported file.
//! Duplicate filenames get a numeric suffix so nothing is overwritten.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use doc_intake_core::models::Document;
use doc_intake_core::store::CollectionStore;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Serialize)]
pub struct ExportManifest {
    pub exported_at: DateTime<Utc>,
    pub documents: Vec<ExportEntry>,
}

#[derive(Debug, Serialize)]
pub struct ExportEntry {
    pub id: String,
    pub name: String,
    pub file: String,
    pub classification: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub size: usize,
    pub sha256: String,
}

/// Export every document in `store` to `out_dir`.
pub fn export_collection(store: &CollectionStore, out_dir: &Path) -> Result<ExportManifest> {
    let docs: Vec<&Document> = store.documents().iter().collect();
    export_documents(&docs, out_dir)
}

/// Export `docs` to `out_dir`, returning the manifest that was written.
pub fn export_documents(docs: &[&Document], out_dir: &Path) -> Result<ExportManifest> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let mut used: HashSet<String> = HashSet::new();
    used.insert("manifest.json".to_string());

    let mut entries = Vec::with_capacity(docs.len());
    for doc in docs {
        let Some(bytes) = doc.content().bytes() else {
            warn!(id = %doc.id(), name = doc.name(), "content released, skipping export");
            continue;
        };

        let file = unique_file_name(doc.name(), &mut used);
        let target: PathBuf = out_dir.join(&file);
        std::fs::write(&target, &bytes)
            .with_context(|| format!("Failed to write {}", target.display()))?;

        entries.push(ExportEntry {
            id: doc.id().to_string(),
            name: doc.name().to_string(),
            file,
            classification: doc.classification().map(str::to_string),
            uploaded_at: doc.uploaded_at(),
            size: bytes.len(),
            sha256: sha256_hex(&bytes),
        });
    }

    let manifest = ExportManifest {
        exported_at: Utc::now(),
        documents: entries,
    };
    let json = serde_json::to_string_pretty(&manifest)?;
    std::fs::write(out_dir.join("manifest.json"), json)?;

    info!(
        exported = manifest.documents.len(),
        out = %out_dir.display(),
        "collection exported"
    );
    Ok(manifest)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Strip path separators and pick a name not yet in `used`.
fn unique_file_name(name: &str, used: &mut HashSet<String>) -> String {
    let base: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    let base = if base.is_empty() || base == "." || base == ".." {
        "document".to_string()
    } else {
        base
    };

    if used.insert(base.clone()) {
        return base;
    }

    let (stem, ext) = match base.rfind('.') {
        Some(pos) if pos > 0 => (&base[..pos], &base[pos..]),
        _ => (base.as_str(), ""),
    };
    let mut n = 2;
    loop {
        let candidate = format!("{} ({}){}", stem, n, ext);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
