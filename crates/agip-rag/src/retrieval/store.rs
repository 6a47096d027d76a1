//! On-disk knowledge index
//!
//! Directory layout:
//!
//! ```text
//! knowledge_index/
//! ├── manifest.json     # IndexManifest
//! ├── vectorizer.json   # fitted TfidfModel
//! └── index.bin         # VectorIndex (bincode)
//! ```
//!
//! An index is always written whole: files go into a staging directory next
//! to the target, the previous index is removed, then the staging directory
//! is renamed into place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::embeddings::TfidfModel;
use crate::error::{Error, Result};

use super::search::VectorIndex;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const VECTORIZER_FILE: &str = "vectorizer.json";
pub const VECTORS_FILE: &str = "index.bin";

/// Bumped when the layout above changes
pub const FORMAT_VERSION: u32 = 1;

/// Summary of how an index was built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub format_version: u32,
    pub dimension: usize,
    pub chunk_count: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Files that contributed pages, in processing order
    pub source_files: Vec<String>,
    /// SHA-256 over chunk ids and contents
    pub fingerprint: String,
    pub created_at: DateTime<Utc>,
}

/// A loaded or freshly built knowledge index
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    pub manifest: IndexManifest,
    pub model: TfidfModel,
    pub index: VectorIndex,
}

impl KnowledgeBase {
    /// Load and validate an index directory
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::index(dir, "No se encontró la base de conocimiento (directory not found)"));
        }

        let manifest: IndexManifest = read_json(dir, MANIFEST_FILE)?;
        if manifest.format_version != FORMAT_VERSION {
            return Err(Error::index(
                dir,
                format!(
                    "unsupported index format version {} (expected {})",
                    manifest.format_version, FORMAT_VERSION
                ),
            ));
        }

        let model: TfidfModel = read_json(dir, VECTORIZER_FILE)?;
        if !model.is_consistent() {
            return Err(Error::index(dir, "vectorizer vocabulary and idf weights disagree"));
        }

        let bytes = fs::read(dir.join(VECTORS_FILE))
            .map_err(|e| Error::index(dir, format!("cannot read {}: {}", VECTORS_FILE, e)))?;
        let (index, _): (VectorIndex, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
                .map_err(|e| Error::index(dir, format!("corrupt {}: {}", VECTORS_FILE, e)))?;

        if index.dimension() != manifest.dimension || !index.is_consistent() {
            return Err(Error::index(dir, "vector dimension does not match the manifest"));
        }
        if index.len() != manifest.chunk_count {
            return Err(Error::index(
                dir,
                format!(
                    "manifest lists {} chunks but the index holds {}",
                    manifest.chunk_count,
                    index.len()
                ),
            ));
        }

        tracing::info!(
            path = %dir.display(),
            chunks = index.len(),
            dimension = index.dimension(),
            "Knowledge index loaded"
        );

        Ok(Self {
            manifest,
            model,
            index,
        })
    }

    /// Write this index to `dir`, replacing whatever was there
    pub fn save(&self, dir: &Path) -> Result<()> {
        let parent = dir
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let staging = tempfile::Builder::new()
            .prefix(".agip-index-")
            .tempdir_in(parent)?;

        write_json(staging.path(), MANIFEST_FILE, &self.manifest)?;
        write_json(staging.path(), VECTORIZER_FILE, &self.model)?;
        let bytes = bincode::serde::encode_to_vec(&self.index, bincode::config::standard())
            .map_err(|e| Error::internal(format!("Failed to encode vector index: {}", e)))?;
        fs::write(staging.path().join(VECTORS_FILE), bytes)?;

        let staged = staging.keep();
        let backup = parent.join(format!(".agip-index-old-{}", uuid::Uuid::new_v4().simple()));
        if let Err(e) = swap_into_place(&staged, dir, &backup) {
            let _ = fs::remove_dir_all(&staged);
            return Err(e.into());
        }

        tracing::info!(path = %dir.display(), chunks = self.index.len(), "Knowledge index written");
        Ok(())
    }
}

/// Move `staged` to `dir`. An existing `dir` is parked at `backup` first and
/// put back if the move fails.
fn swap_into_place(staged: &Path, dir: &Path, backup: &Path) -> std::io::Result<()> {
    let replacing = dir.exists();
    if replacing {
        fs::rename(dir, backup)?;
    }

    if let Err(e) = fs::rename(staged, dir) {
        if replacing {
            if let Err(restore) = fs::rename(backup, dir) {
                tracing::error!(
                    backup = %backup.display(),
                    error = %restore,
                    "Could not restore previous index"
                );
            }
        }
        return Err(e);
    }

    if replacing {
        tracing::info!("Removing previous index at {}", dir.display());
        if let Err(e) = fs::remove_dir_all(backup) {
            tracing::warn!(backup = %backup.display(), error = %e, "Previous index left on disk");
        }
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(dir: &Path, file: &str) -> Result<T> {
    let raw = fs::read_to_string(dir.join(file))
        .map_err(|e| Error::index(dir, format!("cannot read {}: {}", file, e)))?;
    serde_json::from_str(&raw).map_err(|e| Error::index(dir, format!("corrupt {}: {}", file, e)))
}

fn write_json<T: Serialize>(dir: &Path, file: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(dir.join(file), json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::TfidfVectorizer;
    use crate::types::{Chunk, ChunkMetadata};

    fn small_base() -> KnowledgeBase {
        let texts = ["exención de patentes", "certificado de discapacidad"];
        let model = TfidfVectorizer::new(8).fit(&texts).unwrap();

        let mut index = VectorIndex::new(8);
        for (i, text) in texts.iter().enumerate() {
            let mut vector = model.transform(text);
            vector.resize(8, 0.0);
            index
                .insert(Chunk::new(*text, ChunkMetadata::for_page("guia.pdf", i), 0), vector)
                .unwrap();
        }

        KnowledgeBase {
            manifest: IndexManifest {
                format_version: FORMAT_VERSION,
                dimension: 8,
                chunk_count: 2,
                chunk_size: 512,
                chunk_overlap: 128,
                source_files: vec!["guia.pdf".to_string()],
                fingerprint: "abc".to_string(),
                created_at: Utc::now(),
            },
            model,
            index,
        }
    }

    #[test]
    fn test_save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("knowledge_index");

        let base = small_base();
        base.save(&dir).unwrap();

        let loaded = KnowledgeBase::load(&dir).unwrap();
        assert_eq!(loaded.manifest, base.manifest);
        assert_eq!(loaded.model, base.model);
        assert_eq!(loaded.index, base.index);
    }

    #[test]
    fn test_save_replaces_previous_index() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("knowledge_index");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("stale.bin"), b"stale").unwrap();

        small_base().save(&dir).unwrap();

        assert!(!dir.join("stale.bin").exists());
        assert!(dir.join(MANIFEST_FILE).exists());
        // no staging directories left behind
        let leftovers = fs::read_dir(tmp.path())
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .map(|e| e.file_name().to_string_lossy().starts_with(".agip-index-"))
                    .unwrap_or(false)
            })
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_failed_swap_restores_previous_index() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("knowledge_index");
        small_base().save(&dir).unwrap();
        let backup = tmp.path().join(".agip-index-old-test");

        let result = swap_into_place(&tmp.path().join("never-staged"), &dir, &backup);

        assert!(result.is_err());
        assert!(!backup.exists());
        let loaded = KnowledgeBase::load(&dir).unwrap();
        assert_eq!(loaded.manifest.chunk_count, 2);
    }

    #[test]
    fn test_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let result = KnowledgeBase::load(&tmp.path().join("nope"));
        assert!(matches!(result, Err(Error::Index { .. })));
    }

    #[test]
    fn test_corrupt_vectors_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("knowledge_index");
        small_base().save(&dir).unwrap();
        fs::write(dir.join(VECTORS_FILE), b"\x01\x02garbage").unwrap();

        let err = KnowledgeBase::load(&dir).unwrap_err();
        assert!(err.is_configuration());
        assert!(matches!(err, Error::Index { .. }));
    }
}
