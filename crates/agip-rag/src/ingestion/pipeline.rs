//! Offline ingestion: PDF directory in, knowledge index out

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use crate::config::RagConfig;
use crate::embeddings::{Embedder, TfidfEmbedder, TfidfVectorizer};
use crate::error::{Error, Result};
use crate::retrieval::store::FORMAT_VERSION;
use crate::retrieval::{IndexManifest, KnowledgeBase, VectorIndex};
use crate::types::{Chunk, ChunkMetadata, PageDocument};

use super::chunker::RecursiveTextSplitter;
use super::parser::{DocumentLoader, PdfLoader};

/// Summary of a completed ingestion run
#[derive(Debug, Clone, PartialEq)]
pub struct IngestionReport {
    /// PDFs that produced pages
    pub files_processed: usize,
    /// PDFs skipped because they could not be loaded
    pub files_failed: usize,
    pub pages: usize,
    pub chunks: usize,
    /// Directory the index was written to
    pub output: PathBuf,
    /// SHA-256 over chunk ids and contents
    pub fingerprint: String,
}

/// Builds a knowledge index from a directory of PDFs
pub struct IngestionPipeline {
    loader: Arc<dyn DocumentLoader>,
    splitter: RecursiveTextSplitter,
    dimension: usize,
}

impl IngestionPipeline {
    pub fn new(config: &RagConfig) -> Self {
        Self {
            loader: Arc::new(PdfLoader::new()),
            splitter: RecursiveTextSplitter::from_config(&config.chunking),
            dimension: config.embeddings.dimension,
        }
    }

    /// Replace the PDF loader
    pub fn with_loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Ingest every PDF directly inside `input_dir` and write the index to `output_dir`.
    ///
    /// Returns `Ok(None)` without touching `output_dir` when no chunks come out.
    pub async fn run(&self, input_dir: &Path, output_dir: &Path) -> Result<Option<IngestionReport>> {
        tracing::info!("Processing PDFs in {}", input_dir.display());

        if !input_dir.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("input directory {} does not exist", input_dir.display()),
            )));
        }

        let mut pages: Vec<PageDocument> = Vec::new();
        let mut source_files = Vec::new();
        let mut files_failed = 0usize;

        for path in pdf_files(input_dir)? {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            tracing::info!("Processing: {}", filename);

            let loader = Arc::clone(&self.loader);
            let load_path = path.clone();
            let loaded = tokio::task::spawn_blocking(move || loader.load(&load_path))
                .await
                .map_err(|e| Error::internal(format!("PDF loader task failed: {}", e)))?;

            match loaded {
                Ok(texts) => {
                    let count = texts.len();
                    pages.extend(texts.into_iter().enumerate().map(|(i, text)| {
                        PageDocument::new(text, ChunkMetadata::for_page(&filename, i))
                    }));
                    source_files.push(filename.clone());
                    tracing::info!("PDF {} processed ({} pages)", filename, count);
                }
                Err(e) => {
                    files_failed += 1;
                    tracing::error!(file = %filename, error = %e, "Error processing PDF, skipping");
                }
            }
        }

        if pages.is_empty() {
            tracing::warn!("No documents found to process in {}", input_dir.display());
            return Ok(None);
        }

        let chunks = self.splitter.split_documents(&pages);
        tracing::info!("Created {} text chunks", chunks.len());

        if chunks.is_empty() {
            tracing::warn!("Documents in {} produced no text chunks", input_dir.display());
            return Ok(None);
        }

        let base = self.build(chunks, source_files).await?;
        base.save(output_dir)?;

        tracing::info!("Knowledge base created in {}", output_dir.display());

        Ok(Some(IngestionReport {
            files_processed: base.manifest.source_files.len(),
            files_failed,
            pages: pages.len(),
            chunks: base.manifest.chunk_count,
            output: output_dir.to_path_buf(),
            fingerprint: base.manifest.fingerprint.clone(),
        }))
    }

    /// Fit the vectorizer on the chunk texts and embed every chunk
    async fn build(&self, chunks: Vec<Chunk>, source_files: Vec<String>) -> Result<KnowledgeBase> {
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();

        let model = TfidfVectorizer::new(self.dimension).fit(&texts)?;
        tracing::info!(
            vocabulary = model.vocabulary_len(),
            dimension = self.dimension,
            "TF-IDF vocabulary fitted"
        );

        let model = Arc::new(model);
        let embedder = Embedder::new(Arc::new(TfidfEmbedder::new(Arc::clone(&model))), self.dimension);
        let vectors = embedder.embed(&texts).await;

        let fingerprint = fingerprint(&chunks);
        let mut index = VectorIndex::new(self.dimension);
        for (chunk, vector) in chunks.into_iter().zip(vectors) {
            index.insert(chunk, vector)?;
        }

        let manifest = IndexManifest {
            format_version: FORMAT_VERSION,
            dimension: self.dimension,
            chunk_count: index.len(),
            chunk_size: self.splitter.chunk_size(),
            chunk_overlap: self.splitter.chunk_overlap(),
            source_files,
            fingerprint,
            created_at: Utc::now(),
        };

        Ok(KnowledgeBase {
            manifest,
            model: Arc::unwrap_or_clone(model),
            index,
        })
    }
}

/// `*.pdf` files (any case) directly inside `dir`, sorted by file name
fn pdf_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_pdf = entry
            .path()
            .extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if is_pdf {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn fingerprint(chunks: &[Chunk]) -> String {
    let mut hasher = Sha256::new();
    for chunk in chunks {
        hasher.update(chunk.id.as_bytes());
        hasher.update([0u8]);
        hasher.update(chunk.content.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_files_filters_and_sorts() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("b.PDF"), b"x").unwrap();
        std::fs::write(tmp.path().join("a.pdf"), b"x").unwrap();
        std::fs::write(tmp.path().join("notas.txt"), b"x").unwrap();
        std::fs::create_dir(tmp.path().join("sub.pdf")).unwrap();

        let names: Vec<String> = pdf_files(tmp.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.pdf", "b.PDF"]);
    }

    #[test]
    fn test_fingerprint_depends_on_content() {
        let meta = ChunkMetadata::for_page("a.pdf", 0);
        let a = vec![Chunk::new("uno", meta.clone(), 0)];
        let b = vec![Chunk::new("dos", meta, 0)];
        assert_eq!(fingerprint(&a), fingerprint(&a));
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[tokio::test]
    async fn test_missing_input_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let pipeline = IngestionPipeline::new(&RagConfig::default());
        let result = pipeline
            .run(&tmp.path().join("missing"), &tmp.path().join("out"))
            .await;
        assert!(result.is_err());
    }
}
