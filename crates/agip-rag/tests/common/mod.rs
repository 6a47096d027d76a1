//! Shared fixtures: stub providers and a small knowledge index
#![allow(dead_code)]

use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};

use agip_rag::embeddings::{TfidfEmbedder, TfidfModel, TfidfVectorizer};
use agip_rag::error::{Error, Result};
use agip_rag::ingestion::DocumentLoader;
use agip_rag::providers::LlmProvider;
use agip_rag::retrieval::{IndexRetriever, Retriever, ScoredChunk, VectorIndex};
use agip_rag::types::{Chunk, ChunkMetadata};
use agip_rag::Assistant;

pub const DIMENSION: usize = 32;

pub const PASSAGES: [(&str, &str); 3] = [
    (
        "guia_patentes.pdf",
        "Para la exención de patentes se requiere el certificado único de discapacidad vigente y el título del vehículo.",
    ),
    (
        "guia_abl.pdf",
        "La exención de ABL alcanza al inmueble donde reside la persona con discapacidad.",
    ),
    (
        "guia_tramites.pdf",
        "Los trámites se realizan en las sedes de AGIP con turno previo o por la web.",
    ),
];

/// What the stub model does when asked
#[derive(Clone)]
pub enum Reply {
    Text(String),
    Fail(String),
    Status(u16),
}

/// LLM stub that records every prompt it receives
pub struct StubLlm {
    reply: Reply,
    prompts: Mutex<Vec<String>>,
}

impl StubLlm {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn answering(text: &str) -> Arc<Self> {
        Self::new(Reply::Text(text.to_string()))
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for StubLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail(message) => Err(Error::llm(message.clone())),
            Reply::Status(status) => Err(Error::LlmStatus {
                status: *status,
                message: "rejected".to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        "stub"
    }

    fn model(&self) -> &str {
        "stub-model"
    }
}

/// Fitted model and index over [`PASSAGES`], one chunk per passage on page 1
pub fn fixture_index() -> (Arc<TfidfModel>, VectorIndex) {
    let texts: Vec<&str> = PASSAGES.iter().map(|(_, text)| *text).collect();
    let model = TfidfVectorizer::new(DIMENSION).fit(&texts).unwrap();

    let mut index = VectorIndex::new(DIMENSION);
    for (source, text) in PASSAGES {
        let mut vector = model.transform(text);
        vector.resize(DIMENSION, 0.0);
        index
            .insert(Chunk::new(text, ChunkMetadata::for_page(source, 0), 0), vector)
            .unwrap();
    }
    (Arc::new(model), index)
}

/// Assistant over [`fixture_index`] with the given model stub
pub fn fixture_assistant(llm: Arc<StubLlm>) -> Assistant {
    let (model, index) = fixture_index();
    Assistant::builder()
        .embedding_provider(Arc::new(TfidfEmbedder::new(model)), DIMENSION)
        .retriever(Arc::new(IndexRetriever::new(Arc::new(index))))
        .llm(llm)
        .build()
        .unwrap()
}

/// Assistant whose index holds no chunks at all
pub fn empty_assistant(llm: Arc<StubLlm>) -> Assistant {
    let (model, _) = fixture_index();
    Assistant::builder()
        .embedding_provider(Arc::new(TfidfEmbedder::new(model)), DIMENSION)
        .retriever(Arc::new(IndexRetriever::new(Arc::new(VectorIndex::new(DIMENSION)))))
        .llm(llm)
        .build()
        .unwrap()
}

/// Assistant over `n` single-chunk guides, one per file
pub fn wide_assistant(llm: Arc<StubLlm>, n: usize) -> Assistant {
    let texts: Vec<String> = (0..n)
        .map(|i| format!("Guía {} sobre la exención de patentes y el certificado de discapacidad.", i))
        .collect();
    let model = TfidfVectorizer::new(DIMENSION).fit(&texts).unwrap();

    let mut index = VectorIndex::new(DIMENSION);
    for (i, text) in texts.iter().enumerate() {
        let mut vector = model.transform(text);
        vector.resize(DIMENSION, 0.0);
        let source = format!("guia_{:02}.pdf", i);
        index
            .insert(Chunk::new(text.as_str(), ChunkMetadata::for_page(&source, 0), 0), vector)
            .unwrap();
    }

    Assistant::builder()
        .embedding_provider(Arc::new(TfidfEmbedder::new(Arc::new(model))), DIMENSION)
        .retriever(Arc::new(IndexRetriever::new(Arc::new(index))))
        .llm(llm)
        .build()
        .unwrap()
}

/// Retriever whose index cannot be read
pub struct CorruptIndexRetriever;

#[async_trait]
impl Retriever for CorruptIndexRetriever {
    async fn retrieve(&self, _query_embedding: &[f32], _k: usize) -> Result<Vec<ScoredChunk>> {
        Err(Error::index("knowledge_index", "corrupt vectors.bin"))
    }

    fn name(&self) -> &str {
        "corrupt"
    }
}

/// Assistant whose retrieval always fails
pub fn corrupt_index_assistant(llm: Arc<StubLlm>) -> Assistant {
    let (model, _) = fixture_index();
    Assistant::builder()
        .embedding_provider(Arc::new(TfidfEmbedder::new(model)), DIMENSION)
        .retriever(Arc::new(CorruptIndexRetriever))
        .llm(llm)
        .build()
        .unwrap()
}

/// Assistant embedding queries one element short of the index dimension
pub fn mismatched_assistant(llm: Arc<StubLlm>) -> Assistant {
    let (model, index) = fixture_index();
    Assistant::builder()
        .embedding_provider(Arc::new(TfidfEmbedder::new(model)), DIMENSION - 1)
        .retriever(Arc::new(IndexRetriever::new(Arc::new(index))))
        .llm(llm)
        .build()
        .unwrap()
}

/// Loader reading UTF-8 files with pages separated by form feeds.
/// Files containing `BROKEN` fail to load.
pub struct TextLoader;

impl DocumentLoader for TextLoader {
    fn load(&self, path: &Path) -> Result<Vec<String>> {
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        let raw = std::fs::read_to_string(path).map_err(|e| Error::file_parse(&name, e.to_string()))?;
        if raw.contains("BROKEN") {
            return Err(Error::file_parse(name, "unreadable document"));
        }
        Ok(raw.split('\u{000C}').map(str::to_string).collect())
    }
}
