//! Question answering over the knowledge index

use std::sync::Arc;

use crate::config::{ContactConfig, RagConfig, RetrievalConfig};
use crate::embeddings::{Embedder, TfidfEmbedder};
use crate::error::{Error, Result};
use crate::generation::{messages, PromptBuilder};
use crate::providers::{AnthropicClient, EmbeddingProvider, LlmProvider};
use crate::retrieval::{IndexRetriever, KnowledgeBase, Retriever};
use crate::types::{AnswerOutcome, Conversation, SourceRef};

/// Resolve the API key: explicit value first, then the named variable via `lookup`
pub fn resolve_api_key_with<F>(explicit: Option<String>, env_var: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    explicit
        .filter(|key| !key.trim().is_empty())
        .or_else(|| lookup(env_var).filter(|key| !key.trim().is_empty()))
        .ok_or_else(|| {
            Error::MissingCredential(format!(
                "No se ha proporcionado una clave API de Anthropic. Configura la variable de entorno {} o pasa la clave como parámetro.",
                env_var
            ))
        })
}

/// Retrieval-augmented assistant for AGIP disability procedures
pub struct Assistant {
    embedder: Embedder,
    retriever: Arc<dyn Retriever>,
    llm: Arc<dyn LlmProvider>,
    contact: ContactConfig,
    retrieval: RetrievalConfig,
}

impl Assistant {
    pub fn builder() -> AssistantBuilder {
        AssistantBuilder::default()
    }

    /// Build the production assistant: Claude client plus the persisted index.
    ///
    /// Fails fast on a missing credential or a missing/corrupt index.
    pub fn from_config(config: &RagConfig, api_key: Option<String>) -> Result<Self> {
        let api_key =
            resolve_api_key_with(api_key, &config.llm.api_key_env, |key| std::env::var(key).ok())?;
        let llm = AnthropicClient::new(&config.llm, api_key)?;

        let base = KnowledgeBase::load(&config.index.path)?;
        let dimension = base.manifest.dimension;
        let provider = TfidfEmbedder::new(Arc::new(base.model));
        let retriever =
            IndexRetriever::new(Arc::new(base.index)).with_min_score(config.retrieval.min_score);

        tracing::info!(
            model = %config.llm.model,
            index = %config.index.path.display(),
            "Assistant ready"
        );

        Self::builder()
            .embedding_provider(Arc::new(provider), dimension)
            .retriever(Arc::new(retriever))
            .llm(Arc::new(llm))
            .contact(config.contact.clone())
            .retrieval(config.retrieval.clone())
            .build()
    }

    pub fn default_k(&self) -> usize {
        self.retrieval.default_k
    }

    pub fn retrieval(&self) -> &RetrievalConfig {
        &self.retrieval
    }

    pub fn contact(&self) -> &ContactConfig {
        &self.contact
    }

    /// Answer `question` using the `k` most similar chunks.
    ///
    /// Any `k` is honoured, with 0 treated as 1. Callers facing users bound it
    /// with [`RetrievalConfig::clamp_k`].
    ///
    /// Answers and "not found" replies are appended to `conversation`;
    /// failures are logged and returned as an apology without touching it.
    pub async fn answer(
        &self,
        conversation: &mut Conversation,
        question: &str,
        k: usize,
    ) -> AnswerOutcome {
        let k = k.max(1);

        match self.try_answer(question, k).await {
            Ok(outcome) => {
                conversation.record(question, outcome.text());
                outcome
            }
            Err(e) => {
                tracing::error!(error = %e.chain(), "Error processing question");
                let message = messages::apology(&self.contact);
                let reason = e.to_string();
                if e.is_configuration() {
                    AnswerOutcome::ConfigurationError { message, reason }
                } else {
                    AnswerOutcome::TransientFailure { message, reason }
                }
            }
        }
    }

    /// [`Assistant::answer`] reduced to the text shown to the user
    pub async fn answer_text(
        &self,
        conversation: &mut Conversation,
        question: &str,
        k: usize,
    ) -> String {
        self.answer(conversation, question, k).await.into_text()
    }

    async fn try_answer(&self, question: &str, k: usize) -> Result<AnswerOutcome> {
        let query_embedding = self.embedder.embed_query(question).await;
        let results = self.retriever.retrieve(&query_embedding, k).await?;

        tracing::debug!(
            retriever = self.retriever.name(),
            k,
            found = results.len(),
            "Retrieved chunks"
        );

        if results.is_empty() {
            return Ok(AnswerOutcome::NoMatch {
                message: messages::not_found(&self.contact),
            });
        }

        let context = PromptBuilder::build_context(&results);
        let prompt = PromptBuilder::build_prompt(&context, question);

        let answer = self.llm.generate(&prompt).await?;
        tracing::info!(llm = self.llm.name(), model = self.llm.model(), "Answer generated");

        Ok(AnswerOutcome::Answered {
            answer,
            sources: results.iter().map(SourceRef::from).collect(),
        })
    }
}

/// Assembles an [`Assistant`] from its parts
#[derive(Default)]
pub struct AssistantBuilder {
    embedder: Option<Embedder>,
    retriever: Option<Arc<dyn Retriever>>,
    llm: Option<Arc<dyn LlmProvider>>,
    contact: ContactConfig,
    retrieval: RetrievalConfig,
}

impl AssistantBuilder {
    /// Embedding provider wrapped to always yield `dimension`-long vectors
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>, dimension: usize) -> Self {
        self.embedder = Some(Embedder::new(provider, dimension));
        self
    }

    pub fn retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn llm(mut self, llm: Arc<dyn LlmProvider>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn contact(mut self, contact: ContactConfig) -> Self {
        self.contact = contact;
        self
    }

    pub fn retrieval(mut self, retrieval: RetrievalConfig) -> Self {
        self.retrieval = retrieval;
        self
    }

    pub fn build(self) -> Result<Assistant> {
        Ok(Assistant {
            embedder: self
                .embedder
                .ok_or_else(|| Error::Config("assistant needs an embedding provider".into()))?,
            retriever: self
                .retriever
                .ok_or_else(|| Error::Config("assistant needs a retriever".into()))?,
            llm: self
                .llm
                .ok_or_else(|| Error::Config("assistant needs an LLM provider".into()))?,
            contact: self.contact,
            retrieval: self.retrieval,
        })
    }
}
