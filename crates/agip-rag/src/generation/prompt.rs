//! Prompt templates for RAG generation

use crate::retrieval::ScoredChunk;
use crate::types::ChunkMetadata;

/// Separator placed between context blocks
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Prompt builder for AGIP queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build context from search results, one block per chunk
    pub fn build_context(results: &[ScoredChunk]) -> String {
        results
            .iter()
            .map(|result| {
                format!(
                    "{}\n{}",
                    Self::format_source_ref(&result.chunk.metadata),
                    result.chunk.content
                )
            })
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }

    /// Header naming the document and page a block comes from
    fn format_source_ref(metadata: &ChunkMetadata) -> String {
        let source = if metadata.source.is_empty() {
            "Desconocido"
        } else {
            metadata.source.as_str()
        };
        format!("[Documento: {}, Página: {}]", source, metadata.page)
    }

    /// Build the full grounded prompt
    pub fn build_prompt(context: &str, question: &str) -> String {
        format!(
            r#"Eres un asistente virtual especializado en trámites y exenciones de AGIP (Administración Gubernamental de Ingresos Públicos).

Tu objetivo es proporcionar información clara, precisa y empática sobre trámites y beneficios fiscales para las personas.

Instrucciones:
- Responde de manera clara y sencilla, evitando jerga técnica innecesaria
- Muestra empatía hacia las personas con discapacidad y sus familias
- Si la información específica no está en el contexto, indica claramente que el usuario debería consultar directamente con AGIP
- Incluye información sobre dónde y cómo realizar los trámites cuando esté disponible
- Menciona siempre los requisitos documentales necesarios
- Estructura tus respuestas en párrafos breves y claros

Contexto de la información:
{context}

Pregunta:
{question}

Respuesta:"#,
            context = context,
            question = question
        )
    }
}
