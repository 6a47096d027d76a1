//! Fixed user-facing messages

use crate::config::ContactConfig;

/// First message of every chat session
pub const GREETING: &str = "¡Hola! Soy el asistente virtual de AGIP especializado en trámites y exenciones por discapacidad. Puedo ayudarte a entender los requisitos, procedimientos y beneficios disponibles. ¿En qué puedo ayudarte hoy?";

/// Starter questions offered while a chat is still empty
pub const SUGGESTED_QUESTIONS: [&str; 4] = [
    "¿Qué documentos necesito para solicitar la exención por discapacidad?",
    "¿Dónde puedo realizar los trámites por discapacidad?",
    "¿Qué impuestos pueden ser eximidos por discapacidad?",
    "¿Cuál es el proceso para renovar una exención?",
];

/// Answer given when the index holds nothing relevant
pub fn not_found(contact: &ContactConfig) -> String {
    format!(
        "No encontré información específica sobre ese tema en mi base de conocimiento. \
         Te recomiendo consultar directamente en la página oficial de AGIP: {} \
         o llamar al centro de atención telefónica {}.",
        contact.website, contact.phone
    )
}

/// Answer given when the question could not be processed
pub fn apology(contact: &ContactConfig) -> String {
    format!(
        "Lo siento, ocurrió un error al procesar tu consulta. Por favor, intenta nuevamente \
         con otra pregunta o contacta directamente con AGIP al {}.",
        contact.phone
    )
}
