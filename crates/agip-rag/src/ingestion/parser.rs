//! Page-level PDF text extraction

use std::path::Path;

use crate::error::{Error, Result};

/// Seconds to wait for pdf-extract before falling back to lopdf
const EXTRACT_TIMEOUT_SECS: u64 = 60;

/// Loads the per-page text of a document
pub trait DocumentLoader: Send + Sync {
    /// Page texts in page order
    fn load(&self, path: &Path) -> Result<Vec<String>>;
}

/// Replace ligatures and typographic glyphs that PDF fonts leave behind
fn cleanup_pdf_text(text: &str) -> String {
    text.replace('\0', "")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB00}', "ff")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace(['\u{2010}', '\u{2011}', '\u{2013}'], "-")
        .replace('\u{2014}', "--")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace('\u{2022}', "* ")
        .replace('\u{2026}', "...")
        .replace('\u{00A0}', " ")
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

/// PDF loader: pdf-extract page by page, lopdf as fallback
#[derive(Debug, Clone, Default)]
pub struct PdfLoader;

impl PdfLoader {
    pub fn new() -> Self {
        Self
    }

    /// Extract page texts from PDF bytes
    pub fn parse(filename: &str, data: &[u8]) -> Result<Vec<String>> {
        let pages = Self::extract_pages_with_timeout(filename, data)?;
        Ok(pages.iter().map(|page| cleanup_pdf_text(page)).collect())
    }

    /// Run pdf-extract on a separate thread so a pathological font cannot hang ingestion
    fn extract_pages_with_timeout(filename: &str, data: &[u8]) -> Result<Vec<String>> {
        use std::sync::mpsc;
        use std::thread;
        use std::time::Duration;

        let data_vec = data.to_vec();
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let result = pdf_extract::extract_text_from_mem_by_pages(&data_vec);
            let _ = tx.send(result);
        });

        match rx.recv_timeout(Duration::from_secs(EXTRACT_TIMEOUT_SECS)) {
            Ok(Ok(pages)) => {
                let _ = handle.join();
                Ok(pages)
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                tracing::warn!("pdf-extract failed on {}: {}, trying fallback", filename, e);
                Self::extract_pages_fallback(filename, data)
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::error!(
                    "PDF extraction timeout after {}s on {} - PDF may have complex fonts",
                    EXTRACT_TIMEOUT_SECS,
                    filename
                );
                Self::extract_pages_fallback(filename, data)
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                tracing::error!("PDF extraction thread crashed on {}", filename);
                Self::extract_pages_fallback(filename, data)
            }
        }
    }

    /// Fallback PDF text extraction using lopdf directly
    fn extract_pages_fallback(filename: &str, data: &[u8]) -> Result<Vec<String>> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::file_parse(filename, format!("Failed to load PDF: {}", e)))?;

        let pages = doc
            .get_pages()
            .into_keys()
            .map(|page_num| match doc.extract_text(&[page_num]) {
                Ok(text) => text,
                Err(e) => {
                    tracing::debug!("Could not extract text from page {} of {}: {}", page_num, filename, e);
                    String::new()
                }
            })
            .collect();

        Ok(pages)
    }
}

impl DocumentLoader for PdfLoader {
    fn load(&self, path: &Path) -> Result<Vec<String>> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let data = std::fs::read(path)
            .map_err(|e| Error::file_parse(&filename, format!("Cannot read file: {}", e)))?;
        Self::parse(&filename, &data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_pdf_text() {
        let cleaned = cleanup_pdf_text("Certi\u{FB01}cado\u{00A0}Único\0   \n\u{201C}CUD\u{201D} \u{2013} vigente  ");
        assert_eq!(cleaned, "Certificado Único\n\"CUD\" - vigente");
    }

    #[test]
    fn test_cleanup_keeps_paragraph_breaks() {
        assert_eq!(cleanup_pdf_text("uno\n\ndos"), "uno\n\ndos");
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        let result = PdfLoader::parse("roto.pdf", b"this is not a pdf");
        assert!(matches!(result, Err(Error::FileParse { .. })));
    }

    #[test]
    fn test_missing_file_is_a_parse_error() {
        let result = PdfLoader::new().load(Path::new("/definitely/not/here.pdf"));
        assert!(matches!(result, Err(Error::FileParse { .. })));
    }
}
