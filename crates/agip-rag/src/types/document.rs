//! Page and chunk types with source tracking for citations

use serde::{Deserialize, Serialize};

/// Where a piece of text came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Source PDF file name
    pub source: String,
    /// Page number as printed for citizens, 1-based.
    ///
    /// Loaders count pages from 0, so this is always the loader's page index
    /// plus one; `doc_id` keeps the 0-based index.
    pub page: u32,
    /// `"{filename}_{page_index}"`, page index 0-based
    pub doc_id: String,
}

impl ChunkMetadata {
    /// Metadata for page `page_index` (0-based) of `filename`
    pub fn for_page(filename: &str, page_index: usize) -> Self {
        Self {
            source: filename.to_string(),
            page: page_index as u32 + 1,
            doc_id: format!("{}_{}", filename, page_index),
        }
    }
}

/// Text of a single PDF page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDocument {
    /// Extracted page text
    pub content: String,
    /// Page metadata
    pub metadata: ChunkMetadata,
}

impl PageDocument {
    pub fn new(content: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }
}

/// A text window cut from a page, the unit stored in the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// `"{doc_id}#{n}"`, n = position of the chunk within its page
    pub id: String,
    /// Chunk text
    pub content: String,
    /// Metadata inherited from the page
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Create the `position`-th chunk of a page
    pub fn new(content: impl Into<String>, metadata: ChunkMetadata, position: usize) -> Self {
        Self {
            id: format!("{}#{}", metadata.doc_id, position),
            content: content.into(),
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_metadata_numbering() {
        let meta = ChunkMetadata::for_page("ley_22431.pdf", 0);
        assert_eq!(meta.page, 1);
        assert_eq!(meta.doc_id, "ley_22431.pdf_0");

        let chunk = Chunk::new("Artículo 1", meta, 3);
        assert_eq!(chunk.id, "ley_22431.pdf_0#3");
    }

    #[test]
    fn test_page_is_loader_index_plus_one() {
        for index in [0usize, 1, 41] {
            let meta = ChunkMetadata::for_page("guia.pdf", index);
            assert_eq!(meta.page as usize, index + 1);
            assert!(meta.doc_id.ends_with(&format!("_{}", index)));
        }
    }
}
