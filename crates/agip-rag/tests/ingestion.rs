//! Ingestion pipeline over temporary PDF directories

mod common;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use agip_rag::retrieval::KnowledgeBase;
use agip_rag::{IngestionPipeline, RagConfig};
use common::TextLoader;

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn text_pipeline() -> IngestionPipeline {
    IngestionPipeline::new(&RagConfig::default()).with_loader(Arc::new(TextLoader))
}

fn long_page(topic: &str) -> String {
    format!("{} requiere el certificado único de discapacidad vigente. ", topic).repeat(30)
}

#[tokio::test]
async fn unreadable_pdfs_produce_no_index() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("pdfs");
    fs::create_dir(&input).unwrap();
    write(&input, "roto.pdf", "this is not a pdf");
    write(&input, "notas.txt", "no es un pdf");

    let output = tmp.path().join("knowledge_index");
    let report = IngestionPipeline::new(&RagConfig::default())
        .run(&input, &output)
        .await
        .unwrap();

    assert!(report.is_none());
    assert!(!output.exists());
}

#[tokio::test]
async fn empty_directory_leaves_existing_index_untouched() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("pdfs");
    fs::create_dir(&input).unwrap();
    let output = tmp.path().join("knowledge_index");
    fs::create_dir(&output).unwrap();
    write(&output, "previous.bin", "keep me");

    let report = text_pipeline().run(&input, &output).await.unwrap();

    assert!(report.is_none());
    assert!(output.join("previous.bin").exists());
}

#[tokio::test]
async fn blank_pages_produce_no_index() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("pdfs");
    fs::create_dir(&input).unwrap();
    write(&input, "escaneado.pdf", "   \u{000C}\n\n\u{000C}  ");

    let output = tmp.path().join("knowledge_index");
    let report = text_pipeline().run(&input, &output).await.unwrap();

    assert!(report.is_none());
    assert!(!output.exists());
}

#[tokio::test]
async fn failing_files_are_skipped() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("pdfs");
    fs::create_dir(&input).unwrap();
    write(&input, "b_abl.pdf", "La exención de ABL alcanza al inmueble.");
    write(
        &input,
        "a_patentes.PDF",
        &format!("{}\u{000C}Segunda página sobre patentes.", long_page("La exención de patentes")),
    );
    write(&input, "c_danado.pdf", "BROKEN");
    write(&input, "leeme.txt", "ignorado");

    let output = tmp.path().join("knowledge_index");
    let report = text_pipeline().run(&input, &output).await.unwrap().unwrap();

    assert_eq!(report.files_processed, 2);
    assert_eq!(report.files_failed, 1);
    assert_eq!(report.pages, 3);
    assert!(report.chunks > 3);
    assert_eq!(report.output, output);

    let base = KnowledgeBase::load(&output).unwrap();
    assert_eq!(base.manifest.source_files, vec!["a_patentes.PDF", "b_abl.pdf"]);
    assert_eq!(base.manifest.chunk_count, report.chunks);
    assert_eq!(base.manifest.dimension, 768);
    assert_eq!(base.manifest.fingerprint, report.fingerprint);

    let ids: Vec<&str> = base.index.chunks().map(|c| c.id.as_str()).collect();
    assert_eq!(ids[0], "a_patentes.PDF_0#0");
    assert_eq!(ids[ids.len() - 1], "b_abl.pdf_0#0");
    assert!(ids.contains(&"a_patentes.PDF_1#0"));

    for chunk in base.index.chunks() {
        assert!(chunk.content.chars().count() <= 512);
        assert!(!chunk.content.trim().is_empty());
    }
}

#[tokio::test]
async fn ingestion_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("pdfs");
    fs::create_dir(&input).unwrap();
    write(&input, "guia.pdf", &long_page("El trámite de renovación"));
    write(&input, "faq.pdf", &long_page("La exención de ABL"));

    let first = text_pipeline()
        .run(&input, &tmp.path().join("uno"))
        .await
        .unwrap()
        .unwrap();
    let second = text_pipeline()
        .run(&input, &tmp.path().join("dos"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(first.chunks, second.chunks);
    assert_eq!(first.fingerprint, second.fingerprint);

    let a = KnowledgeBase::load(&tmp.path().join("uno")).unwrap();
    let b = KnowledgeBase::load(&tmp.path().join("dos")).unwrap();
    assert_eq!(a.index, b.index);
    assert_eq!(a.model, b.model);
}

#[tokio::test]
async fn rerun_replaces_the_previous_index() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("pdfs");
    fs::create_dir(&input).unwrap();
    write(&input, "guia.pdf", "Primera versión de la guía de exenciones.");

    let output = tmp.path().join("knowledge_index");
    text_pipeline().run(&input, &output).await.unwrap().unwrap();
    write(&output, "stale.txt", "left over");

    write(&input, "guia.pdf", "Segunda versión de la guía de exenciones.");
    text_pipeline().run(&input, &output).await.unwrap().unwrap();

    assert!(!output.join("stale.txt").exists());
    let base = KnowledgeBase::load(&output).unwrap();
    let contents: Vec<&str> = base.index.chunks().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, vec!["Segunda versión de la guía de exenciones."]);
}
