//! AGIP assistant CLI
//!
//! Run with: cargo run -p agip-rag --bin agip -- <command>

use agip_rag::{
    config::RagConfig,
    generation::messages::SUGGESTED_QUESTIONS,
    server::AgipServer,
    types::ChatSession,
    Assistant, IngestionPipeline,
};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "agip")]
#[command(about = "Asistente virtual de AGIP para trámites y exenciones por discapacidad", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "AGIP_CONFIG")]
    config: Option<PathBuf>,

    /// Anthropic API key (defaults to ANTHROPIC_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the knowledge index from a directory of PDFs
    Ingest {
        /// Directory containing the PDFs
        #[arg(long)]
        dir: PathBuf,
        /// Where to write the index (default: configured index path)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Answer a single question
    Ask {
        /// The question, in Spanish
        question: String,
        /// Number of passages to retrieve (1-10)
        #[arg(short, long)]
        k: Option<usize>,
    },
    /// Interactive chat
    Chat {
        /// Number of passages to retrieve (1-10)
        #[arg(short, long)]
        k: Option<usize>,
    },
    /// Serve the HTTP API
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agip_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = RagConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Ingest { dir, output } => {
            let output = output.unwrap_or_else(|| config.index.path.clone());
            let pipeline = IngestionPipeline::new(&config);

            match pipeline.run(&dir, &output).await? {
                Some(report) => {
                    println!("Base de conocimiento creada en {}", report.output.display());
                    println!("  Archivos procesados: {}", report.files_processed);
                    println!("  Archivos con error:  {}", report.files_failed);
                    println!("  Páginas:             {}", report.pages);
                    println!("  Fragmentos:          {}", report.chunks);
                    println!("  Huella:              {}", report.fingerprint);
                }
                None => {
                    eprintln!("No se encontraron documentos para procesar en {}", dir.display());
                    return Ok(ExitCode::from(2));
                }
            }
        }
        Commands::Ask { question, k } => {
            let assistant = Assistant::from_config(&config, cli.api_key)?;
            let k = k.map_or_else(|| assistant.default_k(), |k| assistant.retrieval().clamp_k(k));
            let mut conversation = agip_rag::Conversation::new();
            let outcome = assistant.answer(&mut conversation, &question, k).await;

            println!("{}", outcome.text());
            if !outcome.sources().is_empty() {
                println!();
                println!("Fuentes:");
                for source in outcome.sources() {
                    println!("  - {} (página {}, similitud {:.3})", source.source, source.page, source.similarity);
                }
            }
            if outcome.is_failure() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Chat { k } => {
            let assistant = Assistant::from_config(&config, cli.api_key)?;
            let k = k.map_or_else(|| assistant.default_k(), |k| assistant.retrieval().clamp_k(k));
            run_chat(&assistant, k).await?;
        }
        Commands::Serve => {
            let server = AgipServer::new(config, cli.api_key)?;

            println!("\nServer starting...");
            println!("  API: http://{}", server.address());
            println!("  Health: http://{}/health", server.address());
            println!("\nEndpoints:");
            println!("  POST /api/chat                - Ask a question");
            println!("  GET  /api/sessions/:id        - Chat messages and history");
            println!("  DELETE /api/sessions/:id      - End the session");
            println!("  POST /api/sessions/:id/clear  - Clear the chat");
            println!("  GET  /api/suggestions         - Suggested questions");
            println!("\nPress Ctrl+C to stop\n");

            server.start().await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_chat(assistant: &Assistant, k: usize) -> anyhow::Result<()> {
    let mut session = ChatSession::new();
    println!("{}\n", session.messages()[0].text);
    print_suggestions();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        let question = match input {
            "" => continue,
            "/salir" => break,
            "/limpiar" => {
                session.clear();
                println!("\n{}\n", session.messages()[0].text);
                print_suggestions();
                continue;
            }
            "/historial" => {
                let history = session.conversation().history();
                if history.is_empty() {
                    println!("Todavía no hay preguntas respondidas.\n");
                }
                for (i, turn) in history.iter().enumerate() {
                    println!("{}. {}\n   {}\n", i + 1, turn.question, turn.answer);
                }
                continue;
            }
            other => match suggestion_for(other, session.is_fresh()) {
                Some(suggested) => {
                    println!("{}", suggested);
                    suggested.to_string()
                }
                None => other.to_string(),
            },
        };

        session.push_user(question.as_str());
        let outcome = assistant
            .answer(session.conversation_mut(), &question, k)
            .await;
        println!("\n{}\n", outcome.text());
        session.push_assistant(outcome.into_text());
    }

    Ok(())
}

fn print_suggestions() {
    println!("Preguntas sugeridas (escribe el número para elegir una):");
    for (i, question) in SUGGESTED_QUESTIONS.iter().enumerate() {
        println!("  {}. {}", i + 1, question);
    }
    println!("Comandos: /limpiar, /historial, /salir\n");
}

/// Suggested question picked by number, only while the chat is fresh
fn suggestion_for(input: &str, fresh: bool) -> Option<&'static str> {
    if !fresh {
        return None;
    }
    let n: usize = input.parse().ok()?;
    SUGGESTED_QUESTIONS.get(n.checked_sub(1)?).copied()
}
