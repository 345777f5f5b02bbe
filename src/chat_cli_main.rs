//! Terminal chat front for the documentation assistant.
//!
//! Renders the controller state in plain text: example prompts while
//! the conversation is empty, answers with their cited sources, and
//! inline error lines.

use std::io::{self, BufRead, Write};

use clap::Parser;

use docqa::chat::{ChatSession, TurnOutcome, EXAMPLE_PROMPTS};
use docqa::client::ApiClient;
use docqa::schemas::ServiceFilter;

#[derive(Parser)]
#[command(
    name = "docqa-chat",
    version,
    about = "Chat with the LangChain, LangGraph, and LangSmith documentation assistant"
)]
struct Cli {
    /// Backend base URL.
    #[arg(long, default_value = "http://127.0.0.1:3005")]
    backend: String,

    /// Documentation scope: all, langchain, langgraph, or langsmith.
    #[arg(long, default_value = "all")]
    filter: ServiceFilter,

    /// Ask a single question and exit.
    #[arg(long)]
    question: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let client = ApiClient::new(cli.backend);
    let mut session = ChatSession::new(client);
    session.set_filter(cli.filter);

    if let Some(question) = cli.question {
        run_turn(&mut session, &question).await;
        return Ok(());
    }

    match session.client().check_health().await {
        Ok(health) if health.vector_store_ready => println!(
            "Connected. {} documentation chunks indexed.",
            health.indexed_documents
        ),
        Ok(_) => println!("Connected. The backend is still indexing documentation."),
        Err(err) => println!("Warning: {err}"),
    }
    println!("Type a question, /filter <name> to change scope, /quit to exit.\n");

    let stdin = io::stdin();
    loop {
        if session.controller().show_examples() {
            println!("Try one of these:");
            for prompt in EXAMPLE_PROMPTS {
                println!("  - {prompt}");
            }
        }

        print!("[{}] > ", session.controller().filter());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if line == "/quit" || line == "/exit" {
            break;
        }
        if let Some(raw) = line.strip_prefix("/filter") {
            match raw.trim().parse::<ServiceFilter>() {
                Ok(filter) => {
                    session.set_filter(filter);
                    println!("Filter set to {filter}.\n");
                }
                Err(err) => println!("{err}\n"),
            }
            continue;
        }

        run_turn(&mut session, line).await;
    }

    Ok(())
}

async fn run_turn(session: &mut ChatSession, question: &str) {
    match session.ask(question).await {
        TurnOutcome::Answered => {
            if let Some(message) = session.controller().messages().last() {
                println!("\n{}\n", message.content);
                if !message.sources.is_empty() {
                    println!("Sources:");
                    for source in &message.sources {
                        println!("  [{}] {} ({})", source.service, source.title, source.url);
                    }
                }
                if let Some(secs) = message.processing_time {
                    println!("({secs:.2}s)");
                }
                println!();
            }
        }
        TurnOutcome::Failed => {
            if let Some(error) = session.controller().error() {
                println!("error: {error}\n");
            }
        }
        TurnOutcome::Ignored => {}
    }
}
