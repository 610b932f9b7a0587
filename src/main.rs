use clap::{Parser, Subcommand};
use colored::*;
use anyhow::Result;

mod app;
mod config;
mod gemini;
mod handler;
mod quiz;
mod tui;
mod tutor;
mod ui;

use app::App;
use config::Config;
use gemini::GeminiClient;
use tutor::Tutor;

#[derive(Parser)]
#[command(name = "intellilearn")]
#[command(about = "AI-powered English learning: chat practice, writing feedback, grammar lessons and quizzes")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the English tutor a question (one-shot)
    Ask {
        /// Your question
        question: String,
    },
    /// Look up a word: definition, example, synonyms, antonyms
    Define {
        /// The word to define
        word: String,
    },
    /// Print a grammar lesson for a topic
    Lesson {
        /// Grammar topic, e.g. "Passive Voice"
        topic: String,
    },
    /// List the available grammar topics
    Topics,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Ask { question }) => ask(&build_tutor()?, &question).await,
        Some(Commands::Define { word }) => define(&build_tutor()?, &word).await,
        Some(Commands::Lesson { topic }) => lesson(&build_tutor()?, &topic).await,
        Some(Commands::Topics) => {
            // The topic list needs no credentials
            list_topics();
            Ok(())
        }
        None => run_tui(build_tutor()?).await,
    }
}

/// A missing API key is fatal here, before any call is attempted.
fn build_tutor() -> Result<Tutor> {
    let config = Config::load().unwrap_or_default();
    let api_key = config.resolve_api_key()?;
    let client = GeminiClient::new(&api_key);
    Ok(Tutor::new(client, config.flash_model(), config.pro_model()))
}

async fn ask(tutor: &Tutor, question: &str) -> Result<()> {
    println!("🤖 Asking your English tutor...\n");
    let response = tutor.chat_response(question).await;
    println!("{}", "Tutor:".bold().green());
    println!("{}", response);
    Ok(())
}

async fn define(tutor: &Tutor, word: &str) -> Result<()> {
    println!("🔍 Looking up: {}\n", word.bold().cyan());
    let definition = tutor.define_word(word).await;
    println!("{}", definition);
    Ok(())
}

async fn lesson(tutor: &Tutor, topic: &str) -> Result<()> {
    println!("📖 Generating a lesson on: {}\n", topic.bold().cyan());
    let text = tutor.grammar_lesson(topic).await;
    println!("{}", text);
    Ok(())
}

fn list_topics() {
    println!("\n{}", "📚 Grammar Topics".bold().blue());
    println!("{}", "=".repeat(30).dimmed());

    for topic in tutor::GRAMMAR_TOPICS {
        println!("  • {}", topic.green());
    }
}

async fn run_tui(tutor: Tutor) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();
    let mut app = App::new(tutor);

    let result = run_loop(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    result
}

async fn run_loop(
    terminal: &mut tui::Tui,
    events: &mut tui::EventHandler,
    app: &mut App,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(app, event)?;
        }

        // Resolve any remote calls that finished since the last iteration
        app.poll_tasks().await;
    }
    Ok(())
}
