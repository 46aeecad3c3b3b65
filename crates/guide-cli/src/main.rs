mod render;

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use guide_core::{
    ConversationPipeline, InputClassifier, RandomPicker, ResponseComposer, SuggestionCatalog,
    Topic, VerseCatalog,
};
use session_store::{
    ChatSession, GuideConfig, MemorySessionStore, SessionDirectory, SessionOptions, SessionStore,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "guide-cli")]
#[command(about = "Talk to the Gita guide from the terminal")]
#[command(version)]
struct Cli {
    /// Directory holding persisted sessions
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[arg(long)]
    session: Option<String>,

    /// Keep the session in memory only
    #[arg(long, default_value = "false")]
    ephemeral: bool,

    /// Reply delay in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Enable debug logging
    #[arg(long, short, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List stored sessions with message totals
    Sessions,
    #[command(flatten)]
    Current(SessionCommand),
}

/// Commands acting on the selected session
#[derive(Subcommand)]
enum SessionCommand {
    /// Start interactive chat
    Chat,
    /// Send a single message
    Send {
        /// Message content
        message: String,
    },
    /// Show recent messages
    History {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show the session summary
    Session,
    /// Show message and topic counters
    Stats,
    /// Clear the session and start over
    Reset,
    /// List the verse catalog
    Verses,
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_line_number(true)
                .with_file(false)
                .with_writer(io::stderr),
        )
        .init();
}

fn build_pipeline(config: &GuideConfig) -> anyhow::Result<ConversationPipeline> {
    let verses = match &config.verses_path {
        Some(path) => {
            tracing::info!("Loading verses from {}", path.display());
            VerseCatalog::from_file(path)?
        }
        None => VerseCatalog::builtin(),
    };
    let composer = ResponseComposer::new(
        verses,
        SuggestionCatalog::builtin(),
        Box::new(RandomPicker::new()),
    );
    Ok(ConversationPipeline::new(InputClassifier::new(), composer))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let mut config = GuideConfig::load()?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(session) = &cli.session {
        config.session_id = session.clone();
    }
    if let Some(delay) = cli.delay_ms {
        config.reply_delay_ms = delay;
    }
    tracing::debug!(?config, "Resolved configuration");

    let directory = SessionDirectory::new(config.sessions_dir());
    let command = match cli.command {
        Commands::Sessions => return print_sessions(&directory).await,
        Commands::Current(command) => command,
    };

    let pipeline = build_pipeline(&config)?;
    let options = SessionOptions::from(&config);

    if cli.ephemeral {
        let session = ChatSession::open(MemorySessionStore::new(), pipeline, options).await;
        run(session, command).await
    } else {
        let store = directory.store(&config.session_id);
        let session = ChatSession::open(store, pipeline, options).await;
        run(session, command).await
    }
}

async fn print_sessions(directory: &SessionDirectory) -> anyhow::Result<()> {
    let overview = directory.overview().await?;
    println!("{}", serde_json::to_string_pretty(&overview)?);
    Ok(())
}

async fn run<S: SessionStore>(
    mut session: ChatSession<S>,
    command: SessionCommand,
) -> anyhow::Result<()> {
    match command {
        SessionCommand::Chat => run_interactive_chat(&mut session).await,
        SessionCommand::Send { message } => send_message(&mut session, &message).await,
        SessionCommand::History { limit } => {
            let messages = match limit {
                Some(limit) => session.recent(limit),
                None => session.history(),
            };
            for message in messages {
                println!("{}\n", render::message(message));
            }
            Ok(())
        }
        SessionCommand::Session => {
            println!("{}", serde_json::to_string_pretty(&session.summary())?);
            Ok(())
        }
        SessionCommand::Stats => {
            println!("{}", serde_json::to_string_pretty(&session.stats())?);
            Ok(())
        }
        SessionCommand::Reset => {
            session.reset().await?;
            println!("{}", "Session cleared".green());
            Ok(())
        }
        SessionCommand::Verses => {
            let verses = session.pipeline().verses();
            for topic in Topic::ALL {
                println!("{}", topic.to_string().bold());
                println!("{}\n", render::verse_block(verses.lookup(topic)));
            }
            Ok(())
        }
    }
}

async fn send_message<S: SessionStore>(
    session: &mut ChatSession<S>,
    message: &str,
) -> anyhow::Result<()> {
    match session.send(message).await? {
        Some(exchange) => println!("{}", render::message(&exchange.reply)),
        None => println!("{}", "Nothing to send".dimmed()),
    }
    Ok(())
}

async fn run_interactive_chat<S: SessionStore>(session: &mut ChatSession<S>) -> anyhow::Result<()> {
    println!("{}", "🕉️  Gita Guide".cyan().bold());
    println!("{}", format!("Session: {}", session.session_id()).dimmed());
    println!(
        "{}",
        "Type /history, /reset, or /quit. Enter 1-3 to use a suggestion.".dimmed()
    );
    println!();

    for message in session.history() {
        println!("{}\n", render::message(message));
    }

    loop {
        print!("{} ", "You:".cyan().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        match input {
            "" => continue,
            "/quit" | "/exit" => break,
            "/history" => {
                for message in session.history() {
                    println!("{}\n", render::message(message));
                }
                continue;
            }
            "/reset" => {
                match session.reset().await {
                    Ok(()) => println!("{}\n", render::message(&session.messages()[0])),
                    Err(e) => println!("{}", format!("❌ Error: {}", e).red()),
                }
                continue;
            }
            _ => {}
        }

        let text = render::pick_suggestion(input, session.latest_suggestions())
            .map(str::to_string)
            .unwrap_or_else(|| input.to_string());

        println!("{}", "Guide is reflecting...".dimmed());
        match session.send(&text).await {
            Ok(Some(exchange)) => println!("{}\n", render::message(&exchange.reply)),
            Ok(None) => {}
            Err(e) => println!("{}", format!("❌ Error: {}", e).red()),
        }
    }

    println!("{}", "🙏 Namaste".cyan());
    Ok(())
}
