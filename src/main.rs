//! ragchat - terminal client for a retrieval-augmented Q&A service

use chrono::Utc;
use ragchat::config::ClientConfig;
use ragchat::controller::ConversationController;
use ragchat::gateway::{HttpGateway, LoggingGateway, QueryScope};
use ragchat::render::render_turn;
use ragchat::transcript::{TranscriptChange, TranscriptStore};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "Commands: /clear /forget /history /health /stats /config /process [force] \
                    /rights <q> /constitution <q> /government <q> /quit";

/// One line of user input
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Ask(&'a str),
    AskScoped(QueryScope, &'a str),
    Clear,
    Forget,
    History,
    Health,
    Stats,
    Config,
    Process { force: bool },
    Quit,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        if !trimmed.starts_with('/') {
            return Command::Ask(line);
        }

        let (name, rest) = trimmed
            .split_once(char::is_whitespace)
            .map_or((trimmed, ""), |(name, rest)| (name, rest.trim_start()));

        match name {
            "/clear" => Command::Clear,
            "/forget" => Command::Forget,
            "/history" => Command::History,
            "/health" => Command::Health,
            "/stats" => Command::Stats,
            "/config" => Command::Config,
            "/process" => Command::Process {
                force: matches!(rest, "force" | "--force"),
            },
            "/quit" | "/exit" => Command::Quit,
            "/rights" => Command::AskScoped(QueryScope::FundamentalRights, rest),
            "/constitution" => Command::AskScoped(QueryScope::Constitutional, rest),
            "/government" => Command::AskScoped(QueryScope::GovernmentStructure, rest),
            other => Command::Unknown(other),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they do not interleave with the transcript
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ragchat=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ClientConfig::from_env()?;
    tracing::info!(
        url = %config.base_url,
        strategy = %config.retrieval_strategy,
        language = %config.language,
        "Starting ragchat"
    );

    let http = HttpGateway::new(&config.base_url, config.connect_timeout)?;
    let gateway = LoggingGateway::new(Arc::new(http));

    let store = Arc::new(TranscriptStore::new());
    let _subscription = store.subscribe(|change| match change {
        TranscriptChange::Appended { message, pending } => {
            println!("{}", render_turn(message, Utc::now()));
            if *pending {
                println!("...");
            }
        }
        TranscriptChange::Cleared => println!("-- transcript cleared --"),
        TranscriptChange::PendingChanged(_) => {}
    });

    let controller = ConversationController::new(&config, Arc::clone(&store), gateway);

    if !controller.check_health().await {
        println!(
            "Warning: {} is not responding; questions will fail until it is up.",
            config.base_url
        );
    }
    if controller.language_supported().await == Some(false) {
        println!(
            "Warning: the service does not list language {:?}; answers may ignore it.",
            config.language
        );
    }
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Ask(question) => controller.send(question).await,
            Command::AskScoped(scope, question) => controller.send_scoped(question, scope).await,
            Command::Clear => controller.clear(),
            Command::Forget => {
                if controller.forget_remote_history().await {
                    println!("The service has forgotten this conversation.");
                } else {
                    println!("Could not reach the service to clear its history.");
                }
            }
            Command::History => match controller.remote_history().await {
                Some(history) => {
                    println!("{} remembered exchange(s)", history.total_conversations);
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&history.conversation_history)?
                    );
                }
                None => println!("The service history is unavailable."),
            },
            Command::Config => match controller.service_config().await {
                Some(service) => println!("{}", serde_json::to_string_pretty(&service)?),
                None => println!("The service configuration is unavailable."),
            },
            Command::Process { force } => {
                if controller.process_documents(force).await {
                    println!("Document processing started; questions work once it finishes.");
                } else {
                    println!("Could not start document processing.");
                }
            }
            Command::Health => {
                let status = if controller.check_health().await {
                    "healthy"
                } else {
                    "unreachable"
                };
                println!("{}: {status}", config.base_url);
            }
            Command::Stats => match controller.fetch_stats().await {
                Some(stats) => println!("{}", serde_json::to_string_pretty(&stats)?),
                None => println!("Statistics are unavailable."),
            },
            Command::Quit => break,
            Command::Unknown(name) => println!("Unknown command {name}. {HELP}"),
        }
    }

    tracing::info!(turns = store.snapshot().len(), "Exiting");
    Ok(())
}
