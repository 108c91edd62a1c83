use std::io::Write;
use std::sync::Arc;

use clearpath::adapters::ReqwestHttpClient;
use clearpath::client::QueryClient;
use clearpath::config::ClientConfig;
use clearpath::health::HealthMonitor;
use clearpath::logging::init_logging;
use clearpath::models::Message;
use clearpath::session::Session;

use color_eyre::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP: &str = "Type a question and press Enter. Commands: /reset, /health, /help, /quit";

fn print_details(message: &Message) {
    let Some(response) = &message.response else {
        return;
    };

    if !response.sources.is_empty() {
        println!("Sources:");
        for source in &response.sources {
            println!("  - {}", source.label());
        }
    }

    let metadata = &response.metadata;
    let mut details = vec![
        format!("tokens: {}", metadata.tokens),
        format!("latency: {} ms", metadata.latency_ms),
    ];
    if !metadata.model_used.is_empty() {
        details.insert(0, format!("model: {}", metadata.model_used));
    }
    if metadata.cache_hit {
        details.push("cached".to_string());
    }
    println!("({})", details.join(", "));

    if metadata.is_flagged() {
        if let Some(warning) = &metadata.evaluator_message {
            println!("! {}", warning);
        }
    }
}

fn prompt(monitor: &HealthMonitor) -> Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "[{}] > ", monitor.status())?;
    stdout.flush()?;
    Ok(())
}

async fn ask(session: &mut Session<ReqwestHttpClient>, question: &str) -> Result<()> {
    let mut stdout = std::io::stdout();
    let mut printed = 0;
    let mut write_error: Option<std::io::Error> = None;

    // Print only the text that arrived since the last update
    let result = session
        .ask(question, |state| {
            let Some(last) = state.last().filter(|m| m.is_assistant()) else {
                return;
            };
            if write_error.is_some() || last.content.len() <= printed {
                return;
            }
            let written = write!(stdout, "{}", &last.content[printed..])
                .and_then(|_| stdout.flush());
            match written {
                Ok(()) => printed = last.content.len(),
                Err(e) => write_error = Some(e),
            }
        })
        .await;
    if let Some(e) = write_error {
        return Err(e.into());
    }
    println!();

    match result {
        Ok(summary) => {
            tracing::debug!(
                chunks = summary.chunks,
                dropped = summary.dropped_frames,
                "Answer complete"
            );
            if let Some(message) = session.state().last() {
                print_details(message);
            }
        }
        Err(e) => {
            tracing::debug!("Exchange failed: {}", e);
            if let Some(text) = session.last_error() {
                eprintln!("Error: {}", text);
            }
        }
    }
    Ok(())
}

async fn run(config: ClientConfig) -> Result<()> {
    let mut http = ReqwestHttpClient::new();
    if let Some(timeout) = config.request_timeout {
        http = http.with_request_timeout(timeout);
    }
    let client = QueryClient::new(http, config.base_url.clone());
    tracing::info!("Using API at {}", client.base_url());

    let mut monitor = HealthMonitor::new(
        Arc::new(client.clone()),
        config.health_interval,
        config.health_bound,
    );
    monitor.start();

    let mut session = Session::new(client).with_partial_policy(config.partial_answers);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", HELP);
    loop {
        prompt(&monitor)?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/help" => println!("{}", HELP),
            "/health" => println!("Backend: {}", monitor.status()),
            "/reset" => {
                session.reset();
                println!("Started a new conversation.");
            }
            question => ask(&mut session, question).await?,
        }
    }

    monitor.stop();
    Ok(())
}

fn main() -> Result<()> {
    if std::env::args().any(|arg| arg == "--version") {
        println!("clearpath {}", VERSION);
        return Ok(());
    }

    color_eyre::install()?;
    init_logging()?;

    let config = ClientConfig::from_env();
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(config))
}
