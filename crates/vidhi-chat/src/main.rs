//! Terminal chat client for the Vidhi relay.

mod view;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use vidhi_agent::RelayClient;
use vidhi_core::conversation::{ConversationController, Outcome};

use view::TerminalView;

#[derive(Parser, Debug)]
#[command(name = "vidhi-chat", about = "Describe an incident and get a legal analysis")]
struct Cli {
    /// Base URL of the relay server
    #[arg(long, env = "VIDHI_RELAY_URL", default_value = "http://localhost:3000")]
    relay_url: String,
}

enum Command<'a> {
    Message(&'a str),
    Analyze,
    Quit,
}

fn parse_command(line: &str) -> Command<'_> {
    match line.trim() {
        "/quit" | "/exit" => Command::Quit,
        "/analyze" => Command::Analyze,
        other => Command::Message(other),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the conversation; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!(relay_url = %cli.relay_url, "starting chat session");

    let view = TerminalView::new(std::io::stdout());
    let mut controller = ConversationController::new(RelayClient::new(&cli.relay_url), view);
    println!("(type /analyze for the final analysis, /quit to leave)\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        controller.view_mut().prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let outcome = match parse_command(&line) {
            Command::Quit => break,
            Command::Analyze => controller.request_analysis().await,
            Command::Message(text) => controller.submit_message(text).await,
        };
        if let Outcome::Failed = outcome {
            info!(turns = controller.conversation().len(), "round trip failed; session continues");
        }
    }

    Ok(())
}
