//! Terminal driver for the tutor conversation.
//!
//! Reads lines from stdin and submits them to the orchestrator, printing each
//! transcript entry and avatar status as it happens. Input typed while the
//! tutor is busy is dropped by the orchestrator, just as a disabled input box
//! would drop it.

mod cli;
mod input;
#[cfg(feature = "audio-io")]
mod player;
mod render;

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing::{info, warn};
use tutor_core::{
    ConversationOrchestrator, CycleOutcome,
    client::HttpTutorClient,
    orchestrator::QUICK_TOPICS,
    playback::AudioPlayer,
};

use crate::{
    cli::Args,
    input::{Command, HELP},
};

const UPDATE_BUFFER: usize = 64;

#[cfg(feature = "audio-io")]
fn audio_player() -> Arc<dyn AudioPlayer> {
    Arc::new(player::SpeakerPlayer)
}

#[cfg(not(feature = "audio-io"))]
fn audio_player() -> Arc<dyn AudioPlayer> {
    Arc::new(tutor_core::playback::SilentPlayer)
}

fn print_topics() {
    for (i, topic) in QUICK_TOPICS.iter().enumerate() {
        println!("  {}. {}", i + 1, topic);
    }
}

enum Ask {
    Text(String),
    Topic(&'static str),
}

/// Runs one cycle in the background so the prompt stays responsive.
fn spawn_cycle(orchestrator: &Arc<ConversationOrchestrator>, ask: Ask) {
    if orchestrator.is_busy() {
        println!("  (the tutor is still answering; input ignored)");
        return;
    }
    let orchestrator = orchestrator.clone();
    tokio::spawn(async move {
        let outcome = match ask {
            Ask::Text(text) => orchestrator.submit(&text).await,
            Ask::Topic(topic) => orchestrator.select_topic(topic).await,
        };
        if outcome == CycleOutcome::ChatFailed {
            warn!("Chat request failed");
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let api = Arc::new(
        HttpTutorClient::new(args.server_url.clone(), args.request_timeout())
            .context("Failed to build the HTTP client")?,
    );
    let (tx, mut rx) = mpsc::channel(UPDATE_BUFFER);
    let orchestrator = Arc::new(
        ConversationOrchestrator::new(api, audio_player(), args.orchestrator_config())
            .with_updates(tx),
    );
    info!(server_url = %args.server_url, "Tutor client started");

    let printer = tokio::spawn(async move {
        while let Some(update) = rx.recv().await {
            println!("{}", render::update_line(&update));
        }
    });

    println!("AI Tutor ({})", args.server_url);
    println!("{}", HELP);
    println!("Try one of these:");
    print_topics();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read from stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        match input::parse(&line) {
            Command::Say(text) => spawn_cycle(&orchestrator, Ask::Text(text.to_string())),
            Command::Topic(topic) => spawn_cycle(&orchestrator, Ask::Topic(topic)),
            Command::ListTopics => print_topics(),
            Command::Transcript => {
                for message in orchestrator.transcript().await {
                    println!("{}", render::message_line(&message));
                }
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
            Command::Unknown(other) => println!("Unknown command: {} (try /help)", other),
        }
    }

    drop(orchestrator);
    printer.abort();
    info!("Tutor client stopped");
    Ok(())
}
