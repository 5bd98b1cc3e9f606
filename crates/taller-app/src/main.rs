//! Taller dictado binary - composition root.
//!
//! 1. Load configuration from TOML and apply CLI/env overrides
//!    (`--write-config` saves the result and exits)
//! 2. Build the HTTP extraction client and the dictation dispatcher
//! 3. Replay the transcript through a scripted recognizer
//! 4. Print the extraction outcome as JSON (exit code 1 on failure)
//!
//! Ctrl-C cancels the running session.

mod cli;

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::broadcast;

use taller_core::config::TallerConfig;
use taller_dictation::{
    DictationDispatcher, ExtractionOutcome, HttpExtractionClient, ScriptedRecognizer,
    SpeechCaptureController,
};

use cli::CliArgs;

fn read_transcript(path: Option<&Path>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => std::io::read_to_string(std::io::stdin()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config. Loaded under a bootstrap subscriber; the configured level
    // applies from the next block on.
    let config_file = args.resolve_config_path();
    let bootstrap = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .finish();
    let mut config = tracing::subscriber::with_default(bootstrap, || {
        TallerConfig::load_or_default(&config_file)
    });
    config.extraction.base_url = args.resolve_base_url(&config.extraction.base_url);

    // Tracing. Logs go to stderr; stdout carries only the JSON outcome.
    let level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level)),
        )
        .init();

    tracing::info!("Starting taller-dictado v{}", env!("CARGO_PKG_VERSION"));
    config.validate()?;

    if args.write_config {
        config.save(&config_file)?;
        return Ok(());
    }

    let transcript = read_transcript(args.transcript_path().map(|p| p.as_path()))?;
    tracing::debug!(lines = transcript.lines().count(), "Transcript read");

    // Pipeline.
    let client = HttpExtractionClient::new(&config.extraction)?;
    tracing::info!(base_url = client.base_url(), "Extraction client ready");
    let dispatcher = DictationDispatcher::new(Arc::new(client));
    let recognizer = Arc::new(ScriptedRecognizer::from_transcript(&transcript));

    let (events_tx, mut events_rx) = broadcast::channel(32);
    let controller = Arc::new(
        SpeechCaptureController::new(recognizer, dispatcher, &config.dictation)?
            .with_events(events_tx),
    );

    tokio::spawn(async move {
        while let Ok(event) = events_rx.recv().await {
            tracing::debug!(
                event = event.event_name(),
                session_id = %event.session_id(),
                "Dictation event"
            );
        }
    });

    let cancel_target = Arc::clone(&controller);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, cancelling dictation");
            if let Err(e) = cancel_target.cancel_session() {
                tracing::debug!(error = %e, "Nothing to cancel");
            }
        }
    });

    let result = controller
        .start_session_with_context(args.context, args.field_key(), args.note())
        .await;
    let outcome = ExtractionOutcome::from(&result);
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if let Err(e) = result {
        tracing::debug!(kind = e.kind(), "Dictation did not produce data");
        std::process::exit(1);
    }
    Ok(())
}
