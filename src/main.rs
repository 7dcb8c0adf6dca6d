//! Terminal front end for the RAiCare client
//!
//! Usage: `raicare-client [chat | upload <path> | dashboard | history | clear-chat]`

use raicare_client::assessment::AssessmentPhase;
use raicare_client::config::ClientConfig;
use raicare_client::conversation::{ConvContext, Message, Role};
use raicare_client::gateway::{HttpGateway, LoggingGateway, RemoteGateway};
use raicare_client::overview::{load_dashboard, load_history, AssessmentSummary};
use raicare_client::runtime::{spawn_assessment, spawn_conversation};
use raicare_client::session::Session;
use raicare_client::severity::SeverityGuidance;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Logs go to stderr; stdout is the conversation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "raicare_client=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ClientConfig::from_env();
    let session = config
        .token
        .as_deref()
        .map_or_else(Session::anonymous, Session::with_token);
    if !session.is_authenticated() {
        tracing::warn!("RAICARE_TOKEN not set; protected endpoints will reject requests");
    }

    tracing::info!(api_url = %config.api_url, "Starting RAiCare client");
    let http = HttpGateway::new(&config, session)?;
    let gateway = Arc::new(LoggingGateway::new(Arc::new(http)));

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("chat") => chat(&config, gateway).await,
        Some("upload") => match args.get(1) {
            Some(path) => upload(gateway, path).await,
            None => Err("usage: raicare-client upload <path>".into()),
        },
        Some("dashboard") => {
            dashboard(gateway.as_ref()).await;
            Ok(())
        }
        Some("history") => {
            history(gateway.as_ref(), config.assessment_history_limit).await;
            Ok(())
        }
        Some("clear-chat") => {
            let deleted = gateway.clear_chat_history().await?;
            println!("Deleted {deleted} chat messages");
            Ok(())
        }
        Some(other) => Err(format!("unknown command: {other}").into()),
    }
}

async fn chat(config: &ClientConfig, gateway: Arc<LoggingGateway>) -> Result<(), BoxError> {
    let handle = spawn_conversation(ConvContext::new(config.chat_history_limit), gateway);
    handle.initialize().await?;
    let snapshot = handle.wait_for(|s| s.state.is_ready()).await?;
    snapshot.messages().iter().for_each(print_message);
    let mut shown = snapshot.messages().len();

    for (i, question) in snapshot.quick_questions().iter().enumerate() {
        println!("  [{}] {question}", i + 1);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "/quit" | "/exit") {
            break;
        }

        // A bare number picks a quick question while they are offered
        let quick = handle.snapshot().quick_questions();
        let text = line
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| quick.get(i).copied())
            .unwrap_or(line);

        handle.submit(text).await?;
        let snapshot = handle
            .wait_for(|s| s.state.is_ready() && s.messages().len() >= shown + 2)
            .await?;
        snapshot.messages()[shown..].iter().for_each(print_message);
        shown = snapshot.messages().len();
    }

    Ok(())
}

async fn upload(gateway: Arc<LoggingGateway>, path: &str) -> Result<(), BoxError> {
    let handle = spawn_assessment(gateway);
    handle.stage_path(path).await?;
    handle.wait_for(|s| s.phase() == AssessmentPhase::Staged).await?;

    handle.analyze().await?;
    println!("Analyzing {path}...");
    let state = handle
        .wait_for(|s| s.phase() == AssessmentPhase::Resolved || s.error().is_some())
        .await?;

    if let Some(error) = state.error() {
        return Err(error.to_string().into());
    }
    if let (Some(result), Some(guidance)) = (state.result(), state.guidance()) {
        let severity = result.severity.map_or("unknown", |s| s.as_str());
        println!("RA severity: {severity} ({:.1}%)", result.percentage);
        print_guidance(&guidance);
    }
    Ok(())
}

async fn dashboard(gateway: &dyn RemoteGateway) {
    match load_dashboard(gateway).await.latest {
        Some(summary) => {
            print_summary(&summary);
            print_guidance(&summary.guidance);
        }
        None => println!("No assessments yet. Upload an X-ray to get started."),
    }
}

async fn history(gateway: &dyn RemoteGateway, limit: usize) {
    let view = load_history(gateway, limit).await;
    if view.is_empty() {
        println!("No prediction history yet.");
        return;
    }

    println!("Total assessments: {}", view.stats.total);
    view.entries.iter().for_each(print_summary);
}

fn print_message(message: &Message) {
    let who = match message.role() {
        Role::User => "you",
        Role::Bot => "bot",
    };
    println!(
        "[{} {who}] {}",
        message.timestamp().format("%H:%M"),
        message.text()
    );
}

fn print_summary(summary: &AssessmentSummary) {
    let severity = summary.result.severity.map_or("unknown", |s| s.as_str());
    println!(
        "{}  {:>6}  {severity}",
        summary.result.analyzed_at.format("%Y-%m-%d %H:%M"),
        summary.score_label()
    );
}

fn print_guidance(guidance: &SeverityGuidance) {
    if !guidance.narrative.is_empty() {
        println!("{}", guidance.narrative);
    }
    for tip in guidance.recommendations {
        println!("  - {tip}");
    }
}
