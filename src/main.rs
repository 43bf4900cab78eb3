use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use speech_session::engine::scripted::{replay, Script};
use speech_session::{
    create_router, AppState, Config, Language, NatsCapability, NatsClient, NotificationLog,
    RecognitionController, ScriptedCapability, SessionHandle,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "speech-session")]
#[command(about = "Speech recognition session controller", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP control API over a NATS-bridged STT service
    Serve {
        /// Config file (without extension)
        #[arg(short, long, default_value = "config/speech-session")]
        config: String,

        /// Override the configured recognition language (kk-KZ or ru-RU)
        #[arg(short, long)]
        language: Option<Language>,
    },
    /// Replay a JSON event script through the controller and print the result
    Replay {
        /// Script file
        script: PathBuf,

        /// Override the script's starting language (kk-KZ or ru-RU)
        #[arg(short, long)]
        language: Option<Language>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    match args.command {
        Command::Serve { config, language } => serve(&config, language).await,
        Command::Replay { script, language } => run_replay(script, language),
    }
}

async fn serve(config_path: &str, language: Option<Language>) -> Result<()> {
    let cfg = Config::load(config_path)?;
    let language = language.unwrap_or(cfg.recognition.language);

    info!("Loaded config: {}", cfg.service.name);

    let client = NatsClient::connect(&cfg.nats.url, cfg.nats.session_id())
        .await
        .context("Failed to connect to NATS")?;
    info!("Recognition session id: {}", client.session_id());

    let notifications = NotificationLog::new(cfg.recognition.notification_history);
    let controller = RecognitionController::new(
        Arc::new(NatsCapability::new(Arc::new(client))),
        Arc::new(notifications.clone()),
        language,
    );

    let (session, service_task) = SessionHandle::spawn(controller);
    let app = create_router(AppState::new(session.clone(), notifications));

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await
        .context("HTTP server failed")?;

    session.shutdown().await?;
    service_task.await.context("Session service panicked")?;

    Ok(())
}

fn run_replay(path: PathBuf, language: Option<Language>) -> Result<()> {
    let script = Script::load(&path)?;
    let language = language.or(script.language).unwrap_or_default();

    let capability = ScriptedCapability::new();
    let notifications = NotificationLog::default();
    let mut controller = RecognitionController::new(
        Arc::new(capability.clone()),
        Arc::new(notifications.clone()),
        language,
    );

    replay(&script.steps, &capability, &mut controller);

    let state = controller.state();
    controller.teardown();

    for n in notifications.recent() {
        println!("[{:?}] {}", n.severity, n.message);
    }
    println!("{}", serde_json::to_string_pretty(&state)?);

    Ok(())
}
