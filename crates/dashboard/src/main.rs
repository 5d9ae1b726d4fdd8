mod cli;
mod config;
mod content;
mod headless;
mod layers;

use crate::cli::{Args, Command};
use crate::config::load_config;
use crate::layers::service::events::{ServiceCommand, ServiceEvent};
use crate::layers::service::logging::init_tracing;
use crate::layers::service::spawn_service;
use crate::layers::ui::{draw_ui, handle_key_event, restore_terminal, setup_terminal, AppState};
use clap::Parser;
use crossterm::event::{self, Event};
use gemini_client::{GeminiClient, ModelBackend};
use protocol::PredictionRequest;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_to_stderr = args.log_to_stderr && args.command.is_some();
    let _file_guard = init_tracing(&args.log_dir, log_to_stderr)?;

    let config = load_config(args.config.as_deref(), args.model.as_deref())?;
    let client = GeminiClient::new(config.model.clone());
    if !client.has_api_key() {
        tracing::warn!(
            event = "api_key_missing",
            env = %config.model.api_key_env,
            "model requests will fall back until the key is set"
        );
    }
    tracing::info!(event = "startup", model = client.model(), timeout_secs = config.model.timeout_secs);
    let model_name = client.model().to_string();
    let credentials_ok = client.has_api_key();
    let backend: Arc<dyn ModelBackend> = Arc::new(client);

    match args.command {
        Some(Command::Predict {
            location,
            time,
            density,
        }) => {
            let request = PredictionRequest::new(location, time, density);
            return headless::run_predict(backend, request).await;
        }
        Some(Command::Chat) => {
            return headless::run_chat(backend, content::assistant_instruction()).await;
        }
        None => {}
    }

    let (cmd_tx, cmd_rx) = mpsc::channel::<ServiceCommand>(64);
    let (event_tx, mut event_rx) = mpsc::channel::<ServiceEvent>(64);
    spawn_service(backend, content::assistant_instruction(), cmd_rx, event_tx);

    let mut terminal = setup_terminal()?;
    let mut app = AppState::new(model_name, credentials_ok);

    let tick_rate = Duration::from_millis(config.ui.tick_ms);
    let outcome = run_loop(&mut terminal, &mut app, &cmd_tx, &mut event_rx, tick_rate);

    restore_terminal(&mut terminal)?;
    tracing::info!(event = "shutdown");
    outcome
}

fn run_loop(
    terminal: &mut layers::ui::terminal::DashboardTerminal,
    app: &mut AppState,
    cmd_tx: &mpsc::Sender<ServiceCommand>,
    event_rx: &mut mpsc::Receiver<ServiceEvent>,
    tick_rate: Duration,
) -> anyhow::Result<()> {
    loop {
        while let Ok(event) = event_rx.try_recv() {
            app.handle_event(event);
        }

        terminal.draw(|frame| draw_ui(frame, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if handle_key_event(key, app, cmd_tx) {
                    return Ok(());
                }
            }
        }
    }
}
