use gemini_client::ModelBackend;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::layers::engine::{reply_message, ChatSessionClient, PredictionClient};
use crate::layers::service::events::{ServiceCommand, ServiceEvent, Ticket};

/// Starts the request side of the dashboard. Forecasts run as independent
/// tasks; chat turns are fed one at a time to a single task that owns the
/// conversation, so replies come back in submission order.
pub(crate) fn spawn_service(
    backend: Arc<dyn ModelBackend>,
    instruction: String,
    mut cmd_rx: mpsc::Receiver<ServiceCommand>,
    event_tx: mpsc::Sender<ServiceEvent>,
) -> JoinHandle<()> {
    let predictions = PredictionClient::new(Arc::clone(&backend));
    let (chat_tx, chat_rx) = mpsc::channel::<(Ticket, String)>(32);
    tokio::spawn(chat_loop(
        ChatSessionClient::new(backend, instruction),
        chat_rx,
        event_tx.clone(),
    ));

    tokio::spawn(async move {
        while let Some(command) = cmd_rx.recv().await {
            match command {
                ServiceCommand::Predict { ticket, request } => {
                    tracing::info!(event = "prediction_requested", ticket, location = %request.location);
                    let client = predictions.clone();
                    let event_tx = event_tx.clone();
                    tokio::spawn(async move {
                        let forecast = client.predict(&request).await;
                        let _ = event_tx
                            .send(ServiceEvent::PredictionReady { ticket, forecast })
                            .await;
                    });
                }
                ServiceCommand::Chat { ticket, text } => {
                    tracing::info!(event = "chat_requested", ticket, len = text.len());
                    if chat_tx.send((ticket, text)).await.is_err() {
                        tracing::error!(event = "chat_worker_gone");
                        break;
                    }
                }
            }
        }
        tracing::debug!(event = "service_stopped");
    })
}

async fn chat_loop(
    mut client: ChatSessionClient,
    mut chat_rx: mpsc::Receiver<(Ticket, String)>,
    event_tx: mpsc::Sender<ServiceEvent>,
) {
    while let Some((ticket, text)) = chat_rx.recv().await {
        let outcome = client.send(&text).await;
        tracing::debug!(event = "chat_turn_done", ticket, session_ready = client.is_ready());
        let message = reply_message(outcome);
        if event_tx
            .send(ServiceEvent::ChatReplied { ticket, message })
            .await
            .is_err()
        {
            break;
        }
    }
}
