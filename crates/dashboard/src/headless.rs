use gemini_client::ModelBackend;
use protocol::{ChatMessage, ChatRole, PredictionRequest, PredictionResult};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::layers::engine::{reply_message, ChatSessionClient, PredictionClient, Transcript};

const QUIT_COMMANDS: [&str; 2] = ["/quit", "/exit"];

pub(crate) async fn run_predict(
    backend: Arc<dyn ModelBackend>,
    request: PredictionRequest,
) -> anyhow::Result<()> {
    let result = forecast(backend, request).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn forecast(
    backend: Arc<dyn ModelBackend>,
    request: PredictionRequest,
) -> anyhow::Result<PredictionResult> {
    let request = PredictionRequest::new(
        request.location.trim(),
        request.time_of_day.trim(),
        request.density_description.trim(),
    );
    if let Some(field) = request.missing_field() {
        anyhow::bail!("{} must not be blank", field);
    }
    Ok(PredictionClient::new(backend).predict(&request).await.result)
}

pub(crate) async fn run_chat(backend: Arc<dyn ModelBackend>, instruction: String) -> anyhow::Result<()> {
    let client = ChatSessionClient::new(backend, instruction);
    let reader = BufReader::new(tokio::io::stdin());
    let transcript = chat_session(client, reader, tokio::io::stdout()).await?;
    tracing::info!(event = "chat_session_ended", messages = transcript.len());
    Ok(())
}

async fn chat_session<R, W>(
    mut client: ChatSessionClient,
    reader: R,
    mut writer: W,
) -> anyhow::Result<Transcript>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut transcript = Transcript::default();
    for message in transcript.messages() {
        write_message(&mut writer, message).await?;
    }

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if QUIT_COMMANDS.contains(&text) {
            break;
        }
        transcript.push_user(text);
        let reply = reply_message(client.send(text).await);
        write_message(&mut writer, &reply).await?;
        transcript.push(reply);
    }
    writer.flush().await?;
    Ok(transcript)
}

async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    message: &ChatMessage,
) -> anyhow::Result<()> {
    let speaker = match message.role {
        ChatRole::User => "you",
        ChatRole::Assistant if message.is_error => "consultant (error)",
        ChatRole::Assistant => "consultant",
    };
    let line = format!(
        "[{}] {}: {}\n",
        humantime::format_rfc3339_seconds(message.timestamp),
        speaker,
        message.text
    );
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
