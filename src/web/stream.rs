//! WebSocket download channel.
//!
//! The client sends one `{url, format_id}` object. The server answers with
//! zero or more progress messages and exactly one terminal message
//! (`{file}` or `{error}`), then closes. Progress travels through an mpsc
//! queue drained by the socket's own send loop, so ordering is preserved.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::error::AppError;
use crate::download::{DownloadService, ProgressEvent};
use crate::web::AppState;

/// Percentage announced together with the finished flag
const FINISHED_PERCENT: &str = "100%";

/// Server → client message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StreamMessage {
    Finished { progress: String, finished: bool },
    Progress { progress: String },
    File { file: String },
    Error { error: String },
}

impl StreamMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error { error: message.into() }
    }

    /// `{file}` and `{error}` end the exchange
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::File { .. } | Self::Error { .. })
    }
}

impl From<ProgressEvent> for StreamMessage {
    fn from(event: ProgressEvent) -> Self {
        match event {
            ProgressEvent::Downloading { percent } => Self::Progress { progress: percent },
            ProgressEvent::Finished => Self::Finished {
                progress: FINISHED_PERCENT.to_string(),
                finished: true,
            },
        }
    }
}

/// Client → server initiation message. Fields are optional so a missing one
/// becomes a protocol error instead of a deserialization failure.
#[derive(Debug, Deserialize)]
struct StreamInit {
    url: Option<String>,
    format_id: Option<String>,
}

/// Validate the initiation message and return `(url, format_id)`.
pub fn parse_init(text: &str) -> Result<(String, String), AppError> {
    let init: StreamInit = serde_json::from_str(text)
        .map_err(|e| AppError::Protocol(format!("Invalid initiation message: {}", e)))?;

    let url = init.url.filter(|u| !u.trim().is_empty());
    let format_id = init.format_id.filter(|f| !f.trim().is_empty());

    match (url, format_id) {
        (Some(url), Some(format_id)) => Ok((url, format_id)),
        _ => Err(AppError::Protocol("url and format_id are required".to_string())),
    }
}

/// Run one channel exchange, pushing every message for the client into
/// `outbound`. The terminal message is always the last one sent.
pub async fn run_session(
    service: Arc<DownloadService>,
    init: String,
    outbound: mpsc::UnboundedSender<StreamMessage>,
    cancel: CancellationToken,
) {
    let (url, format_id) = match parse_init(&init) {
        Ok(fields) => fields,
        Err(e) => {
            log::info!("Rejected stream initiation: {}", e);
            let _ = outbound.send(StreamMessage::error(e.to_string()));
            return;
        }
    };

    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<ProgressEvent>();

    let download = tokio::spawn(async move {
        service
            .execute_download(&url, &format_id, Some(progress_tx), cancel)
            .await
    });

    // Ends once the extractor drops its sender, i.e. when the download returns
    while let Some(event) = progress_rx.recv().await {
        let _ = outbound.send(StreamMessage::from(event));
    }

    let terminal = match download.await {
        Ok(Ok(stored)) => StreamMessage::File {
            file: stored.path.to_string_lossy().into_owned(),
        },
        Ok(Err(e)) => StreamMessage::error(e.to_string()),
        Err(e) => {
            log::error!("Stream download task failed: {}", e);
            StreamMessage::error(format!("Download task failed: {}", e))
        }
    };
    let _ = outbound.send(terminal);
}

/// GET /ws/download - upgrade to the streaming download channel
pub async fn handle_stream(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.service))
}

async fn send_message(socket: &mut WebSocket, message: &StreamMessage) -> Result<(), axum::Error> {
    let text = serde_json::to_string(message).unwrap_or_else(|_| r#"{"error":"serialization failed"}"#.to_string());
    socket.send(Message::Text(text.into())).await
}

async fn handle_socket(mut socket: WebSocket, service: Arc<DownloadService>) {
    let init = loop {
        match socket.recv().await {
            Some(Ok(Message::Text(text))) => break text.as_str().to_owned(),
            // parse_init rejects anything that is not UTF-8 JSON
            Some(Ok(Message::Binary(data))) => break String::from_utf8_lossy(&data).into_owned(),
            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
            Some(Ok(Message::Close(_))) | Some(Err(_)) | None => {
                log::debug!("Stream closed before initiation");
                return;
            }
        }
    };

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    tokio::spawn(run_session(service, init, outbound_tx, cancel.clone()));

    loop {
        tokio::select! {
            message = outbound_rx.recv() => {
                let Some(message) = message else { break };
                if let Err(e) = send_message(&mut socket, &message).await {
                    log::info!("Stream client went away: {}", e);
                    cancel.cancel();
                    break;
                }
                if message.is_terminal() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => {
                        log::info!("Stream client disconnected, cancelling download");
                        cancel.cancel();
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    let _ = socket.send(Message::Close(None)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_message_wire_shapes() {
        let progress = StreamMessage::from(ProgressEvent::Downloading {
            percent: "42.3%".into(),
        });
        assert_eq!(serde_json::to_string(&progress).unwrap(), r#"{"progress":"42.3%"}"#);

        let finished = StreamMessage::from(ProgressEvent::Finished);
        assert_eq!(
            serde_json::to_string(&finished).unwrap(),
            r#"{"progress":"100%","finished":true}"#
        );

        let file = StreamMessage::File {
            file: "downloads/x.mp4".into(),
        };
        assert_eq!(serde_json::to_string(&file).unwrap(), r#"{"file":"downloads/x.mp4"}"#);

        let error = StreamMessage::error("boom");
        assert_eq!(serde_json::to_string(&error).unwrap(), r#"{"error":"boom"}"#);
    }

    #[test]
    fn test_terminal_messages() {
        assert!(StreamMessage::error("x").is_terminal());
        assert!(StreamMessage::File { file: "f".into() }.is_terminal());
        assert!(!StreamMessage::from(ProgressEvent::Finished).is_terminal());
    }

    #[test]
    fn test_parse_init() {
        assert_eq!(
            parse_init(r#"{"url": "https://example.com/v", "format_id": "18"}"#).unwrap(),
            ("https://example.com/v".to_string(), "18".to_string())
        );
        assert!(matches!(
            parse_init(r#"{"url": "https://example.com/v"}"#),
            Err(AppError::Protocol(_))
        ));
        assert!(matches!(parse_init(r#"{"format_id": "18"}"#), Err(AppError::Protocol(_))));
        assert!(matches!(
            parse_init(r#"{"url": "", "format_id": "18"}"#),
            Err(AppError::Protocol(_))
        ));
        assert!(matches!(parse_init("not json"), Err(AppError::Protocol(_))));
        assert!(matches!(parse_init(""), Err(AppError::Protocol(_))));
    }
}
