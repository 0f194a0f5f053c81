use async_trait::async_trait;
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::pin::Pin;
use tokio_tungstenite::tungstenite::Message;

use crate::error::ClientError;

/// Outbound text messages
pub type FrameSink = Pin<Box<dyn Sink<String, Error = ClientError> + Send>>;

/// Inbound text messages; the stream ends when the peer closes
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String, ClientError>> + Send>>;

/// Opens the raw text transport the STOMP session runs over
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<(FrameSink, FrameStream), ClientError>;
}

/// Plain WebSocket transport
#[derive(Debug, Default, Clone)]
pub struct WebSocketConnector;

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, url: &str) -> Result<(FrameSink, FrameStream), ClientError> {
        let (socket, response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| ClientError::realtime(format!("websocket connect failed: {}", e)))?;
        tracing::debug!("WebSocket upgraded: {}", response.status());

        let (write, read) = socket.split();

        let sink = write
            .with(|text: String| async move { Ok::<_, tokio_tungstenite::tungstenite::Error>(Message::Text(text)) })
            .sink_map_err(|e| ClientError::realtime(e.to_string()));

        let stream = read.filter_map(|message| async move {
            match message {
                Ok(Message::Text(text)) => Some(Ok(text)),
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                    Ok(text) => Some(Ok(text)),
                    Err(_) => Some(Err(ClientError::realtime("non UTF-8 binary frame"))),
                },
                // Ping/pong are answered by tungstenite; close ends the stream
                Ok(_) => None,
                Err(e) => Some(Err(ClientError::realtime(e.to_string()))),
            }
        });

        Ok((Box::pin(sink), Box::pin(stream)))
    }
}
