//! WebSocket event source — the hub's `eventsocket` endpoint.

use futures_util::StreamExt as _;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use hubbridge_app::ports::{EventConnection, EventSource, StreamError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens WebSocket connections to the hub event stream.
#[derive(Debug, Clone)]
pub struct WebSocketSource {
    url: Url,
}

impl WebSocketSource {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self { url }
    }
}

impl EventSource for WebSocketSource {
    type Connection = WebSocketConnection;

    async fn connect(&self) -> Result<WebSocketConnection, StreamError> {
        let (stream, response) = connect_async(self.url.as_str())
            .await
            .map_err(|err| StreamError::Connect(Box::new(err)))?;
        tracing::debug!(status = %response.status(), "event stream handshake complete");
        Ok(WebSocketConnection { stream })
    }
}

/// One open WebSocket to the hub.
pub struct WebSocketConnection {
    stream: WsStream,
}

impl EventConnection for WebSocketConnection {
    async fn recv(&mut self) -> Result<String, StreamError> {
        loop {
            match self.stream.next().await {
                Some(Ok(WsMessage::Text(text))) => return Ok(text.as_str().to_owned()),
                Some(Ok(WsMessage::Binary(bytes))) => {
                    return Ok(String::from_utf8_lossy(&bytes).into_owned());
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    tracing::debug!(?frame, "hub closed the event stream");
                    return Err(StreamError::Closed);
                }
                Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_))) => {}
                Some(Err(err)) => return Err(StreamError::Receive(Box::new(err))),
                None => return Err(StreamError::Closed),
            }
        }
    }
}
