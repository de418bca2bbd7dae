//! Event stream port — the hub's persistent push channel.
//!
//! The watcher only needs two things from the transport: a way to open a
//! connection, and a way to pull the next text payload off it. Everything
//! else (framing, pings, TLS) is the adapter's business.

use std::future::Future;

/// Type-erased transport error carried as a `source`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Connection-level failures. Always recovered by reconnecting.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The connection could not be opened.
    #[error("failed to open event stream")]
    Connect(#[source] BoxError),

    /// Reading from an open connection failed.
    #[error("failed to receive from event stream")]
    Receive(#[source] BoxError),

    /// The peer closed the connection or the stream ended.
    #[error("event stream closed")]
    Closed,
}

/// Opens connections to the hub's event stream.
pub trait EventSource: Send + Sync {
    /// The connection type handed to the watcher's receive loop.
    type Connection: EventConnection;

    /// Open a new connection.
    fn connect(&self) -> impl Future<Output = Result<Self::Connection, StreamError>> + Send;
}

/// One open event-stream connection, owned by a single reader.
pub trait EventConnection: Send {
    /// Wait for the next text payload.
    ///
    /// Returns [`StreamError::Closed`] once the peer goes away; the
    /// connection must not be used after an error.
    fn recv(&mut self) -> impl Future<Output = Result<String, StreamError>> + Send;
}
