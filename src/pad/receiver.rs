//! PAD source client.
//!
//! # Responsibilities
//! - Connect to the PAD source over TCP
//! - Split the byte stream into `\r\n\r\n`-terminated JSON documents
//! - Decode each document and hand it to the registered handler
//! - Stop on disconnect or shutdown signal
//!
//! # Design Decisions
//! - Strictly sequential: the handler finishes before the next read
//! - Malformed documents are logged and skipped; the connection survives
//! - Incomplete documents larger than `MAX_DOCUMENT_SIZE` are dropped
//! - No reconnection; a closed connection ends `start` with an error

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::Profile;
use crate::observability::metrics;
use crate::pad::log::{PadLog, Severity, TracingLog};
use crate::pad::types::PadMessage;
use crate::pad::update::Update;

/// Largest incomplete document kept while waiting for its terminator.
pub const MAX_DOCUMENT_SIZE: usize = 1024 * 1024;

const DOCUMENT_TERMINATOR: &[u8] = b"\r\n\r\n";
const READ_BUFFER_SIZE: usize = 4096;

/// Error type for receiver operations.
#[derive(Debug, Error)]
pub enum ReceiverError {
    /// Failed to connect to the PAD source.
    #[error("failed to connect to PAD source {addr}: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    /// Failed to read from an established connection.
    #[error("PAD source read error: {0}")]
    Io(#[from] std::io::Error),

    /// The PAD source closed the connection.
    #[error("PAD source {addr} closed the connection")]
    Disconnected { addr: String },
}

/// Callback invoked once per PAD update.
pub trait PadHandler {
    fn on_update(&self, update: &Update<'_>) -> impl Future<Output = ()> + Send;
}

/// Splits a byte stream into PAD documents.
#[derive(Debug)]
pub struct DocumentFramer {
    buffer: Vec<u8>,
    /// Bytes of `buffer` already searched for a terminator.
    scanned: usize,
    max_document: usize,
    /// Set after an oversized document was dropped; its tail is skipped
    /// up to the next terminator.
    discarding: bool,
}

impl DocumentFramer {
    pub fn new() -> Self {
        Self::with_max_document(MAX_DOCUMENT_SIZE)
    }

    pub fn with_max_document(max_document: usize) -> Self {
        Self {
            buffer: Vec::new(),
            scanned: 0,
            max_document,
            discarding: false,
        }
    }

    pub fn max_document(&self) -> usize {
        self.max_document
    }

    /// Append bytes read from the connection.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Take the next complete document, without its terminator.
    pub fn next_document(&mut self) -> Option<Vec<u8>> {
        loop {
            // A terminator may straddle the previous scan boundary
            let start = self
                .scanned
                .saturating_sub(DOCUMENT_TERMINATOR.len() - 1);
            let Some(offset) = self.buffer[start..]
                .windows(DOCUMENT_TERMINATOR.len())
                .position(|w| w == DOCUMENT_TERMINATOR)
            else {
                self.scanned = self.buffer.len();
                return None;
            };

            let pos = start + offset;
            let mut document: Vec<u8> = self
                .buffer
                .drain(..pos + DOCUMENT_TERMINATOR.len())
                .collect();
            document.truncate(pos);
            self.scanned = 0;

            if self.discarding {
                self.discarding = false;
                continue;
            }
            return Some(document);
        }
    }

    /// Drop a pending document that has outgrown the limit.
    ///
    /// Returns the number of bytes dropped. The rest of that document is
    /// skipped when it arrives.
    pub fn discard_oversized(&mut self) -> Option<usize> {
        if self.buffer.len() <= self.max_document {
            return None;
        }
        // Keep enough bytes to recognise a terminator split across reads
        let dropped = self.buffer.len() - (DOCUMENT_TERMINATOR.len() - 1);
        self.buffer.drain(..dropped);
        self.scanned = 0;
        self.discarding = true;
        Some(dropped)
    }

    /// Bytes received but not yet part of a complete document.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

impl Default for DocumentFramer {
    fn default() -> Self {
        Self::new()
    }
}

/// Receives PAD updates and dispatches them to a handler.
///
/// Owns the configuration for its whole lifetime; each update borrows it.
pub struct Receiver {
    config: Profile,
    log: Arc<dyn PadLog>,
    max_document: usize,
}

impl Receiver {
    /// Create a receiver that logs through `tracing`.
    pub fn new(config: Profile) -> Self {
        Self {
            config,
            log: Arc::new(TracingLog),
            max_document: MAX_DOCUMENT_SIZE,
        }
    }

    /// Replace the log sink handed to updates.
    pub fn with_log(mut self, log: Arc<dyn PadLog>) -> Self {
        self.log = log;
        self
    }

    /// Override the incomplete-document size limit.
    pub fn with_max_document(mut self, max_document: usize) -> Self {
        self.max_document = max_document;
        self
    }

    pub fn config(&self) -> &Profile {
        &self.config
    }

    /// Connect to `hostname:port` and dispatch updates until the connection
    /// closes or `shutdown` fires.
    pub async fn start<H: PadHandler>(
        &self,
        hostname: &str,
        port: u16,
        handler: &H,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ReceiverError> {
        let addr = format!("{hostname}:{port}");
        let stream = TcpStream::connect((hostname, port))
            .await
            .map_err(|source| ReceiverError::Connect {
                addr: addr.clone(),
                source,
            })?;

        tracing::info!(addr = %addr, "Connected to PAD source");

        self.receive(stream, &addr, handler, shutdown).await
    }

    /// Dispatch updates read from an already-open stream.
    ///
    /// If every `Shutdown` sender is dropped, the receiver keeps reading
    /// until the stream closes.
    pub async fn receive<S, H>(
        &self,
        mut stream: S,
        addr: &str,
        handler: &H,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ReceiverError>
    where
        S: AsyncRead + Unpin,
        H: PadHandler,
    {
        let mut framer = DocumentFramer::with_max_document(self.max_document);
        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        let mut listening = true;

        loop {
            let n = tokio::select! {
                read = stream.read(&mut buf) => read?,
                signal = shutdown.recv(), if listening => match signal {
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::debug!("Shutdown channel closed; reading until disconnect");
                        listening = false;
                        continue;
                    }
                    Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                        tracing::info!("PAD receiver received shutdown signal, exiting loop");
                        return Ok(());
                    }
                },
            };

            if n == 0 {
                tracing::warn!(
                    addr = %addr,
                    pending_bytes = framer.pending(),
                    "PAD source closed the connection"
                );
                return Err(ReceiverError::Disconnected {
                    addr: addr.to_string(),
                });
            }

            framer.push(&buf[..n]);
            while let Some(document) = framer.next_document() {
                self.dispatch(&document, handler).await;
            }

            if let Some(dropped) = framer.discard_oversized() {
                metrics::record_document_rejected();
                self.log.log(
                    Severity::Warning,
                    &format!(
                        "PAD document exceeds {} bytes, dropped {dropped} buffered bytes",
                        framer.max_document()
                    ),
                );
            }
        }
    }

    async fn dispatch<H: PadHandler>(&self, document: &[u8], handler: &H) {
        if document.iter().all(u8::is_ascii_whitespace) {
            return;
        }

        let message = match serde_json::from_slice::<PadMessage>(document) {
            Ok(message) => message,
            Err(e) => {
                metrics::record_document_rejected();
                self.log
                    .log(Severity::Warning, &format!("invalid PAD document: {e}"));
                return;
            }
        };

        metrics::record_update_received();
        let update = Update::new(message.pad_update, &self.config, self.log.as_ref());
        let span = tracing::info_span!(
            "pad_update",
            update_id = %Uuid::new_v4(),
            machine = update.machine()
        );
        handler.on_update(&update).instrument(span).await;
    }
}

impl std::fmt::Debug for Receiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Receiver")
            .field("sections", &self.config.sections().count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_framer_splits_documents() {
        let mut framer = DocumentFramer::new();
        framer.push(b"{\"a\":1}\r\n\r\n{\"b\":");
        assert_eq!(framer.next_document().as_deref(), Some(&b"{\"a\":1}"[..]));
        assert_eq!(framer.next_document(), None);

        framer.push(b"2}\r\n");
        assert_eq!(framer.next_document(), None);
        framer.push(b"\r\n");
        assert_eq!(framer.next_document().as_deref(), Some(&b"{\"b\":2}"[..]));
        assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn test_framer_terminator_split_across_reads() {
        let mut framer = DocumentFramer::new();
        for byte in b"{}\r\n\r\n".iter() {
            framer.push(std::slice::from_ref(byte));
        }
        assert_eq!(framer.next_document().as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn test_framer_resumes_scan_after_partial_terminator() {
        let mut framer = DocumentFramer::new();
        framer.push(b"{\"a\":1}\r\n");
        assert_eq!(framer.next_document(), None);
        framer.push(b"\r");
        assert_eq!(framer.next_document(), None);
        framer.push(b"\n{");
        assert_eq!(framer.next_document().as_deref(), Some(&b"{\"a\":1}"[..]));
        assert_eq!(framer.pending(), 1);
    }

    #[test]
    fn test_framer_drops_oversized_document() {
        let mut framer = DocumentFramer::with_max_document(8);
        framer.push(b"0123456789\r");
        assert_eq!(framer.next_document(), None);
        assert_eq!(framer.discard_oversized(), Some(8));
        assert_eq!(framer.pending(), 3);

        // The tail of the dropped document is skipped, the next one survives
        framer.push(b"\n\r\n{}\r\n\r\n");
        assert_eq!(framer.next_document().as_deref(), Some(&b"{}"[..]));
        assert_eq!(framer.next_document(), None);
        assert_eq!(framer.discard_oversized(), None);
    }

    #[derive(Default)]
    struct Collect {
        titles: Mutex<Vec<String>>,
    }

    impl PadHandler for Collect {
        async fn on_update(&self, update: &Update<'_>) {
            let title = update.resolve_pad_fields("%t", crate::pad::Escape::None);
            self.titles.lock().unwrap().push(title);
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(Severity, String)>>);

    impl PadLog for Recorder {
        fn log(&self, severity: Severity, message: &str) {
            self.0.lock().unwrap().push((severity, message.to_string()));
        }
    }

    #[tokio::test]
    async fn test_receive_dispatches_and_skips_garbage() {
        let input: &[u8] = b"{\"padUpdate\":{\"now\":{\"title\":\"One\"}}}\r\n\r\n\
            not json\r\n\r\n\
            \r\n\r\n\
            {\"padUpdate\":{\"now\":{\"title\":\"Two\"}}}\r\n\r\n";

        let log = Arc::new(Recorder::default());
        let receiver = Receiver::new(Profile::default()).with_log(log.clone());
        let handler = Collect::default();
        let (_tx, rx) = broadcast::channel(1);

        let result = receiver.receive(input, "test", &handler, rx).await;

        assert!(matches!(result, Err(ReceiverError::Disconnected { .. })));
        assert_eq!(*handler.titles.lock().unwrap(), vec!["One", "Two"]);

        let logged = log.0.lock().unwrap();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].0, Severity::Warning);
        assert!(logged[0].1.starts_with("invalid PAD document"));
    }

    #[tokio::test]
    async fn test_receive_stops_on_shutdown() {
        let (client, _server) = tokio::io::duplex(64);
        let receiver = Receiver::new(Profile::default());
        let handler = Collect::default();
        let (tx, rx) = broadcast::channel(1);
        tx.send(()).unwrap();

        let result = receiver.receive(client, "test", &handler, rx).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_receive_oversized_document_is_dropped() {
        let oversized: &[u8] = &[b'x'; 64];
        let rest: &[u8] = b"\r\n\r\n{\"padUpdate\":{\"now\":{\"title\":\"Kept\"}}}\r\n\r\n";
        let input = oversized.chain(rest);

        let log = Arc::new(Recorder::default());
        let receiver = Receiver::new(Profile::default())
            .with_log(log.clone())
            .with_max_document(16);
        let handler = Collect::default();
        let (_tx, rx) = broadcast::channel(1);

        let result = receiver.receive(input, "test", &handler, rx).await;

        assert!(matches!(result, Err(ReceiverError::Disconnected { .. })));
        assert_eq!(*handler.titles.lock().unwrap(), vec!["Kept"]);

        let logged = log.0.lock().unwrap();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].0, Severity::Warning);
        assert!(logged[0].1.starts_with("PAD document exceeds 16 bytes"));
    }

    #[tokio::test]
    async fn test_receive_ignores_closed_shutdown_channel() {
        let input: &[u8] = b"{\"padUpdate\":{\"now\":{\"title\":\"One\"}}}\r\n\r\n";
        let receiver = Receiver::new(Profile::default());
        let handler = Collect::default();
        let (tx, rx) = broadcast::channel(1);
        drop(tx);

        let result = receiver.receive(input, "test", &handler, rx).await;

        assert!(matches!(result, Err(ReceiverError::Disconnected { .. })));
        assert_eq!(*handler.titles.lock().unwrap(), vec!["One"]);
    }

    #[tokio::test]
    async fn test_start_connect_failure() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let receiver = Receiver::new(Profile::default());
        let handler = Collect::default();
        let (_tx, rx) = broadcast::channel(1);

        let err = receiver
            .start("127.0.0.1", port, &handler, rx)
            .await
            .unwrap_err();
        assert!(matches!(err, ReceiverError::Connect { .. }));
    }
}
