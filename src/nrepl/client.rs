//! nREPL session transport
//!
//! Every evaluation opens its own TCP connection, clones a fresh session,
//! sends one `eval` and collects the response until the server reports
//! `done`, closes the connection, or the read limit is reached. Nothing is
//! pooled or reused between calls.

use super::bencode::{scan_fields, Request, ResponseFields};
use crate::config::{
    default_nrepl_max_reads, default_nrepl_read_buffer_size, default_nrepl_timeout, NreplConfig,
};
use std::fmt;
use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

/// Transport and handshake failures
#[derive(Error, Debug)]
pub enum NreplError {
    #[error("nREPL connection refused. Is the nREPL server running?")]
    ConnectionRefused,

    #[error("nREPL connection timed out")]
    TimedOut,

    #[error("Could not create nREPL session")]
    SessionNotCreated,

    #[error("{0}")]
    Io(io::Error),
}

impl From<io::Error> for NreplError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::ConnectionRefused => NreplError::ConnectionRefused,
            io::ErrorKind::TimedOut => NreplError::TimedOut,
            _ => NreplError::Io(e),
        }
    }
}

/// Final result of one evaluation
#[derive(Debug)]
pub enum Outcome {
    Value(String),
    EvalError(String),
    RemoteException(String),
    Failed(NreplError),
}

impl Outcome {
    /// Resolve decoded fields: `err`, then `root-ex`, then `value`.
    pub fn from_fields(fields: ResponseFields) -> Self {
        if let Some(err) = fields.err {
            Outcome::EvalError(err)
        } else if let Some(ex) = fields.root_ex {
            Outcome::RemoteException(ex)
        } else {
            Outcome::Value(fields.value.unwrap_or_else(|| "No result".to_string()))
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Outcome::Value(_))
    }
}

/// Unformatted text of the outcome, with its `Error:`/`Exception:` prefix
impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Value(v) => write!(f, "{}", v),
            Outcome::EvalError(e) => write!(f, "Error: {}", e),
            Outcome::RemoteException(e) => write!(f, "Exception: {}", e),
            Outcome::Failed(e) => write!(f, "Error: {}", e),
        }
    }
}

/// Client for a single nREPL endpoint
#[derive(Debug, Clone)]
pub struct NreplClient {
    host: String,
    port: u16,
    timeout: Duration,
    max_reads: usize,
    read_buffer_size: usize,
}

impl NreplClient {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: Duration::from_secs(default_nrepl_timeout()),
            max_reads: default_nrepl_max_reads(),
            read_buffer_size: default_nrepl_read_buffer_size(),
        }
    }

    pub fn from_config(config: &NreplConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            timeout: Duration::from_secs(config.timeout_secs),
            max_reads: config.max_reads,
            read_buffer_size: config.read_buffer_size,
        }
    }

    /// Timeout applied to each connect, write and read
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Upper bound on reads while waiting for `done`
    pub fn with_max_reads(mut self, max_reads: usize) -> Self {
        self.max_reads = max_reads.max(1);
        self
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Evaluate `code` on the server. Failures are folded into the outcome.
    pub async fn eval(&self, code: &str) -> Outcome {
        match self.try_eval(code).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(addr = %self.address(), error = %e, "nREPL request failed");
                Outcome::Failed(e)
            }
        }
    }

    async fn try_eval(&self, code: &str) -> Result<Outcome, NreplError> {
        let addr = self.address();
        debug!(addr = %addr, "Connecting to nREPL");

        let mut stream = timeout(self.timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| NreplError::TimedOut)??;

        let result = self.exchange(&mut stream, code).await;

        // The stream is dropped (and closed) after this regardless of outcome.
        if let Ok(Err(e)) = timeout(self.timeout, stream.shutdown()).await {
            trace!(error = %e, "Socket shutdown failed");
        }

        result
    }

    /// Run the clone/eval exchange over an established stream
    pub(crate) async fn exchange<S>(&self, stream: &mut S, code: &str) -> Result<Outcome, NreplError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut buf = vec![0u8; self.read_buffer_size];

        self.send(stream, &Request::clone_session()).await?;
        let n = self.read_chunk(stream, &mut buf).await?;
        let session = scan_fields(&buf[..n])
            .new_session
            .ok_or(NreplError::SessionNotCreated)?;
        debug!(session = %session, "Created nREPL session");

        self.send(stream, &Request::eval(code, &session)).await?;

        let mut response = Vec::new();
        let mut reads = 0;
        let mut done = false;
        while reads < self.max_reads {
            let n = self.read_chunk(stream, &mut buf).await?;
            if n == 0 {
                debug!("nREPL closed the connection");
                break;
            }
            response.extend_from_slice(&buf[..n]);
            reads += 1;

            if scan_fields(&response).is_done() {
                done = true;
                break;
            }
        }

        if !done && reads == self.max_reads {
            warn!(
                reads,
                bytes = response.len(),
                "Read limit reached before nREPL reported done"
            );
        }

        Ok(Outcome::from_fields(scan_fields(&response)))
    }

    async fn send<S>(&self, stream: &mut S, request: &Request) -> Result<(), NreplError>
    where
        S: AsyncWrite + Unpin,
    {
        let bytes = request.encode();
        trace!(request = %String::from_utf8_lossy(&bytes), "Sending to nREPL");
        timeout(self.timeout, stream.write_all(&bytes))
            .await
            .map_err(|_| NreplError::TimedOut)??;
        Ok(())
    }

    async fn read_chunk<S>(&self, stream: &mut S, buf: &mut [u8]) -> Result<usize, NreplError>
    where
        S: AsyncRead + Unpin,
    {
        let n = timeout(self.timeout, stream.read(buf))
            .await
            .map_err(|_| NreplError::TimedOut)??;
        trace!(chunk = %String::from_utf8_lossy(&buf[..n]), "Received from nREPL");
        Ok(n)
    }
}

impl Default for NreplClient {
    fn default() -> Self {
        Self::from_config(&NreplConfig::default())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-process stand-in for an nREPL server

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    pub const SESSION_RESPONSE: &[u8] = b"d11:new-session3:abc6:statusl4:doneee";

    /// Serve a single connection: answer the clone request, then reply to
    /// the eval request with `eval_response`. Returns the bound port.
    pub async fn serve_once(eval_response: Vec<u8>) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(SESSION_RESPONSE).await;
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(&eval_response).await;
            // Hold the socket until the client hangs up.
            let _ = socket.read(&mut buf).await;
        });

        port
    }
}
