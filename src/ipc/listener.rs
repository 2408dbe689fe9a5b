//! Unix-socket [`CommandSource`] implementation.
//!
//! Binds a Unix stream socket and accepts one connection at a time.
//! Each line received is parsed as a JSON-encoded [`DockCommand`] and
//! answered with exactly one JSON-encoded [`Response`] line.
//!
//! # Wire format
//!
//! ```json
//! > {"RegisterLaunchedApp":{"app":{"app_id":"org.example.editor"},"pid":4242}}
//! < "Ok"
//! > {"IsPinned":{"app_id":"org.example.editor"}}
//! < {"Pinned":{"pinned":false}}
//! > not json
//! < {"Error":{"message":"bad command: expected ident at line 1 column 2"}}
//! ```

use crate::command::{DockCommand, Request, Response};
use crate::traits::CommandSource;
use log::{debug, error, info};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

/// How long a connection waits for the owner thread to answer.
const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// A [`CommandSource`] that listens on a Unix stream socket for
/// JSON-encoded commands.
///
/// Each accepted connection can send multiple newline-delimited JSON
/// commands.  When the connection closes, the listener waits for the
/// next one.
pub struct UnixSocketListener {
    path: PathBuf,
}

/// Errors produced by the Unix socket listener.
#[derive(Debug, thiserror::Error)]
pub enum SocketError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Outcome of serving one connection.
enum Served {
    Disconnected,
    SinkClosed,
}

impl UnixSocketListener {
    /// Create a new listener bound to `path`.
    ///
    /// The socket file is created when [`run`](CommandSource::run) is called.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The filesystem path of the socket.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn serve(&self, stream: UnixStream, sink: &mpsc::Sender<Request>) -> Result<Served, SocketError> {
        let mut writer = stream.try_clone()?;
        let reader = BufReader::new(stream);
        for line in reader.lines() {
            let text = line?;
            if text.trim().is_empty() {
                continue;
            }
            let response = match serde_json::from_str::<DockCommand>(&text) {
                Ok(command) => {
                    debug!("received {:?}", command);
                    let (tx, rx) = mpsc::channel();
                    if sink.send(Request { command, reply: Some(tx) }).is_err() {
                        return Ok(Served::SinkClosed);
                    }
                    rx.recv_timeout(REPLY_TIMEOUT)
                        .unwrap_or_else(|_| Response::error("no reply from shell"))
                }
                Err(e) => {
                    error!("bad command: {} - {}", text, e);
                    Response::error(format!("bad command: {}", e))
                }
            };
            let mut out = serde_json::to_string(&response)?;
            out.push('\n');
            writer.write_all(out.as_bytes())?;
        }
        Ok(Served::Disconnected)
    }
}

impl CommandSource for UnixSocketListener {
    type Error = SocketError;

    /// Bind the socket and start accepting connections.
    ///
    /// This method **blocks** until the sink is closed.  Run it on a
    /// dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Request>) -> Result<(), Self::Error> {
        // Remove stale socket if present.
        let _ = std::fs::remove_file(&self.path);

        let listener = UnixListener::bind(&self.path)?;
        info!("listening on {}", self.path.display());

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    debug!("client connected");
                    match self.serve(stream, &sink) {
                        Ok(Served::SinkClosed) => {
                            info!("sink closed, shutting down");
                            break;
                        }
                        Ok(Served::Disconnected) => debug!("client disconnected"),
                        Err(e) => error!("connection error: {}", e),
                    }
                }
                Err(e) => {
                    error!("accept error: {}", e);
                }
            }
        }
        let _ = std::fs::remove_file(&self.path);
        Ok(())
    }
}

//  Tests
