//! IPC listener that accepts commands over a Unix socket.
//!
//! The presentation layer and scripts connect to the socket, send
//! newline-delimited JSON commands and read one JSON response per command.

pub mod listener;

use std::path::PathBuf;

/// `$XDG_RUNTIME_DIR/shelldock.sock`, or `/tmp/shelldock.sock` without a
/// runtime directory.
pub fn default_socket_path() -> PathBuf {
    dirs::runtime_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("shelldock.sock")
}
