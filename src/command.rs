//! Commands and responses of the control socket.
//!
//! This module defines the vocabulary shared by the presentation layer and
//! the daemon: [`DockCommand`] is every request the shell can act on and
//! [`Response`] is the single reply each request gets.
//!
//! On the wire both are externally tagged JSON.  Commands without fields
//! are bare strings:
//!
//! ```json
//! {"Pin":{"app_id":"org.example.editor"}}
//! "RunningApps"
//! {"ShowSurface":"launcher"}
//! ```

use crate::launch::{LaunchAction, SessionAction};
use crate::registry::{AppInfo, DockItem};
use crate::surface::SurfaceKind;
use crate::windows::arena::WindowId;
use crate::windows::snapshot::{ActivationKey, SnapshotRow};
use serde::{Deserialize, Serialize};
use std::sync::mpsc;

fn visible_by_default() -> bool {
    true
}

/// Every action the shell core can perform.
///
/// Commands are produced by [`CommandSource`](crate::traits::CommandSource)
/// implementations and consumed by the [`Shell`](crate::shell::Shell).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DockCommand {
    /// Record an application started outside the dock.  `pid` is `0` when
    /// unknown.
    RegisterLaunchedApp {
        app: AppInfo,
        #[serde(default)]
        pid: u32,
    },

    /// Record an application shown in one of the shell's own windows.
    RegisterWindow { app: AppInfo, window: WindowId },

    UnregisterApp { app_id: String },

    /// The presentation layer created a window.  Answered with
    /// [`Response::Window`] carrying its handle.
    WindowOpened {
        title: String,
        #[serde(default = "visible_by_default")]
        visible: bool,
    },

    WindowUpdated { window: WindowId, title: String, visible: bool },

    /// The presentation layer destroyed a window.  Entries bound to it are
    /// unregistered.
    WindowClosed { window: WindowId },

    /// Activate a running dock entry.
    Activate { app_id: String },

    /// Activate a pinned dock entry, launching it if it is not running.
    ActivatePinned { app_id: String },

    Close { app_id: String },

    Pin { app_id: String },

    Unpin { app_id: String },

    /// Answered with [`Response::Pinned`].
    IsPinned { app_id: String },

    /// A launcher row was activated.
    LaunchEntry { action: LaunchAction, app: AppInfo },

    /// A running-apps row was activated.
    ActivateWindow { activation: ActivationKey },

    Session(SessionAction),

    ShowSurface(SurfaceKind),

    HideSurface(SurfaceKind),

    /// Answered with [`Response::Items`] (running entries).
    DockApps,

    /// Answered with [`Response::Items`] (pinned entries).
    PinnedApps,

    /// Answered with [`Response::Snapshot`].
    RunningApps,

    /// Poll windows now instead of waiting for the next tick.
    RefreshRunningApps,

    /// Rescan installed application descriptors.
    RebuildIndex,

    /// Stop the daemon.
    Shutdown,
}

/// The reply to one [`DockCommand`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Response {
    Ok,
    Window { window: WindowId },
    Pinned { pinned: bool },
    Items { items: Vec<DockItem> },
    Snapshot { rows: Vec<SnapshotRow> },
    Error { message: String },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }
}

/// A command together with the channel its reply goes to.
///
/// `reply` is `None` for commands that arrive from somewhere that does not
/// wait for an answer.
#[derive(Debug)]
pub struct Request {
    pub command: DockCommand,
    pub reply: Option<mpsc::Sender<Response>>,
}

impl Request {
    /// A request whose reply is discarded.
    pub fn oneway(command: DockCommand) -> Self {
        Self { command, reply: None }
    }

    /// Deliver the reply, if anyone is waiting for it.
    pub fn respond(&self, response: Response) {
        if let Some(tx) = &self.reply {
            let _ = tx.send(response);
        }
    }
}
