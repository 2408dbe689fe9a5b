//! The shell's top-level surfaces.
//!
//! The panel, launcher and wallpaper are drawn by the presentation layer.
//! The core decides when each is shown and sends the request as a
//! [`ShellEvent::Surface`].

use crate::traits::ShellEvent;
use log::debug;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::mpsc;

/// One of the shell's surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    Panel,
    Launcher,
    Wallpaper,
}

impl SurfaceKind {
    const ALL: [SurfaceKind; 3] = [SurfaceKind::Panel, SurfaceKind::Launcher, SurfaceKind::Wallpaper];

    fn index(self) -> usize {
        match self {
            SurfaceKind::Panel => 0,
            SurfaceKind::Launcher => 1,
            SurfaceKind::Wallpaper => 2,
        }
    }

    /// The action that maps this surface.
    fn show_action(self) -> SurfaceAction {
        match self {
            SurfaceKind::Wallpaper => SurfaceAction::ShowFullScreen,
            _ => SurfaceAction::Show,
        }
    }
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceKind::Panel => write!(f, "panel"),
            SurfaceKind::Launcher => write!(f, "launcher"),
            SurfaceKind::Wallpaper => write!(f, "wallpaper"),
        }
    }
}

/// Parse a surface name (case-insensitive, surrounding whitespace ignored).
fn parse_surface(s: &str) -> Option<SurfaceKind> {
    let normalized = s.trim().to_lowercase();
    SurfaceKind::ALL.into_iter().find(|k| k.to_string() == normalized)
}

impl<'de> Deserialize<'de> for SurfaceKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_surface(&s).ok_or_else(|| DeError::custom(format!("invalid surface: {:?}", s)))
    }
}

/// What the presentation layer is asked to do with a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceAction {
    Show,
    ShowFullScreen,
    Raise,
    Activate,
    Hide,
}

/// Visibility of the shell surfaces.
#[derive(Debug, Default)]
pub struct Surfaces {
    visible: [bool; 3],
    events: Option<mpsc::Sender<ShellEvent>>,
}

impl Surfaces {
    pub fn new(events: mpsc::Sender<ShellEvent>) -> Self {
        Self {
            visible: [false; 3],
            events: Some(events),
        }
    }

    fn send(&self, kind: SurfaceKind, action: SurfaceAction) {
        if let Some(tx) = &self.events {
            let _ = tx.send(ShellEvent::Surface { kind, action });
        }
    }

    pub fn is_visible(&self, kind: SurfaceKind) -> bool {
        self.visible[kind.index()]
    }

    /// Map the surface and bring it to the front.
    pub fn show(&mut self, kind: SurfaceKind) {
        debug!("show {}", kind);
        self.visible[kind.index()] = true;
        self.send(kind, kind.show_action());
        self.send(kind, SurfaceAction::Raise);
        self.send(kind, SurfaceAction::Activate);
    }

    pub fn hide(&mut self, kind: SurfaceKind) {
        debug!("hide {}", kind);
        self.visible[kind.index()] = false;
        self.send(kind, SurfaceAction::Hide);
    }

    /// A surface asking to be shown, e.g. the panel opening the launcher.
    pub fn request_show(&mut self, kind: SurfaceKind) {
        self.show(kind);
    }

    /// Initial layout: wallpaper at the bottom, the panel above it.
    pub fn start(&mut self) {
        self.show(SurfaceKind::Wallpaper);
        self.show(SurfaceKind::Panel);
        self.send(SurfaceKind::Panel, SurfaceAction::Raise);
    }
}
