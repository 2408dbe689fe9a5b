//! **shelldock**: the window-identity and dock-state core of a desktop shell.
//!
//! The daemon discovers running top-level windows, matches each one to an
//! installed application descriptor, keeps a registry of running and pinned
//! dock entries with change-notified list semantics, and mirrors a handful
//! of values from a remote settings authority that may be slow or absent.
//!
//! # Architecture
//!
//! The crate is organised around the traits in [`traits`]:
//!
//! * [`traits::WindowControl`] / [`traits::LocalWindows`] abstract the
//!   shell's own windows, which the presentation layer owns.
//! * [`traits::WindowLister`] abstracts the external helper that lists other
//!   clients' windows.
//! * [`traits::ProcessControl`] abstracts launching and terminating
//!   applications.
//! * [`traits::SettingsTransport`] abstracts the wire to the settings
//!   authority.
//! * [`traits::CommandSource`] abstracts the transport that delivers control
//!   commands.
//!
//! Concrete implementations live in [`windows`] (window table, `wmctrl`),
//! [`launch`] (detached processes), [`settings`] (D-Bus and in-memory) and
//! [`ipc`] (Unix-socket command listener).  [`shell`] owns all of them on one
//! thread.

pub mod command;
pub mod config;
pub mod desktop;
pub mod ipc;
pub mod launch;
pub mod matcher;
pub mod pinned;
pub mod registry;
pub mod settings;
pub mod shell;
pub mod surface;
pub mod traits;
pub mod windows;
