//! The owner of every core component.
//!
//! [`Shell`] lives on one thread and serializes all mutation: control
//! commands, settings values and the running-apps poll tick all arrive on
//! the same [`Input`] channel and are handled one at a time by
//! [`run_loop`].

use crate::command::{DockCommand, Request, Response};
use crate::config::Config;
use crate::desktop::DesktopIndex;
use crate::registry::DockRegistry;
use crate::settings::consumers::{default_consumers, SettingConsumer};
use crate::settings::{SettingEvent, SettingsClient};
use crate::surface::Surfaces;
use crate::traits::{ProcessControl, ShellEvent, WindowLister};
use crate::windows::arena::WindowTable;
use crate::windows::snapshot::RunningApps;
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// Everything the owner thread reacts to.
#[derive(Debug)]
pub enum Input {
    Request(Request),
    Setting(SettingEvent),
}

/// Core state of the shell.
///
/// Generic over the process backend and the external window helper; the
/// local window table is always the in-process [`WindowTable`].
pub struct Shell<P: ProcessControl, X: WindowLister> {
    windows: WindowTable,
    registry: DockRegistry<WindowTable, P>,
    running: RunningApps<WindowTable, X>,
    surfaces: Surfaces,
    consumers: Vec<Box<dyn SettingConsumer>>,
    settings: SettingsClient,
    events: mpsc::Sender<ShellEvent>,
    poll_interval: Duration,
}

impl<P: ProcessControl, X: WindowLister> Shell<P, X> {
    /// Build every component and scan installed applications.
    ///
    /// Nothing is sent to the presentation layer until [`start`](Self::start).
    pub fn new(
        config: &Config,
        processes: P,
        lister: Option<X>,
        settings: SettingsClient,
        events: mpsc::Sender<ShellEvent>,
    ) -> Self {
        let dirs = config.desktop.dirs();
        let windows = WindowTable::with_requests(events.clone());

        let mut registry = DockRegistry::new(windows.clone(), processes, settings.clone());
        registry.set_events(events.clone());

        let mut index = DesktopIndex::new(dirs.clone());
        index.rebuild();
        info!("indexed {} application key(s)", index.len());
        let mut running = RunningApps::new(windows.clone(), lister, index, config.running_apps.clone());
        running.set_events(events.clone());

        Self {
            windows,
            registry,
            running,
            surfaces: Surfaces::new(events.clone()),
            consumers: default_consumers(dirs),
            settings,
            events,
            poll_interval: config.running_apps.poll_interval(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Show the initial surfaces, request every mirrored setting and take
    /// the first snapshot.
    pub fn start(&mut self) {
        self.surfaces.start();
        for consumer in &self.consumers {
            self.settings.fetch(consumer.key(), consumer.fallback());
        }
        self.running.refresh();
    }

    /// Run one poll of the running-apps snapshot.
    pub fn tick(&mut self) -> bool {
        self.running.refresh()
    }

    /// Apply a settings value to whichever component follows its key.
    pub fn handle_setting(&mut self, event: SettingEvent) {
        if self.registry.handle_setting(&event) {
            return;
        }
        let Some(consumer) = self.consumers.iter_mut().find(|c| c.key() == event.key()) else {
            debug!("no consumer for setting {}", event.key());
            return;
        };
        if let Some(shell_event) = consumer.apply(event.value()) {
            let _ = self.events.send(shell_event);
        }
    }

    /// Execute one control command.
    pub fn handle(&mut self, command: DockCommand) -> Response {
        match command {
            DockCommand::RegisterLaunchedApp { app, pid } => {
                self.registry.register_launched_app(app, pid);
                Response::Ok
            }
            DockCommand::RegisterWindow { app, window } => {
                self.registry.register_window(app, window);
                Response::Ok
            }
            DockCommand::UnregisterApp { app_id } => {
                self.registry.unregister_app(&app_id);
                Response::Ok
            }
            DockCommand::WindowOpened { title, visible } => Response::Window {
                window: self.windows.open(&title, visible),
            },
            DockCommand::WindowUpdated { window, title, visible } => match self.windows.update(window, &title, visible) {
                Ok(()) => Response::Ok,
                Err(e) => Response::error(e.to_string()),
            },
            DockCommand::WindowClosed { window } => {
                self.windows.destroy(window);
                self.registry.window_destroyed(window);
                Response::Ok
            }
            DockCommand::Activate { app_id } => outcome(self.registry.activate_app(&app_id)),
            DockCommand::ActivatePinned { app_id } => outcome(self.registry.activate_pinned(&app_id)),
            DockCommand::Close { app_id } => outcome(self.registry.close_app(&app_id)),
            DockCommand::Pin { app_id } => {
                self.registry.pin_app(&app_id);
                Response::Ok
            }
            DockCommand::Unpin { app_id } => {
                self.registry.unpin_app(&app_id);
                Response::Ok
            }
            DockCommand::IsPinned { app_id } => Response::Pinned {
                pinned: self.registry.is_pinned(&app_id),
            },
            DockCommand::LaunchEntry { action, app } => outcome(self.registry.launch_entry(action, app)),
            DockCommand::ActivateWindow { activation } => {
                self.running.activate(activation);
                Response::Ok
            }
            DockCommand::Session(action) => match action.run() {
                Ok(_) => Response::Ok,
                Err(e) => Response::error(e.to_string()),
            },
            DockCommand::ShowSurface(kind) => {
                self.surfaces.request_show(kind);
                Response::Ok
            }
            DockCommand::HideSurface(kind) => {
                self.surfaces.hide(kind);
                Response::Ok
            }
            DockCommand::DockApps => Response::Items {
                items: self.registry.apps().to_vec(),
            },
            DockCommand::PinnedApps => Response::Items {
                items: self.registry.pinned_apps().to_vec(),
            },
            DockCommand::RunningApps => Response::Snapshot {
                rows: self.running.rows().to_vec(),
            },
            DockCommand::RefreshRunningApps => {
                self.running.refresh();
                Response::Ok
            }
            DockCommand::RebuildIndex => {
                self.running.rebuild_index();
                info!("rebuilt application index: {} key(s)", self.running.index().len());
                Response::Ok
            }
            DockCommand::Shutdown => Response::Ok,
        }
    }
}

fn outcome<E: std::error::Error>(result: Result<(), E>) -> Response {
    match result {
        Ok(()) => Response::Ok,
        Err(e) => {
            error!("command failed: {}", e);
            Response::error(e.to_string())
        }
    }
}

/// Drive `shell` until a `Shutdown` command arrives, `shutdown` is set, or
/// every input sender is gone.
///
/// The poll tick runs whenever `poll_interval` has elapsed, whether or not
/// other input is arriving.
pub fn run_loop<P: ProcessControl, X: WindowLister>(
    mut shell: Shell<P, X>,
    inputs: mpsc::Receiver<Input>,
    shutdown: &AtomicBool,
) {
    let interval = shell.poll_interval();
    let mut next_tick = Instant::now() + interval;

    while !shutdown.load(Ordering::Relaxed) {
        let now = Instant::now();
        if now >= next_tick {
            shell.tick();
            // A tick may outlast the interval; input is served before the next one.
            next_tick = Instant::now() + interval;
            continue;
        }
        match inputs.recv_timeout(next_tick - now) {
            Ok(Input::Request(request)) => {
                let stop = request.command == DockCommand::Shutdown;
                request.respond(shell.handle(request.command.clone()));
                if stop {
                    info!("shutdown requested");
                    shutdown.store(true, Ordering::Relaxed);
                }
            }
            Ok(Input::Setting(event)) => shell.handle_setting(event),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                warn!("all inputs closed");
                break;
            }
        }
    }
    info!("shell loop finished");
}
