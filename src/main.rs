//! Entry point for the **shelldock** daemon.
//!
//! Spawns the command listener, the settings watcher and the event writer on
//! background threads and runs the [`Shell`](shelldock::shell::Shell) on the
//! main thread.  Change notifications are written to stdout, one JSON object
//! per line.
//!
//! Flags:
//!
//! * `--config <path>`: configuration file (default
//!   `$XDG_CONFIG_HOME/shelldock/config.json`).
//! * `--offline`: keep settings in memory instead of talking to D-Bus.

use log::{error, info, warn};
use shelldock::command::{DockCommand, Request};
use shelldock::config::Config;
use shelldock::ipc::default_socket_path;
use shelldock::ipc::listener::UnixSocketListener;
use shelldock::launch::SystemProcesses;
use shelldock::settings::dbus::DbusTransport;
use shelldock::settings::memory::MemoryTransport;
use shelldock::settings::SettingsClient;
use shelldock::shell::{run_loop, Input, Shell};
use shelldock::traits::{CommandSource, SettingsTransport, ShellEvent};
use shelldock::windows::wmctrl::Wmctrl;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

/// Load the config from `path`, falling back to compiled-in defaults.
fn load_config(path: Option<PathBuf>) -> Config {
    let Some(path) = path else {
        info!("no config directory, using defaults");
        return Config::default();
    };
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no usable config file ({}), using defaults", e);
            Config::default()
        }
    }
}

//  Main

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let offline = args.iter().any(|a| a == "--offline");
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| PathBuf::from(&w[1]))
        .or_else(Config::default_path);

    run_daemon(load_config(config_path), offline);
}

fn run_daemon(config: Config, offline: bool) {
    let shutdown = Arc::new(AtomicBool::new(false));

    let (event_tx, event_rx) = mpsc::channel::<ShellEvent>();
    spawn_event_writer(event_rx);

    let (input_tx, input_rx) = mpsc::channel::<Input>();
    spawn_signal_watcher(Arc::clone(&shutdown), input_tx.clone());

    let (setting_tx, setting_rx) = mpsc::channel();
    forward(setting_rx, input_tx.clone(), Input::Setting);
    let transport: Arc<dyn SettingsTransport> = if offline {
        info!("offline mode: settings are kept in memory");
        Arc::new(MemoryTransport::default())
    } else {
        Arc::new(DbusTransport::connect(&config.settings))
    };
    let settings = SettingsClient::new(transport, setting_tx);
    settings.spawn_watcher();

    let running = &config.running_apps;
    let lister = Wmctrl::detect(&running.helper, running.helper_timeout(), Arc::clone(&shutdown));
    if lister.is_none() {
        warn!("{} not found, running apps will list local windows only", running.helper);
    }

    let mut shell = Shell::new(&config, SystemProcesses, lister, settings, event_tx);

    let (cmd_tx, cmd_rx) = mpsc::channel::<Request>();
    forward(cmd_rx, input_tx, Input::Request);
    spawn_command_sources(cmd_tx);

    info!("shelldock running");
    shell.start();
    run_loop(shell, input_rx, &shutdown);
    let _ = std::fs::remove_file(default_socket_path());
    info!("exiting");
}

//  Helpers

/// Wait for SIGINT or SIGTERM on a small runtime of its own, then stop the
/// owner loop.
fn spawn_signal_watcher(shutdown: Arc<AtomicBool>, tx: mpsc::Sender<Input>) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(rt) => rt,
            Err(e) => {
                error!("failed to start signal runtime: {}", e);
                return;
            }
        };
        let received = runtime.block_on(async {
            use tokio::signal::unix::{signal, SignalKind};

            let mut interrupt = signal(SignalKind::interrupt())?;
            let mut terminate = signal(SignalKind::terminate())?;
            tokio::select! {
                _ = interrupt.recv() => {}
                _ = terminate.recv() => {}
            }
            Ok::<(), std::io::Error>(())
        });
        if let Err(e) = received {
            error!("cannot watch signals: {}", e);
            return;
        }
        info!("signal received, shutting down");
        shutdown.store(true, Ordering::SeqCst);
        let _ = tx.send(Input::Request(Request::oneway(DockCommand::Shutdown)));
    });
}

/// Move everything from `rx` into the owner's input channel.
fn forward<T: Send + 'static>(rx: mpsc::Receiver<T>, tx: mpsc::Sender<Input>, wrap: fn(T) -> Input) {
    std::thread::spawn(move || {
        for item in rx {
            if tx.send(wrap(item)).is_err() {
                break;
            }
        }
    });
}

/// Print every event as one JSON line on stdout.
fn spawn_event_writer(rx: mpsc::Receiver<ShellEvent>) {
    std::thread::spawn(move || {
        let stdout = std::io::stdout();
        for event in rx {
            let line = match serde_json::to_string(&event) {
                Ok(line) => line,
                Err(e) => {
                    error!("failed to encode event: {}", e);
                    continue;
                }
            };
            let mut out = stdout.lock();
            if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
                error!("stdout closed: {}", e);
                break;
            }
        }
    });
}

fn spawn_command_sources(tx: mpsc::Sender<Request>) {
    let path = default_socket_path();
    std::thread::spawn(move || {
        let mut source = UnixSocketListener::new(&path);
        if let Err(e) = source.run(tx.clone()) {
            error!("socket listener error: {}", e);
            let _ = tx.send(Request::oneway(DockCommand::Shutdown));
        }
    });
}
