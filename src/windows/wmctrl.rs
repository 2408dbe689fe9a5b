//! [`WindowLister`] implementation backed by the `wmctrl` helper.
//!
//! `wmctrl -l -x` prints one line per managed window:
//!
//! ```text
//! 0x01200003  0 hostname navigator.Firefox  Mozilla Firefox
//! ```
//!
//! The helper is run with a bounded wait.  If it does not finish in time, or
//! shutdown is requested while it runs, the child is killed rather than
//! awaited.

use crate::launch::split_command;
use crate::traits::WindowLister;
use log::debug;
use regex::Regex;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

static LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0x[0-9a-fA-F]+)\s+(-?\d+)\s+\S+\s+(\S+)\s+(.*)$").expect("valid regex")
});

/// Interval between completion checks while waiting for the helper.
const POLL_STEP: Duration = Duration::from_millis(10);

/// One window reported by the helper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalWindow {
    pub id: u64,
    pub desktop: i64,
    pub wm_class: String,
    pub title: String,
}

/// Errors from running the helper.
#[derive(Debug, thiserror::Error)]
pub enum HelperError {
    #[error("failed to start helper: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("helper did not finish within {0:?}")]
    Timeout(Duration),
    #[error("helper exited with status {0:?}")]
    Exit(Option<i32>),
    #[error("helper cancelled by shutdown")]
    Cancelled,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// `wmctrl`-backed window lister.
pub struct Wmctrl {
    program: PathBuf,
    leading_args: Vec<String>,
    timeout: Duration,
    shutdown: Arc<AtomicBool>,
}

impl Wmctrl {
    /// Create a lister running `program`.
    pub fn new(program: impl Into<PathBuf>, timeout: Duration, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            timeout,
            shutdown,
        }
    }

    /// Look the helper up on `PATH`; `None` when it is not installed.
    ///
    /// `helper` may carry a wrapper, e.g. `flatpak-spawn --host wmctrl`: the
    /// first word is the program, the rest go before the helper's flags.
    pub fn detect(helper: &str, timeout: Duration, shutdown: Arc<AtomicBool>) -> Option<Self> {
        let mut words = split_command(helper).into_iter();
        let name = words.next()?;
        let path = find_executable(&name)?;
        Some(Self::new(path, timeout, shutdown).with_leading_args(words.collect()))
    }

    /// Arguments placed before the helper's own flags, for wrappers such as
    /// `sh -c '…'`.
    pub fn with_leading_args(mut self, args: Vec<String>) -> Self {
        self.leading_args = args;
        self
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args).args(args);
        cmd
    }

    /// Run the helper and collect stdout, waiting at most `self.timeout`.
    fn run_bounded(&self, args: &[&str]) -> Result<String, HelperError> {
        let mut child = self
            .command(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(HelperError::Spawn)?;

        // Drain stdout concurrently so a chatty helper cannot fill the pipe
        // and stall before exiting.
        let reader = child.stdout.take().map(|mut stdout| {
            std::thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = stdout.read_to_end(&mut buf);
                buf
            })
        });

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if self.shutdown.load(Ordering::Relaxed) {
                let _ = child.kill();
                let _ = child.wait();
                return Err(HelperError::Cancelled);
            }
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(HelperError::Timeout(self.timeout));
            }
            std::thread::sleep(POLL_STEP);
        };

        if !status.success() {
            return Err(HelperError::Exit(status.code()));
        }
        let out = reader
            .map(|r| r.join().unwrap_or_default())
            .unwrap_or_default();
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

impl WindowLister for Wmctrl {
    type Error = HelperError;

    fn list_windows(&self) -> Result<String, HelperError> {
        self.run_bounded(&["-l", "-x"])
    }

    fn activate(&self, window_id: u64) -> Result<(), HelperError> {
        let id = format!("0x{:x}", window_id);
        let mut child = self
            .command(&["-i", "-a", &id])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(HelperError::Spawn)?;
        std::thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}

/// Parse helper output.  Lines that do not have the expected shape, or
/// whose window id is zero or unparsable, are skipped.
pub fn parse_window_list(output: &str) -> Vec<ExternalWindow> {
    output
        .lines()
        .filter_map(|line| {
            let caps = LINE_RE.captures(line)?;
            let hex = &caps[1][2..];
            let id = u64::from_str_radix(hex, 16).ok().filter(|&id| id != 0);
            let Some(id) = id else {
                debug!("skipping window line with bad id: {:?}", line);
                return None;
            };
            Some(ExternalWindow {
                id,
                desktop: caps[2].parse().unwrap_or(0),
                wm_class: caps[3].to_string(),
                title: caps[4].trim().to_string(),
            })
        })
        .collect()
}

/// Locate an executable by name on `PATH`, or check an explicit path.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    if name.contains('/') {
        let path = PathBuf::from(name);
        return is_executable(&path).then_some(path);
    }
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}
