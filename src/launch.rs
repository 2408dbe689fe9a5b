//! Starting applications from desktop-entry exec lines.
//!
//! Exec lines are cleaned of field codes, split into argv with double-quote
//! handling, and spawned detached in their own process group.  If the direct
//! spawn fails the cleaned line is handed to `/bin/sh -c` instead.

use crate::traits::ProcessControl;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use std::sync::LazyLock;

/// App id of the built-in file manager.
pub const FILE_MANAGER_ID: &str = "fileManager";
/// Icon source of the built-in file manager.
pub const FILE_MANAGER_ICON: &str = "builtin:folder";

static FIELD_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"%[a-zA-Z]").expect("valid regex"));

/// What activating a launcher row does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LaunchAction {
    /// Open the shell's built-in file manager.
    FileManager,
    /// Run the row's exec line.
    Exec,
}

/// Errors from starting or signalling a process.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("nothing to launch")]
    Empty,
    #[error("failed to start {command:?}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid pid {0}")]
    InvalidPid(u32),
    #[error("failed to signal pid {pid}: {source}")]
    Signal {
        pid: u32,
        #[source]
        source: nix::errno::Errno,
    },
}

/// Strip desktop-entry field codes: `%%` becomes `%`, `%f`, `%U` and the
/// like are removed, and whitespace runs collapse to one space.
pub fn sanitize_exec(exec: &str) -> String {
    let unescaped = exec.trim().replace("%%", "%");
    let stripped = FIELD_CODE.replace_all(&unescaped, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a command line into arguments.
///
/// Whitespace separates arguments outside double quotes.  Inside quotes, a
/// tripled quote (`"""`) or a backslash-escaped quote yields a literal `"`.
pub fn split_command(line: &str) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_quotes = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' if in_quotes && chars.get(i + 1) == Some(&'"') && chars.get(i + 2) == Some(&'"') => {
                current.push('"');
                i += 3;
                continue;
            }
            '\\' if in_quotes && matches!(chars.get(i + 1), Some('"') | Some('\\')) => {
                current.push(chars[i + 1]);
                i += 2;
                continue;
            }
            '"' => {
                in_quotes = !in_quotes;
                in_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
        i += 1;
    }
    if in_token {
        args.push(current);
    }
    args
}

/// Spawn `program` detached: null stdio, its own process group, and a
/// background thread that reaps it.  Returns the child's pid.
fn spawn_reaped(program: &str, args: &[String]) -> std::io::Result<u32> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .process_group(0)
        .spawn()?;
    let pid = child.id();
    std::thread::spawn(move || {
        let _ = child.wait();
    });
    Ok(pid)
}

/// Run a shell command line detached.
fn spawn_shell(line: &str) -> Result<u32, LaunchError> {
    spawn_reaped("/bin/sh", &["-c".to_string(), line.to_string()]).map_err(|source| LaunchError::Spawn {
        command: line.to_string(),
        source,
    })
}

/// Launch a desktop-entry exec line and return the pid of the started
/// process.
pub fn spawn_detached(exec: &str) -> Result<u32, LaunchError> {
    let cleaned = sanitize_exec(exec);
    if cleaned.is_empty() {
        return Err(LaunchError::Empty);
    }
    let argv = split_command(&cleaned);
    if let Some((program, args)) = argv.split_first() {
        match spawn_reaped(program, args) {
            Ok(pid) => {
                info!("launched {:?} (pid {})", cleaned, pid);
                return Ok(pid);
            }
            Err(e) => debug!("direct spawn of {:?} failed ({}), retrying through sh", program, e),
        }
    }
    let pid = spawn_shell(&cleaned)?;
    info!("launched {:?} through sh (pid {})", cleaned, pid);
    Ok(pid)
}

/// Real process control: detached spawning and `SIGTERM`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcesses;

impl ProcessControl for SystemProcesses {
    type Error = LaunchError;

    fn launch(&self, exec: &str) -> Result<u32, LaunchError> {
        spawn_detached(exec)
    }

    fn terminate(&self, pid: u32) -> Result<(), LaunchError> {
        let raw = i32::try_from(pid).map_err(|_| LaunchError::InvalidPid(pid))?;
        if raw <= 0 {
            return Err(LaunchError::InvalidPid(pid));
        }
        kill(Pid::from_raw(raw), Signal::SIGTERM).map_err(|source| LaunchError::Signal { pid, source })?;
        debug!("sent SIGTERM to {}", pid);
        Ok(())
    }
}

/// Session-level actions offered by the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionAction {
    Lock,
    Suspend,
    PowerOff,
}

impl SessionAction {
    /// Shell chain that tries the available tools in turn.
    pub fn command(self) -> &'static str {
        match self {
            SessionAction::Lock => {
                "loginctl lock-session || loginctl lock-sessions || dm-tool lock || xdg-screensaver lock"
            }
            SessionAction::Suspend => "systemctl suspend || loginctl suspend",
            SessionAction::PowerOff => "systemctl poweroff || loginctl poweroff",
        }
    }

    /// Start the action detached.
    pub fn run(self) -> Result<u32, LaunchError> {
        info!("session action {:?}", self);
        spawn_shell(self.command())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_removes_field_codes() {
        assert_eq!(sanitize_exec("  gimp-2.10 %U  "), "gimp-2.10");
        assert_eq!(sanitize_exec("app --name=%c -f %F --x"), "app --name= -f --x");
        assert_eq!(sanitize_exec("echo 100%%"), "echo 100%");
        assert_eq!(sanitize_exec("   "), "");
    }

    #[test]
    fn split_honours_quotes() {
        assert_eq!(split_command("a b  c"), vec!["a", "b", "c"]);
        assert_eq!(split_command("\"/opt/My App/run\" --flag"), vec!["/opt/My App/run", "--flag"]);
        assert_eq!(split_command("say \"he said \"\"\"hi\"\"\"\""), vec!["say", "he said \"hi\""]);
        assert_eq!(split_command("x \"\""), vec!["x", ""]);
        assert_eq!(split_command("echo \"a \\\"b\\\"\""), vec!["echo", "a \"b\""]);
        assert!(split_command("   ").is_empty());
    }

    #[test]
    fn empty_exec_is_rejected() {
        assert!(matches!(spawn_detached("  %U "), Err(LaunchError::Empty)));
    }

    #[test]
    fn launch_returns_pid() {
        let pid = spawn_detached("true %f").unwrap();
        assert!(pid > 0);
    }

    #[test]
    fn missing_program_falls_back_to_shell() {
        // The shell itself starts; it is the shell that later fails to find
        // the program.
        assert!(spawn_detached("/nonexistent/shelldock-test-program --x").is_ok());
    }

    #[test]
    fn terminate_signals_process() {
        let pid = spawn_detached("sleep 5").unwrap();
        SystemProcesses.terminate(pid).unwrap();
        assert!(matches!(SystemProcesses.terminate(0), Err(LaunchError::InvalidPid(0))));
        assert!(matches!(SystemProcesses.terminate(u32::MAX), Err(LaunchError::InvalidPid(_))));
    }

    #[test]
    fn launch_action_wire_names() {
        assert_eq!(serde_json::to_string(&LaunchAction::FileManager).unwrap(), "\"fileManager\"");
        let a: LaunchAction = serde_json::from_str("\"exec\"").unwrap();
        assert_eq!(a, LaunchAction::Exec);
        let s: SessionAction = serde_json::from_str("\"power_off\"").unwrap();
        assert_eq!(s, SessionAction::PowerOff);
    }
}
