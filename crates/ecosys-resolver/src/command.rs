//! Command execution with a hard timeout.
//!
//! The resolver only talks to `CommandRunner`, so tests can swap in canned
//! success / failure / timeout outcomes without spawning anything.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Poll interval while waiting for a child to exit.
pub const POLL_INTERVAL_MS: u64 = 20;

/// Result of running one external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The process exited on its own. `code` is `None` when killed by a signal.
    Completed {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    /// The deadline passed; the process was killed and reaped.
    TimedOut,
    /// The process could not be started (e.g. not on PATH).
    SpawnFailed(String),
}

impl CommandOutcome {
    /// Stdout of a zero-exit run, otherwise `None`.
    pub fn success_stdout(&self) -> Option<&str> {
        match self {
            CommandOutcome::Completed {
                code: Some(0),
                stdout,
                ..
            } => Some(stdout),
            _ => None,
        }
    }

    /// One-line description for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            CommandOutcome::Completed { code, stderr, .. } => {
                let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                let stderr = stderr.trim();
                if stderr.is_empty() {
                    format!("exit {}", code)
                } else {
                    format!("exit {}: {}", code, stderr.lines().next().unwrap_or_default())
                }
            }
            CommandOutcome::TimedOut => "timed out".to_string(),
            CommandOutcome::SpawnFailed(reason) => format!("spawn failed: {}", reason),
        }
    }
}

/// Runs an external program with a timeout.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[String], timeout: Duration) -> CommandOutcome;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, program: &str, args: &[String], timeout: Duration) -> CommandOutcome {
        (**self).run(program, args, timeout)
    }
}

/// Spawns real processes via `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[String], timeout: Duration) -> CommandOutcome {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        // Own process group, so a timeout also reaches wrapper-spawned children.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        let spawned = cmd.spawn();
        match spawned {
            Ok(mut child) => wait_with_timeout(&mut child, timeout),
            Err(e) => CommandOutcome::SpawnFailed(e.to_string()),
        }
    }
}

/// Wait for `child`, killing it once `timeout` elapses.
///
/// Stdout and stderr are drained on background threads while the child runs;
/// otherwise a child filling the pipe buffer would block and never exit.
/// On timeout the reader threads are detached rather than joined: a surviving
/// grandchild may still hold the pipes open.
pub fn wait_with_timeout(child: &mut Child, timeout: Duration) -> CommandOutcome {
    let start = Instant::now();
    let interval = Duration::from_millis(POLL_INTERVAL_MS);

    let stdout_handle = child.stdout.take().map(|mut out| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = out.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    });
    let stderr_handle = child.stderr.take().map(|mut err| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = err.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    });

    let join = |h: Option<thread::JoinHandle<String>>| {
        h.map(|h| h.join().unwrap_or_default()).unwrap_or_default()
    };

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                return completed(status, join(stdout_handle), join(stderr_handle));
            }
            Ok(None) => {}
            Err(e) => {
                kill_tree(child);
                return CommandOutcome::SpawnFailed(format!("wait failed: {}", e));
            }
        }

        if start.elapsed() >= timeout {
            kill_tree(child);
            return CommandOutcome::TimedOut;
        }

        thread::sleep(interval);
    }
}

/// Kill the child's process group (the child alone elsewhere) and reap it.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;
        if let Ok(pid) = i32::try_from(child.id()) {
            let _ = killpg(Pid::from_raw(pid), Signal::SIGKILL);
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

fn completed(status: ExitStatus, stdout: String, stderr: String) -> CommandOutcome {
    CommandOutcome::Completed {
        code: status.code(),
        stdout,
        stderr,
    }
}
