use std::ffi::OsString;
use std::io::Read;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Result, ShrinkError};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// How long stderr may stay open after the engine exits (a grandchild can hold it).
const STDERR_GRACE: Duration = Duration::from_millis(500);

/// Result of executing a command: exit status + captured stderr + timing.
pub struct RunResult {
    pub status: ExitStatus,
    pub stderr: String,
    pub elapsed_ms: u128,
}

impl RunResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// `exit N`, or `killed by signal` when the process had no exit code.
    pub fn describe_status(&self) -> String {
        match self.status.code() {
            Some(code) => format!("exit {code}"),
            None => "killed by signal".into(),
        }
    }
}

/// Spawn a process, discard stdout, capture stderr, wait at most `timeout`.
///
/// On timeout the child is killed and reaped before `EngineTimeout` is returned.
/// Once the child has exited, stderr is collected for at most `STDERR_GRACE`.
pub fn exec(program: &Path, args: &[OsString], timeout: Option<Duration>) -> Result<RunResult> {
    let start = Instant::now();

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ShrinkError::io(format!("failed to run `{}`", program.display()), e))?;

    // Drain stderr off-thread so a chatty engine can't fill the pipe and stall.
    let drain = child.stderr.take().map(|mut pipe| {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut chunk = [0u8; 4096];
            while let Ok(n) = pipe.read(&mut chunk) {
                if n == 0 || tx.send(chunk[..n].to_vec()).is_err() {
                    break;
                }
            }
        });
        rx
    });

    let status = loop {
        let polled = child
            .try_wait()
            .map_err(|e| ShrinkError::io("failed to wait on engine", e))?;
        if let Some(status) = polled {
            break status;
        }
        if let Some(limit) = timeout
            && start.elapsed() >= limit
        {
            let _ = child.kill();
            let _ = child.wait();
            log::debug!("killed `{}` after {:?}", program.display(), limit);
            return Err(ShrinkError::EngineTimeout { limit });
        }
        thread::sleep(POLL_INTERVAL);
    };

    let stderr = drain.map(collect_stderr).unwrap_or_default();

    Ok(RunResult {
        status,
        stderr,
        elapsed_ms: start.elapsed().as_millis(),
    })
}

fn collect_stderr(rx: Receiver<Vec<u8>>) -> String {
    let deadline = Instant::now() + STDERR_GRACE;
    let mut buf = Vec::new();
    loop {
        let left = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(left) {
            Ok(chunk) => buf.extend_from_slice(&chunk),
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                log::debug!("stderr still open after engine exit, not waiting further");
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}
