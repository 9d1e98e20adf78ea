use crate::errors::{InsbinError, Result};
use log::debug;
use std::ffi::OsStr;
use std::io::{self, ErrorKind, Read, Write};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};

const READ_CHUNK: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessResult {
    pub exit_code: i32,
    /// Whether the child wrote anything to stdout.
    pub streamed: bool,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        ProcessRunner
    }

    /// Run `path` with `args`, relaying its stdout to ours as it arrives.
    pub fn execute<I, S>(&self, path: &Path, args: I) -> Result<ProcessResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.execute_to(path, args, &mut out)
    }

    /// Like [`execute`](Self::execute) but relays into `out`. Stderr stays
    /// inherited. Returns once stdout is exhausted and the child has exited.
    pub fn execute_to<I, S, W>(&self, path: &Path, args: I, out: &mut W) -> Result<ProcessResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
        W: Write,
    {
        debug!("running {}", path.display());
        let mut child = Command::new(path)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| InsbinError::ProcessLaunch {
                path: path.to_path_buf(),
                source,
            })?;
        let relayed = relay(&mut child, out);
        let (status, streamed) = match relayed {
            Ok(done) => done,
            Err(source) => {
                // Don't leave the child running once we stop reading from it.
                let _ = child.kill();
                let _ = child.wait();
                return Err(InsbinError::ProcessOutput {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let exit_code = exit_code(status);
        debug!("{} exited with {exit_code}", path.display());
        Ok(ProcessResult {
            exit_code,
            streamed,
        })
    }
}

/// Copy the child's stdout into `out` until it is exhausted and the child has exited.
fn relay<W: Write>(child: &mut Child, out: &mut W) -> io::Result<(ExitStatus, bool)> {
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::new(ErrorKind::BrokenPipe, "stdout not piped"))?;

    let mut buf = [0u8; READ_CHUNK];
    let mut streamed = false;
    let mut status = None;
    loop {
        let n = match stdout.read(&mut buf) {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if n > 0 {
            out.write_all(&buf[..n])?;
            out.flush()?;
            streamed = true;
        }
        if status.is_none() {
            status = child.try_wait()?;
        }
        if n == 0 {
            break;
        }
    }
    // Output is exhausted; block on the exit status instead of polling.
    let status = match status {
        Some(status) => status,
        None => child.wait()?,
    };
    Ok((status, streamed))
}

/// Signal terminations on Unix map to `128 + signal`.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}
