//! Subprocess execution utilities.
//!
//! A [`ProcessBuilder`] describes one invocation: the program, its argument
//! list, the working directory, and the variables layered over the inherited
//! environment. [`ProcessBuilder::exec_streaming`] runs it with standard error
//! merged into standard output and hands every output line to a sink while the
//! child is still running.

use std::ffi::OsStr;
use std::io::{self, BufRead, BufReader, PipeReader};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use indexmap::IndexMap;

use crate::builder::errors::BuildError;

/// How often the supervisor re-checks the interrupt flag while waiting for
/// output or exit.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Cancellation handle for a running invocation.
///
/// Clones share the same flag, so one clone can be handed to a signal
/// handler or watchdog thread while the build holds another.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    raised: Arc<AtomicBool>,
}

impl Interrupt {
    /// Create a new, lowered interrupt.
    pub fn new() -> Self {
        Interrupt::default()
    }

    /// Ask the running invocation to stop.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    /// Whether the interrupt has been raised.
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}

/// Outcome of a completed invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvocationResult {
    /// Exit status. `-1` when the child was terminated by a signal.
    pub status: i32,
}

impl InvocationResult {
    pub fn new(status: i32) -> Self {
        InvocationResult { status }
    }

    /// Whether the child exited with status zero.
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: IndexMap<String, String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: IndexMap::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.env
            .insert(key.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    /// Set several environment variables.
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            self = self.env(key, value);
        }
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get the variables set on top of the inherited environment.
    pub fn get_envs(&self) -> &IndexMap<String, String> {
        &self.env
    }

    /// Get the working directory, if one was set.
    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Build the Command.
    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Run the process, forwarding each line of its merged stdout/stderr to
    /// `sink` in the order written, then wait for it to exit.
    ///
    /// A non-zero exit is reported through [`InvocationResult::success`], not
    /// as an error. Output is read on a helper thread; the calling thread runs
    /// `sink` and checks the interrupt at least every poll interval, so a
    /// silent child can still be cancelled.
    pub fn exec_streaming(
        &self,
        sink: &mut dyn FnMut(&str),
        interrupt: &Interrupt,
    ) -> Result<InvocationResult, BuildError> {
        let (reader, writer) = io::pipe().map_err(|source| self.io_error(source))?;
        let writer_err = writer
            .try_clone()
            .map_err(|source| self.io_error(source))?;

        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(writer);
        cmd.stderr(writer_err);

        let spawned = cmd.spawn();
        // The command still owns our copies of the write end; the reader only
        // sees end-of-stream once they are closed.
        drop(cmd);

        let mut child = spawned.map_err(|source| BuildError::ProcessSpawn {
            program: self.display_program(),
            source,
        })?;

        let (tx, rx) = mpsc::channel();
        let reader_handle = thread::spawn(move || read_lines(reader, tx));

        loop {
            if interrupt.is_raised() {
                // A detached grandchild may keep the pipe open, so the reader
                // is left to finish on its own.
                drop(reader_handle);
                return Err(self.interrupted(&mut child));
            }

            match rx.recv_timeout(WAIT_POLL_INTERVAL) {
                Ok(Ok(line)) => sink(&String::from_utf8_lossy(&line)),
                Ok(Err(source)) => {
                    kill_and_reap(&mut child);
                    let _ = reader_handle.join();
                    return Err(self.io_error(source));
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        let _ = reader_handle.join();

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(source) => {
                    kill_and_reap(&mut child);
                    return Err(self.io_error(source));
                }
            }

            if interrupt.is_raised() {
                return Err(self.interrupted(&mut child));
            }

            thread::sleep(WAIT_POLL_INTERVAL);
        };

        Ok(InvocationResult::new(status.code().unwrap_or(-1)))
    }

    /// Display the command for log and error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.display_program()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }

    fn display_program(&self) -> String {
        self.program.display().to_string()
    }

    fn io_error(&self, source: io::Error) -> BuildError {
        BuildError::Io {
            program: self.display_program(),
            source,
        }
    }

    fn interrupted(&self, child: &mut Child) -> BuildError {
        tracing::debug!("interrupt raised, killing `{}`", self.display_program());
        kill_and_reap(child);
        BuildError::ProcessInterrupted {
            program: self.display_program(),
        }
    }
}

/// Send each line read from `reader`, without its line ending, until
/// end-of-stream, a read failure, or a dropped receiver.
fn read_lines(reader: PipeReader, tx: Sender<io::Result<Vec<u8>>>) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                if tx.send(Ok(trim_line_ending(&buf).to_vec())).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                let _ = tx.send(Err(e));
                break;
            }
        }
    }
}

fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Find CMake.
pub fn find_cmake() -> Option<PathBuf> {
    find_executable("cmake")
}
