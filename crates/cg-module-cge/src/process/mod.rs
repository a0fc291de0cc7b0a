//! CGE parsers that run as external processes.
//!
//! [`ProcessParser`] spawns the parser executable, writes the document to
//! its stdin, reads a single JSON [`ParserOutput`] from its stdout and
//! enforces a timeout while waiting for it to exit. Standard error is drained
//! into the debug log.

use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::SchemaError;
use crate::parser::{CgeParser, ParseOptions, ParserOutput};

/// Tracing target for parser process operations.
const PROCESS_TARGET: &str = "cg_module_cge::process";

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A parser implemented by an external executable.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
///
/// use cg_module_cge::{CgeParser, ParseOptions, ProcessParser};
///
/// let parser = ProcessParser::new("/usr/local/bin/cge-parser-0.5.0", Duration::from_secs(30));
/// let output = parser.parse("name chess\ncge v0.5\n", ParseOptions::default());
/// ```
#[derive(Debug, Clone)]
pub struct ProcessParser {
    executable: PathBuf,
    timeout: Duration,
}

impl ProcessParser {
    /// Creates a parser backed by `executable`.
    #[must_use]
    pub fn new(executable: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            executable: executable.into(),
            timeout,
        }
    }

    /// Returns the parser executable.
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Returns the time allowed for one parse.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    fn io_error(&self, source: std::io::Error) -> SchemaError {
        SchemaError::ParserIo {
            executable: self.executable.clone(),
            source: Arc::new(source),
        }
    }

    fn spawn(&self, options: ParseOptions) -> Result<Child, SchemaError> {
        let mut command = Command::new(&self.executable);
        if options.include_comments() {
            command.arg("--comments");
        }
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(
            target: PROCESS_TARGET,
            executable = %self.executable.display(),
            include_comments = options.include_comments(),
            "spawning CGE parser"
        );
        command.spawn().map_err(|source| SchemaError::ParserSpawn {
            executable: self.executable.clone(),
            source: Arc::new(source),
        })
    }

    fn parse_output(&self, output: &str) -> Result<ParserOutput, SchemaError> {
        let trimmed = output.trim();
        if trimmed.is_empty() {
            return Err(SchemaError::ParserOutput {
                executable: self.executable.clone(),
                message: String::from("parser produced no output on stdout"),
            });
        }
        serde_json::from_str(trimmed).map_err(|error| SchemaError::ParserOutput {
            executable: self.executable.clone(),
            message: error.to_string(),
        })
    }

    fn wait_for_exit(&self, child: &mut Child, start: Instant) -> Result<(), SchemaError> {
        loop {
            match child.try_wait().map_err(|error| self.io_error(error))? {
                Some(status) => {
                    debug!(target: PROCESS_TARGET, ?status, "CGE parser exited");
                    if status.success() {
                        return Ok(());
                    }
                    return Err(SchemaError::ParserExit {
                        executable: self.executable.clone(),
                        status: status.code().unwrap_or(-1),
                    });
                }
                None if start.elapsed() > self.timeout => {
                    warn!(
                        target: PROCESS_TARGET,
                        executable = %self.executable.display(),
                        timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                        "CGE parser timed out, killing process"
                    );
                    drop(child.kill());
                    drop(child.wait());
                    return Err(SchemaError::ParserTimeout {
                        executable: self.executable.clone(),
                        timeout: self.timeout,
                    });
                }
                None => thread::sleep(POLL_INTERVAL),
            }
        }
    }
}

impl CgeParser for ProcessParser {
    fn parse(&self, document: &str, options: ParseOptions) -> Result<ParserOutput, SchemaError> {
        let start = Instant::now();
        let mut child = self.spawn(options)?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Pipes are serviced concurrently with the timeout wait.
        let stdout_reader = stdout.map(|pipe| thread::spawn(move || read_all(pipe)));
        let stderr_reader = stderr.map(|pipe| thread::spawn(move || read_all(pipe)));
        if let Some(pipe) = stdin {
            let payload = document.to_owned();
            thread::spawn(move || write_document(pipe, &payload));
        }

        self.wait_for_exit(&mut child, start)?;

        if let Some(text) = stderr_reader.and_then(|handle| handle.join().ok()) {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                debug!(target: PROCESS_TARGET, stderr = %trimmed, "CGE parser stderr output");
            }
        }
        let output = stdout_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();
        self.parse_output(&output)
    }
}

fn write_document(mut pipe: impl Write, document: &str) {
    let written = pipe
        .write_all(document.as_bytes())
        .and_then(|()| pipe.flush());
    if let Err(error) = written {
        debug!(target: PROCESS_TARGET, %error, "CGE parser closed stdin early");
    }
}

fn read_all(pipe: impl Read) -> String {
    let mut buffer = String::new();
    if let Err(error) = BufReader::new(pipe).read_to_string(&mut buffer) {
        debug!(target: PROCESS_TARGET, %error, "failed to read CGE parser output");
    }
    buffer
}

#[cfg(all(test, unix))]
mod tests;
