//! Plugin process supervision.
//!
//! One invocation spawns the plugin, then runs three tasks under a single
//! deadline: a writer feeding the request to stdin, a reader collecting
//! stdout, and a drain forwarding stderr line by line. Stderr is forwarded
//! live so a chatty plugin can never block on a full pipe.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, instrument, warn};

use crate::error::GeneratorError;
use crate::generator::GeneratedFile;
use crate::plugin::protocol::{PluginRequest, PluginResponse};
use crate::plugin::sink::{DiagnosticSink, StderrSink};

/// Wall-clock limit for a plugin that sets none.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// What to run for one plugin target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginCommand {
    /// Program followed by its leading arguments.
    pub command: Vec<String>,
    /// Extra literal arguments appended after `command`.
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl PluginCommand {
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The full argv joined for display.
    pub fn display(&self) -> String {
        self.command
            .iter()
            .chain(&self.args)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Everything a finished plugin produced.
struct Finished {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: String,
    stdin: io::Result<()>,
}

/// Runs plugin processes.
#[derive(Clone)]
pub struct PluginRunner {
    sink: Arc<dyn DiagnosticSink>,
}

impl std::fmt::Debug for PluginRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRunner").finish_non_exhaustive()
    }
}

impl Default for PluginRunner {
    fn default() -> Self {
        Self::new(Arc::new(StderrSink))
    }
}

impl PluginRunner {
    /// Create a runner forwarding diagnostics to `sink`.
    pub fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { sink }
    }

    /// Run one plugin to completion and return its validated files.
    #[instrument(skip_all, fields(target_name = %target, command = %plugin.display()))]
    pub async fn run(
        &self,
        target: &str,
        plugin: &PluginCommand,
        request: &PluginRequest<'_>,
    ) -> Result<Vec<GeneratedFile>, GeneratorError> {
        let payload = request.encode()?;
        let mut child = self.spawn(plugin)?;
        debug!(pid = child.id(), request_bytes = payload.len(), "plugin spawned");

        let stdin = take_pipe(child.stdin.take(), "stdin")?;
        let stdout = take_pipe(child.stdout.take(), "stdout")?;
        let stderr = take_pipe(child.stderr.take(), "stderr")?;

        let mut writer = tokio::spawn(write_request(stdin, payload));
        let mut reader = tokio::spawn(read_all(stdout));
        let sink = Arc::clone(&self.sink);
        let mut drain = tokio::spawn(drain_lines(stderr, sink, target.to_string()));

        let deadline = Instant::now() + plugin.timeout;
        let finished = timeout_at(deadline, async {
            let status = child.wait().await?;
            let stdout = join(&mut reader).await??;
            let stderr = join(&mut drain).await??;
            let stdin = join(&mut writer).await?;
            Ok::<_, GeneratorError>(Finished {
                status,
                stdout,
                stderr,
                stdin,
            })
        })
        .await;

        let finished = match finished {
            Ok(result) => result?,
            Err(_) => {
                let timeout_ms = plugin.timeout.as_millis() as u64;
                warn!(timeout_ms, "plugin timed out, killing it");
                kill(&mut child).await;
                writer.abort();
                reader.abort();
                drain.abort();
                return Err(GeneratorError::Timeout(plugin.timeout));
            }
        };

        debug!(
            status = ?finished.status.code(),
            stdout_bytes = finished.stdout.len(),
            stderr_bytes = finished.stderr.len(),
            "plugin exited"
        );

        if !finished.status.success() {
            return Err(GeneratorError::ExitStatus {
                code: finished.status.code(),
                stderr: finished.stderr,
            });
        }
        finished.stdin?;

        let response = PluginResponse::parse(&finished.stdout)?;
        Ok(response.into_files())
    }

    fn spawn(&self, plugin: &PluginCommand) -> Result<Child, GeneratorError> {
        let Some((program, leading)) = plugin.command.split_first() else {
            return Err(GeneratorError::Spawn {
                command: String::new(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "plugin command is empty"),
            });
        };

        Command::new(program)
            .args(leading)
            .args(&plugin.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| GeneratorError::Spawn {
                command: plugin.display(),
                source,
            })
    }
}

fn take_pipe<T>(pipe: Option<T>, name: &str) -> Result<T, GeneratorError> {
    pipe.ok_or_else(|| {
        GeneratorError::Io(io::Error::other(format!("plugin {name} was not captured")))
    })
}

async fn join<T>(handle: &mut JoinHandle<T>) -> Result<T, GeneratorError> {
    handle.await.map_err(|e| GeneratorError::Io(io::Error::other(e)))
}

async fn kill(child: &mut Child) {
    if let Err(e) = child.kill().await {
        debug!(error = %e, "failed to kill plugin");
    }
}

/// Write the request and close stdin.
///
/// A plugin may exit without reading its input; the broken pipe that
/// causes is logged, not returned.
async fn write_request(mut stdin: ChildStdin, payload: Vec<u8>) -> io::Result<()> {
    let result = async {
        stdin.write_all(&payload).await?;
        stdin.flush().await
    }
    .await;
    drop(stdin);

    match result {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            warn!("plugin closed stdin before reading the whole request");
            Ok(())
        }
        other => other,
    }
}

async fn read_all(mut stdout: impl AsyncRead + Unpin) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    stdout.read_to_end(&mut buf).await?;
    Ok(buf)
}

/// Forward every stderr line to `sink` and return the full text.
async fn drain_lines(
    stderr: impl AsyncRead + Unpin,
    sink: Arc<dyn DiagnosticSink>,
    target: String,
) -> io::Result<String> {
    let mut reader = BufReader::new(stderr);
    let mut captured = String::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&buf);
        let line = text.trim_end_matches(['\n', '\r']);
        sink.line(&target, line);
        captured.push_str(line);
        captured.push('\n');
    }
    Ok(captured)
}
