//! Running a job script through the external engine.
//!
//! The script is written to a private staging directory and the engine is
//! started as `<executable> /s <script>`. The call blocks until the engine
//! exits, the timeout passes or the caller cancels. On every path out of
//! [`Engine::run_with_cancel`] the child process is killed and reaped if it
//! is still running and the staging directory is removed.
//!
//! On unix the engine runs in its own process group, so helpers it starts
//! are killed with it. Result lists left over from an earlier run are
//! removed before launch; a list that exists afterwards was written by
//! this run.

use std::fs;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, ChildStdout, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tracing::{debug, info, instrument, warn};

use super::commands::Command as ScriptCommand;
use super::fdscript::FdScript;
use crate::config::EngineConfig;
use crate::errors::{StruxError, StruxResult};

/// File name of the staged script
pub const SCRIPT_FILE_NAME: &str = "job.fdscript";

/// How long output pipes are drained after the engine is gone
const OUTPUT_GRACE: Duration = Duration::from_secs(2);

/// A result list produced by one list command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultArtifact {
    /// Template the list was generated from
    pub template: PathBuf,
    pub path: PathBuf,
}

impl ResultArtifact {
    /// Raw tab-separated bytes as written by the engine
    pub fn read_bytes(&self) -> StruxResult<Vec<u8>> {
        fs::read(&self.path)
            .map_err(|e| StruxError::file_error("read result", self.path.display().to_string(), e.to_string()))
    }
}

/// Outcome of a successful engine run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Engine log, when it was written into the staging directory
    pub log: Option<String>,
    pub artifacts: Vec<ResultArtifact>,
}

// ============================================================================
// Guards
// ============================================================================

/// Kills and reaps the child unless it already exited
struct ChildGuard {
    child: Child,
}

impl ChildGuard {
    fn terminate(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            #[cfg(unix)]
            kill_process_group(self.child.id());
            if let Err(e) = self.child.kill() {
                warn!(error = %e, "failed to kill engine process");
            }
            let _ = self.child.wait();
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Kill the group led by the engine, taking any helpers it started along.
///
/// Goes through `kill(1)` since the group id is negative on its command line.
#[cfg(unix)]
fn kill_process_group(pid: u32) {
    let status = Command::new("kill")
        .arg("-KILL")
        .arg("--")
        .arg(format!("-{}", pid))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    match status {
        Ok(status) if status.success() => debug!(pgid = pid, "killed engine process group"),
        Ok(status) => debug!(pgid = pid, %status, "process group already gone"),
        Err(e) => warn!(pgid = pid, error = %e, "failed to kill engine process group"),
    }
}

/// Output pipes drained on background threads so the child never blocks
struct OutputCollector {
    stdout: Receiver<Vec<u8>>,
    stderr: Receiver<Vec<u8>>,
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    if let Some(mut pipe) = pipe {
        thread::spawn(move || {
            let mut buffer = Vec::new();
            let _ = pipe.read_to_end(&mut buffer);
            let _ = tx.send(buffer);
        });
    }
    rx
}

impl OutputCollector {
    fn start(stdout: Option<ChildStdout>, stderr: Option<ChildStderr>) -> Self {
        OutputCollector {
            stdout: drain(stdout),
            stderr: drain(stderr),
        }
    }

    /// Collect what the readers gathered, waiting at most `grace` in total.
    ///
    /// A pipe still held open by a process outside our reach yields nothing
    /// rather than blocking the caller.
    fn finish(self, grace: Duration) -> (String, String) {
        let deadline = Instant::now() + grace;
        let collect = |rx: Receiver<Vec<u8>>, pipe: &str| {
            match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    warn!(pipe, "engine output still open after exit; dropping it");
                    String::new()
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => String::new(),
            }
        };
        let stdout = collect(self.stdout, "stdout");
        let stderr = collect(self.stderr, "stderr");
        (stdout, stderr)
    }
}

fn combined(stdout: &str, stderr: &str) -> String {
    match (stdout.is_empty(), stderr.is_empty()) {
        (_, true) => stdout.to_string(),
        (true, false) => stderr.to_string(),
        (false, false) => format!("{stdout}\n{stderr}"),
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Launcher for the external analysis engine
#[derive(Debug, Clone, PartialEq)]
pub struct Engine {
    config: EngineConfig,
}

enum Wait {
    Exited(ExitStatus),
    TimedOut,
    Cancelled,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Engine { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run a script to completion. No retries are made.
    ///
    /// # Errors
    ///
    /// * `ExternalEngine` - launch failure, non-zero exit, or a missing result list
    /// * `ExternalEngineTimeout` - the configured timeout passed
    /// * `FileError` - the script could not be staged
    pub fn run(&self, script: &FdScript) -> StruxResult<JobOutput> {
        self.run_with_cancel(script, &AtomicBool::new(false))
    }

    /// Like [`Engine::run`], stopping early once `cancel` is set
    #[instrument(skip_all, fields(executable = %self.config.executable.display()))]
    pub fn run_with_cancel(&self, script: &FdScript, cancel: &AtomicBool) -> StruxResult<JobOutput> {
        let staging = tempfile::Builder::new()
            .prefix("strux-job-")
            .tempdir()
            .map_err(|e| StruxError::file_error("create staging directory", "<temp>", e.to_string()))?;
        let (script_path, log_path) = stage(script, &staging)?;

        if cancel.load(Ordering::Relaxed) {
            return Err(StruxError::external_engine(None, "cancelled before launch", ""));
        }
        remove_stale_artifacts(script)?;

        info!(script = %script_path.display(), commands = script.commands.len(), "launching engine");
        let mut command = Command::new(&self.config.executable);
        command
            .arg("/s")
            .arg(&script_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        let mut child = command
            .spawn()
            .map(|child| ChildGuard { child })
            .map_err(|e| {
                StruxError::external_engine(
                    None,
                    format!("failed to launch {}: {}", self.config.executable.display(), e),
                    "",
                )
            })?;
        let output = OutputCollector::start(child.child.stdout.take(), child.child.stderr.take());

        let waited = self.wait(&mut child, cancel);
        child.terminate();
        let (stdout, stderr) = output.finish(OUTPUT_GRACE);

        let status = match waited? {
            Wait::Exited(status) => status,
            Wait::TimedOut => {
                warn!(timeout_secs = ?self.config.timeout_secs, "engine timed out");
                return Err(StruxError::ExternalEngineTimeout {
                    timeout_secs: self.config.timeout_secs.unwrap_or_default(),
                    output: combined(&stdout, &stderr),
                });
            }
            Wait::Cancelled => {
                info!("engine run cancelled");
                return Err(StruxError::external_engine(None, "cancelled", combined(&stdout, &stderr)));
            }
        };

        let exit_code = status.code();
        if !status.success() {
            return Err(StruxError::external_engine(
                exit_code,
                format!("engine exited with {}", status),
                combined(&stdout, &stderr),
            ));
        }

        let artifacts = collect_artifacts(script);
        if let Some(missing) = artifacts.iter().find(|a| !a.path.exists()) {
            return Err(StruxError::external_engine(
                exit_code,
                format!("expected result file {} was not written", missing.path.display()),
                combined(&stdout, &stderr),
            ));
        }

        let log = log_path.and_then(|p| fs::read(p).ok()).map(|b| String::from_utf8_lossy(&b).into_owned());
        info!(artifacts = artifacts.len(), "engine finished");
        Ok(JobOutput {
            exit_code,
            stdout,
            stderr,
            log,
            artifacts,
        })
    }

    fn wait(&self, child: &mut ChildGuard, cancel: &AtomicBool) -> StruxResult<Wait> {
        let started = Instant::now();
        let timeout = self.config.timeout();
        loop {
            let polled = child
                .child
                .try_wait()
                .map_err(|e| StruxError::external_engine(None, format!("failed to poll engine: {}", e), ""))?;
            if let Some(status) = polled {
                debug!(%status, elapsed_ms = started.elapsed().as_millis() as u64, "engine exited");
                return Ok(Wait::Exited(status));
            }
            if cancel.load(Ordering::Relaxed) {
                return Ok(Wait::Cancelled);
            }
            if timeout.is_some_and(|t| started.elapsed() >= t) {
                return Ok(Wait::TimedOut);
            }
            thread::sleep(self.config.poll_interval());
        }
    }
}

/// Write the script into the staging directory. A relative log file is
/// placed there too; its path is returned so the log can be read back.
fn stage(script: &FdScript, staging: &TempDir) -> StruxResult<(PathBuf, Option<PathBuf>)> {
    let mut staged = script.clone();
    let log_path = if staged.header.log_file.is_relative() {
        let path = staging.path().join(&staged.header.log_file);
        staged.header.log_file = path.clone();
        Some(path)
    } else {
        None
    };

    let script_path = staging.path().join(SCRIPT_FILE_NAME);
    let text = staged.to_xml_string()?;
    write_file(&script_path, text.as_bytes())?;
    debug!(path = %script_path.display(), bytes = text.len(), "staged script");
    Ok((script_path, log_path))
}

fn write_file(path: &Path, bytes: &[u8]) -> StruxResult<()> {
    fs::write(path, bytes).map_err(|e| StruxError::file_error("write script", path.display().to_string(), e.to_string()))
}

/// Delete result lists this script is about to produce, so that a list
/// surviving from an earlier run is never taken for this run's output
fn remove_stale_artifacts(script: &FdScript) -> StruxResult<()> {
    for path in script.expected_outputs() {
        match fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "removed stale result file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(StruxError::file_error(
                    "remove stale result",
                    path.display().to_string(),
                    e.to_string(),
                ))
            }
        }
    }
    Ok(())
}

fn collect_artifacts(script: &FdScript) -> Vec<ResultArtifact> {
    script
        .commands
        .iter()
        .filter_map(|c| match c {
            ScriptCommand::ListGen(cmd) => Some(ResultArtifact {
                template: cmd.bsc_file.clone(),
                path: cmd.out_file.clone(),
            }),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::{CmdEndSession, CmdListGen, FdScriptHeader};

    #[test]
    fn test_missing_executable_is_engine_error() {
        let engine = Engine::new(EngineConfig::default().with_executable("/nonexistent/strux-engine"));
        let script = FdScript::new(FdScriptHeader::new("t", engine.config())).with_command(CmdEndSession);
        let err = engine.run(&script).unwrap_err();
        assert_eq!(err.error_code(), "EXTERNAL_ENGINE");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_cancel_before_launch() {
        let engine = Engine::new(EngineConfig::default());
        let script = FdScript::new(FdScriptHeader::new("t", engine.config()));
        let cancel = AtomicBool::new(true);
        match engine.run_with_cancel(&script, &cancel).unwrap_err() {
            StruxError::ExternalEngine { exit_code, reason, .. } => {
                assert_eq!(exit_code, None);
                assert!(reason.contains("cancelled"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_staging_places_relative_log_next_to_script() {
        let staging = TempDir::new().unwrap();
        let script = FdScript::new(FdScriptHeader::new("t", &EngineConfig::default()));
        let (script_path, log) = stage(&script, &staging).unwrap();
        assert_eq!(script_path, staging.path().join(SCRIPT_FILE_NAME));
        assert_eq!(log, Some(staging.path().join("logfile.log")));
        let text = fs::read_to_string(&script_path).unwrap();
        assert!(text.contains(&staging.path().join("logfile.log").display().to_string()));
    }

    #[test]
    fn test_artifacts_follow_list_commands() {
        let script = FdScript::new(FdScriptHeader::new("t", &EngineConfig::default()))
            .with_command(CmdListGen::new(Path::new("a.bsc"), Path::new("out")).unwrap())
            .with_command(CmdEndSession);
        let artifacts = collect_artifacts(&script);
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].path, Path::new("out").join("a.csv"));
    }

    #[test]
    fn test_stale_artifacts_are_removed() {
        let dir = TempDir::new().unwrap();
        let stale = dir.path().join("a.csv");
        fs::write(&stale, "ID\tFz\n").unwrap();
        let script = FdScript::new(FdScriptHeader::new("t", &EngineConfig::default()))
            .with_command(CmdListGen::new(Path::new("a.bsc"), dir.path()).unwrap())
            .with_command(CmdListGen::new(Path::new("b.bsc"), dir.path()).unwrap());

        remove_stale_artifacts(&script).unwrap();
        assert!(!stale.exists());
    }

    #[test]
    fn test_output_collection_is_bounded() {
        let (_tx, rx) = mpsc::channel::<Vec<u8>>();
        let (tx_err, rx_err) = mpsc::channel();
        tx_err.send(b"warning".to_vec()).unwrap();
        let collector = OutputCollector {
            stdout: rx,
            stderr: rx_err,
        };

        let started = Instant::now();
        let (stdout, stderr) = collector.finish(Duration::from_millis(50));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(stdout, "");
        assert_eq!(stderr, "warning");
    }

    #[test]
    fn test_combined_output() {
        assert_eq!(combined("out", ""), "out");
        assert_eq!(combined("", "err"), "err");
        assert_eq!(combined("out", "err"), "out\nerr");
    }
}
