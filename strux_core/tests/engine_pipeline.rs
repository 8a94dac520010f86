//! Job pipeline tests against a shell script standing in for the engine.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use strux_core::calculate::{Analysis, Engine, FdScript};
use strux_core::config::EngineConfig;
use strux_core::errors::StruxError;
use tempfile::TempDir;

/// Writes one tab-separated row into every `outfile` named by the script
const WRITES_RESULTS: &str = r#"#!/bin/sh
[ "$1" = "/s" ] || exit 64
grep -o 'outfile="[^"]*"' "$2" | sed 's/^outfile="//; s/"$//' | while read -r f; do
    printf 'ID\tFz\nS.1\t12.5\n' > "$f"
done
echo "analysis done"
"#;

const FAILS: &str = "#!/bin/sh\necho 'license not found' >&2\nexit 3\n";

const WRITES_NOTHING: &str = "#!/bin/sh\nexit 0\n";

const HANGS: &str = "#!/bin/sh\nexec sleep 30\n";

/// The shell stays the child and the sleep runs as its own process
const HANGS_IN_HELPER: &str = "#!/bin/sh\nsleep 8\necho finished\n";

struct Fixture {
    dir: TempDir,
    engine: Engine,
}

impl Fixture {
    fn new(body: &str, timeout_secs: Option<u64>) -> Self {
        let dir = TempDir::new().unwrap();
        let executable = dir.path().join("fake-engine.sh");
        fs::write(&executable, body).unwrap();
        fs::set_permissions(&executable, fs::Permissions::from_mode(0o755)).unwrap();

        let config = EngineConfig {
            poll_interval_ms: 10,
            ..EngineConfig::default()
        }
        .with_executable(executable)
        .with_timeout_secs(timeout_secs);
        Fixture {
            dir,
            engine: Engine::new(config),
        }
    }

    fn output_dir(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    fn script(&self, templates: &[&str]) -> FdScript {
        let bsc: Vec<PathBuf> = templates.iter().map(PathBuf::from).collect();
        FdScript::analysis(
            self.engine.config(),
            Path::new("model.struxml"),
            Analysis::static_analysis(),
            None,
            &bsc,
            &self.output_dir(),
            true,
        )
        .unwrap()
    }
}

#[test]
fn test_successful_run_returns_artifacts() {
    let fixture = Fixture::new(WRITES_RESULTS, Some(30));
    let script = fixture.script(&["reactions.bsc", "displacements.bsc"]);

    let output = fixture.engine.run(&script).unwrap();
    assert_eq!(output.exit_code, Some(0));
    assert!(output.stdout.contains("analysis done"));
    assert_eq!(output.artifacts.len(), 2);
    assert_eq!(output.artifacts[0].path, fixture.output_dir().join("reactions.csv"));
    assert_eq!(output.artifacts[1].template, PathBuf::from("displacements.bsc"));

    let bytes = output.artifacts[0].read_bytes().unwrap();
    assert_eq!(bytes, b"ID\tFz\nS.1\t12.5\n");
}

#[test]
fn test_non_zero_exit_carries_code_and_output() {
    let fixture = Fixture::new(FAILS, Some(30));
    match fixture.engine.run(&fixture.script(&[])).unwrap_err() {
        StruxError::ExternalEngine { exit_code, output, .. } => {
            assert_eq!(exit_code, Some(3));
            assert!(output.contains("license not found"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_missing_result_file_is_named() {
    let fixture = Fixture::new(WRITES_NOTHING, Some(30));
    match fixture.engine.run(&fixture.script(&["reactions.bsc"])).unwrap_err() {
        StruxError::ExternalEngine { exit_code, reason, .. } => {
            assert_eq!(exit_code, Some(0));
            assert!(reason.contains("reactions.csv"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_result_file_from_an_earlier_run_is_not_reused() {
    let fixture = Fixture::new(WRITES_NOTHING, Some(30));
    let stale = fixture.output_dir().join("reactions.csv");
    fs::write(&stale, "ID\tFz\nS.1\t99.0\n").unwrap();

    match fixture.engine.run(&fixture.script(&["reactions.bsc"])).unwrap_err() {
        StruxError::ExternalEngine { reason, .. } => assert!(reason.contains("reactions.csv")),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!stale.exists());
}

#[test]
fn test_timeout_kills_the_engine() {
    let fixture = Fixture::new(HANGS, Some(1));
    let started = Instant::now();
    let err = fixture.engine.run(&fixture.script(&[])).unwrap_err();

    assert_eq!(err.error_code(), "EXTERNAL_ENGINE_TIMEOUT");
    assert!(started.elapsed() < Duration::from_secs(20));
}

#[test]
fn test_timeout_kills_helper_processes() {
    let fixture = Fixture::new(HANGS_IN_HELPER, Some(1));
    let started = Instant::now();
    let err = fixture.engine.run(&fixture.script(&[])).unwrap_err();

    assert_eq!(err.error_code(), "EXTERNAL_ENGINE_TIMEOUT");
    assert!(started.elapsed() < Duration::from_secs(6));
}

#[test]
fn test_cancellation_stops_the_engine() {
    let fixture = Fixture::new(HANGS, None);
    let script = fixture.script(&[]);
    let cancel = AtomicBool::new(false);
    let started = Instant::now();

    let result = thread::scope(|s| {
        s.spawn(|| {
            thread::sleep(Duration::from_millis(200));
            cancel.store(true, Ordering::Relaxed);
        });
        fixture.engine.run_with_cancel(&script, &cancel)
    });

    match result.unwrap_err() {
        StruxError::ExternalEngine { reason, .. } => assert_eq!(reason, "cancelled"),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(started.elapsed() < Duration::from_secs(20));
}
