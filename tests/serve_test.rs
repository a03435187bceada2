//! Signal handling of `slink serve` around the supervised ingestion service.

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::fs;
use std::net::TcpStream;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().expect("local addr").port()
}

fn listening(port: u16) -> bool {
    TcpStream::connect(("127.0.0.1", port)).is_ok()
}

fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    false
}

/// The startup wait sleeps long after the first failed probe, so the child is
/// up and answering well before the parent would notice.
fn write_config(dir: &Path, ingest_port: u16) -> std::path::PathBuf {
    let config_path = dir.join("slink.yaml");
    let yaml = format!(
        r#"
database:
  path: {db}
server:
  port: {server_port}
ingest:
  port: {ingest_port}
  log_file: {log}
  startup_attempts: 3
  startup_interval: 10s
  grace_period: 2s
log_file: {main_log}
"#,
        db = dir.join("links.db").display(),
        server_port = free_port(),
        log = dir.join("addlink.log").display(),
        main_log = dir.join("slink.log").display(),
    );
    fs::write(&config_path, yaml).expect("write config");
    config_path
}

#[test]
fn test_sigint_during_startup_stops_the_child() {
    let temp_dir = tempfile::tempdir().unwrap();
    let ingest_port = free_port();
    let config = write_config(temp_dir.path(), ingest_port);

    let mut parent = Command::new(env!("CARGO_BIN_EXE_slink"))
        .arg("--config")
        .arg(&config)
        .arg("serve")
        .env("RUST_LOG", "warn")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to run slink serve");

    assert!(
        wait_until(Duration::from_secs(8), || listening(ingest_port)),
        "ingestion service never came up"
    );
    assert!(parent.try_wait().unwrap().is_none());

    kill(Pid::from_raw(parent.id() as i32), Signal::SIGINT).unwrap();

    let mut status = None;
    wait_until(Duration::from_secs(10), || {
        status = parent.try_wait().unwrap();
        status.is_some()
    });
    let Some(status) = status else {
        let _ = parent.kill();
        panic!("slink serve did not exit after SIGINT");
    };
    assert!(status.success(), "exit status: {status}");

    let output = parent.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Startup aborted"), "{stdout}");

    assert!(
        wait_until(Duration::from_secs(3), || !listening(ingest_port)),
        "ingestion service still listening after the parent exited"
    );
}
