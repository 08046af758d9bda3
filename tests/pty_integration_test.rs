//! End-to-end tests against a real PTY and shell. Gated to platforms with a POSIX `/bin/sh`
//! available; CI sandboxes without a controlling terminal still run these fine since
//! `portable_pty` allocates its own.

#![cfg(unix)]

use std::sync::Arc;
use std::time::{Duration, Instant};
use termstage::{PollExit, PtyConfig, SessionEvent, SessionManager, TokioRuntime};

fn has_posix_shell() -> bool {
    std::path::Path::new("/bin/sh").exists()
}

fn init_logging() {
    let _ = env_logger::try_init();
}

#[tokio::test]
async fn test_session_manager_round_trips_shell_output() {
    init_logging();
    if !has_posix_shell() {
        return;
    }

    let dir = tempfile::tempdir().expect("failed to create scratch dir");
    let marker = dir.path().join("marker.txt");
    std::fs::write(&marker, "beacon").expect("failed to seed scratch file");

    let runtime = Arc::new(TokioRuntime::new());
    let mut manager: SessionManager<TokioRuntime> = SessionManager::new(Arc::clone(&runtime));

    let config = PtyConfig::new(["/bin/sh", "-c", "cat marker.txt"])
        .cwd(dir.path().to_string_lossy().to_string())
        .size(80, 24);
    let handle = manager.spawn(&config).expect("spawn should succeed");

    let mut collected = Vec::new();
    let mut exited = false;
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline && !exited {
        match manager.try_next_event() {
            Some((h, SessionEvent::Data(bytes))) => {
                assert_eq!(h, handle);
                collected.extend_from_slice(&bytes);
            }
            Some((h, SessionEvent::Exit(_))) => {
                assert_eq!(h, handle);
                exited = true;
            }
            None => tokio::time::sleep(Duration::from_millis(10)).await,
        }
    }

    assert!(exited, "session should have exited within the deadline");
    assert!(String::from_utf8_lossy(&collected).contains("beacon"));

    let metrics = manager.metrics(handle).expect("handle should still be known");
    assert!(metrics.bytes_read >= "beacon".len() as u64);

    manager.release(handle).await.expect("release should succeed");
}

#[tokio::test]
async fn test_write_is_echoed_back_through_the_pty() {
    init_logging();
    if !has_posix_shell() {
        return;
    }

    let runtime = Arc::new(TokioRuntime::new());
    let mut manager: SessionManager<TokioRuntime> = SessionManager::new(Arc::clone(&runtime));

    let config = PtyConfig::new(["/bin/sh", "-c", "cat"]).size(80, 24);
    let handle = manager.spawn(&config).expect("spawn should succeed");

    manager
        .write(handle, b"hello-pty\n")
        .expect("write should succeed");

    let mut collected = Vec::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline && !String::from_utf8_lossy(&collected).contains("hello-pty") {
        if let Some((_, SessionEvent::Data(bytes))) = manager.try_next_event() {
            collected.extend_from_slice(&bytes);
        } else {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    assert!(String::from_utf8_lossy(&collected).contains("hello-pty"));
    manager.release(handle).await.expect("release should succeed");
}

#[tokio::test]
async fn test_poll_exit_reports_exit_code() {
    init_logging();
    if !has_posix_shell() {
        return;
    }

    let config = PtyConfig::new(["/bin/sh", "-c", "exit 3"]).size(80, 24);
    let mut session = termstage::PtySession::spawn(&config).expect("spawn should succeed");

    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        match session.poll_exit().expect("poll_exit should not error") {
            PollExit::Exited(code) => {
                assert_eq!(code, 3);
                break;
            }
            PollExit::Signal(_) => panic!("expected a clean exit, not a signal"),
            PollExit::StillRunning => {
                assert!(Instant::now() < deadline, "child did not exit in time");
                std::thread::sleep(Duration::from_millis(10));
            }
        }
    }
}
