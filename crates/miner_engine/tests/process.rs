#![cfg(unix)]

use std::ffi::OsString;
use std::time::Duration;

use miner_engine::{PoolSettings, ProcessSpawner, UnitStatus, WorkerPool};
use pretty_assertions::assert_eq;

fn shell(script: &str) -> ProcessSpawner {
    // `sh -c <script> sh <slug>`: the slug lands in $1.
    ProcessSpawner::new(
        "sh",
        vec![OsString::from("-c"), OsString::from(script), OsString::from("sh")],
    )
    .with_subcommand(Vec::new())
}

fn settings(unit_timeout: Duration) -> PoolSettings {
    PoolSettings {
        max_concurrency: 2,
        poll_interval: Duration::from_millis(10),
        unit_timeout,
    }
}

#[tokio::test]
async fn captures_output_and_exit_status() {
    let spawner = shell(r#"echo "mining $1"; echo "warn $1" >&2; [ "$1" != "bad-item" ]"#);
    let mut pool = WorkerPool::new(spawner, settings(Duration::from_secs(30)));
    pool.submit("good-item");
    pool.submit("bad-item");

    let summary = pool.run().await;
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);

    let good = summary.units.iter().find(|u| u.id == "good-item").unwrap();
    assert_eq!(good.status, UnitStatus::Done);
    assert!(good.output.contains("mining good-item"));
    assert!(good.output.contains("warn good-item"));

    let bad = summary.units.iter().find(|u| u.id == "bad-item").unwrap();
    assert_eq!(bad.status, UnitStatus::Failed);
    assert!(bad.exit.as_ref().unwrap().message.contains("exited with"));
}

#[tokio::test]
async fn slow_process_is_killed() {
    let spawner = shell("sleep 30");
    let mut pool = WorkerPool::new(spawner, settings(Duration::from_millis(100)));
    pool.submit("slow-item");

    let summary = pool.run().await;
    let unit = &summary.units[0];
    assert_eq!(unit.status, UnitStatus::Failed);
    assert!(unit.exit.as_ref().unwrap().message.contains("timed out"));
}

#[tokio::test]
async fn missing_program_fails_the_unit() {
    let spawner = ProcessSpawner::new("/nonexistent/miner-binary", Vec::new());
    let mut pool = WorkerPool::new(spawner, settings(Duration::from_secs(5)));
    pool.submit("any-item");

    let summary = pool.run().await;
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.peak_running, 0);
}
