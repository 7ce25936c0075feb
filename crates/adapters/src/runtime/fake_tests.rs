// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn alpine() -> ImageRef {
    ImageRef::parse("alpine").unwrap()
}

#[tokio::test]
async fn pull_makes_image_listable() {
    let client = FakeRuntimeClient::new();
    assert!(client.list_images().await.unwrap().is_empty());

    client.pull_image(&alpine()).await.unwrap();
    let images = client.list_images().await.unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].repo_tags, vec!["alpine:latest".to_string()]);
}

#[tokio::test]
async fn create_assigns_sequential_ids() {
    let client = FakeRuntimeClient::new();
    let c1 = client.create_container(&alpine(), &[]).await.unwrap();
    let c2 = client.create_container(&alpine(), &[]).await.unwrap();
    assert_eq!(c1, "c1");
    assert_eq!(c2, "c2");
    assert!(!client.is_running("c1"));
}

#[tokio::test]
async fn kill_after_kill_reports_not_running() {
    let client = FakeRuntimeClient::new();
    let id = client.create_container(&alpine(), &[]).await.unwrap();
    client.start_container(&id).await.unwrap();

    client.kill_container(&id, "SIGKILL").await.unwrap();
    let err = client.kill_container(&id, "SIGKILL").await.unwrap_err();
    assert!(matches!(err, RuntimeError::NotRunning(_)));
    assert_eq!(client.call_count(RuntimeOp::Kill), 2);
}

#[tokio::test]
async fn injected_failure_is_recorded_and_returned() {
    let client = FakeRuntimeClient::new();
    client.fail(RuntimeOp::Pull, RuntimeError::Rejected("denied".into()));

    let err = client.pull_image(&alpine()).await.unwrap_err();
    assert_eq!(err, RuntimeError::Rejected("denied".into()));
    assert_eq!(
        client.calls(),
        vec![RuntimeCall::PullImage {
            image: "alpine".into()
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn stop_waits_for_exit_within_grace() {
    let client = FakeRuntimeClient::new()
        .with_stop_behavior(StopBehavior::ExitsAfter(Duration::from_secs(2)));
    client.add_container("c1", true);

    let start = tokio::time::Instant::now();
    let report = client.stop_container(&ContainerId::new("c1"), Duration::from_secs(5)).await;
    assert_eq!(
        report.unwrap(),
        StopReport {
            exited_in_time: true
        }
    );
    assert_eq!(start.elapsed(), Duration::from_secs(2));
    assert!(!client.is_running("c1"));
}

#[tokio::test(start_paused = true)]
async fn stop_blocks_for_grace_when_ignored() {
    let client = FakeRuntimeClient::new().with_stop_behavior(StopBehavior::Ignores);
    client.add_container("c1", true);

    let start = tokio::time::Instant::now();
    let report = client.stop_container(&ContainerId::new("c1"), Duration::from_secs(5)).await;
    assert_eq!(
        report.unwrap(),
        StopReport {
            exited_in_time: false
        }
    );
    assert_eq!(start.elapsed(), Duration::from_secs(5));
    assert!(client.is_running("c1"));
}
