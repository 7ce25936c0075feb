// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tether_adapters::{FakeRuntimeClient, RuntimeCall, RuntimeError, RuntimeOp, StopBehavior};
use tether_core::{FakeClock, Phase};

fn alpine() -> ImageRef {
    ImageRef::parse("alpine").unwrap()
}

fn orchestrator(client: &FakeRuntimeClient) -> Orchestrator<FakeRuntimeClient, FakeClock> {
    Orchestrator::with_clock(client.clone(), alpine(), LifecycleConfig::default(), FakeClock::new())
}

async fn running(client: &FakeRuntimeClient) -> Orchestrator<FakeRuntimeClient, FakeClock> {
    let mut orch = orchestrator(client);
    orch.prepare().await.unwrap();
    orch.launch().await.unwrap();
    orch
}

fn states(orch: &Orchestrator<FakeRuntimeClient, FakeClock>) -> Vec<LifecycleState> {
    orch.history().iter().map(|t| t.to).collect()
}

#[tokio::test(start_paused = true)]
async fn absent_image_is_pulled_then_killed_after_timeout() {
    let client = FakeRuntimeClient::new().with_stop_behavior(StopBehavior::Ignores);
    let mut orch = orchestrator(&client);

    assert_eq!(orch.prepare().await.unwrap(), Provision::Pulled);
    let id = orch.launch().await.unwrap();
    assert_eq!(id, "c1");
    assert_eq!(orch.state(), LifecycleState::Running);

    let start = tokio::time::Instant::now();
    let outcome = orch.terminate(Duration::from_secs(5), CancellationToken::new()).await.unwrap();

    assert_eq!(outcome, TerminationOutcome::KilledAfterTimeout);
    assert!(start.elapsed() >= Duration::from_secs(5));
    assert_eq!(orch.state(), LifecycleState::Killed);
    assert_eq!(
        client.calls(),
        vec![
            RuntimeCall::ListImages,
            RuntimeCall::PullImage {
                image: "alpine".into(),
            },
            RuntimeCall::CreateContainer {
                image: "alpine".into(),
                command: vec!["tail".into(), "-f".into(), "/dev/null".into()],
            },
            RuntimeCall::StartContainer { id: "c1".into() },
            RuntimeCall::StopContainer {
                id: "c1".into(),
                grace: Duration::from_secs(5),
            },
            RuntimeCall::KillContainer {
                id: "c1".into(),
                signal: "SIGKILL".into(),
            },
        ]
    );
    assert_eq!(
        states(&orch),
        vec![
            LifecycleState::ImageResolved,
            LifecycleState::Running,
            LifecycleState::Stopping,
            LifecycleState::Killed,
        ]
    );
}

#[tokio::test]
async fn create_failure_fails_without_container_calls() {
    let client = FakeRuntimeClient::new().with_image("sha256:aaa", &["alpine:latest"]);
    client.fail(RuntimeOp::Create, RuntimeError::Rejected("invalid command".into()));
    let mut orch = orchestrator(&client);

    orch.prepare().await.unwrap();
    let err = orch.launch().await.unwrap_err();

    assert!(matches!(err, LifecycleError::CreateFailed { .. }), "got {err:?}");
    assert!(!err.is_image_failure());
    assert_eq!(orch.state(), LifecycleState::Failed);
    assert_eq!(orch.container_id(), None);
    assert_eq!(client.call_count(RuntimeOp::Start), 0);
    assert_eq!(client.call_count(RuntimeOp::Stop), 0);
    assert_eq!(client.call_count(RuntimeOp::Kill), 0);
}

#[tokio::test]
async fn start_failure_kills_half_created_container() {
    let client = FakeRuntimeClient::new();
    client.fail(RuntimeOp::Start, RuntimeError::Rejected("oci runtime error".into()));
    let mut orch = orchestrator(&client);

    orch.prepare().await.unwrap();
    let err = orch.launch().await.unwrap_err();

    // The container never ran, so the cleanup kill reports NotRunning and is
    // swallowed; the start failure is what surfaces.
    assert!(matches!(err, LifecycleError::StartFailed { .. }), "got {err:?}");
    assert_eq!(orch.state(), LifecycleState::Failed);
    assert_eq!(orch.container_id().map(|id| id.as_str()), Some("c1"));
    assert_eq!(client.call_count(RuntimeOp::Kill), 1);
}

#[tokio::test]
async fn cleanup_failure_does_not_mask_start_failure() {
    let client = FakeRuntimeClient::new();
    client.fail(RuntimeOp::Start, RuntimeError::Rejected("oci runtime error".into()));
    client.fail(RuntimeOp::Kill, RuntimeError::Unavailable("connection reset".into()));
    let mut orch = orchestrator(&client);

    orch.prepare().await.unwrap();
    let err = orch.launch().await.unwrap_err();

    assert!(matches!(err, LifecycleError::StartFailed { .. }), "got {err:?}");
    assert_eq!(orch.state(), LifecycleState::Failed);
}

#[tokio::test]
async fn pull_failure_is_an_image_failure() {
    let client = FakeRuntimeClient::new();
    client.fail(RuntimeOp::Pull, RuntimeError::NotFound("manifest unknown".into()));
    let mut orch = orchestrator(&client);

    let err = orch.prepare().await.unwrap_err();

    assert!(matches!(err, LifecycleError::PullFailed { .. }), "got {err:?}");
    assert!(err.is_image_failure());
    assert_eq!(orch.state(), LifecycleState::Failed);
    assert_eq!(client.call_count(RuntimeOp::Pull), 1);
    assert_eq!(client.call_count(RuntimeOp::Create), 0);
}

#[tokio::test]
async fn unreachable_runtime_fails_in_resolve() {
    let client = FakeRuntimeClient::new();
    client.fail(RuntimeOp::ListImages, RuntimeError::Unavailable("daemon down".into()));
    let mut orch = orchestrator(&client);

    let err = orch.prepare().await.unwrap_err();

    assert!(
        matches!(err, LifecycleError::RuntimeUnavailable { phase: Phase::Resolve, .. }),
        "got {err:?}"
    );
    assert_eq!(orch.state(), LifecycleState::Failed);
}

#[tokio::test(start_paused = true)]
async fn graceful_exit_ends_stopped() {
    let client = FakeRuntimeClient::new()
        .with_stop_behavior(StopBehavior::ExitsAfter(Duration::from_secs(1)));
    let mut orch = running(&client).await;

    let outcome = orch.terminate(Duration::from_secs(10), CancellationToken::new()).await.unwrap();

    assert_eq!(outcome, TerminationOutcome::StoppedGracefully);
    assert_eq!(orch.state(), LifecycleState::Stopped);
    assert_eq!(client.call_count(RuntimeOp::Kill), 0);
}

#[tokio::test(start_paused = true)]
async fn zero_grace_ends_killed() {
    let client = FakeRuntimeClient::new();
    let mut orch = running(&client).await;

    let outcome = orch.terminate(Duration::ZERO, CancellationToken::new()).await.unwrap();

    assert_eq!(outcome, TerminationOutcome::KilledImmediately);
    assert_eq!(orch.state(), LifecycleState::Killed);
    assert_eq!(client.call_count(RuntimeOp::Stop), 0);
}

#[tokio::test(start_paused = true)]
async fn cancelled_termination_returns_to_running() {
    let client = FakeRuntimeClient::new().with_stop_behavior(StopBehavior::ReturnsEarly);
    let mut orch = running(&client).await;

    orch.begin_termination(Duration::from_secs(5), CancellationToken::new()).unwrap();
    assert_eq!(orch.state(), LifecycleState::Stopping);
    tokio::time::sleep(Duration::from_secs(1)).await;
    orch.cancel_termination();

    assert_eq!(orch.finish_termination().await.unwrap(), TerminationOutcome::Cancelled);
    assert_eq!(orch.state(), LifecycleState::Running);
    assert_eq!(client.call_count(RuntimeOp::Kill), 0);

    // The handle is still live, so a later termination is accepted.
    let outcome = orch.terminate(Duration::ZERO, CancellationToken::new()).await.unwrap();
    assert_eq!(outcome, TerminationOutcome::KilledImmediately);
    assert_eq!(orch.state(), LifecycleState::Killed);
}

#[tokio::test(start_paused = true)]
async fn second_termination_request_is_refused() {
    let client = FakeRuntimeClient::new().with_stop_behavior(StopBehavior::Ignores);
    let mut orch = running(&client).await;

    orch.begin_termination(Duration::from_secs(5), CancellationToken::new()).unwrap();
    let err = orch.begin_termination(Duration::from_secs(5), CancellationToken::new()).unwrap_err();

    assert!(matches!(err, LifecycleError::TerminationPending(_)), "got {err:?}");
    orch.finish_termination().await.unwrap();
    assert_eq!(client.call_count(RuntimeOp::Stop), 1);
}

#[tokio::test]
async fn terminate_before_running_is_invalid() {
    let client = FakeRuntimeClient::new();
    let mut orch = orchestrator(&client);

    let err = orch.terminate(Duration::from_secs(1), CancellationToken::new()).await.unwrap_err();

    assert!(
        matches!(
            err,
            LifecycleError::InvalidState { state: LifecycleState::Uninitialized, .. }
        ),
        "got {err:?}"
    );
    assert!(client.calls().is_empty());
    assert_eq!(orch.state(), LifecycleState::Uninitialized);
}

#[tokio::test]
async fn launch_requires_resolved_image() {
    let client = FakeRuntimeClient::new();
    let mut orch = orchestrator(&client);

    let err = orch.launch().await.unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidState { operation: "launch", .. }));
    assert_eq!(client.call_count(RuntimeOp::Create), 0);
}

#[tokio::test(start_paused = true)]
async fn stop_failure_ends_failed() {
    let client = FakeRuntimeClient::new();
    let mut orch = running(&client).await;
    client.fail(RuntimeOp::Stop, RuntimeError::Rejected("cannot stop".into()));

    let err = orch.terminate(Duration::from_secs(5), CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, LifecycleError::StopFailed { .. }), "got {err:?}");
    assert_eq!(orch.state(), LifecycleState::Failed);
    assert_eq!(orch.outcome(), None);
}

#[tokio::test]
async fn transitions_are_timestamped_by_clock() {
    let client = FakeRuntimeClient::new().with_image("sha256:aaa", &["alpine:latest"]);
    let clock = FakeClock::new();
    clock.set_epoch_ms(5_000);
    let mut orch =
        Orchestrator::with_clock(client, alpine(), LifecycleConfig::default(), clock.clone());

    orch.prepare().await.unwrap();
    clock.advance(Duration::from_millis(250));
    orch.launch().await.unwrap();

    let history = orch.history();
    assert_eq!(
        history[0],
        Transition {
            from: LifecycleState::Uninitialized,
            to: LifecycleState::ImageResolved,
            at_ms: 5_000,
        }
    );
    assert_eq!(history[1].at_ms, 5_250);
}

#[tokio::test(start_paused = true)]
async fn run_waits_for_trigger_and_reports_result() {
    let client = FakeRuntimeClient::new()
        .with_image("sha256:aaa", &["alpine:latest"])
        .with_stop_behavior(StopBehavior::ExitsAfter(Duration::from_secs(1)));
    let mut orch = orchestrator(&client);

    let trigger = tokio::time::sleep(Duration::from_secs(30));
    let result =
        orch.run(Duration::from_secs(5), trigger, CancellationToken::new()).await.unwrap();

    assert_eq!(result.final_state, LifecycleState::Stopped);
    assert_eq!(result.container_id.as_ref().map(|id| id.as_str()), Some("c1"));
    assert_eq!(result.outcome, Some(TerminationOutcome::StoppedGracefully));
    assert_eq!(result.transitions.len(), 4);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["final_state"], "stopped");
    assert_eq!(json["image"], "alpine");
    assert_eq!(json["container_id"], "c1");
    assert_eq!(json["outcome"], "stopped_gracefully");
}

#[tokio::test]
async fn run_reports_failure_through_result() {
    let client = FakeRuntimeClient::new();
    client.fail(RuntimeOp::Pull, RuntimeError::Rejected("denied".into()));
    let mut orch = orchestrator(&client);

    let err = orch
        .run(Duration::from_secs(5), std::future::ready(()), CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, LifecycleError::PullFailed { .. }));
    let result = orch.result();
    assert_eq!(result.final_state, LifecycleState::Failed);
    assert_eq!(result.container_id, None);
}

#[tokio::test]
async fn custom_command_is_passed_to_create() {
    let client = FakeRuntimeClient::new().with_image("sha256:aaa", &["alpine:latest"]);
    let config = LifecycleConfig::default().command(vec!["sleep".into(), "infinity".into()]);
    let mut orch = Orchestrator::with_clock(client.clone(), alpine(), config, FakeClock::new());

    orch.prepare().await.unwrap();
    orch.launch().await.unwrap();

    assert!(client.calls().contains(&RuntimeCall::CreateContainer {
        image: "alpine".into(),
        command: vec!["sleep".into(), "infinity".into()],
    }));
}

#[tokio::test]
async fn tagged_image_absent_locally_is_pulled() {
    let client = FakeRuntimeClient::new().with_image("sha256:aaa", &["alpine:latest"]);
    let image = ImageRef::parse("alpine:3.18").unwrap();
    let mut orch = Orchestrator::with_clock(
        client.clone(),
        image,
        LifecycleConfig::default(),
        FakeClock::new(),
    );

    assert_eq!(orch.prepare().await.unwrap(), Provision::Pulled);
    assert_eq!(client.call_count(RuntimeOp::Pull), 1);
    assert!(client.calls().contains(&RuntimeCall::PullImage {
        image: "alpine:3.18".into()
    }));
}

#[tokio::test(start_paused = true)]
async fn cancel_after_graceful_exit_ends_stopped() {
    let client = FakeRuntimeClient::new()
        .with_stop_behavior(StopBehavior::ExitsAfter(Duration::from_secs(2)));
    let mut orch = running(&client).await;

    orch.begin_termination(Duration::from_secs(5), CancellationToken::new()).unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    orch.cancel_termination();

    assert_eq!(orch.finish_termination().await.unwrap(), TerminationOutcome::StoppedGracefully);
    assert_eq!(orch.state(), LifecycleState::Stopped);
    assert_eq!(client.call_count(RuntimeOp::Kill), 0);
}
