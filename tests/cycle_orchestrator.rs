// tests/cycle_orchestrator.rs

use wad::engine::stats::ALL_SUCCESS_MESSAGE;
use wad::engine::{CycleReport, TriggerReason};
use wad_test_utils::builders::orchestrator_with_output;
use wad_test_utils::fakes::{FakeBuildRunner, FakeCopier, Scripted};
use wad_test_utils::{init_tracing, with_timeout};

#[tokio::test]
async fn mixed_outcomes_move_the_right_counters() {
    init_tracing();

    let (mut orch, out) =
        orchestrator_with_output(FakeBuildRunner::with_exit_codes([0, 0, 0, 1]), FakeCopier::new(2048), 10);

    with_timeout(async {
        for _ in 0..4 {
            orch.run_cycle(TriggerReason::FileChange).await;
        }
    })
    .await;

    let stats = orch.statistics();
    assert_eq!(stats.successes(), 3);
    assert_eq!(stats.failures(), 1);
    assert_eq!(stats.durations_ms().len(), 3);

    // Only successful builds deploy.
    assert_eq!(orch.copier().copies(), 3);

    let text = out.contents();
    assert_eq!(text.matches("built in").count(), 3);
    assert_eq!(text.matches("copied in").count(), 3);
    assert!(text.contains("] \u{1F44E} build failed (exit code 1)"), "{text}");
}

#[tokio::test]
async fn summary_is_emitted_on_every_tenth_success() {
    init_tracing();

    let (mut orch, out) = orchestrator_with_output(FakeBuildRunner::always_ok(), FakeCopier::new(1), 10);

    let mut summaries_at = Vec::new();
    for _ in 0..25 {
        if let CycleReport::Succeeded { index, summary, .. } = orch.run_cycle(TriggerReason::Manual).await
            && summary.is_some()
        {
            summaries_at.push(index);
        }
    }

    assert_eq!(summaries_at, vec![10, 20]);
    assert_eq!(out.contents().matches(ALL_SUCCESS_MESSAGE).count(), 2);
}

#[tokio::test]
async fn failures_do_not_advance_the_summary_threshold() {
    init_tracing();

    // Nine successes, a failure, then the tenth success.
    let mut codes = vec![0; 9];
    codes.push(2);
    codes.push(0);
    let (mut orch, out) =
        orchestrator_with_output(FakeBuildRunner::with_exit_codes(codes), FakeCopier::new(1), 10);

    let mut last = None;
    for _ in 0..11 {
        last = Some(orch.run_cycle(TriggerReason::FileChange).await);
    }

    match last {
        Some(CycleReport::Succeeded { index: 10, summary: Some(summary), .. }) => {
            assert_eq!(summary.failed_builds, 1);
            assert_eq!(summary.build_times_ms.count, 10);
        }
        other => panic!("expected the tenth success to carry a summary, got {other:?}"),
    }
    assert!(out.contents().contains("1 builds failed"));
}

#[tokio::test]
async fn invocation_error_leaves_counters_untouched() {
    init_tracing();

    let runner = FakeBuildRunner::with_exit_codes([0])
        .then(Scripted::InvocationError("sh: not found".to_string()))
        .then(Scripted::Exit(0));
    let (mut orch, out) = orchestrator_with_output(runner, FakeCopier::new(1), 10);

    orch.run_cycle(TriggerReason::Startup).await;
    let report = orch.run_cycle(TriggerReason::FileChange).await;
    assert_eq!(report, CycleReport::Aborted { class: "BuildInvocation"});

    assert_eq!(orch.statistics().successes(), 1);
    assert_eq!(orch.statistics().failures(), 0);

    // The orchestrator is usable again right away.
    let report = orch.run_cycle(TriggerReason::FileChange).await;
    assert!(matches!(report, CycleReport::Succeeded { index: 2, .. }));
    assert_eq!(orch.builder().calls(), 3);
    assert_eq!(out.contents().matches("built in").count(), 2);
}

#[tokio::test]
async fn missing_artifact_is_reported_but_build_still_counts() {
    init_tracing();

    let (mut orch, out) =
        orchestrator_with_output(FakeBuildRunner::always_ok(), FakeCopier::missing_artifact(), 10);

    let report = orch.run_cycle(TriggerReason::Manual).await;
    assert!(matches!(report, CycleReport::Succeeded { copies: 0, .. }));
    assert_eq!(orch.statistics().successes(), 1);
    assert!(out.contents().contains("deploy failed"));
}

#[tokio::test]
async fn summary_reflects_artifact_sizes_and_build_times() {
    init_tracing();

    let runner = FakeBuildRunner::always_ok().with_delay(std::time::Duration::from_millis(20));
    let (mut orch, _out) = orchestrator_with_output(runner, FakeCopier::new(2048), 3);

    let mut summary = None;
    for _ in 0..3 {
        if let CycleReport::Succeeded { summary: Some(s), .. } = orch.run_cycle(TriggerReason::Manual).await {
            summary = Some(s);
        }
    }

    let summary = summary.expect("third success should emit a summary");
    // Sizes come from the copier; the third copy happens after the summary.
    assert_eq!(summary.artifact_sizes_kb.count, 2);
    assert_eq!(summary.artifact_sizes_kb.sum, 4096);
    assert_eq!(summary.build_times_ms.count, 3);
    assert!(summary.build_times_ms.min >= 20);
    assert_eq!(summary.failed_builds, 0);
}
