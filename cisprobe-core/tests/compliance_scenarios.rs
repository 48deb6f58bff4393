mod support;

use cisprobe_core::error::ProbeError;
use cisprobe_core::gatekeeper::MISSING_TARGET;
use cisprobe_core::testing::{ScriptedCheckService, StatusReply};
use cisprobe_model::{ComplianceType, ExecutionStatus, Verdict};

use support::{
    CLEAN_OUTPUT, DIRTY_OUTPUT, RESULT_TOKEN, SUPPORTED, harness, notification,
};

#[tokio::test(start_paused = true)]
async fn other_resource_type_is_not_applicable_without_dispatch() {
    let h = harness(ScriptedCheckService::new());

    let evaluation = h
        .handler
        .handle_notification(&notification("OTHER", Some("i-123")))
        .await
        .unwrap();

    assert_eq!(evaluation.compliance_type, ComplianceType::NotApplicable);
    assert_eq!(evaluation.annotation, "Wrong resource type");
    assert!(h.checks.dispatches().await.is_empty());
    assert!(h.checks.status_queries().await.is_empty());
    assert_eq!(h.reporter.submissions().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn missing_configuration_is_insufficient_data_without_dispatch() {
    let h = harness(ScriptedCheckService::new());

    let evaluation = h
        .handler
        .handle_notification(&notification(SUPPORTED, None))
        .await
        .unwrap();

    assert_eq!(evaluation.compliance_type, ComplianceType::InsufficientData);
    assert_eq!(evaluation.annotation, MISSING_TARGET);
    assert!(h.checks.dispatches().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn empty_instance_id_is_insufficient_data_without_dispatch() {
    let h = harness(ScriptedCheckService::new());

    let evaluation = h
        .handler
        .handle_notification(&notification(SUPPORTED, Some("")))
        .await
        .unwrap();

    assert_eq!(evaluation.compliance_type, ComplianceType::InsufficientData);
    assert!(h.checks.dispatches().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn zero_non_compliant_marker_is_compliant() {
    let h = harness(ScriptedCheckService::new().with_replies([
        StatusReply::snapshot(ExecutionStatus::Success, CLEAN_OUTPUT),
    ]));

    let evaluation = h
        .handler
        .handle_notification(&notification(SUPPORTED, Some("i-123")))
        .await
        .unwrap();

    assert_eq!(evaluation.compliance_type, ComplianceType::Compliant);
    assert_eq!(evaluation.annotation, "The resource i-123 is compliant");
    assert_eq!(h.checks.dispatches().await.len(), 1);
    assert_eq!(h.checks.status_queries().await.len(), 1);

    let submissions = h.reporter.submissions().await;
    assert_eq!(submissions, vec![(evaluation, RESULT_TOKEN.to_string())]);
}

#[tokio::test(start_paused = true)]
async fn missing_marker_is_non_compliant() {
    let h = harness(ScriptedCheckService::new().with_replies([
        StatusReply::snapshot(ExecutionStatus::Success, DIRTY_OUTPUT),
    ]));

    let evaluation = h
        .handler
        .handle_notification(&notification(SUPPORTED, Some("i-123")))
        .await
        .unwrap();

    assert_eq!(evaluation.compliance_type, ComplianceType::NonCompliant);
    assert_eq!(evaluation.annotation, "The resource i-123 is NOT compliant");
}

#[tokio::test(start_paused = true)]
async fn every_terminal_failure_fails_closed() {
    for status in ExecutionStatus::TERMINAL_FAILURES {
        let h = harness(ScriptedCheckService::new().with_replies([
            StatusReply::snapshot(status, CLEAN_OUTPUT),
        ]));

        let evaluation = h
            .handler
            .handle_notification(&notification(SUPPORTED, Some("i-123")))
            .await
            .unwrap();

        assert_eq!(
            evaluation.compliance_type,
            ComplianceType::NonCompliant,
            "{status} must not be reported as compliant"
        );
        assert_eq!(
            evaluation.annotation,
            "cis-dil-benchmark scan was not successful. Resource i-123's state \
             could not be determined. Marked NON_COMPLIANT for now."
        );
    }
}

#[tokio::test(start_paused = true)]
async fn transient_unavailable_then_success_polls_twice() {
    let h = harness(ScriptedCheckService::new().with_replies([
        StatusReply::Unavailable,
        StatusReply::snapshot(ExecutionStatus::Success, "scan finished"),
    ]));

    let evaluation = h
        .handler
        .handle_notification(&notification(SUPPORTED, Some("i-123")))
        .await
        .unwrap();

    assert_eq!(evaluation.compliance_type, ComplianceType::NonCompliant);
    assert_eq!(h.checks.status_queries().await.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn dispatch_rejection_propagates_and_reports_nothing() {
    let h = harness(
        ScriptedCheckService::new().rejecting_dispatch("InvalidInstanceId"),
    );

    let err = h
        .handler
        .handle_notification(&notification(SUPPORTED, Some("i-123")))
        .await
        .unwrap_err();

    assert!(matches!(err, ProbeError::DispatchRejected(_)));
    assert!(h.checks.status_queries().await.is_empty());
    assert!(h.reporter.submissions().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn never_settling_scan_ends_in_single_undetermined_report() {
    let h = harness(ScriptedCheckService::new().with_replies([
        StatusReply::snapshot(ExecutionStatus::InProgress, ""),
    ]));

    let evaluation = h
        .handler
        .handle_notification(&notification(SUPPORTED, Some("i-123")))
        .await
        .unwrap();

    assert_eq!(evaluation.compliance_type, ComplianceType::NonCompliant);
    assert!(evaluation.annotation.contains("could not be determined"));
    assert_eq!(h.checks.status_queries().await.len(), 30);
    assert_eq!(h.reporter.submissions().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn identical_inputs_give_identical_verdicts() {
    let script = || {
        ScriptedCheckService::new().with_replies([
            StatusReply::Unavailable,
            StatusReply::snapshot(ExecutionStatus::InProgress, ""),
            StatusReply::snapshot(ExecutionStatus::Success, DIRTY_OUTPUT),
        ])
    };

    let mut verdicts: Vec<Verdict> = Vec::new();
    for _ in 0..3 {
        let h = harness(script());
        let verdict = h
            .handler
            .verdict_for(&notification(SUPPORTED, Some("i-123")))
            .await
            .unwrap();
        verdicts.push(verdict);
    }

    assert!(verdicts.windows(2).all(|pair| pair[0] == pair[1]));
}
