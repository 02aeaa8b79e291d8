use httpmock::prelude::*;
use httpmock::Method::PATCH;

use fpk_client::{CancelToken, ClientConfig, FlagPatchClient, PatchSubmission, PatchSubmitError};
use fpk_schemas::FlagState;
use fpk_testkit::boolean_flag;

fn client_for(server: &MockServer) -> FlagPatchClient {
    FlagPatchClient::new(ClientConfig {
        base_url: server.base_url(),
        api_token: "test-token".to_string(),
        project: "proj".to_string(),
        environment: "prod".to_string(),
    })
}

fn toggle_submission() -> PatchSubmission {
    let initial = boolean_flag().build();
    let submitted = boolean_flag().state(FlagState::On).build();
    PatchSubmission::prepare(&initial, &submitted)
        .expect("valid snapshot")
        .expect("non-empty delta")
}

#[tokio::test]
async fn scenario_backend_error_preserves_queue_for_retry() {
    let server = MockServer::start();
    let mut failing = server.mock(|when, then| {
        when.method(PATCH).path_contains("/flags/my-flag/targeting");
        then.status(500)
            .json_body(serde_json::json!({"message": "store unavailable"}));
    });

    let client = client_for(&server);
    let mut submission = toggle_submission();

    let err = submission
        .submit(&client, "my-flag", &CancelToken::never())
        .await
        .unwrap_err();
    match &err {
        PatchSubmitError::Backend { status, message } => {
            assert_eq!(*status, 500);
            assert_eq!(message, "store unavailable");
        }
        other => panic!("expected Backend, got {other}"),
    }

    // The queue survives failure: retry sends the identical payload.
    assert_eq!(submission.instruction_count(), 1);

    failing.delete();
    let ok = server.mock(|when, then| {
        when.method(PATCH)
            .path_contains("/flags/my-flag/targeting")
            .body_contains("setFeatureFlagState");
        then.status(200).json_body(serde_json::json!({"status": "ok"}));
    });

    let receipt = submission
        .submit(&client, "my-flag", &CancelToken::never())
        .await
        .expect("retry should succeed");
    ok.assert();
    assert_eq!(receipt.instruction_count, 1);
    assert_eq!(submission.instruction_count(), 0);
}

#[tokio::test]
async fn scenario_governance_veto_is_distinguished() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(PATCH).path_contains("/flags/frozen-flag/targeting");
        then.status(400).json_body(serde_json::json!({
            "message": "change window closed",
            "governanceMetadata": {"policySet": "prod-freeze", "decision": "deny"}
        }));
    });

    let client = client_for(&server);
    let mut submission = toggle_submission();

    let err = submission
        .submit(&client, "frozen-flag", &CancelToken::never())
        .await
        .unwrap_err();
    match err {
        PatchSubmitError::Governance(g) => {
            assert_eq!(g.message, "change window closed");
            assert_eq!(g.metadata["policySet"], "prod-freeze");
        }
        other => panic!("expected Governance, got {other}"),
    }
    // Governance veto is still a failure path: queue preserved.
    assert_eq!(submission.instruction_count(), 1);
}
