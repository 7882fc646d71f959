//! Scenario integration tests against a local mock TPM API.
//!
//! The mock records every request (path, query, headers) and answers with
//! canned statuses, so the tests can assert the exact wire behavior:
//! request order, header values, query parameters, and failure absorption.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tokio_util::sync::CancellationToken;

use tpmload_core::check::CheckOutcome;
use tpmload_core::config::TargetConfig;
use tpmload_scenario::ScenarioBuilder;

#[derive(Debug, Clone, PartialEq, Eq)]
struct RecordedRequest {
    path: String,
    query: Option<String>,
    authorization: Option<String>,
    idptype: Option<String>,
}

#[derive(Clone)]
struct MockState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    /// Full path (e.g. "/rest/case/rejectionReasons") that answers 503.
    fail_path: Option<String>,
}

async fn record_and_respond(State(state): State<MockState>, req: Request) -> impl IntoResponse {
    let path = req.uri().path().to_owned();
    let recorded = RecordedRequest {
        path: path.clone(),
        query: req.uri().query().map(str::to_owned),
        authorization: req
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
        idptype: req
            .headers()
            .get("idptype")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
    };
    state
        .requests
        .lock()
        .expect("mock request log poisoned")
        .push(recorded);

    if state.fail_path.as_deref() == Some(path.as_str()) {
        (StatusCode::SERVICE_UNAVAILABLE, String::new())
    } else {
        (StatusCode::OK, String::new())
    }
}

async fn spawn_mock(fail_path: Option<&str>) -> (String, Arc<Mutex<Vec<RecordedRequest>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        requests: Arc::clone(&requests),
        fail_path: fail_path.map(str::to_owned),
    };
    let app = Router::new().fallback(record_and_respond).with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock listener");
    let addr = listener.local_addr().expect("mock local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve mock");
    });
    (format!("http://{addr}"), requests)
}

fn target_for(base_url: &str) -> TargetConfig {
    TargetConfig {
        base_url: base_url.to_owned(),
        bearer_token: "abc123".to_owned(),
        idp_type: "keycloak".to_owned(),
        http_timeout_secs: 5,
    }
}

const EXPECTED_PATHS: [&str; 5] = [
    "/rest/auditLogEvents",
    "/rest/case/billingUnitsPurchaseOrders",
    "/rest/case/folders",
    "/rest/case/rejectionReasons",
    "/rest/case/scopes",
];

const EXPECTED_LABELS: [&str; 5] = [
    "Audit Log",
    "Case Billing unit purchase order",
    "Case Folder",
    "Rejection reasons",
    "Case scopes",
];

#[tokio::test]
async fn all_endpoints_pass_in_declared_order() {
    let (base_url, requests) = spawn_mock(None).await;
    let scenario = ScenarioBuilder::new()
        .target(target_for(&base_url))
        .build()
        .unwrap();

    let results = scenario.run_iteration(&CancellationToken::new()).await;

    // 5 checks, all passed, labels in declared order
    assert_eq!(results.len(), 5);
    for (result, label) in results.iter().zip(EXPECTED_LABELS) {
        assert_eq!(result.label, label);
        assert_eq!(result.outcome, CheckOutcome::Passed);
    }

    // the mock saw exactly 5 requests, in declared order
    let seen = requests.lock().unwrap();
    let paths: Vec<&str> = seen.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, EXPECTED_PATHS);

    // every request carried both headers with the exact literal values
    for request in seen.iter() {
        assert_eq!(request.authorization.as_deref(), Some("Bearer abc123"));
        assert_eq!(request.idptype.as_deref(), Some("keycloak"));
    }

    let snapshot = scenario.snapshot();
    assert_eq!(snapshot.iterations, 1);
    assert_eq!(snapshot.total_requests(), 5);
    assert_eq!(snapshot.total_passed(), 5);
    assert_eq!(snapshot.total_failed(), 0);
}

#[tokio::test]
async fn only_case_folders_carries_pagination_query() {
    let (base_url, requests) = spawn_mock(None).await;
    let scenario = ScenarioBuilder::new()
        .target(target_for(&base_url))
        .build()
        .unwrap();

    scenario.run_iteration(&CancellationToken::new()).await;

    let seen = requests.lock().unwrap();
    for request in seen.iter() {
        if request.path == "/rest/case/folders" {
            assert_eq!(request.query.as_deref(), Some("page=1&perPage=1000"));
        } else {
            assert_eq!(request.query, None, "unexpected query on {}", request.path);
        }
    }
}

#[tokio::test]
async fn non_200_records_failed_check_and_continues() {
    let (base_url, requests) = spawn_mock(Some("/rest/case/rejectionReasons")).await;
    let scenario = ScenarioBuilder::new()
        .target(target_for(&base_url))
        .build()
        .unwrap();

    let results = scenario.run_iteration(&CancellationToken::new()).await;

    // all five results present — the failure did not suppress later endpoints
    assert_eq!(results.len(), 5);
    assert_eq!(
        results[3].outcome,
        CheckOutcome::Failed { status: 503 },
        "rejection reasons should fail"
    );
    for (i, result) in results.iter().enumerate() {
        if i != 3 {
            assert_eq!(result.outcome, CheckOutcome::Passed);
        }
    }

    // all five requests actually reached the mock
    assert_eq!(requests.lock().unwrap().len(), 5);

    let snapshot = scenario.snapshot();
    assert_eq!(snapshot.total_passed(), 4);
    assert_eq!(snapshot.total_failed(), 1);
    assert_eq!(snapshot.endpoints[3].checks_failed, 1);
}

#[tokio::test]
async fn two_iterations_are_identical() {
    let (base_url, requests) = spawn_mock(None).await;
    let scenario = ScenarioBuilder::new()
        .target(target_for(&base_url))
        .build()
        .unwrap();

    let cancel = CancellationToken::new();
    scenario.run_iteration(&cancel).await;
    scenario.run_iteration(&cancel).await;

    let seen = requests.lock().unwrap();
    assert_eq!(seen.len(), 10);
    // the second pass is byte-for-byte the same sequence as the first
    assert_eq!(&seen[..5], &seen[5..]);

    assert_eq!(scenario.snapshot().iterations, 2);
}

#[tokio::test]
async fn disabled_endpoints_are_never_requested() {
    let (base_url, requests) = spawn_mock(None).await;
    let scenario = ScenarioBuilder::new()
        .target(target_for(&base_url))
        .build()
        .unwrap();

    scenario.run_iteration(&CancellationToken::new()).await;

    let disabled = [
        "/rest/case/stages",
        "/rest/categories/caseReview",
        "/rest/categories/notes",
        "/rest/countries",
        "/rest/categories/userGates",
    ];
    let seen = requests.lock().unwrap();
    for request in seen.iter() {
        assert!(
            !disabled.contains(&request.path.as_str()),
            "disabled endpoint {} was requested",
            request.path
        );
    }

    // disabled entries stay at zero in the stats
    let snapshot = scenario.snapshot();
    for endpoint in snapshot.endpoints.iter().filter(|e| !e.enabled) {
        assert_eq!(endpoint.requests, 0);
    }
}

#[tokio::test]
async fn transport_errors_do_not_abort_iteration() {
    // Bind then drop a listener so the port is closed: every request is
    // refused at the transport layer.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let scenario = ScenarioBuilder::new()
        .target(target_for(&format!("http://{addr}")))
        .build()
        .unwrap();

    let results = scenario.run_iteration(&CancellationToken::new()).await;

    // all five endpoints were still attempted
    assert_eq!(results.len(), 5);
    for result in &results {
        assert!(
            matches!(result.outcome, CheckOutcome::TransportError { .. }),
            "expected transport error for {}, got {:?}",
            result.path,
            result.outcome
        );
    }

    let snapshot = scenario.snapshot();
    assert_eq!(snapshot.total_transport_errors(), 5);
    assert_eq!(snapshot.total_passed(), 0);
    // the iteration itself still completed
    assert_eq!(snapshot.iterations, 1);
}

#[tokio::test]
async fn cancelled_token_skips_remaining_endpoints() {
    let (base_url, requests) = spawn_mock(None).await;
    let scenario = ScenarioBuilder::new()
        .target(target_for(&base_url))
        .build()
        .unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let results = scenario.run_iteration(&cancel).await;

    assert!(results.is_empty());
    assert!(requests.lock().unwrap().is_empty());
    // an interrupted pass does not count as a completed iteration
    assert_eq!(scenario.snapshot().iterations, 0);
}
