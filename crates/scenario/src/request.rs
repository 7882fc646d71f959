//! 단일 요청 실행 — 전송, 상태 체크, 본문 로깅
//!
//! 모든 실패는 [`CheckOutcome`]으로 흡수됩니다. 이 모듈에서 에러를
//! 반환하는 경로는 없습니다.

use std::time::Instant;

use metrics::{counter, histogram};
use reqwest::Client;
use tracing::{info, warn};

use tpmload_core::check::CheckOutcome;
use tpmload_core::metrics::{
    CHECKS_FAILED_TOTAL, CHECKS_PASSED_TOTAL, LABEL_ENDPOINT, REQUEST_DURATION_SECONDS,
    REQUESTS_TOTAL, TRANSPORT_ERRORS_TOTAL,
};

use crate::endpoint::EndpointSpec;

/// 엔드포인트 하나에 GET 요청을 보내고 체크를 평가합니다.
///
/// 공유 헤더(Authorization, idptype)는 클라이언트의 기본 헤더로
/// 이미 부착되어 있습니다. 응답 본문은 체크 결과와 무관하게 로깅됩니다.
pub(crate) async fn execute(client: &Client, base_url: &str, spec: &EndpointSpec) -> CheckOutcome {
    let url = spec.request_url(base_url);
    let mut request = client.get(&url);
    if !spec.query.is_empty() {
        request = request.query(&spec.query);
    }

    counter!(REQUESTS_TOTAL, LABEL_ENDPOINT => spec.path.clone()).increment(1);

    let started = Instant::now();
    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            let reason = e.to_string();
            warn!(endpoint = %spec.path, error = %reason, "request failed at transport layer");
            counter!(TRANSPORT_ERRORS_TOTAL, LABEL_ENDPOINT => spec.path.clone()).increment(1);
            return CheckOutcome::TransportError { reason };
        }
    };

    let status = response.status().as_u16();

    // 본문은 상태와 무관하게 읽어 그대로 로깅. 읽기 실패는 로깅만 하고
    // 체크 판정(이미 상태 코드로 결정됨)은 바꾸지 않습니다.
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            warn!(endpoint = %spec.path, error = %e, "failed to read response body");
            String::new()
        }
    };
    histogram!(REQUEST_DURATION_SECONDS, LABEL_ENDPOINT => spec.path.clone())
        .record(started.elapsed().as_secs_f64());

    info!(label = %spec.label, status, body = %body, "response");

    if status == 200 {
        counter!(CHECKS_PASSED_TOTAL, LABEL_ENDPOINT => spec.path.clone()).increment(1);
        CheckOutcome::Passed
    } else {
        counter!(CHECKS_FAILED_TOTAL, LABEL_ENDPOINT => spec.path.clone()).increment(1);
        CheckOutcome::Failed { status }
    }
}
