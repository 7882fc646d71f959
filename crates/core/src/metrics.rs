//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 시나리오와 러너는 이 상수를 사용하여 `metrics::counter!()`,
//! `metrics::gauge!()`, `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `tpmload_`
//! - 접미어: `_total` (counter), `_seconds` (histogram), 없음 (gauge)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 엔드포인트 레이블 키 (경로)
pub const LABEL_ENDPOINT: &str = "endpoint";

// ─── 요청/체크 메트릭 ──────────────────────────────────────────────

/// 발행된 전체 요청 수 (counter, label: endpoint)
pub const REQUESTS_TOTAL: &str = "tpmload_requests_total";

/// 통과한 체크 수 (counter, label: endpoint)
pub const CHECKS_PASSED_TOTAL: &str = "tpmload_checks_passed_total";

/// 실패한 체크 수 — 비-200 응답 (counter, label: endpoint)
pub const CHECKS_FAILED_TOTAL: &str = "tpmload_checks_failed_total";

/// 전송 계층 오류 수 (counter, label: endpoint)
pub const TRANSPORT_ERRORS_TOTAL: &str = "tpmload_transport_errors_total";

/// 요청 왕복 지연 시간 (histogram, 초, label: endpoint)
pub const REQUEST_DURATION_SECONDS: &str = "tpmload_request_duration_seconds";

// ─── 실행 메트릭 ───────────────────────────────────────────────────

/// 완료된 이터레이션 수 (counter)
pub const ITERATIONS_TOTAL: &str = "tpmload_iterations_total";

/// 현재 실행 중인 가상 사용자 수 (gauge)
pub const ACTIVE_VUS: &str = "tpmload_active_vus";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 요청 지연 시간 히스토그램 버킷 (초)
///
/// 5ms ~ 30s 범위, 원격 REST API 왕복 기준
pub const REQUEST_DURATION_BUCKETS: [f64; 10] =
    [0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0, 10.0, 30.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// `metrics::describe_counter!()` 등을 호출하여 Prometheus HELP 텍스트를
/// 설정합니다. 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    describe_counter!(
        REQUESTS_TOTAL,
        "Total number of HTTP requests issued per endpoint"
    );
    describe_counter!(
        CHECKS_PASSED_TOTAL,
        "Total number of status-200 checks that passed"
    );
    describe_counter!(
        CHECKS_FAILED_TOTAL,
        "Total number of status-200 checks that failed (non-200 response)"
    );
    describe_counter!(
        TRANSPORT_ERRORS_TOTAL,
        "Total number of requests that failed at the transport layer"
    );
    describe_histogram!(
        REQUEST_DURATION_SECONDS,
        "HTTP request round-trip latency in seconds"
    );
    describe_counter!(
        ITERATIONS_TOTAL,
        "Total number of completed scenario iterations across all virtual users"
    );
    describe_gauge!(ACTIVE_VUS, "Number of virtual users currently running");
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_METRIC_NAMES: &[&str] = &[
        REQUESTS_TOTAL,
        CHECKS_PASSED_TOTAL,
        CHECKS_FAILED_TOTAL,
        TRANSPORT_ERRORS_TOTAL,
        REQUEST_DURATION_SECONDS,
        ITERATIONS_TOTAL,
        ACTIVE_VUS,
    ];

    #[test]
    fn all_metrics_start_with_tpmload_prefix() {
        for name in ALL_METRIC_NAMES {
            assert!(
                name.starts_with("tpmload_"),
                "Metric '{}' does not start with 'tpmload_' prefix",
                name
            );
        }
    }

    #[test]
    fn describe_all_does_not_panic() {
        // describe_all() should not panic even without a recorder installed
        describe_all();
    }

    #[test]
    fn label_keys_are_lowercase() {
        assert_eq!(LABEL_ENDPOINT.to_lowercase(), LABEL_ENDPOINT);
    }

    #[test]
    fn request_duration_buckets_are_sorted() {
        let buckets = REQUEST_DURATION_BUCKETS;
        for i in 1..buckets.len() {
            assert!(
                buckets[i] > buckets[i - 1],
                "Bucket values must be in ascending order"
            );
        }
    }
}
