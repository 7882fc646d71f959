//! 실행 통계 — 가상 사용자 간 공유되는 카운터
//!
//! [`RunStats`]는 `Arc`로 모든 가상 사용자에 공유되며, 엔드포인트별
//! 카운터를 원자적으로 누적합니다. 실행 종료 시 [`StatsSnapshot`]으로
//! 고정하여 요약 보고서에 사용합니다.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use tpmload_core::check::CheckOutcome;

use crate::endpoint::EndpointSpec;

/// 엔드포인트 하나의 누적 카운터
#[derive(Debug)]
struct EndpointCounters {
    path: String,
    label: String,
    enabled: bool,
    requests: AtomicU64,
    checks_passed: AtomicU64,
    checks_failed: AtomicU64,
    transport_errors: AtomicU64,
}

/// 실행 전체의 공유 통계
#[derive(Debug)]
pub struct RunStats {
    endpoints: Vec<EndpointCounters>,
    iterations: AtomicU64,
}

impl RunStats {
    /// 카탈로그와 같은 순서의 카운터 세트를 생성합니다.
    pub fn new(catalog: &[EndpointSpec]) -> Self {
        let endpoints = catalog
            .iter()
            .map(|spec| EndpointCounters {
                path: spec.path.clone(),
                label: spec.label.clone(),
                enabled: spec.enabled,
                requests: AtomicU64::new(0),
                checks_passed: AtomicU64::new(0),
                checks_failed: AtomicU64::new(0),
                transport_errors: AtomicU64::new(0),
            })
            .collect();
        Self {
            endpoints,
            iterations: AtomicU64::new(0),
        }
    }

    /// 요청 하나의 판정을 기록합니다.
    ///
    /// `index`는 카탈로그 내 위치입니다 (비활성 항목 포함).
    pub fn record_outcome(&self, index: usize, outcome: &CheckOutcome) {
        let Some(counters) = self.endpoints.get(index) else {
            return;
        };
        counters.requests.fetch_add(1, Ordering::Relaxed);
        match outcome {
            CheckOutcome::Passed => {
                counters.checks_passed.fetch_add(1, Ordering::Relaxed);
            }
            CheckOutcome::Failed { .. } => {
                counters.checks_failed.fetch_add(1, Ordering::Relaxed);
            }
            CheckOutcome::TransportError { .. } => {
                counters.transport_errors.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// 완료된 이터레이션 하나를 기록합니다.
    pub fn record_iteration(&self) {
        self.iterations.fetch_add(1, Ordering::Relaxed);
    }

    /// 지금까지 완료된 이터레이션 수를 반환합니다.
    pub fn iterations(&self) -> u64 {
        self.iterations.load(Ordering::Relaxed)
    }

    /// 현재 카운터 값을 고정한 스냅샷을 생성합니다.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            iterations: self.iterations.load(Ordering::Relaxed),
            endpoints: self
                .endpoints
                .iter()
                .map(|c| EndpointStats {
                    path: c.path.clone(),
                    label: c.label.clone(),
                    enabled: c.enabled,
                    requests: c.requests.load(Ordering::Relaxed),
                    checks_passed: c.checks_passed.load(Ordering::Relaxed),
                    checks_failed: c.checks_failed.load(Ordering::Relaxed),
                    transport_errors: c.transport_errors.load(Ordering::Relaxed),
                })
                .collect(),
        }
    }
}

/// 실행 통계 스냅샷
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    /// 완료된 이터레이션 수 (전체 가상 사용자 합계)
    pub iterations: u64,
    /// 엔드포인트별 통계 (카탈로그 순서)
    pub endpoints: Vec<EndpointStats>,
}

impl StatsSnapshot {
    /// 전체 요청 수
    pub fn total_requests(&self) -> u64 {
        self.endpoints.iter().map(|e| e.requests).sum()
    }

    /// 전체 통과 체크 수
    pub fn total_passed(&self) -> u64 {
        self.endpoints.iter().map(|e| e.checks_passed).sum()
    }

    /// 전체 실패 체크 수 (비-200 응답)
    pub fn total_failed(&self) -> u64 {
        self.endpoints.iter().map(|e| e.checks_failed).sum()
    }

    /// 전체 전송 오류 수
    pub fn total_transport_errors(&self) -> u64 {
        self.endpoints.iter().map(|e| e.transport_errors).sum()
    }
}

/// 엔드포인트 하나의 통계 스냅샷
#[derive(Debug, Clone, Serialize)]
pub struct EndpointStats {
    /// 엔드포인트 경로
    pub path: String,
    /// 엔드포인트 레이블
    pub label: String,
    /// 활성화 여부
    pub enabled: bool,
    /// 발행된 요청 수
    pub requests: u64,
    /// 통과한 체크 수
    pub checks_passed: u64,
    /// 실패한 체크 수
    pub checks_failed: u64,
    /// 전송 오류 수
    pub transport_errors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::builtin_catalog;

    #[test]
    fn new_stats_are_zero() {
        let stats = RunStats::new(&builtin_catalog());
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.iterations, 0);
        assert_eq!(snapshot.total_requests(), 0);
        assert_eq!(snapshot.endpoints.len(), 10);
    }

    #[test]
    fn record_outcome_accumulates_per_endpoint() {
        let stats = RunStats::new(&builtin_catalog());
        stats.record_outcome(0, &CheckOutcome::Passed);
        stats.record_outcome(0, &CheckOutcome::Failed { status: 503 });
        stats.record_outcome(
            1,
            &CheckOutcome::TransportError {
                reason: "connection refused".to_owned(),
            },
        );

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.endpoints[0].requests, 2);
        assert_eq!(snapshot.endpoints[0].checks_passed, 1);
        assert_eq!(snapshot.endpoints[0].checks_failed, 1);
        assert_eq!(snapshot.endpoints[1].requests, 1);
        assert_eq!(snapshot.endpoints[1].transport_errors, 1);
        assert_eq!(snapshot.total_requests(), 3);
    }

    #[test]
    fn record_outcome_out_of_range_is_ignored() {
        let stats = RunStats::new(&builtin_catalog());
        stats.record_outcome(999, &CheckOutcome::Passed);
        assert_eq!(stats.snapshot().total_requests(), 0);
    }

    #[test]
    fn record_iteration_counts() {
        let stats = RunStats::new(&builtin_catalog());
        stats.record_iteration();
        stats.record_iteration();
        assert_eq!(stats.iterations(), 2);
    }

    #[test]
    fn stats_are_send_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<RunStats>();
        assert_send_sync::<StatsSnapshot>();
    }
}
