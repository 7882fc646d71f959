//! 체크 타입 — 요청별 pass/fail 판정 결과
//!
//! 체크는 응답에 대한 불리언 단언으로, 제어 흐름에 영향을 주지 않고
//! 통계와 메트릭에만 기록됩니다. 비-200 응답도, 전송 오류도
//! 이터레이션을 중단시키지 않습니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 상태 코드 체크의 고정 이름
///
/// 모든 엔드포인트에 동일한 단언이 적용됩니다: 응답 상태가 200인가.
pub const STATUS_CHECK_NAME: &str = "status is 200";

/// 단일 요청의 체크 판정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckOutcome {
    /// 상태 200 — 체크 통과
    Passed,
    /// 200이 아닌 상태 코드 수신 — 체크 실패, 실행은 계속
    Failed {
        /// 수신한 HTTP 상태 코드
        status: u16,
    },
    /// 응답을 받지 못함 (DNS, 연결 거부, TLS, 타임아웃 등)
    TransportError {
        /// 전송 계층 오류 설명
        reason: String,
    },
}

impl CheckOutcome {
    /// 체크 통과 여부를 반환합니다.
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// 판정 분류명을 반환합니다 (로깅/메트릭 레이블용).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed { .. } => "failed",
            Self::TransportError { .. } => "transport_error",
        }
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Failed { status } => write!(f, "failed (status {status})"),
            Self::TransportError { reason } => write!(f, "transport error: {reason}"),
        }
    }
}

/// 엔드포인트 하나에 대한 체크 결과 레코드
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// 엔드포인트 경로
    pub path: String,
    /// 엔드포인트 레이블
    pub label: String,
    /// 판정
    pub outcome: CheckOutcome,
}

impl CheckResult {
    /// 새 체크 결과를 생성합니다.
    pub fn new(path: impl Into<String>, label: impl Into<String>, outcome: CheckOutcome) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
            outcome,
        }
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", STATUS_CHECK_NAME, self.label, self.outcome)
    }
}
