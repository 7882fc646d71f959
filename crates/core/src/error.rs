//! 에러 타입 — 도메인별 에러 정의
//!
//! HTTP 요청 단위의 실패(비-200 응답, 전송 오류)는 에러가 아니라
//! 체크 결과로 기록됩니다. 여기의 에러는 실행 자체를 시작하지 못하게
//! 하는 상황(설정 오류, 클라이언트 생성 실패)만 다룹니다.

/// Tpmload 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum TpmloadError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 시나리오 구성 에러
    #[error("scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 시나리오 구성 에러
///
/// 시나리오를 조립하는 단계에서만 발생합니다. 실행 중의 요청 실패는
/// [`crate::check::CheckOutcome`]으로 흡수됩니다.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// HTTP 클라이언트 생성 실패
    #[error("failed to build http client: {reason}")]
    ClientBuild { reason: String },

    /// 대상 URL이 유효하지 않음
    #[error("invalid target url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// 활성화된 엔드포인트가 없음
    #[error("no enabled endpoints in scenario catalog")]
    NoEnabledEndpoints,
}
