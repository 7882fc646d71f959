//! 설정 관리 — tpmload.toml 파싱 및 런타임 설정
//!
//! [`TpmloadConfig`]는 러너와 시나리오의 모든 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`TPMLOAD_TARGET_BEARER_TOKEN=...` 형식)
//! 3. 설정 파일 (`tpmload.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), tpmload_core::error::TpmloadError> {
//! use tpmload_core::config::TpmloadConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = TpmloadConfig::load("tpmload.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = TpmloadConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, TpmloadError};

/// Tpmload 통합 설정
///
/// `tpmload.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TpmloadConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 대상 API 설정
    #[serde(default)]
    pub target: TargetConfig,
    /// 부하 설정 (가상 사용자, 반복)
    #[serde(default)]
    pub load: LoadConfig,
    /// 메트릭 엔드포인트 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// 시나리오 설정 (엔드포인트 목록)
    #[serde(default)]
    pub scenario: ScenarioConfig,
}

impl TpmloadConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, TpmloadError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, TpmloadError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TpmloadError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                TpmloadError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, TpmloadError> {
        toml::from_str(toml_str).map_err(|e| {
            TpmloadError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `TPMLOAD_{SECTION}_{FIELD}`
    /// 예: `TPMLOAD_TARGET_BEARER_TOKEN=abc123`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "TPMLOAD_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "TPMLOAD_GENERAL_LOG_FORMAT");

        // Target
        override_string(&mut self.target.base_url, "TPMLOAD_TARGET_BASE_URL");
        override_string(&mut self.target.bearer_token, "TPMLOAD_TARGET_BEARER_TOKEN");
        override_string(&mut self.target.idp_type, "TPMLOAD_TARGET_IDP_TYPE");
        override_u64(
            &mut self.target.http_timeout_secs,
            "TPMLOAD_TARGET_HTTP_TIMEOUT_SECS",
        );

        // Load
        override_u32(&mut self.load.vus, "TPMLOAD_LOAD_VUS");
        override_u64(&mut self.load.iterations, "TPMLOAD_LOAD_ITERATIONS");
        override_u64(&mut self.load.duration_secs, "TPMLOAD_LOAD_DURATION_SECS");
        override_u64(&mut self.load.pause_secs, "TPMLOAD_LOAD_PAUSE_SECS");

        // Metrics
        override_bool(&mut self.metrics.enabled, "TPMLOAD_METRICS_ENABLED");
        override_string(&mut self.metrics.listen_addr, "TPMLOAD_METRICS_LISTEN_ADDR");
        override_u16(&mut self.metrics.port, "TPMLOAD_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), TpmloadError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // base_url 검증
        if !self.target.base_url.starts_with("http://")
            && !self.target.base_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidValue {
                field: "target.base_url".to_owned(),
                reason: "must start with http:// or https://".to_owned(),
            }
            .into());
        }

        // 토큰 검증 — 파일 또는 TPMLOAD_TARGET_BEARER_TOKEN 환경변수로 주입되어야 함
        if self.target.bearer_token.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "target.bearer_token".to_owned(),
                reason: "must not be empty (set TPMLOAD_TARGET_BEARER_TOKEN)".to_owned(),
            }
            .into());
        }

        if self.target.http_timeout_secs == 0 || self.target.http_timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::InvalidValue {
                field: "target.http_timeout_secs".to_owned(),
                reason: format!("must be 1-{}", MAX_TIMEOUT_SECS),
            }
            .into());
        }

        if self.load.vus == 0 || self.load.vus > MAX_VUS {
            return Err(ConfigError::InvalidValue {
                field: "load.vus".to_owned(),
                reason: format!("must be 1-{}", MAX_VUS),
            }
            .into());
        }

        if self.load.pause_secs > MAX_PAUSE_SECS {
            return Err(ConfigError::InvalidValue {
                field: "load.pause_secs".to_owned(),
                reason: format!("must be 0-{}", MAX_PAUSE_SECS),
            }
            .into());
        }

        // 엔드포인트 목록 검증 (빈 목록이면 내장 카탈로그가 사용되므로 통과)
        if !self.scenario.endpoints.is_empty() {
            for entry in &self.scenario.endpoints {
                entry.validate()?;
            }
            if !self.scenario.endpoints.iter().any(|e| e.enabled) {
                return Err(ConfigError::InvalidValue {
                    field: "scenario.endpoints".to_owned(),
                    reason: "at least one endpoint must be enabled".to_owned(),
                }
                .into());
            }
        }

        Ok(())
    }
}

const MAX_VUS: u32 = 10_000;
const MAX_TIMEOUT_SECS: u64 = 600;
const MAX_PAUSE_SECS: u64 = 3_600;

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 대상 API 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// 대상 API 베이스 URL
    pub base_url: String,
    /// Bearer 토큰 — 환경변수 주입을 권장하며, 소스에 실제 값을 넣지 않습니다
    pub bearer_token: String,
    /// `idptype` 헤더 값
    pub idp_type: String,
    /// 요청 타임아웃 (초)
    pub http_timeout_secs: u64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api-dev3.steeleglobal.net".to_owned(),
            bearer_token: String::new(),
            idp_type: "keycloak".to_owned(),
            http_timeout_secs: 30,
        }
    }
}

/// 부하 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// 동시 가상 사용자 수
    pub vus: u32,
    /// 가상 사용자당 반복 횟수 (0 = 무제한)
    pub iterations: u64,
    /// 전체 실행 시간 제한 (초, 0 = 제한 없음)
    pub duration_secs: u64,
    /// 반복 사이 대기 시간 (초)
    pub pause_secs: u64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            vus: 1,
            iterations: 1,
            duration_secs: 0,
            pause_secs: 1,
        }
    }
}

/// 메트릭 엔드포인트 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Prometheus 스크레이프 엔드포인트 활성화 여부
    pub enabled: bool,
    /// 수신 주소
    pub listen_addr: String,
    /// 수신 포트
    pub port: u16,
    /// 스크레이프 경로
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9464,
            endpoint: "/metrics".to_owned(),
        }
    }
}

/// 시나리오 설정 — 엔드포인트 목록
///
/// 비어 있으면 시나리오 크레이트의 내장 카탈로그가 사용됩니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// 엔드포인트 항목 목록 (선언 순서가 곧 호출 순서)
    pub endpoints: Vec<EndpointEntry>,
}

/// 엔드포인트 항목 — (path, label) 쌍과 활성화 플래그
///
/// 비활성 항목은 정의만 되고 절대 호출되지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointEntry {
    /// `/rest/` 하위 경로 (선행 슬래시 없음)
    pub path: String,
    /// 사람이 읽는 레이블 (로그와 요약에 사용)
    pub label: String,
    /// 호출 여부
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 쿼리 파라미터 (key, value) 쌍 목록
    #[serde(default)]
    pub query: Vec<(String, String)>,
}

fn default_true() -> bool {
    true
}

impl EndpointEntry {
    /// 항목의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "scenario.endpoints.path".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }
        if self.path.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "scenario.endpoints.path".to_owned(),
                reason: format!("'{}' must not start with '/'", self.path),
            });
        }
        if self.label.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "scenario.endpoints.label".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }
        Ok(())
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
