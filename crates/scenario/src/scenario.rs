//! 시나리오 조립과 이터레이션 실행
//!
//! [`Scenario`]는 공유 HTTP 클라이언트, 엔드포인트 카탈로그, 실행 통계를
//! 묶은 단위입니다. 러너의 가상 사용자들은 하나의 `Arc<Scenario>`를
//! 공유하며 각자 [`Scenario::run_iteration`]을 반복 호출합니다.
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), tpmload_core::error::TpmloadError> {
//! use tokio_util::sync::CancellationToken;
//! use tpmload_core::config::TpmloadConfig;
//! use tpmload_scenario::ScenarioBuilder;
//!
//! let config = TpmloadConfig::load("tpmload.toml").await?;
//! let scenario = ScenarioBuilder::from_config(&config).build()?;
//!
//! let cancel = CancellationToken::new();
//! let results = scenario.run_iteration(&cancel).await;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use tpmload_core::check::CheckResult;
use tpmload_core::config::{TargetConfig, TpmloadConfig};
use tpmload_core::error::ScenarioError;
use tpmload_core::metrics::ITERATIONS_TOTAL;

use crate::endpoint::{EndpointSpec, builtin_catalog, catalog_from_core};
use crate::request;
use crate::stats::{RunStats, StatsSnapshot};

/// TPM API 부하 시나리오
///
/// 활성 엔드포인트를 선언 순서대로 호출하는 고정 시퀀스입니다.
/// 상태는 공유 통계뿐이며, 여러 태스크에서 동시에 실행해도 안전합니다.
#[derive(Debug)]
pub struct Scenario {
    /// 공유 HTTP 클라이언트 (기본 헤더: Authorization, idptype)
    client: Client,
    /// 정규화된 베이스 URL (후행 슬래시 제거)
    base_url: String,
    /// 엔드포인트 카탈로그 (비활성 항목 포함, 선언 순서)
    endpoints: Vec<EndpointSpec>,
    /// 공유 실행 통계
    stats: Arc<RunStats>,
}

impl Scenario {
    /// 빌더를 생성합니다.
    pub fn builder() -> ScenarioBuilder {
        ScenarioBuilder::new()
    }

    /// 이터레이션 하나를 실행합니다.
    ///
    /// 활성 엔드포인트를 선언 순서대로, 순차적으로 호출합니다.
    /// 어떤 요청의 실패도 다음 요청을 막지 않습니다. 취소 토큰이
    /// 발화하면 남은 엔드포인트를 건너뛰고 즉시 반환합니다 —
    /// 이 경우 이터레이션은 완료로 집계되지 않습니다.
    pub async fn run_iteration(&self, cancel: &CancellationToken) -> Vec<CheckResult> {
        let mut results = Vec::with_capacity(self.enabled_count());

        for (index, spec) in self.endpoints.iter().enumerate() {
            if !spec.enabled {
                continue;
            }
            if cancel.is_cancelled() {
                debug!("iteration interrupted by shutdown signal");
                return results;
            }

            let outcome = request::execute(&self.client, &self.base_url, spec).await;
            self.stats.record_outcome(index, &outcome);
            results.push(CheckResult::new(&spec.path, &spec.label, outcome));
        }

        self.stats.record_iteration();
        counter!(ITERATIONS_TOTAL).increment(1);
        results
    }

    /// 공유 통계에 대한 핸들을 반환합니다.
    pub fn stats(&self) -> Arc<RunStats> {
        Arc::clone(&self.stats)
    }

    /// 현재 통계 스냅샷을 반환합니다.
    pub fn snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// 엔드포인트 카탈로그를 반환합니다 (비활성 항목 포함).
    pub fn endpoints(&self) -> &[EndpointSpec] {
        &self.endpoints
    }

    /// 활성 엔드포인트 수를 반환합니다.
    pub fn enabled_count(&self) -> usize {
        self.endpoints.iter().filter(|e| e.enabled).count()
    }

    /// 정규화된 베이스 URL을 반환합니다.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// 시나리오 빌더
///
/// 대상 설정과 카탈로그를 검증하고 HTTP 클라이언트를 조립합니다.
pub struct ScenarioBuilder {
    target: TargetConfig,
    endpoints: Vec<EndpointSpec>,
}

impl ScenarioBuilder {
    /// 기본값(내장 카탈로그)으로 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            target: TargetConfig::default(),
            endpoints: builtin_catalog(),
        }
    }

    /// 전체 설정에서 빌더를 생성합니다.
    pub fn from_config(config: &TpmloadConfig) -> Self {
        Self {
            target: config.target.clone(),
            endpoints: catalog_from_core(&config.scenario.endpoints),
        }
    }

    /// 대상 설정을 지정합니다.
    pub fn target(mut self, target: TargetConfig) -> Self {
        self.target = target;
        self
    }

    /// 엔드포인트 카탈로그를 교체합니다.
    pub fn endpoints(mut self, endpoints: Vec<EndpointSpec>) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// 시나리오를 빌드합니다.
    ///
    /// # Errors
    ///
    /// - 베이스 URL이 파싱 불가능한 경우
    /// - 활성 엔드포인트가 하나도 없는 경우
    /// - HTTP 클라이언트 생성에 실패한 경우 (헤더 값 오류 포함)
    pub fn build(self) -> Result<Scenario, ScenarioError> {
        reqwest::Url::parse(&self.target.base_url).map_err(|e| ScenarioError::InvalidUrl {
            url: self.target.base_url.clone(),
            reason: e.to_string(),
        })?;

        if !self.endpoints.iter().any(|e| e.enabled) {
            return Err(ScenarioError::NoEnabledEndpoints);
        }

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", self.target.bearer_token))
            .map_err(|e| ScenarioError::ClientBuild {
                reason: format!("invalid bearer token: {e}"),
            })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            HeaderName::from_static("idptype"),
            HeaderValue::from_str(&self.target.idp_type).map_err(|e| {
                ScenarioError::ClientBuild {
                    reason: format!("invalid idp_type value: {e}"),
                }
            })?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(self.target.http_timeout_secs))
            .user_agent(concat!("tpmload/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ScenarioError::ClientBuild {
                reason: e.to_string(),
            })?;

        let base_url = self.target.base_url.trim_end_matches('/').to_owned();
        let stats = Arc::new(RunStats::new(&self.endpoints));

        Ok(Scenario {
            client,
            base_url,
            endpoints: self.endpoints,
            stats,
        })
    }
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}
