//! 엔드포인트 카탈로그 — (path, label) 쌍과 활성화 플래그
//!
//! 카탈로그의 선언 순서가 곧 이터레이션 내 호출 순서입니다.
//! 비활성 항목은 정의만 되고 절대 호출되지 않습니다 — 제외 사유가
//! 문서화되어 있지 않으므로 설정으로 켤 수 있게만 보존합니다.

use serde::{Deserialize, Serialize};

use tpmload_core::config::EndpointEntry;

/// 시나리오 엔드포인트 명세
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSpec {
    /// `/rest/` 하위 경로 (선행 슬래시 없음)
    pub path: String,
    /// 사람이 읽는 레이블 (로그와 요약에 사용)
    pub label: String,
    /// 쿼리 파라미터 (key, value) 쌍 — 선언 순서 유지
    pub query: Vec<(String, String)>,
    /// 호출 여부
    pub enabled: bool,
}

impl EndpointSpec {
    /// 활성 엔드포인트를 생성합니다.
    pub fn new(path: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
            query: Vec::new(),
            enabled: true,
        }
    }

    /// 쿼리 파라미터를 추가합니다.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// 비활성 상태로 표시합니다.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// 베이스 URL에 대한 요청 URL을 구성합니다 (쿼리 제외).
    ///
    /// 쿼리 파라미터는 요청 빌더 단계에서 붙입니다.
    pub fn request_url(&self, base_url: &str) -> String {
        format!("{}/rest/{}", base_url.trim_end_matches('/'), self.path)
    }
}

/// 내장 엔드포인트 카탈로그
///
/// TPM API의 고정 시나리오: 5개 활성, 5개 비활성.
/// `tpmload.toml`의 `[[scenario.endpoints]]`가 비어 있을 때 사용됩니다.
pub fn builtin_catalog() -> Vec<EndpointSpec> {
    vec![
        EndpointSpec::new("auditLogEvents", "Audit Log"),
        EndpointSpec::new(
            "case/billingUnitsPurchaseOrders",
            "Case Billing unit purchase order",
        ),
        EndpointSpec::new("case/folders", "Case Folder")
            .with_query("page", "1")
            .with_query("perPage", "1000"),
        EndpointSpec::new("case/rejectionReasons", "Rejection reasons"),
        EndpointSpec::new("case/scopes", "Case scopes"),
        EndpointSpec::new("case/stages", "Case stages").disabled(),
        EndpointSpec::new("categories/caseReview", "Case Review").disabled(),
        EndpointSpec::new("categories/notes", "Notes").disabled(),
        EndpointSpec::new("countries", "Countries").disabled(),
        EndpointSpec::new("categories/userGates", "User gates").disabled(),
    ]
}

/// core 설정의 엔드포인트 목록에서 카탈로그를 생성합니다.
///
/// 목록이 비어 있으면 [`builtin_catalog`]를 반환합니다.
pub fn catalog_from_core(entries: &[EndpointEntry]) -> Vec<EndpointSpec> {
    if entries.is_empty() {
        return builtin_catalog();
    }
    entries
        .iter()
        .map(|e| EndpointSpec {
            path: e.path.clone(),
            label: e.label.clone(),
            query: e.query.clone(),
            enabled: e.enabled,
        })
        .collect()
}
