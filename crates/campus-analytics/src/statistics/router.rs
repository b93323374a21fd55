use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::catalogue::{run_report, ReportError, ReportKind};
use super::dashboard::Dashboard;
use crate::records::RecordStore;

#[derive(Debug, Default, Deserialize)]
pub struct StatisticsQuery {
    #[serde(default)]
    pub stat: Option<String>,
    /// Kept raw so a malformed value falls back to the default cap instead of
    /// rejecting the request.
    #[serde(default)]
    pub limit: Option<String>,
}

impl StatisticsQuery {
    pub fn parsed_limit(&self) -> Option<i64> {
        self.limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueEntry {
    pub name: &'static str,
    pub title: &'static str,
    pub accepts_limit: bool,
}

/// Router exposing the report catalogue over HTTP.
pub fn statistics_router<S>(store: Arc<S>) -> Router
where
    S: RecordStore + 'static,
{
    Router::new()
        .route("/api/v1/statistics", get(report_handler::<S>))
        .route("/api/v1/statistics/catalogue", get(catalogue_handler))
        .route("/api/v1/statistics/dashboard", get(dashboard_handler::<S>))
        .with_state(store)
}

pub(crate) async fn report_handler<S>(
    State(store): State<Arc<S>>,
    Query(query): Query<StatisticsQuery>,
) -> Response
where
    S: RecordStore + 'static,
{
    let limit = query.parsed_limit();
    let Some(stat) = query.stat.filter(|name| !name.trim().is_empty()) else {
        let payload = json!({ "error": "Statistic type is required" });
        return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
    };

    match run_report(store.as_ref(), &stat, limit) {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(err @ ReportError::UnknownReport(_)) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
        Err(err @ ReportError::StoreUnavailable(_)) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::SERVICE_UNAVAILABLE, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn catalogue_handler() -> Json<Vec<CatalogueEntry>> {
    let entries = ReportKind::ordered()
        .into_iter()
        .map(|kind| CatalogueEntry {
            name: kind.name(),
            title: kind.title(),
            accepts_limit: kind.accepts_limit(),
        })
        .collect();
    Json(entries)
}

pub(crate) async fn dashboard_handler<S>(State(store): State<Arc<S>>) -> Json<Dashboard>
where
    S: RecordStore + 'static,
{
    Json(Dashboard::collect_concurrently(store).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{RecordSnapshot, StoreError};
    use serde_json::Value;
    use tower::ServiceExt;

    struct OfflineStore;

    impl RecordStore for OfflineStore {
        fn snapshot(&self) -> Result<Arc<RecordSnapshot>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    struct EmptyStore;

    impl RecordStore for EmptyStore {
        fn snapshot(&self) -> Result<Arc<RecordSnapshot>, StoreError> {
            Ok(Arc::new(RecordSnapshot::default()))
        }
    }

    async fn fetch<S: RecordStore + 'static>(store: S, uri: &str) -> (StatusCode, Value) {
        let response = statistics_router(Arc::new(store))
            .oneshot(
                axum::http::Request::get(uri)
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&body).expect("json payload"))
    }

    #[tokio::test]
    async fn missing_stat_is_a_bad_request() {
        let (status, body) = fetch(EmptyStore, "/api/v1/statistics").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Statistic type is required");
    }

    #[tokio::test]
    async fn unknown_stat_is_a_bad_request() {
        let (status, body) = fetch(EmptyStore, "/api/v1/statistics?stat=doesNotExist").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("doesNotExist"));
    }

    #[tokio::test]
    async fn empty_store_returns_empty_array() {
        let (status, body) = fetch(EmptyStore, "/api/v1/statistics?stat=gradeDistribution").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Array(Vec::new()));
    }

    #[tokio::test]
    async fn offline_store_is_service_unavailable() {
        let (status, body) = fetch(OfflineStore, "/api/v1/statistics?stat=topCourses&limit=3").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("connection refused"));
    }

    #[tokio::test]
    async fn malformed_limit_is_ignored_by_unranked_reports() {
        let (status, body) =
            fetch(EmptyStore, "/api/v1/statistics?stat=gradeDistribution&limit=abc").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Array(Vec::new()));
    }

    #[tokio::test]
    async fn malformed_limit_falls_back_to_default_cap() {
        for uri in [
            "/api/v1/statistics?stat=topCourses&limit=",
            "/api/v1/statistics?stat=topCourses&limit=2.5",
        ] {
            let (status, body) = fetch(EmptyStore, uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert!(body.is_array(), "{uri}");
        }
    }

    #[tokio::test]
    async fn missing_stat_with_malformed_limit_reports_missing_stat() {
        let (status, body) = fetch(EmptyStore, "/api/v1/statistics?limit=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Statistic type is required");
    }

    #[test]
    fn raw_limits_are_parsed_leniently() {
        let query = |limit: Option<&str>| StatisticsQuery {
            stat: Some("topCourses".to_string()),
            limit: limit.map(str::to_string),
        };
        assert_eq!(query(Some(" 3 ")).parsed_limit(), Some(3));
        assert_eq!(query(Some("-2")).parsed_limit(), Some(-2));
        assert_eq!(query(Some("abc")).parsed_limit(), None);
        assert_eq!(query(Some("")).parsed_limit(), None);
        assert_eq!(query(None).parsed_limit(), None);
    }

    #[tokio::test]
    async fn catalogue_lists_every_report() {
        let (status, body) = fetch(EmptyStore, "/api/v1/statistics/catalogue").await;
        assert_eq!(status, StatusCode::OK);
        let entries = body.as_array().expect("array");
        assert_eq!(entries.len(), 12);
        assert_eq!(entries[3]["name"], "topCourses");
        assert_eq!(entries[3]["acceptsLimit"], true);
    }

    #[tokio::test]
    async fn dashboard_marks_failed_panels() {
        let (status, body) = fetch(OfflineStore, "/api/v1/statistics/dashboard").await;
        assert_eq!(status, StatusCode::OK);
        let panels = body["panels"].as_array().expect("panels");
        assert_eq!(panels.len(), 12);
        assert!(panels.iter().all(|panel| panel["status"] == "failed"));
        assert_eq!(panels[0]["report"], "studentsByYear");
    }
}
