use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use smegrowth_core::client::{
    ApiClient, ApiError, ApiErrorKind, DashboardSource, PredictionService,
};
use smegrowth_core::dashboard::{DashboardView, RefreshOutcome};
use smegrowth_core::domain::category::Category;
use smegrowth_core::form::{build_request, FieldKey, PredictionRequest, RawForm, FIELDS};
use smegrowth_core::present::present;
use smegrowth_core::report::{DirectorySink, ExportError, ReportExporter, ReportSource};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

async fn serve(app: Router) -> ApiClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    ApiClient::new(format!("http://{addr}"), Duration::from_secs(5)).unwrap()
}

fn complete_request() -> PredictionRequest {
    let raw: RawForm = FIELDS
        .iter()
        .map(|def| {
            let value = match def.key {
                FieldKey::Location => "1.5",
                FieldKey::EnterpriseAge => "12",
                _ => "3",
            };
            (def.key, value)
        })
        .collect();
    build_request(&raw, "Medium").unwrap()
}

fn predict_route(status: StatusCode, body: &'static str) -> Router {
    Router::new().route(
        "/api/predict",
        post(move || async move { (status, [(header::CONTENT_TYPE, "application/json")], body) }),
    )
}

fn history_body() -> Value {
    json!({
        "status": "success",
        "count": 3,
        "predictions": [
            {
                "id": 12,
                "timestamp": "2025-06-01 12:30:00",
                "prediction": "High",
                "confidence_scores": {"High": 0.7, "Medium": 0.2, "Low": 0.1},
                "enterprise_size": "Medium",
                "enterprise_age": 8
            },
            {
                "id": 11,
                "timestamp": "2025-06-01 09:00:00",
                "prediction": "Low",
                "confidence_scores": {"High": 0.1, "Medium": 0.3, "Low": 0.6},
                "enterprise_size": null,
                "enterprise_age": null
            },
            {
                "id": 10,
                "timestamp": "2025-05-30 18:15:00",
                "prediction": "High",
                "confidence_scores": {"High": 0.5, "Medium": 0.3, "Low": 0.2},
                "enterprise_size": "Small",
                "enterprise_age": 3
            }
        ]
    })
}

fn statistics_body() -> Value {
    json!({
        "status": "success",
        "statistics": {
            "total_predictions": 8,
            "distribution": {"High": 4, "Medium": 3, "Low": 1},
            "percentages": {"High": 50.0, "Medium": 37.5, "Low": 12.5},
            "average_confidence": {"High": 0.66, "Medium": 0.51, "Low": 0.6},
            "size_distribution": {"Small": 2, "Medium": 5},
            "recent_predictions_7days": 3
        }
    })
}

fn dashboard_routes() -> Router {
    history_routes().route("/api/dashboard/stats", get(|| async { Json(statistics_body()) }))
}

fn history_routes() -> Router {
    Router::new()
        .route(
            "/api/dashboard/history",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                let limit: usize = q.get("limit").and_then(|l| l.parse().ok()).unwrap_or(100);
                let mut body = history_body();
                let predictions = body["predictions"].as_array_mut().unwrap();
                predictions.truncate(limit);
                let count = predictions.len();
                body["count"] = json!(count);
                Json(body)
            }),
        )
        .route(
            "/api/dashboard/prediction/:id",
            get(|Path(id): Path<i64>| async move {
                let body = history_body();
                let found = body["predictions"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .find(|p| p["id"] == json!(id))
                    .cloned();
                match found {
                    Some(prediction) => {
                        (StatusCode::OK, Json(json!({"status": "success", "prediction": prediction})))
                    }
                    None => (
                        StatusCode::NOT_FOUND,
                        Json(json!({"detail": "Prediction not found"})),
                    ),
                }
            }),
        )
}

#[tokio::test]
async fn submit_sends_business_labels_and_presents_the_answer() {
    let captured = Arc::new(Mutex::new(None::<Value>));
    let app = Router::new()
        .route(
            "/api/predict",
            post(
                |State(captured): State<Arc<Mutex<Option<Value>>>>, Json(body): Json<Value>| async move {
                    *captured.lock().unwrap() = Some(body);
                    Json(json!({
                        "prediction": "High",
                        "confidence_scores": {"High": 0.62, "Medium": 0.25, "Low": 0.13},
                        "message": "Prediction successful"
                    }))
                },
            ),
        )
        .with_state(captured.clone());
    let client = serve(app).await;

    let response = client.submit(&complete_request()).await.unwrap();
    assert_eq!(response.prediction, Category::High);
    assert_eq!(response.message.as_deref(), Some("Prediction successful"));

    let sent = captured.lock().unwrap().clone().unwrap();
    let sent = sent.as_object().unwrap();
    assert_eq!(sent.len(), 12);
    assert_eq!(sent["Small/Medium/Large"], json!("Medium"));
    assert_eq!(sent["Enterprise_Age"], json!(12));
    assert_eq!(sent["Location"], json!(1.5));
    assert_eq!(sent["About Enterprises, Owners Motivation"], json!(3));

    let presented = present(&response);
    let order: Vec<_> = presented
        .breakdown
        .iter()
        .map(|e| (e.category, e.percentage))
        .collect();
    assert_eq!(
        order,
        vec![
            (Category::High, 62.0),
            (Category::Medium, 25.0),
            (Category::Low, 13.0)
        ]
    );
}

#[tokio::test]
async fn rejected_request_surfaces_service_detail() {
    let client = serve(predict_route(
        StatusCode::BAD_REQUEST,
        r#"{"detail":"Missing required features: ['Enterprise_Age']"}"#,
    ))
    .await;

    let err = client.submit(&complete_request()).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Service {
            status: 400,
            message: "Missing required features: ['Enterprise_Age']".to_string(),
        }
    );
}

#[tokio::test]
async fn server_error_is_a_service_error() {
    let client = serve(predict_route(StatusCode::INTERNAL_SERVER_ERROR, "")).await;

    let err = client.submit(&complete_request()).await.unwrap_err();
    assert_eq!(err.kind(), ApiErrorKind::Service);
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn malformed_answers_are_protocol_errors() {
    let bodies = [
        r#"{"prediction":"High","confidence_scores":{"High":0.5,"Medium":0.3,"Low":0.3}}"#,
        r#"{"prediction":"Very High","confidence_scores":{"High":0.6,"Medium":0.3,"Low":0.1}}"#,
        r#"{"prediction":"Low","confidence_scores":{"High":0.6,"Medium":0.3,"Low":0.1}}"#,
        r#"{"prediction":"High","confidence_scores":{"High":0.6,"Medium":0.4}}"#,
        r#"<html>gateway</html>"#,
    ];
    for body in bodies {
        let client = serve(predict_route(StatusCode::OK, body)).await;
        let err = client.submit(&complete_request()).await.unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::Protocol, "body {body}");
    }
}

#[tokio::test]
async fn unreachable_service_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    let err = client.submit(&complete_request()).await.unwrap_err();
    assert_eq!(err.kind(), ApiErrorKind::Network);

    let err = client.fetch_statistics().await.unwrap_err();
    assert_eq!(err.kind(), ApiErrorKind::Network);
}

#[tokio::test]
async fn history_is_parsed_and_capped() {
    let client = serve(dashboard_routes()).await;

    let records = client.fetch_history(20).await.unwrap();
    let ids: Vec<_> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![12, 11, 10]);
    assert_eq!(records[0].timestamp.to_rfc3339(), "2025-06-01T12:30:00+00:00");
    assert_eq!(records[1].enterprise_size, None);
    assert_eq!(records[2].enterprise_age, Some(3));

    let records = client.fetch_history(2).await.unwrap();
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn history_longer_than_limit_is_rejected() {
    let app = Router::new().route("/api/dashboard/history", get(|| async { Json(history_body()) }));
    let client = serve(app).await;

    let err = client.fetch_history(1).await.unwrap_err();
    assert_eq!(err.kind(), ApiErrorKind::Protocol);
}

#[tokio::test]
async fn statistics_are_normalized() {
    let client = serve(dashboard_routes()).await;

    let stats = client.fetch_statistics().await.unwrap();
    assert_eq!(stats.overall.total_predictions, 8);
    assert_eq!(stats.overall.count(Category::Medium), 3);
    assert_eq!(stats.overall.percentage(Category::Low), 12.5);
    assert_eq!(*stats.average_confidence.get(Category::High), Some(0.66));
    assert_eq!(stats.size_distribution.get("Medium"), Some(&5));
    assert_eq!(stats.recent_predictions_7days, 3);
}

#[tokio::test]
async fn single_record_lookup() {
    let client = serve(dashboard_routes()).await;

    let record = client.fetch_record(11).await.unwrap().unwrap();
    assert_eq!(record.prediction, Category::Low);
    assert_eq!(present(&record.as_response()).dominant_percentage, 60.0);

    assert!(client.fetch_record(99).await.unwrap().is_none());
}

#[tokio::test]
async fn dashboard_refresh_over_http() {
    let client = serve(dashboard_routes()).await;
    let mut view = DashboardView::new(2);

    assert_eq!(view.refresh(&client).await, RefreshOutcome::Applied);
    let snapshot = view.snapshot().unwrap();
    assert_eq!(snapshot.overall.overall.total_predictions, 8);
    assert_eq!(snapshot.charts.pie[0].value, 4);
    assert_eq!(snapshot.rows.len(), 2);
    assert_eq!(snapshot.recent.count(Category::High), 1);
    assert_eq!(snapshot.recent.count(Category::Low), 1);
    assert_eq!(snapshot.rows[1].enterprise_size, "N/A");
}

#[tokio::test]
async fn dashboard_fails_when_statistics_fail() {
    let app = history_routes().route(
        "/api/dashboard/stats",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database is locked") }),
    );
    let client = serve(app).await;
    let mut view = DashboardView::new(20);

    match view.refresh(&client).await {
        RefreshOutcome::Failed(err) => {
            assert_eq!(
                err,
                ApiError::Service {
                    status: 500,
                    message: "database is locked".to_string(),
                }
            );
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(view.snapshot().is_none());
}

fn report_routes() -> Router {
    Router::new().route(
        "/api/dashboard/report/:id",
        get(|Path(id): Path<i64>| async move {
            match id {
                7 => (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, "application/pdf")],
                    b"%PDF-1.4 report 7".to_vec(),
                )
                    .into_response(),
                13 => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"detail": "render failed"})))
                    .into_response(),
                _ => (StatusCode::NOT_FOUND, Json(json!({"detail": "Prediction not found"})))
                    .into_response(),
            }
        }),
    )
}

#[tokio::test]
async fn report_is_downloaded_into_the_target_directory() {
    let client = serve(report_routes()).await;
    let dir = tempfile::TempDir::new().unwrap();
    let exporter = ReportExporter::new(client, DirectorySink::new(dir.path()));

    let exported = exporter.export(7).await.unwrap();
    assert_eq!(exported.path, dir.path().join("sme_prediction_report_7.pdf"));
    assert_eq!(exported.bytes, 17);
    assert_eq!(std::fs::read(&exported.path).unwrap(), b"%PDF-1.4 report 7");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn report_errors_are_classified() {
    let client = serve(report_routes()).await;

    let artifact = client.fetch_report(7).await.unwrap();
    assert_eq!(artifact.content_type.as_deref(), Some("application/pdf"));

    assert_eq!(
        client.fetch_report(404).await.unwrap_err(),
        ExportError::NotFound { prediction_id: 404 }
    );
    match client.fetch_report(13).await.unwrap_err() {
        ExportError::Unknown { message } => assert!(message.contains("render failed"), "{message}"),
        other => panic!("expected Unknown, got {other:?}"),
    }
}

#[tokio::test]
async fn non_document_report_is_not_saved() {
    let app = Router::new().route(
        "/api/dashboard/report/:id",
        get(|| async {
            (
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                "<html>login required</html>",
            )
        }),
    );
    let client = serve(app).await;
    let dir = tempfile::TempDir::new().unwrap();
    let exporter = ReportExporter::new(client, DirectorySink::new(dir.path()));

    match exporter.export(3).await.unwrap_err() {
        ExportError::Unknown { message } => assert!(message.contains("text/html"), "{message}"),
        other => panic!("expected Unknown, got {other:?}"),
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn missing_report_leaves_directory_untouched() {
    let client = serve(report_routes()).await;
    let dir = tempfile::TempDir::new().unwrap();
    let exporter = ReportExporter::new(client, DirectorySink::new(dir.path()));

    let err = exporter.export(5).await.unwrap_err();
    assert_eq!(err, ExportError::NotFound { prediction_id: 5 });
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn concurrent_exports_write_separate_files() {
    let app = Router::new().route(
        "/api/dashboard/report/:id",
        get(|Path(id): Path<i64>| async move { format!("%PDF-1.4 report {id}").into_bytes() }),
    );
    let client = serve(app).await;
    let dir = tempfile::TempDir::new().unwrap();
    let exporter = ReportExporter::new(client, DirectorySink::new(dir.path()));

    let (a, b) = tokio::join!(exporter.export(1), exporter.export(2));
    let a = a.unwrap();
    let b = b.unwrap();
    assert_eq!(std::fs::read(a.path).unwrap(), b"%PDF-1.4 report 1");
    assert_eq!(std::fs::read(b.path).unwrap(), b"%PDF-1.4 report 2");
}

#[tokio::test]
async fn health_probe() {
    let app = Router::new().route(
        "/health",
        get(|| async { Json(json!({"status": "healthy", "message": "API is running"})) }),
    );
    let client = serve(app).await;

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.message.as_deref(), Some("API is running"));
}
