use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::Notify;

use mastro_dashboard::commands::{self, ListArgs};
use mastro_dashboard::config::Config;
use mastro_dashboard::dashboard::Dashboard;
use mastro_dashboard::fetch::{FetchError, Fetcher, HttpFetcher, Request};
use mastro_dashboard::locator::{
    override_key, ServiceLocator, CATALOGUE, FEATURESTORE, KAFKA_CONNECT, KAFKA_SCHEMA_REGISTRY,
};
use mastro_dashboard::view::render_list;

/// Serve `app` on an ephemeral local port and return its base URL.
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A dashboard talking HTTP to `service` at `url`.
fn dashboard(service: &str, url: &str) -> Dashboard {
    let config = Config::default();
    let fetcher = HttpFetcher::new(&config.http).unwrap();
    let locator = ServiceLocator::with_env([(override_key(service), url.to_string())]);
    Dashboard::new(&config, Arc::new(fetcher), locator)
}

fn envelope(items: Vec<Value>, total: usize, page: usize, per_page: usize) -> Value {
    json!({
        "data": items,
        "pagination": {
            "total": total,
            "page": page,
            "perPage": per_page,
            "totalPage": total.div_ceil(per_page),
        }
    })
}

async fn asset_by_name(Path(name): Path<String>) -> Response {
    if name == "mytable" {
        Json(envelope(vec![json!({"name": "mytable", "type": "table"})], 1, 1, 8)).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "not found"})),
        )
            .into_response()
    }
}

type Bodies = Arc<Mutex<Vec<Value>>>;

async fn assets_by_tags(State(bodies): State<Bodies>, Json(body): Json<Value>) -> Json<Value> {
    bodies.lock().unwrap().push(body);
    Json(envelope(
        vec![
            json!({"name": "orders", "type": "table", "tags": ["sales", "daily"]}),
            json!({"name": "refunds", "type": "table", "tags": ["sales"]}),
        ],
        2,
        1,
        8,
    ))
}

fn catalogue(bodies: Bodies) -> Router {
    Router::new()
        .route("/asset/name/{name}", get(asset_by_name))
        .route("/assets/tags", post(assets_by_tags))
        .with_state(bodies)
}

#[tokio::test]
async fn test_search_mytable_end_to_end() {
    let url = serve(catalogue(Bodies::default())).await;
    let dashboard = dashboard(CATALOGUE, &url);

    dashboard.search.submit("mytable").await;
    let state = dashboard.search.snapshot().await;

    assert_eq!(state.items().len(), 1);
    assert_eq!(state.items()[0].name, "mytable");
    let out = render_list(&state, "No assets found");
    assert!(out.starts_with("Page 1 of 1, 1 results found."));
    assert!(out.contains("mytable [table]"));
}

#[tokio::test]
async fn test_missing_asset_reports_server_message() {
    let url = serve(catalogue(Bodies::default())).await;
    let dashboard = dashboard(CATALOGUE, &url);

    dashboard.asset.submit("nope").await;
    let state = dashboard.asset.snapshot().await;
    let err = state.error().unwrap();
    assert_eq!(err.status, Some(404));
    assert_eq!(err.message, "Not Found: not found");

    let report = commands::run_asset(&dashboard, "nope").await.unwrap();
    assert!(!report.ok);
    assert_eq!(report.text, "error: Not Found: not found");
}

#[tokio::test]
async fn test_tag_search_posts_tag_list() {
    let bodies = Bodies::default();
    let url = serve(catalogue(bodies.clone())).await;
    let dashboard = dashboard(CATALOGUE, &url);

    let report = commands::run_search(&dashboard, "#sales, #daily", &ListArgs::default())
        .await
        .unwrap();
    assert!(report.ok);
    assert!(report.text.contains("orders [table]"));
    assert!(report.text.contains("refunds [table]"));

    let seen = bodies.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![json!({"tags": ["sales", "daily"], "limit": 8, "page": 1})]
    );
}

type Calls = Arc<Mutex<Vec<(String, HashMap<String, String>)>>>;

async fn featuresets_by_name(
    State(calls): State<Calls>,
    Path(name): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let limit: usize = params.get("limit").and_then(|v| v.parse().ok()).unwrap_or(8);
    let page: usize = params.get("page").and_then(|v| v.parse().ok()).unwrap_or(1);
    calls.lock().unwrap().push((name.clone(), params));

    let total = 7;
    let items = (0..total)
        .skip((page - 1) * limit)
        .take(limit)
        .map(|i| json!({"name": name, "version": i.to_string(), "features": []}))
        .collect();
    Json(envelope(items, total, page, limit))
}

#[tokio::test]
async fn test_featuresets_pass_limit_and_page() {
    let calls = Calls::default();
    let app = Router::new()
        .route("/featureset/name/{name}", get(featuresets_by_name))
        .with_state(calls.clone());
    let url = serve(app).await;
    let dashboard = dashboard(FEATURESTORE, &url);

    let args = ListArgs {
        limit: Some(3),
        page: Some(2),
        select: Some("orders@4".into()),
    };
    let report = commands::run_featuresets(&dashboard, "orders", &args)
        .await
        .unwrap();
    assert!(report.text.starts_with("Page 2 of 3, 7 results found."));
    assert!(report.text.contains("* orders v4"));

    let seen: Vec<(String, String, String)> = calls
        .lock()
        .unwrap()
        .iter()
        .map(|(name, p)| (name.clone(), p["limit"].clone(), p["page"].clone()))
        .collect();
    assert_eq!(
        seen,
        vec![
            ("orders".into(), "3".into(), "1".into()),
            ("orders".into(), "3".into(), "2".into()),
        ]
    );
}

fn connector_listing(names: &[&str]) -> Value {
    let mut listing = serde_json::Map::new();
    for name in names {
        listing.insert(
            name.to_string(),
            json!({
                "status": {
                    "name": name,
                    "connector": {"state": "RUNNING", "worker_id": "10.0.0.1:8083"},
                    "tasks": [{"id": 0, "state": "RUNNING", "worker_id": "10.0.0.1:8083"}],
                    "type": "source"
                },
                "info": {
                    "name": name,
                    "config": {"connector.class": "io.debezium.connector.postgresql.PostgresConnector"},
                    "type": "source"
                }
            }),
        );
    }
    Value::Object(listing)
}

#[tokio::test]
async fn test_connectors_page_on_the_client() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/connectors",
        get(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Json(connector_listing(&["e", "d", "c", "b", "a"]))
            }
        }),
    );
    let url = serve(app).await;
    let dashboard = dashboard(KAFKA_CONNECT, &url);

    dashboard.connectors.submit("").await;
    let state = dashboard.connectors.snapshot().await;
    let names: Vec<&str> = state.items().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c", "d"]);
    assert_eq!(state.pagination().unwrap().total_page, 2);

    dashboard.connectors.goto_page(2).await.unwrap();
    let state = dashboard.connectors.snapshot().await;
    let names: Vec<&str> = state.items().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["e"]);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unknown_connector_is_an_error() {
    let app = Router::new().route(
        "/connectors",
        get(|| async { Json(connector_listing(&["a"])) }),
    );
    let url = serve(app).await;
    let dashboard = dashboard(KAFKA_CONNECT, &url);

    let report = commands::run_connectors(&dashboard, Some("zzz"), &ListArgs::default())
        .await
        .unwrap();
    assert!(!report.ok);
    assert_eq!(report.text, "error: no connector named zzz found");
}

#[tokio::test]
async fn test_connector_restart_targets_failed_tasks() {
    let queries: Arc<Mutex<Vec<(String, HashMap<String, String>)>>> = Default::default();
    let seen = queries.clone();
    let app = Router::new().route(
        "/connectors/{name}/restart",
        post(
            move |Path(name): Path<String>, Query(params): Query<HashMap<String, String>>| {
                let seen = seen.clone();
                async move {
                    seen.lock().unwrap().push((name, params));
                    StatusCode::NO_CONTENT
                }
            },
        ),
    );
    let url = serve(app).await;
    let dashboard = dashboard(KAFKA_CONNECT, &url);

    dashboard.restart_connector("pg-source").await.unwrap();

    let seen = queries.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "pg-source");
    assert_eq!(seen[0].1["includeTasks"], "true");
    assert_eq!(seen[0].1["onlyFailed"], "true");
}

async fn latest_schema(Path(subject): Path<String>) -> Response {
    if subject == "broken" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "boom"})),
        )
            .into_response();
    }
    Json(json!({
        "subject": subject,
        "version": 3,
        "id": 21,
        "schema": "{\"type\":\"string\"}"
    }))
    .into_response()
}

#[tokio::test]
async fn test_schema_listing_fans_out_and_skips_failures() {
    let app = Router::new()
        .route(
            "/subjects",
            get(|| async { Json(json!(["payments-value", "broken", "orders-value"])) }),
        )
        .route("/subjects/{subject}/versions/latest", get(latest_schema));
    let url = serve(app).await;
    let dashboard = dashboard(KAFKA_SCHEMA_REGISTRY, &url);

    dashboard.schemas.submit("").await;
    let state = dashboard.schemas.snapshot().await;
    let subjects: Vec<&str> = state.items().iter().map(|s| s.subject.as_str()).collect();
    assert_eq!(subjects, vec!["orders-value", "payments-value"]);
    assert_eq!(state.items()[0].schema_type, "AVRO");

    let out = render_list(&state, "No schemas found");
    assert!(out.starts_with("Page 1 of 1, 2 results found."));
}

#[tokio::test]
async fn test_single_schema_subject() {
    let app = Router::new().route("/subjects/{subject}/versions/latest", get(latest_schema));
    let url = serve(app).await;
    let dashboard = dashboard(KAFKA_SCHEMA_REGISTRY, &url);

    let report = commands::run_schemas(&dashboard, Some("orders-value"), &ListArgs::default())
        .await
        .unwrap();
    assert!(report.ok);
    assert!(report.text.contains("orders-value v3 id=21 [AVRO]"));
}

/// Holds back the request for `"slow"` until released.
struct Gated {
    release: Arc<Notify>,
}

#[async_trait]
impl Fetcher for Gated {
    async fn fetch(&self, request: Request) -> Result<Value, FetchError> {
        let name = request.url.rsplit('/').next().unwrap_or_default().to_string();
        if name == "slow" {
            self.release.notified().await;
        }
        Ok(envelope(vec![json!({"name": name, "type": "table"})], 1, 1, 8))
    }
}

#[tokio::test]
async fn test_superseded_response_never_lands() {
    let release = Arc::new(Notify::new());
    let fetcher = Gated {
        release: release.clone(),
    };
    let locator = ServiceLocator::with_env(Vec::<(String, String)>::new());
    let dashboard = Dashboard::new(&Config::default(), Arc::new(fetcher), locator);

    let slow = dashboard.search.dispatch_submit("slow").await;
    let fast = dashboard.search.dispatch_submit("fast").await;
    fast.await.unwrap();

    let state = dashboard.search.snapshot().await;
    assert_eq!(state.items()[0].name, "fast");

    release.notify_one();
    slow.await.unwrap();

    let state = dashboard.search.snapshot().await;
    assert_eq!(state.query(), Some("fast"));
    assert_eq!(state.items().len(), 1);
    assert_eq!(state.items()[0].name, "fast");
    assert!(state.pending().is_none());
}

#[tokio::test]
async fn test_response_after_clear_is_ignored() {
    let release = Arc::new(Notify::new());
    let fetcher = Gated {
        release: release.clone(),
    };
    let locator = ServiceLocator::with_env(Vec::<(String, String)>::new());
    let dashboard = Dashboard::new(&Config::default(), Arc::new(fetcher), locator);

    let slow = dashboard.search.dispatch_submit("slow").await;
    dashboard.search.clear().await;
    release.notify_one();
    slow.await.unwrap();

    let state = dashboard.search.snapshot().await;
    assert!(state.query().is_none());
    assert!(state.items().is_empty());
    assert!(!state.is_loading());
}
