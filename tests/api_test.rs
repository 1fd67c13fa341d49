use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use n1_catalog::config::{Config, SquareConfig, SquareEnvironment};
use n1_catalog::error::{CatalogError, Result as CatalogResult};
use n1_catalog::server::{create_server, AppState};
use n1_catalog::square::{CatalogObject, CatalogObjectKind, CatalogSource};

struct StaticCatalog {
    categories: Vec<Value>,
    items: Vec<Value>,
    plans: Vec<Value>,
    fail: bool,
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn list_objects(&self, kind: CatalogObjectKind) -> CatalogResult<Vec<CatalogObject>> {
        if self.fail {
            return Err(CatalogError::Api {
                message: "sandbox credentials rejected".to_string(),
            });
        }
        let raw = match kind {
            CatalogObjectKind::Category => &self.categories,
            CatalogObjectKind::Item => &self.items,
            CatalogObjectKind::SubscriptionPlan => &self.plans,
        };
        Ok(raw
            .iter()
            .map(|value| serde_json::from_value(value.clone()).unwrap())
            .collect())
    }
}

/// Upstream whose server accepts connections and then never responds, so
/// every listing call ends in a client-side timeout.
struct StalledUpstream {
    client: reqwest::Client,
    url: String,
}

#[async_trait]
impl CatalogSource for StalledUpstream {
    async fn list_objects(&self, _kind: CatalogObjectKind) -> CatalogResult<Vec<CatalogObject>> {
        self.client.get(&self.url).send().await?;
        Ok(Vec::new())
    }
}

async fn stalled_server() -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            // Hold the connection open without ever writing a response
            tokio::spawn(async move {
                let _socket = socket;
                tokio::time::sleep(Duration::from_secs(60)).await;
            });
        }
    });
    Ok(format!("http://{addr}/v2/catalog/list"))
}

fn test_state(source: StaticCatalog) -> AppState {
    state_for(Arc::new(source))
}

fn state_for(source: Arc<dyn CatalogSource>) -> AppState {
    AppState {
        config: Arc::new(Config {
            port: 0,
            square: SquareConfig {
                access_token: "test-token".to_string(),
                environment: SquareEnvironment::Sandbox,
                merchant_id: None,
                location_id: None,
                request_timeout: Duration::from_secs(10),
            },
        }),
        source,
        metrics: None,
    }
}

fn fixture_catalog() -> StaticCatalog {
    StaticCatalog {
        categories: vec![json!({
            "type": "CATEGORY",
            "id": "cat1",
            "category_data": {"name": "Manicures"}
        })],
        items: vec![json!({
            "type": "ITEM",
            "id": "it1",
            "item_data": {
                "name": "Classic Mani",
                "description": "Desc",
                "categories": ["cat1"],
                "variations": [
                    {"item_variation_data": {"price_money": {"amount": 5000}, "service_duration": 1800000}}
                ]
            }
        })],
        plans: vec![
            json!({
                "type": "SUBSCRIPTION_PLAN",
                "id": "p1",
                "subscription_plan_data": {
                    "name": "Platinum Membership",
                    "description": "• Priority booking\n• Free polish",
                    "subscription_phases": [{"recurring_price_money": {"amount": 20000}}]
                }
            }),
            json!({
                "type": "SUBSCRIPTION_PLAN",
                "id": "p2",
                "subscription_plan_data": {
                    "name": "Trial Membership",
                    "description": "",
                    "subscription_phases": [{"recurring_price_money": {"amount": 0}}]
                }
            }),
        ],
        fail: false,
    }
}

async fn get(state: AppState, uri: &str) -> Result<(StatusCode, axum::http::HeaderMap, Value)> {
    let app = create_server(state);
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty())?)
        .await?;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = hyper::body::to_bytes(response.into_body()).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, headers, body))
}

#[tokio::test]
async fn services_endpoint_returns_grouped_catalog() -> Result<()> {
    let (status, headers, body) = get(test_state(fixture_catalog()), "/api/services").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get("cache-control").unwrap(),
        "no-store, no-cache, must-revalidate, proxy-revalidate"
    );
    assert_eq!(headers.get("pragma").unwrap(), "no-cache");
    assert_eq!(headers.get("expires").unwrap(), "0");

    assert_eq!(body["total"], 1);
    assert!(body["lastUpdated"].is_string());
    let category = &body["categories"][0];
    assert_eq!(category["id"], "cat1");
    assert_eq!(category["title"], "Manicures");
    assert_eq!(category["description"], "");
    let service = &category["services"][0];
    assert_eq!(service["id"], "classic-mani");
    assert_eq!(service["title"], "Classic Mani");
    assert_eq!(service["price"], "$50");
    assert_eq!(service["duration"], "30 mins");
    assert_eq!(service["category"], "cat1");
    assert_eq!(service["sourceId"], "it1");
    assert_eq!(
        service["bookingLink"],
        "https://n1nail.ca/book?service=classic-mani"
    );
    Ok(())
}

#[tokio::test]
async fn memberships_endpoint_sorts_free_first() -> Result<()> {
    let (status, headers, body) = get(test_state(fixture_catalog()), "/api/memberships").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get("cache-control").unwrap(),
        "no-store, no-cache, must-revalidate, proxy-revalidate"
    );

    assert_eq!(body["total"], 2);
    let memberships = body["memberships"].as_array().unwrap();
    assert_eq!(memberships[0]["yearlyPrice"], "Free");
    assert_eq!(memberships[0]["title"], "Trial");
    assert_eq!(memberships[1]["yearlyPrice"], "$200");
    assert_eq!(memberships[1]["title"], "Platinum");
    assert_eq!(
        memberships[1]["benefits"],
        json!(["Priority booking", "Free polish"])
    );
    assert_eq!(
        memberships[1]["subscriptionUrl"],
        "https://squareup.com/dashboard/subscriptions/plans/p1/subscribe"
    );
    Ok(())
}

#[tokio::test]
async fn upstream_failure_returns_generic_500() -> Result<()> {
    let mut source = fixture_catalog();
    source.fail = true;

    let (status, _, body) = get(test_state(source), "/api/services").await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    // The upstream cause stays server-side; clients only see a generic message
    assert_eq!(body["error"], "Failed to fetch services from Square");
    assert!(!body["error"].as_str().unwrap().contains("credentials"));
    Ok(())
}

#[tokio::test]
async fn upstream_timeout_returns_504_with_generic_body() -> Result<()> {
    let url = stalled_server().await?;
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(50))
        .build()?;

    // The raw request error classifies as a timeout once wrapped
    let error = client.get(&url).send().await.unwrap_err();
    assert!(CatalogError::from(error).is_timeout());

    let state = state_for(Arc::new(StalledUpstream { client, url }));
    let (status, _, body) = get(state, "/api/services").await?;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"], "Failed to fetch services from Square");
    Ok(())
}

#[tokio::test]
async fn empty_item_listing_yields_empty_categories() -> Result<()> {
    let mut source = fixture_catalog();
    source.items.clear();

    let (status, _, body) = get(test_state(source), "/api/services").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categories"], json!([]));
    assert_eq!(body["total"], 0);
    Ok(())
}

#[tokio::test]
async fn repeated_requests_return_identical_content() -> Result<()> {
    let (_, _, first) = get(test_state(fixture_catalog()), "/api/services").await?;
    let (_, _, second) = get(test_state(fixture_catalog()), "/api/services").await?;

    // Idempotent modulo the lastUpdated timestamp
    let mut first = first;
    let mut second = second;
    first.as_object_mut().unwrap().remove("lastUpdated");
    second.as_object_mut().unwrap().remove("lastUpdated");
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn health_endpoint_reports_service_name() -> Result<()> {
    let (status, _, body) = get(test_state(fixture_catalog()), "/health").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "n1-catalog-api");
    Ok(())
}
