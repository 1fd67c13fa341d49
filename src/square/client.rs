use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::SquareConfig;
use crate::error::{CatalogError, Result};
use crate::observability::metrics;

use super::types::{CatalogObject, CatalogObjectKind};

const SQUARE_API_VERSION: &str = "2024-01-18";

/// Seam between the normalizers and the upstream catalog so tests can swap
/// in a canned catalog without touching the network.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// List every catalog record of the given kind.
    async fn list_objects(&self, kind: CatalogObjectKind) -> Result<Vec<CatalogObject>>;
}

pub struct SquareCatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl SquareCatalogClient {
    pub fn new(config: &SquareConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.access_token))
            .map_err(|_| {
                CatalogError::Config(
                    "SQUARE_ACCESS_TOKEN contains characters not valid in a header".to_string(),
                )
            })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert("Square-Version", HeaderValue::from_static(SQUARE_API_VERSION));

        // An upstream call without a bound could hang a request indefinitely,
        // so every request carries the configured timeout.
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.environment.base_url().to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ListCatalogResponse {
    #[serde(default)]
    objects: Vec<serde_json::Value>,
    cursor: Option<String>,
}

#[async_trait]
impl CatalogSource for SquareCatalogClient {
    async fn list_objects(&self, kind: CatalogObjectKind) -> Result<Vec<CatalogObject>> {
        let url = format!("{}/v2/catalog/list", self.base_url);
        let mut objects = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut request = self.client.get(&url).query(&[("types", kind.as_str())]);
            if let Some(cursor) = &cursor {
                request = request.query(&[("cursor", cursor.as_str())]);
            }

            debug!("listing {} records from Square catalog", kind.as_str());
            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    metrics::catalog::fetch_error(kind.as_str());
                    return Err(e.into());
                }
            };

            if !response.status().is_success() {
                metrics::catalog::fetch_error(kind.as_str());
                return Err(CatalogError::Api {
                    message: format!(
                        "catalog list for {} returned {}",
                        kind.as_str(),
                        response.status()
                    ),
                });
            }

            let page: ListCatalogResponse = response.json().await?;

            // Narrow each record individually; one malformed record must not
            // sink the whole page.
            for raw in &page.objects {
                match serde_json::from_value::<CatalogObject>(raw.clone()) {
                    Ok(object) => objects.push(object),
                    Err(e) => {
                        let record_id = raw
                            .get("id")
                            .and_then(|v| v.as_str())
                            .unwrap_or("<missing id>");
                        warn!(record_id = %record_id, reason = %e, "dropping catalog record that failed narrowing");
                        metrics::catalog::record_dropped("narrow");
                    }
                }
            }

            match page.cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        info!(
            "fetched {} {} records from Square catalog",
            objects.len(),
            kind.as_str()
        );
        metrics::catalog::fetch_success(kind.as_str(), objects.len());
        Ok(objects)
    }
}
